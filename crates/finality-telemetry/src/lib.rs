//! # Finality Telemetry
//!
//! Log output for nodes running the observer-aware finality flows.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finality_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Flows now log through the installed subscriber
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OF_SERVICE_NAME` | `observer-finality` | Service name in log lines |
//! | `OF_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `OF_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `OF_JSON_LOGS` | `false` | JSON output (defaults on inside containers) |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for a node. Call once at startup.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)
}
