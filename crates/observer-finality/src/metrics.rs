//! # Finality Metrics
//!
//! Prometheus counters for the observer-aware flows.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! observer-finality = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `observer_finality_roles_sent_total` - Roles sent, by role
//! - `observer_finality_finalizations_total` - Finalizer runs that completed
//! - `observer_finality_failures_total` - Finalizer runs that failed, by error kind
//! - `observer_finality_handler_runs_total` - Handler runs that delegated, by policy
//! - `observer_finality_handler_self_skips_total` - Handler runs skipped for our own identity

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Roles sent, labeled by role
    pub static ref ROLES_SENT: IntCounterVec = register_int_counter_vec!(
        "observer_finality_roles_sent_total",
        "Total number of transaction roles sent to counterparties",
        &["role"]
    )
    .expect("Failed to create ROLES_SENT metric");

    /// Completed finalizer runs
    pub static ref FINALIZATIONS: IntCounter = register_int_counter!(
        "observer_finality_finalizations_total",
        "Total number of observer-aware finalizations completed"
    )
    .expect("Failed to create FINALIZATIONS metric");

    /// Failed finalizer runs, labeled by error kind
    pub static ref FAILURES: IntCounterVec = register_int_counter_vec!(
        "observer_finality_failures_total",
        "Total number of observer-aware finalizations that failed",
        &["kind"]
    )
    .expect("Failed to create FAILURES metric");

    /// Handler runs that delegated to receive finality, labeled by policy
    pub static ref HANDLER_RUNS: IntCounterVec = register_int_counter_vec!(
        "observer_finality_handler_runs_total",
        "Total number of handler runs that recorded a transaction",
        &["policy"]
    )
    .expect("Failed to create HANDLER_RUNS metric");

    /// Handler runs skipped because the counterparty was ourselves
    pub static ref HANDLER_SELF_SKIPS: IntCounter = register_int_counter!(
        "observer_finality_handler_self_skips_total",
        "Total number of handler runs skipped for our own identity"
    )
    .expect("Failed to create HANDLER_SELF_SKIPS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a role sent
#[cfg(feature = "metrics")]
pub fn record_role_sent(role: &str) {
    ROLES_SENT.with_label_values(&[role]).inc();
}

/// Record a completed finalization
#[cfg(feature = "metrics")]
pub fn record_finalization_completed() {
    FINALIZATIONS.inc();
}

/// Record a failed finalization
#[cfg(feature = "metrics")]
pub fn record_finalization_failed(kind: &str) {
    FAILURES.with_label_values(&[kind]).inc();
}

/// Record a handler run that delegated
#[cfg(feature = "metrics")]
pub fn record_handler_run(policy: &str) {
    HANDLER_RUNS.with_label_values(&[policy]).inc();
}

/// Record a handler self-skip
#[cfg(feature = "metrics")]
pub fn record_handler_self_skip() {
    HANDLER_SELF_SKIPS.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_role_sent(_role: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_finalization_completed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_finalization_failed(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_handler_run(_policy: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_handler_self_skip() {}
