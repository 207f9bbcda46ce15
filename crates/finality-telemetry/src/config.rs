//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter directive (e.g. `info`, `observer_finality=debug`)
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// Whether to emit JSON instead of human-readable lines
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "observer-finality".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OF_SERVICE_NAME`: Service name (default: observer-finality)
    /// - `OF_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `OF_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `OF_JSON_LOGS`: Enable JSON logs (default: false outside containers)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TelemetryConfig::from_env`] but reading through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("OF_SERVICE_NAME")
                .unwrap_or_else(|| "observer-finality".to_string()),

            log_level: lookup("OF_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("OF_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("OF_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "observer-finality");
        assert_eq!(config.log_level, "info");
        assert!(config.console_output);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_empty_lookup_matches_default() {
        let config = TelemetryConfig::from_lookup(|_| None);
        assert_eq!(config, TelemetryConfig::default());
    }

    #[test]
    fn test_log_level_prefers_own_variable() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("OF_LOG_LEVEL", "debug"),
            ("RUST_LOG", "warn"),
        ]));
        assert_eq!(config.log_level, "debug");

        let config = TelemetryConfig::from_lookup(lookup_from(&[("RUST_LOG", "warn")]));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_json_logs_default_in_container() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[("DOCKER_CONTAINER", "1")]));
        assert!(config.json_logs);

        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("DOCKER_CONTAINER", "1"),
            ("OF_JSON_LOGS", "false"),
        ]));
        assert!(!config.json_logs);
    }

    #[test]
    fn test_console_output_toggle() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[("OF_CONSOLE_OUTPUT", "0")]));
        assert!(!config.console_output);
    }
}
