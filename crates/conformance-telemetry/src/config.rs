//! Telemetry configuration from environment variables.

use std::env;

/// Default service name in log records.
pub const DEFAULT_SERVICE_NAME: &str = "provider-conformance";

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup record
    pub service_name: String,

    /// Component identifier (`05`, `06`, ...; `00` for the whole harness)
    pub component_id: String,

    /// `EnvFilter` directive (trace, debug, info, warn, error, or per-target)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to colour the human-readable output
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            component_id: "00".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PC_SERVICE_NAME`: Service name (default: provider-conformance)
    /// - `PC_COMPONENT_ID`: Component ID (default: 00)
    /// - `PC_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `PC_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `NO_COLOR`: Disable ANSI colours
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`TelemetryConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container = var("KUBERNETES_SERVICE_HOST").is_some() || var("DOCKER_CONTAINER").is_some();

        Self {
            service_name: var("PC_SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),

            component_id: var("PC_COMPONENT_ID").unwrap_or_else(|| "00".to_string()),

            log_level: var("PC_LOG_LEVEL")
                .or_else(|| var("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            json_logs: var("PC_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(is_container),

            ansi: var("NO_COLOR").is_none(),
        }
    }

    /// Create configuration for a specific component.
    pub fn for_component(component_id: &str, component_name: &str) -> Self {
        let mut config = Self::from_env();
        config.component_id = component_id.to_string();
        config.service_name = format!("pc-{}-{}", component_id, component_name);
        config
    }

    /// Get the full service name including the component.
    pub fn full_service_name(&self) -> String {
        if self.component_id == "00" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.component_id)
        }
    }
}
