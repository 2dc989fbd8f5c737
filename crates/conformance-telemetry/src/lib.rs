//! # Conformance Telemetry
//!
//! `tracing-subscriber` setup shared by every harness binary and test suite.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use conformance_telemetry::{init_logging, TelemetryConfig};
//!
//! init_logging(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PC_LOG_LEVEL` / `RUST_LOG` | `info` | `EnvFilter` directive |
//! | `PC_JSON_LOGS` | `false` (`true` in containers) | One JSON object per line |
//! | `PC_SERVICE_NAME` | `provider-conformance` | Service name in the startup record |
//! | `PC_COMPONENT_ID` | `00` | Component suffix of the service name |

mod config;
mod logging;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::{init_logging, is_initialized};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter {0}")]
    Filter(String),

    #[error("failed to install subscriber: {0}")]
    Init(String),
}

/// Install logging from the environment.
///
/// # Errors
///
/// See [`init_logging`].
pub fn init_from_env() -> Result<bool, TelemetryError> {
    init_logging(&TelemetryConfig::from_env())
}
