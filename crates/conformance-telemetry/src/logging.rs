//! Subscriber installation.
//!
//! JSON records carry `timestamp`, `level`, `target`, `fields` and the span
//! list, one object per line. The human-readable format is the default
//! `tracing_subscriber::fmt` layout.

use crate::{TelemetryConfig, TelemetryError};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Install the global subscriber.
///
/// Only the first call installs anything; later calls return `Ok(false)`.
///
/// # Errors
///
/// - `TelemetryError::Filter` for an unparseable log filter
/// - `TelemetryError::Init` if another subscriber is already installed
pub fn init_logging(config: &TelemetryConfig) -> Result<bool, TelemetryError> {
    if INITIALIZED.swap(true, Ordering::AcqRel) {
        return Ok(false);
    }
    let result = install(config);
    if result.is_err() {
        INITIALIZED.store(false, Ordering::Release);
    }
    result.map(|()| true)
}

/// Whether [`init_logging`] installed the subscriber.
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

fn install(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(format!("{}: {e}", config.log_level)))?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(config.ansi);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    tracing::info!(
        service = %config.full_service_name(),
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}
