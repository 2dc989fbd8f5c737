//! # Freshness Policy
//!
//! A timestamp is fresh when `timestamp >= now - ttl`. Future timestamps are
//! accepted unless a maximum skew is configured.

use crate::domain::errors::ReplayError;
use shared_types::ReplaySettings;
use std::time::Duration;

/// Timestamp window of accepted requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayPolicy {
    /// Maximum request age in milliseconds
    pub ttl_ms: u64,
    /// Maximum distance into the future in milliseconds (`None`: unbounded)
    pub max_future_skew_ms: Option<u64>,
    /// Minimum time between registry sweeps in milliseconds
    pub sweep_interval_ms: u64,
}

impl ReplayPolicy {
    /// Default request TTL (10 seconds).
    pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

    pub fn new(ttl: Duration) -> Self {
        let ttl_ms = ttl.as_millis() as u64;
        Self {
            ttl_ms,
            max_future_skew_ms: None,
            sweep_interval_ms: ttl_ms,
        }
    }

    #[must_use]
    pub fn with_max_future_skew(mut self, skew: Duration) -> Self {
        self.max_future_skew_ms = Some(skew.as_millis() as u64);
        self
    }

    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn from_settings(settings: &ReplaySettings) -> Self {
        let policy = Self::new(settings.request_ttl())
            .with_sweep_interval(Duration::from_secs(settings.sweep_interval_secs));
        match settings.max_future_skew_secs {
            Some(secs) => policy.with_max_future_skew(Duration::from_secs(secs)),
            None => policy,
        }
    }

    /// Oldest timestamp still accepted at `now`.
    #[must_use]
    pub fn oldest_accepted(&self, now: u64) -> u64 {
        now.saturating_sub(self.ttl_ms)
    }

    /// Check `timestamp` against the window around `now`.
    ///
    /// # Errors
    ///
    /// - `ReplayError::TimestampExpired` when older than the TTL
    /// - `ReplayError::TimestampFromFuture` when beyond the configured skew
    pub fn check_timestamp(&self, timestamp: u64, now: u64) -> Result<(), ReplayError> {
        let threshold = self.oldest_accepted(now);
        if timestamp < threshold {
            return Err(ReplayError::TimestampExpired {
                timestamp,
                threshold,
            });
        }
        if let Some(skew) = self.max_future_skew_ms {
            let threshold = now.saturating_add(skew);
            if timestamp > threshold {
                return Err(ReplayError::TimestampFromFuture {
                    timestamp,
                    threshold,
                });
            }
        }
        Ok(())
    }
}

impl Default for ReplayPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
