//! # Replay Guard Service
//!
//! Combines the freshness policy with the nonce registry.
//!
//! ## Flow
//!
//! The guard is used in two phases around signature verification:
//!
//! 1. [`ReplayGuard::check`] validates nonce and timestamp without recording
//!    anything, so an unsigned or badly signed request cannot burn a nonce.
//! 2. [`ReplayGuard::record`] atomically records the nonce once the request
//!    is authenticated; a concurrent duplicate loses with `NonceReused`.
//!
//! [`ReplayGuard::admit`] performs both at once for callers without a
//! verification step in between.

use crate::domain::errors::ReplayError;
use crate::domain::policy::ReplayPolicy;
use crate::domain::registry::NonceRegistry;
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::Arc;
use tracing::{debug, warn};

/// Nonce + timestamp replay protection.
pub struct ReplayGuard {
    policy: ReplayPolicy,
    registry: NonceRegistry,
    time_source: Arc<dyn TimeSource>,
}

impl ReplayGuard {
    /// Guard backed by the system clock.
    pub fn new(policy: ReplayPolicy) -> Self {
        Self::with_time_source(policy, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(policy: ReplayPolicy, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            policy,
            registry: NonceRegistry::new(),
            time_source,
        }
    }

    pub fn policy(&self) -> &ReplayPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &NonceRegistry {
        &self.registry
    }

    /// Validate without recording.
    ///
    /// # Errors
    ///
    /// The most specific [`ReplayError`]: missing nonce, then reused nonce,
    /// then timestamp outside the window.
    pub fn check(&self, api_key: &str, nonce: &str, timestamp: u64) -> Result<(), ReplayError> {
        let now = self.time_source.now_ms();
        let result = self.validate(api_key, nonce, timestamp, now);
        if let Err(e) = &result {
            warn!(api_key, nonce, timestamp, now, error = %e, "Replay check failed");
        }
        result
    }

    /// Record an authenticated request's nonce.
    ///
    /// # Errors
    ///
    /// Returns `ReplayError::NonceReused` if another request recorded the same
    /// nonce first, or any error of [`ReplayGuard::check`].
    pub fn record(&self, api_key: &str, nonce: &str, timestamp: u64) -> Result<(), ReplayError> {
        let now = self.time_source.now_ms();
        self.validate(api_key, nonce, timestamp, now)?;
        self.registry
            .maybe_sweep(now, self.policy.oldest_accepted(now), self.policy.sweep_interval_ms);

        if !self.registry.insert(api_key, nonce, timestamp) {
            warn!(api_key, nonce, "Concurrent nonce reuse rejected");
            return Err(ReplayError::NonceReused {
                nonce: nonce.to_string(),
            });
        }
        debug!(api_key, nonce, timestamp, "Nonce accepted");
        Ok(())
    }

    /// [`ReplayGuard::check`] and [`ReplayGuard::record`] in one step.
    ///
    /// # Errors
    ///
    /// See [`ReplayGuard::record`].
    pub fn admit(&self, api_key: &str, nonce: &str, timestamp: u64) -> Result<(), ReplayError> {
        self.check(api_key, nonce, timestamp)?;
        self.record(api_key, nonce, timestamp)
    }

    fn validate(
        &self,
        api_key: &str,
        nonce: &str,
        timestamp: u64,
        now: u64,
    ) -> Result<(), ReplayError> {
        if nonce.trim().is_empty() {
            return Err(ReplayError::MissingNonce);
        }
        if self.registry.contains(api_key, nonce) {
            return Err(ReplayError::NonceReused {
                nonce: nonce.to_string(),
            });
        }
        self.policy.check_timestamp(timestamp, now)
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new(ReplayPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ManualTimeSource;

    const NOW: u64 = 1_700_000_000_000;

    fn guard() -> (ReplayGuard, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::new(NOW));
        let guard = ReplayGuard::with_time_source(ReplayPolicy::default(), clock.clone());
        (guard, clock)
    }

    #[test]
    fn test_nonce_accepted_once() {
        let (guard, _) = guard();
        assert!(guard.admit("key", "n-1", NOW).is_ok());
        assert_eq!(
            guard.admit("key", "n-1", NOW),
            Err(ReplayError::NonceReused { nonce: "n-1".into() })
        );
    }

    #[test]
    fn test_check_does_not_record() {
        let (guard, _) = guard();
        guard.check("key", "n-1", NOW).unwrap();
        guard.check("key", "n-1", NOW).unwrap();
        assert!(guard.registry().is_empty());
    }

    #[test]
    fn test_error_precedence() {
        let (guard, _) = guard();
        guard.admit("key", "n-1", NOW).unwrap();
        let stale = NOW - 60_000;

        assert_eq!(guard.check("key", "", stale), Err(ReplayError::MissingNonce));
        assert!(matches!(
            guard.check("key", "n-1", stale),
            Err(ReplayError::NonceReused { .. })
        ));
        assert!(matches!(
            guard.check("key", "n-2", stale),
            Err(ReplayError::TimestampExpired { .. })
        ));
    }

    #[test]
    fn test_rejected_request_does_not_burn_nonce() {
        let (guard, _) = guard();
        assert!(guard.admit("key", "n-1", NOW - 60_000).is_err());
        assert!(guard.admit("key", "n-1", NOW).is_ok());
    }

    #[test]
    fn test_expired_nonces_are_evicted() {
        let (guard, clock) = guard();
        guard.admit("key", "n-1", NOW).unwrap();
        clock.advance(30_000);
        guard.admit("key", "n-2", NOW + 30_000).unwrap();
        assert!(!guard.registry().contains("key", "n-1"));
        assert_eq!(guard.registry().len(), 1);
    }

    #[test]
    fn test_error_headers() {
        assert_eq!(ReplayError::MissingNonce.header(), "X-FBAPI-NONCE");
        assert_eq!(
            ReplayError::TimestampExpired { timestamp: 0, threshold: 1 }.header(),
            "X-FBAPI-TIMESTAMP"
        );
    }
}
