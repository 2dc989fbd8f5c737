//! # Nonce Registry
//!
//! Nonces accepted per API key, each stored with the request timestamp it
//! arrived with.
//!
//! ## Eviction
//!
//! An entry whose timestamp is older than `now - ttl` can never be matched by
//! a fresh request, so it is dropped. Sweeps run lazily on insert, at most
//! once per sweep interval, which bounds memory by the request rate times the
//! TTL window.
//!
//! ## Concurrency
//!
//! Check-then-insert for one API key happens under that key's shard lock, so
//! two concurrent requests with the same nonce cannot both be accepted.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Accepted nonces, keyed by API key.
#[derive(Debug, Default)]
pub struct NonceRegistry {
    /// API key -> (nonce -> request timestamp)
    entries: DashMap<String, HashMap<String, u64>>,
    /// Last sweep time (ms).
    last_sweep: AtomicU64,
}

impl NonceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `nonce` was already accepted for `api_key`.
    #[must_use]
    pub fn contains(&self, api_key: &str, nonce: &str) -> bool {
        self.entries
            .get(api_key)
            .is_some_and(|nonces| nonces.contains_key(nonce))
    }

    /// Insert `nonce` unless already present. Returns `false` on reuse.
    pub fn insert(&self, api_key: &str, nonce: &str, timestamp: u64) -> bool {
        let mut nonces = self.entries.entry(api_key.to_string()).or_default();
        if nonces.contains_key(nonce) {
            return false;
        }
        nonces.insert(nonce.to_string(), timestamp);
        true
    }

    /// Run [`NonceRegistry::sweep`] if the last one is older than `interval_ms`.
    pub fn maybe_sweep(&self, now: u64, oldest_accepted: u64, interval_ms: u64) {
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now.saturating_sub(last) < interval_ms {
            return;
        }
        // One sweeper per interval
        if self
            .last_sweep
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            self.sweep(oldest_accepted);
        }
    }

    /// Drop every entry with a timestamp before `oldest_accepted`.
    ///
    /// Returns the number of evicted nonces.
    pub fn sweep(&self, oldest_accepted: u64) -> usize {
        let mut evicted = 0;
        self.entries.retain(|_, nonces| {
            let before = nonces.len();
            nonces.retain(|_, timestamp| *timestamp >= oldest_accepted);
            evicted += before - nonces.len();
            !nonces.is_empty()
        });
        if evicted > 0 {
            debug!(evicted, remaining = self.len(), "Swept expired nonces");
        }
        evicted
    }

    /// Total number of stored nonces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
