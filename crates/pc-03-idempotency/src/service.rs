//! # Idempotency Store
//!
//! ## Contract
//!
//! - `is_known_key(key)`: whether an outcome is recorded for `key`
//! - `add(request, status, body)`: record the first outcome; fails if the key
//!   is already present
//! - `reply(request, sink)`: replay the stored outcome when the retried
//!   request equals the original, otherwise answer 400 `used-idempotency-key`
//!   and leave the record untouched
//!
//! ## Concurrency
//!
//! `add` is an atomic insert-if-absent. [`IdempotencyStore::execute`] goes
//! further and serialises whole request executions per key with an async
//! mutex, so two concurrent first requests cannot both run the handler.

use crate::domain::errors::IdempotencyError;
use crate::domain::record::{idempotency_key, IdempotencyRecord};
use crate::ports::outbound::{CapturedResponse, ResponseSink};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use shared_types::{ApiErrorBody, IdempotencySettings, SystemTimeSource, TimeSource};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// HTTP status of a conflicting retry.
pub const CONFLICT_STATUS: u16 = 400;

/// Outcome of [`IdempotencyStore::execute`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub status_code: u16,
    pub body: Value,
    /// Whether the outcome came from the store rather than the handler
    pub replayed: bool,
}

/// Recorded outcomes by idempotency key.
pub struct IdempotencyStore {
    records: DashMap<String, Arc<IdempotencyRecord>>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    retention: Option<Duration>,
    time_source: Arc<dyn TimeSource>,
}

impl IdempotencyStore {
    /// Store keeping records for the process lifetime.
    pub fn new() -> Self {
        Self::with_retention(None, Arc::new(SystemTimeSource))
    }

    /// Store dropping records older than `retention`.
    pub fn with_retention(retention: Option<Duration>, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            records: DashMap::new(),
            locks: DashMap::new(),
            retention,
            time_source,
        }
    }

    pub fn from_settings(settings: &IdempotencySettings) -> Self {
        Self::with_retention(
            settings.retention_secs.map(Duration::from_secs),
            Arc::new(SystemTimeSource),
        )
    }

    /// Whether an unexpired outcome is recorded for `key`.
    #[must_use]
    pub fn is_known_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Stored record for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<IdempotencyRecord>> {
        if self.evict_expired(key) {
            return None;
        }
        self.records.get(key).map(|entry| entry.value().clone())
    }

    /// Drop the record for `key` if it outlived the retention window.
    ///
    /// Returns whether a record was evicted.
    fn evict_expired(&self, key: &str) -> bool {
        let evicted = self
            .records
            .remove_if(key, |_, record| self.is_expired(record))
            .is_some();
        if evicted {
            debug!(key, "Idempotency record expired");
        }
        evicted
    }

    /// Record the first outcome of `request`.
    ///
    /// # Errors
    ///
    /// - `IdempotencyError::MissingKey` if the request carries no key
    /// - `IdempotencyError::IdempotentRequestAlreadyExists` if the key is taken
    pub fn add(
        &self,
        request: &Value,
        status_code: u16,
        response_body: Value,
    ) -> Result<(), IdempotencyError> {
        let key = idempotency_key(request).ok_or(IdempotencyError::MissingKey)?;
        // Expired records must not block a new one
        self.evict_expired(key);

        match self.records.entry(key.to_string()) {
            Entry::Occupied(_) => Err(IdempotencyError::IdempotentRequestAlreadyExists {
                key: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(IdempotencyRecord {
                    idempotency_key: key.to_string(),
                    request: request.clone(),
                    status_code,
                    response_body,
                    recorded_at: self.time_source.now_ms(),
                }));
                debug!(key, status_code, "Recorded idempotent outcome");
                Ok(())
            }
        }
    }

    /// Answer a retried request from the store.
    ///
    /// # Errors
    ///
    /// - `IdempotencyError::MissingKey` if the request carries no key
    /// - `IdempotencyError::NoPreviousIdempotentRequest` if nothing is recorded
    pub fn reply(
        &self,
        request: &Value,
        sink: &mut impl ResponseSink,
    ) -> Result<(), IdempotencyError> {
        let key = idempotency_key(request).ok_or(IdempotencyError::MissingKey)?;
        let record = self
            .get(key)
            .ok_or_else(|| IdempotencyError::NoPreviousIdempotentRequest {
                key: key.to_string(),
            })?;

        if record.matches(request) {
            debug!(key, status_code = record.status_code, "Replaying idempotent outcome");
            sink.send(record.status_code, record.response_body.clone());
        } else {
            warn!(key, "Idempotency key reused with a different request");
            sink.send(CONFLICT_STATUS, ApiErrorBody::used_idempotency_key().to_value());
        }
        Ok(())
    }

    /// Run `handler` at most once per idempotency key.
    ///
    /// Requests without a key run unconditionally and are not recorded.
    /// Only 2xx outcomes are recorded; a failed first attempt can be retried.
    pub async fn execute<F, Fut>(&self, request: &Value, handler: F) -> ExecutionOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = (u16, Value)>,
    {
        let Some(key) = idempotency_key(request) else {
            let (status_code, body) = handler().await;
            return ExecutionOutcome {
                status_code,
                body,
                replayed: false,
            };
        };

        let slot = KeyLock::acquire(&self.locks, key);
        let _guard = slot.mutex.lock().await;
        self.execute_locked(key, request, handler).await
    }

    async fn execute_locked<F, Fut>(&self, key: &str, request: &Value, handler: F) -> ExecutionOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = (u16, Value)>,
    {
        if self.is_known_key(key) {
            let mut captured = CapturedResponse::default();
            if self.reply(request, &mut captured).is_ok() {
                if let (Some(status_code), Some(body)) = (captured.status, captured.body) {
                    return ExecutionOutcome {
                        status_code,
                        body,
                        replayed: true,
                    };
                }
            }
        }

        let (status_code, body) = handler().await;
        if (200..300).contains(&status_code) {
            if let Err(e) = self.add(request, status_code, body.clone()) {
                // Only reachable if a record was added without the key lock
                warn!(key, error = %e, "Failed to record idempotent outcome");
            }
        } else {
            info!(key, status_code, "Not recording unsuccessful outcome");
        }
        ExecutionOutcome {
            status_code,
            body,
            replayed: false,
        }
    }

    /// Number of stored records (including not yet evicted expired ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn is_expired(&self, record: &IdempotencyRecord) -> bool {
        self.retention.is_some_and(|retention| {
            self.time_source.now_ms().saturating_sub(record.recorded_at)
                > retention.as_millis() as u64
        })
    }
}

/// Handle on the per-key execution mutex.
///
/// Dropping it (also when the `execute` future is cancelled mid-handler)
/// removes the map entry once no other caller holds or waits on the mutex.
struct KeyLock<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    mutex: Arc<Mutex<()>>,
}

impl<'a> KeyLock<'a> {
    fn acquire(locks: &'a DashMap<String, Arc<Mutex<()>>>, key: &'a str) -> Self {
        let mutex = locks.entry(key.to_string()).or_default().clone();
        Self { locks, key, mutex }
    }
}

impl Drop for KeyLock<'_> {
    fn drop(&mut self) {
        // The map and this handle are the only references left
        self.locks.remove_if(self.key, |_, lock| {
            Arc::ptr_eq(lock, &self.mutex) && Arc::strong_count(lock) == 2
        });
    }
}

impl Default for IdempotencyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::ManualTimeSource;

    fn transfer(amount: &str) -> Value {
        json!({"idempotencyKey": "k-1", "amount": amount, "asset": "BTC"})
    }

    #[test]
    fn test_add_then_reply_identical() {
        let store = IdempotencyStore::new();
        store.add(&transfer("1"), 201, json!({"id": "tx-1"})).unwrap();

        let mut sink = CapturedResponse::default();
        store.reply(&transfer("1"), &mut sink).unwrap();
        assert_eq!(sink.status, Some(201));
        assert_eq!(sink.body, Some(json!({"id": "tx-1"})));
    }

    #[test]
    fn test_reply_conflicting_body() {
        let store = IdempotencyStore::new();
        store.add(&transfer("1"), 200, json!({"id": "tx-1"})).unwrap();

        let mut sink = CapturedResponse::default();
        store.reply(&transfer("2"), &mut sink).unwrap();
        assert_eq!(sink.status, Some(400));
        let body = sink.body.unwrap();
        assert_eq!(body["errorType"], "used-idempotency-key");
        assert_eq!(body["requestPart"], "body");
        assert_eq!(body["propertyName"], "idempotencyKey");

        // Record untouched
        let record = store.get("k-1").unwrap();
        assert_eq!(record.request, transfer("1"));
        assert_eq!(record.response_body, json!({"id": "tx-1"}));
    }

    #[test]
    fn test_reply_unknown_key() {
        let store = IdempotencyStore::new();
        let mut sink = CapturedResponse::default();
        assert_eq!(
            store.reply(&transfer("1"), &mut sink),
            Err(IdempotencyError::NoPreviousIdempotentRequest { key: "k-1".into() })
        );
        assert_eq!(sink, CapturedResponse::default());
    }

    #[test]
    fn test_add_twice() {
        let store = IdempotencyStore::new();
        store.add(&transfer("1"), 200, json!({})).unwrap();
        assert_eq!(
            store.add(&transfer("1"), 200, json!({})),
            Err(IdempotencyError::IdempotentRequestAlreadyExists { key: "k-1".into() })
        );
        assert!(store.is_known_key("k-1"));
    }

    #[test]
    fn test_request_without_key() {
        let store = IdempotencyStore::new();
        assert_eq!(
            store.add(&json!({"amount": "1"}), 200, json!({})),
            Err(IdempotencyError::MissingKey)
        );
    }

    #[test]
    fn test_retention_expires_records() {
        let clock = Arc::new(ManualTimeSource::new(1_000_000));
        let store = IdempotencyStore::with_retention(Some(Duration::from_secs(60)), clock.clone());
        store.add(&transfer("1"), 200, json!({})).unwrap();

        clock.advance(60_000);
        assert!(store.is_known_key("k-1"));
        clock.advance(1);
        assert!(!store.is_known_key("k-1"));
        // Key can be reused after expiry
        assert!(store.add(&transfer("2"), 200, json!({})).is_ok());
    }

    #[test]
    fn test_evict_expired_only_drops_stale_records() {
        let clock = Arc::new(ManualTimeSource::new(1_000_000));
        let store = IdempotencyStore::with_retention(Some(Duration::from_secs(60)), clock.clone());
        store.add(&transfer("1"), 200, json!({})).unwrap();

        assert!(!store.evict_expired("k-1"));
        assert_eq!(store.len(), 1);

        clock.advance(60_001);
        // Expired but not yet evicted
        assert_eq!(store.len(), 1);
        assert!(store.evict_expired("k-1"));
        assert!(store.is_empty());
        assert!(!store.evict_expired("k-1"));
    }

    #[test]
    fn test_add_replaces_expired_record() {
        let clock = Arc::new(ManualTimeSource::new(1_000_000));
        let store = IdempotencyStore::with_retention(Some(Duration::from_secs(60)), clock.clone());
        store.add(&transfer("1"), 200, json!({"id": "tx-1"})).unwrap();
        clock.advance(60_001);

        store.add(&transfer("2"), 201, json!({"id": "tx-2"})).unwrap();
        assert_eq!(store.len(), 1);
        let record = store.get("k-1").unwrap();
        assert_eq!(record.request, transfer("2"));
        assert_eq!(record.status_code, 201);
    }

    #[tokio::test]
    async fn test_cancelled_execute_releases_key_lock() {
        let store = IdempotencyStore::new();
        let cancelled = tokio::time::timeout(
            Duration::from_millis(20),
            store.execute(&transfer("1"), std::future::pending::<(u16, Value)>),
        )
        .await;
        assert!(cancelled.is_err());
        assert!(store.locks.is_empty());
        assert!(!store.is_known_key("k-1"));

        let retry = store
            .execute(&transfer("1"), || async { (201, json!({"id": "tx-1"})) })
            .await;
        assert!(!retry.replayed);
        assert_eq!(retry.status_code, 201);
        assert!(store.locks.is_empty());
    }

    #[tokio::test]
    async fn test_lock_kept_while_another_caller_waits() {
        let store = Arc::new(IdempotencyStore::new());
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let first = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .execute(&transfer("1"), || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        (201, json!({"id": "tx-1"}))
                    })
                    .await
            })
        };
        started_rx.await.unwrap();

        // A second caller queued behind the first, then cancelled
        let queued = tokio::time::timeout(
            Duration::from_millis(20),
            store.execute(&transfer("1"), || async { (201, json!({"id": "tx-2"})) }),
        )
        .await;
        assert!(queued.is_err());
        // The running execution still owns the entry
        assert_eq!(store.locks.len(), 1);

        release_tx.send(()).unwrap();
        let outcome = first.await.unwrap();
        assert!(!outcome.replayed);
        assert!(store.locks.is_empty());
    }

    #[tokio::test]
    async fn test_execute_replays_and_rejects() {
        let store = IdempotencyStore::new();
        let first = store
            .execute(&transfer("1"), || async { (201, json!({"id": "tx-1"})) })
            .await;
        assert!(!first.replayed);

        let retry = store
            .execute(&transfer("1"), || async { (201, json!({"id": "tx-2"})) })
            .await;
        assert!(retry.replayed);
        assert_eq!(retry.body, json!({"id": "tx-1"}));

        let conflicting = store
            .execute(&transfer("9"), || async { (201, json!({"id": "tx-3"})) })
            .await;
        assert_eq!(conflicting.status_code, 400);
        assert!(conflicting.replayed);
    }

    #[tokio::test]
    async fn test_execute_does_not_record_failures() {
        let store = IdempotencyStore::new();
        let failed = store
            .execute(&transfer("1"), || async { (500, json!({"errorType": "internal-error"})) })
            .await;
        assert_eq!(failed.status_code, 500);
        assert!(!store.is_known_key("k-1"));
    }
}
