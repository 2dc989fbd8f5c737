//! # Idempotency Record

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the body field carrying the idempotency key.
pub const IDEMPOTENCY_KEY_FIELD: &str = "idempotencyKey";

/// Idempotency key of a request body, if it carries one.
#[must_use]
pub fn idempotency_key(request: &Value) -> Option<&str> {
    request
        .get(IDEMPOTENCY_KEY_FIELD)
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
}

/// First outcome of a request, replayed for identical retries.
///
/// Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdempotencyRecord {
    pub idempotency_key: String,
    /// Snapshot of the original request body
    pub request: Value,
    pub status_code: u16,
    pub response_body: Value,
    /// When the outcome was recorded (ms since epoch)
    pub recorded_at: u64,
}

impl IdempotencyRecord {
    /// Deep structural equality with a retried request (all fields, any key order).
    #[must_use]
    pub fn matches(&self, request: &Value) -> bool {
        self.request == *request
    }
}
