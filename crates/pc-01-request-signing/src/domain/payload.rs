//! # Canonical Signature Payload
//!
//! The string that is actually signed:
//!
//! ```text
//! timestamp || nonce || METHOD || path_with_query || json_body_or_empty
//! ```
//!
//! Fields are concatenated without delimiters. Two distinct requests can in
//! principle produce the same payload (e.g. nonce `"1"` + `GET` vs nonce
//! `"1G"` + `ET`); the format is fixed by the provider API and must be kept
//! byte-for-byte on both the signing and the verifying side.

use crate::domain::errors::SignatureError;
use serde_json::Value;
use std::fmt;

/// Canonical JSON text of a request body.
///
/// Absent or falsy bodies (`null`, `false`, `0`, `""`) serialize to the empty
/// string; anything else to compact JSON with key order preserved.
#[must_use]
pub fn canonical_body(body: Option<&Value>) -> String {
    match body {
        Some(value) if !is_falsy(value) => value.to_string(),
        _ => String::new(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Derived, never persisted payload of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePayload {
    timestamp: u64,
    nonce: String,
    method: String,
    path: String,
    body: String,
}

impl SignaturePayload {
    /// Payload of a request whose body is a JSON value.
    ///
    /// `path` must include the raw query string, if any.
    pub fn new(
        timestamp: u64,
        nonce: impl Into<String>,
        method: &str,
        path: impl Into<String>,
        body: Option<&Value>,
    ) -> Self {
        Self {
            timestamp,
            nonce: nonce.into(),
            method: method.to_ascii_uppercase(),
            path: path.into(),
            body: canonical_body(body),
        }
    }

    /// Payload of a request as received on the wire.
    ///
    /// The body is parsed and re-serialized so the result matches what the
    /// sender signed with [`SignaturePayload::new`].
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::InvalidBody` for a non-empty body that is not JSON.
    pub fn from_raw_body(
        timestamp: u64,
        nonce: impl Into<String>,
        method: &str,
        path: impl Into<String>,
        raw_body: &[u8],
    ) -> Result<Self, SignatureError> {
        let body = if raw_body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_json::from_slice::<Value>(raw_body)
                    .map_err(|e| SignatureError::InvalidBody(e.to_string()))?,
            )
        };
        Ok(Self::new(timestamp, nonce, method, path, body.as_ref()))
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical body text (may be empty).
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for SignaturePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.timestamp, self.nonce, self.method, self.path, self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_concatenation_order() {
        let payload = SignaturePayload::new(
            1_700_000_000_000,
            "abc",
            "post",
            "/v1/accounts?limit=10",
            Some(&json!({"b": 1, "a": "x"})),
        );
        assert_eq!(
            payload.to_string(),
            r#"1700000000000abcPOST/v1/accounts?limit=10{"b":1,"a":"x"}"#
        );
    }

    #[test]
    fn test_falsy_bodies_are_empty() {
        for body in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert_eq!(canonical_body(Some(&body)), "", "{body}");
        }
        assert_eq!(canonical_body(None), "");
    }

    #[test]
    fn test_truthy_scalars_serialize() {
        assert_eq!(canonical_body(Some(&json!({}))), "{}");
        assert_eq!(canonical_body(Some(&json!([]))), "[]");
        assert_eq!(canonical_body(Some(&json!("x"))), "\"x\"");
        assert_eq!(canonical_body(Some(&json!(true))), "true");
    }

    #[test]
    fn test_raw_body_matches_value_body() {
        let value = json!({"amount": "10.5", "idempotencyKey": "k-1", "nested": {"z": 1, "y": 2}});
        let raw = serde_json::to_vec(&value).unwrap();
        let from_value = SignaturePayload::new(1, "n", "POST", "/x", Some(&value));
        let from_raw = SignaturePayload::from_raw_body(1, "n", "POST", "/x", &raw).unwrap();
        assert_eq!(from_value, from_raw);
    }

    #[test]
    fn test_raw_body_whitespace_formatting_is_canonicalized() {
        let raw = b"{ \"a\" : 1,\n \"b\" : [1, 2] }";
        let payload = SignaturePayload::from_raw_body(1, "n", "PUT", "/x", raw).unwrap();
        assert_eq!(payload.body(), r#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn test_empty_raw_body() {
        let payload = SignaturePayload::from_raw_body(5, "n", "get", "/x", b"").unwrap();
        assert_eq!(payload.to_string(), "5nGET/x");
    }

    #[test]
    fn test_non_json_raw_body_rejected() {
        let err = SignaturePayload::from_raw_body(5, "n", "POST", "/x", b"amount=1").unwrap_err();
        assert!(matches!(err, SignatureError::InvalidBody(_)));
    }
}
