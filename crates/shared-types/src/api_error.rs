//! # Client-Visible Error Body
//!
//! Request-level rejections are reported to the caller as
//! `{ message, errorType, propertyName?, requestPart? }`. Conformance tests
//! assert on `errorType`, `propertyName` and `requestPart`, so those values are
//! part of the wire contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable classification of a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorType {
    /// A required header is absent.
    MissingHeader,
    /// A header value is malformed.
    InvalidHeader,
    /// The API key is unknown.
    Unauthorized,
    /// The timestamp is outside the accepted window.
    ExpiredTimestamp,
    /// The nonce was already used with this API key.
    UsedNonce,
    /// The nonce is empty or otherwise unusable.
    InvalidNonce,
    /// The signature does not match the request.
    InvalidSignature,
    /// An idempotency key was reused with a different request.
    UsedIdempotencyKey,
    /// The request body does not match its declared shape.
    SchemaError,
    /// Unexpected server-side failure.
    InternalError,
}

impl ErrorType {
    /// Wire string of this error type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorType::MissingHeader => "missing-header",
            ErrorType::InvalidHeader => "invalid-header",
            ErrorType::Unauthorized => "unauthorized",
            ErrorType::ExpiredTimestamp => "expired-timestamp",
            ErrorType::UsedNonce => "used-nonce",
            ErrorType::InvalidNonce => "invalid-nonce",
            ErrorType::InvalidSignature => "invalid-signature",
            ErrorType::UsedIdempotencyKey => "used-idempotency-key",
            ErrorType::SchemaError => "schema-error",
            ErrorType::InternalError => "internal-error",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part of the HTTP request the violated property lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPart {
    Headers,
    Querystring,
    Body,
}

/// Structured error body returned with 4xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub message: String,
    pub error_type: ErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_part: Option<RequestPart>,
}

impl ApiErrorBody {
    /// Create an error body without a property reference.
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type,
            property_name: None,
            request_part: None,
        }
    }

    /// Attach the violated property and where it lives.
    #[must_use]
    pub fn at(mut self, part: RequestPart, property: impl Into<String>) -> Self {
        self.request_part = Some(part);
        self.property_name = Some(property.into());
        self
    }

    /// Error for a header-owned failure.
    pub fn header(error_type: ErrorType, header: &str, message: impl Into<String>) -> Self {
        Self::new(error_type, message).at(RequestPart::Headers, header)
    }

    /// Error returned when an idempotency key is replayed with a different body.
    #[must_use]
    pub fn used_idempotency_key() -> Self {
        Self::new(
            ErrorType::UsedIdempotencyKey,
            "Idempotency key was already used with a different request",
        )
        .at(RequestPart::Body, "idempotencyKey")
    }

    /// Serialize to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "message": self.message, "errorType": self.error_type })
        })
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_type, self.message)
    }
}
