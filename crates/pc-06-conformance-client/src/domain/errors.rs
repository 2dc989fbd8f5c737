//! # Client Errors
//!
//! Failures that stop a single exchange. Responses that merely violate the
//! provider contract are not errors; they become
//! [`ConformanceFinding`](crate::domain::finding::ConformanceFinding)s.

use pc_01_request_signing::SignatureError;
use pc_04_schema_validation::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The provider base URL does not parse.
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The HTTP method is not a valid token.
    #[error("invalid http method {0}")]
    InvalidMethod(String),

    /// The underlying HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    HttpClient(String),

    /// Signing the outbound request failed.
    #[error("signing failed: {0}")]
    Signing(#[from] SignatureError),

    /// The request never produced a response.
    #[error("{method} {url} failed: {reason}")]
    Transport {
        method: String,
        url: String,
        reason: String,
    },

    /// Schema lookup failed, or the response failed validation in strict mode.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_is_transparent() {
        let error = ClientError::from(SchemaError::MissingValidator {
            method: "GET".into(),
            url: "/v1/vaults".into(),
        });
        assert_eq!(error.to_string(), "missing validator for GET /v1/vaults");
    }
}
