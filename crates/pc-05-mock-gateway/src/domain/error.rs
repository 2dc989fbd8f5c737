//! Gateway errors and client-visible rejections.
//!
//! [`GatewayError`] covers setup and serving failures. [`Rejection`] is a
//! request that failed authentication; it becomes a 4xx response carrying an
//! [`ApiErrorBody`] that names the offending header or body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pc_01_request_signing::SignatureError;
use pc_02_replay_guard::ReplayError;
use shared_types::{
    ApiErrorBody, ErrorType, HeaderError, RequestPart, API_KEY_HEADER, SIGNATURE_HEADER,
};
use std::net::SocketAddr;
use thiserror::Error;

/// Gateway setup and serving errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid gateway configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Signing(#[from] SignatureError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(String),
}

/// A request refused by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl Rejection {
    fn bad_request(body: ApiErrorBody) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body,
        }
    }

    /// Unknown API key (401).
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ApiErrorBody::header(ErrorType::Unauthorized, API_KEY_HEADER, "Unknown API key"),
        }
    }

    /// Signature does not match the request.
    pub fn invalid_signature() -> Self {
        Self::bad_request(ApiErrorBody::header(
            ErrorType::InvalidSignature,
            SIGNATURE_HEADER,
            "Signature does not match the request",
        ))
    }

    /// Body is not JSON.
    pub fn invalid_body(reason: impl std::fmt::Display) -> Self {
        let mut body = ApiErrorBody::new(
            ErrorType::SchemaError,
            format!("Request body is not valid JSON: {reason}"),
        );
        body.request_part = Some(RequestPart::Body);
        Self::bad_request(body)
    }

    /// Body exceeds the configured limit (413).
    pub fn body_too_large(limit: usize) -> Self {
        let mut body = ApiErrorBody::new(
            ErrorType::SchemaError,
            format!("Request body exceeds {limit} bytes"),
        );
        body.request_part = Some(RequestPart::Body);
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            body,
        }
    }

    /// Unexpected failure while authenticating.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ApiErrorBody::new(ErrorType::InternalError, message),
        }
    }
}

impl From<HeaderError> for Rejection {
    fn from(error: HeaderError) -> Self {
        let error_type = match error {
            HeaderError::Missing(_) => ErrorType::MissingHeader,
            HeaderError::Invalid { .. } => ErrorType::InvalidHeader,
        };
        Self::bad_request(ApiErrorBody::header(error_type, error.header(), error.to_string()))
    }
}

impl From<ReplayError> for Rejection {
    fn from(error: ReplayError) -> Self {
        let error_type = match error {
            ReplayError::MissingNonce => ErrorType::InvalidNonce,
            ReplayError::NonceReused { .. } => ErrorType::UsedNonce,
            ReplayError::TimestampExpired { .. } | ReplayError::TimestampFromFuture { .. } => {
                ErrorType::ExpiredTimestamp
            }
        };
        Self::bad_request(ApiErrorBody::header(error_type, error.header(), error.to_string()))
    }
}

impl From<SignatureError> for Rejection {
    fn from(error: SignatureError) -> Self {
        match error {
            SignatureError::InvalidBody(reason) => Self::invalid_body(reason),
            SignatureError::MalformedSignature(_) => Self::invalid_signature(),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
