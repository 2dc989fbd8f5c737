//! # Replay Errors

use shared_types::{NONCE_HEADER, TIMESTAMP_HEADER};
use thiserror::Error;

/// Reasons a request is rejected as a (potential) replay.
///
/// When several apply, the most specific one is reported, in declaration
/// order: a malformed nonce before a reused nonce before a stale timestamp.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The nonce is empty.
    #[error("nonce is missing or empty")]
    MissingNonce,

    /// The nonce was already accepted for this API key.
    #[error("nonce {nonce} has already been used")]
    NonceReused { nonce: String },

    /// The timestamp is older than the request TTL.
    #[error("timestamp {timestamp} is too old (threshold: {threshold})")]
    TimestampExpired { timestamp: u64, threshold: u64 },

    /// The timestamp is further in the future than the allowed skew.
    #[error("timestamp {timestamp} is in the future (threshold: {threshold})")]
    TimestampFromFuture { timestamp: u64, threshold: u64 },
}

impl ReplayError {
    /// Header whose value caused the rejection.
    #[must_use]
    pub fn header(&self) -> &'static str {
        match self {
            ReplayError::MissingNonce | ReplayError::NonceReused { .. } => NONCE_HEADER,
            ReplayError::TimestampExpired { .. } | ReplayError::TimestampFromFuture { .. } => {
                TIMESTAMP_HEADER
            }
        }
    }
}
