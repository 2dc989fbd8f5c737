//! # Idempotency Errors
//!
//! Both variants signal misuse of the store's `add`/`reply` contract by the
//! handler layer, not a client error.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdempotencyError {
    /// `add` was called for a key that already has a recorded outcome.
    #[error("idempotent request with key {key} already exists")]
    IdempotentRequestAlreadyExists { key: String },

    /// `reply` was called for a key without a recorded outcome.
    #[error("no previous idempotent request with key {key}")]
    NoPreviousIdempotentRequest { key: String },

    /// The request carries no `idempotencyKey` string field.
    #[error("request has no idempotency key")]
    MissingKey,
}
