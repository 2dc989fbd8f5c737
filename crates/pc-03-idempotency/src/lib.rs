//! # Idempotency Subsystem (PC-03)
//!
//! Remembers the first outcome of every mutating request that carries an
//! `idempotencyKey` body field and replays it for identical retries.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): [`IdempotencyRecord`], [`IdempotencyError`]
//! - **Ports Layer** (`ports/`): [`ResponseSink`], where replies are written
//! - **Service Layer** (`service.rs`): [`IdempotencyStore`]
//!
//! ## Retry Semantics
//!
//! | Retry body            | Response                          |
//! |-----------------------|-----------------------------------|
//! | identical (any order) | original status and body          |
//! | different             | 400 `used-idempotency-key`        |
//!
//! The stored record is never overwritten.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::errors::IdempotencyError;
pub use domain::record::{idempotency_key, IdempotencyRecord, IDEMPOTENCY_KEY_FIELD};
pub use ports::outbound::{CapturedResponse, ResponseSink};
pub use service::{ExecutionOutcome, IdempotencyStore, CONFLICT_STATUS};
