//! # Replay Guard Subsystem (PC-02)
//!
//! Rejects requests whose timestamp is stale or whose `(API key, nonce)` pair
//! was already accepted.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): [`ReplayPolicy`], [`NonceRegistry`], [`ReplayError`]
//! - **Service Layer** (`service.rs`): [`ReplayGuard`]
//! - **Port**: [`shared_types::TimeSource`], injected so tests control "now"
//!
//! ## Security Notes
//!
//! - Clock skew beyond the TTL is indistinguishable from a replay and is
//!   rejected the same way.
//! - The registry is an owned object with TTL eviction, not process-global
//!   state; one guard per gateway instance.

pub mod domain;
pub mod service;

// Re-export public API
pub use domain::errors::ReplayError;
pub use domain::policy::ReplayPolicy;
pub use domain::registry::NonceRegistry;
pub use service::ReplayGuard;
