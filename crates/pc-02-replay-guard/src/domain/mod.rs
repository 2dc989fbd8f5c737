//! # Domain Layer
//!
//! Freshness policy, nonce registry and their errors. Time is always passed
//! in; nothing here reads the clock.

pub mod errors;
pub mod policy;
pub mod registry;
