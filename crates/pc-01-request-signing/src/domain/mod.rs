//! # Domain Layer
//!
//! Canonical payload construction and protocol configuration. No I/O.

pub mod config;
pub mod errors;
pub mod payload;
