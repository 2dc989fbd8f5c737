//! # Shared Types Crate
//!
//! This crate contains the vocabulary every conformance subsystem speaks:
//! protocol tags, request header names, the client-visible error body, the
//! process configuration surface and the time source port.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Tags such as [`Encoding`] and
//!   [`SigningAlgorithm`] are closed enums parsed exactly once, at the edge.
//! - **Unknown Tags Are Errors**: Parsing an unrecognised tag yields a typed
//!   [`TagError`] rather than a silent default.
//! - **Wire Stability**: [`ApiErrorBody`] serializes with the camelCase field
//!   names conformance consumers assert on.

pub mod algorithms;
pub mod api_error;
pub mod config;
pub mod errors;
pub mod headers;
pub mod time;

pub use algorithms::{Encoding, HashAlgorithm, SigningAlgorithm};
pub use api_error::{ApiErrorBody, ErrorType, RequestPart};
pub use config::{
    ConformanceConfig, GatewaySettings, IdempotencySettings, ReplaySettings, SchemaSettings,
    SigningSettings,
};
pub use errors::{ConfigError, TagError};
pub use headers::{
    HeaderError, SecurityHeaders, API_KEY_HEADER, NONCE_HEADER, SECURITY_HEADERS,
    SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource, TimestampMs};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
