//! Domain types for the mock gateway.

pub mod api_keys;
pub mod config;
pub mod error;

pub use api_keys::{constant_time_compare, ApiKeyRegistry};
pub use config::GatewayConfig;
pub use error::{GatewayError, Rejection};
