// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! PC-05 Mock Gateway - provider-side enforcement of the request
//! authentication protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    MOCK GATEWAY (pc-05)                  │
//! ├──────────────────────────────────────────────────────────┤
//! │   /health ─────────────────────────────► health check    │
//! │                                                          │
//! │   routes ──► SignatureAuth ──► handler ──► idempotent()  │
//! │                 │                              │         │
//! │                 ├─ ApiKeyRegistry              │         │
//! │                 ├─ ReplayGuard (pc-02)         │         │
//! │                 └─ SignatureProtocol (pc-01)   │         │
//! │                                  IdempotencyStore (pc-03)│
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use pc_05_mock_gateway::{GatewayConfig, MockGateway};
//!
//! let mut gateway = MockGateway::new(GatewayConfig::default().with_api_keys(["key"]), protocol)?;
//! let addr = gateway.start(routes).await?;
//! ```
//!
//! # Responses
//!
//! - 400 with `{message, errorType, propertyName, requestPart}` for missing or
//!   malformed headers, stale timestamps, reused nonces and bad signatures
//! - 401 for unknown API keys
//! - 413 for oversized bodies

pub mod domain;
pub mod idempotent;
pub mod middleware;
pub mod service;

pub use domain::{constant_time_compare, ApiKeyRegistry, GatewayConfig, GatewayError, Rejection};
pub use idempotent::{idempotent, replay_response, HttpResponseSink};
pub use middleware::{AuthenticatedRequest, SignatureAuthLayer};
pub use service::{GatewayState, MockGateway};
