//! # Request Signing Subsystem (PC-01)
//!
//! The canonical signature protocol executed by both the conformance client
//! and the mock gateway.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): canonical payload, configuration, errors
//! - **Ports Layer** (`ports/`): [`RequestSigningApi`]
//! - **Service Layer** (`service.rs`): [`SignatureProtocol`]
//!
//! ## Example
//!
//! ```
//! use pc_01_request_signing::{SignaturePayload, SignatureProtocol, SigningConfig};
//!
//! let protocol = SignatureProtocol::new(SigningConfig::with_key("secret")).unwrap();
//! let signature = protocol
//!     .build_request_signature("GET", "/v1/accounts", None, 1_700_000_000_000, "n-1")
//!     .unwrap();
//!
//! let received = SignaturePayload::new(1_700_000_000_000, "n-1", "GET", "/v1/accounts", None);
//! assert!(protocol.verify_signature(&received, &signature).unwrap());
//! ```

pub mod domain;
pub mod headers;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::config::SigningConfig;
pub use domain::errors::SignatureError;
pub use domain::payload::{canonical_body, SignaturePayload};
pub use headers::SignedHeaders;
pub use ports::inbound::RequestSigningApi;
pub use service::SignatureProtocol;
