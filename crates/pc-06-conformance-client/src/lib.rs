//! # Conformance Client (PC-06)
//!
//! The outbound half of the harness: signs requests exactly as a provider
//! expects, sends them, and checks what comes back.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): [`ApiRequest`]/[`ApiResponse`],
//!   [`Probe`]s, [`ConformanceFinding`]s, [`ClientError`]
//! - **Client** (`client.rs`): [`ConformanceClient`] over `reqwest`
//!
//! ## Usage
//!
//! ```ignore
//! use pc_06_conformance_client::{ApiRequest, ClientConfig, ConformanceClient, Probe};
//!
//! let client = ConformanceClient::new(ClientConfig::new("http://127.0.0.1:8000", "key"), protocol)?
//!     .with_validator(validator);
//! let response = client.send(&ApiRequest::get("/v1/vaults?limit=10")).await?;
//! let report = client.probe(Probe::ReplayedNonce, &ApiRequest::get("/v1/vaults")).await?;
//! for finding in client.take_findings() {
//!     println!("{finding}");
//! }
//! ```

pub mod client;
pub mod domain;

// Re-export public API
pub use client::{ClientConfig, ConformanceClient};
pub use domain::{
    ApiRequest, ApiResponse, ClientError, ConformanceFinding, FindingKind, Probe, ProbeReport,
};
