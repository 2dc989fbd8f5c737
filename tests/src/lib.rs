//! # Provider-Conformance Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── protocol_benchmarks.rs   # Sign/verify, codecs, schema validation
//! └── src/
//!     ├── fixtures.rs              # Keys, OpenAPI document, live provider
//!     └── integration/
//!         ├── e2e_choreography.rs  # client → gateway → idempotency → schema
//!         └── flows.rs             # configuration and protocol flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pc-tests
//!
//! # By category
//! cargo test -p pc-tests integration::e2e_choreography
//! cargo test -p pc-tests integration::flows
//!
//! # Benchmarks
//! cargo bench -p pc-tests
//! ```

pub mod fixtures;
pub mod integration;
