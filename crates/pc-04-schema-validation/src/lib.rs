//! # Schema Validation Subsystem (PC-04)
//!
//! Checks provider responses against the success response schemas declared
//! in an OpenAPI 3.x document.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): document loading, [`RefResolver`],
//!   OpenAPI normalisation, [`ValidatorIndex`], [`ValidationOutcome`]
//! - **Ports Layer** (`ports/`): [`ResponseValidationApi`]
//! - **Service Layer** (`service.rs`): [`ResponseValidator`], the two-phase
//!   build/ready wrapper
//!
//! ## Usage
//!
//! ```ignore
//! use pc_04_schema_validation::{OpenApiSource, ResponseValidator};
//!
//! let validator = ResponseValidator::spawn(OpenApiSource::path("openapi.yaml"));
//! let outcome = validator.validate("GET", "/v1/accounts/:id", &body).await?;
//! ```

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::document::{parse_document, OpenApiSource, OpenApiVersion};
pub use domain::errors::SchemaError;
pub use domain::index::{CompiledValidator, RouteKey, ValidatorIndex};
pub use domain::normalize::{normalize_template, openapi30_to_draft7};
pub use domain::outcome::{SchemaViolation, ValidationOutcome};
pub use domain::resolver::RefResolver;
pub use ports::inbound::ResponseValidationApi;
pub use service::{BuildState, ResponseValidator};
