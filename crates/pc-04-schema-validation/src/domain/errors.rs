//! # Schema Validation Errors
//!
//! A response that fails its schema is a conformance finding
//! ([`SchemaError::ResponseSchemaValidationFailed`]); every other variant is a
//! configuration or setup problem.

use crate::domain::outcome::SchemaViolation;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// An OpenAPI document could not be read.
    #[error("failed to read {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// An OpenAPI document is not valid YAML/JSON.
    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// The document parsed but is not a usable OpenAPI 3.x document.
    #[error("invalid OpenAPI document: {0}")]
    InvalidDocument(String),

    /// A `$ref` points at nothing.
    #[error("unresolved reference {reference}")]
    UnresolvedReference { reference: String },

    /// A `$ref` chain leads back to itself.
    #[error("cyclic reference {reference}")]
    CyclicReference { reference: String },

    /// A response schema does not compile.
    #[error("schema for {method} {url} does not compile: {reason}")]
    SchemaCompilation {
        method: String,
        url: String,
        reason: String,
    },

    /// No validator is indexed for the operation.
    #[error("missing validator for {method} {url}")]
    MissingValidator { method: String, url: String },

    /// A concrete response failed its compiled schema.
    #[error("response of {method} {url} failed schema validation: {error}")]
    ResponseSchemaValidationFailed {
        method: String,
        url: String,
        response: Value,
        error: SchemaViolation,
    },

    /// The validator index is still being built.
    #[error("schema validators are not ready")]
    NotReady,

    /// The build task ended without publishing an index.
    #[error("schema build aborted")]
    BuildAborted,
}
