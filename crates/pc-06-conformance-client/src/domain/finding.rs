//! # Conformance Findings
//!
//! A finding is one observed deviation from the provider contract. The
//! client collects them over a run so a single bad response does not hide
//! the rest.

use pc_04_schema_validation::SchemaViolation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What kind of deviation was observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FindingKind {
    /// A success response does not match its OpenAPI schema.
    SchemaViolation { violation: SchemaViolation },
    /// A probe got a different HTTP status than the protocol requires.
    UnexpectedStatus { expected: u16, actual: u16 },
    /// A probe was rejected with the right status but the wrong `errorType`.
    UnexpectedErrorType {
        expected: String,
        actual: Option<String>,
    },
}

/// One deviation, tied to the exchange that exposed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConformanceFinding {
    pub method: String,
    /// Concrete request path including the query string.
    pub path: String,
    pub status: u16,
    #[serde(flatten)]
    pub kind: FindingKind,
    /// Response body as received.
    pub response: Value,
}

impl ConformanceFinding {
    pub fn new(method: &str, path: &str, status: u16, kind: FindingKind, response: Value) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            status,
            kind,
            response,
        }
    }

    /// Whether this finding is a schema violation.
    #[must_use]
    pub fn is_schema_violation(&self) -> bool {
        matches!(self.kind, FindingKind::SchemaViolation { .. })
    }
}

impl fmt::Display for ConformanceFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}: ", self.method, self.path, self.status)?;
        match &self.kind {
            FindingKind::SchemaViolation { violation } => write!(f, "schema violation ({violation})"),
            FindingKind::UnexpectedStatus { expected, actual } => {
                write!(f, "expected status {expected}, got {actual}")
            }
            FindingKind::UnexpectedErrorType { expected, actual } => write!(
                f,
                "expected errorType {expected}, got {}",
                actual.as_deref().unwrap_or("none")
            ),
        }
    }
}
