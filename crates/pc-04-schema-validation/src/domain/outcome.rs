//! # Validation Outcome

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// First violated constraint of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaViolation {
    /// JSON pointer to the offending value (`""` for the root)
    pub instance_path: String,
    /// JSON pointer to the violated keyword inside the schema
    pub schema_path: String,
    /// Violated keyword (`required`, `type`, ...)
    pub keyword: String,
    /// Keyword details; `missingProperty` for `required`
    pub params: Value,
    pub message: String,
}

impl SchemaViolation {
    /// Build from a `jsonschema` error against the schema it was compiled from.
    pub(crate) fn from_error(error: &jsonschema::ValidationError<'_>, schema: &Value) -> Self {
        let schema_path = error.schema_path.to_string();
        let keyword = schema_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let mut params = Map::new();
        if let jsonschema::error::ValidationErrorKind::Required { property } = &error.kind {
            let name = property
                .as_str()
                .map_or_else(|| property.to_string(), str::to_string);
            params.insert("missingProperty".into(), Value::String(name));
        } else if let Some(expected) = schema.pointer(&schema_path) {
            params.insert(keyword.clone(), expected.clone());
        }

        Self {
            instance_path: error.instance_path.to_string(),
            schema_path,
            keyword,
            params: Value::Object(params),
            message: error.to_string(),
        }
    }

    /// `params.missingProperty`, for `required` violations.
    #[must_use]
    pub fn missing_property(&self) -> Option<&str> {
        self.params.get("missingProperty").and_then(Value::as_str)
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.instance_path.is_empty() {
            "/"
        } else {
            &self.instance_path
        };
        write!(f, "{at}: {} ({})", self.message, self.keyword)
    }
}

/// Result of validating one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SchemaViolation>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn invalid(error: SchemaViolation) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }

    /// Compact JSON form used in findings.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match &self.error {
            None => json!({"success": true}),
            Some(error) => json!({"success": false, "error": error}),
        }
    }
}
