//! # OpenAPI Documents
//!
//! Loading of OpenAPI 3.x documents from YAML or JSON, either from disk or
//! from memory.

use crate::domain::errors::SchemaError;
use jsonschema::Draft;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Where the root OpenAPI document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenApiSource {
    /// Document on disk; relative `$ref`s resolve against its directory.
    Path(PathBuf),
    /// In-memory document; relative `$ref`s resolve against `base_dir`.
    Inline { text: String, base_dir: PathBuf },
}

impl OpenApiSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn inline(text: impl Into<String>) -> Self {
        Self::Inline {
            text: text.into(),
            base_dir: PathBuf::from("."),
        }
    }
}

/// Supported OpenAPI versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenApiVersion {
    /// 3.0.x: schemas are a JSON Schema Draft 4/7 dialect with `nullable`
    V3_0,
    /// 3.1.x: schemas are plain JSON Schema 2020-12
    V3_1,
}

impl OpenApiVersion {
    /// Detect from the `openapi` field.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvalidDocument` for a missing field or a version other
    /// than 3.0/3.1.
    pub fn detect(document: &Value) -> Result<Self, SchemaError> {
        let version = document
            .get("openapi")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidDocument("missing `openapi` version field".into()))?;
        if version.starts_with("3.0") {
            Ok(Self::V3_0)
        } else if version.starts_with("3.1") {
            Ok(Self::V3_1)
        } else {
            Err(SchemaError::InvalidDocument(format!(
                "unsupported OpenAPI version {version}"
            )))
        }
    }

    /// JSON Schema draft response schemas are compiled with.
    #[must_use]
    pub fn draft(self) -> Draft {
        match self {
            Self::V3_0 => Draft::Draft7,
            Self::V3_1 => Draft::Draft202012,
        }
    }
}

/// Parse document text. JSON is tried first for `.json` names, YAML otherwise.
///
/// # Errors
///
/// `SchemaError::Parse` if the text is neither.
pub fn parse_document(text: &str, source_name: &str) -> Result<Value, SchemaError> {
    let parse_error = |reason: String| SchemaError::Parse {
        source_name: source_name.to_string(),
        reason,
    };
    if source_name.ends_with(".json") {
        serde_json::from_str(text).map_err(|e| parse_error(e.to_string()))
    } else {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
        yaml_to_json(yaml).map_err(parse_error)
    }
}

/// YAML allows non-string mapping keys (`200:` is an integer); JSON does not.
/// Scalar keys are stringified, anything else is rejected.
fn yaml_to_json(yaml: serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;
    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("number {n} has no JSON representation"))?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported mapping key {other:?}")),
                };
                map.insert(key, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// Read and parse a document from disk.
///
/// # Errors
///
/// `SchemaError::Io` or `SchemaError::Parse`.
pub fn read_document(path: &Path) -> Result<Value, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_document(&text, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_detection() {
        assert_eq!(OpenApiVersion::detect(&json!({"openapi": "3.0.3"})), Ok(OpenApiVersion::V3_0));
        assert_eq!(OpenApiVersion::detect(&json!({"openapi": "3.1.0"})), Ok(OpenApiVersion::V3_1));
        assert!(OpenApiVersion::detect(&json!({"swagger": "2.0"})).is_err());
        assert!(OpenApiVersion::detect(&json!({"openapi": "4.0.0"})).is_err());
    }

    #[test]
    fn test_yaml_and_json_parse() {
        let yaml = parse_document("openapi: 3.0.0\npaths: {}\n", "api.yaml").unwrap();
        let json = parse_document(r#"{"openapi": "3.0.0", "paths": {}}"#, "api.json").unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn test_integer_response_codes_become_strings() {
        let doc = parse_document("responses:\n  200:\n    description: ok\n", "api.yml").unwrap();
        assert_eq!(doc, json!({"responses": {"200": {"description": "ok"}}}));
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = parse_document("{not json", "broken.json").unwrap_err();
        assert!(matches!(err, SchemaError::Parse { ref source_name, .. } if source_name == "broken.json"));
    }
}
