//! # Validator Index
//!
//! Compiled response validators keyed by `(METHOD, route template)`.
//!
//! ## Schema Selection
//!
//! For each operation the success response schema is taken from `200`, then
//! `201`. Within a response, `application/json` content wins, otherwise the
//! first media type with a schema. Operations without either get the
//! permissive schema `{}`.

use crate::domain::document::{read_document, parse_document, OpenApiSource, OpenApiVersion};
use crate::domain::errors::SchemaError;
use crate::domain::normalize::{normalize_template, openapi30_to_draft7};
use crate::domain::outcome::{SchemaViolation, ValidationOutcome};
use crate::domain::resolver::{pointer_token, RefResolver};
use jsonschema::{Draft, Validator};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// HTTP methods that carry operations in a path item.
const OPERATION_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Response codes tried in order.
const SUCCESS_CODES: [&str; 2] = ["200", "201"];

const JSON_MEDIA_TYPE: &str = "application/json";

/// Lookup key of a validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: String,
    pub template: String,
}

impl RouteKey {
    /// Key with an uppercased method and a `:param` template.
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            template: normalize_template(url),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.template)
    }
}

/// One compiled response schema.
pub struct CompiledValidator {
    schema: Value,
    validator: Validator,
}

impl CompiledValidator {
    /// Compile `schema` with `draft`.
    ///
    /// # Errors
    ///
    /// `SchemaError::SchemaCompilation` naming the route.
    pub fn compile(route: &RouteKey, schema: Value, draft: Draft) -> Result<Self, SchemaError> {
        let validator = jsonschema::options()
            .with_draft(draft)
            .build(&schema)
            .map_err(|e| SchemaError::SchemaCompilation {
                method: route.method.clone(),
                url: route.template.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { schema, validator })
    }

    /// The schema as compiled.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validate `payload`, reporting the first violation.
    pub fn validate(&self, payload: &Value) -> ValidationOutcome {
        match self.validator.iter_errors(payload).next() {
            None => ValidationOutcome::valid(),
            Some(error) => ValidationOutcome::invalid(SchemaViolation::from_error(&error, &self.schema)),
        }
    }
}

impl fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// All compiled validators of one OpenAPI document.
#[derive(Debug, Default)]
pub struct ValidatorIndex {
    validators: HashMap<RouteKey, CompiledValidator>,
}

impl ValidatorIndex {
    /// Load, resolve and compile a document. Blocking; does file I/O.
    ///
    /// Only references reachable from operation responses are resolved; an
    /// unused component (recursive or not) does not affect the index.
    ///
    /// # Errors
    ///
    /// Any loading, resolution or compilation [`SchemaError`].
    pub fn load(source: &OpenApiSource) -> Result<Self, SchemaError> {
        let (root_path, root) = match source {
            OpenApiSource::Path(path) => (path.clone(), read_document(path)?),
            OpenApiSource::Inline { text, base_dir } => {
                (base_dir.join("<inline>"), parse_document(text, "<inline>")?)
            }
        };
        let pointers = response_pointers(&root);
        let document = RefResolver::new(root_path.clone(), root).resolve_at(&root_path, &pointers)?;
        Self::from_document(&document)
    }

    /// Compile every operation of an already resolved document.
    ///
    /// # Errors
    ///
    /// - `SchemaError::InvalidDocument` without a version or `paths`
    /// - `SchemaError::SchemaCompilation` for the first failing schema
    pub fn from_document(document: &Value) -> Result<Self, SchemaError> {
        let version = OpenApiVersion::detect(document)?;
        let paths = document
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| SchemaError::InvalidDocument("missing `paths` object".into()))?;

        let mut index = Self::default();
        for (template, item) in paths {
            for method in OPERATION_METHODS {
                let Some(operation) = item.get(method) else {
                    continue;
                };
                let route = RouteKey::new(method, template);
                let mut schema = success_schema(operation);
                if version == OpenApiVersion::V3_0 {
                    openapi30_to_draft7(&mut schema);
                }
                let compiled = CompiledValidator::compile(&route, schema, version.draft())?;
                debug!(route = %route, "Compiled response validator");
                index.validators.insert(route, compiled);
            }
        }
        info!(operations = index.len(), ?version, "Schema validator index built");
        Ok(index)
    }

    /// Register a validator directly.
    ///
    /// # Errors
    ///
    /// `SchemaError::SchemaCompilation` if `schema` does not compile.
    pub fn insert(&mut self, method: &str, url: &str, schema: Value, draft: Draft) -> Result<(), SchemaError> {
        let route = RouteKey::new(method, url);
        let compiled = CompiledValidator::compile(&route, schema, draft)?;
        self.validators.insert(route, compiled);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, method: &str, url: &str) -> Option<&CompiledValidator> {
        self.validators.get(&RouteKey::new(method, url))
    }

    /// Validate a response of `method url`.
    ///
    /// # Errors
    ///
    /// `SchemaError::MissingValidator` when the operation is not indexed.
    pub fn validate(&self, method: &str, url: &str, payload: &Value) -> Result<ValidationOutcome, SchemaError> {
        let route = RouteKey::new(method, url);
        let validator = self
            .validators
            .get(&route)
            .ok_or_else(|| SchemaError::MissingValidator {
                method: route.method.clone(),
                url: route.template.clone(),
            })?;
        Ok(validator.validate(payload))
    }

    /// Like [`ValidatorIndex::validate`], with a failed validation as an error.
    ///
    /// # Errors
    ///
    /// `SchemaError::ResponseSchemaValidationFailed` carrying the response.
    pub fn ensure_valid(&self, method: &str, url: &str, payload: &Value) -> Result<(), SchemaError> {
        let outcome = self.validate(method, url, payload)?;
        match outcome.error {
            None => Ok(()),
            Some(error) => Err(SchemaError::ResponseSchemaValidationFailed {
                method: method.to_ascii_uppercase(),
                url: url.to_string(),
                response: payload.clone(),
                error,
            }),
        }
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteKey> {
        self.validators.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

/// JSON pointers to the `responses` of every operation, or to the whole
/// path item when it is itself a `$ref`.
fn response_pointers(document: &Value) -> Vec<String> {
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };
    let mut pointers = Vec::new();
    for (template, item) in paths {
        let base = format!("/paths/{}", pointer_token(template));
        if item.get("$ref").is_some() {
            pointers.push(base);
            continue;
        }
        for method in OPERATION_METHODS {
            if item.get(method).and_then(|operation| operation.get("responses")).is_some() {
                pointers.push(format!("{base}/{method}/responses"));
            }
        }
    }
    pointers
}

/// Success response schema of an operation, or `{}`.
fn success_schema(operation: &Value) -> Value {
    let Some(responses) = operation.get("responses") else {
        return json!({});
    };
    SUCCESS_CODES
        .iter()
        .find_map(|code| responses.get(*code))
        .and_then(|response| response.get("content"))
        .and_then(Value::as_object)
        .and_then(|content| {
            content
                .get(JSON_MEDIA_TYPE)
                .and_then(|media| media.get("schema"))
                .or_else(|| content.values().find_map(|media| media.get("schema")))
        })
        .cloned()
        .unwrap_or_else(|| json!({}))
}
