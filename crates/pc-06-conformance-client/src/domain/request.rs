//! # Outbound Exchange Types

use serde_json::Value;

/// One request to the provider.
///
/// `template` is the OpenAPI path the response is validated against
/// (`/v1/vaults/{id}` or `/v1/vaults/:id`). It defaults to `path` without
/// its query string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub template: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: &str, path: impl Into<String>) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.into(),
            template: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new("POST", path).body(body)
    }

    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Operation path used for schema lookup.
    #[must_use]
    pub fn operation_path(&self) -> &str {
        self.template
            .as_deref()
            .unwrap_or_else(|| self.path.split('?').next().unwrap_or(&self.path))
    }
}

/// A provider response with its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `Value::Null` for an empty body.
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `errorType` of a structured rejection body.
    #[must_use]
    pub fn error_type(&self) -> Option<&str> {
        self.body.get("errorType").and_then(Value::as_str)
    }

    /// `propertyName` of a structured rejection body.
    #[must_use]
    pub fn property_name(&self) -> Option<&str> {
        self.body.get("propertyName").and_then(Value::as_str)
    }
}
