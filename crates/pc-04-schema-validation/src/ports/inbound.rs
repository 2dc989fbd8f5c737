//! # Inbound Ports

use crate::domain::errors::SchemaError;
use crate::domain::outcome::ValidationOutcome;
use async_trait::async_trait;
use serde_json::Value;

/// Response validation as seen by its callers.
#[async_trait]
pub trait ResponseValidationApi: Send + Sync {
    /// Validate a response, waiting for the validators to be built.
    ///
    /// # Errors
    ///
    /// `SchemaError::MissingValidator` for unindexed operations, or the build
    /// error if the index could not be built.
    async fn validate(&self, method: &str, url: &str, payload: &Value) -> Result<ValidationOutcome, SchemaError>;

    /// Validate without waiting; `SchemaError::NotReady` while building.
    ///
    /// # Errors
    ///
    /// As [`ResponseValidationApi::validate`], plus `SchemaError::NotReady`.
    fn try_validate(&self, method: &str, url: &str, payload: &Value) -> Result<ValidationOutcome, SchemaError>;
}
