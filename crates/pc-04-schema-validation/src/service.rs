//! # Response Validator Service
//!
//! Two-phase lifecycle around a [`ValidatorIndex`]:
//!
//! ```text
//! Building ──(index built)──► Ready(index)
//!     └─────(load error)────► Failed(error)
//! ```
//!
//! The build runs once, on a blocking thread, as soon as the validator is
//! created. [`ResponseValidator::validate`] waits for it to finish;
//! [`ResponseValidator::try_validate`] answers `SchemaError::NotReady`
//! instead. Handles are cheap to clone and share one build.

use crate::domain::document::OpenApiSource;
use crate::domain::errors::SchemaError;
use crate::domain::index::ValidatorIndex;
use crate::domain::outcome::ValidationOutcome;
use crate::ports::inbound::ResponseValidationApi;
use async_trait::async_trait;
use serde_json::Value;
use shared_types::SchemaSettings;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// Build state published to every handle.
#[derive(Debug, Clone)]
pub enum BuildState {
    Building,
    Ready(Arc<ValidatorIndex>),
    Failed(SchemaError),
}

impl BuildState {
    fn settled(&self) -> bool {
        !matches!(self, Self::Building)
    }

    fn index(&self) -> Result<Arc<ValidatorIndex>, SchemaError> {
        match self {
            Self::Building => Err(SchemaError::NotReady),
            Self::Ready(index) => Ok(index.clone()),
            Self::Failed(e) => Err(e.clone()),
        }
    }
}

/// Shared handle to the response validators of one OpenAPI document.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    state: watch::Receiver<BuildState>,
}

impl ResponseValidator {
    /// Start building validators for `source`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(source: OpenApiSource) -> Self {
        let (tx, rx) = watch::channel(BuildState::Building);
        tokio::spawn(async move {
            let built = tokio::task::spawn_blocking(move || ValidatorIndex::load(&source)).await;
            let state = match built {
                Ok(Ok(index)) => {
                    info!(operations = index.len(), "Response validators ready");
                    BuildState::Ready(Arc::new(index))
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Failed to build response validators");
                    BuildState::Failed(e)
                }
                Err(e) => {
                    error!(error = %e, "Response validator build task panicked");
                    BuildState::Failed(SchemaError::BuildAborted)
                }
            };
            // No receivers left means nobody is waiting
            let _ = tx.send(state);
        });
        Self { state: rx }
    }

    /// Start building from `schema.openapi_path`.
    ///
    /// # Errors
    ///
    /// `SchemaError::InvalidDocument` if no path is configured.
    pub fn from_settings(settings: &SchemaSettings) -> Result<Self, SchemaError> {
        let path = settings
            .openapi_path
            .clone()
            .ok_or_else(|| SchemaError::InvalidDocument("no OpenAPI document configured".into()))?;
        Ok(Self::spawn(OpenApiSource::Path(path)))
    }

    /// Validator over an already built index.
    pub fn ready(index: ValidatorIndex) -> Self {
        let (_tx, rx) = watch::channel(BuildState::Ready(Arc::new(index)));
        Self { state: rx }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), BuildState::Ready(_))
    }

    /// Wait for the build and return the index.
    ///
    /// # Errors
    ///
    /// The build error, or `SchemaError::BuildAborted`.
    pub async fn index(&self) -> Result<Arc<ValidatorIndex>, SchemaError> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(BuildState::settled)
            .await
            .map_err(|_| SchemaError::BuildAborted)?;
        settled.index()
    }

    /// The index if already built.
    ///
    /// # Errors
    ///
    /// `SchemaError::NotReady` while building, or the build error.
    pub fn try_index(&self) -> Result<Arc<ValidatorIndex>, SchemaError> {
        self.state.borrow().index()
    }

    /// Validate a response of `method url`, waiting for the build.
    ///
    /// # Errors
    ///
    /// See [`ValidatorIndex::validate`].
    pub async fn validate(&self, method: &str, url: &str, payload: &Value) -> Result<ValidationOutcome, SchemaError> {
        self.index().await?.validate(method, url, payload)
    }

    /// Validate without waiting.
    ///
    /// # Errors
    ///
    /// `SchemaError::NotReady` while building, otherwise see
    /// [`ValidatorIndex::validate`].
    pub fn try_validate(&self, method: &str, url: &str, payload: &Value) -> Result<ValidationOutcome, SchemaError> {
        self.try_index()?.validate(method, url, payload)
    }

    /// Validate and turn a failed validation into
    /// `SchemaError::ResponseSchemaValidationFailed`.
    ///
    /// # Errors
    ///
    /// See [`ValidatorIndex::ensure_valid`].
    pub async fn ensure_valid(&self, method: &str, url: &str, payload: &Value) -> Result<(), SchemaError> {
        self.index().await?.ensure_valid(method, url, payload)
    }
}

#[async_trait]
impl ResponseValidationApi for ResponseValidator {
    async fn validate(&self, method: &str, url: &str, payload: &Value) -> Result<ValidationOutcome, SchemaError> {
        ResponseValidator::validate(self, method, url, payload).await
    }

    fn try_validate(&self, method: &str, url: &str, payload: &Value) -> Result<ValidationOutcome, SchemaError> {
        ResponseValidator::try_validate(self, method, url, payload)
    }
}
