//! # Signed Request Headers
//!
//! Builds the four `X-FBAPI-*` headers for an outbound request: a fresh UUID
//! v4 nonce, the current time in milliseconds, and the protocol signature.

use crate::domain::errors::SignatureError;
use crate::service::SignatureProtocol;
use serde_json::Value;
use shared_types::{SecurityHeaders, SystemTimeSource, TimeSource};
use uuid::Uuid;

/// Builder for [`SecurityHeaders`].
pub struct SignedHeaders<'a> {
    protocol: &'a SignatureProtocol,
    api_key: String,
    nonce: Option<String>,
    timestamp: Option<u64>,
    time_source: &'a dyn TimeSource,
}

impl<'a> SignedHeaders<'a> {
    pub fn new(protocol: &'a SignatureProtocol, api_key: impl Into<String>) -> Self {
        Self {
            protocol,
            api_key: api_key.into(),
            nonce: None,
            timestamp: None,
            time_source: &SystemTimeSource,
        }
    }

    /// Use a fixed nonce instead of a random one.
    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Use a fixed timestamp instead of the current time.
    #[must_use]
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn time_source(mut self, time_source: &'a dyn TimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    /// Sign the request and return its headers.
    ///
    /// # Errors
    ///
    /// Propagates signer failures.
    pub fn generate(
        self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<SecurityHeaders, SignatureError> {
        let nonce = self.nonce.unwrap_or_else(|| Uuid::new_v4().to_string());
        let timestamp = self.timestamp.unwrap_or_else(|| self.time_source.now_ms());
        let signature = self
            .protocol
            .build_request_signature(method, path, body, timestamp, &nonce)?;
        Ok(SecurityHeaders {
            api_key: self.api_key,
            nonce,
            timestamp,
            signature,
        })
    }
}
