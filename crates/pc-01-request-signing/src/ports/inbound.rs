//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::SignatureError;
use crate::domain::payload::SignaturePayload;
use serde_json::Value;

/// Request signing API shared by the client and the server side.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait RequestSigningApi: Send + Sync {
    /// Client side: sign a request and return the header-transportable text.
    ///
    /// `path` includes the raw query string.
    fn build_request_signature(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
        timestamp: u64,
        nonce: &str,
    ) -> Result<String, SignatureError>;

    /// Server side: check `signature_text` against the recomputed payload.
    ///
    /// A signature that does not match is `Ok(false)`.
    fn verify_signature(
        &self,
        payload: &SignaturePayload,
        signature_text: &str,
    ) -> Result<bool, SignatureError>;
}
