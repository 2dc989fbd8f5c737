//! # Signature Protocol Errors

use shared_crypto::{CryptoError, EncodingError};
use thiserror::Error;

/// Errors raised by the signature protocol.
///
/// A signature that simply does not match is not an error; see
/// [`crate::SignatureProtocol::verify_signature`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Signer failure: unusable key or unsupported algorithm/hash pair.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Signature text cannot be decoded with the configured post-encoding.
    #[error("malformed signature: {0}")]
    MalformedSignature(EncodingError),

    /// Request body is present but is not JSON.
    #[error("request body is not valid JSON: {0}")]
    InvalidBody(String),

    /// Key material could not be obtained from configuration.
    #[error("invalid signing configuration: {0}")]
    Config(String),
}
