//! Crypto error types.

use shared_types::{Encoding, HashAlgorithm, SigningAlgorithm};
use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The signing algorithm cannot be paired with the hash.
    #[error("algorithm not supported: {algorithm} with {hash}")]
    AlgorithmNotSupported {
        /// Requested signing algorithm
        algorithm: SigningAlgorithm,
        /// Requested hash algorithm
        hash: HashAlgorithm,
    },

    /// Key material could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Key material parsed, but as the wrong kind of key.
    #[error("key type mismatch: expected {expected}, got {found}")]
    KeyTypeMismatch {
        /// Key kind the signer needs
        expected: &'static str,
        /// Key kind that was supplied
        found: &'static str,
    },

    /// The underlying signing primitive failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Codec selection and decode errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// The encoding tag does not name a codec.
    #[error("unsupported encoding format: {0}")]
    UnsupportedEncodingFormat(String),

    /// Input is not valid in the encoding's alphabet.
    #[error("invalid {encoding} input: {reason}")]
    InvalidInput {
        /// Encoding that rejected the input
        encoding: Encoding,
        /// Decoder message
        reason: String,
    },

    /// Decoding succeeded but the bytes are not UTF-8 text.
    #[error("decoded {0} bytes are not valid UTF-8")]
    InvalidUtf8(Encoding),
}

impl EncodingError {
    pub(crate) fn input(encoding: Encoding, reason: impl ToString) -> Self {
        EncodingError::InvalidInput {
            encoding,
            reason: reason.to_string(),
        }
    }
}
