//! # Signer
//!
//! Closed set of signature schemes, selected by [`SigningAlgorithm`].
//!
//! `sign` produces raw signature bytes over the UTF-8 payload; `verify`
//! answers `Ok(false)` for any mismatch (payload, key, hash) and reserves
//! `Err` for unusable keys and unsupported algorithm/hash pairs.

use crate::errors::CryptoError;
use crate::keys::KeyMaterial;
use crate::{ecdsa, mac, rsa_pkcs1};
use shared_types::{HashAlgorithm, SigningAlgorithm};

/// A signature scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signer {
    /// HMAC with a shared secret.
    Hmac,
    /// RSASSA-PKCS1-v1_5.
    Rsa,
    /// ECDSA, SHA-256 only.
    Ecdsa,
}

impl Signer {
    /// Signer implementing `algorithm`.
    #[must_use]
    pub const fn for_algorithm(algorithm: SigningAlgorithm) -> Self {
        match algorithm {
            SigningAlgorithm::Hmac => Signer::Hmac,
            SigningAlgorithm::Rsa => Signer::Rsa,
            SigningAlgorithm::Ecdsa => Signer::Ecdsa,
        }
    }

    /// Algorithm tag of this signer.
    #[must_use]
    pub const fn algorithm(&self) -> SigningAlgorithm {
        match self {
            Signer::Hmac => SigningAlgorithm::Hmac,
            Signer::Rsa => SigningAlgorithm::Rsa,
            Signer::Ecdsa => SigningAlgorithm::Ecdsa,
        }
    }

    /// Sign `payload`.
    ///
    /// # Errors
    ///
    /// - `CryptoError::AlgorithmNotSupported` for ECDSA with a non-SHA-256 hash
    /// - `CryptoError::InvalidKey` / `CryptoError::KeyTypeMismatch` for unusable keys
    pub fn sign(
        &self,
        payload: &str,
        key: &KeyMaterial,
        hash: HashAlgorithm,
    ) -> Result<Vec<u8>, CryptoError> {
        match self {
            Signer::Hmac => mac::sign(payload.as_bytes(), key, hash),
            Signer::Rsa => rsa_pkcs1::sign(payload.as_bytes(), key, hash),
            Signer::Ecdsa => ecdsa::sign(payload.as_bytes(), key, hash),
        }
    }

    /// Verify `signature` over `payload`.
    ///
    /// # Errors
    ///
    /// Same as [`Signer::sign`]; a signature that does not match is `Ok(false)`.
    pub fn verify(
        &self,
        payload: &str,
        key: &KeyMaterial,
        signature: &[u8],
        hash: HashAlgorithm,
    ) -> Result<bool, CryptoError> {
        let verified = match self {
            Signer::Hmac => mac::verify(payload.as_bytes(), key, signature, hash),
            Signer::Rsa => rsa_pkcs1::verify(payload.as_bytes(), key, signature, hash),
            Signer::Ecdsa => ecdsa::verify(payload.as_bytes(), key, signature, hash),
        }?;
        if !verified {
            tracing::debug!(algorithm = %self.algorithm(), hash = %hash, "Signature mismatch");
        }
        Ok(verified)
    }
}

impl From<SigningAlgorithm> for Signer {
    fn from(algorithm: SigningAlgorithm) -> Self {
        Signer::for_algorithm(algorithm)
    }
}
