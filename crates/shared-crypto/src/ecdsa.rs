//! # ECDSA Signer (P-256, secp256k1)
//!
//! ECDSA over SHA-256 with DER-encoded (`ECDSA-Sig-Value`) signatures. The
//! curve is detected from the key.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - SHA-256 only: the signing hardware on the provider side supports no other
//!   digest, so any other hash is rejected before a key is even loaded

use crate::errors::CryptoError;
use crate::keys::{ec_signing_key, ec_verifying_key, EcSigningKey, EcVerifyingKey, KeyMaterial};
use k256::ecdsa::signature::{Signer, Verifier};
use shared_types::{HashAlgorithm, SigningAlgorithm};

/// Reject every hash but SHA-256.
///
/// # Errors
///
/// Returns `CryptoError::AlgorithmNotSupported`.
pub fn ensure_supported(hash: HashAlgorithm) -> Result<(), CryptoError> {
    if SigningAlgorithm::Ecdsa.supports(hash) {
        Ok(())
    } else {
        Err(CryptoError::AlgorithmNotSupported {
            algorithm: SigningAlgorithm::Ecdsa,
            hash,
        })
    }
}

/// Sign `payload`; returns the DER signature.
///
/// # Errors
///
/// - `CryptoError::AlgorithmNotSupported` for a non-SHA-256 hash
/// - `CryptoError::InvalidKey` / `CryptoError::KeyTypeMismatch` for unusable keys
pub fn sign(
    payload: &[u8],
    key: &KeyMaterial,
    hash: HashAlgorithm,
) -> Result<Vec<u8>, CryptoError> {
    ensure_supported(hash)?;
    let der = match ec_signing_key(key)? {
        EcSigningKey::P256(signing_key) => {
            let signature: p256::ecdsa::Signature = signing_key
                .try_sign(payload)
                .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
            signature.to_der().as_bytes().to_vec()
        }
        EcSigningKey::K256(signing_key) => {
            let signature: k256::ecdsa::Signature = signing_key
                .try_sign(payload)
                .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
            signature.to_der().as_bytes().to_vec()
        }
    };
    Ok(der)
}

/// Verify a DER signature. Mismatches and undecodable DER are `Ok(false)`.
///
/// # Errors
///
/// - `CryptoError::AlgorithmNotSupported` for a non-SHA-256 hash
/// - `CryptoError::InvalidKey` / `CryptoError::KeyTypeMismatch` for unusable keys
pub fn verify(
    payload: &[u8],
    key: &KeyMaterial,
    signature: &[u8],
    hash: HashAlgorithm,
) -> Result<bool, CryptoError> {
    ensure_supported(hash)?;
    let verified = match ec_verifying_key(key)? {
        EcVerifyingKey::P256(verifying_key) => p256::ecdsa::Signature::from_der(signature)
            .map(|sig| verifying_key.verify(payload, &sig).is_ok()),
        EcVerifyingKey::K256(verifying_key) => k256::ecdsa::Signature::from_der(signature)
            .map(|sig| verifying_key.verify(payload, &sig).is_ok()),
    };
    Ok(verified.unwrap_or(false))
}
