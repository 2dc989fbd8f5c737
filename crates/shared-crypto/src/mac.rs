//! # HMAC Signer
//!
//! Keyed hash over the UTF-8 payload. Verification recomputes the tag and
//! compares it with `Mac::verify_slice`, which is constant-time.

use crate::errors::CryptoError;
use crate::keys::KeyMaterial;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};
use sha3::Sha3_256;
use shared_types::HashAlgorithm;

/// Compute the HMAC tag of `payload`.
///
/// # Errors
///
/// Returns `CryptoError::KeyTypeMismatch` if `key` is a parsed asymmetric key.
pub fn sign(
    payload: &[u8],
    key: &KeyMaterial,
    hash: HashAlgorithm,
) -> Result<Vec<u8>, CryptoError> {
    let secret = key.secret_bytes()?;
    match hash {
        HashAlgorithm::Sha256 => tag::<Hmac<Sha256>>(secret, payload),
        HashAlgorithm::Sha512 => tag::<Hmac<Sha512>>(secret, payload),
        HashAlgorithm::Sha3_256 => tag::<Hmac<Sha3_256>>(secret, payload),
    }
}

/// Check an HMAC tag in constant time.
///
/// # Errors
///
/// Returns `CryptoError::KeyTypeMismatch` if `key` is a parsed asymmetric key.
pub fn verify(
    payload: &[u8],
    key: &KeyMaterial,
    signature: &[u8],
    hash: HashAlgorithm,
) -> Result<bool, CryptoError> {
    let secret = key.secret_bytes()?;
    match hash {
        HashAlgorithm::Sha256 => check::<Hmac<Sha256>>(secret, payload, signature),
        HashAlgorithm::Sha512 => check::<Hmac<Sha512>>(secret, payload, signature),
        HashAlgorithm::Sha3_256 => check::<Hmac<Sha3_256>>(secret, payload, signature),
    }
}

fn keyed<M: Mac + KeyInit>(secret: &[u8], payload: &[u8]) -> Result<M, CryptoError> {
    let mut mac = <M as KeyInit>::new_from_slice(secret)
        .map_err(|e| CryptoError::InvalidKey(format!("hmac secret: {e}")))?;
    mac.update(payload);
    Ok(mac)
}

fn tag<M: Mac + KeyInit>(secret: &[u8], payload: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Ok(keyed::<M>(secret, payload)?.finalize().into_bytes().to_vec())
}

fn check<M: Mac + KeyInit>(
    secret: &[u8],
    payload: &[u8],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    Ok(keyed::<M>(secret, payload)?.verify_slice(signature).is_ok())
}
