//! # RSA Signer
//!
//! RSASSA-PKCS1-v1_5 over the payload digest. Private keys are accepted as
//! PKCS#1 or PKCS#8 (PEM or DER); verification derives the public key from the
//! private key when only the latter is configured.

use crate::errors::CryptoError;
use crate::keys::{rsa_private_key, rsa_public_key, KeyMaterial};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer as _, Verifier as _};
use sha2::{Sha256, Sha512};
use sha3::Sha3_256;
use shared_types::HashAlgorithm;

/// Sign `payload` with the selected hash.
///
/// # Errors
///
/// - `CryptoError::InvalidKey` / `CryptoError::KeyTypeMismatch` for unusable keys
/// - `CryptoError::SigningFailed` if the key is too small for the digest
pub fn sign(
    payload: &[u8],
    key: &KeyMaterial,
    hash: HashAlgorithm,
) -> Result<Vec<u8>, CryptoError> {
    let private_key = rsa_private_key(key)?;
    let signature = match hash {
        HashAlgorithm::Sha256 => SigningKey::<Sha256>::new(private_key).try_sign(payload),
        HashAlgorithm::Sha512 => SigningKey::<Sha512>::new(private_key).try_sign(payload),
        HashAlgorithm::Sha3_256 => SigningKey::<Sha3_256>::new(private_key).try_sign(payload),
    }
    .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
    Ok(signature.to_vec())
}

/// Verify a PKCS#1 v1.5 signature. Mismatches are `Ok(false)`.
///
/// # Errors
///
/// `CryptoError::InvalidKey` / `CryptoError::KeyTypeMismatch` for unusable keys.
pub fn verify(
    payload: &[u8],
    key: &KeyMaterial,
    signature: &[u8],
    hash: HashAlgorithm,
) -> Result<bool, CryptoError> {
    let public_key = rsa_public_key(key)?;
    let Ok(signature) = Signature::try_from(signature) else {
        return Ok(false);
    };
    let verified = match hash {
        HashAlgorithm::Sha256 => VerifyingKey::<Sha256>::new(public_key).verify(payload, &signature),
        HashAlgorithm::Sha512 => VerifyingKey::<Sha512>::new(public_key).verify(payload, &signature),
        HashAlgorithm::Sha3_256 => {
            VerifyingKey::<Sha3_256>::new(public_key).verify(payload, &signature)
        }
    };
    Ok(verified.is_ok())
}
