//! # Key Material
//!
//! Keys reach the signers in three shapes: text (PEM, or an HMAC secret),
//! raw bytes (DER, or an HMAC secret) and an already-parsed handle. The
//! loaders here normalise between them without ever re-deriving the wrong
//! key type: an RSA PEM handed to the ECDSA signer is an error, not a retry.
//!
//! ## Accepted Formats
//!
//! | Kind | PEM labels | DER |
//! |------|------------|-----|
//! | RSA private | `RSA PRIVATE KEY`, `PRIVATE KEY` | PKCS#1, PKCS#8 |
//! | RSA public | `RSA PUBLIC KEY`, `PUBLIC KEY` | PKCS#1, SPKI |
//! | EC private (P-256, secp256k1) | `EC PRIVATE KEY`, `PRIVATE KEY` | SEC1, PKCS#8 |
//! | EC public (P-256, secp256k1) | `PUBLIC KEY` | SPKI |
//!
//! Verification keys are derived from private keys when no public key is
//! supplied.

use crate::errors::CryptoError;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use shared_types::SigningAlgorithm;
use std::fmt;
use zeroize::Zeroize;

const PEM_PREFIX: &str = "-----BEGIN ";

/// An already-parsed key.
#[derive(Clone)]
pub enum ParsedKey {
    /// RSA private key
    RsaPrivate(Box<RsaPrivateKey>),
    /// RSA public key
    RsaPublic(RsaPublicKey),
    /// NIST P-256 private key
    P256Private(p256::SecretKey),
    /// NIST P-256 public key
    P256Public(p256::PublicKey),
    /// secp256k1 private key
    K256Private(k256::SecretKey),
    /// secp256k1 public key
    K256Public(k256::PublicKey),
}

impl ParsedKey {
    /// Short name of the key kind, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ParsedKey::RsaPrivate(_) => "rsa-private",
            ParsedKey::RsaPublic(_) => "rsa-public",
            ParsedKey::P256Private(_) => "p256-private",
            ParsedKey::P256Public(_) => "p256-public",
            ParsedKey::K256Private(_) => "secp256k1-private",
            ParsedKey::K256Public(_) => "secp256k1-public",
        }
    }
}

impl fmt::Debug for ParsedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParsedKey").field(&self.kind()).finish()
    }
}

/// Key material as configured or supplied by a caller.
#[derive(Clone)]
pub enum KeyMaterial {
    /// PEM text or an HMAC secret.
    Text(String),
    /// DER bytes or an HMAC secret.
    Bytes(Vec<u8>),
    /// Parsed key object.
    Handle(ParsedKey),
}

impl KeyMaterial {
    /// Raw secret bytes for HMAC.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyTypeMismatch` for a parsed asymmetric key.
    pub fn secret_bytes(&self) -> Result<&[u8], CryptoError> {
        match self {
            KeyMaterial::Text(text) => Ok(text.as_bytes()),
            KeyMaterial::Bytes(bytes) => Ok(bytes),
            KeyMaterial::Handle(key) => Err(CryptoError::KeyTypeMismatch {
                expected: "hmac-secret",
                found: key.kind(),
            }),
        }
    }

    /// Parse text or bytes once so repeated sign/verify calls reuse the key.
    ///
    /// HMAC material is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` when the material does not parse as a
    /// key for `algorithm`.
    pub fn prepared_for(&self, algorithm: SigningAlgorithm) -> Result<KeyMaterial, CryptoError> {
        match algorithm {
            SigningAlgorithm::Hmac => Ok(self.clone()),
            SigningAlgorithm::Rsa => match self {
                KeyMaterial::Handle(ParsedKey::RsaPublic(_)) => Ok(self.clone()),
                _ => Ok(KeyMaterial::Handle(ParsedKey::RsaPrivate(Box::new(
                    rsa_private_key(self)?,
                )))),
            },
            SigningAlgorithm::Ecdsa => match self {
                KeyMaterial::Handle(ParsedKey::P256Public(_) | ParsedKey::K256Public(_)) => {
                    Ok(self.clone())
                }
                _ => Ok(KeyMaterial::Handle(match ec_signing_key(self)? {
                    EcSigningKey::P256(key) => ParsedKey::P256Private(key.into()),
                    EcSigningKey::K256(key) => ParsedKey::K256Private(key.into()),
                })),
            },
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Text(_) => f.write_str("KeyMaterial::Text(<redacted>)"),
            KeyMaterial::Bytes(bytes) => write!(f, "KeyMaterial::Bytes(<{} bytes>)", bytes.len()),
            KeyMaterial::Handle(key) => write!(f, "KeyMaterial::Handle({})", key.kind()),
        }
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        // Zeroize secret key material
        match self {
            KeyMaterial::Text(text) => text.zeroize(),
            KeyMaterial::Bytes(bytes) => bytes.zeroize(),
            KeyMaterial::Handle(_) => {}
        }
    }
}

impl From<&str> for KeyMaterial {
    fn from(text: &str) -> Self {
        KeyMaterial::Text(text.to_string())
    }
}

impl From<String> for KeyMaterial {
    fn from(text: String) -> Self {
        KeyMaterial::Text(text)
    }
}

impl From<&[u8]> for KeyMaterial {
    fn from(bytes: &[u8]) -> Self {
        KeyMaterial::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        KeyMaterial::Bytes(bytes)
    }
}

impl From<ParsedKey> for KeyMaterial {
    fn from(key: ParsedKey) -> Self {
        KeyMaterial::Handle(key)
    }
}

/// Encoded form of text or byte material.
enum Encoded<'a> {
    Pem { label: &'a str, text: &'a str },
    Der(&'a [u8]),
}

fn encoded(material: &KeyMaterial) -> Option<Encoded<'_>> {
    let (text, bytes) = match material {
        KeyMaterial::Text(text) => (Some(text.as_str()), text.as_bytes()),
        KeyMaterial::Bytes(bytes) => (std::str::from_utf8(bytes).ok(), bytes.as_slice()),
        KeyMaterial::Handle(_) => return None,
    };
    match text.and_then(|text| pem_label(text).map(|label| (label, text))) {
        Some((label, text)) => Some(Encoded::Pem {
            label,
            text: text.trim(),
        }),
        None => Some(Encoded::Der(bytes)),
    }
}

/// Label of the first PEM block in `text`.
fn pem_label(text: &str) -> Option<&str> {
    let start = text.find(PEM_PREFIX)? + PEM_PREFIX.len();
    let rest = &text[start..];
    let end = rest.find("-----")?;
    Some(&rest[..end])
}

fn invalid(kind: &str, err: impl fmt::Display) -> CryptoError {
    CryptoError::InvalidKey(format!("{kind}: {err}"))
}

fn mismatch(expected: &'static str, key: &ParsedKey) -> CryptoError {
    CryptoError::KeyTypeMismatch {
        expected,
        found: key.kind(),
    }
}

// =============================================================================
// RSA
// =============================================================================

/// Load an RSA private key.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKey` or `CryptoError::KeyTypeMismatch`.
pub fn rsa_private_key(material: &KeyMaterial) -> Result<RsaPrivateKey, CryptoError> {
    match encoded(material) {
        None => match material {
            KeyMaterial::Handle(ParsedKey::RsaPrivate(key)) => Ok((**key).clone()),
            KeyMaterial::Handle(other) => Err(mismatch("rsa-private", other)),
            _ => Err(CryptoError::InvalidKey("rsa private key: no key material".into())),
        },
        Some(Encoded::Pem { label, text }) => match label {
            "RSA PRIVATE KEY" => {
                RsaPrivateKey::from_pkcs1_pem(text).map_err(|e| invalid("rsa pkcs1 pem", e))
            }
            "PRIVATE KEY" => {
                RsaPrivateKey::from_pkcs8_pem(text).map_err(|e| invalid("rsa pkcs8 pem", e))
            }
            other => Err(invalid("rsa private key", format!("unexpected PEM label {other}"))),
        },
        Some(Encoded::Der(der)) => RsaPrivateKey::from_pkcs1_der(der)
            .or_else(|_| RsaPrivateKey::from_pkcs8_der(der))
            .map_err(|e| invalid("rsa private der", e)),
    }
}

/// Load an RSA public key, deriving it from a private key if necessary.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKey` or `CryptoError::KeyTypeMismatch`.
pub fn rsa_public_key(material: &KeyMaterial) -> Result<RsaPublicKey, CryptoError> {
    match encoded(material) {
        None => match material {
            KeyMaterial::Handle(ParsedKey::RsaPublic(key)) => Ok(key.clone()),
            KeyMaterial::Handle(ParsedKey::RsaPrivate(key)) => Ok(key.to_public_key()),
            KeyMaterial::Handle(other) => Err(mismatch("rsa-public", other)),
            _ => Err(CryptoError::InvalidKey("rsa public key: no key material".into())),
        },
        Some(Encoded::Pem { label, text }) => match label {
            "RSA PUBLIC KEY" => {
                RsaPublicKey::from_pkcs1_pem(text).map_err(|e| invalid("rsa pkcs1 pem", e))
            }
            "PUBLIC KEY" => {
                RsaPublicKey::from_public_key_pem(text).map_err(|e| invalid("rsa spki pem", e))
            }
            _ => rsa_private_key(material).map(|key| key.to_public_key()),
        },
        Some(Encoded::Der(der)) => RsaPublicKey::from_pkcs1_der(der)
            .or_else(|_| RsaPublicKey::from_public_key_der(der))
            .or_else(|_| rsa_private_key(material).map(|key| key.to_public_key())),
    }
}

// =============================================================================
// ECDSA
// =============================================================================

/// ECDSA signing key on either supported curve.
#[derive(Clone)]
pub enum EcSigningKey {
    /// NIST P-256
    P256(p256::ecdsa::SigningKey),
    /// secp256k1
    K256(k256::ecdsa::SigningKey),
}

/// ECDSA verifying key on either supported curve.
#[derive(Clone, Debug)]
pub enum EcVerifyingKey {
    /// NIST P-256
    P256(p256::ecdsa::VerifyingKey),
    /// secp256k1
    K256(k256::ecdsa::VerifyingKey),
}

impl EcSigningKey {
    /// Matching verifying key.
    #[must_use]
    pub fn verifying_key(&self) -> EcVerifyingKey {
        match self {
            EcSigningKey::P256(key) => EcVerifyingKey::P256(p256::ecdsa::VerifyingKey::from(key)),
            EcSigningKey::K256(key) => EcVerifyingKey::K256(k256::ecdsa::VerifyingKey::from(key)),
        }
    }
}

/// Load an ECDSA signing key; the curve is detected from the encoding.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKey` or `CryptoError::KeyTypeMismatch`.
pub fn ec_signing_key(material: &KeyMaterial) -> Result<EcSigningKey, CryptoError> {
    match encoded(material) {
        None => match material {
            KeyMaterial::Handle(ParsedKey::P256Private(key)) => Ok(p256_signing(key)),
            KeyMaterial::Handle(ParsedKey::K256Private(key)) => Ok(k256_signing(key)),
            KeyMaterial::Handle(other) => Err(mismatch("ec-private", other)),
            _ => Err(CryptoError::InvalidKey("ec private key: no key material".into())),
        },
        Some(Encoded::Pem { label, text }) => match label {
            "EC PRIVATE KEY" => p256::SecretKey::from_sec1_pem(text)
                .map(|key| p256_signing(&key))
                .or_else(|_| k256::SecretKey::from_sec1_pem(text).map(|key| k256_signing(&key)))
                .map_err(|e| invalid("ec sec1 pem", e)),
            "PRIVATE KEY" => p256::SecretKey::from_pkcs8_pem(text)
                .map(|key| p256_signing(&key))
                .or_else(|_| k256::SecretKey::from_pkcs8_pem(text).map(|key| k256_signing(&key)))
                .map_err(|e| invalid("ec pkcs8 pem", e)),
            other => Err(invalid("ec private key", format!("unexpected PEM label {other}"))),
        },
        Some(Encoded::Der(der)) => p256::SecretKey::from_pkcs8_der(der)
            .map(|key| p256_signing(&key))
            .or_else(|_| k256::SecretKey::from_pkcs8_der(der).map(|key| k256_signing(&key)))
            .or_else(|_| p256::SecretKey::from_sec1_der(der).map(|key| p256_signing(&key)))
            .or_else(|_| k256::SecretKey::from_sec1_der(der).map(|key| k256_signing(&key)))
            .map_err(|e| invalid("ec private der", e)),
    }
}

/// Load an ECDSA verifying key, deriving it from a private key if necessary.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKey` or `CryptoError::KeyTypeMismatch`.
pub fn ec_verifying_key(material: &KeyMaterial) -> Result<EcVerifyingKey, CryptoError> {
    match encoded(material) {
        None => match material {
            KeyMaterial::Handle(ParsedKey::P256Public(key)) => {
                Ok(EcVerifyingKey::P256(p256::ecdsa::VerifyingKey::from(key)))
            }
            KeyMaterial::Handle(ParsedKey::K256Public(key)) => {
                Ok(EcVerifyingKey::K256(k256::ecdsa::VerifyingKey::from(key)))
            }
            _ => ec_signing_key(material).map(|key| key.verifying_key()),
        },
        Some(Encoded::Pem {
            label: "PUBLIC KEY",
            text,
        }) => p256::PublicKey::from_public_key_pem(text)
            .map(|key| EcVerifyingKey::P256(key.into()))
            .or_else(|_| {
                k256::PublicKey::from_public_key_pem(text).map(|key| EcVerifyingKey::K256(key.into()))
            })
            .map_err(|e| invalid("ec spki pem", e)),
        Some(Encoded::Pem { .. }) => ec_signing_key(material).map(|key| key.verifying_key()),
        Some(Encoded::Der(der)) => p256::PublicKey::from_public_key_der(der)
            .map(|key| EcVerifyingKey::P256(key.into()))
            .or_else(|_| {
                k256::PublicKey::from_public_key_der(der).map(|key| EcVerifyingKey::K256(key.into()))
            })
            .or_else(|_| ec_signing_key(material).map(|key| key.verifying_key())),
    }
}

fn p256_signing(key: &p256::SecretKey) -> EcSigningKey {
    EcSigningKey::P256(p256::ecdsa::SigningKey::from(key))
}

fn k256_signing(key: &k256::SecretKey) -> EcSigningKey {
    EcSigningKey::K256(k256::ecdsa::SigningKey::from(key))
}
