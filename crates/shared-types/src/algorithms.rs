//! # Protocol Tags
//!
//! The three runtime-selected knobs of the signing protocol. Each is a closed
//! enum with one variant per concrete strategy; the string forms are the ones
//! used in configuration files and environment variables.

use crate::errors::TagError;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

/// Text representation used for payloads and signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Encoding {
    /// RFC 3986 percent-encoding (`url-encoded`).
    UrlEncoded,
    /// Standard padded Base64 (`base64`).
    Base64,
    /// Lower-case hexadecimal (`hexstr`).
    HexStr,
    /// Unpadded RFC 4648 Base32 (`base32`).
    Base32,
    /// Bitcoin alphabet Base58 (`base58`).
    Base58,
}

impl Encoding {
    /// Every supported encoding, in tag order.
    pub const ALL: [Encoding; 5] = [
        Encoding::UrlEncoded,
        Encoding::Base64,
        Encoding::HexStr,
        Encoding::Base32,
        Encoding::Base58,
    ];

    /// Configuration tag for this encoding.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Encoding::UrlEncoded => "url-encoded",
            Encoding::Base64 => "base64",
            Encoding::HexStr => "hexstr",
            Encoding::Base32 => "base32",
            Encoding::Base58 => "base58",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url-encoded" => Ok(Encoding::UrlEncoded),
            "base64" => Ok(Encoding::Base64),
            "hexstr" => Ok(Encoding::HexStr),
            "base32" => Ok(Encoding::Base32),
            "base58" => Ok(Encoding::Base58),
            other => Err(TagError::UnsupportedEncodingFormat(other.to_string())),
        }
    }
}

/// Signature scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum SigningAlgorithm {
    /// Keyed hash (shared secret).
    Hmac,
    /// RSA PKCS#1 v1.5.
    Rsa,
    /// ECDSA, SHA-256 only.
    Ecdsa,
}

impl SigningAlgorithm {
    /// Every supported signing algorithm.
    pub const ALL: [SigningAlgorithm; 3] = [
        SigningAlgorithm::Hmac,
        SigningAlgorithm::Rsa,
        SigningAlgorithm::Ecdsa,
    ];

    /// Configuration tag for this algorithm.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::Hmac => "hmac",
            SigningAlgorithm::Rsa => "rsa",
            SigningAlgorithm::Ecdsa => "ecdsa",
        }
    }

    /// Whether this algorithm can be paired with `hash`.
    ///
    /// ECDSA is pinned to SHA-256 by the signing hardware used on the
    /// provider side.
    #[must_use]
    pub const fn supports(&self, hash: HashAlgorithm) -> bool {
        match self {
            SigningAlgorithm::Hmac | SigningAlgorithm::Rsa => true,
            SigningAlgorithm::Ecdsa => matches!(hash, HashAlgorithm::Sha256),
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hmac" => Ok(SigningAlgorithm::Hmac),
            "rsa" => Ok(SigningAlgorithm::Rsa),
            "ecdsa" => Ok(SigningAlgorithm::Ecdsa),
            other => Err(TagError::UnsupportedSigningAlgorithm(other.to_string())),
        }
    }
}

/// Digest function used by the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
    /// SHA3-256
    Sha3_256,
}

impl HashAlgorithm {
    /// Every supported hash algorithm.
    pub const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Sha3_256,
    ];

    /// Configuration tag for this hash.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha3_256 => "sha3-256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            "sha3-256" => Ok(HashAlgorithm::Sha3_256),
            other => Err(TagError::UnsupportedHashAlgorithm(other.to_string())),
        }
    }
}
