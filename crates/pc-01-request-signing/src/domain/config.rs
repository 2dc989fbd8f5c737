//! # Signing Configuration
//!
//! Immutable per signing operation. Swapping configuration at runtime means
//! building a new [`crate::SignatureProtocol`].

use crate::domain::errors::SignatureError;
use shared_crypto::KeyMaterial;
use shared_types::{Encoding, HashAlgorithm, SigningAlgorithm, SigningSettings};

/// Algorithm, hash, encodings and key of one protocol instance.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    pub signing_algorithm: SigningAlgorithm,
    pub hash_algorithm: HashAlgorithm,
    /// Applied to the payload text before signing
    pub pre_encoding: Encoding,
    /// Applied to the raw signature bytes after signing
    pub post_encoding: Encoding,
    pub key: KeyMaterial,
}

impl SigningConfig {
    /// Defaults of [`SigningSettings`] with the given key.
    pub fn with_key(key: impl Into<KeyMaterial>) -> Self {
        let defaults = SigningSettings::default();
        Self {
            signing_algorithm: defaults.signing_algorithm,
            hash_algorithm: defaults.hash_algorithm,
            pre_encoding: defaults.pre_encoding,
            post_encoding: defaults.post_encoding,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn algorithm(mut self, algorithm: SigningAlgorithm, hash: HashAlgorithm) -> Self {
        self.signing_algorithm = algorithm;
        self.hash_algorithm = hash;
        self
    }

    #[must_use]
    pub fn encodings(mut self, pre: Encoding, post: Encoding) -> Self {
        self.pre_encoding = pre;
        self.post_encoding = post;
        self
    }

    /// Build from the process configuration, reading the key file if needed.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::Config` when no key material is available.
    pub fn from_settings(settings: &SigningSettings) -> Result<Self, SignatureError> {
        let key = settings
            .key_material()
            .map_err(|e| SignatureError::Config(e.to_string()))?;
        Ok(Self {
            signing_algorithm: settings.signing_algorithm,
            hash_algorithm: settings.hash_algorithm,
            pre_encoding: settings.pre_encoding,
            post_encoding: settings.post_encoding,
            key: KeyMaterial::from(key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_requires_key() {
        let err = SigningConfig::from_settings(&SigningSettings::default()).unwrap_err();
        assert!(matches!(err, SignatureError::Config(_)));
    }

    #[test]
    fn test_from_settings_inline_key() {
        let settings = SigningSettings {
            private_key: Some("secret".into()),
            post_encoding: Encoding::HexStr,
            ..SigningSettings::default()
        };
        let config = SigningConfig::from_settings(&settings).unwrap();
        assert_eq!(config.post_encoding, Encoding::HexStr);
        assert_eq!(config.key.secret_bytes().unwrap(), b"secret");
    }
}
