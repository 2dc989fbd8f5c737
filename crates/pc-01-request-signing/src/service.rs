//! # Signature Protocol Service
//!
//! Implements [`RequestSigningApi`] on top of the codecs and signers of
//! `shared-crypto`.
//!
//! ## Sign
//!
//! 1. Build the canonical payload
//! 2. `pre_encoding.encode(payload)`
//! 3. `signer.sign(encoded, key, hash)`
//! 4. `post_encoding.encode_bytes(raw_signature)`
//!
//! ## Verify
//!
//! 1. `post_encoding.decode_to_bytes(signature_text)`
//! 2. `pre_encoding.encode(payload)`
//! 3. `signer.verify(encoded, key, raw_signature, hash)`
//!
//! Any disagreement between sender and verifier (algorithm, hash, encodings,
//! key) surfaces as `Ok(false)`. Only undecodable signature text and
//! unsupported algorithm/hash pairs are errors.

use crate::domain::config::SigningConfig;
use crate::domain::errors::SignatureError;
use crate::domain::payload::SignaturePayload;
use crate::ports::inbound::RequestSigningApi;
use serde_json::Value;
use shared_crypto::{codec_for, Codec, CryptoError, KeyMaterial, Signer};
use shared_types::{Encoding, HashAlgorithm, SigningAlgorithm};
use std::fmt;
use tracing::{debug, warn};

/// One immutable signing/verification configuration.
pub struct SignatureProtocol {
    signer: Signer,
    hash: HashAlgorithm,
    pre: &'static dyn Codec,
    post: &'static dyn Codec,
    key: KeyMaterial,
}

impl SignatureProtocol {
    /// Create a protocol instance.
    ///
    /// Asymmetric keys are parsed here once.
    ///
    /// # Errors
    ///
    /// - `CryptoError::AlgorithmNotSupported` for ECDSA with a non-SHA-256 hash
    /// - `CryptoError::InvalidKey` when the key does not parse for the algorithm
    pub fn new(config: SigningConfig) -> Result<Self, SignatureError> {
        if !config.signing_algorithm.supports(config.hash_algorithm) {
            return Err(CryptoError::AlgorithmNotSupported {
                algorithm: config.signing_algorithm,
                hash: config.hash_algorithm,
            }
            .into());
        }
        let key = config.key.prepared_for(config.signing_algorithm)?;
        Ok(Self {
            signer: Signer::for_algorithm(config.signing_algorithm),
            hash: config.hash_algorithm,
            pre: codec_for(config.pre_encoding),
            post: codec_for(config.post_encoding),
            key,
        })
    }

    pub fn signing_algorithm(&self) -> SigningAlgorithm {
        self.signer.algorithm()
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn pre_encoding(&self) -> Encoding {
        self.pre.encoding()
    }

    pub fn post_encoding(&self) -> Encoding {
        self.post.encoding()
    }

    /// Sign an already built payload.
    ///
    /// # Errors
    ///
    /// Propagates signer failures as `SignatureError::Crypto`.
    pub fn sign_payload(&self, payload: &SignaturePayload) -> Result<String, SignatureError> {
        let encoded = self.pre.encode(&payload.to_string());
        let raw = self.signer.sign(&encoded, &self.key, self.hash)?;
        debug!(
            method = payload.method(),
            path = payload.path(),
            algorithm = %self.signer.algorithm(),
            "Signed request payload"
        );
        Ok(self.post.encode_bytes(&raw))
    }

    /// Client side signature of a request.
    ///
    /// # Errors
    ///
    /// Propagates signer failures as `SignatureError::Crypto`.
    pub fn build_request_signature(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
        timestamp: u64,
        nonce: &str,
    ) -> Result<String, SignatureError> {
        self.sign_payload(&SignaturePayload::new(timestamp, nonce, method, path, body))
    }

    /// Server side verification.
    ///
    /// # Errors
    ///
    /// - `SignatureError::MalformedSignature` when `signature_text` is not valid
    ///   under the post-encoding
    /// - `SignatureError::Crypto` for unusable keys
    pub fn verify_signature(
        &self,
        payload: &SignaturePayload,
        signature_text: &str,
    ) -> Result<bool, SignatureError> {
        let raw = self
            .post
            .decode_to_bytes(signature_text)
            .map_err(SignatureError::MalformedSignature)?;
        let encoded = self.pre.encode(&payload.to_string());
        Ok(self.signer.verify(&encoded, &self.key, &raw, self.hash)?)
    }

    /// Collapse every failure into `false`.
    ///
    /// For callers that only need a verdict, such as conformance probes that
    /// deliberately send signatures under the wrong encoding.
    pub fn is_valid_signature(&self, payload: &SignaturePayload, signature_text: &str) -> bool {
        match self.verify_signature(payload, signature_text) {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, method = payload.method(), path = payload.path(), "Signature rejected");
                false
            }
        }
    }
}

impl RequestSigningApi for SignatureProtocol {
    fn build_request_signature(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
        timestamp: u64,
        nonce: &str,
    ) -> Result<String, SignatureError> {
        SignatureProtocol::build_request_signature(self, method, path, body, timestamp, nonce)
    }

    fn verify_signature(
        &self,
        payload: &SignaturePayload,
        signature_text: &str,
    ) -> Result<bool, SignatureError> {
        SignatureProtocol::verify_signature(self, payload, signature_text)
    }
}

impl fmt::Debug for SignatureProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureProtocol")
            .field("signing_algorithm", &self.signer.algorithm())
            .field("hash_algorithm", &self.hash)
            .field("pre_encoding", &self.pre.encoding())
            .field("post_encoding", &self.post.encoding())
            .field("key", &self.key)
            .finish()
    }
}
