//! # Shared Crypto - Codecs and Request Signers
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `codec` | Percent, Base64, Hex, Base32, Base58 | Payload pre-encoding, signature transport |
//! | `mac` | HMAC-SHA256/512, HMAC-SHA3-256 | Shared-secret signing |
//! | `rsa_pkcs1` | RSASSA-PKCS1-v1_5 | Asymmetric signing |
//! | `ecdsa` | P-256, secp256k1 (SHA-256) | Hardware-backed signing |
//! | `keys` | PEM / DER / parsed handles | Key normalisation |
//!
//! ## Security Properties
//!
//! - **HMAC**: constant-time tag comparison
//! - **RSA / ECDSA**: deterministic signatures (PKCS#1 v1.5, RFC 6979)
//! - **Key material**: zeroized on drop, redacted from `Debug`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod ecdsa;
pub mod errors;
pub mod keys;
pub mod mac;
pub mod rsa_pkcs1;
pub mod signer;

// Re-exports
pub use codec::{codec_for, codec_for_tag, Codec};
pub use errors::{CryptoError, EncodingError};
pub use keys::{KeyMaterial, ParsedKey};
pub use signer::Signer;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
