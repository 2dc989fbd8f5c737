//! # Conformance Configuration
//!
//! Process configuration consumed by the authentication engine, the schema
//! validator and the mock gateway.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. TOML file (`ConformanceConfig::load`)
//! 3. `PC_*` environment variables (`ConformanceConfig::apply_env`)
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PC_SIGNING_ALGORITHM` | `signing.signing_algorithm` |
//! | `PC_HASH_ALGORITHM` | `signing.hash_algorithm` |
//! | `PC_PRE_ENCODING` | `signing.pre_encoding` |
//! | `PC_POST_ENCODING` | `signing.post_encoding` |
//! | `PC_PRIVATE_KEY_PATH` | `signing.private_key_path` |
//! | `PC_REQUEST_TTL` | `replay.request_ttl_secs` |
//! | `PC_OPENAPI_PATH` | `schema.openapi_path` |
//! | `PC_API_KEYS` | `gateway.api_keys` (comma separated) |

use crate::algorithms::{Encoding, HashAlgorithm, SigningAlgorithm};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Complete harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceConfig {
    /// Request signing protocol
    pub signing: SigningSettings,
    /// Nonce / timestamp replay protection
    pub replay: ReplaySettings,
    /// Idempotency record retention
    pub idempotency: IdempotencySettings,
    /// OpenAPI response validation
    pub schema: SchemaSettings,
    /// Mock gateway
    pub gateway: GatewaySettings,
}

/// Signing protocol configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    pub signing_algorithm: SigningAlgorithm,
    pub hash_algorithm: HashAlgorithm,
    /// Applied to the canonical payload text before signing
    pub pre_encoding: Encoding,
    /// Applied to the raw signature bytes after signing
    pub post_encoding: Encoding,
    /// Inline key material (PEM text, or the shared secret for HMAC)
    pub private_key: Option<String>,
    /// Key file (PEM or DER)
    pub private_key_path: Option<PathBuf>,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            signing_algorithm: SigningAlgorithm::Hmac,
            hash_algorithm: HashAlgorithm::Sha256,
            pre_encoding: Encoding::UrlEncoded,
            post_encoding: Encoding::Base64,
            private_key: None,
            private_key_path: None,
        }
    }
}

impl SigningSettings {
    /// Resolve the configured key material to raw bytes.
    ///
    /// Inline material takes precedence over the key file.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidSigning` when neither source is configured
    /// - `ConfigError::Io` when the key file cannot be read
    pub fn key_material(&self) -> Result<Vec<u8>, ConfigError> {
        if let Some(inline) = &self.private_key {
            return Ok(inline.as_bytes().to_vec());
        }
        match &self.private_key_path {
            Some(path) => std::fs::read(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
            None => Err(ConfigError::InvalidSigning(
                "no private_key or private_key_path configured".into(),
            )),
        }
    }
}

/// Replay protection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Maximum request age in seconds (default: 10)
    pub request_ttl_secs: u64,
    /// Reject timestamps further than this in the future (default: accept)
    pub max_future_skew_secs: Option<u64>,
    /// Minimum interval between nonce registry sweeps
    pub sweep_interval_secs: u64,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            request_ttl_secs: 10,
            max_future_skew_secs: None,
            sweep_interval_secs: 10,
        }
    }
}

impl ReplaySettings {
    /// Request TTL as a duration.
    #[must_use]
    pub fn request_ttl(&self) -> Duration {
        Duration::from_secs(self.request_ttl_secs)
    }
}

/// Idempotency store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdempotencySettings {
    /// How long a recorded outcome is kept (default: process lifetime)
    pub retention_secs: Option<u64>,
}

/// Response schema validation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// OpenAPI document (YAML or JSON)
    pub openapi_path: Option<PathBuf>,
}

/// Mock gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub bind_addr: SocketAddr,
    /// API keys accepted by the gateway
    pub api_keys: Vec<String>,
    /// Max request body size in bytes (default: 1MB)
    pub max_body_bytes: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
            api_keys: Vec::new(),
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

impl ConformanceConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed TOML or unknown tag values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` or `ConfigError::Parse`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded conformance configuration");
        Ok(config)
    }

    /// Defaults overridden by the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnv` for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `PC_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnv` for unparseable values.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnv` for unparseable values.
    pub fn apply_env_with<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("PC_SIGNING_ALGORITHM") {
            self.signing.signing_algorithm = parse_env("PC_SIGNING_ALGORITHM", &v)?;
        }
        if let Some(v) = var("PC_HASH_ALGORITHM") {
            self.signing.hash_algorithm = parse_env("PC_HASH_ALGORITHM", &v)?;
        }
        if let Some(v) = var("PC_PRE_ENCODING") {
            self.signing.pre_encoding = parse_env("PC_PRE_ENCODING", &v)?;
        }
        if let Some(v) = var("PC_POST_ENCODING") {
            self.signing.post_encoding = parse_env("PC_POST_ENCODING", &v)?;
        }
        if let Some(v) = var("PC_PRIVATE_KEY_PATH") {
            self.signing.private_key_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("PC_REQUEST_TTL") {
            self.replay.request_ttl_secs = parse_env("PC_REQUEST_TTL", &v)?;
        }
        if let Some(v) = var("PC_OPENAPI_PATH") {
            self.schema.openapi_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("PC_API_KEYS") {
            self.gateway.api_keys = v
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidSigning` - unsupported algorithm/hash pairing or no key
    /// - `ConfigError::InvalidReplay` - zero TTL
    /// - `ConfigError::InvalidGateway` - no API keys or zero body limit
    pub fn validate(&self) -> Result<(), ConfigError> {
        let signing = &self.signing;
        if !signing.signing_algorithm.supports(signing.hash_algorithm) {
            return Err(ConfigError::InvalidSigning(format!(
                "{} does not support {}",
                signing.signing_algorithm, signing.hash_algorithm
            )));
        }
        if signing.private_key.is_none() && signing.private_key_path.is_none() {
            return Err(ConfigError::InvalidSigning(
                "no private_key or private_key_path configured".into(),
            ));
        }

        if self.replay.request_ttl_secs == 0 {
            return Err(ConfigError::InvalidReplay(
                "request_ttl_secs cannot be 0".into(),
            ));
        }

        if self.gateway.api_keys.is_empty() {
            return Err(ConfigError::InvalidGateway("api_keys cannot be empty".into()));
        }
        if self.gateway.max_body_bytes == 0 {
            return Err(ConfigError::InvalidGateway(
                "max_body_bytes cannot be 0".into(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T>(variable: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        variable: variable.to_string(),
        reason: e.to_string(),
    })
}
