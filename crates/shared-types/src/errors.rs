//! # Error Types
//!
//! Defines error types shared by every subsystem.

use thiserror::Error;

/// Errors raised when a protocol tag cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TagError {
    /// The encoding tag is not one of the supported encodings.
    #[error("unsupported encoding format: {0}")]
    UnsupportedEncodingFormat(String),

    /// The signing algorithm tag is not recognised.
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedSigningAlgorithm(String),

    /// The hash algorithm tag is not recognised.
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(String),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override carried an unparseable value.
    #[error("invalid value for {variable}: {reason}")]
    InvalidEnv { variable: String, reason: String },

    /// The signing section is inconsistent.
    #[error("invalid signing configuration: {0}")]
    InvalidSigning(String),

    /// The replay section is inconsistent.
    #[error("invalid replay configuration: {0}")]
    InvalidReplay(String),

    /// The gateway section is inconsistent.
    #[error("invalid gateway configuration: {0}")]
    InvalidGateway(String),
}
