//! # Security Headers
//!
//! Canonical names of the four authentication headers and a parsed view of
//! them. Header lookup is case-insensitive on the wire; callers supply a
//! lookup function that already handles that (e.g. `http::HeaderMap`).

use thiserror::Error;

/// API key header.
pub const API_KEY_HEADER: &str = "X-FBAPI-KEY";

/// Per-request nonce header.
pub const NONCE_HEADER: &str = "X-FBAPI-NONCE";

/// Milliseconds since the Unix epoch.
pub const TIMESTAMP_HEADER: &str = "X-FBAPI-TIMESTAMP";

/// Post-encoded signature text.
pub const SIGNATURE_HEADER: &str = "X-FBAPI-SIGNATURE";

/// All security headers, in the order they are checked.
pub const SECURITY_HEADERS: [&str; 4] = [
    API_KEY_HEADER,
    NONCE_HEADER,
    TIMESTAMP_HEADER,
    SIGNATURE_HEADER,
];

/// Problems found while reading the security headers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// A required header is absent.
    #[error("missing required header {0}")]
    Missing(&'static str),

    /// A header is present but its value cannot be used.
    #[error("invalid value for header {header}: {reason}")]
    Invalid {
        header: &'static str,
        reason: String,
    },
}

impl HeaderError {
    /// Name of the header this error refers to.
    #[must_use]
    pub fn header(&self) -> &'static str {
        match self {
            HeaderError::Missing(header) | HeaderError::Invalid { header, .. } => header,
        }
    }
}

/// Parsed authentication headers of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeaders {
    pub api_key: String,
    pub nonce: String,
    pub timestamp: u64,
    pub signature: String,
}

impl SecurityHeaders {
    /// Read the four headers through `lookup`.
    ///
    /// Empty values count as missing. The nonce is not validated here beyond
    /// presence; the replay guard owns nonce semantics.
    ///
    /// # Errors
    ///
    /// - `HeaderError::Missing` for an absent or empty header
    /// - `HeaderError::Invalid` when the timestamp is not an unsigned integer
    pub fn from_lookup<'a, F>(lookup: F) -> Result<Self, HeaderError>
    where
        F: Fn(&'static str) -> Option<&'a str>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or(HeaderError::Missing(name))
        };

        let api_key = required(API_KEY_HEADER)?.to_string();
        let nonce = required(NONCE_HEADER)?.to_string();
        let raw_timestamp = required(TIMESTAMP_HEADER)?;
        let timestamp = raw_timestamp
            .parse::<u64>()
            .map_err(|e| HeaderError::Invalid {
                header: TIMESTAMP_HEADER,
                reason: e.to_string(),
            })?;
        let signature = required(SIGNATURE_HEADER)?.to_string();

        Ok(Self {
            api_key,
            nonce,
            timestamp,
            signature,
        })
    }

    /// Header name/value pairs, ready to be attached to an outbound request.
    #[must_use]
    pub fn to_pairs(&self) -> [(&'static str, String); 4] {
        [
            (API_KEY_HEADER, self.api_key.clone()),
            (NONCE_HEADER, self.nonce.clone()),
            (TIMESTAMP_HEADER, self.timestamp.to_string()),
            (SIGNATURE_HEADER, self.signature.clone()),
        ]
    }
}
