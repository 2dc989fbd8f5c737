//! # Negative Probes
//!
//! Deliberately broken requests. A conforming provider rejects each with a
//! fixed status and `errorType`; anything else is a finding.
//!
//! | Probe | Status | errorType |
//! |-------|--------|-----------|
//! | `ReplayedNonce` | 400 | `used-nonce` |
//! | `InvalidSignature` | 400 | `invalid-signature` |
//! | `MissingHeader(h)` | 400 | `missing-header` |
//! | `UnknownApiKey` | 401 | `unauthorized` |
//! | `StaleTimestamp` | 400 | `expired-timestamp` |

use crate::domain::request::ApiResponse;
use serde::Serialize;
use shared_types::ErrorType;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Probe {
    /// Send a valid request twice with the same nonce.
    ReplayedNonce,
    /// Send a signature computed over a different payload.
    InvalidSignature,
    /// Leave out one security header.
    MissingHeader(&'static str),
    /// Sign with an API key the provider does not know.
    UnknownApiKey,
    /// Sign with a timestamp this many milliseconds in the past.
    StaleTimestamp { age_ms: u64 },
}

impl Probe {
    /// HTTP status a conforming provider answers with.
    #[must_use]
    pub const fn expected_status(&self) -> u16 {
        match self {
            Probe::UnknownApiKey => 401,
            _ => 400,
        }
    }

    /// `errorType` a conforming provider answers with.
    #[must_use]
    pub const fn expected_error_type(&self) -> ErrorType {
        match self {
            Probe::ReplayedNonce => ErrorType::UsedNonce,
            Probe::InvalidSignature => ErrorType::InvalidSignature,
            Probe::MissingHeader(_) => ErrorType::MissingHeader,
            Probe::UnknownApiKey => ErrorType::Unauthorized,
            Probe::StaleTimestamp { .. } => ErrorType::ExpiredTimestamp,
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::ReplayedNonce => f.write_str("replayed-nonce"),
            Probe::InvalidSignature => f.write_str("invalid-signature"),
            Probe::MissingHeader(header) => write!(f, "missing-header({header})"),
            Probe::UnknownApiKey => f.write_str("unknown-api-key"),
            Probe::StaleTimestamp { age_ms } => write!(f, "stale-timestamp({age_ms}ms)"),
        }
    }
}

/// Result of one probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub probe: Probe,
    pub response: ApiResponse,
    pub passed: bool,
}

impl ProbeReport {
    pub(crate) fn evaluate(probe: Probe, response: ApiResponse) -> Self {
        let passed = response.status == probe.expected_status()
            && response.error_type() == Some(probe.expected_error_type().as_str());
        Self {
            probe,
            response,
            passed,
        }
    }
}
