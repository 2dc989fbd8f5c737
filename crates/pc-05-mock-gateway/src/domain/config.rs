//! Gateway configuration.

use crate::domain::error::GatewayError;
use pc_02_replay_guard::ReplayPolicy;
use shared_types::ConformanceConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default max request body (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Mock gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address (port 0 picks a free port)
    pub bind_addr: SocketAddr,
    /// API keys accepted in `X-FBAPI-KEY`
    pub api_keys: Vec<String>,
    /// Max request body size in bytes
    pub max_body_bytes: usize,
    /// Timestamp window and nonce eviction
    pub replay: ReplayPolicy,
    /// How long idempotent outcomes are kept (`None`: process lifetime)
    pub idempotency_retention: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
            api_keys: Vec::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            replay: ReplayPolicy::default(),
            idempotency_retention: None,
        }
    }
}

impl GatewayConfig {
    /// Build from the process configuration.
    pub fn from_settings(config: &ConformanceConfig) -> Self {
        Self {
            bind_addr: config.gateway.bind_addr,
            api_keys: config.gateway.api_keys.clone(),
            max_body_bytes: config.gateway.max_body_bytes,
            replay: ReplayPolicy::from_settings(&config.replay),
            idempotency_retention: config.idempotency.retention_secs.map(Duration::from_secs),
        }
    }

    #[must_use]
    pub fn with_api_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.api_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.api_keys.is_empty() {
            return Err(GatewayError::Config("api_keys cannot be empty".into()));
        }
        if self.api_keys.iter().any(|key| key.trim().is_empty()) {
            return Err(GatewayError::Config("api_keys cannot contain blank keys".into()));
        }
        if self.max_body_bytes == 0 {
            return Err(GatewayError::Config("max_body_bytes cannot be 0".into()));
        }
        if self.replay.ttl_ms == 0 {
            return Err(GatewayError::Config("replay ttl cannot be 0".into()));
        }
        Ok(())
    }
}
