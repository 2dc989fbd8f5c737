//! Mock gateway service - main entry point.
//!
//! Wraps caller-supplied routes in the signature authentication stack and
//! serves them over HTTP.

use crate::domain::api_keys::ApiKeyRegistry;
use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::SignatureAuthLayer;
use axum::{response::IntoResponse, routing::get, Json, Router};
use parking_lot::RwLock;
use pc_01_request_signing::{SignatureProtocol, SigningConfig};
use pc_02_replay_guard::ReplayGuard;
use pc_03_idempotency::IdempotencyStore;
use shared_types::{ConformanceConfig, SystemTimeSource, TimeSource};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// State shared by the middleware and route handlers.
pub struct GatewayState {
    protocol: RwLock<Arc<SignatureProtocol>>,
    replay: ReplayGuard,
    api_keys: ApiKeyRegistry,
    idempotency: IdempotencyStore,
    max_body_bytes: usize,
}

impl GatewayState {
    pub fn new(
        config: &GatewayConfig,
        protocol: SignatureProtocol,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            protocol: RwLock::new(Arc::new(protocol)),
            replay: ReplayGuard::with_time_source(config.replay, Arc::clone(&time_source)),
            api_keys: ApiKeyRegistry::new(config.api_keys.iter().cloned()),
            idempotency: IdempotencyStore::with_retention(config.idempotency_retention, time_source),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Current signing protocol.
    pub fn protocol(&self) -> Arc<SignatureProtocol> {
        self.protocol.read().clone()
    }

    /// Swap the signing protocol. Requests already verifying keep the old one.
    pub fn set_protocol(&self, protocol: SignatureProtocol) {
        info!(
            algorithm = %protocol.signing_algorithm(),
            hash = %protocol.hash_algorithm(),
            pre_encoding = %protocol.pre_encoding(),
            post_encoding = %protocol.post_encoding(),
            "Signing protocol replaced"
        );
        *self.protocol.write() = Arc::new(protocol);
    }

    pub fn replay_guard(&self) -> &ReplayGuard {
        &self.replay
    }

    pub fn api_keys(&self) -> &ApiKeyRegistry {
        &self.api_keys
    }

    pub fn idempotency(&self) -> &IdempotencyStore {
        &self.idempotency
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

/// Mock provider gateway
pub struct MockGateway {
    config: GatewayConfig,
    state: Arc<GatewayState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl MockGateway {
    /// Create a gateway using the system clock.
    pub fn new(config: GatewayConfig, protocol: SignatureProtocol) -> Result<Self, GatewayError> {
        Self::with_time_source(config, protocol, Arc::new(SystemTimeSource))
    }

    /// Create a gateway with an explicit clock.
    pub fn with_time_source(
        config: GatewayConfig,
        protocol: SignatureProtocol,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let state = Arc::new(GatewayState::new(&config, protocol, time_source));
        Ok(Self {
            config,
            state,
            shutdown_tx: None,
            server: None,
        })
    }

    /// Create a gateway from the process configuration.
    pub fn from_settings(settings: &ConformanceConfig) -> Result<Self, GatewayError> {
        settings
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        let protocol = SignatureProtocol::new(SigningConfig::from_settings(&settings.signing)?)?;
        Self::new(GatewayConfig::from_settings(settings), protocol)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn state(&self) -> Arc<GatewayState> {
        Arc::clone(&self.state)
    }

    /// Swap the signing protocol at runtime.
    pub fn set_protocol(&self, protocol: SignatureProtocol) {
        self.state.set_protocol(protocol);
    }

    /// Authenticated `routes` plus an unauthenticated `/health`.
    pub fn router(&self, routes: Router<Arc<GatewayState>>) -> Router {
        let protected = routes.route_layer(SignatureAuthLayer::new(Arc::clone(&self.state)));
        Router::new()
            .route("/health", get(health_check))
            .merge(protected)
            .with_state(Arc::clone(&self.state))
    }

    /// Bind and serve `routes` in the background.
    ///
    /// Returns the bound address (useful with port 0).
    pub async fn start(&mut self, routes: Router<Arc<GatewayState>>) -> Result<SocketAddr, GatewayError> {
        let addr = self.config.bind_addr;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| GatewayError::Bind { addr, source })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let router = self.router(routes);
        info!(addr = %local_addr, "Starting mock gateway");
        self.server = Some(tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                error!(error = %e, "Mock gateway server error");
            }
            info!("Mock gateway stopped");
        }));
        Ok(local_addr)
    }

    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(&mut self) -> Result<(), GatewayError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            server
                .await
                .map_err(|e| GatewayError::Server(e.to_string()))?;
        }
        Ok(())
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mock-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Encoding, HashAlgorithm, SigningAlgorithm};

    fn protocol(secret: &str) -> SignatureProtocol {
        SignatureProtocol::new(SigningConfig::with_key(secret)).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            MockGateway::new(GatewayConfig::default(), protocol("s")),
            Err(GatewayError::Config(_))
        ));
        assert!(MockGateway::new(GatewayConfig::default().with_api_keys(["k"]), protocol("s")).is_ok());
    }

    #[test]
    fn test_set_protocol_swaps() {
        let gateway = MockGateway::new(GatewayConfig::default().with_api_keys(["k"]), protocol("s")).unwrap();
        let before = gateway.state().protocol();
        let replacement = SignatureProtocol::new(
            SigningConfig::with_key("s")
                .algorithm(SigningAlgorithm::Hmac, HashAlgorithm::Sha512)
                .encodings(Encoding::HexStr, Encoding::Base58),
        )
        .unwrap();
        gateway.set_protocol(replacement);

        let after = gateway.state().protocol();
        assert_eq!(before.hash_algorithm(), HashAlgorithm::Sha256);
        assert_eq!(after.hash_algorithm(), HashAlgorithm::Sha512);
        assert_eq!(after.post_encoding(), Encoding::Base58);
    }

    #[test]
    fn test_from_settings_requires_valid_config() {
        assert!(matches!(
            MockGateway::from_settings(&ConformanceConfig::default()),
            Err(GatewayError::Config(_))
        ));
    }
}
