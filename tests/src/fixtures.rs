//! # Shared Fixtures
//!
//! Test keys, the reference OpenAPI document and a live mock provider.

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};
use conformance_telemetry::{init_logging, TelemetryConfig};
use pc_01_request_signing::SignatureProtocol;
use pc_04_schema_validation::{OpenApiSource, ResponseValidator, ValidatorIndex};
use pc_05_mock_gateway::{idempotent, GatewayConfig, GatewayState, MockGateway};
use pc_06_conformance_client::{ClientConfig, ConformanceClient};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use shared_types::ManualTimeSource;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Fixed wall clock for every scenario (ms).
pub const NOW: u64 = 1_700_000_000_000;

pub const API_KEY: &str = "conformance-key";

/// Shared secret of the default HMAC protocol.
pub const HMAC_SECRET: &str = "conformance-secret";

/// Provider contract used by the scenarios.
pub const VAULTS_OPENAPI: &str = r##"
openapi: 3.0.3
info: {title: vault provider, version: "1.0.0"}
paths:
  /v1/vaults:
    get:
      responses:
        "200":
          content:
            application/json:
              schema:
                type: object
                required: [vaults]
                properties:
                  vaults:
                    type: array
                    items: {$ref: "#/components/schemas/Vault"}
  /v1/vaults/{vaultId}:
    get:
      responses:
        "200":
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Vault"}
  /v1/transfers:
    post:
      responses:
        "201":
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Transfer"}
        "400":
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Error"}
components:
  schemas:
    Vault:
      type: object
      required: [id, name]
      properties:
        id: {type: string}
        name: {type: string}
        hidden: {type: boolean, nullable: true}
    Transfer:
      type: object
      required: [transferId, status]
      properties:
        transferId: {type: string}
        status: {type: string, enum: [SUBMITTED, COMPLETED]}
    Error:
      type: object
      required: [message, errorType]
      properties:
        message: {type: string}
        errorType: {type: string}
"##;

/// Install logging once for the whole test binary.
///
/// Quiet by default; `PC_LOG_LEVEL=debug` shows the pipeline.
pub fn init_test_logging() {
    let mut config = TelemetryConfig::from_env();
    if std::env::var("PC_LOG_LEVEL").is_err() && std::env::var("RUST_LOG").is_err() {
        config.log_level = "warn".to_string();
    }
    let _ = init_logging(&config);
}

/// One 2048-bit RSA key per test binary.
pub fn rsa_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap())
}

/// PKCS#1 PEM of [`rsa_key`].
pub fn rsa_pkcs1_pem() -> String {
    rsa_key().to_pkcs1_pem(LineEnding::LF).unwrap().to_string()
}

pub fn p256_key() -> &'static p256::SecretKey {
    static KEY: OnceLock<p256::SecretKey> = OnceLock::new();
    KEY.get_or_init(|| p256::SecretKey::random(&mut rand::thread_rng()))
}

/// PKCS#8 DER of [`p256_key`].
pub fn p256_pkcs8_der() -> Vec<u8> {
    use p256::pkcs8::EncodePrivateKey;
    p256_key().to_pkcs8_der().unwrap().as_bytes().to_vec()
}

/// Validator over [`VAULTS_OPENAPI`], already built.
pub fn vaults_validator() -> Arc<ResponseValidator> {
    let index = ValidatorIndex::load(&OpenApiSource::inline(VAULTS_OPENAPI)).unwrap();
    Arc::new(ResponseValidator::ready(index))
}

/// Number of times the transfer handler actually ran.
#[derive(Clone, Default)]
pub struct TransferLedger(Arc<AtomicUsize>);

impl TransferLedger {
    pub fn executions(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

async fn create_transfer(
    State(state): State<Arc<GatewayState>>,
    Extension(ledger): Extension<TransferLedger>,
    Json(body): Json<Value>,
) -> Response {
    idempotent(&state, &body, || async move {
        let n = ledger.0.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::task::yield_now().await;
        (
            StatusCode::CREATED,
            json!({"transferId": format!("tx-{n}"), "status": "SUBMITTED"}),
        )
    })
    .await
}

/// Routes of a provider that honours [`VAULTS_OPENAPI`].
pub fn conforming_routes(ledger: TransferLedger) -> Router<Arc<GatewayState>> {
    Router::new()
        .route(
            "/v1/vaults",
            get(|| async { Json(json!({"vaults": [{"id": "1", "name": "main", "hidden": null}]})) }),
        )
        .route(
            "/v1/vaults/:vault_id",
            get(|| async { Json(json!({"id": "1", "name": "main"})) }),
        )
        .route("/v1/transfers", post(create_transfer))
        .layer(Extension(ledger))
}

/// A mock provider serving on a loopback port.
pub struct Provider {
    pub gateway: MockGateway,
    pub addr: SocketAddr,
    pub clock: Arc<ManualTimeSource>,
    pub ledger: TransferLedger,
}

impl Provider {
    /// Start a conforming provider.
    pub async fn start(protocol: SignatureProtocol) -> Self {
        let ledger = TransferLedger::default();
        Self::start_with(protocol, conforming_routes(ledger.clone()), ledger).await
    }

    /// Start a provider with custom routes.
    pub async fn start_with(
        protocol: SignatureProtocol,
        routes: Router<Arc<GatewayState>>,
        ledger: TransferLedger,
    ) -> Self {
        init_test_logging();
        let clock = Arc::new(ManualTimeSource::new(NOW));
        let config = GatewayConfig::default()
            .with_api_keys([API_KEY])
            .with_bind_addr("127.0.0.1:0".parse().unwrap());
        let mut gateway = MockGateway::with_time_source(config, protocol, clock.clone()).unwrap();
        let addr = gateway.start(routes).await.unwrap();
        Self {
            gateway,
            addr,
            clock,
            ledger,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client sharing the provider clock and validating against
    /// [`VAULTS_OPENAPI`].
    pub fn client(&self, protocol: SignatureProtocol) -> ConformanceClient {
        ConformanceClient::new(ClientConfig::new(self.base_url(), API_KEY), Arc::new(protocol))
            .unwrap()
            .with_validator(vaults_validator())
            .with_time_source(self.clock.clone())
    }

    pub async fn stop(mut self) {
        self.gateway.shutdown().await.unwrap();
    }
}
