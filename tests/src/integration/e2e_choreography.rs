//! # End-to-End Choreography
//!
//! The full outbound and inbound pipeline over real HTTP:
//!
//! 1. **Client (pc-06)** signs with the shared protocol (pc-01)
//! 2. **Gateway (pc-05)** checks headers, API key, replay window (pc-02) and
//!    signature
//! 3. **Handler** runs behind the idempotency store (pc-03)
//! 4. **Client** validates the response against the OpenAPI schema (pc-04)

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        p256_key, rsa_key, Provider, TransferLedger, HMAC_SECRET, NOW,
    };
    use axum::{routing::get, Json, Router};
    use pc_01_request_signing::{SignatureProtocol, SigningConfig};
    use pc_06_conformance_client::{ApiRequest, FindingKind, Probe};
    use serde_json::json;
    use shared_crypto::ParsedKey;
    use shared_types::{
        Encoding, HashAlgorithm, SigningAlgorithm, TimeSource, API_KEY_HEADER, TIMESTAMP_HEADER,
    };
    use std::sync::Arc;

    fn hmac() -> SignatureProtocol {
        SignatureProtocol::new(SigningConfig::with_key(HMAC_SECRET)).unwrap()
    }

    fn transfer(amount: &str) -> ApiRequest {
        ApiRequest::post(
            "/v1/transfers",
            json!({"idempotencyKey": "transfer-1", "amount": amount, "asset": "BTC"}),
        )
    }

    // =============================================================================
    // SIGN → GATEWAY → IDEMPOTENCY → SCHEMA
    // =============================================================================

    #[tokio::test]
    async fn test_transfer_executes_once_and_replays() {
        let provider = Provider::start(hmac()).await;
        let client = provider.client(hmac());

        let first = client.send(&transfer("0.5")).await.unwrap();
        assert_eq!(first.status, 201);
        assert_eq!(first.body, json!({"transferId": "tx-1", "status": "SUBMITTED"}));

        // New nonce, same body: answered from the store
        let retry = client.send(&transfer("0.5")).await.unwrap();
        assert_eq!(retry, first);
        assert_eq!(provider.ledger.executions(), 1);

        let conflicting = client.send(&transfer("0.6")).await.unwrap();
        assert_eq!(conflicting.status, 400);
        assert_eq!(conflicting.error_type(), Some("used-idempotency-key"));
        assert_eq!(conflicting.property_name(), Some("idempotencyKey"));
        assert_eq!(provider.ledger.executions(), 1);

        assert!(client.findings().is_empty());
        provider.stop().await;
    }

    #[tokio::test]
    async fn test_concurrent_identical_transfers_run_handler_once() {
        let provider = Provider::start(hmac()).await;
        let client = Arc::new(provider.client(hmac()));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let client = Arc::clone(&client);
            tasks.push(tokio::spawn(async move { client.send(&transfer("1")).await.unwrap() }));
        }
        let mut bodies = Vec::new();
        for task in tasks {
            let response = task.await.unwrap();
            assert_eq!(response.status, 201);
            bodies.push(response.body);
        }

        assert_eq!(provider.ledger.executions(), 1);
        assert!(bodies.iter().all(|body| body == &bodies[0]));
        provider.stop().await;
    }

    #[tokio::test]
    async fn test_templated_route_is_validated() {
        let provider = Provider::start(hmac()).await;
        let client = provider.client(hmac());

        let request = ApiRequest::get("/v1/vaults/1?expand=true").template("/v1/vaults/{vaultId}");
        let response = client.send(&request).await.unwrap();
        assert_eq!(response.status, 200);
        assert!(client.findings().is_empty());
        provider.stop().await;
    }

    // =============================================================================
    // NON-CONFORMING PROVIDER
    // =============================================================================

    #[tokio::test]
    async fn test_wrong_field_type_becomes_finding() {
        let routes = Router::new().route(
            "/v1/vaults",
            get(|| async { Json(json!({"vaults": [{"id": "1", "name": 7}]})) }),
        );
        let provider = Provider::start_with(hmac(), routes, TransferLedger::default()).await;
        let client = provider.client(hmac());

        let response = client.send(&ApiRequest::get("/v1/vaults")).await.unwrap();
        assert_eq!(response.status, 200);

        let findings = client.take_findings();
        assert_eq!(findings.len(), 1);
        let FindingKind::SchemaViolation { violation } = &findings[0].kind else {
            panic!("expected schema violation, got {:?}", findings[0].kind);
        };
        assert_eq!(violation.keyword, "type");
        assert_eq!(violation.instance_path, "/vaults/0/name");
        provider.stop().await;
    }

    // =============================================================================
    // REPLAY WINDOW AND PROBES
    // =============================================================================

    #[tokio::test]
    async fn test_replay_window_boundary() {
        let provider = Provider::start(hmac()).await;
        let client = provider.client(hmac());
        let request = ApiRequest::get("/v1/vaults");

        // now - TTL - 1ms is expired
        let expired = client
            .probe(Probe::StaleTimestamp { age_ms: 10_001 }, &request)
            .await
            .unwrap();
        assert!(expired.passed);
        assert_eq!(expired.response.property_name(), Some(TIMESTAMP_HEADER));

        // now - TTL + 1ms is accepted, so the probe reports a finding
        let fresh = client
            .probe(Probe::StaleTimestamp { age_ms: 9_999 }, &request)
            .await
            .unwrap();
        assert!(!fresh.passed);
        assert_eq!(fresh.response.status, 200);
        assert_eq!(
            client.take_findings()[0].kind,
            FindingKind::UnexpectedStatus { expected: 400, actual: 200 }
        );
        provider.stop().await;
    }

    #[tokio::test]
    async fn test_nonce_accepted_once_after_clock_moves() {
        let provider = Provider::start(hmac()).await;
        let client = provider.client(hmac());

        let report = client
            .probe(Probe::ReplayedNonce, &ApiRequest::get("/v1/vaults"))
            .await
            .unwrap();
        assert!(report.passed);

        // Still rejected as reused while inside the window
        provider.clock.advance(5_000);
        assert!(client
            .probe(Probe::ReplayedNonce, &ApiRequest::get("/v1/vaults?page=2"))
            .await
            .unwrap()
            .passed);
        assert_eq!(provider.clock.now_ms(), NOW + 5_000);
        provider.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_key_and_missing_header() {
        let provider = Provider::start(hmac()).await;
        let client = provider.client(hmac());
        let request = ApiRequest::get("/v1/vaults");

        let unknown = client.probe(Probe::UnknownApiKey, &request).await.unwrap();
        assert!(unknown.passed);
        assert_eq!(unknown.response.status, 401);

        let missing = client.probe(Probe::MissingHeader(API_KEY_HEADER), &request).await.unwrap();
        assert!(missing.passed);
        assert_eq!(missing.response.property_name(), Some(API_KEY_HEADER));
        assert_eq!(missing.response.body["requestPart"], "headers");
        provider.stop().await;
    }

    // =============================================================================
    // ASYMMETRIC PROTOCOLS
    // =============================================================================

    #[tokio::test]
    async fn test_rsa_and_ecdsa_protocols_over_http() {
        let configs = [
            SigningConfig::with_key(ParsedKey::RsaPrivate(Box::new(rsa_key().clone())))
                .algorithm(SigningAlgorithm::Rsa, HashAlgorithm::Sha512)
                .encodings(Encoding::Base64, Encoding::Base58),
            SigningConfig::with_key(ParsedKey::P256Private(p256_key().clone()))
                .algorithm(SigningAlgorithm::Ecdsa, HashAlgorithm::Sha256)
                .encodings(Encoding::HexStr, Encoding::Base32),
        ];
        for config in configs {
            let provider = Provider::start(SignatureProtocol::new(config.clone()).unwrap()).await;
            let client = provider.client(SignatureProtocol::new(config).unwrap());

            let response = client.send(&transfer("2")).await.unwrap();
            assert_eq!(response.status, 201, "{:?}", client.protocol());
            let forged = client
                .probe(Probe::InvalidSignature, &ApiRequest::get("/v1/vaults"))
                .await
                .unwrap();
            assert!(forged.passed);
            provider.stop().await;
        }
    }

    #[tokio::test]
    async fn test_rotated_gateway_protocol_rejects_old_signatures() {
        let provider = Provider::start(hmac()).await;
        let client = provider.client(hmac());
        assert_eq!(client.send(&ApiRequest::get("/v1/vaults")).await.unwrap().status, 200);

        provider.gateway.set_protocol(
            SignatureProtocol::new(
                SigningConfig::with_key(HMAC_SECRET).encodings(Encoding::Base64, Encoding::Base64),
            )
            .unwrap(),
        );
        let response = client.send(&ApiRequest::get("/v1/vaults")).await.unwrap();
        assert_eq!(response.status, 400);
        assert_eq!(response.error_type(), Some("invalid-signature"));
        provider.stop().await;
    }
}
