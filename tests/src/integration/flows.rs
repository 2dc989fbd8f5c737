//! # Integration Test Flows
//!
//! Configuration-driven wiring and protocol-level scenarios that span
//! several crates without a running provider, plus one config-file driven
//! run against a live gateway.
//!
//! ## Flows Tested:
//!
//! 1. **TOML + env → gateway, validator, client**: every component built from
//!    one `ConformanceConfig`
//! 2. **Signer end-to-end**: `"payload"` vs `"different-payload"`
//! 3. **Encoding disagreement**: a signature under one pre-encoding never
//!    verifies under another

#[cfg(test)]
mod tests {
    use crate::fixtures::{init_test_logging, p256_pkcs8_der, rsa_pkcs1_pem, VAULTS_OPENAPI};
    use pc_01_request_signing::{SignaturePayload, SignatureProtocol, SignedHeaders, SigningConfig};
    use pc_04_schema_validation::ResponseValidator;
    use pc_05_mock_gateway::{GatewayError, MockGateway};
    use pc_06_conformance_client::{ApiRequest, ClientConfig, ConformanceClient};
    use serde_json::json;
    use shared_crypto::{codec_for, Codec, KeyMaterial, Signer};
    use shared_types::{ConfigError, ConformanceConfig, Encoding, HashAlgorithm, SigningAlgorithm};
    use std::io::Write;
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn write_temp(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    fn rsa_config_toml(key_path: &str, openapi_path: &str) -> String {
        format!(
            r#"
[signing]
signing_algorithm = "rsa"
hash_algorithm = "sha3-256"
pre_encoding = "base32"
post_encoding = "base64"
private_key_path = "{key_path}"

[replay]
request_ttl_secs = 30

[schema]
openapi_path = "{openapi_path}"

[gateway]
bind_addr = "127.0.0.1:0"
api_keys = ["from-file"]
"#
        )
    }

    // =============================================================================
    // CONFIGURATION FLOW
    // =============================================================================

    #[tokio::test]
    async fn test_config_file_drives_every_component() {
        init_test_logging();
        let key_file = write_temp(".pem", rsa_pkcs1_pem().as_bytes());
        let openapi_file = write_temp(".yaml", VAULTS_OPENAPI.as_bytes());
        let config_file = write_temp(
            ".toml",
            rsa_config_toml(
                &key_file.path().display().to_string(),
                &openapi_file.path().display().to_string(),
            )
            .as_bytes(),
        );

        let mut settings = ConformanceConfig::load(config_file.path()).unwrap();
        settings
            .apply_env_with(|name| match name {
                "PC_API_KEYS" => Some("env-key, second-key".to_string()),
                "PC_POST_ENCODING" => Some("base58".to_string()),
                _ => None,
            })
            .unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.gateway.api_keys, ["env-key", "second-key"]);
        assert_eq!(settings.signing.post_encoding, Encoding::Base58);

        let mut gateway = MockGateway::from_settings(&settings).unwrap();
        let addr = gateway
            .start(axum::Router::new().route(
                "/v1/vaults",
                axum::routing::get(|| async { axum::Json(json!({"vaults": []})) }),
            ))
            .await
            .unwrap();

        // Built in the background; the first validate waits for it
        let validator = ResponseValidator::from_settings(&settings.schema).unwrap();
        let protocol = SignatureProtocol::new(SigningConfig::from_settings(&settings.signing).unwrap()).unwrap();
        assert_eq!(protocol.signing_algorithm(), SigningAlgorithm::Rsa);

        let client = ConformanceClient::new(ClientConfig::new(format!("http://{addr}"), "second-key"), Arc::new(protocol))
            .unwrap()
            .with_validator(Arc::new(validator));
        let response = client.send(&ApiRequest::get("/v1/vaults")).await.unwrap();
        assert_eq!(response.status, 200);
        assert!(client.findings().is_empty());

        gateway.shutdown().await.unwrap();
    }

    #[test]
    fn test_ecdsa_with_sha512_rejected_before_any_component_starts() {
        let mut settings = ConformanceConfig::default();
        settings.signing.signing_algorithm = SigningAlgorithm::Ecdsa;
        settings.signing.hash_algorithm = HashAlgorithm::Sha512;
        settings.signing.private_key = Some("unused".to_string());
        settings.gateway.api_keys = vec!["k".to_string()];

        assert!(matches!(settings.validate(), Err(ConfigError::InvalidSigning(_))));
        assert!(matches!(MockGateway::from_settings(&settings), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_der_key_from_file() {
        let key_file = write_temp(".der", &p256_pkcs8_der());
        let mut settings = ConformanceConfig::default();
        settings.signing.signing_algorithm = SigningAlgorithm::Ecdsa;
        settings.signing.private_key_path = Some(key_file.path().to_path_buf());

        let protocol = SignatureProtocol::new(SigningConfig::from_settings(&settings.signing).unwrap()).unwrap();
        let headers = SignedHeaders::new(&protocol, "k")
            .nonce("n-1")
            .timestamp(1)
            .generate("GET", "/v1/vaults", None)
            .unwrap();
        let payload = SignaturePayload::new(1, "n-1", "GET", "/v1/vaults", None);
        assert!(protocol.verify_signature(&payload, &headers.signature).unwrap());
    }

    // =============================================================================
    // PROTOCOL FLOWS
    // =============================================================================

    #[test]
    fn test_hmac_payload_end_to_end() {
        let signer = Signer::for_algorithm(SigningAlgorithm::Hmac);
        let key = KeyMaterial::from("shared-secret");
        let signature = signer.sign("payload", &key, HashAlgorithm::Sha256).unwrap();

        assert!(signer.verify("payload", &key, &signature, HashAlgorithm::Sha256).unwrap());
        assert!(!signer
            .verify("different-payload", &key, &signature, HashAlgorithm::Sha256)
            .unwrap());
    }

    #[test]
    fn test_signature_travels_through_post_encoding() {
        let protocol = SignatureProtocol::new(
            SigningConfig::with_key("shared-secret").encodings(Encoding::UrlEncoded, Encoding::HexStr),
        )
        .unwrap();
        let payload = SignaturePayload::new(7, "n", "POST", "/v1/transfers", Some(&json!({"a": 1})));
        let text = protocol.sign_payload(&payload).unwrap();

        // HMAC-SHA256 tag is 32 bytes
        let raw = codec_for(Encoding::HexStr).decode_to_bytes(&text).unwrap();
        assert_eq!(raw.len(), 32);
        assert_eq!(text, text.to_lowercase());
    }

    #[test]
    fn test_pre_encoding_disagreement_never_verifies() {
        let payload = SignaturePayload::new(1, "n-1", "GET", "/v1/vaults?limit=5", None);
        for signer_pre in Encoding::ALL {
            let signer = SignatureProtocol::new(
                SigningConfig::with_key("shared-secret").encodings(signer_pre, Encoding::Base64),
            )
            .unwrap();
            let signature = signer.sign_payload(&payload).unwrap();
            for verifier_pre in Encoding::ALL {
                let verifier = SignatureProtocol::new(
                    SigningConfig::with_key("shared-secret").encodings(verifier_pre, Encoding::Base64),
                )
                .unwrap();
                assert_eq!(
                    verifier.verify_signature(&payload, &signature).unwrap(),
                    signer_pre == verifier_pre,
                    "{signer_pre} vs {verifier_pre}"
                );
            }
        }
    }
}
