//! # Provider-Conformance Benchmarks
//!
//! Per-request cost of the authentication and validation engine:
//!
//! | Component | Operation |
//! |-----------|-----------|
//! | shared-crypto | codec encode/decode per encoding |
//! | pc-01 Request Signing | sign + verify per algorithm |
//! | pc-02 Replay Guard | nonce admission |
//! | pc-04 Schema Validation | compiled validator lookup + validate |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pc_01_request_signing::{SignaturePayload, SignatureProtocol, SigningConfig};
use pc_02_replay_guard::{ReplayGuard, ReplayPolicy};
use pc_04_schema_validation::{OpenApiSource, ValidatorIndex};
use pc_tests::fixtures::{p256_key, rsa_key, VAULTS_OPENAPI};
use serde_json::json;
use shared_crypto::{codec_for, Codec, ParsedKey};
use shared_types::{Encoding, HashAlgorithm, ManualTimeSource, SigningAlgorithm};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Codecs
// ============================================================================

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-crypto-codecs");
    let payload = "1700000000000b1c6a8e2-nonce POST/v1/transfers{\"amount\":\"0.01\",\"asset\":\"BTC\"}";
    let signature = [0xA5u8; 256];

    for encoding in Encoding::ALL {
        let codec = codec_for(encoding);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", encoding), &payload, |b, payload| {
            b.iter(|| black_box(codec.encode(payload)))
        });

        let encoded = codec.encode_bytes(&signature);
        group.throughput(Throughput::Bytes(signature.len() as u64));
        group.bench_with_input(BenchmarkId::new("decode_to_bytes", encoding), &encoded, |b, text| {
            b.iter(|| black_box(codec.decode_to_bytes(text).unwrap()))
        });
    }
    group.finish();
}

// ============================================================================
// PC-01: Sign / Verify
// ============================================================================

fn bench_sign_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("pc-01-request-signing");
    group.measurement_time(Duration::from_secs(10));

    let configs = [
        (
            "hmac-sha256",
            SigningConfig::with_key("bench-secret"),
        ),
        (
            "rsa-sha256",
            SigningConfig::with_key(ParsedKey::RsaPrivate(Box::new(rsa_key().clone())))
                .algorithm(SigningAlgorithm::Rsa, HashAlgorithm::Sha256),
        ),
        (
            "ecdsa-p256",
            SigningConfig::with_key(ParsedKey::P256Private(p256_key().clone()))
                .algorithm(SigningAlgorithm::Ecdsa, HashAlgorithm::Sha256),
        ),
    ];
    let payload = SignaturePayload::new(
        1_700_000_000_000,
        "b1c6a8e2-nonce",
        "POST",
        "/v1/transfers",
        Some(&json!({"amount": "0.01", "asset": "BTC", "idempotencyKey": "k-1"})),
    );

    for (name, config) in configs {
        let protocol = SignatureProtocol::new(config).unwrap();
        let signature = protocol.sign_payload(&payload).unwrap();

        group.bench_function(BenchmarkId::new("sign", name), |b| {
            b.iter(|| black_box(protocol.sign_payload(&payload).unwrap()))
        });
        group.bench_function(BenchmarkId::new("verify", name), |b| {
            b.iter(|| black_box(protocol.verify_signature(&payload, &signature).unwrap()))
        });
    }
    group.finish();
}

// ============================================================================
// PC-02: Replay Guard
// ============================================================================

fn bench_replay_guard(c: &mut Criterion) {
    let mut group = c.benchmark_group("pc-02-replay-guard");
    let now = 1_700_000_000_000;
    let guard = ReplayGuard::with_time_source(ReplayPolicy::default(), Arc::new(ManualTimeSource::new(now)));
    let counter = AtomicU64::new(0);

    group.bench_function("admit_fresh_nonce", |b| {
        b.iter(|| {
            let nonce = counter.fetch_add(1, Ordering::Relaxed).to_string();
            black_box(guard.admit("bench-key", &nonce, now).is_ok())
        })
    });
    group.bench_function("reject_reused_nonce", |b| {
        guard.admit("bench-key", "reused", now).unwrap();
        b.iter(|| black_box(guard.check("bench-key", "reused", now).is_err()))
    });
    group.finish();
}

// ============================================================================
// PC-04: Schema Validation
// ============================================================================

fn bench_schema_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pc-04-schema-validation");
    let index = ValidatorIndex::load(&OpenApiSource::inline(VAULTS_OPENAPI)).unwrap();

    for size in [1usize, 100, 1_000] {
        let vaults: Vec<_> = (0..size)
            .map(|i| json!({"id": i.to_string(), "name": format!("vault-{i}")}))
            .collect();
        let body = json!({ "vaults": vaults });
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("validate_vault_list", size), &body, |b, body| {
            b.iter(|| black_box(index.validate("GET", "/v1/vaults", body).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_codecs,
    bench_sign_verify,
    bench_replay_guard,
    bench_schema_validation,
);

criterion_main!(benches);
