//! # Conformance Client
//!
//! Signs outbound requests with the shared [`SignatureProtocol`], sends them
//! to the provider and checks 2xx responses against the OpenAPI validator.
//!
//! ## Findings
//!
//! A response that violates its schema, or a probe answered with the wrong
//! status or `errorType`, is recorded as a [`ConformanceFinding`] and the run
//! continues. Setup problems (no validator for the operation, signing
//! failures, transport errors) are returned as [`ClientError`].
//!
//! ## Signed path
//!
//! The path that is signed is the request target as it goes on the wire:
//! the URL path after joining with the base URL, plus the raw query string.

use crate::domain::errors::ClientError;
use crate::domain::finding::{ConformanceFinding, FindingKind};
use crate::domain::probe::{Probe, ProbeReport};
use crate::domain::request::{ApiRequest, ApiResponse};
use parking_lot::Mutex;
use pc_01_request_signing::{canonical_body, SignatureProtocol, SignedHeaders};
use pc_04_schema_validation::{ResponseValidationApi, SchemaError};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Method, Url};
use serde_json::Value;
use shared_types::{SecurityHeaders, SystemTimeSource, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Provider origin, optionally with a path prefix.
    pub base_url: String,
    pub api_key: String,
    /// Applies to the whole exchange.
    pub timeout: Duration,
    pub user_agent: String,
    /// Return schema violations as errors instead of recording findings.
    pub strict_schema: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("provider-conformance/", env!("CARGO_PKG_VERSION")).to_string(),
            strict_schema: false,
        }
    }

    #[must_use]
    pub fn strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }
}

/// Signing HTTP client for one provider.
pub struct ConformanceClient {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
    protocol: Arc<SignatureProtocol>,
    validator: Option<Arc<dyn ResponseValidationApi>>,
    time_source: Arc<dyn TimeSource>,
    findings: Mutex<Vec<ConformanceFinding>>,
}

impl ConformanceClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// - `ClientError::InvalidBaseUrl` if `config.base_url` is not an
    ///   absolute http(s) URL
    /// - `ClientError::HttpClient` if the HTTP client cannot be built
    pub fn new(config: ClientConfig, protocol: Arc<SignatureProtocol>) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            config,
            protocol,
            validator: None,
            time_source: Arc::new(SystemTimeSource),
            findings: Mutex::new(Vec::new()),
        })
    }

    /// Check success responses with `validator`.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn ResponseValidationApi>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Clock used for request timestamps.
    #[must_use]
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn protocol(&self) -> &SignatureProtocol {
        &self.protocol
    }

    /// Sign and send `request`, then validate a success response.
    ///
    /// # Errors
    ///
    /// - `ClientError::Signing`, `ClientError::Transport` for a failed exchange
    /// - `ClientError::Schema` when the validator has no schema for the
    ///   operation, or in strict mode when the response violates it
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.url_for(&request.path)?;
        let headers = self.sign(request, &url, &self.config.api_key, None)?;
        let response = self.dispatch(request, &url, &headers.to_pairs()).await?;
        self.check_response(request, &response).await?;
        Ok(response)
    }

    /// Send a deliberately broken variant of `request`.
    ///
    /// A wrong answer is recorded as a finding; the report says whether the
    /// provider behaved.
    ///
    /// # Errors
    ///
    /// As [`ConformanceClient::send`], without schema checks.
    pub async fn probe(&self, probe: Probe, request: &ApiRequest) -> Result<ProbeReport, ClientError> {
        let url = self.url_for(&request.path)?;
        let api_key = self.config.api_key.as_str();

        let response = match probe {
            Probe::ReplayedNonce => {
                let pairs = self.sign(request, &url, api_key, None)?.to_pairs();
                let first = self.dispatch(request, &url, &pairs).await?;
                if !first.is_success() {
                    warn!(probe = %probe, status = first.status, "Replay probe baseline was rejected");
                }
                self.dispatch(request, &url, &pairs).await?
            }
            Probe::InvalidSignature => {
                let mut headers = self.sign(request, &url, api_key, None)?;
                // Valid encoding, wrong payload
                let forged_nonce = format!("{}-forged", headers.nonce);
                headers.signature = self.protocol.build_request_signature(
                    &request.method,
                    &wire_path(&url),
                    request.body.as_ref(),
                    headers.timestamp,
                    &forged_nonce,
                )?;
                self.dispatch(request, &url, &headers.to_pairs()).await?
            }
            Probe::MissingHeader(header) => {
                let pairs: Vec<_> = self
                    .sign(request, &url, api_key, None)?
                    .to_pairs()
                    .into_iter()
                    .filter(|(name, _)| !name.eq_ignore_ascii_case(header))
                    .collect();
                self.dispatch(request, &url, &pairs).await?
            }
            Probe::UnknownApiKey => {
                let unknown = format!("{api_key}-unknown");
                let pairs = self.sign(request, &url, &unknown, None)?.to_pairs();
                self.dispatch(request, &url, &pairs).await?
            }
            Probe::StaleTimestamp { age_ms } => {
                let timestamp = self.time_source.now_ms().saturating_sub(age_ms);
                let pairs = self.sign(request, &url, api_key, Some(timestamp))?.to_pairs();
                self.dispatch(request, &url, &pairs).await?
            }
        };

        let report = ProbeReport::evaluate(probe, response);
        if report.passed {
            debug!(probe = %probe, "Probe rejected as expected");
        } else {
            self.record_probe_failure(request, &report);
        }
        Ok(report)
    }

    /// Findings recorded so far.
    pub fn findings(&self) -> Vec<ConformanceFinding> {
        self.findings.lock().clone()
    }

    /// Drain the recorded findings.
    pub fn take_findings(&self) -> Vec<ConformanceFinding> {
        std::mem::take(&mut *self.findings.lock())
    }

    fn sign(
        &self,
        request: &ApiRequest,
        url: &Url,
        api_key: &str,
        timestamp: Option<u64>,
    ) -> Result<SecurityHeaders, ClientError> {
        let mut builder = SignedHeaders::new(&self.protocol, api_key).time_source(self.time_source.as_ref());
        if let Some(timestamp) = timestamp {
            builder = builder.timestamp(timestamp);
        }
        Ok(builder.generate(&request.method, &wire_path(url), request.body.as_ref())?)
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        url: &Url,
        headers: &[(&'static str, String)],
    ) -> Result<ApiResponse, ClientError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ClientError::InvalidMethod(request.method.clone()))?;
        let transport = |e: reqwest::Error| ClientError::Transport {
            method: request.method.clone(),
            url: url.to_string(),
            reason: e.to_string(),
        };

        let mut builder = self.http.request(method, url.clone());
        for (name, value) in headers {
            builder = builder.header(*name, value.as_str());
        }
        let body = canonical_body(request.body.as_ref());
        if !body.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(transport)?;
        let body = decode_body(&bytes);
        debug!(method = %request.method, path = %request.path, status, "Provider responded");
        Ok(ApiResponse { status, body })
    }

    async fn check_response(&self, request: &ApiRequest, response: &ApiResponse) -> Result<(), ClientError> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        if !response.is_success() {
            return Ok(());
        }

        let operation = request.operation_path();
        let outcome = validator.validate(&request.method, operation, &response.body).await?;
        let Some(violation) = outcome.error else {
            return Ok(());
        };

        if self.config.strict_schema {
            return Err(SchemaError::ResponseSchemaValidationFailed {
                method: request.method.clone(),
                url: operation.to_string(),
                response: response.body.clone(),
                error: violation,
            }
            .into());
        }
        warn!(
            method = %request.method,
            url = operation,
            instance_path = %violation.instance_path,
            keyword = %violation.keyword,
            "Response violates its schema"
        );
        self.findings.lock().push(ConformanceFinding::new(
            &request.method,
            &request.path,
            response.status,
            FindingKind::SchemaViolation { violation },
            response.body.clone(),
        ));
        Ok(())
    }

    fn record_probe_failure(&self, request: &ApiRequest, report: &ProbeReport) {
        let expected_status = report.probe.expected_status();
        let kind = if report.response.status == expected_status {
            FindingKind::UnexpectedErrorType {
                expected: report.probe.expected_error_type().as_str().to_string(),
                actual: report.response.error_type().map(str::to_string),
            }
        } else {
            FindingKind::UnexpectedStatus {
                expected: expected_status,
                actual: report.response.status,
            }
        };
        let finding = ConformanceFinding::new(
            &request.method,
            &request.path,
            report.response.status,
            kind,
            report.response.body.clone(),
        );
        info!(probe = %report.probe, finding = %finding, "Probe not rejected as required");
        self.findings.lock().push(finding);
    }

    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| ClientError::InvalidBaseUrl {
            url: joined,
            reason: e.to_string(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("base url must not carry a query or fragment".to_string()));
    }
    Ok(url)
}

/// Response body as JSON. An empty body is `null`; a body that is not JSON
/// (an HTML error page, plain text) becomes a string value.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Request target as sent: path plus raw query.
fn wire_path(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
