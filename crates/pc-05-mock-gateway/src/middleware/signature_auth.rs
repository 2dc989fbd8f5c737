//! Request signature authentication.
//!
//! Checks, in order, stopping at the first failure:
//!
//! 1. All four `X-FBAPI-*` headers are present and well formed
//! 2. The API key is registered (401 otherwise)
//! 3. Nonce and timestamp pass the replay check (nothing recorded yet)
//! 4. The body fits the size limit and is JSON (or empty)
//! 5. The signature matches the canonical payload
//! 6. The nonce is recorded; a concurrent duplicate loses here
//!
//! Authenticated requests continue with their body restored and an
//! [`AuthenticatedRequest`] extension attached.

use crate::domain::error::Rejection;
use crate::service::GatewayState;
use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::{IntoResponse, Response},
};
use pc_01_request_signing::SignaturePayload;
use shared_types::SecurityHeaders;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Identity of an authenticated request, available to handlers as an
/// extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedRequest {
    pub api_key: String,
    pub nonce: String,
    pub timestamp: u64,
}

/// Signature authentication layer
#[derive(Clone)]
pub struct SignatureAuthLayer {
    state: Arc<GatewayState>,
}

impl SignatureAuthLayer {
    pub fn new(state: Arc<GatewayState>) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for SignatureAuthLayer {
    type Service = SignatureAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SignatureAuthService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

/// Signature authentication service
#[derive(Clone)]
pub struct SignatureAuthService<S> {
    inner: S,
    state: Arc<GatewayState>,
}

impl<S> Service<Request<Body>> for SignatureAuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let method = req.method().clone();
            let path = req.uri().path().to_string();
            match authenticate(&state, req).await {
                Ok(req) => inner.call(req).await,
                Err(rejection) => {
                    warn!(
                        %method,
                        path,
                        status = rejection.status.as_u16(),
                        error_type = %rejection.body.error_type,
                        "Request rejected"
                    );
                    Ok(rejection.into_response())
                }
            }
        })
    }
}

async fn authenticate(state: &GatewayState, req: Request<Body>) -> Result<Request<Body>, Rejection> {
    let headers = SecurityHeaders::from_lookup(|name| {
        req.headers().get(name).and_then(|value| value.to_str().ok())
    })?;

    if !state.api_keys().contains(&headers.api_key) {
        return Err(Rejection::unauthorized());
    }

    state
        .replay_guard()
        .check(&headers.api_key, &headers.nonce, headers.timestamp)?;

    let (parts, body) = req.into_parts();
    let limit = state.max_body_bytes();
    let bytes = to_bytes(body, limit)
        .await
        .map_err(|_| Rejection::body_too_large(limit))?;

    let path = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path(), |pq| pq.as_str());
    let payload = SignaturePayload::from_raw_body(
        headers.timestamp,
        headers.nonce.clone(),
        parts.method.as_str(),
        path,
        &bytes,
    )?;

    if !state.protocol().verify_signature(&payload, &headers.signature)? {
        return Err(Rejection::invalid_signature());
    }

    state
        .replay_guard()
        .record(&headers.api_key, &headers.nonce, headers.timestamp)?;

    debug!(
        api_key = %headers.api_key,
        nonce = %headers.nonce,
        method = %parts.method,
        path,
        "Request authenticated"
    );

    let mut req = Request::from_parts(parts, Body::from(bytes));
    req.extensions_mut().insert(AuthenticatedRequest {
        api_key: headers.api_key,
        nonce: headers.nonce,
        timestamp: headers.timestamp,
    });
    Ok(req)
}
