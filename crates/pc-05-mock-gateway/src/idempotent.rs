//! Idempotent route helpers.
//!
//! Handlers of mutating operations wrap their work in [`idempotent`]: the
//! first request carrying an `idempotencyKey` runs the handler, identical
//! retries get the recorded response, and conflicting retries get 400
//! `used-idempotency-key`.

use crate::service::GatewayState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pc_03_idempotency::{IdempotencyError, ResponseSink};
use serde_json::Value;
use std::future::Future;
use tracing::debug;

/// Run `handler` at most once per idempotency key of `request`.
pub async fn idempotent<F, Fut>(state: &GatewayState, request: &Value, handler: F) -> Response
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = (StatusCode, Value)>,
{
    let outcome = state
        .idempotency()
        .execute(request, move || async move {
            let (status, body) = handler().await;
            (status.as_u16(), body)
        })
        .await;
    if outcome.replayed {
        debug!(status = outcome.status_code, "Answered from idempotency store");
    }
    json_response(outcome.status_code, outcome.body)
}

/// Answer a retried request straight from the store.
///
/// # Errors
///
/// `IdempotencyError::NoPreviousIdempotentRequest` if nothing is recorded for
/// the key.
pub fn replay_response(state: &GatewayState, request: &Value) -> Result<Response, IdempotencyError> {
    let mut sink = HttpResponseSink::default();
    state.idempotency().reply(request, &mut sink)?;
    Ok(sink.into_response())
}

/// [`ResponseSink`] producing an axum response.
#[derive(Debug, Default)]
pub struct HttpResponseSink {
    response: Option<(u16, Value)>,
}

impl ResponseSink for HttpResponseSink {
    fn send(&mut self, status: u16, body: Value) {
        self.response = Some((status, body));
    }
}

impl IntoResponse for HttpResponseSink {
    fn into_response(self) -> Response {
        match self.response {
            Some((status, body)) => json_response(status, body),
            None => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn json_response(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}
