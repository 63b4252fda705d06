use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use engines::{ChatReply, ChatRequest, UseCase};
use extract::Extracted;
use forms::FormError;
use gateway::GatewayError;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics::{MetricsSnapshot, RequestOutcome, TimedOperation};
use crate::state::AppState;

pub const CHAT: &str = "chat";

/// One structured engine behind one route.
pub async fn run_use_case<U: UseCase + 'static>(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Response {
    let work = handle_use_case::<U>(&state, &body);

    respond(&state, U::NAME, work, |extracted: Extracted| {
        let outcome = if extracted.is_degraded() {
            RequestOutcome::Degraded
        } else {
            RequestOutcome::Success
        };
        (outcome, Json(extracted.into_body()).into_response())
    })
    .await
}

async fn handle_use_case<U: UseCase>(state: &AppState, body: &[u8]) -> Result<Extracted, ApiError> {
    let request: U::Request = serde_json::from_slice(body)?;
    U::validate(&request)?;
    Ok(state.engines.run::<U>(&request).await?)
}

pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let work = handle_chat(&state, &body);

    respond(&state, CHAT, work, |reply: ChatReply| {
        (RequestOutcome::Success, Json(reply).into_response())
    })
    .await
}

async fn handle_chat(state: &AppState, body: &[u8]) -> Result<ChatReply, ApiError> {
    let request: ChatRequest = serde_json::from_slice(body)?;
    if request.messages.is_empty() {
        return Err(FormError::Missing("messages").into());
    }
    Ok(state.engines.chat(&request).await?)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Run `work` inside a request span, turn its result into a response and
/// record it.
async fn respond<T, F>(
    state: &AppState,
    endpoint: &'static str,
    work: F,
    success: impl FnOnce(T) -> (RequestOutcome, Response),
) -> Response
where
    F: Future<Output = Result<T, ApiError>>,
{
    let span = tracing::info_span!("request", id = %Uuid::new_v4(), endpoint);
    let timer = TimedOperation::start();

    let (outcome, response) = async {
        match work.await {
            Ok(value) => success(value),
            Err(e) => (failure_outcome(&e), e.into_response()),
        }
    }
    .instrument(span)
    .await;

    state.metrics.record(endpoint, outcome, timer.elapsed());
    response
}

fn failure_outcome(err: &ApiError) -> RequestOutcome {
    match err {
        ApiError::Gateway(GatewayError::RateLimited) => RequestOutcome::RateLimited,
        ApiError::Gateway(GatewayError::QuotaExhausted) => RequestOutcome::QuotaExhausted,
        _ => RequestOutcome::Failed,
    }
}
