//! HTTP surface: `POST /ask` and a liveness probe.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use runtime::{Agent, Backend, Runner, Session};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

/// Everything a request needs, built once at startup and shared read-only.
pub struct AppState<B> {
    pub runner: Runner<B>,
    pub agent: Agent,
    pub session: Session,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

/// A failed run, reported as a bare 500.
#[derive(Debug)]
pub struct ApiError(runtime::Error);

impl From<runtime::Error> for ApiError {
    fn from(err: runtime::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "agent run failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

pub fn router<B: Backend + 'static>(state: Arc<AppState<B>>) -> Router {
    Router::new()
        .route("/ask", post(ask::<B>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ask<B: Backend + 'static>(
    State(state): State<Arc<AppState<B>>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let result = state
        .runner
        .run(&state.agent, &request.prompt, &state.session)
        .await?;
    Ok(Json(AskResponse {
        response: result.final_output,
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
