//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm_model: String,
    /// Whether the text-generation backend can serve `llm_model` right now.
    pub llm_available: bool,
}

/// `GET /health` — liveness check, no auth.
///
/// Reports `ok` even when the LLM is down: summary maintenance degrades
/// to logged no-ops, the service itself stays up.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let reconciler = ctx.reconciler.clone();
    let llm_available = tokio::task::spawn_blocking(move || reconciler.llm_available()).await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        llm_model: ctx.reconciler.model().to_string(),
        llm_available,
    }))
}
