//! Summary read and maintenance endpoints.
//!
//! Maintenance failures are reported in the returned `SummaryOutcome`,
//! never as HTTP errors: the summary is auxiliary data.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{ChatSessionInfo, DocumentInfo, ProfileData, TranscriptionInfo};
use crate::summary::SummaryOutcome;

#[derive(Serialize)]
pub struct SummaryResponse {
    pub profile_id: String,
    pub summary: String,
}

/// `GET /summaries/:profile_id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(profile_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let reconciler = ctx.reconciler.clone();
    let lookup_id = profile_id.clone();
    let summary = tokio::task::spawn_blocking(move || reconciler.get_summary(&lookup_id)).await?;

    match summary {
        Some(summary) => Ok(Json(SummaryResponse {
            profile_id,
            summary,
        })),
        None => Err(ApiError::NotFound(format!(
            "No summary for profile {profile_id}"
        ))),
    }
}

/// `DELETE /summaries/:profile_id` — profile erasure.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(profile_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let reconciler = ctx.reconciler.clone();
    let lookup_id = profile_id.clone();
    let removed =
        tokio::task::spawn_blocking(move || reconciler.delete_summary(&lookup_id)).await??;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "No summary for profile {profile_id}"
        )))
    }
}

/// `POST /summaries/initial`
pub async fn create_initial(
    State(ctx): State<ApiContext>,
    Json(profile): Json<ProfileData>,
) -> Result<Json<SummaryOutcome>, ApiError> {
    require_id("profile_id", &profile.profile_id)?;
    let reconciler = ctx.reconciler.clone();
    let outcome = tokio::task::spawn_blocking(move || reconciler.create_initial(&profile)).await?;
    Ok(Json(outcome))
}

/// `POST /summaries/:profile_id/documents`
pub async fn update_from_document(
    State(ctx): State<ApiContext>,
    Path(profile_id): Path<String>,
    Json(doc): Json<DocumentInfo>,
) -> Result<Json<SummaryOutcome>, ApiError> {
    require_id("document_id", &doc.document_id)?;
    let reconciler = ctx.reconciler.clone();
    let outcome =
        tokio::task::spawn_blocking(move || reconciler.update_from_document(&profile_id, &doc))
            .await?;
    Ok(Json(outcome))
}

/// `POST /summaries/:profile_id/chat-sessions`
pub async fn update_from_chat_session(
    State(ctx): State<ApiContext>,
    Path(profile_id): Path<String>,
    Json(chat): Json<ChatSessionInfo>,
) -> Result<Json<SummaryOutcome>, ApiError> {
    require_id("session_id", &chat.session_id)?;
    let reconciler = ctx.reconciler.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        reconciler.update_from_chat_session(&profile_id, &chat)
    })
    .await?;
    Ok(Json(outcome))
}

/// `POST /summaries/:profile_id/transcriptions`
pub async fn update_from_transcription(
    State(ctx): State<ApiContext>,
    Path(profile_id): Path<String>,
    Json(voice): Json<TranscriptionInfo>,
) -> Result<Json<SummaryOutcome>, ApiError> {
    require_id("transcription_id", &voice.transcription_id)?;
    let reconciler = ctx.reconciler.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        reconciler.update_from_transcription(&profile_id, &voice)
    })
    .await?;
    Ok(Json(outcome))
}

fn require_id(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}
