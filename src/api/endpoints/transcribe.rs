//! `POST /transcribe` — voice note in, transcript out.
//!
//! A non-empty transcript is also merged into the profile's health
//! summary on a detached blocking task; the response never waits on it.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::TranscriptionInfo;

/// Largest accepted audio upload (25 MB).
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

struct TranscribeForm {
    profile_id: String,
    audio: Vec<u8>,
    file_name: Option<String>,
}

pub async fn transcribe(
    State(ctx): State<ApiContext>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let form = read_form(multipart).await?;
    let profile_id = form.profile_id;

    tracing::info!(
        profile_id = %profile_id,
        file_name = form.file_name.as_deref().unwrap_or("<unnamed>"),
        audio_bytes = form.audio.len(),
        "Received transcription request"
    );

    if form.audio.is_empty() {
        tracing::error!(profile_id = %profile_id, "Received empty audio file");
        return Err(ApiError::BadRequest("Audio file is empty.".into()));
    }

    let transcriber = ctx.transcriber.clone();
    let speaker = profile_id.clone();
    let transcript =
        tokio::task::spawn_blocking(move || transcriber.transcribe(&form.audio, &speaker))
            .await??;

    if transcript.trim().is_empty() {
        tracing::info!(profile_id = %profile_id, "No speech detected, summary untouched");
    } else {
        let reconciler = ctx.reconciler.clone();
        let voice = TranscriptionInfo {
            transcription_id: uuid::Uuid::new_v4().to_string(),
            transcript: transcript.clone(),
            recorded_at: Some(chrono::Utc::now().naive_utc()),
        };
        let owner = profile_id.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = reconciler.update_from_transcription(&owner, &voice);
            tracing::debug!(profile_id = %owner, ?outcome, "Summary update after transcription");
        });
    }

    tracing::info!(profile_id = %profile_id, "Successfully generated transcript");
    Ok(Json(TranscribeResponse { transcript }))
}

async fn read_form(mut multipart: Multipart) -> Result<TranscribeForm, ApiError> {
    let mut profile_id: Option<String> = None;
    let mut audio: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("profile_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid profile_id: {e}")))?;
                profile_id = Some(text.trim().to_string());
            }
            Some("audio_file") => {
                if let Some(content_type) = field.content_type() {
                    if !content_type.starts_with("audio/") {
                        tracing::warn!(content_type, "Received file with unexpected content type");
                    }
                }
                let file_name = field.file_name().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid audio_file: {e}")))?;
                audio = Some((bytes.to_vec(), file_name));
            }
            _ => {}
        }
    }

    let profile_id = profile_id
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("profile_id is required".into()))?;
    let (audio, file_name) =
        audio.ok_or_else(|| ApiError::BadRequest("audio_file is required".into()))?;

    Ok(TranscribeForm {
        profile_id,
        audio,
        file_name,
    })
}
