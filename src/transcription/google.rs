use std::sync::Arc;

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::auth::AccessTokenSource;
use super::types::Transcriber;
use super::TranscriptionError;
use crate::config::SpeechConfig;

const SPEECH_BASE_URL: &str = "https://speech.googleapis.com/v2";
const SPEECH_TIMEOUT_SECS: u64 = 120;

/// Synchronous `recognize` against a configured V2 recognizer.
/// Audio is sent inline as M4A/AAC, en-US, model `long`.
pub struct GoogleSpeechClient {
    base_url: String,
    recognizer: String,
    tokens: Arc<dyn AccessTokenSource>,
    client: reqwest::blocking::Client,
}

impl GoogleSpeechClient {
    pub fn new(
        config: &SpeechConfig,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, TranscriptionError> {
        Self::with_base_url(SPEECH_BASE_URL, config, tokens)
    }

    pub fn with_base_url(
        base_url: &str,
        config: &SpeechConfig,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, TranscriptionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(SPEECH_TIMEOUT_SECS))
            .build()
            .map_err(|e| TranscriptionError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            recognizer: config.recognizer_name.trim_matches('/').to_string(),
            tokens,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:recognize", self.base_url, self.recognizer)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    explicit_decoding_config: ExplicitDecodingConfig<'a>,
    language_codes: Vec<&'a str>,
    model: &'a str,
}

#[derive(Serialize)]
struct ExplicitDecodingConfig<'a> {
    encoding: &'a str,
}

#[derive(Deserialize, Default)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

fn build_request(audio: &[u8]) -> RecognizeRequest<'static> {
    RecognizeRequest {
        config: RecognitionConfig {
            explicit_decoding_config: ExplicitDecodingConfig { encoding: "M4A_AAC" },
            language_codes: vec!["en-US"],
            model: "long",
        },
        content: base64::engine::general_purpose::STANDARD.encode(audio),
    }
}

/// Top alternative of each result, joined with single spaces.
fn join_transcript(response: RecognizeResponse) -> String {
    response
        .results
        .into_iter()
        .filter_map(|r| r.alternatives.into_iter().next())
        .map(|a| a.transcript.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Transcriber for GoogleSpeechClient {
    fn transcribe(&self, audio: &[u8], profile_id: &str) -> Result<String, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }
        // Fetched per request so refreshed credentials are picked up.
        let token = self.tokens.access_token()?;

        tracing::info!(
            profile_id,
            audio_bytes = audio.len(),
            credentials = self.tokens.kind(),
            "Starting V2 transcription"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&token)
            .json(&build_request(audio))
            .send()
            .map_err(|e| TranscriptionError::HttpClient(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TranscriptionError::RecognizerNotFound(self.recognizer.clone()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TranscriptionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RecognizeResponse = response
            .json()
            .map_err(|e| TranscriptionError::ResponseParsing(e.to_string()))?;

        let transcript = join_transcript(parsed);
        if transcript.is_empty() {
            tracing::warn!(profile_id, "Transcription returned no speech");
        } else {
            tracing::info!(profile_id, transcript_chars = transcript.len(), "Transcription complete");
        }
        Ok(transcript)
    }
}
