//! Voice-note transcription via Google Cloud Speech-to-Text V2.

pub mod auth;
pub mod google;
pub mod mock;
pub mod types;

pub use auth::*;
pub use google::*;
pub use mock::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("Transcription service is not configured: {0}")]
    NotConfigured(String),

    #[error("Cannot obtain Google access token: {0}")]
    Credentials(String),

    #[error("Recognizer '{0}' not found. Check the name and region")]
    RecognizerNotFound(String),

    #[error("Speech API returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Audio content is empty")]
    EmptyAudio,
}
