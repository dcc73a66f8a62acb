use std::sync::Mutex;

use super::types::Transcriber;
use super::TranscriptionError;

/// Fixed-transcript transcriber for tests and offline runs.
pub struct MockTranscriber {
    transcript: Option<String>,
    calls: Mutex<usize>,
}

impl MockTranscriber {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            calls: Mutex::new(0),
        }
    }

    /// Every call fails with a 500 from the "API".
    pub fn failing() -> Self {
        Self {
            transcript: None,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, audio: &[u8], _profile_id: &str) -> Result<String, TranscriptionError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }
        self.transcript.clone().ok_or(TranscriptionError::Api {
            status: 500,
            body: "mock failure".into(),
        })
    }
}
