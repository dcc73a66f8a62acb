use super::TranscriptionError;

/// Turn recorded audio into text.
pub trait Transcriber: Send + Sync {
    /// `profile_id` is used for logging only.
    fn transcribe(&self, audio: &[u8], profile_id: &str) -> Result<String, TranscriptionError>;
}
