//! Evidence units: per-event inputs that may change a stored summary.
//! Built by callers, never persisted here.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::{ChatRole, EvidenceKind};

/// Text extracted from an uploaded or scanned document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub document_date: Option<NaiveDate>,
    pub extracted_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// A finished chat session between the user and the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionInfo {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub ended_at: Option<NaiveDateTime>,
}

/// Text of a transcribed voice note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionInfo {
    pub transcription_id: String,
    pub transcript: String,
    #[serde(default)]
    pub recorded_at: Option<NaiveDateTime>,
}

impl DocumentInfo {
    pub fn source_tag(&self) -> String {
        source_tag(EvidenceKind::Document, &self.document_id)
    }

    pub fn has_content(&self) -> bool {
        !self.extracted_text.trim().is_empty()
    }
}

impl ChatSessionInfo {
    pub fn source_tag(&self) -> String {
        source_tag(EvidenceKind::ChatSession, &self.session_id)
    }

    pub fn has_content(&self) -> bool {
        self.messages.iter().any(|m| !m.content.trim().is_empty())
    }
}

impl TranscriptionInfo {
    pub fn source_tag(&self) -> String {
        source_tag(EvidenceKind::Transcription, &self.transcription_id)
    }

    pub fn has_content(&self) -> bool {
        !self.transcript.trim().is_empty()
    }
}

/// `<kind>:<id>`, the value stored in `last_updated_source`.
pub fn source_tag(kind: EvidenceKind, id: &str) -> String {
    format!("{}:{}", kind.as_str(), id)
}
