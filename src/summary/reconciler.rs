//! Summary reconciler: merges evidence into the stored per-profile summary.
//!
//! Flow per update: fetch prior → build prompt → generate → sanitize →
//! (chat only) similarity gate → upsert. Each call is independent; the
//! store row is the only state. Concurrent updates for one profile are
//! not coordinated and the last write wins.

use std::sync::Arc;
use std::time::Instant;

use crate::config::INITIAL_SOURCE_TAG;
use crate::db::DatabaseError;
use crate::llm::{sanitize_llm_output, TextGenerator};
use crate::models::{ChatSessionInfo, DocumentInfo, EvidenceKind, HealthSummary, ProfileData, TranscriptionInfo};

use super::prompt::{
    build_chat_session_prompt, build_document_prompt, build_initial_prompt,
    build_transcription_prompt, SUMMARY_SYSTEM_PROMPT,
};
use super::similarity::{has_changed, similarity};
use super::store::SummaryStore;
use super::types::{FailureStage, ReconcilerConfig, SummaryOutcome};

pub struct SummaryReconciler {
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn SummaryStore>,
    config: ReconcilerConfig,
}

impl SummaryReconciler {
    pub fn new(generator: Arc<dyn TextGenerator>, store: Arc<dyn SummaryStore>) -> Self {
        Self::with_config(generator, store, ReconcilerConfig::default())
    }

    pub fn with_config(
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn SummaryStore>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            generator,
            store,
            config,
        }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Backend availability for health output. Errors count as unavailable.
    pub fn llm_available(&self) -> bool {
        match self.generator.check_available() {
            Ok(available) => available,
            Err(e) => {
                tracing::debug!(model = self.generator.model(), error = %e, "LLM availability check failed");
                false
            }
        }
    }

    /// Erase the profile's summary. Unlike updates, failures reach the caller.
    pub fn delete_summary(&self, profile_id: &str) -> Result<bool, DatabaseError> {
        let removed = self.store.delete_for_profile(profile_id)?;
        tracing::info!(profile_id, removed, "Health summary erased");
        Ok(removed > 0)
    }

    /// Current summary text, or `None` when missing or unreadable.
    pub fn get_summary(&self, profile_id: &str) -> Option<String> {
        match self.store.find_by_profile(profile_id) {
            Ok(found) => found.map(|s| s.summary_content),
            Err(e) => {
                tracing::warn!(profile_id, error = %e, "Summary lookup failed, treating as absent");
                None
            }
        }
    }

    /// Generate and store the first summary from profile fields.
    /// Does nothing when the profile already has a summary.
    pub fn create_initial(&self, profile: &ProfileData) -> SummaryOutcome {
        let profile_id = profile.profile_id.as_str();
        match self.store.find_by_profile(profile_id) {
            Ok(Some(_)) => {
                tracing::debug!(profile_id, "Initial summary skipped, one already exists");
                return SummaryOutcome::AlreadyExists;
            }
            Ok(None) => {}
            Err(e) => {
                // Proceeding could clobber an existing summary with a profile-only one.
                tracing::warn!(profile_id, error = %e, "Initial summary abandoned, lookup failed");
                return SummaryOutcome::Abandoned {
                    stage: FailureStage::Lookup,
                };
            }
        }

        let start = Instant::now();
        let prompt = build_initial_prompt(profile);
        let Some(summary) = self.generate(profile_id, &prompt) else {
            return SummaryOutcome::Abandoned {
                stage: FailureStage::Generation,
            };
        };
        self.persist(profile_id, &summary, INITIAL_SOURCE_TAG, start)
    }

    pub fn update_from_document(&self, profile_id: &str, doc: &DocumentInfo) -> SummaryOutcome {
        self.merge(
            profile_id,
            EvidenceKind::Document,
            &doc.source_tag(),
            doc.has_content(),
            |prior| build_document_prompt(prior, doc),
        )
    }

    /// Like the other updates, but the result is dropped unless it differs
    /// materially from the stored summary.
    pub fn update_from_chat_session(
        &self,
        profile_id: &str,
        chat: &ChatSessionInfo,
    ) -> SummaryOutcome {
        self.merge(
            profile_id,
            EvidenceKind::ChatSession,
            &chat.source_tag(),
            chat.has_content(),
            |prior| build_chat_session_prompt(prior, chat),
        )
    }

    pub fn update_from_transcription(
        &self,
        profile_id: &str,
        voice: &TranscriptionInfo,
    ) -> SummaryOutcome {
        self.merge(
            profile_id,
            EvidenceKind::Transcription,
            &voice.source_tag(),
            voice.has_content(),
            |prior| build_transcription_prompt(prior, voice),
        )
    }

    fn merge<F>(
        &self,
        profile_id: &str,
        kind: EvidenceKind,
        source: &str,
        has_content: bool,
        build_prompt: F,
    ) -> SummaryOutcome
    where
        F: FnOnce(Option<&str>) -> String,
    {
        if !has_content {
            tracing::debug!(profile_id, kind = %kind, source, "Evidence has no text, summary untouched");
            return SummaryOutcome::NoEvidence;
        }

        let start = Instant::now();
        let prior = self.get_summary(profile_id);
        let prompt = build_prompt(prior.as_deref());

        let Some(merged) = self.generate(profile_id, &prompt) else {
            return SummaryOutcome::Abandoned {
                stage: FailureStage::Generation,
            };
        };

        if kind == EvidenceKind::ChatSession
            && !has_changed(prior.as_deref(), &merged, self.config.similarity_threshold)
        {
            let score = prior
                .as_deref()
                .map(|p| similarity(p, &merged))
                .unwrap_or(0.0);
            tracing::info!(
                profile_id,
                source,
                similarity = score,
                "Chat session did not change summary, skipping write"
            );
            return SummaryOutcome::Unchanged { similarity: score };
        }

        self.persist(profile_id, &merged, source, start)
    }

    /// Call the model; `None` on error or when nothing usable comes back.
    fn generate(&self, profile_id: &str, prompt: &str) -> Option<String> {
        match self.generator.generate(SUMMARY_SYSTEM_PROMPT, prompt) {
            Ok(raw) => {
                let text = sanitize_llm_output(&raw);
                if text.is_empty() {
                    tracing::warn!(
                        profile_id,
                        model = self.generator.model(),
                        "Summary generation returned empty text"
                    );
                    None
                } else {
                    Some(text)
                }
            }
            Err(e) => {
                tracing::warn!(
                    profile_id,
                    model = self.generator.model(),
                    error = %e,
                    "Summary generation failed"
                );
                None
            }
        }
    }

    /// Upsert by profile id in one store write; concurrent writers: last wins.
    fn persist(&self, profile_id: &str, content: &str, source: &str, start: Instant) -> SummaryOutcome {
        let result = self
            .store
            .upsert(&HealthSummary::new(profile_id, content, source));

        match result {
            Ok(()) => {
                tracing::info!(
                    profile_id,
                    source,
                    summary_chars = content.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Health summary written"
                );
                SummaryOutcome::Written {
                    source: source.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(profile_id, source, error = %e, "Health summary write failed");
                SummaryOutcome::Abandoned {
                    stage: FailureStage::Persistence,
                }
            }
        }
    }
}
