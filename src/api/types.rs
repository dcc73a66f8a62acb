//! Shared state for the API router.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::summary::SummaryReconciler;
use crate::transcription::Transcriber;

/// Shared context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub reconciler: Arc<SummaryReconciler>,
    pub transcriber: Arc<dyn Transcriber>,
    api_key_hash: [u8; 32],
}

impl ApiContext {
    pub fn new(
        reconciler: Arc<SummaryReconciler>,
        transcriber: Arc<dyn Transcriber>,
        api_key: &str,
    ) -> Self {
        Self {
            reconciler,
            transcriber,
            api_key_hash: hash_key(api_key),
        }
    }

    /// Constant-time check of a presented key.
    pub fn verify_api_key(&self, presented: &str) -> bool {
        hash_key(presented)[..].ct_eq(&self.api_key_hash[..]).into()
    }
}

/// SHA-256 so keys of different lengths compare in constant time.
pub fn hash_key(key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockGenerator;
    use crate::summary::SqliteSummaryStore;
    use crate::transcription::MockTranscriber;

    fn ctx(key: &str) -> ApiContext {
        let reconciler = SummaryReconciler::new(
            Arc::new(MockGenerator::new("x")),
            Arc::new(SqliteSummaryStore::in_memory().unwrap()),
        );
        ApiContext::new(Arc::new(reconciler), Arc::new(MockTranscriber::new("t")), key)
    }

    #[test]
    fn verifies_matching_key_only() {
        let ctx = ctx("s3cret");
        assert!(ctx.verify_api_key("s3cret"));
        assert!(!ctx.verify_api_key("s3cre"));
        assert!(!ctx.verify_api_key("S3CRET"));
        assert!(!ctx.verify_api_key(""));
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_key("abc"), hash_key("abc"));
        assert_ne!(hash_key("abc"), hash_key("abd"));
    }
}
