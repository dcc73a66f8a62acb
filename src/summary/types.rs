use serde::Serialize;

use crate::config::DEFAULT_SIMILARITY_THRESHOLD;

/// Where a summary-maintenance call gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Store unreachable while checking for an existing summary.
    Lookup,
    /// Model call failed or produced nothing usable.
    Generation,
    /// Store write failed.
    Persistence,
}

/// What a reconciler call did. Summary maintenance never fails its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SummaryOutcome {
    /// A row was inserted or overwritten with this source tag.
    Written { source: String },
    /// `create_initial` found a summary already in place.
    AlreadyExists,
    /// Chat-session result too close to the stored summary; nothing written.
    Unchanged { similarity: f64 },
    /// Evidence carried no text; the model was not called.
    NoEvidence,
    Abandoned { stage: FailureStage },
}

impl SummaryOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilerConfig {
    /// Chat-session results scoring at or above this against the prior are dropped.
    pub similarity_threshold: f64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(SummaryOutcome::Written {
            source: "document:d-1".into(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "written");
        assert_eq!(json["source"], "document:d-1");

        let json = serde_json::to_value(SummaryOutcome::Abandoned {
            stage: FailureStage::Generation,
        })
        .unwrap();
        assert_eq!(json["outcome"], "abandoned");
        assert_eq!(json["stage"], "generation");
    }

    #[test]
    fn default_threshold() {
        assert_eq!(ReconcilerConfig::default().similarity_threshold, 0.95);
    }
}
