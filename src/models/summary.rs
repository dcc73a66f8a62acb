use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single stored summary row for a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub id: Uuid,
    pub profile_id: String,
    pub summary_content: String,
    /// `initial_profile_creation` or `<evidence kind>:<evidence id>`
    pub last_updated_source: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl HealthSummary {
    /// Fresh row stamped with the current UTC time.
    pub fn new(profile_id: &str, summary_content: &str, source: &str) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            profile_id: profile_id.to_string(),
            summary_content: summary_content.to_string(),
            last_updated_source: source.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
