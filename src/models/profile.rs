use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read-only view of a user profile, owned by the profile service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileData {
    pub profile_id: String,
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
    pub height_cm: Option<f32>,
    pub weight_kg: Option<f32>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub current_medications: Vec<String>,
    pub notes: Option<String>,
}

impl ProfileData {
    pub fn new(profile_id: &str) -> Self {
        Self {
            profile_id: profile_id.to_string(),
            ..Default::default()
        }
    }

    /// Age in whole years on `today`, if a birth date is known.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| today.years_since(dob))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_counts_completed_years() {
        let mut profile = ProfileData::new("p-1");
        profile.date_of_birth = NaiveDate::from_ymd_opt(1990, 6, 15);
        let before_birthday = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let on_birthday = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(profile.age_on(before_birthday), Some(33));
        assert_eq!(profile.age_on(on_birthday), Some(34));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let profile: ProfileData = serde_json::from_str(r#"{"profile_id":"abc"}"#).unwrap();
        assert_eq!(profile, ProfileData::new("abc"));
        assert_eq!(profile.age_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), None);
    }
}
