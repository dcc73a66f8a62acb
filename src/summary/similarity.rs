//! Change detection between a stored summary and a regenerated one.

/// Trim, collapse whitespace runs to one space, lowercase.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 1 − levenshtein / max length, over normalized text. Two empty strings score 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(&a, &b);
    1.0 - distance as f64 / max_len as f64
}

/// Whether `candidate` differs materially from `prior`.
/// A missing or blank prior always counts as changed.
pub fn has_changed(prior: Option<&str>, candidate: &str, threshold: f64) -> bool {
    match prior {
        None => true,
        Some(p) if p.trim().is_empty() => true,
        Some(p) => similarity(p, candidate) < threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SIMILARITY_THRESHOLD;

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize("  Patient\tHAS \n\n asthma.  "), "patient has asthma.");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn identical_after_normalization_is_one() {
        let a = "Patient has no known allergies.";
        let b = "  patient   has no KNOWN\nallergies. ";
        assert_eq!(similarity(a, b), 1.0);
        assert!(!has_changed(Some(a), b, DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn disjoint_equal_length_is_zero() {
        assert_eq!(similarity("abcd", "wxyz"), 0.0);
        assert!(has_changed(Some("abcd"), "wxyz", DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn empty_prior_is_always_changed() {
        assert!(has_changed(None, "anything", DEFAULT_SIMILARITY_THRESHOLD));
        assert!(has_changed(Some(""), "", DEFAULT_SIMILARITY_THRESHOLD));
        assert!(has_changed(Some("  \n"), "x", DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn both_empty_scores_one() {
        assert_eq!(similarity("", "  "), 1.0);
    }

    #[test]
    fn small_edit_in_long_text_is_unchanged() {
        let prior = "Patient is a 34 year old female with type 2 diabetes managed with metformin 500 mg twice daily. \
                     No known drug allergies. Blood pressure well controlled.";
        let candidate = prior.replace("controlled.", "controlled!");
        let score = similarity(prior, &candidate);
        assert!(score > 0.99, "score was {score}");
        assert!(!has_changed(Some(prior), &candidate, DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn new_fact_is_changed() {
        let prior = "Patient has no known allergies.";
        let candidate = "Patient is allergic to penicillin (documented reaction: hives).";
        assert!(similarity(prior, candidate) < DEFAULT_SIMILARITY_THRESHOLD);
        assert!(has_changed(Some(prior), candidate, DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn distance_counts_chars_not_bytes() {
        // One substituted accented char in five chars.
        let score = similarity("café!", "cafe!");
        assert!((score - 0.8).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        // 1 edit in 20 chars → similarity exactly 0.95 → not changed.
        let prior = "aaaaaaaaaaaaaaaaaaaa";
        let candidate = "aaaaaaaaaaaaaaaaaaab";
        assert!((similarity(prior, candidate) - 0.95).abs() < 1e-12);
        assert!(!has_changed(Some(prior), candidate, 0.95));
    }
}
