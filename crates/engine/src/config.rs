//! Scoring weights and pipeline limits.
//!
//! All heuristic constants live in [`ScoringWeights`] so that a test (or the
//! `[weights]` table of the config file) can perturb one term in isolation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Weights for every additive scoring term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    // Challenge: category
    pub focus_category: f64,
    pub baseline_category: f64,

    // Challenge: language
    pub favorite_language: f64,
    pub strong_language_bonus: f64,
    pub strong_language_threshold: f64,
    pub familiar_language: f64,
    pub no_language_signal: f64,
    pub other_language: f64,

    // Challenge: difficulty fit
    pub difficulty_fit: f64,
    pub difficulty_slope: f64,

    // Challenge: tags
    pub focus_tag: f64,
    pub baseline_tag: f64,

    // Challenge: freshness
    pub freshness: f64,
    pub freshness_window_days: f64,
    pub freshness_floor: f64,
    pub freshness_unknown: f64,

    // Challenge: proficiency bands
    pub category_sweet_spot: f64,
    pub category_sweet_spot_low: f64,
    pub category_sweet_spot_high: f64,
    pub progression_bonus: f64,
    pub progression_low: f64,
    pub progression_high: f64,

    // Challenge: activity
    pub velocity_bonus: f64,
    pub velocity_threshold: f64,

    // Collaborative booster
    pub collaborative_bonus: f64,

    // Training items
    pub training_focus_category: f64,
    pub training_focus_tag: f64,
    pub training_baseline_tag: f64,
    pub training_priority: f64,

    // Weakness ranking
    pub weakness_error_multiplier: f64,
    pub clean_category_penalty: f64,

    // Resource matcher
    pub resource_error_match: f64,
    pub resource_language_match: f64,
    pub resource_tag_match: f64,
    pub resource_level_ceiling: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            focus_category: 0.35,
            baseline_category: 0.20,

            favorite_language: 0.35,
            strong_language_bonus: 0.10,
            strong_language_threshold: 0.7,
            familiar_language: 0.20,
            no_language_signal: 0.10,
            other_language: 0.05,

            difficulty_fit: 0.20,
            difficulty_slope: 1.5,

            focus_tag: 0.15,
            baseline_tag: 0.05,

            freshness: 0.10,
            freshness_window_days: 90.0,
            freshness_floor: 0.1,
            freshness_unknown: 0.3,

            category_sweet_spot: 0.10,
            category_sweet_spot_low: 0.5,
            category_sweet_spot_high: 0.8,
            progression_bonus: 0.08,
            progression_low: 0.6,
            progression_high: 0.9,

            velocity_bonus: 0.05,
            velocity_threshold: 0.5,

            collaborative_bonus: 0.15,

            training_focus_category: 0.50,
            training_focus_tag: 0.30,
            training_baseline_tag: 0.10,
            training_priority: 0.05,

            weakness_error_multiplier: 2.0,
            clean_category_penalty: -100.0,

            resource_error_match: 4.0,
            resource_language_match: 3.0,
            resource_tag_match: 1.5,
            resource_level_ceiling: 3.0,
        }
    }
}

/// Result-size limits and timeouts for one plan computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub challenge_limit: usize,
    pub training_limit: usize,
    pub resource_limit: usize,
    pub history_limit: usize,
    pub candidate_pool_limit: usize,
    pub peer_popular_limit: usize,
    /// Peer-query languages for learners with no language signal.
    pub peer_default_languages: Vec<String>,
    #[serde(with = "duration_ms")]
    pub booster_timeout: Duration,
    pub path_resource_steps: usize,
    pub recent_accepted_limit: usize,
    pub combined_language_limit: usize,
    pub focus_category_limit: usize,
    pub focus_tag_limit: usize,
    pub weights: ScoringWeights,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            challenge_limit: 5,
            training_limit: 5,
            resource_limit: 8,
            history_limit: 200,
            candidate_pool_limit: 80,
            peer_popular_limit: 20,
            peer_default_languages: vec!["Python".to_string(), "JavaScript".to_string()],
            booster_timeout: Duration::from_secs(2),
            path_resource_steps: 3,
            recent_accepted_limit: 5,
            combined_language_limit: 5,
            focus_category_limit: 2,
            focus_tag_limit: 5,
            weights: ScoringWeights::default(),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let w = ScoringWeights::default();
        assert_eq!(w.focus_category, 0.35);
        assert_eq!(w.baseline_category, 0.20);
        assert_eq!(w.focus_tag - w.baseline_tag, 0.15 - 0.05);
        assert_eq!(w.clean_category_penalty, -100.0);
        assert_eq!(w.collaborative_bonus, 0.15);
    }

    #[test]
    fn test_partial_weights_override_keeps_other_defaults() {
        let w: ScoringWeights = serde_json::from_str(r#"{"focus_tag": 0.5}"#).unwrap();
        assert_eq!(w.focus_tag, 0.5);
        assert_eq!(w.baseline_tag, 0.05);
    }

    #[test]
    fn test_plan_config_booster_timeout_in_millis() {
        let cfg: PlanConfig = serde_json::from_str(r#"{"booster_timeout": 250}"#).unwrap();
        assert_eq!(cfg.booster_timeout, Duration::from_millis(250));
        assert_eq!(cfg.challenge_limit, 5);
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["booster_timeout"], 250);
    }
}
