//! Human-readable reasons for recommendation signals.

use super::RecommendationSignal;

/// Reason text for one fired scoring term.
pub fn describe(signal: &RecommendationSignal) -> String {
    match signal {
        RecommendationSignal::FocusCategory { category } => {
            format!("Targets {category}, a category you are working to improve")
        }
        RecommendationSignal::BaselineCategory { category } => {
            format!("Broadens your practice in {category}")
        }
        RecommendationSignal::FavoriteLanguage { language } => {
            format!("Uses {language}, one of your favorite languages")
        }
        RecommendationSignal::StrongLanguage {
            language,
            proficiency,
        } => format!(
            "You are already strong in {language} ({:.0}% accepted)",
            proficiency * 100.0
        ),
        RecommendationSignal::FamiliarLanguage { language } => {
            format!("Uses {language}, a language you have solved challenges in")
        }
        RecommendationSignal::NoLanguageSignal => {
            "Open to any language until your preferences are known".to_string()
        }
        RecommendationSignal::OtherLanguage { language } => {
            format!("Introduces {language}, outside your usual languages")
        }
        RecommendationSignal::DifficultyFit { difficulty, fit } => {
            format!("{difficulty} difficulty suits your level ({:.0}% fit)", fit * 100.0)
        }
        RecommendationSignal::FocusTags { tags } => format_tags("Practices", tags),
        RecommendationSignal::BaselineTag => "General practice beyond your focus tags".to_string(),
        RecommendationSignal::Freshness { age_days, .. } => format_age(*age_days),
        RecommendationSignal::CategorySweetSpot {
            category,
            proficiency,
        } => format!(
            "Right level for your {category} skills ({:.0}% accepted)",
            proficiency * 100.0
        ),
        RecommendationSignal::DifficultyProgression {
            difficulty,
            progression,
        } => format!(
            "{difficulty} challenges are a good stretch for you ({:.0}% accepted)",
            progression * 100.0
        ),
        RecommendationSignal::ActiveLearner { velocity } => {
            format!("Keeps your momentum going ({velocity:.1} accepted per day)")
        }
        RecommendationSignal::PopularWithPeers { learners } => {
            if *learners == 1 {
                "Solved by a learner with similar focus".to_string()
            } else {
                format!("Solved by {learners} learners with similar focus")
            }
        }
        RecommendationSignal::TrainingFocusCategory { category } => {
            format!("Drills {category}, a category that needs practice")
        }
        RecommendationSignal::TrainingFocusTags { tags } => format_tags("Drills", tags),
        RecommendationSignal::TrainingBaselineTag => {
            "General drill outside your focus tags".to_string()
        }
        RecommendationSignal::Priority { priority } => format!("Curated priority {priority}"),
    }
}

fn format_tags(verb: &str, tags: &[String]) -> String {
    if tags.len() == 1 {
        format!("{verb} a weak spot: {}", tags[0])
    } else {
        format!("{verb} weak spots: {}", tags.join(", "))
    }
}

fn format_age(age_days: Option<u32>) -> String {
    match age_days {
        None => "Undated content".to_string(),
        Some(0) => "Updated today".to_string(),
        Some(1) => "Updated yesterday".to_string(),
        Some(n) => format!("Updated {n} days ago"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Difficulty};

    #[test]
    fn test_focus_category() {
        let s = RecommendationSignal::FocusCategory {
            category: Category::Performance,
        };
        assert_eq!(
            describe(&s),
            "Targets Performance, a category you are working to improve"
        );
    }

    #[test]
    fn test_tags_single_and_multiple() {
        let one = RecommendationSignal::FocusTags {
            tags: vec!["recursion".to_string()],
        };
        assert_eq!(describe(&one), "Practices a weak spot: recursion");
        let many = RecommendationSignal::TrainingFocusTags {
            tags: vec!["loops".to_string(), "arrays".to_string()],
        };
        assert_eq!(describe(&many), "Drills weak spots: loops, arrays");
    }

    #[test]
    fn test_freshness_age() {
        let undated = RecommendationSignal::Freshness {
            factor: 0.3,
            age_days: None,
        };
        assert_eq!(describe(&undated), "Undated content");
        let old = RecommendationSignal::Freshness {
            factor: 0.5,
            age_days: Some(45),
        };
        assert_eq!(describe(&old), "Updated 45 days ago");
    }

    #[test]
    fn test_percentages_are_rounded() {
        let s = RecommendationSignal::DifficultyFit {
            difficulty: Difficulty::Easy,
            fit: 0.7,
        };
        assert_eq!(describe(&s), "Easy difficulty suits your level (70% fit)");
    }

    #[test]
    fn test_every_reason_is_non_empty() {
        let signals = vec![
            RecommendationSignal::NoLanguageSignal,
            RecommendationSignal::BaselineTag,
            RecommendationSignal::TrainingBaselineTag,
            RecommendationSignal::PopularWithPeers { learners: 1 },
            RecommendationSignal::Priority { priority: 1.0 },
        ];
        for s in &signals {
            assert!(!describe(s).is_empty(), "{}", s.label());
        }
    }
}
