//! Behavioral learner profiles built from submission history.

mod builder;
pub mod focus;

pub use builder::ProfileBuilder;

use crate::config::PlanConfig;
use crate::error::PlanError;
use crate::store::{favorite_languages, Collaborators, SubmissionQuery};
use crate::types::{Category, Difficulty, ExperienceLevel, Proficiency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Attempts and successes for one language, category or difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub attempts: u32,
    pub successes: u32,
    pub proficiency: Proficiency,
}

impl BucketStats {
    pub(crate) fn record(&mut self, accepted: bool) {
        self.attempts += 1;
        if accepted {
            self.successes += 1;
        }
        self.proficiency = Proficiency::from_counts(self.successes, self.attempts);
    }
}

/// A recently accepted challenge, kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentChallenge {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub completed_at: DateTime<Utc>,
}

/// Derived, per-request learner profile. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub total_submissions: usize,
    pub total_accepted: u32,
    pub experience_level: ExperienceLevel,
    /// Languages inferred from accepted work, most used first.
    pub preferred_languages: Vec<String>,
    /// Explicit preferences.
    pub favorite_languages: Vec<String>,
    /// Favorites first, then inferred languages; deduplicated and capped.
    pub combined_languages: Vec<String>,
    pub language_stats: BTreeMap<String, BucketStats>,
    pub category_stats: BTreeMap<Category, BucketStats>,
    pub difficulty_stats: BTreeMap<Difficulty, BucketStats>,
    /// Accepted counts per lower-cased tag.
    pub tag_stats: BTreeMap<String, u32>,
    pub error_type_stats: BTreeMap<String, u32>,
    pub weakness_category_stats: BTreeMap<Category, u32>,
    pub weakness_tag_stats: BTreeMap<String, u32>,
    /// `language-errorType` counters. Diagnostic only.
    pub error_patterns: BTreeMap<String, u32>,
    pub focus_categories: Vec<Category>,
    pub focus_tags: Vec<String>,
    pub completed_challenges: Vec<String>,
    pub recent_challenges: Vec<RecentChallenge>,
    /// Accepted submissions per day over the observed window.
    pub learning_velocity: f64,
}

impl UserProfile {
    pub fn language_proficiency(&self, language: &str) -> Proficiency {
        self.language_stats
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(language))
            .map(|(_, b)| b.proficiency)
            .unwrap_or_default()
    }

    pub fn category_proficiency(&self, category: Category) -> Proficiency {
        self.category_stats
            .get(&category)
            .map(|b| b.proficiency)
            .unwrap_or_default()
    }

    pub fn difficulty_progression(&self, difficulty: Difficulty) -> Proficiency {
        self.difficulty_stats
            .get(&difficulty)
            .map(|b| b.proficiency)
            .unwrap_or_default()
    }

    pub fn is_favorite_language(&self, language: &str) -> bool {
        contains_ignore_case(&self.favorite_languages, language)
    }

    pub fn is_preferred_language(&self, language: &str) -> bool {
        contains_ignore_case(&self.preferred_languages, language)
    }

    pub fn is_focus_tag(&self, tag: &str) -> bool {
        self.focus_tags.iter().any(|t| t == &tag.to_lowercase())
    }

    /// Error types seen in rejected submissions.
    pub fn error_types(&self) -> Vec<String> {
        self.error_type_stats.keys().cloned().collect()
    }
}

pub(crate) fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|l| l.eq_ignore_ascii_case(value))
}

/// Read a learner's history and preferences and build their profile.
///
/// Store failures propagate: a profile built on partial history would skew
/// every downstream ranking.
#[instrument(level = "debug", skip(collab, config))]
pub async fn load_profile(
    collab: &Collaborators,
    config: &PlanConfig,
    user_id: &str,
) -> Result<UserProfile, PlanError> {
    let query = SubmissionQuery {
        user_id: user_id.to_string(),
        challenge_id: None,
        limit: config.history_limit,
    };
    let (favorites, submissions) = tokio::join!(
        favorite_languages(collab.preferences.as_ref(), user_id),
        collab.submissions.find_recent(&query),
    );
    let favorites = favorites.map_err(PlanError::Preferences)?;
    let submissions = submissions.map_err(PlanError::Submissions)?;

    debug!(
        target: "learnpath::profile",
        user_id,
        submissions = submissions.len(),
        favorites = favorites.len(),
        "Loaded learner history"
    );

    Ok(ProfileBuilder::new(config).build(user_id, &submissions, favorites))
}
