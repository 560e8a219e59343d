//! Fold submission history into a [`UserProfile`].

use super::focus::{pick_focus_categories, pick_focus_tags};
use super::{BucketStats, RecentChallenge, UserProfile};
use crate::config::PlanConfig;
use crate::types::{Category, Difficulty, ExperienceLevel, SubmissionRecord};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Builds profiles from history that is already fetched.
///
/// Pure: the same submissions and favorites always give the same profile.
#[derive(Debug, Clone)]
pub struct ProfileBuilder<'a> {
    config: &'a PlanConfig,
}

impl<'a> ProfileBuilder<'a> {
    pub fn new(config: &'a PlanConfig) -> Self {
        Self { config }
    }

    /// Build a profile from submissions sorted newest first.
    pub fn build(
        &self,
        user_id: &str,
        submissions: &[SubmissionRecord],
        favorite_languages: Vec<String>,
    ) -> UserProfile {
        let mut language_stats: BTreeMap<String, BucketStats> = BTreeMap::new();
        // Lower-cased language to its first-seen spelling; one bucket per language.
        let mut spellings: HashMap<String, String> = HashMap::new();
        let mut category_stats: BTreeMap<Category, BucketStats> =
            Category::ALL.iter().map(|&c| (c, BucketStats::default())).collect();
        let mut difficulty_stats: BTreeMap<Difficulty, BucketStats> =
            Difficulty::ALL.iter().map(|&d| (d, BucketStats::default())).collect();
        // Accepted counts per language, in first-seen order for stable ranking.
        let mut accepted_languages: IndexMap<String, u32> = IndexMap::new();
        let mut tag_stats: BTreeMap<String, u32> = BTreeMap::new();
        let mut error_type_stats: BTreeMap<String, u32> = BTreeMap::new();
        let mut weakness_category_stats: BTreeMap<Category, u32> = BTreeMap::new();
        let mut weakness_tag_stats: BTreeMap<String, u32> = BTreeMap::new();
        let mut error_patterns: BTreeMap<String, u32> = BTreeMap::new();
        let mut completed_challenges: Vec<String> = Vec::new();
        let mut recent_challenges: Vec<RecentChallenge> = Vec::new();
        let mut total_accepted: u32 = 0;

        for submission in submissions {
            let Some(challenge) = &submission.challenge else {
                debug!(
                    target: "learnpath::profile",
                    submission = %submission.id,
                    "Skipping submission without challenge metadata"
                );
                continue;
            };
            let accepted = submission.is_accepted();
            let language = spellings
                .entry(challenge.language.to_lowercase())
                .or_insert_with(|| challenge.language.clone())
                .clone();

            language_stats
                .entry(language.clone())
                .or_default()
                .record(accepted);
            category_stats
                .entry(challenge.category)
                .or_default()
                .record(accepted);
            difficulty_stats
                .entry(challenge.difficulty)
                .or_default()
                .record(accepted);

            if accepted {
                total_accepted += 1;
                *accepted_languages
                    .entry(language.clone())
                    .or_insert(0) += 1;
                if !completed_challenges.contains(&challenge.id) {
                    completed_challenges.push(challenge.id.clone());
                }
                for tag in &challenge.tags {
                    *tag_stats.entry(tag.to_lowercase()).or_insert(0) += 1;
                }
                if recent_challenges.len() < self.config.recent_accepted_limit {
                    recent_challenges.push(RecentChallenge {
                        id: challenge.id.clone(),
                        title: challenge.title.clone(),
                        category: challenge.category,
                        difficulty: challenge.difficulty,
                        completed_at: submission.submitted_at,
                    });
                }
                continue;
            }

            for annotation in submission.annotations() {
                *error_type_stats
                    .entry(annotation.error_type.clone())
                    .or_insert(0) += 1;
                *error_patterns
                    .entry(format!("{}-{}", language, annotation.error_type))
                    .or_insert(0) += 1;
                *weakness_category_stats
                    .entry(challenge.category)
                    .or_insert(0) += 1;
                for tag in &challenge.tags {
                    *weakness_tag_stats.entry(tag.to_lowercase()).or_insert(0) += 1;
                }
            }
        }

        let mut preferred: Vec<(String, u32)> = accepted_languages.into_iter().collect();
        preferred.sort_by(|a, b| b.1.cmp(&a.1));
        let preferred_languages: Vec<String> = preferred.into_iter().map(|(l, _)| l).collect();

        let combined_languages = combine_languages(
            &favorite_languages,
            &preferred_languages,
            self.config.combined_language_limit,
        );

        let category_successes: BTreeMap<Category, u32> = category_stats
            .iter()
            .map(|(&c, b)| (c, b.successes))
            .collect();
        let weights = &self.config.weights;
        let focus_categories = pick_focus_categories(
            &category_successes,
            &weakness_category_stats,
            weights,
            self.config.focus_category_limit,
        );
        let focus_tags = pick_focus_tags(
            &tag_stats,
            &weakness_tag_stats,
            weights,
            self.config.focus_tag_limit,
        );

        let learning_velocity = f64::from(total_accepted) / observation_days(submissions);

        debug!(
            target: "learnpath::profile",
            user_id,
            total_accepted,
            ?focus_categories,
            ?focus_tags,
            "Built learner profile"
        );

        UserProfile {
            user_id: user_id.to_string(),
            total_submissions: submissions.len(),
            total_accepted,
            experience_level: ExperienceLevel::from_accepted(total_accepted),
            preferred_languages,
            favorite_languages,
            combined_languages,
            language_stats,
            category_stats,
            difficulty_stats,
            tag_stats,
            error_type_stats,
            weakness_category_stats,
            weakness_tag_stats,
            error_patterns,
            focus_categories,
            focus_tags,
            completed_challenges,
            recent_challenges,
            learning_velocity,
        }
    }
}

/// Explicit favorites first, then inferred languages not already listed.
fn combine_languages(favorites: &[String], preferred: &[String], limit: usize) -> Vec<String> {
    let mut combined: Vec<String> = Vec::new();
    for lang in favorites.iter().chain(preferred) {
        if !combined.contains(lang) {
            combined.push(lang.clone());
        }
    }
    combined.truncate(limit);
    combined
}

/// Day-span between the oldest and newest submission, at least one day.
fn observation_days(submissions: &[SubmissionRecord]) -> f64 {
    let newest = submissions.iter().map(|s| s.submitted_at).max();
    let oldest = submissions.iter().map(|s| s.submitted_at).min();
    match (newest, oldest) {
        (Some(newest), Some(oldest)) => {
            let span = (newest - oldest).num_seconds() as f64 / SECONDS_PER_DAY;
            span.max(1.0)
        }
        _ => 1.0,
    }
}
