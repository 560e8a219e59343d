//! Additive scoring for challenges and drill items.
//!
//! Every term that fires pushes a [`RecommendationSignal`]; the score is the
//! sum of their contributions under [`ScoringWeights`], so each reason maps
//! to exactly one term.

use super::collaborative::CollaborativeBooster;
use super::pool::top_up;
use super::{rank, Recommendation, RecommendationKind, RecommendationSignal};
use crate::config::{PlanConfig, ScoringWeights};
use crate::error::PlanError;
use crate::profile::UserProfile;
use crate::store::{ChallengeFilter, Collaborators, TrainingFilter};
use crate::types::{ChallengeMeta, TrainingItem};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Tags reported per focus-tag signal.
const MAX_REPORTED_TAGS: usize = 3;

/// Scores one kind of candidate against a learner profile.
pub trait Scorer<T> {
    fn score(&self, profile: &UserProfile, candidate: T) -> Recommendation<T>;
}

/// Challenge and drill scorer, pinned to a reference instant for freshness.
#[derive(Debug, Clone)]
pub struct RecommendationScorer<'a> {
    weights: &'a ScoringWeights,
    now: DateTime<Utc>,
}

impl<'a> RecommendationScorer<'a> {
    pub fn new(weights: &'a ScoringWeights, now: DateTime<Utc>) -> Self {
        Self { weights, now }
    }

    /// Signals that fire for a challenge, in evaluation order.
    pub fn challenge_signals(
        &self,
        profile: &UserProfile,
        challenge: &ChallengeMeta,
    ) -> Vec<RecommendationSignal> {
        let w = self.weights;
        let mut signals = Vec::new();

        // Category
        if profile.focus_categories.contains(&challenge.category) {
            signals.push(RecommendationSignal::FocusCategory {
                category: challenge.category,
            });
        } else {
            signals.push(RecommendationSignal::BaselineCategory {
                category: challenge.category,
            });
        }

        // Language
        let language = &challenge.language;
        if profile.is_favorite_language(language) {
            signals.push(RecommendationSignal::FavoriteLanguage {
                language: language.clone(),
            });
            let proficiency = profile.language_proficiency(language).value();
            if proficiency > w.strong_language_threshold {
                signals.push(RecommendationSignal::StrongLanguage {
                    language: language.clone(),
                    proficiency,
                });
            }
        } else if profile.is_preferred_language(language) {
            signals.push(RecommendationSignal::FamiliarLanguage {
                language: language.clone(),
            });
        } else if profile.favorite_languages.is_empty() && profile.preferred_languages.is_empty() {
            signals.push(RecommendationSignal::NoLanguageSignal);
        } else {
            signals.push(RecommendationSignal::OtherLanguage {
                language: language.clone(),
            });
        }

        // Difficulty fit
        let target = profile.experience_level.target_difficulty();
        let distance = (challenge.difficulty.value() - target).abs();
        let fit = 1.0 - (distance * w.difficulty_slope).min(1.0);
        if fit > 0.0 {
            signals.push(RecommendationSignal::DifficultyFit {
                difficulty: challenge.difficulty,
                fit,
            });
        }

        // Tags
        let matched: Vec<String> = challenge
            .tags
            .iter()
            .filter(|t| profile.is_focus_tag(t))
            .map(|t| t.to_lowercase())
            .collect();
        if matched.is_empty() {
            signals.push(RecommendationSignal::BaselineTag);
        } else {
            signals.push(RecommendationSignal::FocusTags {
                tags: matched.into_iter().take(MAX_REPORTED_TAGS).collect(),
            });
        }

        // Freshness
        signals.push(self.freshness(challenge.updated_at));

        // Category sweet spot
        let category_proficiency = profile.category_proficiency(challenge.category).value();
        if category_proficiency > w.category_sweet_spot_low
            && category_proficiency < w.category_sweet_spot_high
        {
            signals.push(RecommendationSignal::CategorySweetSpot {
                category: challenge.category,
                proficiency: category_proficiency,
            });
        }

        // Difficulty progression
        let progression = profile.difficulty_progression(challenge.difficulty).value();
        if progression > w.progression_low && progression < w.progression_high {
            signals.push(RecommendationSignal::DifficultyProgression {
                difficulty: challenge.difficulty,
                progression,
            });
        }

        // Learning velocity
        if profile.learning_velocity > w.velocity_threshold {
            signals.push(RecommendationSignal::ActiveLearner {
                velocity: profile.learning_velocity,
            });
        }

        signals
    }

    /// Signals that fire for a drill item, in evaluation order.
    pub fn training_signals(
        &self,
        profile: &UserProfile,
        item: &TrainingItem,
    ) -> Vec<RecommendationSignal> {
        let mut signals = Vec::new();

        if let Some(category) = item.category {
            if profile.focus_categories.contains(&category) {
                signals.push(RecommendationSignal::TrainingFocusCategory { category });
            }
        }

        let matched: Vec<String> = item
            .tags
            .iter()
            .filter(|t| profile.is_focus_tag(t))
            .map(|t| t.to_lowercase())
            .collect();
        if matched.is_empty() {
            signals.push(RecommendationSignal::TrainingBaselineTag);
        } else {
            signals.push(RecommendationSignal::TrainingFocusTags {
                tags: matched.into_iter().take(MAX_REPORTED_TAGS).collect(),
            });
        }

        signals.push(RecommendationSignal::Priority {
            priority: item.priority_or_default(),
        });

        signals
    }

    fn freshness(&self, updated_at: Option<DateTime<Utc>>) -> RecommendationSignal {
        let w = self.weights;
        match updated_at {
            None => RecommendationSignal::Freshness {
                factor: w.freshness_unknown,
                age_days: None,
            },
            Some(updated) => {
                let age_days = ((self.now - updated).num_seconds().max(0) as f64) / 86_400.0;
                let factor = (1.0 - age_days / w.freshness_window_days)
                    .max(w.freshness_floor)
                    .min(1.0);
                RecommendationSignal::Freshness {
                    factor,
                    age_days: Some(age_days.floor() as u32),
                }
            }
        }
    }
}

impl Scorer<ChallengeMeta> for RecommendationScorer<'_> {
    fn score(&self, profile: &UserProfile, candidate: ChallengeMeta) -> Recommendation<ChallengeMeta> {
        let signals = self.challenge_signals(profile, &candidate);
        let mut rec = Recommendation::new(candidate.id.clone(), RecommendationKind::Challenge, candidate);
        for signal in signals {
            rec.push_signal(signal, self.weights);
        }
        rec
    }
}

impl Scorer<TrainingItem> for RecommendationScorer<'_> {
    fn score(&self, profile: &UserProfile, candidate: TrainingItem) -> Recommendation<TrainingItem> {
        let signals = self.training_signals(profile, &candidate);
        let mut rec =
            Recommendation::new(candidate.id.clone(), RecommendationKind::TrainingData, candidate);
        for signal in signals {
            rec.push_signal(signal, self.weights);
        }
        rec
    }
}

fn focus_filter<T: Copy>(focus: &[T]) -> Option<Vec<T>> {
    (!focus.is_empty()).then(|| focus.to_vec())
}

/// Rank unsolved challenges for a learner.
///
/// Candidates come from the focus categories; the unrestricted catalog is
/// consulted only when fewer than `challenge_limit` focus challenges exist.
/// Challenges the learner has already solved never appear. The peer query
/// for the collaborative boost runs alongside the candidate fetch.
#[instrument(level = "debug", skip_all, fields(user_id = %profile.user_id))]
pub async fn recommend_challenges(
    collab: &Collaborators,
    config: &PlanConfig,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Result<Vec<Recommendation<ChallengeMeta>>, PlanError> {
    let booster = CollaborativeBooster::new(collab.submissions.as_ref(), config);

    let candidates = async {
        let mut exclude: HashSet<String> = collab
            .challenges
            .accepted_ids(&profile.user_id)
            .await?;
        exclude.extend(profile.completed_challenges.iter().cloned());

        let focused = ChallengeFilter {
            exclude_ids: exclude.clone(),
            categories: focus_filter(&profile.focus_categories),
            limit: Some(config.candidate_pool_limit),
        };
        let primary = collab.challenges.find_active(&focused).await?;
        let pool = top_up(primary, config.challenge_limit, || {
            let any = ChallengeFilter {
                exclude_ids: exclude.clone(),
                categories: None,
                limit: Some(config.candidate_pool_limit),
            };
            async move { collab.challenges.find_active(&any).await }
        })
        .await?;
        anyhow::Ok((pool, exclude))
    };

    let (candidates, popular) = tokio::join!(candidates, booster.popular(profile));
    let (pool, exclude) = candidates.map_err(PlanError::Challenges)?;

    let scorer = RecommendationScorer::new(&config.weights, now);
    let scored: Vec<_> = pool
        .into_marked()
        .into_iter()
        .filter(|(c, _)| !exclude.contains(&c.id))
        .map(|(c, fallback)| {
            let mut rec = scorer.score(profile, c);
            rec.fallback_match = fallback;
            rec
        })
        .collect();

    let mut recs = CollaborativeBooster::apply(scored, popular, &config.weights);
    rank(&mut recs);
    recs.truncate(config.challenge_limit);

    debug!(
        target: "learnpath::scorer",
        user_id = %profile.user_id,
        returned = recs.len(),
        excluded = exclude.len(),
        "Ranked challenges"
    );
    Ok(recs)
}

/// Rank drill items for a learner, preferring focus categories.
///
/// Like challenges, the general pool tops up only a short focused pool.
#[instrument(level = "debug", skip_all, fields(user_id = %profile.user_id))]
pub async fn recommend_training(
    collab: &Collaborators,
    config: &PlanConfig,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Result<Vec<Recommendation<TrainingItem>>, PlanError> {
    let focused = TrainingFilter {
        categories: focus_filter(&profile.focus_categories),
        limit: Some(config.candidate_pool_limit),
    };
    let pool = async {
        let primary = collab.training.find_active(&focused).await?;
        top_up(primary, config.training_limit, || {
            let any = TrainingFilter {
                categories: None,
                limit: Some(config.candidate_pool_limit),
            };
            async move { collab.training.find_active(&any).await }
        })
        .await
    }
    .await
    .map_err(PlanError::Training)?;

    let scorer = RecommendationScorer::new(&config.weights, now);
    let mut recs: Vec<_> = pool
        .into_marked()
        .into_iter()
        .map(|(item, fallback)| {
            let mut rec = scorer.score(profile, item);
            rec.fallback_match = fallback;
            rec
        })
        .collect();
    rank(&mut recs);
    recs.truncate(config.training_limit);

    debug!(
        target: "learnpath::scorer",
        user_id = %profile.user_id,
        returned = recs.len(),
        "Ranked training items"
    );
    Ok(recs)
}
