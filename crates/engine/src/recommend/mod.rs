//! Ranked challenge and drill recommendations.

pub mod collaborative;
mod explainer;
pub mod pool;
mod scorer;
pub mod similarity;

pub use collaborative::{aggregate_peers, CollaborativeBooster, PeerPopularity};
pub use explainer::describe;
pub use pool::{merge_pools, top_up, CandidatePool};
pub use scorer::{recommend_challenges, recommend_training, RecommendationScorer, Scorer};

use crate::config::ScoringWeights;
use crate::types::{Category, Difficulty};
use serde::{Deserialize, Serialize};

/// What a recommendation points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Challenge,
    TrainingData,
}

/// A scored candidate with a trace of the terms that fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation<T> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub score: f64,
    /// Human-readable reason per fired term, in firing order.
    pub reasons: Vec<String>,
    #[serde(default)]
    pub signals: Vec<RecommendationSignal>,
    /// Came from the unfiltered top-up pool rather than the focused query.
    #[serde(default)]
    pub fallback_match: bool,
    pub data: T,
}

impl<T> Recommendation<T> {
    pub fn new(id: impl Into<String>, kind: RecommendationKind, data: T) -> Self {
        Self {
            id: id.into(),
            kind,
            score: 0.0,
            reasons: Vec::new(),
            signals: Vec::new(),
            fallback_match: false,
            data,
        }
    }

    /// Record a fired term: adds its contribution and its reason.
    pub fn push_signal(&mut self, signal: RecommendationSignal, weights: &ScoringWeights) {
        self.score += signal.contribution(weights);
        self.reasons.push(describe(&signal));
        self.signals.push(signal);
    }

    /// Add a free-form term that has no structured signal.
    pub fn push_reason(&mut self, points: f64, reason: impl Into<String>) {
        self.score += points;
        self.reasons.push(reason.into());
    }
}

/// Sort by score descending. Ties keep their current (pool) order.
pub fn rank<T>(recs: &mut [Recommendation<T>]) {
    recs.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Scoring terms that can contribute to a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum RecommendationSignal {
    /// Challenge category is one of the learner's focus categories.
    FocusCategory { category: Category },
    /// Challenge category outside the focus set.
    BaselineCategory { category: Category },
    /// Language is an explicit favorite.
    FavoriteLanguage { language: String },
    /// Favorite language the learner already handles well.
    StrongLanguage { language: String, proficiency: f64 },
    /// Language inferred from accepted work.
    FamiliarLanguage { language: String },
    /// Learner has no language signal at all.
    NoLanguageSignal,
    /// Language outside every known preference.
    OtherLanguage { language: String },
    /// Proximity of challenge difficulty to the learner's target (0.0 - 1.0).
    DifficultyFit { difficulty: Difficulty, fit: f64 },
    /// Challenge carries focus tags.
    FocusTags { tags: Vec<String> },
    /// No focus tag on the challenge.
    BaselineTag,
    /// Recency of the last update (floor - 1.0).
    Freshness { factor: f64, age_days: Option<u32> },
    /// Category proficiency in the productive middle band.
    CategorySweetSpot { category: Category, proficiency: f64 },
    /// Difficulty success rate in the productive stretch band.
    DifficultyProgression { difficulty: Difficulty, progression: f64 },
    /// Learner is solving challenges quickly.
    ActiveLearner { velocity: f64 },
    /// Accepted by many peers with similar languages and focus.
    PopularWithPeers { learners: u32 },
    /// Drill category is a focus category.
    TrainingFocusCategory { category: Category },
    /// Drill carries focus tags.
    TrainingFocusTags { tags: Vec<String> },
    /// Drill has no focus tag.
    TrainingBaselineTag,
    /// Curator-assigned drill priority.
    Priority { priority: f64 },
}

impl RecommendationSignal {
    /// Points this term adds under the given weights.
    pub fn contribution(&self, w: &ScoringWeights) -> f64 {
        match self {
            Self::FocusCategory { .. } => w.focus_category,
            Self::BaselineCategory { .. } => w.baseline_category,
            Self::FavoriteLanguage { .. } => w.favorite_language,
            Self::StrongLanguage { .. } => w.strong_language_bonus,
            Self::FamiliarLanguage { .. } => w.familiar_language,
            Self::NoLanguageSignal => w.no_language_signal,
            Self::OtherLanguage { .. } => w.other_language,
            Self::DifficultyFit { fit, .. } => fit * w.difficulty_fit,
            Self::FocusTags { .. } => w.focus_tag,
            Self::BaselineTag => w.baseline_tag,
            Self::Freshness { factor, .. } => factor * w.freshness,
            Self::CategorySweetSpot { .. } => w.category_sweet_spot,
            Self::DifficultyProgression { .. } => w.progression_bonus,
            Self::ActiveLearner { .. } => w.velocity_bonus,
            Self::PopularWithPeers { .. } => w.collaborative_bonus,
            Self::TrainingFocusCategory { .. } => w.training_focus_category,
            Self::TrainingFocusTags { .. } => w.training_focus_tag,
            Self::TrainingBaselineTag => w.training_baseline_tag,
            Self::Priority { priority } => priority * w.training_priority,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FocusCategory { .. } => "focus-category",
            Self::BaselineCategory { .. } => "baseline-category",
            Self::FavoriteLanguage { .. } => "favorite-language",
            Self::StrongLanguage { .. } => "strong-language",
            Self::FamiliarLanguage { .. } => "familiar-language",
            Self::NoLanguageSignal => "no-language-signal",
            Self::OtherLanguage { .. } => "other-language",
            Self::DifficultyFit { .. } => "difficulty-fit",
            Self::FocusTags { .. } => "focus-tags",
            Self::BaselineTag => "baseline-tag",
            Self::Freshness { .. } => "freshness",
            Self::CategorySweetSpot { .. } => "category-sweet-spot",
            Self::DifficultyProgression { .. } => "difficulty-progression",
            Self::ActiveLearner { .. } => "active-learner",
            Self::PopularWithPeers { .. } => "popular-with-peers",
            Self::TrainingFocusCategory { .. } => "training-focus-category",
            Self::TrainingFocusTags { .. } => "training-focus-tags",
            Self::TrainingBaselineTag => "training-baseline-tag",
            Self::Priority { .. } => "priority",
        }
    }
}
