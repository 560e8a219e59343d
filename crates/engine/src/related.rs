//! Related content for a learner's most recent work.
//!
//! A lighter counterpart to the full plan: it looks only at the last few
//! submissions (optionally on one challenge), scores every active challenge
//! and drill with fixed points, and summarizes recurring errors as knowledge
//! gaps.

use crate::audit::RecommendationLogEntry;
use crate::error::PlanError;
use crate::plan::PlanEngine;
use crate::recommend::similarity::mentions;
use crate::recommend::{rank, Recommendation, RecommendationKind};
use crate::resources::{suggest, ResourceQuery};
use crate::store::{ChallengeFilter, SubmissionQuery, TrainingFilter};
use crate::types::{ChallengeMeta, Difficulty, ExperienceLevel, LearningResource, TrainingItem};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Submissions considered for related content.
pub const RELATED_HISTORY_LIMIT: usize = 20;

const GAP_ERROR_TYPES: usize = 3;
const GAP_EXAMPLES: usize = 2;
const EXAMPLE_MAX_CHARS: usize = 120;

/// Error counts over the inspected submissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSummary {
    /// Count per error type, in first-seen order.
    pub error_types: IndexMap<String, u32>,
    pub total_errors: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedRecommendations {
    pub experience_level: ExperienceLevel,
    pub error_summary: ErrorSummary,
    pub challenges: Vec<Recommendation<ChallengeMeta>>,
    pub training_data: Vec<Recommendation<TrainingItem>>,
    pub learning_resources: Vec<LearningResource>,
    pub knowledge_gaps: Vec<String>,
}

/// Signals extracted from recent submissions.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecentContext {
    errors: IndexMap<String, u32>,
    messages: Vec<String>,
    categories: IndexSet<String>,
    tags: IndexSet<String>,
    languages: IndexSet<String>,
    accepted: u32,
    latest_accepted: bool,
}

impl RecentContext {
    fn absorb_challenge(&mut self, challenge: &ChallengeMeta) {
        self.categories.insert(challenge.category.to_string());
        for tag in &challenge.tags {
            self.tags.insert(tag.to_lowercase());
        }
        self.languages.insert(challenge.language.to_lowercase());
    }

    fn experience_level(&self) -> ExperienceLevel {
        ExperienceLevel::from_accepted(self.accepted)
    }

    /// Difficulties worth suggesting next; the first is the primary target.
    fn target_difficulties(&self) -> Vec<Difficulty> {
        use Difficulty::*;
        match (self.experience_level(), self.latest_accepted) {
            (ExperienceLevel::Beginner, true) => vec![Medium, Easy],
            (ExperienceLevel::Beginner, false) => vec![Easy],
            (ExperienceLevel::Intermediate, true) => vec![Medium, Hard, Easy],
            (ExperienceLevel::Intermediate, false) => vec![Easy, Medium],
            (ExperienceLevel::Advanced, true) => vec![Hard, Medium],
            (ExperienceLevel::Advanced, false) => vec![Medium, Hard],
        }
    }

    fn has_related_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.tags.contains(&t.to_lowercase()))
    }

    fn score_training(&self, item: TrainingItem) -> Recommendation<TrainingItem> {
        let mut rec = Recommendation::new(item.id.clone(), RecommendationKind::TrainingData, item);
        let question = rec.data.question.to_lowercase();
        let answer = rec.data.answer.to_lowercase();

        for error_type in self.errors.keys() {
            if mentions(&question, error_type) || mentions(&answer, error_type) {
                rec.push_reason(3.0, format!("Covers {error_type} errors you hit recently"));
            }
        }
        for message in &self.messages {
            if question.contains(message.as_str()) || answer.contains(message.as_str()) {
                rec.push_reason(2.0, "Mentions an error message from your submissions");
            }
        }
        if let Some(category) = rec.data.category {
            if self.categories.contains(category.as_str()) {
                rec.push_reason(2.0, format!("Same category as your recent work ({category})"));
            }
        }
        if self.has_related_tag(&rec.data.tags) {
            rec.push_reason(2.0, "Shares tags with your recent challenges");
        }
        if self.latest_accepted {
            rec.push_reason(0.5, "Reinforces your latest accepted solution");
        }
        rec
    }

    fn score_challenge(
        &self,
        challenge: ChallengeMeta,
        current: Option<&ChallengeMeta>,
        targets: &[Difficulty],
    ) -> Option<Recommendation<ChallengeMeta>> {
        if let Some(current) = current {
            if !challenge.language.eq_ignore_ascii_case(&current.language) {
                return None;
            }
        }

        let mut rec = Recommendation::new(challenge.id.clone(), RecommendationKind::Challenge, challenge);
        let difficulty = rec.data.difficulty;
        if targets.contains(&difficulty) {
            rec.push_reason(3.0, format!("{difficulty} is the right next difficulty"));
        }
        if self.categories.contains(rec.data.category.as_str()) {
            let category = rec.data.category;
            rec.push_reason(2.0, format!("Same category as your recent work ({category})"));
        }
        if self.has_related_tag(&rec.data.tags) {
            rec.push_reason(2.0, "Shares tags with your recent challenges");
        }
        if self.languages.contains(&rec.data.language.to_lowercase()) {
            let language = rec.data.language.clone();
            rec.push_reason(1.0, format!("Written in {language}, like your recent work"));
        }
        for error_type in self.errors.keys() {
            let needle = error_type.to_lowercase();
            if rec.data.tags.iter().any(|t| t.to_lowercase().contains(&needle)) {
                rec.push_reason(1.0, format!("Tagged with {error_type}"));
            }
        }
        if self.latest_accepted && targets.first() != Some(&difficulty) && targets.contains(&difficulty)
        {
            rec.push_reason(0.5, "A step beside your main target difficulty");
        }
        Some(rec)
    }

    fn knowledge_gaps(&self) -> Vec<String> {
        let mut ranked: Vec<(&String, &u32)> = self.errors.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1));
        if ranked.is_empty() {
            return Vec::new();
        }

        let mut gaps: Vec<String> = ranked
            .into_iter()
            .take(GAP_ERROR_TYPES)
            .map(|(error_type, &count)| gap_text(error_type, count))
            .collect();
        gaps.extend(
            self.messages
                .iter()
                .take(GAP_EXAMPLES)
                .map(|m| format!("Example error: {}", truncate(m, EXAMPLE_MAX_CHARS))),
        );
        gaps
    }

    fn error_summary(&self) -> ErrorSummary {
        ErrorSummary {
            error_types: self.errors.clone(),
            total_errors: self.errors.values().sum(),
        }
    }
}

fn gap_text(error_type: &str, count: u32) -> String {
    match error_type.to_lowercase().as_str() {
        "syntax" => format!(
            "Syntax errors ({count}x): check punctuation, brackets, indentation and declarations."
        ),
        "runtime" => format!(
            "Runtime errors ({count}x): guard against missing values, input bounds, division by zero and out-of-range indexing."
        ),
        "typeerror" => format!(
            "Type errors ({count}x): parse or convert values to the expected type before using them."
        ),
        "nameerror" => format!(
            "Name errors ({count}x): a variable or function is undeclared or used outside its scope."
        ),
        "referenceerror" => format!(
            "Reference errors ({count}x): a name is used outside its scope or an import is missing."
        ),
        "logic" => format!("Logic errors ({count}x): revisit conditions, loops and edge cases."),
        "timeout" => format!(
            "Timeouts ({count}x): reduce algorithmic complexity and tighten hot loops."
        ),
        "memory" => format!(
            "Memory errors ({count}x): avoid oversized buffers and release intermediate values."
        ),
        _ => format!("{error_type} errors ({count}x): review the code that triggers them."),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{kept}...")
}

impl PlanEngine {
    /// Related content as of now.
    pub async fn related(
        &self,
        user_id: &str,
        challenge_id: Option<&str>,
    ) -> Result<RelatedRecommendations, PlanError> {
        self.related_at(user_id, challenge_id, Utc::now()).await
    }

    /// Related content for the learner's recent work, optionally on one
    /// challenge. An unknown `challenge_id` is an error.
    #[instrument(level = "info", skip(self))]
    pub async fn related_at(
        &self,
        user_id: &str,
        challenge_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<RelatedRecommendations, PlanError> {
        let collab = self.collaborators();
        let config = self.config();

        let current = match challenge_id {
            Some(id) => Some(
                collab
                    .challenges
                    .get(id)
                    .await
                    .map_err(PlanError::Challenges)?
                    .ok_or_else(|| PlanError::UnknownChallenge(id.to_string()))?,
            ),
            None => None,
        };

        let history = collab
            .submissions
            .find_recent(&SubmissionQuery {
                user_id: user_id.to_string(),
                challenge_id: challenge_id.map(str::to_string),
                limit: RELATED_HISTORY_LIMIT,
            })
            .await
            .map_err(PlanError::Submissions)?;

        let mut ctx = RecentContext::default();
        if let Some(c) = &current {
            ctx.absorb_challenge(c);
        }
        for sub in &history {
            if sub.is_accepted() {
                ctx.accepted += 1;
            } else {
                for annotation in sub.annotations() {
                    *ctx.errors.entry(annotation.error_type).or_insert(0) += 1;
                    if let Some(message) = annotation.error_message {
                        ctx.messages.push(message.to_lowercase());
                    }
                }
            }
            if let Some(c) = &sub.challenge {
                ctx.absorb_challenge(c);
            }
        }
        ctx.latest_accepted = history.first().is_some_and(|s| s.is_accepted());
        let level = ctx.experience_level();
        let targets = ctx.target_difficulties();

        let all_training = TrainingFilter::default();
        let all_challenges = ChallengeFilter::default();
        let resource_query = ResourceQuery {
            error_types: ctx.errors.keys().cloned().collect(),
            languages: ctx.languages.iter().cloned().collect(),
            tags: ctx.tags.iter().cloned().collect(),
            level,
            limit: config.resource_limit,
        };
        let (training, challenges, resources) = tokio::join!(
            collab.training.find_active(&all_training),
            collab.challenges.find_active(&all_challenges),
            suggest(collab.resources.as_ref(), &config.weights, &resource_query),
        );
        let training = training.map_err(PlanError::Training)?;
        let challenges = challenges.map_err(PlanError::Challenges)?;
        let resources = resources.unwrap_or_else(|e| {
            warn!(
                target: "learnpath::resources",
                user_id,
                error = %e,
                "Resource catalog unavailable; continuing without resources"
            );
            Vec::new()
        });

        let mut training: Vec<_> = training
            .into_iter()
            .map(|item| ctx.score_training(item))
            .filter(|r| r.score > 0.0)
            .collect();
        rank(&mut training);
        training.truncate(config.training_limit);

        let mut challenges: Vec<_> = challenges
            .into_iter()
            .filter(|c| Some(c.id.as_str()) != challenge_id)
            .filter_map(|c| ctx.score_challenge(c, current.as_ref(), &targets))
            .filter(|r| r.score > 0.0)
            .collect();
        rank(&mut challenges);
        challenges.truncate(config.challenge_limit);

        let mut entry = RecommendationLogEntry::new(user_id, now)
            .with_challenges(challenges.iter().map(|r| r.id.as_str()))
            .with_training(training.iter().map(|r| r.id.as_str()))
            .with_resources(resources.iter().map(|r| r.url.as_str()));
        if let Some(id) = challenge_id {
            entry = entry.with_challenge(id);
        }
        self.record(entry);

        info!(
            target: "learnpath::plan",
            user_id,
            level = %level,
            errors = ctx.errors.len(),
            challenges = challenges.len(),
            training = training.len(),
            "Built related recommendations"
        );

        Ok(RelatedRecommendations {
            experience_level: level,
            error_summary: ctx.error_summary(),
            challenges,
            training_data: training,
            learning_resources: resources,
            knowledge_gaps: ctx.knowledge_gaps(),
        })
    }
}
