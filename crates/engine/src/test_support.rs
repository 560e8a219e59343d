//! Builders for unit tests.

use crate::store::SubmissionRow;
use crate::types::{
    Category, ChallengeMeta, Difficulty, LearningResource, Outcome, ResourceKind,
    SubmissionRecord, TrainingItem,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

/// Fixed reference instant so tests never depend on the wall clock.
pub(crate) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

pub(crate) fn day(n: i64) -> DateTime<Utc> {
    epoch() + Duration::days(n)
}

pub(crate) fn challenge(
    id: &str,
    category: Category,
    difficulty: Difficulty,
    language: &str,
) -> ChallengeMeta {
    ChallengeMeta {
        id: id.to_string(),
        title: format!("Challenge {id}"),
        category,
        difficulty,
        language: language.to_string(),
        tags: Vec::new(),
        updated_at: None,
    }
}

pub(crate) fn tagged(mut c: ChallengeMeta, tags: &[&str]) -> ChallengeMeta {
    c.tags = tags.iter().map(|t| t.to_string()).collect();
    c
}

pub(crate) fn submission(
    id: &str,
    user: &str,
    challenge_id: &str,
    outcome: Outcome,
    on_day: i64,
) -> SubmissionRow {
    SubmissionRow {
        id: id.to_string(),
        user_id: user.to_string(),
        challenge_id: challenge_id.to_string(),
        outcome,
        error_analyses: Vec::new(),
        score: None,
        submitted_at: day(on_day),
    }
}

/// A joined submission record with the given annotated error types.
pub(crate) fn record(
    id: &str,
    challenge: &ChallengeMeta,
    outcome: Outcome,
    errors: &[&str],
    on_day: i64,
) -> SubmissionRecord {
    SubmissionRecord {
        id: id.to_string(),
        user_id: "learner".to_string(),
        challenge: Some(challenge.clone()),
        outcome,
        error_analyses: errors.iter().map(|e| json!({ "errorType": e })).collect(),
        score: None,
        submitted_at: day(on_day),
    }
}

pub(crate) fn training(id: &str, category: Option<Category>, tags: &[&str]) -> TrainingItem {
    TrainingItem {
        id: id.to_string(),
        question: format!("Question {id}"),
        answer: String::new(),
        category,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        priority: None,
    }
}

pub(crate) fn resource(url: &str, error_types: &[&str], language: Option<&str>) -> LearningResource {
    LearningResource {
        title: format!("Resource {url}"),
        url: url.to_string(),
        kind: ResourceKind::Article,
        language: language.map(str::to_string),
        error_types: error_types.iter().map(|e| e.to_string()).collect(),
        tags: Vec::new(),
        category: None,
        difficulty: None,
        quality_score: None,
    }
}

/// Floating-point comparison for additive scores.
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
