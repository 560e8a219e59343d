#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use learnpath_engine::store::SubmissionRow;
use learnpath_engine::types::ResourceKind;
use learnpath_engine::{
    Category, ChallengeMeta, Collaborators, Difficulty, LearningResource, MemStore, Outcome,
    PlanConfig, PlanEngine, TrainingItem,
};
use serde_json::json;
use std::sync::Arc;

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub fn challenge(id: &str, category: Category, difficulty: Difficulty, language: &str) -> ChallengeMeta {
    ChallengeMeta {
        id: id.to_string(),
        title: format!("Challenge {id}"),
        category,
        difficulty,
        language: language.to_string(),
        tags: Vec::new(),
        updated_at: Some(epoch() - Duration::days(10)),
    }
}

pub fn with_tags(mut c: ChallengeMeta, tags: &[&str]) -> ChallengeMeta {
    c.tags = tags.iter().map(|t| t.to_string()).collect();
    c
}

pub fn row(
    id: &str,
    user: &str,
    challenge_id: &str,
    outcome: Outcome,
    errors: &[&str],
    days_ago: i64,
) -> SubmissionRow {
    SubmissionRow {
        id: id.to_string(),
        user_id: user.to_string(),
        challenge_id: challenge_id.to_string(),
        outcome,
        error_analyses: errors.iter().map(|e| json!({ "errorType": e })).collect(),
        score: None,
        submitted_at: epoch() - Duration::days(days_ago),
    }
}

pub fn drill(id: &str, category: Option<Category>, tags: &[&str]) -> TrainingItem {
    TrainingItem {
        id: id.to_string(),
        question: format!("Drill {id}"),
        answer: String::new(),
        category,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        priority: None,
    }
}

pub fn resource(url: &str, error_types: &[&str], quality: f64) -> LearningResource {
    LearningResource {
        title: format!("Guide {url}"),
        url: url.to_string(),
        kind: ResourceKind::Article,
        language: Some("python".to_string()),
        error_types: error_types.iter().map(|e| e.to_string()).collect(),
        tags: Vec::new(),
        category: None,
        difficulty: None,
        quality_score: Some(quality),
    }
}

/// A catalog with every category and difficulty plus a few drills and
/// resources. No submissions.
pub fn seeded_store() -> MemStore {
    let store = MemStore::new();
    let mut n = 0;
    for category in Category::ALL {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for language in ["Python", "Rust"] {
                n += 1;
                store.add_challenge(challenge(&format!("c{n}"), category, difficulty, language));
            }
        }
    }
    store.add_challenge(with_tags(
        challenge("tagged", Category::Logic, Difficulty::Easy, "Python"),
        &["recursion"],
    ));
    for category in Category::ALL {
        store.add_training_item(drill(&format!("t-{category}"), Some(category), &[]));
    }
    store.add_training_item(drill("t-general", None, &["recursion"]));
    store.add_resource(resource("https://guides/syntax", &["syntax"], 4.0));
    store.add_resource(resource("https://guides/logic", &["logic"], 2.0));
    store.add_resource(resource("https://guides/any", &[], 1.0));
    store
}

/// Accepted work by other learners on `challenge_ids`.
pub fn add_peers(store: &MemStore, challenge_ids: &[&str]) {
    for (i, id) in challenge_ids.iter().enumerate() {
        store.add_submission(row(&format!("peer-{i}"), &format!("peer-{i}"), id, Outcome::Accepted, &[], 3));
    }
}

pub fn engine(store: Arc<MemStore>) -> PlanEngine {
    PlanEngine::new(Collaborators::from_mem(store), PlanConfig::default())
}
