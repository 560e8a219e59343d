//! In-memory collaborator implementation for tests and dataset-driven runs.

use super::{
    AuditSink, ChallengeFilter, ChallengeStore, GraphSource, LanguagePreferenceStore,
    PeerAcceptance, PeerQuery, ResourceCatalog, ResourceFilter, SubmissionQuery, SubmissionStore,
    TrainingFilter, TrainingStore,
};
use crate::audit::RecommendationLogEntry;
use crate::graph::KnowledgeGraph;
use crate::types::{
    ChallengeMeta, LearningResource, Outcome, SubmissionRecord, TrainingItem,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A stored submission that references its challenge by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRow {
    pub id: String,
    pub user_id: String,
    pub challenge_id: String,
    pub outcome: Outcome,
    #[serde(default)]
    pub error_analyses: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

/// Serializable snapshot of every store's contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub challenges: Vec<ChallengeMeta>,
    pub submissions: Vec<SubmissionRow>,
    pub training_items: Vec<TrainingItem>,
    pub resources: Vec<LearningResource>,
    pub language_preferences: BTreeMap<String, Vec<String>>,
    pub legacy_favorites: BTreeMap<String, Vec<String>>,
    pub graph: Option<KnowledgeGraph>,
}

/// In-memory store backing every collaborator trait.
///
/// Query results keep dataset order, which makes ranking ties deterministic.
#[derive(Default)]
pub struct MemStore {
    data: RwLock<Dataset>,
    audit: Mutex<Vec<RecommendationLogEntry>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            data: RwLock::new(dataset),
            audit: Mutex::new(Vec::new()),
        }
    }

    pub fn add_challenge(&self, challenge: ChallengeMeta) {
        self.data.write().challenges.push(challenge);
    }

    pub fn add_submission(&self, row: SubmissionRow) {
        self.data.write().submissions.push(row);
    }

    pub fn add_training_item(&self, item: TrainingItem) {
        self.data.write().training_items.push(item);
    }

    pub fn add_resource(&self, resource: LearningResource) {
        self.data.write().resources.push(resource);
    }

    pub fn set_preferences(&self, user_id: &str, languages: Vec<String>) {
        self.data
            .write()
            .language_preferences
            .insert(user_id.to_string(), languages);
    }

    pub fn set_legacy_favorites(&self, user_id: &str, languages: Vec<String>) {
        self.data
            .write()
            .legacy_favorites
            .insert(user_id.to_string(), languages);
    }

    pub fn set_graph(&self, graph: KnowledgeGraph) {
        self.data.write().graph = Some(graph);
    }

    /// Audit entries appended so far, oldest first.
    pub fn audit_entries(&self) -> Vec<RecommendationLogEntry> {
        self.audit.lock().clone()
    }

    fn join(data: &Dataset, row: &SubmissionRow) -> SubmissionRecord {
        let challenge = data
            .challenges
            .iter()
            .find(|c| c.id == row.challenge_id)
            .cloned();
        SubmissionRecord {
            id: row.id.clone(),
            user_id: row.user_id.clone(),
            challenge,
            outcome: row.outcome,
            error_analyses: row.error_analyses.clone(),
            score: row.score,
            submitted_at: row.submitted_at,
        }
    }
}

#[async_trait]
impl SubmissionStore for MemStore {
    async fn find_recent(&self, query: &SubmissionQuery) -> Result<Vec<SubmissionRecord>> {
        let data = self.data.read();
        let mut rows: Vec<&SubmissionRow> = data
            .submissions
            .iter()
            .filter(|s| s.user_id == query.user_id)
            .filter(|s| {
                query
                    .challenge_id
                    .as_ref()
                    .is_none_or(|id| &s.challenge_id == id)
            })
            .collect();
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        rows.truncate(query.limit);
        Ok(rows.into_iter().map(|row| Self::join(&data, row)).collect())
    }

    async fn accepted_by_others(&self, query: &PeerQuery) -> Result<Vec<PeerAcceptance>> {
        let data = self.data.read();
        let challenges: HashMap<&str, &ChallengeMeta> = data
            .challenges
            .iter()
            .map(|c| (c.id.as_str(), c))
            .collect();
        let accepted = data
            .submissions
            .iter()
            .filter(|s| s.outcome == Outcome::Accepted && s.user_id != query.exclude_user)
            .filter(|s| {
                let Some(challenge) = challenges.get(s.challenge_id.as_str()) else {
                    return false;
                };
                let language_ok = query.languages.is_empty()
                    || query
                        .languages
                        .iter()
                        .any(|l| l.eq_ignore_ascii_case(&challenge.language));
                let category_ok =
                    query.categories.is_empty() || query.categories.contains(&challenge.category);
                language_ok && category_ok
            })
            .map(|s| PeerAcceptance {
                user_id: s.user_id.clone(),
                challenge_id: s.challenge_id.clone(),
                score: s.score,
            })
            .collect();
        Ok(accepted)
    }
}

#[async_trait]
impl ChallengeStore for MemStore {
    async fn find_active(&self, filter: &ChallengeFilter) -> Result<Vec<ChallengeMeta>> {
        let data = self.data.read();
        let iter = data
            .challenges
            .iter()
            .filter(|c| !filter.exclude_ids.contains(&c.id))
            .filter(|c| {
                filter
                    .categories
                    .as_ref()
                    .is_none_or(|cats| cats.contains(&c.category))
            })
            .cloned();
        Ok(match filter.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        })
    }

    async fn accepted_ids(&self, user_id: &str) -> Result<HashSet<String>> {
        let data = self.data.read();
        Ok(data
            .submissions
            .iter()
            .filter(|s| s.user_id == user_id && s.outcome == Outcome::Accepted)
            .map(|s| s.challenge_id.clone())
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<ChallengeMeta>> {
        let data = self.data.read();
        Ok(data.challenges.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl TrainingStore for MemStore {
    async fn find_active(&self, filter: &TrainingFilter) -> Result<Vec<TrainingItem>> {
        let data = self.data.read();
        let iter = data
            .training_items
            .iter()
            .filter(|t| match &filter.categories {
                None => true,
                Some(cats) => t.category.is_some_and(|c| cats.contains(&c)),
            })
            .cloned();
        Ok(match filter.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        })
    }
}

fn any_of(wanted: &[String], value: Option<&str>) -> bool {
    if wanted.is_empty() {
        return true;
    }
    value.is_some_and(|v| wanted.iter().any(|w| w.eq_ignore_ascii_case(v)))
}

fn any_in(wanted: &[String], values: &[String]) -> bool {
    wanted.is_empty() || values.iter().any(|v| any_of(wanted, Some(v)))
}

#[async_trait]
impl ResourceCatalog for MemStore {
    async fn find_active(&self, filter: &ResourceFilter) -> Result<Vec<LearningResource>> {
        let data = self.data.read();
        Ok(data
            .resources
            .iter()
            .filter(|r| any_in(&filter.error_types, &r.error_types))
            .filter(|r| any_of(&filter.languages, r.language.as_deref()))
            .filter(|r| any_in(&filter.tags, &r.tags))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LanguagePreferenceStore for MemStore {
    async fn get(&self, user_id: &str) -> Result<Option<Vec<String>>> {
        Ok(self.data.read().language_preferences.get(user_id).cloned())
    }

    async fn legacy_favorites(&self, user_id: &str) -> Result<Option<Vec<String>>> {
        Ok(self.data.read().legacy_favorites.get(user_id).cloned())
    }
}

#[async_trait]
impl GraphSource for MemStore {
    async fn build_graph(&self) -> Result<KnowledgeGraph> {
        Ok(self.data.read().graph.clone().unwrap_or_default())
    }
}

#[async_trait]
impl AuditSink for MemStore {
    async fn append(&self, entry: RecommendationLogEntry) -> Result<()> {
        self.audit.lock().push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::favorite_languages;
    use crate::test_support::{challenge, submission};
    use crate::types::{Category, Difficulty};

    fn store() -> MemStore {
        let store = MemStore::new();
        store.add_challenge(challenge("c1", Category::Syntax, Difficulty::Easy, "Python"));
        store.add_challenge(challenge("c2", Category::Logic, Difficulty::Hard, "Rust"));
        store.add_submission(submission("s1", "alice", "c1", Outcome::Rejected, 1));
        store.add_submission(submission("s2", "alice", "c1", Outcome::Accepted, 3));
        store.add_submission(submission("s3", "bob", "c2", Outcome::Accepted, 2));
        store.add_submission(submission("s4", "alice", "gone", Outcome::Rejected, 2));
        store
    }

    #[tokio::test]
    async fn test_find_recent_sorts_newest_first_and_joins() {
        let store = store();
        let recent = store
            .find_recent(&SubmissionQuery {
                user_id: "alice".into(),
                challenge_id: None,
                limit: 10,
            })
            .await
            .unwrap();
        let ids: Vec<_> = recent.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s4", "s1"]);
        assert!(recent[1].challenge.is_none());
        assert_eq!(recent[0].challenge.as_ref().unwrap().language, "Python");
    }

    #[tokio::test]
    async fn test_find_recent_respects_limit_and_challenge() {
        let store = store();
        let recent = store
            .find_recent(&SubmissionQuery {
                user_id: "alice".into(),
                challenge_id: Some("c1".into()),
                limit: 1,
            })
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, "s2");
    }

    #[tokio::test]
    async fn test_accepted_by_others_filters() {
        let store = store();
        let peers = store
            .accepted_by_others(&PeerQuery {
                exclude_user: "alice".into(),
                languages: vec!["rust".into()],
                categories: vec![],
            })
            .await
            .unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].user_id, "bob");

        let none = store
            .accepted_by_others(&PeerQuery {
                exclude_user: "alice".into(),
                languages: vec![],
                categories: vec![Category::Security],
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_accepted_ids() {
        let ids = store().accepted_ids("alice").await.unwrap();
        assert_eq!(ids, HashSet::from(["c1".to_string()]));
    }

    #[tokio::test]
    async fn test_challenge_filter_excludes_and_limits() {
        let store = store();
        let filter = ChallengeFilter {
            exclude_ids: HashSet::from(["c1".to_string()]),
            categories: None,
            limit: Some(5),
        };
        let found = ChallengeStore::find_active(&store, &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "c2");
    }

    #[tokio::test]
    async fn test_favorites_fall_back_to_legacy() {
        let store = MemStore::new();
        store.set_legacy_favorites("alice", vec!["Go".into()]);
        assert_eq!(favorite_languages(&store, "alice").await.unwrap(), vec!["Go"]);
        store.set_preferences("alice", vec!["Rust".into()]);
        assert_eq!(favorite_languages(&store, "alice").await.unwrap(), vec!["Rust"]);
        assert!(favorite_languages(&store, "bob").await.unwrap().is_empty());
    }

    #[test]
    fn test_dataset_deserializes_camel_case() {
        let json = r#"{
            "challenges": [{"id": "c1", "title": "Off by one", "category": "Logic",
                            "difficulty": "Easy", "language": "Python", "tags": ["loops"]}],
            "submissions": [{"id": "s1", "userId": "u", "challengeId": "c1",
                             "outcome": "rejected",
                             "errorAnalyses": [{"errorType": "logic"}],
                             "submittedAt": "2026-01-01T00:00:00Z"}],
            "languagePreferences": {"u": ["Python"]}
        }"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.challenges.len(), 1);
        assert_eq!(dataset.submissions[0].outcome, Outcome::Rejected);
        assert!(dataset.training_items.is_empty());
        assert!(dataset.graph.is_none());
    }
}
