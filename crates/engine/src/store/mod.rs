//! Collaborator contracts consumed by the engine.
//!
//! The engine only reads through these traits (plus one append to the audit
//! sink). [`MemStore`] implements all of them in memory.

mod mem;

pub use mem::{Dataset, MemStore, SubmissionRow};

use crate::audit::RecommendationLogEntry;
use crate::graph::KnowledgeGraph;
use crate::types::{Category, ChallengeMeta, LearningResource, SubmissionRecord, TrainingItem};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Query for a learner's recent submissions, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionQuery {
    pub user_id: String,
    /// Restrict to one challenge.
    pub challenge_id: Option<String>,
    pub limit: usize,
}

/// Query for accepted work by everyone except one learner.
///
/// Empty `languages` or `categories` means no restriction on that field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerQuery {
    pub exclude_user: String,
    pub languages: Vec<String>,
    pub categories: Vec<Category>,
}

/// One accepted submission by another learner.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerAcceptance {
    pub user_id: String,
    pub challenge_id: String,
    pub score: Option<f64>,
}

/// Filter for active challenges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeFilter {
    pub exclude_ids: HashSet<String>,
    /// `None` means any category.
    pub categories: Option<Vec<Category>>,
    pub limit: Option<usize>,
}

/// Filter for active drill items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingFilter {
    pub categories: Option<Vec<Category>>,
    pub limit: Option<usize>,
}

/// Filter for active learning resources. Each non-empty list is an any-of
/// match against the lower-cased resource field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    pub error_types: Vec<String>,
    pub languages: Vec<String>,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn find_recent(&self, query: &SubmissionQuery) -> Result<Vec<SubmissionRecord>>;
    async fn accepted_by_others(&self, query: &PeerQuery) -> Result<Vec<PeerAcceptance>>;
}

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn find_active(&self, filter: &ChallengeFilter) -> Result<Vec<ChallengeMeta>>;
    /// Ids of every challenge the learner has an accepted submission for.
    async fn accepted_ids(&self, user_id: &str) -> Result<HashSet<String>>;
    async fn get(&self, id: &str) -> Result<Option<ChallengeMeta>>;
}

#[async_trait]
pub trait TrainingStore: Send + Sync {
    async fn find_active(&self, filter: &TrainingFilter) -> Result<Vec<TrainingItem>>;
}

#[async_trait]
pub trait ResourceCatalog: Send + Sync {
    async fn find_active(&self, filter: &ResourceFilter) -> Result<Vec<LearningResource>>;
}

#[async_trait]
pub trait LanguagePreferenceStore: Send + Sync {
    /// Explicit language preference record, if the learner has one.
    async fn get(&self, user_id: &str) -> Result<Option<Vec<String>>>;
    /// Older per-user favorite list, consulted when no record exists.
    async fn legacy_favorites(&self, user_id: &str) -> Result<Option<Vec<String>>>;
}

#[async_trait]
pub trait GraphSource: Send + Sync {
    async fn build_graph(&self) -> Result<KnowledgeGraph>;
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: RecommendationLogEntry) -> Result<()>;
}

/// Handles to every collaborator the engine talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub submissions: Arc<dyn SubmissionStore>,
    pub challenges: Arc<dyn ChallengeStore>,
    pub training: Arc<dyn TrainingStore>,
    pub resources: Arc<dyn ResourceCatalog>,
    pub preferences: Arc<dyn LanguagePreferenceStore>,
    pub graph: Arc<dyn GraphSource>,
    pub audit: Arc<dyn AuditSink>,
}

impl Collaborators {
    /// Wire every collaborator to the same in-memory store.
    pub fn from_mem(store: Arc<MemStore>) -> Self {
        Self {
            submissions: store.clone(),
            challenges: store.clone(),
            training: store.clone(),
            resources: store.clone(),
            preferences: store.clone(),
            graph: store.clone(),
            audit: store,
        }
    }

    /// Replace the audit sink (e.g. with a persistent one).
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }
}

/// Resolve a learner's explicit favorite languages, falling back to the
/// legacy per-user field when no preference record exists.
pub async fn favorite_languages(
    store: &dyn LanguagePreferenceStore,
    user_id: &str,
) -> Result<Vec<String>> {
    if let Some(languages) = store.get(user_id).await? {
        return Ok(languages);
    }
    Ok(store.legacy_favorites(user_id).await?.unwrap_or_default())
}
