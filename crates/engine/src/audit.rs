//! Recommendation audit log entries.
//!
//! One entry is written per plan (or related-content request). The engine
//! never reads entries back.

use crate::store::AuditSink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Immutable record of what was suggested to a learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationLogEntry {
    pub id: Uuid,
    pub user_id: String,
    /// Challenge the request was made from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<String>,
    pub suggested_challenge_ids: Vec<String>,
    pub suggested_training_ids: Vec<String>,
    pub suggested_resource_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl RecommendationLogEntry {
    pub fn new(user_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            challenge_id: None,
            suggested_challenge_ids: Vec::new(),
            suggested_training_ids: Vec::new(),
            suggested_resource_urls: Vec::new(),
            created_at,
        }
    }

    pub fn with_challenge(mut self, challenge_id: impl Into<String>) -> Self {
        self.challenge_id = Some(challenge_id.into());
        self
    }

    pub fn with_challenges<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggested_challenge_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_training<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggested_training_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resources<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggested_resource_urls = urls.into_iter().map(Into::into).collect();
        self
    }
}

/// Sink that drops every entry. Used when auditing is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardAudit;

#[async_trait]
impl AuditSink for DiscardAudit {
    async fn append(&self, entry: RecommendationLogEntry) -> anyhow::Result<()> {
        debug!(target: "learnpath::audit", id = %entry.id, "Audit disabled; entry dropped");
        Ok(())
    }
}

/// Append `entry` in the background.
///
/// The caller does not wait on the write; a failure is logged and dropped.
/// The returned handle exists for tests and graceful shutdown.
pub fn spawn_append(sink: Arc<dyn AuditSink>, entry: RecommendationLogEntry) -> JoinHandle<()> {
    tokio::spawn(async move {
        let id = entry.id;
        let user_id = entry.user_id.clone();
        match sink.append(entry).await {
            Ok(()) => debug!(target: "learnpath::audit", %id, %user_id, "Recorded recommendations"),
            Err(e) => warn!(
                target: "learnpath::audit",
                %id,
                %user_id,
                error = %e,
                "Failed to record recommendations"
            ),
        }
    })
}
