//! `build_plan`: profile, recommendations, resources, path and graph.

use crate::audit::{spawn_append, RecommendationLogEntry};
use crate::config::PlanConfig;
use crate::error::{Ignored, PlanError};
use crate::graph::{annotate, KnowledgeGraph};
use crate::path::{LearningPathStep, PathAssembler};
use crate::profile::{load_profile, UserProfile};
use crate::recommend::{recommend_challenges, recommend_training, Recommendation};
use crate::resources::{ResourceMatcher, ResourceQuery};
use crate::store::{Collaborators, ResourceFilter};
use crate::types::{ChallengeMeta, LearningResource, TrainingItem};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Ranked output of one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecommendations {
    pub challenges: Vec<Recommendation<ChallengeMeta>>,
    pub training_data: Vec<Recommendation<TrainingItem>>,
    pub learning_resources: Vec<LearningResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedPlan {
    pub profile: UserProfile,
    pub recommendations: PlanRecommendations,
    pub learning_path: Vec<LearningPathStep>,
    pub graph: KnowledgeGraph,
}

/// Request-scoped plan computation over a set of collaborators.
///
/// Holds no learner state between calls; concurrent calls are independent.
pub struct PlanEngine {
    collab: Collaborators,
    config: PlanConfig,
    pending_audit: Mutex<Vec<JoinHandle<()>>>,
}

impl PlanEngine {
    pub fn new(collab: Collaborators, config: PlanConfig) -> Self {
        Self {
            collab,
            config,
            pending_audit: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collab
    }

    /// Build a plan as of now.
    pub async fn build_plan(&self, user_id: &str) -> Result<PersonalizedPlan, PlanError> {
        self.build_plan_at(user_id, Utc::now()).await
    }

    /// Build a plan with `now` as the freshness reference.
    ///
    /// Profile, graph and resource catalog are read concurrently; challenge
    /// and drill scoring then run concurrently on the profile. The audit
    /// entry is written in the background.
    #[instrument(level = "info", skip(self))]
    pub async fn build_plan_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PersonalizedPlan, PlanError> {
        let collab = &self.collab;
        let config = &self.config;

        let all_resources = ResourceFilter::default();
        let (profile, graph, catalog) = tokio::join!(
            load_profile(collab, config, user_id),
            collab.graph.build_graph(),
            collab.resources.find_active(&all_resources),
        );
        let profile = profile?;
        let graph = graph.map_err(PlanError::Graph)?;
        let catalog = catalog.map_err(Ignored::failed).unwrap_or_else(|reason| {
            warn!(
                target: "learnpath::resources",
                user_id,
                %reason,
                "Resource catalog unavailable; continuing without resources"
            );
            Vec::new()
        });

        let (challenges, training) = tokio::join!(
            recommend_challenges(collab, config, &profile, now),
            recommend_training(collab, config, &profile, now),
        );
        let challenges = challenges?;
        let training = training?;

        let resources = ResourceMatcher::new(&config.weights).rank(
            &catalog,
            &ResourceQuery {
                error_types: profile.error_types(),
                languages: profile.combined_languages.clone(),
                tags: profile.focus_tags.clone(),
                level: profile.experience_level,
                limit: config.resource_limit,
            },
        );

        let learning_path = PathAssembler::new(config.path_resource_steps).assemble(
            &profile.focus_categories,
            &training,
            &challenges,
            &resources,
        );
        let graph = annotate(graph, &profile, &training);

        let entry = RecommendationLogEntry::new(user_id, now)
            .with_challenges(challenges.iter().map(|r| r.id.as_str()))
            .with_training(training.iter().map(|r| r.id.as_str()))
            .with_resources(resources.iter().map(|r| r.url.as_str()));
        self.record(entry);

        info!(
            target: "learnpath::plan",
            user_id,
            level = %profile.experience_level,
            challenges = challenges.len(),
            training = training.len(),
            resources = resources.len(),
            steps = learning_path.len(),
            "Built learning plan"
        );

        Ok(PersonalizedPlan {
            profile,
            recommendations: PlanRecommendations {
                challenges,
                training_data: training,
                learning_resources: resources,
            },
            learning_path,
            graph,
        })
    }

    /// Queue an audit append without waiting on it.
    pub(crate) fn record(&self, entry: RecommendationLogEntry) {
        let handle = spawn_append(self.collab.audit.clone(), entry);
        let mut pending = self.pending_audit.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Wait for queued audit writes. Failed writes were already logged.
    pub async fn flush(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.pending_audit.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(target: "learnpath::audit", error = %e, "Audit task aborted");
            }
        }
    }
}
