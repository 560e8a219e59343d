//! Personalized recommendation and adaptive learning-path engine.
//!
//! Given a learner's submission history, the engine builds a behavioral
//! profile, ranks unsolved challenges and drill items against it, matches
//! external learning resources to the learner's recurring errors, and
//! assembles everything into an ordered learning path.
//!
//! The engine is stateless and request-scoped. Every read goes through the
//! collaborator traits in [`store`]; the only write is a fire-and-forget
//! audit entry.
//!
//! ```no_run
//! use learnpath_engine::{Collaborators, MemStore, PlanConfig, PlanEngine};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), learnpath_engine::PlanError> {
//! let store = Arc::new(MemStore::new());
//! let engine = PlanEngine::new(Collaborators::from_mem(store), PlanConfig::default());
//! let plan = engine.build_plan("learner-1").await?;
//! println!("{} steps", plan.learning_path.len());
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod graph;
pub mod path;
pub mod plan;
pub mod profile;
pub mod recommend;
pub mod related;
pub mod resources;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use audit::{DiscardAudit, RecommendationLogEntry};
pub use config::{PlanConfig, ScoringWeights};
pub use error::{Ignored, PlanError};
pub use graph::KnowledgeGraph;
pub use path::{LearningPathStep, PathAssembler, StepKind};
pub use plan::{PersonalizedPlan, PlanEngine, PlanRecommendations};
pub use profile::{load_profile, UserProfile};
pub use recommend::{Recommendation, RecommendationKind, RecommendationSignal};
pub use related::RelatedRecommendations;
pub use resources::{ResourceMatcher, ResourceQuery};
pub use store::{AuditSink, Collaborators, Dataset, MemStore};
pub use types::{
    Category, ChallengeMeta, Difficulty, ExperienceLevel, LearningResource, Outcome, Proficiency,
    SubmissionRecord, TrainingItem,
};
