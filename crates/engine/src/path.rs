//! Learning path assembly.
//!
//! Steps are grouped by category: focus categories first, then any other
//! category that has a top-ranked item, in first-seen order. Each group
//! yields at most one drill step followed by at most one challenge step.
//! Resource steps trail the groups. Numbering follows emission order and is
//! never re-sorted.

use crate::recommend::Recommendation;
use crate::types::{Category, ChallengeMeta, Difficulty, LearningResource, TrainingItem};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Category label for items without a category.
pub const GENERAL_CATEGORY: &str = "general";

const TRAINING_DESCRIPTION: &str = "Review the concepts behind your recent mistakes with this drill.";
const CHALLENGE_DESCRIPTION: &str = "Apply what you reviewed on a challenge matched to your level.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Training,
    Challenge,
}

/// One ordered step of a learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathStep {
    /// 1-based position.
    pub step: usize,
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Drill id, challenge id or resource URL.
    pub target: String,
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: String,
    /// Scorer reasons for drills and challenges; the URL for resources.
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Default)]
struct Group<'a> {
    training: Option<&'a Recommendation<TrainingItem>>,
    challenge: Option<&'a Recommendation<ChallengeMeta>>,
}

fn category_label(category: Option<Category>) -> String {
    category.map_or_else(|| GENERAL_CATEGORY.to_string(), |c| c.to_string())
}

/// Builds a path from ranked recommendations.
#[derive(Debug, Clone, Copy)]
pub struct PathAssembler {
    resource_steps: usize,
}

impl Default for PathAssembler {
    fn default() -> Self {
        Self { resource_steps: 3 }
    }
}

impl PathAssembler {
    pub fn new(resource_steps: usize) -> Self {
        Self { resource_steps }
    }

    pub fn assemble(
        &self,
        focus_categories: &[Category],
        training: &[Recommendation<TrainingItem>],
        challenges: &[Recommendation<ChallengeMeta>],
        resources: &[LearningResource],
    ) -> Vec<LearningPathStep> {
        let mut groups: IndexMap<String, Group<'_>> = IndexMap::new();
        for &category in focus_categories {
            groups.entry(category.to_string()).or_default();
        }
        for rec in training {
            let group = groups.entry(category_label(rec.data.category)).or_default();
            group.training.get_or_insert(rec);
        }
        for rec in challenges {
            let group = groups
                .entry(category_label(Some(rec.data.category)))
                .or_default();
            group.challenge.get_or_insert(rec);
        }

        let mut steps = Vec::new();
        let mut push = |mut step: LearningPathStep| {
            step.step = steps.len() + 1;
            steps.push(step);
        };

        for (category, group) in &groups {
            if let Some(rec) = group.training {
                push(LearningPathStep {
                    step: 0,
                    kind: StepKind::Training,
                    target: rec.id.clone(),
                    title: rec.data.question.clone(),
                    category: category.clone(),
                    difficulty: None,
                    tags: rec.data.tags.clone(),
                    description: TRAINING_DESCRIPTION.to_string(),
                    resources: rec.reasons.clone(),
                });
            }
            if let Some(rec) = group.challenge {
                push(LearningPathStep {
                    step: 0,
                    kind: StepKind::Challenge,
                    target: rec.id.clone(),
                    title: rec.data.title.clone(),
                    category: category.clone(),
                    difficulty: Some(rec.data.difficulty),
                    tags: rec.data.tags.clone(),
                    description: CHALLENGE_DESCRIPTION.to_string(),
                    resources: rec.reasons.clone(),
                });
            }
        }

        for res in resources.iter().take(self.resource_steps) {
            push(LearningPathStep {
                step: 0,
                kind: StepKind::Training,
                target: res.url.clone(),
                title: res.title.clone(),
                category: res
                    .category
                    .clone()
                    .unwrap_or_else(|| GENERAL_CATEGORY.to_string()),
                difficulty: None,
                tags: res.tags.clone(),
                description: format!(
                    "{} resource addressing errors: {}",
                    res.kind.as_str(),
                    res.error_types.join(", ")
                ),
                resources: vec![res.url.clone()],
            });
        }

        steps
    }
}
