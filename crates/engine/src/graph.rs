//! Knowledge-graph annotation.
//!
//! The graph comes from an external builder. Annotation only touches node
//! flags, colors and sizes; the node and edge sets pass through unchanged.

use crate::profile::UserProfile;
use crate::recommend::Recommendation;
use crate::types::TrainingItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

pub const RECOMMENDED_COLOR: &str = "#F97316";
pub const FOCUS_CATEGORY_COLOR: &str = "#6366F1";
pub const FOCUS_TAG_COLOR: &str = "#0EA5E9";

const RECOMMENDED_GROWTH: f64 = 6.0;
const FOCUS_CATEGORY_GROWTH: f64 = 4.0;
const FOCUS_TAG_GROWTH: f64 = 3.0;

const DEFAULT_NODE_SIZE: f64 = 10.0;
const DEFAULT_CATEGORY_SIZE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    TrainingData,
    Challenge,
    Category,
    Tag,
    Concept,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Category,
    Tag,
    Similar,
    Related,
    ErrorRelated,
    LearningPath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Builder-specific payload. `_id` and `tag` are read during annotation.
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_recommended: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_focus_category: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_focus_tag: bool,
}

impl GraphNode {
    fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    fn highlight(&mut self, color: &str, default_size: f64, growth: f64) {
        self.color = Some(color.to_string());
        self.size = Some(self.size.unwrap_or(default_size) + growth);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default, alias = "links")]
    pub edges: Vec<GraphLink>,
}

/// Flag and enlarge nodes that match the learner's recommendations and focus.
///
/// - training-data nodes whose `data._id` is a recommended drill
/// - category nodes with id `cat_<FocusCategory>`
/// - tag nodes whose `data.tag` (case-insensitive) is a focus tag
pub fn annotate(
    mut graph: KnowledgeGraph,
    profile: &UserProfile,
    training: &[Recommendation<TrainingItem>],
) -> KnowledgeGraph {
    let recommended: HashSet<&str> = training.iter().map(|r| r.id.as_str()).collect();
    let focus_category_ids: HashSet<String> = profile
        .focus_categories
        .iter()
        .map(|c| format!("cat_{c}"))
        .collect();

    let mut touched = 0usize;
    for node in &mut graph.nodes {
        match node.kind {
            NodeKind::TrainingData => {
                if node.data_str("_id").is_some_and(|id| recommended.contains(id)) {
                    node.is_recommended = true;
                    node.highlight(RECOMMENDED_COLOR, DEFAULT_NODE_SIZE, RECOMMENDED_GROWTH);
                    touched += 1;
                }
            }
            NodeKind::Category => {
                if focus_category_ids.contains(&node.id) {
                    node.is_focus_category = true;
                    node.highlight(
                        FOCUS_CATEGORY_COLOR,
                        DEFAULT_CATEGORY_SIZE,
                        FOCUS_CATEGORY_GROWTH,
                    );
                    touched += 1;
                }
            }
            NodeKind::Tag => {
                if node.data_str("tag").is_some_and(|t| profile.is_focus_tag(t)) {
                    node.is_focus_tag = true;
                    node.highlight(FOCUS_TAG_COLOR, DEFAULT_NODE_SIZE, FOCUS_TAG_GROWTH);
                    touched += 1;
                }
            }
            _ => {}
        }
    }

    debug!(
        target: "learnpath::plan",
        nodes = graph.nodes.len(),
        annotated = touched,
        "Annotated knowledge graph"
    );
    graph
}
