//! Domain types shared across engine modules.
//!
//! Submission, challenge, drill and resource records are produced by external
//! stores and are read-only here. Everything derived from them (profiles,
//! recommendations, paths) lives in its own module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Success ratio clamped to [0.0, 1.0].
///
/// Successes are always a subset of attempts, so the clamp never fires on
/// well-formed history; it still guards hand-built stats.
///
/// # Examples
///
/// ```
/// use learnpath_engine::Proficiency;
///
/// assert_eq!(Proficiency::from_counts(3, 4).value(), 0.75);
/// assert_eq!(Proficiency::from_counts(0, 0).value(), 0.0);
/// assert_eq!(Proficiency::new(1.5).value(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proficiency(f64);

impl Proficiency {
    /// Create a new proficiency, clamping the value to [0.0, 1.0].
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Ratio of successes to attempts. Zero attempts yields zero.
    #[must_use]
    pub fn from_counts(successes: u32, attempts: u32) -> Self {
        if attempts == 0 {
            return Self(0.0);
        }
        Self::new(f64::from(successes) / f64::from(attempts))
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn zero() -> Self {
        Self(0.0)
    }
}

impl Default for Proficiency {
    fn default() -> Self {
        Self(0.0)
    }
}

impl From<Proficiency> for f64 {
    fn from(p: Proficiency) -> Self {
        p.0
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Challenge category. Declaration order is the tie-break order used when
/// ranking weaknesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Syntax,
    Logic,
    Performance,
    Security,
}

impl Category {
    /// All categories in their fixed order.
    pub const ALL: [Category; 4] = [
        Category::Syntax,
        Category::Logic,
        Category::Performance,
        Category::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "Syntax",
            Self::Logic => "Logic",
            Self::Performance => "Performance",
            Self::Security => "Security",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Challenge difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Position on the unit difficulty scale (Easy=0, Medium=0.5, Hard=1).
    pub fn value(&self) -> f64 {
        match self {
            Self::Easy => 0.0,
            Self::Medium => 0.5,
            Self::Hard => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learner experience tier, derived from the accepted-submission count.
///
/// Also used as the difficulty tier of external learning resources.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    /// `< 5` accepted is beginner, `< 15` intermediate, otherwise advanced.
    pub fn from_accepted(accepted: u32) -> Self {
        if accepted < 5 {
            Self::Beginner
        } else if accepted < 15 {
            Self::Intermediate
        } else {
            Self::Advanced
        }
    }

    /// Target point on the unit difficulty scale.
    pub fn target_difficulty(&self) -> f64 {
        match self {
            Self::Beginner => 0.2,
            Self::Intermediate => 0.5,
            Self::Advanced => 0.8,
        }
    }

    /// Ordinal rank used for resource difficulty distance.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Judge verdict for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Accepted,
    Rejected,
}

/// Error returned when an upstream error-analysis record has the wrong shape.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("error analysis is not an object")]
    NotAnObject,
    #[error("error analysis has no usable errorType")]
    MissingErrorType,
    #[error("errorMessage must be a string")]
    InvalidMessage,
}

/// One structured error detected by the upstream analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAnnotation {
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ErrorAnnotation {
    /// Validate a raw analyzer record.
    ///
    /// The analyzer emits loosely shaped JSON; only `errorType` (non-empty
    /// string) and an optional string `errorMessage` are kept. Extra fields
    /// are ignored.
    pub fn from_value(value: &Value) -> Result<Self, AnnotationError> {
        let obj = value.as_object().ok_or(AnnotationError::NotAnObject)?;
        let error_type = obj
            .get("errorType")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AnnotationError::MissingErrorType)?;
        let error_message = match obj.get("errorMessage") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(AnnotationError::InvalidMessage),
        };
        Ok(Self {
            error_type: error_type.to_string(),
            error_message,
        })
    }
}

/// Anything with a stable string identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Challenge metadata as exposed by the challenge store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeMeta {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identified for ChallengeMeta {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A learner submission joined with the challenge it targeted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    pub user_id: String,
    /// `None` when the referenced challenge no longer exists.
    pub challenge: Option<ChallengeMeta>,
    pub outcome: Outcome,
    /// Raw analyzer output; validated with [`ErrorAnnotation::from_value`].
    #[serde(default)]
    pub error_analyses: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }

    /// Valid annotations; malformed records are logged and skipped.
    pub fn annotations(&self) -> Vec<ErrorAnnotation> {
        self.error_analyses
            .iter()
            .filter_map(|raw| match ErrorAnnotation::from_value(raw) {
                Ok(annotation) => Some(annotation),
                Err(e) => {
                    tracing::debug!(
                        target: "learnpath::profile",
                        submission = %self.id,
                        error = %e,
                        "Skipping malformed error analysis"
                    );
                    None
                }
            })
            .collect()
    }
}

/// A drill exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingItem {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Missing priority counts as 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

impl TrainingItem {
    pub fn priority_or_default(&self) -> f64 {
        self.priority.unwrap_or(1.0)
    }
}

impl Identified for TrainingItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Kind of external learning resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Article,
    Video,
    Exercise,
    Doc,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Video => "video",
            Self::Exercise => "exercise",
            Self::Doc => "doc",
        }
    }
}

/// An external learning resource from the catalog.
///
/// Language, error types and tags are stored lower-cased by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub error_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<ExperienceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

impl LearningResource {
    /// Quality score, treating a missing or zero score as 1.
    pub fn quality_or_default(&self) -> f64 {
        match self.quality_score {
            Some(q) if q != 0.0 => q,
            _ => 1.0,
        }
    }
}

impl Identified for LearningResource {
    fn id(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_proficiency_clamps() {
        assert_eq!(Proficiency::new(1.5).value(), 1.0);
        assert_eq!(Proficiency::new(-0.5).value(), 0.0);
        assert_eq!(Proficiency::new(f64::NAN).value(), 0.0);
        assert_eq!(Proficiency::new(0.75).value(), 0.75);
    }

    #[test]
    fn test_proficiency_from_counts() {
        assert_eq!(Proficiency::from_counts(1, 2).value(), 0.5);
        assert_eq!(Proficiency::from_counts(0, 0).value(), 0.0);
        assert_eq!(Proficiency::from_counts(5, 3).value(), 1.0);
    }

    #[test]
    fn test_proficiency_display() {
        assert_eq!(format!("{}", Proficiency::new(0.756)), "0.76");
    }

    #[test]
    fn test_experience_thresholds() {
        assert_eq!(ExperienceLevel::from_accepted(0), ExperienceLevel::Beginner);
        assert_eq!(ExperienceLevel::from_accepted(4), ExperienceLevel::Beginner);
        assert_eq!(ExperienceLevel::from_accepted(5), ExperienceLevel::Intermediate);
        assert_eq!(ExperienceLevel::from_accepted(14), ExperienceLevel::Intermediate);
        assert_eq!(ExperienceLevel::from_accepted(15), ExperienceLevel::Advanced);
    }

    #[test]
    fn test_difficulty_scale() {
        assert_eq!(Difficulty::Easy.value(), 0.0);
        assert_eq!(Difficulty::Medium.value(), 0.5);
        assert_eq!(Difficulty::Hard.value(), 1.0);
        assert_eq!(ExperienceLevel::Beginner.target_difficulty(), 0.2);
        assert_eq!(ExperienceLevel::Intermediate.target_difficulty(), 0.5);
        assert_eq!(ExperienceLevel::Advanced.target_difficulty(), 0.8);
    }

    #[test]
    fn test_annotation_accepts_minimal_record() {
        let a = ErrorAnnotation::from_value(&json!({"errorType": "syntax"})).unwrap();
        assert_eq!(a.error_type, "syntax");
        assert!(a.error_message.is_none());
    }

    #[test]
    fn test_annotation_keeps_message_and_ignores_extras() {
        let a = ErrorAnnotation::from_value(&json!({
            "errorType": "runtime",
            "errorMessage": "index out of range",
            "lineNumber": 12
        }))
        .unwrap();
        assert_eq!(a.error_message.as_deref(), Some("index out of range"));
    }

    #[test]
    fn test_annotation_rejects_bad_shapes() {
        assert_eq!(
            ErrorAnnotation::from_value(&json!("syntax")),
            Err(AnnotationError::NotAnObject)
        );
        assert_eq!(
            ErrorAnnotation::from_value(&json!({"errorType": "  "})),
            Err(AnnotationError::MissingErrorType)
        );
        assert_eq!(
            ErrorAnnotation::from_value(&json!({"errorType": "x", "errorMessage": 3})),
            Err(AnnotationError::InvalidMessage)
        );
    }

    #[test]
    fn test_category_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Category::Logic).unwrap(), "\"Logic\"");
        assert_eq!(
            serde_json::to_string(&ExperienceLevel::Advanced).unwrap(),
            "\"advanced\""
        );
    }

    #[test]
    fn test_resource_quality_default() {
        let mut r = LearningResource {
            title: "t".into(),
            url: "u".into(),
            kind: ResourceKind::Article,
            language: None,
            error_types: vec![],
            tags: vec![],
            category: None,
            difficulty: None,
            quality_score: None,
        };
        assert_eq!(r.quality_or_default(), 1.0);
        r.quality_score = Some(0.0);
        assert_eq!(r.quality_or_default(), 1.0);
        r.quality_score = Some(4.5);
        assert_eq!(r.quality_or_default(), 4.5);
    }
}
