//! Error types for the plan pipeline.

use std::time::Duration;

/// Failure of a primary collaborator. No partial plan is produced.
#[derive(thiserror::Error, Debug)]
pub enum PlanError {
    #[error("submission store failed: {0}")]
    Submissions(#[source] anyhow::Error),
    #[error("challenge store failed: {0}")]
    Challenges(#[source] anyhow::Error),
    #[error("training store failed: {0}")]
    Training(#[source] anyhow::Error),
    #[error("language preference store failed: {0}")]
    Preferences(#[source] anyhow::Error),
    #[error("knowledge graph builder failed: {0}")]
    Graph(#[source] anyhow::Error),
    #[error("challenge not found: {0}")]
    UnknownChallenge(String),
}

/// Outcome of a best-effort step that did not produce a result.
///
/// Callers keep their unmodified input when they see this; it is logged,
/// never surfaced to the requester.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Ignored {
    #[error("step failed: {0}")]
    Failed(String),
    #[error("step timed out after {0:?}")]
    TimedOut(Duration),
}

impl Ignored {
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_error_display_includes_source() {
        let err = PlanError::Submissions(anyhow::anyhow!("connection reset"));
        assert_eq!(err.to_string(), "submission store failed: connection reset");
    }

    #[test]
    fn test_ignored_display() {
        assert_eq!(Ignored::failed("boom").to_string(), "step failed: boom");
        assert_eq!(
            Ignored::TimedOut(Duration::from_millis(5)).to_string(),
            "step timed out after 5ms"
        );
    }
}
