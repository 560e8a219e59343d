//! CLI handlers. Each builds a fresh engine over the dataset file.

use crate::cli::{LearnerArgs, OutputFormat};
use crate::render;
use anyhow::{Context, Result};
use learnpath_engine::{
    load_profile, AuditSink, Collaborators, Dataset, DiscardAudit, MemStore, PlanEngine,
};
use learnpath_state::{default_audit_db, load_config, load_config_from, Config, SqliteAuditLog};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// File (or defaults) with `LEARNPATH_*` overrides applied. An explicit
/// `--config` path wins over `LEARNPATH_CONFIG`.
fn resolve_config(config_file: Option<&Path>) -> Result<Config> {
    let loaded = match config_file {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let mut config = loaded.unwrap_or_default();
    config.apply_env();
    Ok(config)
}

pub(crate) fn load_dataset(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
    let dataset: Dataset = serde_json::from_str(&text)
        .with_context(|| format!("Invalid dataset: {}", path.display()))?;
    debug!(
        target: "learnpath::cli",
        path = %path.display(),
        challenges = dataset.challenges.len(),
        submissions = dataset.submissions.len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Audit sink for this run. Failing to open the database downgrades to
/// discarding entries; auditing never blocks a plan.
fn audit_sink(config: &Config, no_audit: bool) -> Arc<dyn AuditSink> {
    if no_audit {
        return Arc::new(DiscardAudit);
    }
    let Some(path) = config.audit_db_path() else {
        return Arc::new(DiscardAudit);
    };
    match SqliteAuditLog::open(&path) {
        Ok(log) => Arc::new(log),
        Err(e) => {
            warn!(
                target: "learnpath::audit",
                path = %path.display(),
                error = %e,
                "Audit log unavailable; entries will be dropped"
            );
            Arc::new(DiscardAudit)
        }
    }
}

fn build_engine(config: &Config, dataset: &Path, no_audit: bool) -> Result<PlanEngine> {
    let store = Arc::new(MemStore::from_dataset(load_dataset(dataset)?));
    let collab = Collaborators::from_mem(store).with_audit(audit_sink(config, no_audit));
    Ok(PlanEngine::new(collab, config.plan_config()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handle the `plan` command.
pub(crate) fn handle_plan_command(
    config_file: Option<&Path>,
    learner: &LearnerArgs,
    no_audit: bool,
    challenge_limit: Option<usize>,
    training_limit: Option<usize>,
) -> Result<()> {
    let mut config = resolve_config(config_file)?;
    if let Some(limit) = challenge_limit {
        config.plan.challenge_limit = limit;
    }
    if let Some(limit) = training_limit {
        config.plan.training_limit = limit;
    }
    let engine = build_engine(&config, &learner.dataset, no_audit)?;

    let rt = Runtime::new()?;
    let plan = rt.block_on(async {
        let plan = engine.build_plan(&learner.user).await;
        engine.flush().await;
        plan
    })?;

    if learner.format.is_json() {
        return print_json(&plan);
    }
    print!("{}", render::plan(&plan));
    Ok(())
}

/// Handle the `profile` command.
pub(crate) fn handle_profile_command(config_file: Option<&Path>, learner: &LearnerArgs) -> Result<()> {
    let config = resolve_config(config_file)?;
    let engine = build_engine(&config, &learner.dataset, true)?;

    let rt = Runtime::new()?;
    let profile = rt.block_on(load_profile(
        engine.collaborators(),
        engine.config(),
        &learner.user,
    ))?;

    if learner.format.is_json() {
        return print_json(&profile);
    }
    print!("{}", render::profile(&profile));
    Ok(())
}

/// Handle the `related` command.
pub(crate) fn handle_related_command(
    config_file: Option<&Path>,
    learner: &LearnerArgs,
    challenge: Option<&str>,
    no_audit: bool,
) -> Result<()> {
    let config = resolve_config(config_file)?;
    let engine = build_engine(&config, &learner.dataset, no_audit)?;

    let rt = Runtime::new()?;
    let related = rt.block_on(async {
        let related = engine.related(&learner.user, challenge).await;
        engine.flush().await;
        related
    })?;

    if learner.format.is_json() {
        return print_json(&related);
    }
    print!("{}", render::related(&related));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuditReport {
    path: PathBuf,
    summary: learnpath_state::AuditSummary,
    recent: Vec<learnpath_engine::RecommendationLogEntry>,
}

/// Handle the `audit` command.
pub(crate) fn handle_audit_command(
    config_file: Option<&Path>,
    limit: usize,
    user: Option<&str>,
    db: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let config = resolve_config(config_file)?;
    let path = db
        .or_else(|| config.audit.db_path.clone())
        .or_else(default_audit_db)
        .context("Cannot locate the audit log; pass --db")?;

    if !path.exists() {
        println!("No audit log at {}", path.display());
        return Ok(());
    }

    let log = SqliteAuditLog::open(&path)?;
    let report = AuditReport {
        summary: log.summary(user, 5)?,
        recent: log.recent(limit, user)?,
        path,
    };

    if format.is_json() {
        return print_json(&report);
    }
    print!(
        "{}",
        render::audit(&report.path, &report.summary, &report.recent)
    );
    Ok(())
}

/// Handle the `weights` command.
pub(crate) fn handle_weights_command(config_file: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_file)?;
    let weights = config.plan_config().weights;
    print!("{}", toml::to_string_pretty(&weights)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnpath_test_utils::TestFixture;

    #[test]
    fn test_load_dataset_reports_path_on_bad_json() {
        let fixture = TestFixture::new().unwrap();
        let path = fixture.write_dataset("broken.json", "{ not json").unwrap();
        let err = load_dataset(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn test_load_dataset_accepts_empty_object() {
        let fixture = TestFixture::new().unwrap();
        let path = fixture.write_dataset("empty.json", "{}").unwrap();
        assert_eq!(load_dataset(&path).unwrap(), Dataset::default());
    }

    #[test]
    fn test_explicit_config_file_is_used() {
        let fixture = TestFixture::new().unwrap();
        let path = fixture.write_config("[plan]\nchallenge_limit = 2\n").unwrap();
        let config = resolve_config(Some(&path)).unwrap();
        assert_eq!(config.plan.challenge_limit, 2);
    }

    #[test]
    fn test_missing_config_file_means_defaults() {
        let fixture = TestFixture::new().unwrap();
        let config = resolve_config(Some(&fixture.state_dir.join("absent.toml"))).unwrap();
        assert_eq!(config.plan.challenge_limit, 5);
    }
}
