//! Configuration file support for learnpath.
//!
//! Loads settings from `~/.learnpath/config.toml` (or `LEARNPATH_CONFIG`)
//! with the following precedence:
//! CLI arguments > Environment variables > Config file > Defaults
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.learnpath/config.toml
//!
//! [plan]
//! challenge_limit = 5
//! history_limit = 200
//! # Collaborative booster timeout in milliseconds
//! booster_timeout = 2000
//!
//! [weights]
//! focus_category = 0.35
//! focus_tag = 0.15
//!
//! [audit]
//! enabled = true
//! db_path = "/var/lib/learnpath/audit.db"
//! ```
//!
//! `[weights]` may also be nested as `[plan.weights]`; the top-level table
//! wins when both are present.

use crate::env::{
    config_path, default_audit_db, env_audit_db, env_booster_timeout, env_disable_audit,
    env_history_limit,
};
use learnpath_engine::{PlanConfig, ScoringWeights};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub plan: PlanConfig,
    /// Top-level `[weights]` table; replaces `plan.weights` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<ScoringWeights>,
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Where recommendation log entries go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    pub db_path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: None,
        }
    }
}

impl Config {
    /// Plan settings with the `[weights]` table folded in.
    pub fn plan_config(&self) -> PlanConfig {
        let mut plan = self.plan.clone();
        if let Some(weights) = &self.weights {
            plan.weights = weights.clone();
        }
        plan
    }

    /// Apply `LEARNPATH_*` environment overrides on top of the file values.
    pub fn apply_env(&mut self) {
        if let Some(limit) = env_history_limit() {
            self.plan.history_limit = limit;
        }
        if let Some(timeout) = env_booster_timeout() {
            self.plan.booster_timeout = timeout;
        }
        if let Some(path) = env_audit_db() {
            self.audit.db_path = Some(path);
        }
        if env_disable_audit() {
            self.audit.enabled = false;
        }
    }

    /// Effective audit database path, or `None` when auditing is off.
    pub fn audit_db_path(&self) -> Option<PathBuf> {
        if !self.audit.enabled {
            return None;
        }
        self.audit.db_path.clone().or_else(default_audit_db)
    }
}

/// Parses the config file at `path`.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_config_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        target: "learnpath::config",
        path = %path.display(),
        "Loaded configuration file"
    );

    Ok(Some(config))
}

/// Loads the configuration file if it exists.
pub fn load_config() -> Result<Option<Config>, ConfigError> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    load_config_from(&path)
}

/// File values (or defaults) with environment overrides applied.
pub fn effective_config() -> Result<Config, ConfigError> {
    let mut config = load_config()?.unwrap_or_default();
    config.apply_env();
    Ok(config)
}
