//! Manages learnpath configuration and persisted state.
//!
//! This crate provides utilities for:
//! - Reading `LEARNPATH_*` environment variables.
//! - Loading `~/.learnpath/config.toml` into engine settings.
//! - Persisting recommendation audit entries to SQLite.

pub mod config;
pub mod env;
pub mod persistence;

pub use config::{effective_config, load_config, load_config_from, AuditConfig, Config, ConfigError};
pub use env::{config_path, default_audit_db, env_disable_audit, home_dir, state_dir};
pub use persistence::{AuditSummary, SqliteAuditLog};
