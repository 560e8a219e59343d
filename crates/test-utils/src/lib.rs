//! Shared test utilities for learnpath crates.
//!
//! Env-var guards for tests that touch process state, and a temporary HOME
//! with writers for the config and dataset files the CLI reads.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Every variable the state crate reads.
pub const LEARNPATH_ENV_VARS: [&str; 5] = [
    "LEARNPATH_CONFIG",
    "LEARNPATH_AUDIT_DB",
    "LEARNPATH_DISABLE_AUDIT",
    "LEARNPATH_HISTORY_LIMIT",
    "LEARNPATH_BOOSTER_TIMEOUT_MS",
];

/// Process-wide lock for tests that mutate environment variables.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Restores one environment variable to its prior state on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<OsString>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => std::env::set_var(self.key, value),
            None => std::env::remove_var(self.key),
        }
    }
}

/// Set (`Some`) or unset (`None`) `key` until the returned guard drops.
///
/// # Example
/// ```
/// let _guard = learnpath_test_utils::set_env_var("LEARNPATH_HISTORY_LIMIT", Some("10"));
/// assert_eq!(std::env::var("LEARNPATH_HISTORY_LIMIT").as_deref(), Ok("10"));
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var_os(key);
    match value {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
    EnvVarGuard { key, previous }
}

/// Unset every `LEARNPATH_*` override for the lifetime of the guards.
pub fn clear_learnpath_env() -> Vec<EnvVarGuard> {
    LEARNPATH_ENV_VARS
        .iter()
        .map(|&key| set_env_var(key, None))
        .collect()
}

/// Temporary HOME with an empty `~/.learnpath` directory.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// `~/.learnpath` inside the temp HOME.
    pub state_dir: PathBuf,
}

impl TestFixture {
    /// Creates the directories only; HOME is left alone until
    /// [`TestFixture::home_guard`] is called.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let state_dir = tempdir.path().join(".learnpath");
        std::fs::create_dir_all(&state_dir)?;
        Ok(Self { tempdir, state_dir })
    }

    pub fn home_path(&self) -> &Path {
        self.tempdir.path()
    }

    /// Point HOME at the temp directory until the guard drops.
    pub fn home_guard(&self) -> EnvVarGuard {
        let home = self.home_path().to_string_lossy().into_owned();
        set_env_var("HOME", Some(&home))
    }

    /// Write `~/.learnpath/config.toml`.
    pub fn write_config(&self, toml: &str) -> std::io::Result<PathBuf> {
        let path = self.state_dir.join("config.toml");
        std::fs::write(&path, toml)?;
        Ok(path)
    }

    /// Write a dataset file at the HOME root.
    pub fn write_dataset(&self, name: &str, json: &str) -> std::io::Result<PathBuf> {
        let path = self.home_path().join(name);
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// Default audit database location for this HOME.
    pub fn audit_db(&self) -> PathBuf {
        self.state_dir.join("audit.db")
    }
}
