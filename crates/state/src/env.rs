use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// Directory holding the config file and the default audit database.
pub fn state_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".learnpath"))
}

/// Returns the path to the config file.
///
/// `LEARNPATH_CONFIG` wins over `~/.learnpath/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(custom) = std::env::var("LEARNPATH_CONFIG") {
        return Some(PathBuf::from(custom));
    }
    state_dir().ok().map(|d| d.join("config.toml"))
}

/// Audit database path from `LEARNPATH_AUDIT_DB`, if set.
pub fn env_audit_db() -> Option<PathBuf> {
    std::env::var("LEARNPATH_AUDIT_DB").ok().map(PathBuf::from)
}

/// Default audit database location (`~/.learnpath/audit.db`).
pub fn default_audit_db() -> Option<PathBuf> {
    state_dir().ok().map(|d| d.join("audit.db"))
}

/// Checks if `LEARNPATH_DISABLE_AUDIT` environment variable is set to true.
pub fn env_disable_audit() -> bool {
    std::env::var("LEARNPATH_DISABLE_AUDIT")
        .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Returns the submission history limit from `LEARNPATH_HISTORY_LIMIT`.
pub fn env_history_limit() -> Option<usize> {
    std::env::var("LEARNPATH_HISTORY_LIMIT")
        .ok()
        .and_then(|s| s.parse().ok())
}

/// Returns the collaborative booster timeout from `LEARNPATH_BOOSTER_TIMEOUT_MS`.
pub fn env_booster_timeout() -> Option<Duration> {
    std::env::var("LEARNPATH_BOOSTER_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnpath_test_utils::{env_guard, set_env_var};

    #[test]
    fn test_config_path_prefers_env_override() {
        let _g = env_guard();
        let _cfg = set_env_var("LEARNPATH_CONFIG", Some("/tmp/custom.toml"));
        assert_eq!(config_path(), Some(PathBuf::from("/tmp/custom.toml")));
    }

    #[test]
    fn test_config_path_defaults_under_home() {
        let _g = env_guard();
        let _cfg = set_env_var("LEARNPATH_CONFIG", None);
        let _home = set_env_var("HOME", Some("/home/learner"));
        assert_eq!(
            config_path(),
            Some(PathBuf::from("/home/learner/.learnpath/config.toml"))
        );
        assert_eq!(
            default_audit_db(),
            Some(PathBuf::from("/home/learner/.learnpath/audit.db"))
        );
    }

    #[test]
    fn test_disable_audit_accepts_one_and_true() {
        let _g = env_guard();
        for (value, expected) in [("1", true), ("TRUE", true), ("0", false), ("yes", false)] {
            let _v = set_env_var("LEARNPATH_DISABLE_AUDIT", Some(value));
            assert_eq!(env_disable_audit(), expected, "value {value}");
        }
        let _v = set_env_var("LEARNPATH_DISABLE_AUDIT", None);
        assert!(!env_disable_audit());
    }

    #[test]
    fn test_numeric_overrides_ignore_garbage() {
        let _g = env_guard();
        let _h = set_env_var("LEARNPATH_HISTORY_LIMIT", Some("lots"));
        let _t = set_env_var("LEARNPATH_BOOSTER_TIMEOUT_MS", Some("750"));
        assert_eq!(env_history_limit(), None);
        assert_eq!(env_booster_timeout(), Some(Duration::from_millis(750)));
    }
}
