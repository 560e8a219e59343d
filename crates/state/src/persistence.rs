//! SQLite-backed recommendation audit log.
//!
//! The engine only appends. Reading entries back is for offline inspection
//! (`learnpath audit`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use learnpath_engine::{AuditSink, RecommendationLogEntry};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS recommendation_log (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    challenge_id TEXT,
    suggested_challenge_ids TEXT NOT NULL,
    suggested_training_ids TEXT NOT NULL,
    suggested_resource_urls TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_recommendation_log_user ON recommendation_log(user_id);
CREATE INDEX IF NOT EXISTS idx_recommendation_log_created ON recommendation_log(created_at);
";

/// Append-only audit sink writing one row per plan or related request.
#[derive(Clone)]
pub struct SqliteAuditLog {
    conn: Arc<Mutex<Connection>>,
}

/// Aggregate view over the audit log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub entries: u64,
    pub users: u64,
    pub last_entry_at: Option<DateTime<Utc>>,
    /// Most frequently suggested challenges, most frequent first.
    pub top_challenges: Vec<(String, u32)>,
}

/// Raw row before the JSON and timestamp columns are decoded.
struct LogRow {
    id: String,
    user_id: String,
    challenge_id: Option<String>,
    challenges: String,
    training: String,
    resources: String,
    created_at: String,
}

impl LogRow {
    fn decode(self) -> Result<RecommendationLogEntry> {
        Ok(RecommendationLogEntry {
            id: Uuid::parse_str(&self.id).with_context(|| format!("bad entry id {}", self.id))?,
            user_id: self.user_id,
            challenge_id: self.challenge_id,
            suggested_challenge_ids: serde_json::from_str(&self.challenges)?,
            suggested_training_ids: serde_json::from_str(&self.training)?,
            suggested_resource_urls: serde_json::from_str(&self.resources)?,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)
                .with_context(|| format!("bad timestamp {}", self.created_at))?
                .with_timezone(&Utc),
        })
    }
}

impl SqliteAuditLog {
    /// Open or create the audit database at `path`, creating parent
    /// directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening audit log {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn insert(conn: &Connection, entry: &RecommendationLogEntry) -> Result<()> {
        conn.execute(
            "INSERT INTO recommendation_log
                (id, user_id, challenge_id, suggested_challenge_ids,
                 suggested_training_ids, suggested_resource_urls, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id.to_string(),
                entry.user_id,
                entry.challenge_id,
                serde_json::to_string(&entry.suggested_challenge_ids)?,
                serde_json::to_string(&entry.suggested_training_ids)?,
                serde_json::to_string(&entry.suggested_resource_urls)?,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Number of entries, optionally for one learner.
    pub fn count(&self, user_id: Option<&str>) -> Result<u64> {
        let conn = self.conn.lock();
        let n: i64 = match user_id {
            Some(user) => conn.query_row(
                "SELECT COUNT(*) FROM recommendation_log WHERE user_id = ?1",
                [user],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM recommendation_log", [], |row| {
                row.get(0)
            })?,
        };
        Ok(n.max(0) as u64)
    }

    /// Newest entries first.
    pub fn recent(&self, limit: usize, user_id: Option<&str>) -> Result<Vec<RecommendationLogEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, challenge_id, suggested_challenge_ids,
                    suggested_training_ids, suggested_resource_urls, created_at
             FROM recommendation_log
             WHERE (?1 IS NULL OR user_id = ?1)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok(LogRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                challenge_id: row.get(2)?,
                challenges: row.get(3)?,
                training: row.get(4)?,
                resources: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.decode()?);
        }
        Ok(entries)
    }

    /// Counts, distinct learners, and the `top` most suggested challenges.
    pub fn summary(&self, user_id: Option<&str>, top: usize) -> Result<AuditSummary> {
        let entries = self.count(user_id)?;
        let (users, last_entry_at, suggested) = {
            let conn = self.conn.lock();
            let users: i64 = conn.query_row(
                "SELECT COUNT(DISTINCT user_id) FROM recommendation_log
                 WHERE (?1 IS NULL OR user_id = ?1)",
                params![user_id],
                |row| row.get(0),
            )?;
            let last: Option<String> = conn
                .query_row(
                    "SELECT created_at FROM recommendation_log
                     WHERE (?1 IS NULL OR user_id = ?1)
                     ORDER BY created_at DESC LIMIT 1",
                    params![user_id],
                    |row| row.get(0),
                )
                .optional()?;
            let mut stmt = conn.prepare(
                "SELECT suggested_challenge_ids FROM recommendation_log
                 WHERE (?1 IS NULL OR user_id = ?1)
                 ORDER BY rowid",
            )?;
            let lists = stmt
                .query_map(params![user_id], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            (users, last, lists)
        };

        let mut counts: IndexMap<String, u32> = IndexMap::new();
        for list in suggested {
            let ids: Vec<String> = serde_json::from_str(&list)?;
            for id in ids {
                *counts.entry(id).or_default() += 1;
            }
        }
        let mut top_challenges: Vec<(String, u32)> = counts.into_iter().collect();
        top_challenges.sort_by(|a, b| b.1.cmp(&a.1));
        top_challenges.truncate(top);

        let last_entry_at = last_entry_at
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
            .transpose()?;

        Ok(AuditSummary {
            entries,
            users: users.max(0) as u64,
            last_entry_at,
            top_challenges,
        })
    }
}

#[async_trait]
impl AuditSink for SqliteAuditLog {
    async fn append(&self, entry: RecommendationLogEntry) -> Result<()> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || Self::insert(&conn.lock(), &entry))
            .await
            .context("audit writer task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[tokio::test]
    async fn test_append_then_recent_newest_first() {
        let log = SqliteAuditLog::open_in_memory().unwrap();
        let first = RecommendationLogEntry::new("u1", at(0)).with_challenges(["c1"]);
        let second = RecommendationLogEntry::new("u1", at(5))
            .with_challenge("c9")
            .with_challenges(["c2", "c1"])
            .with_training(["t1"])
            .with_resources(["https://guides/a"]);
        log.append(first.clone()).await.unwrap();
        log.append(second.clone()).await.unwrap();

        let entries = log.recent(10, None).unwrap();
        assert_eq!(entries, vec![second, first]);
    }

    #[tokio::test]
    async fn test_count_and_filter_by_user() {
        let log = SqliteAuditLog::open_in_memory().unwrap();
        log.append(RecommendationLogEntry::new("u1", at(0))).await.unwrap();
        log.append(RecommendationLogEntry::new("u2", at(1))).await.unwrap();
        log.append(RecommendationLogEntry::new("u2", at(2))).await.unwrap();

        assert_eq!(log.count(None).unwrap(), 3);
        assert_eq!(log.count(Some("u2")).unwrap(), 2);
        assert_eq!(log.recent(1, Some("u1")).unwrap().len(), 1);
        assert!(log.recent(5, Some("nobody")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_ranks_suggested_challenges() {
        let log = SqliteAuditLog::open_in_memory().unwrap();
        log.append(RecommendationLogEntry::new("u1", at(0)).with_challenges(["c1", "c2"]))
            .await
            .unwrap();
        log.append(RecommendationLogEntry::new("u2", at(3)).with_challenges(["c2"]))
            .await
            .unwrap();

        let summary = log.summary(None, 1).unwrap();
        assert_eq!(summary.entries, 2);
        assert_eq!(summary.users, 2);
        assert_eq!(summary.last_entry_at, Some(at(3)));
        assert_eq!(summary.top_challenges, vec![("c2".to_string(), 2)]);
    }

    #[test]
    fn test_summary_of_empty_log() {
        let log = SqliteAuditLog::open_in_memory().unwrap();
        assert_eq!(log.summary(None, 5).unwrap(), AuditSummary::default());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_an_error() {
        let log = SqliteAuditLog::open_in_memory().unwrap();
        let entry = RecommendationLogEntry::new("u1", at(0));
        log.append(entry.clone()).await.unwrap();
        assert!(log.append(entry).await.is_err());
    }
}
