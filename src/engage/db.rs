//! SQLite-backed key-value store for engagement state
//!
//! Manages the `~/.khata/engage.db` database with automatic schema migration.
//! Every record group is one JSON document under a fixed key.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Persisted record keys
pub mod keys {
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const DAILY_CHALLENGES: &str = "daily_challenges";
    pub const DAILY_CHALLENGES_DATE: &str = "daily_challenges_date";
    pub const LOGIN_STREAK: &str = "login_streak";
    pub const BONUS_POINTS: &str = "bonus_points";
    pub const LAST_METRICS: &str = "last_metrics";

    pub const ALL: &[&str] = &[
        ACHIEVEMENTS,
        DAILY_CHALLENGES,
        DAILY_CHALLENGES_DATE,
        LOGIN_STREAK,
        BONUS_POINTS,
        LAST_METRICS,
    ];
}

/// How long a writer waits for another process to release the database
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database wrapper with a single shared connection
#[derive(Clone)]
pub struct EngageDb {
    conn: Arc<Mutex<Connection>>,
}

impl EngageDb {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open engagement db: {}", path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Lock the connection. The guard is the single-writer token.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("Engagement DB lock poisoned")
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()
    }

    /// Run any pending migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: track when each key was last written
        if version < 2 {
            let has_updated_at: bool = conn
                .prepare("SELECT COUNT(*) FROM pragma_table_info('kv') WHERE name = 'updated_at'")
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if !has_updated_at {
                conn.execute_batch("ALTER TABLE kv ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0;")?;
            }
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }

    /// Run `f` inside one transaction while holding the connection lock.
    ///
    /// All read-modify-write cycles go through here, so two operations can
    /// never interleave their reads and writes.
    pub fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run `f` against a consistent read view
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn();
        f(&conn)
    }

    /// Delete every engagement record
    pub fn reset(&self) -> Result<()> {
        self.write(|tx| {
            for key in keys::ALL {
                tx.execute("DELETE FROM kv WHERE key = ?1", [key])?;
            }
            Ok(())
        })
    }
}

/// Read and decode the JSON document under `key`.
///
/// A missing key yields `None`. A document that fails to decode is logged
/// and also treated as missing, so callers re-seed defaults.
pub fn get_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |r| r.get(0))
        .optional()
        .with_context(|| format!("Failed to read key '{}'", key))?;

    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "Corrupt engagement record, re-seeding");
            Ok(None)
        }
    }
}

/// Encode `value` as JSON and store it under `key`
pub fn put_json<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize key '{}'", key))?;
    conn.execute(
        r#"INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3"#,
        rusqlite::params![key, raw, Utc::now().timestamp_millis()],
    )
    .with_context(|| format!("Failed to write key '{}'", key))?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
INSERT OR IGNORE INTO schema_version VALUES (1);

CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_json_roundtrip_and_missing_key() {
        let db = EngageDb::open_in_memory().unwrap();
        db.write(|tx| put_json(tx, keys::BONUS_POINTS, &42u32)).unwrap();

        let value: Option<u32> = db.read(|c| get_json(c, keys::BONUS_POINTS)).unwrap();
        assert_eq!(value, Some(42));
        let missing: Option<u32> = db.read(|c| get_json(c, keys::LOGIN_STREAK)).unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_corrupt_value_reads_as_missing() {
        let db = EngageDb::open_in_memory().unwrap();
        db.write(|tx| {
            tx.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, 0)",
                [keys::ACHIEVEMENTS, "{not json"],
            )?;
            Ok(())
        })
        .unwrap();

        let value: Option<Vec<String>> = db.read(|c| get_json(c, keys::ACHIEVEMENTS)).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let db = EngageDb::open_in_memory().unwrap();
        let result: Result<()> = db.write(|tx| {
            put_json(tx, keys::BONUS_POINTS, &7u32)?;
            anyhow::bail!("boom")
        });
        assert!(result.is_err());
        let value: Option<u32> = db.read(|c| get_json(c, keys::BONUS_POINTS)).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_second_handle_waits_for_writer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engage.db");
        let first = EngageDb::open(&path).unwrap();
        let second = EngageDb::open(&path).unwrap();

        let timeout: i64 = second
            .read(|c| Ok(c.query_row("PRAGMA busy_timeout", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(timeout, 5000);

        std::thread::scope(|s| {
            let holder = s.spawn(|| {
                first
                    .write(|tx| {
                        put_json(tx, keys::BONUS_POINTS, &1u32)?;
                        std::thread::sleep(Duration::from_millis(300));
                        Ok(())
                    })
                    .unwrap();
            });
            std::thread::sleep(Duration::from_millis(50));
            second
                .write(|tx| put_json(tx, keys::LAST_METRICS, &"{}"))
                .unwrap();
            holder.join().unwrap();
        });

        let bonus: Option<u32> = second.read(|c| get_json(c, keys::BONUS_POINTS)).unwrap();
        assert_eq!(bonus, Some(1));
    }

    #[test]
    fn test_reopen_persists_and_reset_clears() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("engage.db");
        {
            let db = EngageDb::open(&path).unwrap();
            db.write(|tx| put_json(tx, keys::BONUS_POINTS, &5u32)).unwrap();
        }
        let db = EngageDb::open(&path).unwrap();
        let value: Option<u32> = db.read(|c| get_json(c, keys::BONUS_POINTS)).unwrap();
        assert_eq!(value, Some(5));

        db.reset().unwrap();
        let value: Option<u32> = db.read(|c| get_json(c, keys::BONUS_POINTS)).unwrap();
        assert_eq!(value, None);
    }
}
