use crate::error::{LoctrendError, Result};
use crate::model::{LanguageMetric, Snapshot, SCHEMA_VERSION};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Snapshots already measured, keyed by commit id and metrics tool.
pub struct Cache {
    conn: Connection,
}

impl Cache {
    pub fn new<CP: AsRef<Path>, RP: AsRef<Path>>(cache_path: Option<CP>, repo_path: RP) -> Result<Self> {
        let cache_dir = match cache_path {
            Some(path) => path.as_ref().to_path_buf(),
            None => repo_path.as_ref().join(".loctrend"),
        };
        std::fs::create_dir_all(&cache_dir)?;
        let conn = Connection::open(cache_dir.join("cache.db"))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let mut cache = Self { conn };
        cache.initialize()?;
        Ok(cache)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS snapshots (
                commit_id TEXT NOT NULL,
                tool TEXT NOT NULL,
                captured_at INTEGER NOT NULL,
                PRIMARY KEY (commit_id, tool)
            );
            CREATE TABLE IF NOT EXISTS languages (
                commit_id TEXT NOT NULL,
                tool TEXT NOT NULL,
                position INTEGER NOT NULL,
                language TEXT NOT NULL,
                code_lines INTEGER NOT NULL,
                comment_lines INTEGER NOT NULL,
                PRIMARY KEY (commit_id, tool, language),
                FOREIGN KEY (commit_id, tool) REFERENCES snapshots(commit_id, tool)
            );
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(LoctrendError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    pub fn get_snapshot(&self, commit_id: &str, tool: &str) -> Result<Option<Snapshot>> {
        let known = self
            .conn
            .query_row(
                "SELECT 1 FROM snapshots WHERE commit_id = ? AND tool = ?",
                params![commit_id, tool],
                |_| Ok(()),
            )
            .optional()?;
        if known.is_none() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT language, code_lines, comment_lines FROM languages
             WHERE commit_id = ? AND tool = ?
             ORDER BY position",
        )?;
        let rows = stmt.query_map(params![commit_id, tool], |row| {
            let language: String = row.get(0)?;
            let code: i64 = row.get(1)?;
            let comment: i64 = row.get(2)?;
            Ok((language, LanguageMetric::new(code as u64, comment as u64)))
        })?;

        let mut snapshot = Snapshot::new();
        for row in rows {
            let (language, metric) = row?;
            snapshot.insert(language, metric);
        }
        Ok(Some(snapshot))
    }

    pub fn store_snapshot(&mut self, commit_id: &str, tool: &str, snapshot: &Snapshot) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR REPLACE INTO snapshots (commit_id, tool, captured_at) VALUES (?, ?, ?)",
            params![commit_id, tool, Utc::now().timestamp()],
        )?;
        tx.execute(
            "DELETE FROM languages WHERE commit_id = ? AND tool = ?",
            params![commit_id, tool],
        )?;
        {
            let mut insert_language_stmt = tx.prepare(
                "INSERT INTO languages (commit_id, tool, position, language, code_lines, comment_lines)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for (position, (language, metric)) in snapshot.iter().enumerate() {
                insert_language_stmt.execute(params![
                    commit_id,
                    tool,
                    position as i64,
                    language,
                    metric.code_lines as i64,
                    metric.comment_lines as i64
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_language_order() {
        let mut cache = Cache::in_memory().unwrap();
        let snapshot = Snapshot::new().with("Zig", 3, 1).with("C", 10, 2).with("Ada", 0, 4);
        cache.store_snapshot("abc123", "scc", &snapshot).unwrap();

        assert_eq!(cache.get_snapshot("abc123", "scc").unwrap(), Some(snapshot));
        assert_eq!(cache.get_snapshot("abc123", "tokei").unwrap(), None);
        assert_eq!(cache.get_snapshot("def456", "scc").unwrap(), None);
    }

    #[test]
    fn empty_snapshot_is_still_a_hit() {
        let mut cache = Cache::in_memory().unwrap();
        cache.store_snapshot("abc123", "scc", &Snapshot::new()).unwrap();
        assert_eq!(cache.get_snapshot("abc123", "scc").unwrap(), Some(Snapshot::new()));
    }

    #[test]
    fn restoring_replaces_languages() {
        let mut cache = Cache::in_memory().unwrap();
        cache
            .store_snapshot("abc123", "scc", &Snapshot::new().with("Go", 1, 0).with("C", 2, 0))
            .unwrap();
        let replacement = Snapshot::new().with("Go", 5, 5);
        cache.store_snapshot("abc123", "scc", &replacement).unwrap();
        assert_eq!(cache.get_snapshot("abc123", "scc").unwrap(), Some(replacement));
    }

    #[test]
    fn on_disk_cache_lives_under_repo() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = Cache::new(None::<&Path>, dir.path()).unwrap();
        cache.store_snapshot("abc", "scc", &Snapshot::new().with("Go", 1, 0)).unwrap();
        drop(cache);

        assert!(dir.path().join(".loctrend").join("cache.db").exists());
        let reopened = Cache::new(None::<&Path>, dir.path()).unwrap();
        assert!(reopened.get_snapshot("abc", "scc").unwrap().is_some());
    }
}
