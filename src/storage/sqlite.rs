use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::storage::cache::Cache;

pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.init_db()?;
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.init_db()?;
        Ok(cache)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn init_db(&self) -> Result<()> {
        self.conn().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cache_entries_expires_at ON cache_entries(expires_at);
            "#,
        )?;

        let purged = self.purge_expired()?;
        if purged > 0 {
            tracing::debug!("Purged {} expired cache entries", purged);
        }
        Ok(())
    }

    pub fn purge_expired(&self) -> Result<usize> {
        let removed = self.conn().execute(
            "DELETE FROM cache_entries WHERE expires_at <= ?1",
            params![Utc::now().timestamp()],
        )?;
        Ok(removed)
    }

    fn get_at(&self, key: &str, now: i64) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1 AND expires_at > ?2",
                params![key, now],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_at(&self, key: &str, value: &str, ttl_secs: u64, now: i64) -> Result<()> {
        let conn = self.conn();
        if ttl_secs == 0 {
            conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
            return Ok(());
        }

        let expires_at = now.saturating_add(ttl_secs.min(i64::MAX as u64) as i64);
        conn.execute(
            r#"
            INSERT INTO cache_entries (key, value, expires_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at
            "#,
            params![key, value, expires_at],
        )?;
        Ok(())
    }
}

impl Cache for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_at(key, Utc::now().timestamp())
    }

    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.set_at(key, value, ttl_secs, Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set("profile:octocat", r#"{"login":"octocat"}"#, 3600).unwrap();
        assert_eq!(
            cache.get("profile:octocat").unwrap(),
            Some(r#"{"login":"octocat"}"#.to_string())
        );
        assert_eq!(cache.get("profile:nobody").unwrap(), None);
    }

    #[test]
    fn test_expiry_and_overwrite() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set_at("repos:a", "old", 60, 1_000).unwrap();
        assert_eq!(cache.get_at("repos:a", 1_059).unwrap(), Some("old".to_string()));
        assert_eq!(cache.get_at("repos:a", 1_060).unwrap(), None);

        cache.set_at("repos:a", "new", 60, 2_000).unwrap();
        assert_eq!(cache.get_at("repos:a", 2_001).unwrap(), Some("new".to_string()));

        cache.set_at("repos:a", "gone", 0, 2_002).unwrap();
        assert_eq!(cache.get_at("repos:a", 2_003).unwrap(), None);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        SqliteCache::new(&path)
            .unwrap()
            .set("commits:octocat", "[]", 3600)
            .unwrap();

        let reopened = SqliteCache::new(&path).unwrap();
        assert_eq!(reopened.get("commits:octocat").unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_purge_removes_only_expired() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.set_at("stale", "x", 1, 0).unwrap();
        cache.set("fresh", "y", 3600).unwrap();
        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert_eq!(cache.get("fresh").unwrap(), Some("y".to_string()));
    }
}
