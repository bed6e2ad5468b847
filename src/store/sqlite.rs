use chrono::Utc;
use rusqlite::params;

use crate::db::DbPool;

use super::ContentStore;

/// SQLite-backed implementation of the ContentStore trait.
/// Wraps an r2d2 connection pool over a single `kv_store` table.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self, String> {
        let pool = crate::db::init_pool_at(path)?;
        Ok(Self { pool })
    }

    pub fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool)
    }
}

impl ContentStore for SqliteStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .ok()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        let now = Utc::now().naive_utc();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, now],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn updated_at(&self, key: &str) -> Option<String> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT updated_at FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .ok()
    }

    fn ping(&self) -> bool {
        self.pool
            .get()
            .ok()
            .and_then(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).ok())
            .is_some()
    }
}
