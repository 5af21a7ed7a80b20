use std::fmt;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::errors::RepositoryError;
use super::key_value::KeyValueStore;
use crate::database::SqlitePool;
use crate::models::StorageKey;

/// SQLite-backed key-value store over the `app_state` table
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state();
        f.debug_struct("SqliteStorage")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl SqliteStorage {
    /// Wrap an already migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: StorageKey) -> Result<Option<String>, RepositoryError> {
        let conn = self.pool.get()?;
        let value = conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: StorageKey, value: &str) -> Result<(), RepositoryError> {
        debug!("Persisting {} ({} bytes)", key, value.len());

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO app_state (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key.as_str(), value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM app_state WHERE key = ?1", params![key.as_str()])?;
        Ok(())
    }

    fn contains(&self, key: StorageKey) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM app_state WHERE key = ?1",
                params![key.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_sqlite_pool, DatabaseConfig};

    fn memory_storage() -> SqliteStorage {
        SqliteStorage::new(initialize_sqlite_pool(&DatabaseConfig::in_memory()).unwrap())
    }

    #[test]
    fn test_upsert_overwrites() {
        let storage = memory_storage();
        storage.put(StorageKey::Weight, "[1]").unwrap();
        storage.put(StorageKey::Weight, "[2]").unwrap();

        assert_eq!(storage.get(StorageKey::Weight).unwrap().as_deref(), Some("[2]"));
        assert!(storage.contains(StorageKey::Weight).unwrap());
        assert!(!storage.contains(StorageKey::Water).unwrap());
    }

    #[test]
    fn test_remove() {
        let storage = memory_storage();
        storage.put(StorageKey::AuthSession, "{}").unwrap();
        storage.remove(StorageKey::AuthSession).unwrap();
        assert_eq!(storage.get(StorageKey::AuthSession).unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            sqlite_path: Some(dir.path().join("kv.db").to_string_lossy().to_string()),
            ..DatabaseConfig::default()
        };

        {
            let storage = SqliteStorage::new(initialize_sqlite_pool(&config).unwrap());
            storage.put(StorageKey::Favorites, "[\"x\"]").unwrap();
        }

        let reopened = SqliteStorage::new(initialize_sqlite_pool(&config).unwrap());
        assert_eq!(reopened.get(StorageKey::Favorites).unwrap().as_deref(), Some("[\"x\"]"));
    }
}
