//! SQLite connection pool for the local key-value store.
//!
//! The pool is returned to the caller and passed explicitly to
//! [`crate::repository::SqliteStorage`]; there is no process-wide pool.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Pool type shared by every SQLite-backed store
pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// Database configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file. `None` selects an in-memory database.
    pub sqlite_path: Option<String>,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: Some("./data/nutritrack.db".to_string()),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// In-memory configuration, mostly for tests
    pub fn in_memory() -> Self {
        Self {
            sqlite_path: None,
            ..Self::default()
        }
    }

    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let sqlite_path = match env::var("DB_SQLITE_PATH") {
            Ok(path) if path.trim().is_empty() => {
                return Err(DatabaseError::Config("DB_SQLITE_PATH is empty".to_string()));
            }
            Ok(path) if path == ":memory:" => None,
            Ok(path) => Some(path),
            Err(_) => defaults.sqlite_path,
        };

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_connections);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: path={:?}, max_connections={}, timeout={}s",
            sqlite_path, max_connections, timeout_seconds
        );

        Ok(DatabaseConfig {
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

/// Build the SQLite pool and run migrations.
///
/// Falls back to an in-memory database when the file location is unusable,
/// so the application still starts (without durability) on a read-only disk.
pub fn initialize_sqlite_pool(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let Some(sqlite_path) = config.sqlite_path.clone() else {
        return initialize_in_memory_sqlite_pool(config);
    };

    info!("Initializing SQLite database at: {}", sqlite_path);

    if let Some(parent) = Path::new(&sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create directory {:?}: {}, falling back to in-memory database", parent, e);
                return initialize_in_memory_sqlite_pool(config);
            }
            info!("Created directory: {:?}", parent);
        }
    }

    let manager = SqliteConnectionManager::file(&sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = match r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to create SQLite connection pool: {}", e);
            warn!("Falling back to in-memory SQLite database");
            return initialize_in_memory_sqlite_pool(config);
        }
    };

    let conn = pool.get()?;
    run_sqlite_migrations(&conn)?;

    info!("SQLite connection pool created successfully");
    Ok(pool)
}

/// Initialize an in-memory SQLite database.
///
/// Every in-memory connection is its own database, so the pool is pinned
/// to a single connection.
fn initialize_in_memory_sqlite_pool(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    let conn = pool.get()?;
    run_sqlite_migrations(&conn)?;

    info!("In-memory SQLite database initialized successfully");
    Ok(pool)
}

/// Human-readable description of the pool, used by the health check
pub fn connection_info(pool: &SqlitePool) -> Result<String, DatabaseError> {
    let conn = pool.get()?;
    let path: String = conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;

    let location = if path.is_empty() || path == ":memory:" {
        "SQLite in-memory database".to_string()
    } else {
        format!("SQLite database at {}", path)
    };

    let state = pool.state();
    Ok(format!(
        "{} (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    ))
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert!(config.sqlite_path.is_some());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_in_memory_pool_is_migrated() {
        let pool = initialize_sqlite_pool(&DatabaseConfig::in_memory()).unwrap();
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'app_state'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        // The in-memory pool holds a single connection
        drop(conn);

        let info = connection_info(&pool).unwrap();
        assert!(info.contains("in-memory"));
    }

    #[test]
    fn test_file_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.db");
        let config = DatabaseConfig {
            sqlite_path: Some(path.to_string_lossy().to_string()),
            ..DatabaseConfig::default()
        };

        let pool = initialize_sqlite_pool(&config).unwrap();
        assert!(path.exists());
        assert!(connection_info(&pool).unwrap().contains("state.db"));
    }
}
