use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_app_state_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// One row per persisted domain blob
fn create_app_state_table(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| DatabaseError::Migration(format!("Failed to create app_state table: {}", e)))?;

    Ok(())
}
