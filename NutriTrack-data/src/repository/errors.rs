use std::sync::PoisonError;
use thiserror::Error;

#[cfg(feature = "sqlite")]
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Stored blob could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[cfg(feature = "sqlite")]
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Backend refused the write (quota, read-only medium, ...)
    #[error("Write rejected: {0}")]
    WriteRejected(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}
