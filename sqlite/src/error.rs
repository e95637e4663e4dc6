//! Error types for the SQLite session backend.

use thiserror::Error;

use sqldeploy_core::Dialect;

/// Errors that can occur while talking to a SQLite database.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A connection target for another engine was handed to this backend.
    #[error("SQLite backend cannot connect to a {0} target")]
    UnsupportedDialect(Dialect),

    /// Database file absent and the target does not allow creating it.
    #[error("database file not found: {0}")]
    MissingFile(String),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
