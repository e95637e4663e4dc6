//! Error types for connection, deployment and plan operations.
//!
//! Configuration problems are reported before any I/O happens. Driver errors
//! are boxed into [`BoxError`] so the orchestrators stay generic over the
//! [`Session`](crate::Session) implementation while keeping the driver's
//! error reachable through `source()`.

use thiserror::Error;

use sqldeploy_core::ParseDialectError;

/// A boxed, thread-safe error from a driver or a callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while connecting to or changing a database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Dialect name not recognized.
    #[error(transparent)]
    InvalidDialect(#[from] ParseDialectError),

    #[error("SQLite path not provided")]
    SqlitePathNotProvided,

    #[error("database server host not provided")]
    HostNotProvided,

    #[error("database server port invalid: {0}")]
    InvalidPort(u32),

    #[error("database name not provided")]
    NameNotProvided,

    #[error("database user not provided")]
    UserNotProvided,

    #[error("password for database user not provided")]
    PasswordNotProvided,

    /// Host or credentials could not be assembled into a connection URL.
    #[error("invalid connection target: {0}")]
    InvalidTarget(#[from] url::ParseError),

    /// The URL for `host` has no room for one of the connection fields.
    #[error("invalid connection target: cannot set {field} for host '{host}'")]
    InvalidTargetField { field: &'static str, host: String },

    #[error("could not connect to {target}: {source}")]
    Connect { target: String, source: BoxError },

    /// SQLite file absent outside of a deploy.
    #[error("database file {0} does not exist, deploy the schema first")]
    DatabaseMissing(String),

    #[error("could not create database {name}: {source}")]
    CreateDatabase { name: String, source: BoxError },

    /// A statement failed and no error handler claimed the failure.
    #[error("statement failed: {statement}: {source}")]
    Statement { statement: String, source: BoxError },

    #[error("callback {label} failed: {source}")]
    Callback { label: String, source: BoxError },

    /// Begin or commit of the update transaction failed.
    #[error("could not {action} transaction: {source}")]
    Transaction {
        action: &'static str,
        source: BoxError,
    },

    #[error("connection already established")]
    AlreadyConnected,

    #[error("not connected")]
    NotConnected,

    #[error("could not close connection: {0}")]
    Close(#[source] BoxError),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown translator: {0}")]
    UnknownTranslator(String),

    #[error("unknown error handler: {0}")]
    UnknownErrorHandler(String),
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
