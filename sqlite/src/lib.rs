//! SQLite backend for `sqldeploy`.
//!
//! [`SqliteSession`] implements [`Session`](sqldeploy_db::Session) on top of
//! a `rusqlite` connection, so a [`SqliteDatabase`] can deploy and update a
//! schema written for MySQL/MariaDB and then be queried through the
//! ordinary `rusqlite` API.
//!
//! # Quick start
//!
//! ```no_run
//! use sqldeploy_core::{Dialect, default_error_handlers};
//! use sqldeploy_db::{Config, DeployJob, DeployOptions};
//! use sqldeploy_sqlite::{IN_MEMORY_RACY, SqliteDatabase};
//!
//! let mut db = SqliteDatabase::new(Config::sqlite(IN_MEMORY_RACY));
//! let job = DeployJob::new()
//!     .statement(
//!         "CREATE TABLE IF NOT EXISTS users (
//!             ID INT NOT NULL AUTO_INCREMENT,
//!             Username VARCHAR(255) NOT NULL,
//!             PRIMARY KEY(ID)
//!         )",
//!     )
//!     .translated(Dialect::MariaDb, Dialect::Sqlite)
//!     .error_handlers(default_error_handlers());
//!
//! // A private in-memory database disappears with its connection.
//! db.deploy_schema(&job, DeployOptions { keep_open: true }).unwrap();
//!
//! let session = db.session().unwrap();
//! session
//!     .execute("INSERT INTO users (Username) VALUES (?1)", ["ada"])
//!     .unwrap();
//! ```
//!
//! # In-memory databases
//!
//! [`IN_MEMORY_RACY`] gives every connection its own empty database, so the
//! deploy connection must be kept open to use the result.
//! [`IN_MEMORY_SHARED`] is shared by every connection in the process.

mod error;
mod session;

pub use error::{Result, SqliteError};
pub use session::{SqliteSession, sqlite_version};
pub use sqldeploy_db::{IN_MEMORY_RACY, IN_MEMORY_SHARED};

/// A [`Database`](sqldeploy_db::Database) backed by SQLite.
pub type SqliteDatabase = sqldeploy_db::Database<SqliteSession>;
