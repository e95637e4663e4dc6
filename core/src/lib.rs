//! Dialect translation and error classification for SQL schema deployment.
//!
//! Schema statements are written once, in MySQL/MariaDB syntax, and deployed
//! to whichever engine a configuration points at. This crate holds the pure,
//! I/O-free half of that process:
//!
//! - [`Dialect`]: the supported engines and their dialect-specific
//!   statements (database creation, transaction control).
//! - [`translate`]: textual rewrite rules ([`Translator`]) and the composed
//!   chains that turn MySQL-family DDL into SQLite or T-SQL.
//! - [`classify`]: [`ErrorHandler`] predicates that recognize harmless
//!   re-run failures such as adding a column that already exists.
//! - [`Columns`] / [`Where`]: small helpers for building query text.
//!
//! # Example
//!
//! ```
//! use sqldeploy_core::{Dialect, translate};
//!
//! let chain = Dialect::Sqlite.deploy_translators(Dialect::MariaDb);
//! let out = translate::translate("CREATE TABLE t (Flag BOOL NOT NULL)", &chain);
//! assert_eq!(out, "CREATE TABLE t (Flag INTEGER NOT NULL)");
//! ```

pub mod classify;
mod columns;
mod dialect;
pub mod translate;

pub use classify::{ErrorHandler, default_error_handlers, error_handler_by_name, should_ignore};
pub use columns::{Columns, ColumnsError, Where};
pub use dialect::{Dialect, ParseDialectError};
pub use translate::{Translator, translator_by_name};
