//! Connection lifecycle and schema deployment for SQL databases.
//!
//! This crate drives a database from "nothing" to "current schema":
//!
//! - [`Config`] describes the database and validates itself before any I/O.
//! - [`Session`] is the seam to a concrete driver; [`Transaction`] is a
//!   rollback-on-drop guard over a session.
//! - [`Database`] owns the session and runs [`DeployJob`]s (create the
//!   database, then run statements and callbacks) and [`UpdateJob`]s (the
//!   same, inside one transaction).
//! - [`SchemaPlan`] loads deploy and update statements from YAML and turns
//!   them into jobs for a target dialect, with a stable fingerprint of the
//!   translated result.
//!
//! Statements pass through the job's translator chain before execution, and
//! failures are offered to the job's error-handler chain before they abort
//! the run. Both chains come from `sqldeploy-core`.
//!
//! # Quick start
//!
//! ```no_run
//! use sqldeploy_core::{Dialect, default_error_handlers};
//! use sqldeploy_db::{
//!     Config, Database, DeployJob, DeployOptions, Session, UpdateJob, UpdateOptions,
//! };
//!
//! fn migrate<S: Session + 'static>() -> sqldeploy_db::Result<()> {
//!     let mut db: Database<S> = Database::new(Config::sqlite("/var/lib/app/app.db"));
//!
//!     let deploy = DeployJob::new()
//!         .statement("CREATE TABLE IF NOT EXISTS users (ID INT NOT NULL AUTO_INCREMENT, PRIMARY KEY(ID))")
//!         .translated(Dialect::MariaDb, db.config().dialect);
//!     db.deploy_schema(&deploy, DeployOptions { keep_open: true })?;
//!
//!     let update = UpdateJob::new()
//!         .statement("ALTER TABLE users ADD COLUMN Email VARCHAR(255)")
//!         .translated(Dialect::MariaDb, db.config().dialect)
//!         .error_handlers(default_error_handlers());
//!     db.update_schema(&update, UpdateOptions::default())
//! }
//! ```

mod config;
mod database;
mod error;
mod job;
mod plan;
mod session;
mod target;

pub use config::Config;
pub use database::Database;
pub use error::{BoxError, DatabaseError, Result};
pub use job::{
    DeployCallback, DeployJob, DeployOptions, UpdateCallback, UpdateJob, UpdateOptions,
};
pub use plan::{PlanSection, SchemaPlan, TranslatedPlan};
pub use session::{Session, Transaction};
pub use target::{ConnectionTarget, IN_MEMORY_RACY, IN_MEMORY_SHARED, is_in_memory_path};
