//! The database handle and the deploy/update orchestrators.

use std::path::Path;

use tracing::{debug, error, info, warn};

use sqldeploy_core::{should_ignore, translate};

use crate::config::Config;
use crate::error::{DatabaseError, Result};
use crate::job::{DeployJob, DeployOptions, UpdateJob, UpdateOptions};
use crate::session::{Session, Transaction};
use crate::target::{ConnectionTarget, is_in_memory_path};

/// Maximum length of a single-line statement in log output.
const PREVIEW_LEN: usize = 70;

/// A configured database and, once connected, its live session.
///
/// The handle owns the session exclusively. Deploy and update take
/// `&mut self`, so nothing else can use the session while a job runs.
///
/// # Examples
///
/// ```no_run
/// # use sqldeploy_db::{Config, Database, DeployJob, DeployOptions, Session};
/// # fn run<S: Session + 'static>() -> sqldeploy_db::Result<()> {
/// let mut db: Database<S> = Database::new(Config::sqlite("/var/lib/app/app.db"));
/// let job = DeployJob::new().statement("CREATE TABLE IF NOT EXISTS t (a TEXT)");
/// db.deploy_schema(&job, DeployOptions::default())?;
/// # Ok(())
/// # }
/// ```
pub struct Database<S: Session> {
    config: Config,
    session: Option<S>,
}

impl<S: Session> Database<S> {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the configuration, refused while connected.
    pub fn config_mut(&mut self) -> Result<&mut Config> {
        if self.session.is_some() {
            return Err(DatabaseError::AlreadyConnected);
        }
        Ok(&mut self.config)
    }

    pub fn is_mysql_family(&self) -> bool {
        self.config.is_mysql_family()
    }

    /// Returns `true` if a session is open and answers a ping.
    pub fn connected(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.ping().is_ok())
    }

    /// The open session.
    pub fn session(&self) -> Result<&S> {
        self.session.as_ref().ok_or(DatabaseError::NotConnected)
    }

    /// Connects to the configured database.
    ///
    /// A SQLite database file must already exist (use
    /// [`deploy_schema`](Self::deploy_schema) to create it) unless the path
    /// is one of the in-memory paths. Configured SQLite pragmas run right
    /// after the connection opens.
    pub fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(DatabaseError::AlreadyConnected);
        }
        self.config.validate()?;

        let target = ConnectionTarget::database(&self.config)?;
        if let Some(path) = target.sqlite_path() {
            if !is_in_memory_path(path) && !Path::new(path).exists() {
                return Err(DatabaseError::DatabaseMissing(path.to_string()));
            }
        }

        debug!(endpoint = %target, dialect = %self.config.dialect, "connecting");
        let session = S::open(&target).map_err(|e| DatabaseError::Connect {
            target: target.to_string(),
            source: Box::new(e),
        })?;
        if let Err(e) = session.ping() {
            close_quietly(session);
            return Err(DatabaseError::Connect {
                target: target.to_string(),
                source: Box::new(e),
            });
        }

        if self.config.dialect.is_file_based() {
            for pragma in &self.config.sqlite_pragmas {
                if let Err(e) = session.exec(pragma) {
                    close_quietly(session);
                    return Err(DatabaseError::Statement {
                        statement: pragma.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        self.session = Some(session);
        Ok(())
    }

    /// Closes the session. Closing a handle that is not connected is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => session
                .close()
                .map_err(|e| DatabaseError::Close(Box::new(e))),
            None => Ok(()),
        }
    }

    /// Creates the database if needed and applies `job` to it.
    ///
    /// Steps, in order: validate the configuration, connect to the server
    /// alone and create the database (for SQLite, open the file so it
    /// exists), reconnect to the database, run every translated statement,
    /// then every callback. A statement error that no handler in the job's
    /// chain ignores, or any callback error, closes the session and is
    /// returned. On success the session is closed unless
    /// [`DeployOptions::keep_open`] is set.
    ///
    /// # Errors
    ///
    /// [`AlreadyConnected`](DatabaseError::AlreadyConnected) if the handle
    /// already holds a session that answers a ping (a dead session is
    /// discarded instead); configuration, connection, statement and
    /// callback errors otherwise.
    pub fn deploy_schema(&mut self, job: &DeployJob<S>, opts: DeployOptions) -> Result<()> {
        if self.session.is_some() {
            if self.connected() {
                return Err(DatabaseError::AlreadyConnected);
            }
            warn!("existing session does not answer, discarding it before deploy");
            self.abandon_session();
        }
        self.config.validate()?;

        self.create_database()?;

        debug!("connecting to deployed database");
        self.connect()?;

        if let Err(err) = self.apply_deploy(job) {
            self.abandon_session();
            return Err(err);
        }

        self.finish("deploy", opts.keep_open)
    }

    /// Applies `job` inside a single transaction.
    ///
    /// An open session is reused, which is how an in-memory SQLite database
    /// deployed with [`DeployOptions::keep_open`] gets updated; otherwise a
    /// new connection is made. The transaction commits only after every
    /// statement and callback succeeded. Any failure rolls back, closes the
    /// session (even when [`UpdateOptions::keep_open`] is set) and is
    /// returned.
    pub fn update_schema(&mut self, job: &UpdateJob<S>, opts: UpdateOptions) -> Result<()> {
        self.config.validate()?;

        if !self.connected() {
            if self.session.is_some() {
                warn!("existing session does not answer, reconnecting");
                self.abandon_session();
            }
            self.connect()?;
        }

        if let Err(err) = self.apply_update(job) {
            self.abandon_session();
            return Err(err);
        }

        self.finish("update", opts.keep_open)
    }

    fn create_database(&self) -> Result<()> {
        let server = ConnectionTarget::server(&self.config)?;
        debug!(endpoint = %server, "connecting to server before deploy");
        let conn = S::open(&server).map_err(|e| DatabaseError::Connect {
            target: server.to_string(),
            source: Box::new(e),
        })?;

        let name = self.config.name.trim();
        let created = match self.config.dialect.create_database_sql(name) {
            Some(sql) => {
                info!(database = name, "creating database if it does not exist");
                conn.exec(&sql).map_err(|e| DatabaseError::CreateDatabase {
                    name: name.to_string(),
                    source: Box::new(e),
                })
            }
            None => conn.ping().map_err(|e| DatabaseError::Connect {
                target: server.to_string(),
                source: Box::new(e),
            }),
        };

        let closed = conn.close();
        created?;
        closed.map_err(|e| DatabaseError::Close(Box::new(e)))
    }

    fn apply_deploy(&self, job: &DeployJob<S>) -> Result<()> {
        let session = self.session()?;

        info!(count = job.statement_list().len(), "running deploy statements");
        for raw in job.statement_list() {
            let statement = translate::translate(raw, job.translator_chain());
            info!(statement = %preview(&statement), "deploy statement");
            run_statement(session, statement, job.error_handler_chain())?;
        }

        info!(count = job.callback_list().len(), "running deploy callbacks");
        for callback in job.callback_list() {
            info!(label = callback.label(), "deploy callback");
            callback.call(session).map_err(|source| {
                error!(label = callback.label(), error = %source, "deploy callback failed");
                DatabaseError::Callback {
                    label: callback.label().to_string(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    fn apply_update(&self, job: &UpdateJob<S>) -> Result<()> {
        let session = self.session()?;
        let tx = Transaction::begin(session).map_err(|e| DatabaseError::Transaction {
            action: "begin",
            source: Box::new(e),
        })?;

        // Returning early drops `tx`, which rolls back.
        info!(count = job.statement_list().len(), "running update statements");
        for raw in job.statement_list() {
            let statement = translate::translate(raw, job.translator_chain());
            info!(statement = %preview(&statement), "update statement");
            run_statement(&*tx, statement, job.error_handler_chain())?;
        }

        info!(count = job.callback_list().len(), "running update callbacks");
        for callback in job.callback_list() {
            info!(label = callback.label(), "update callback");
            callback.call(&tx).map_err(|source| {
                error!(label = callback.label(), error = %source, "update callback failed");
                DatabaseError::Callback {
                    label: callback.label().to_string(),
                    source,
                }
            })?;
        }

        tx.commit().map_err(|e| DatabaseError::Transaction {
            action: "commit",
            source: Box::new(e),
        })
    }

    fn finish(&mut self, job: &'static str, keep_open: bool) -> Result<()> {
        if keep_open {
            debug!(job, "connection left open");
            return Ok(());
        }
        self.close()?;
        debug!(job, "connection closed");
        Ok(())
    }

    /// Drops the session after a failure; a close error is only logged.
    fn abandon_session(&mut self) {
        if let Some(session) = self.session.take() {
            close_quietly(session);
        }
    }
}

impl<S: Session> std::fmt::Debug for Database<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.config.dialect)
            .field("connected", &self.session.is_some())
            .finish()
    }
}

fn run_statement<S: Session>(
    session: &S,
    statement: String,
    handlers: &[sqldeploy_core::ErrorHandler],
) -> Result<()> {
    let Err(err) = session.exec(&statement) else {
        return Ok(());
    };
    if should_ignore(&statement, &err, handlers) {
        debug!(statement = %preview(&statement), error = %err, "ignoring statement error");
        return Ok(());
    }
    error!(statement = %statement, error = %err, "statement failed");
    Err(DatabaseError::Statement {
        statement,
        source: Box::new(err),
    })
}

fn close_quietly<S: Session>(session: S) {
    if let Err(e) = session.close() {
        warn!(error = %e, "closing session failed");
    }
}

/// First line of a multi-line statement, or a single line cut to
/// [`PREVIEW_LEN`] characters.
fn preview(statement: &str) -> String {
    let trimmed = statement.trim();
    if let Some((first, _)) = trimmed.split_once('\n') {
        return first.trim_end().to_string();
    }
    match trimmed.char_indices().nth(PREVIEW_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_multiline_takes_first_line() {
        assert_eq!(
            preview("\n  CREATE TABLE t (\n    a TEXT\n  )"),
            "CREATE TABLE t ("
        );
    }

    #[test]
    fn test_preview_truncates_long_lines() {
        let long = "x".repeat(100);
        let shown = preview(&long);
        assert_eq!(shown.len(), PREVIEW_LEN + 3);
        assert!(shown.ends_with("..."));
        assert_eq!(preview("SELECT 1"), "SELECT 1");
    }
}
