//! Deploy and update jobs: statements, callbacks and the chains applied to them.

use std::fmt;

use sqldeploy_core::translate::{self, Translator};
use sqldeploy_core::{Dialect, ErrorHandler};

use crate::error::BoxError;
use crate::session::{Session, Transaction};

type DeployFn<S> = dyn Fn(&S) -> Result<(), BoxError>;
type UpdateFn<S> = dyn Fn(&Transaction<'_, S>) -> Result<(), BoxError>;

/// A labeled callback run against the live session after deploy statements.
pub struct DeployCallback<S> {
    label: String,
    run: Box<DeployFn<S>>,
}

impl<S> DeployCallback<S> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(&self, session: &S) -> Result<(), BoxError> {
        (self.run)(session)
    }
}

/// A labeled callback run inside the update transaction.
pub struct UpdateCallback<S: Session> {
    label: String,
    run: Box<UpdateFn<S>>,
}

impl<S: Session> UpdateCallback<S> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(&self, tx: &Transaction<'_, S>) -> Result<(), BoxError> {
        (self.run)(tx)
    }
}

/// Statements and callbacks that create a schema from scratch.
///
/// # Examples
///
/// ```
/// use sqldeploy_core::{Dialect, default_error_handlers};
/// use sqldeploy_db::{DeployJob, Session};
///
/// fn job<S: Session + 'static>() -> DeployJob<S> {
///     DeployJob::new()
///         .statement("CREATE TABLE IF NOT EXISTS users (ID INT NOT NULL AUTO_INCREMENT, PRIMARY KEY(ID))")
///         .translated(Dialect::MariaDb, Dialect::Sqlite)
///         .error_handlers(default_error_handlers())
///         .callback("seed admin", |session: &S| {
///             session.exec("INSERT INTO users DEFAULT VALUES")?;
///             Ok(())
///         })
/// }
/// ```
pub struct DeployJob<S> {
    statements: Vec<String>,
    callbacks: Vec<DeployCallback<S>>,
    translators: Vec<Translator>,
    error_handlers: Vec<ErrorHandler>,
}

impl<S> DeployJob<S> {
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
            callbacks: Vec::new(),
            translators: Vec::new(),
            error_handlers: Vec::new(),
        }
    }

    /// Appends a statement.
    pub fn statement(mut self, statement: impl Into<String>) -> Self {
        self.statements.push(statement.into());
        self
    }

    /// Appends several statements, in order.
    pub fn statements<I, T>(mut self, statements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.statements.extend(statements.into_iter().map(Into::into));
        self
    }

    /// Appends a callback, run after every statement has been applied.
    pub fn callback<F>(mut self, label: impl Into<String>, run: F) -> Self
    where
        F: Fn(&S) -> Result<(), BoxError> + 'static,
    {
        self.callbacks.push(DeployCallback {
            label: label.into(),
            run: Box::new(run),
        });
        self
    }

    /// Replaces the translator chain.
    pub fn translators(mut self, chain: Vec<Translator>) -> Self {
        self.translators = chain;
        self
    }

    /// Uses the default chain from `source` statements to `target`.
    pub fn translated(self, source: Dialect, target: Dialect) -> Self {
        self.translators(target.deploy_translators(source))
    }

    /// Replaces the error-handler chain.
    pub fn error_handlers(mut self, handlers: Vec<ErrorHandler>) -> Self {
        self.error_handlers = handlers;
        self
    }

    pub fn statement_list(&self) -> &[String] {
        &self.statements
    }

    pub fn callback_list(&self) -> &[DeployCallback<S>] {
        &self.callbacks
    }

    pub fn translator_chain(&self) -> &[Translator] {
        &self.translators
    }

    pub fn error_handler_chain(&self) -> &[ErrorHandler] {
        &self.error_handlers
    }

    /// Statements as they will be executed.
    pub fn translated_statements(&self) -> Vec<String> {
        translate_all(&self.statements, &self.translators)
    }
}

impl<S> Default for DeployJob<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for DeployJob<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployJob")
            .field("statements", &self.statements)
            .field(
                "callbacks",
                &self.callbacks.iter().map(|c| c.label()).collect::<Vec<_>>(),
            )
            .field("translators", &self.translators.len())
            .field("error_handlers", &self.error_handlers.len())
            .finish()
    }
}

/// Statements and callbacks that evolve an existing schema.
///
/// Update jobs are meant to be run on every start, so each statement should
/// either be idempotent or fail in a way one of the error handlers ignores.
/// The whole job runs in one transaction.
pub struct UpdateJob<S: Session> {
    statements: Vec<String>,
    callbacks: Vec<UpdateCallback<S>>,
    translators: Vec<Translator>,
    error_handlers: Vec<ErrorHandler>,
}

impl<S: Session> UpdateJob<S> {
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
            callbacks: Vec::new(),
            translators: Vec::new(),
            error_handlers: Vec::new(),
        }
    }

    pub fn statement(mut self, statement: impl Into<String>) -> Self {
        self.statements.push(statement.into());
        self
    }

    pub fn statements<I, T>(mut self, statements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.statements.extend(statements.into_iter().map(Into::into));
        self
    }

    /// Appends a callback. It receives the open transaction.
    pub fn callback<F>(mut self, label: impl Into<String>, run: F) -> Self
    where
        F: Fn(&Transaction<'_, S>) -> Result<(), BoxError> + 'static,
    {
        self.callbacks.push(UpdateCallback {
            label: label.into(),
            run: Box::new(run),
        });
        self
    }

    pub fn translators(mut self, chain: Vec<Translator>) -> Self {
        self.translators = chain;
        self
    }

    /// Uses the default update chain from `source` statements to `target`.
    pub fn translated(self, source: Dialect, target: Dialect) -> Self {
        self.translators(target.update_translators(source))
    }

    pub fn error_handlers(mut self, handlers: Vec<ErrorHandler>) -> Self {
        self.error_handlers = handlers;
        self
    }

    pub fn statement_list(&self) -> &[String] {
        &self.statements
    }

    pub fn callback_list(&self) -> &[UpdateCallback<S>] {
        &self.callbacks
    }

    pub fn translator_chain(&self) -> &[Translator] {
        &self.translators
    }

    pub fn error_handler_chain(&self) -> &[ErrorHandler] {
        &self.error_handlers
    }

    pub fn translated_statements(&self) -> Vec<String> {
        translate_all(&self.statements, &self.translators)
    }
}

impl<S: Session> Default for UpdateJob<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Session> fmt::Debug for UpdateJob<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateJob")
            .field("statements", &self.statements)
            .field(
                "callbacks",
                &self.callbacks.iter().map(|c| c.label()).collect::<Vec<_>>(),
            )
            .field("translators", &self.translators.len())
            .field("error_handlers", &self.error_handlers.len())
            .finish()
    }
}

fn translate_all(statements: &[String], chain: &[Translator]) -> Vec<String> {
    statements
        .iter()
        .map(|s| translate::translate(s, chain))
        .collect()
}

/// Options for [`Database::deploy_schema`](crate::Database::deploy_schema).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Leave the session open after a successful deploy.
    ///
    /// Needed to keep using a private in-memory SQLite database, which is
    /// gone once its connection closes.
    pub keep_open: bool,
}

/// Options for [`Database::update_schema`](crate::Database::update_schema).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Leave the session open after a successful update.
    pub keep_open: bool,
}
