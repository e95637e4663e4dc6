//! The driver seam: live database sessions and transactions.

use std::ops::Deref;

use tracing::warn;

use sqldeploy_core::Dialect;

use crate::target::ConnectionTarget;

/// A live connection to a database.
///
/// Implementations wrap a concrete driver. The orchestrators only ever open,
/// ping, execute and close; query execution beyond that is done by the
/// caller against the concrete type (see `Deref` on the SQLite backend).
pub trait Session: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Opens a connection to `target`.
    fn open(target: &ConnectionTarget) -> Result<Self, Self::Error>;

    /// Dialect spoken by this session.
    fn dialect(&self) -> Dialect;

    /// Round-trips to the database to check the connection is usable.
    fn ping(&self) -> Result<(), Self::Error>;

    /// Executes `sql`, discarding any result rows.
    fn exec(&self, sql: &str) -> Result<(), Self::Error>;

    /// Closes the connection.
    fn close(self) -> Result<(), Self::Error>;
}

/// An open transaction on a borrowed [`Session`].
///
/// The transaction is rolled back when the guard is dropped without a
/// successful [`commit`](Self::commit). Statements run through the guard
/// (it derefs to the session) are part of the transaction.
pub struct Transaction<'s, S: Session> {
    session: &'s S,
    finished: bool,
}

impl<'s, S: Session> Transaction<'s, S> {
    /// Issues the dialect's begin statement on `session`.
    pub fn begin(session: &'s S) -> Result<Self, S::Error> {
        session.exec(session.dialect().begin_transaction_sql())?;
        Ok(Self {
            session,
            finished: false,
        })
    }

    /// Commits the transaction.
    ///
    /// A failed commit is followed by a rollback before the commit error is
    /// returned, so the session is never left inside a transaction.
    pub fn commit(mut self) -> Result<(), S::Error> {
        self.finished = true;
        let dialect = self.session.dialect();
        if let Err(err) = self.session.exec(dialect.commit_sql()) {
            if let Err(rollback_err) = self.session.exec(dialect.rollback_sql()) {
                warn!(error = %rollback_err, "rollback after failed commit also failed");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Rolls the transaction back explicitly.
    pub fn rollback(mut self) -> Result<(), S::Error> {
        self.finished = true;
        self.session.exec(self.session.dialect().rollback_sql())
    }

    pub fn session(&self) -> &'s S {
        self.session
    }
}

impl<S: Session> Deref for Transaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.session
    }
}

impl<S: Session> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.session.exec(self.session.dialect().rollback_sql()) {
            warn!(error = %err, "rollback of abandoned transaction failed");
        }
    }
}
