//! [`Session`] implementation over a `rusqlite` connection.

use std::ops::Deref;
use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use sqldeploy_core::Dialect;
use sqldeploy_db::{ConnectionTarget, Session, is_in_memory_path};

use crate::error::{Result, SqliteError};

/// A live SQLite connection.
///
/// Derefs to [`rusqlite::Connection`] for everything beyond schema
/// deployment: queries, prepared statements, row mapping.
#[derive(Debug)]
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    /// Wraps an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Names of the user tables in the database, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Names of the columns of `table`, in declaration order.
    pub fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let names = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

impl Deref for SqliteSession {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Session for SqliteSession {
    type Error = SqliteError;

    /// Opens the file at the target's path.
    ///
    /// Only server-level targets (used while deploying) may create a missing
    /// file; database targets require it to exist unless the path is
    /// in-memory.
    fn open(target: &ConnectionTarget) -> Result<Self> {
        if target.dialect() != Dialect::Sqlite {
            return Err(SqliteError::UnsupportedDialect(target.dialect()));
        }
        let path = target.dsn();
        if !target.is_server() && !is_in_memory_path(path) && !Path::new(path).exists() {
            return Err(SqliteError::MissingFile(path.to_string()));
        }
        debug!(path, "opening SQLite database");
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn ping(&self) -> Result<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Runs `sql` as a batch, so one call may hold several statements.
    fn exec(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| SqliteError::Database(err))
    }
}

/// Version of the SQLite library in use, e.g. `3.46.0`.
pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}
