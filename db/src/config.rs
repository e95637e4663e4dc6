//! Connection configuration.
//!
//! A [`Config`] describes which database to connect to and how. Server
//! dialects need a host, port, database name and credentials; SQLite only
//! needs a file path. Configurations are usually built with one of the
//! per-dialect constructors or loaded from YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! dialect: mariadb
//! host: db.internal
//! port: 3306
//! name: app
//! user: app
//! password: secret
//! connection_options:
//!   tls: preferred
//! ```
//!
//! ```yaml
//! dialect: sqlite
//! sqlite_path: /var/lib/app/app.db
//! sqlite_pragmas:
//!   - PRAGMA foreign_keys = ON
//!   - PRAGMA journal_mode = WAL
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use sqldeploy_core::Dialect;

use crate::error::{DatabaseError, Result};

/// Details used to establish a database connection.
///
/// # Examples
///
/// ```
/// use sqldeploy_db::Config;
///
/// let config = Config::mariadb("10.0.0.5", "app", "app", "secret");
/// assert_eq!(config.port, 3306);
/// assert!(config.validate().is_ok());
///
/// let config = Config::sqlite("");
/// assert!(config.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Engine to connect to.
    pub dialect: Dialect,
    /// IP or FQDN of the database server. Unused for SQLite.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    /// Server port. Unused for SQLite.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub port: u32,
    /// Database name. Unused for SQLite.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    /// Blank passwords are not accepted for server dialects.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Path of the SQLite database file, or one of the in-memory paths.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sqlite_path: String,
    /// Statements run on every new SQLite connection, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sqlite_pragmas: Vec<String>,
    /// Extra driver parameters appended to server connection URLs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub connection_options: BTreeMap<String, String>,
}

fn is_zero(port: &u32) -> bool {
    *port == 0
}

impl Config {
    /// Returns an empty configuration for `dialect` with its default port.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            host: String::new(),
            port: dialect.default_port().map(u32::from).unwrap_or(0),
            name: String::new(),
            user: String::new(),
            password: String::new(),
            sqlite_path: String::new(),
            sqlite_pragmas: Vec::new(),
            connection_options: BTreeMap::new(),
        }
    }

    /// Returns an empty configuration for the dialect named `name`.
    pub fn for_dialect_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn mysql(host: &str, name: &str, user: &str, password: &str) -> Self {
        Self::server(Dialect::MySql, host, name, user, password)
    }

    pub fn mariadb(host: &str, name: &str, user: &str, password: &str) -> Self {
        Self::server(Dialect::MariaDb, host, name, user, password)
    }

    pub fn mssql(host: &str, name: &str, user: &str, password: &str) -> Self {
        Self::server(Dialect::MsSql, host, name, user, password)
    }

    pub fn sqlite(path: &str) -> Self {
        Self {
            sqlite_path: path.to_string(),
            ..Self::new(Dialect::Sqlite)
        }
    }

    fn server(dialect: Dialect, host: &str, name: &str, user: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            name: name.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            ..Self::new(dialect)
        }
    }

    /// Checks that every field the dialect needs is present.
    ///
    /// Surrounding whitespace is ignored, so a host of `"  "` counts as
    /// missing. Checks run in field order and the first failure is returned.
    pub fn validate(&self) -> Result<()> {
        if self.dialect.is_file_based() {
            if self.sqlite_path.trim().is_empty() {
                return Err(DatabaseError::SqlitePathNotProvided);
            }
            return Ok(());
        }

        if self.host.trim().is_empty() {
            return Err(DatabaseError::HostNotProvided);
        }
        if self.port == 0 || self.port > u32::from(u16::MAX) {
            return Err(DatabaseError::InvalidPort(self.port));
        }
        if self.name.trim().is_empty() {
            return Err(DatabaseError::NameNotProvided);
        }
        if self.user.trim().is_empty() {
            return Err(DatabaseError::UserNotProvided);
        }
        if self.password.is_empty() {
            return Err(DatabaseError::PasswordNotProvided);
        }
        Ok(())
    }

    /// Returns `true` for MySQL and MariaDB configurations.
    pub fn is_mysql_family(&self) -> bool {
        self.dialect.is_mysql_family()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](DatabaseError::Io) if the file cannot be read, or
    /// [`Yaml`](DatabaseError::Yaml) if parsing fails. The result is not
    /// validated; call [`validate`](Self::validate) or let `connect` do it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
