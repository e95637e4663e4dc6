//! Supported SQL dialects.
//!
//! A [`Dialect`] names the database engine a statement is written for or
//! deployed to. Besides identifying the engine it knows the handful of
//! dialect-specific statements the orchestrators need (database creation and
//! transaction control) and which translator chain turns a statement written
//! for another dialect into one this dialect accepts.
//!
//! # Examples
//!
//! ```
//! use sqldeploy_core::Dialect;
//!
//! let target: Dialect = "sqlite".parse().unwrap();
//! assert!(target.is_file_based());
//! assert_eq!(target.create_database_sql("app"), None);
//!
//! let chain = target.deploy_translators(Dialect::MariaDb);
//! assert!(!chain.is_empty());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::translate::{self, Translator};

/// A SQL dialect understood by the deployment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL server.
    #[serde(rename = "mysql")]
    MySql,
    /// MariaDB server (MySQL family).
    #[serde(rename = "mariadb")]
    MariaDb,
    /// SQLite database file or in-memory database.
    Sqlite,
    /// Microsoft SQL Server.
    #[serde(rename = "mssql")]
    MsSql,
}

/// Returned when a dialect name is not one of the supported dialects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid dialect, should be one of 'mysql', 'mariadb', 'sqlite', 'mssql', got '{0}'")]
pub struct ParseDialectError(pub String);

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Dialect; 4] = [
        Dialect::MySql,
        Dialect::MariaDb,
        Dialect::Sqlite,
        Dialect::MsSql,
    ];

    /// Returns the canonical lowercase name of the dialect.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::MariaDb => "mariadb",
            Dialect::Sqlite => "sqlite",
            Dialect::MsSql => "mssql",
        }
    }

    /// Returns the default server port, or `None` for file-based engines.
    pub fn default_port(self) -> Option<u16> {
        match self {
            Dialect::MySql | Dialect::MariaDb => Some(3306),
            Dialect::MsSql => Some(1433),
            Dialect::Sqlite => None,
        }
    }

    /// Returns `true` for MySQL and MariaDB, which share DDL syntax.
    pub fn is_mysql_family(self) -> bool {
        matches!(self, Dialect::MySql | Dialect::MariaDb)
    }

    /// Returns `true` when the database lives in a file rather than on a server.
    pub fn is_file_based(self) -> bool {
        matches!(self, Dialect::Sqlite)
    }

    /// Returns `true` if statements written for `other` run unmodified here.
    pub fn same_family(self, other: Dialect) -> bool {
        self == other || (self.is_mysql_family() && other.is_mysql_family())
    }

    /// Returns the statement that creates database `name` when it is missing.
    ///
    /// File-based engines have no such statement; opening the file creates it.
    pub fn create_database_sql(self, name: &str) -> Option<String> {
        match self {
            Dialect::MySql | Dialect::MariaDb => {
                Some(format!("CREATE DATABASE IF NOT EXISTS {name}"))
            }
            Dialect::MsSql => Some(format!(
                "IF DB_ID(N'{}') IS NULL CREATE DATABASE [{}]",
                name.replace('\'', "''"),
                name.replace(']', "]]")
            )),
            Dialect::Sqlite => None,
        }
    }

    /// Statement that opens a transaction.
    pub fn begin_transaction_sql(self) -> &'static str {
        match self {
            Dialect::MySql | Dialect::MariaDb => "START TRANSACTION",
            Dialect::Sqlite => "BEGIN",
            Dialect::MsSql => "BEGIN TRANSACTION",
        }
    }

    /// Statement that commits the open transaction.
    pub fn commit_sql(self) -> &'static str {
        match self {
            Dialect::MsSql => "COMMIT TRANSACTION",
            _ => "COMMIT",
        }
    }

    /// Statement that rolls back the open transaction.
    pub fn rollback_sql(self) -> &'static str {
        match self {
            Dialect::MsSql => "ROLLBACK TRANSACTION",
            _ => "ROLLBACK",
        }
    }

    /// Returns the translator chain for deploy statements written in `source`.
    ///
    /// The chain is empty when `source` and `self` share a dialect family or
    /// when no translation rules exist for the pair.
    pub fn deploy_translators(self, source: Dialect) -> Vec<Translator> {
        if self.same_family(source) || !source.is_mysql_family() {
            return Vec::new();
        }
        match self {
            Dialect::Sqlite => vec![translate::mariadb_to_sqlite as Translator],
            Dialect::MsSql => vec![translate::mariadb_to_mssql as Translator],
            Dialect::MySql | Dialect::MariaDb => Vec::new(),
        }
    }

    /// Returns the translator chain for update statements written in `source`.
    ///
    /// Update chains only contain rules that are safe outside a `CREATE TABLE`.
    pub fn update_translators(self, source: Dialect) -> Vec<Translator> {
        if self.same_family(source) || !source.is_mysql_family() {
            return Vec::new();
        }
        match self {
            Dialect::Sqlite => vec![translate::mariadb_to_sqlite_update as Translator],
            Dialect::MsSql => vec![translate::mariadb_to_mssql as Translator],
            Dialect::MySql | Dialect::MariaDb => Vec::new(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = ParseDialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Dialect::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseDialectError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_dialects() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("MariaDB".parse::<Dialect>().unwrap(), Dialect::MariaDb);
        assert_eq!(" sqlite ".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert_eq!("mssql".parse::<Dialect>().unwrap(), Dialect::MsSql);
    }

    #[test]
    fn test_parse_unknown_dialect() {
        let err = "postgres".parse::<Dialect>().unwrap_err();
        assert_eq!(err, ParseDialectError("postgres".to_string()));
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn test_serde_names_match_display() {
        for dialect in Dialect::ALL {
            let yaml = serde_yaml::to_string(&dialect).unwrap();
            assert_eq!(yaml.trim(), dialect.to_string());
            let back: Dialect = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(back, dialect);
        }
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(Dialect::MySql.default_port(), Some(3306));
        assert_eq!(Dialect::MariaDb.default_port(), Some(3306));
        assert_eq!(Dialect::MsSql.default_port(), Some(1433));
        assert_eq!(Dialect::Sqlite.default_port(), None);
    }

    #[test]
    fn test_create_database_sql() {
        assert_eq!(
            Dialect::MariaDb.create_database_sql("app").as_deref(),
            Some("CREATE DATABASE IF NOT EXISTS app")
        );
        assert_eq!(
            Dialect::MsSql.create_database_sql("app").as_deref(),
            Some("IF DB_ID(N'app') IS NULL CREATE DATABASE [app]")
        );
        assert!(Dialect::Sqlite.create_database_sql("app").is_none());
    }

    #[test]
    fn test_same_family_has_no_translators() {
        assert!(Dialect::MySql.deploy_translators(Dialect::MariaDb).is_empty());
        assert!(Dialect::Sqlite.deploy_translators(Dialect::Sqlite).is_empty());
        assert!(Dialect::Sqlite.update_translators(Dialect::MySql).len() == 1);
    }

    #[test]
    fn test_non_mysql_source_has_no_translators() {
        assert!(Dialect::MsSql.deploy_translators(Dialect::Sqlite).is_empty());
        assert!(Dialect::MySql.deploy_translators(Dialect::Sqlite).is_empty());
    }
}
