//! Textual translation of DDL statements between SQL dialects.
//!
//! Statements are authored once, in a MySQL/MariaDB flavor, and rewritten for
//! the dialect actually being deployed to. Each rule is a plain
//! [`Translator`] function that recognizes one construct by exact,
//! case-sensitive substring matching and rewrites only that span; everything
//! else, including whitespace and newlines, is left as written. A rule that
//! finds nothing to rewrite returns its input unchanged, so a statement that
//! is already valid for the target passes through a chain untouched.
//!
//! Rules are composed into ordered chains and applied with [`translate`].
//! Order matters: [`remove_primary_key_clause`] must run after
//! [`reformat_id_column`] has moved the primary key onto the column.
//!
//! # Examples
//!
//! ```
//! use sqldeploy_core::translate::{self, Translator};
//!
//! let chain: &[Translator] = &[translate::mariadb_to_sqlite];
//! let out = translate::translate(
//!     "CREATE TABLE t (ID INT NOT NULL AUTO_INCREMENT, Name VARCHAR(20), PRIMARY KEY(ID))",
//!     chain,
//! );
//! assert_eq!(
//!     out,
//!     "CREATE TABLE t (ID INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, Name TEXT )"
//! );
//! ```

/// A pure rewrite rule from one statement to another.
///
/// Translators never fail and always produce exactly one statement.
pub type Translator = fn(&str) -> String;

/// Runs `statement` through every rule of `chain`, in order.
pub fn translate(statement: &str, chain: &[Translator]) -> String {
    chain
        .iter()
        .fold(statement.to_string(), |current, rule| rule(&current))
}

const PRIMARY_KEY_CLAUSE: &str = "PRIMARY KEY(ID)";

// ---------------------------------------------------------------------------
// MySQL/MariaDB -> SQLite
// ---------------------------------------------------------------------------

/// Replaces ` INT ` with ` INTEGER `.
///
/// SQLite treats `INTEGER` as the canonical integer type. The surrounding
/// spaces keep the rule from firing inside identifiers such as `IntColumn`.
pub fn int_to_integer(statement: &str) -> String {
    statement.replace(" INT ", " INTEGER ")
}

/// Rewrites the first auto-increment `ID` column into SQLite's inline
/// `INTEGER PRIMARY KEY AUTOINCREMENT` form.
///
/// Both `ID INT ...` and the already widened `ID INTEGER ...` spellings are
/// recognized so the rule works with or without [`int_to_integer`] before it.
pub fn reformat_id_column(statement: &str) -> String {
    const AFTER: &str = "ID INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL";
    for before in [
        "ID INTEGER NOT NULL AUTO_INCREMENT",
        "ID INT NOT NULL AUTO_INCREMENT",
    ] {
        if statement.contains(before) {
            return statement.replacen(before, AFTER, 1);
        }
    }
    statement.to_string()
}

/// Removes the table-level `PRIMARY KEY(ID)` clause and the comma before it.
///
/// The comma is located in the untouched input, as the last `,` before the
/// clause, and deleted first; the clause text is removed afterwards. Removing
/// only the clause would leave a dangling comma before the closing
/// parenthesis.
pub fn remove_primary_key_clause(statement: &str) -> String {
    let Some(clause_start) = statement.find(PRIMARY_KEY_CLAUSE) else {
        return statement.to_string();
    };

    let without_comma = match statement[..clause_start].rfind(',') {
        Some(comma) => {
            let mut out = String::with_capacity(statement.len());
            out.push_str(&statement[..comma]);
            out.push_str(&statement[comma + 1..]);
            out
        }
        None => statement.to_string(),
    };

    without_comma.replacen(PRIMARY_KEY_CLAUSE, "", 1)
}

/// Replaces every `DEFAULT UTC_TIMESTAMP` with `DEFAULT CURRENT_TIMESTAMP`.
///
/// SQLite has no `UTC_TIMESTAMP`; its `CURRENT_TIMESTAMP` is already UTC.
pub fn utc_timestamp_default(statement: &str) -> String {
    statement.replace("DEFAULT UTC_TIMESTAMP", "DEFAULT CURRENT_TIMESTAMP")
}

/// Replaces every `DATETIME` with `TEXT`.
///
/// Values in a `DATETIME`-affinity column come back from drivers reformatted
/// (`yyyy-mm-ddThh:mm:ssZ`); stored as `TEXT` they are returned as written.
pub fn datetime_to_text(statement: &str) -> String {
    statement.replace("DATETIME", "TEXT")
}

/// Replaces every ` DATE` with ` TEXT`.
pub fn date_to_text(statement: &str) -> String {
    statement.replace(" DATE", " TEXT")
}

/// Replaces every ` TIME` with ` TEXT`.
pub fn time_to_text(statement: &str) -> String {
    statement.replace(" TIME", " TEXT")
}

/// Collapses `TINYBLOB`, `MEDIUMBLOB` and `LONGBLOB` into `BLOB`.
pub fn blob_tiers_to_blob(statement: &str) -> String {
    statement
        .replace("TINYBLOB", "BLOB")
        .replace("MEDIUMBLOB", "BLOB")
        .replace("LONGBLOB", "BLOB")
}

/// Replaces every `VARCHAR(...)` declaration with `TEXT`.
pub fn varchar_to_text(statement: &str) -> String {
    erase_width(statement, "VARCHAR", "TEXT")
}

/// Replaces every `DECIMAL(...)` declaration with `REAL`.
pub fn decimal_to_real(statement: &str) -> String {
    erase_width(statement, "DECIMAL", "REAL")
}

/// Replaces ` BOOLEAN` and ` BOOL` with ` INTEGER`.
pub fn bool_to_integer(statement: &str) -> String {
    statement
        .replace(" BOOLEAN", " INTEGER")
        .replace(" BOOL", " INTEGER")
}

/// Translates a MySQL/MariaDB `CREATE TABLE` or `ALTER TABLE` into SQLite.
pub fn mariadb_to_sqlite(statement: &str) -> String {
    const CHAIN: &[Translator] = &[
        int_to_integer,
        reformat_id_column,
        remove_primary_key_clause,
        utc_timestamp_default,
        datetime_to_text,
        blob_tiers_to_blob,
        varchar_to_text,
        decimal_to_real,
        bool_to_integer,
        date_to_text,
        time_to_text,
    ];
    translate(statement, CHAIN)
}

/// Translates a MySQL/MariaDB `ALTER TABLE` (or other non-`CREATE`
/// statement) into SQLite.
///
/// Same as [`mariadb_to_sqlite`] minus the primary-key rules, which only make
/// sense against a full column list.
pub fn mariadb_to_sqlite_update(statement: &str) -> String {
    const CHAIN: &[Translator] = &[
        int_to_integer,
        utc_timestamp_default,
        datetime_to_text,
        blob_tiers_to_blob,
        varchar_to_text,
        decimal_to_real,
        bool_to_integer,
        date_to_text,
        time_to_text,
    ];
    translate(statement, CHAIN)
}

// ---------------------------------------------------------------------------
// MySQL/MariaDB -> MS SQL Server
// ---------------------------------------------------------------------------

/// Replaces every `AUTO_INCREMENT` with `IDENTITY(1,1)`.
pub fn auto_increment_to_identity(statement: &str) -> String {
    statement.replace("AUTO_INCREMENT", "IDENTITY(1,1)")
}

/// Replaces every `DEFAULT UTC_TIMESTAMP` with `DEFAULT GETUTCDATE()`.
pub fn utc_timestamp_to_getutcdate(statement: &str) -> String {
    statement.replace("DEFAULT UTC_TIMESTAMP", "DEFAULT GETUTCDATE()")
}

/// Replaces every `DATETIME` that is not already `DATETIME2` with `DATETIME2`.
pub fn datetime_to_datetime2(statement: &str) -> String {
    const KEYWORD: &str = "DATETIME";
    let mut out = String::with_capacity(statement.len() + 8);
    let mut rest = statement;
    while let Some(idx) = rest.find(KEYWORD) {
        let end = idx + KEYWORD.len();
        out.push_str(&rest[..end]);
        if !rest[end..].starts_with('2') {
            out.push('2');
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Replaces ` BOOLEAN` and ` BOOL` with ` BIT`.
pub fn bool_to_bit(statement: &str) -> String {
    statement.replace(" BOOLEAN", " BIT").replace(" BOOL", " BIT")
}

/// Replaces every blob type, tiered or not, with `VARBINARY(MAX)`.
pub fn blob_to_varbinary(statement: &str) -> String {
    blob_tiers_to_blob(statement).replace("BLOB", "VARBINARY(MAX)")
}

/// Translates a MySQL/MariaDB `CREATE TABLE` or `ALTER TABLE` into T-SQL.
pub fn mariadb_to_mssql(statement: &str) -> String {
    const CHAIN: &[Translator] = &[
        auto_increment_to_identity,
        utc_timestamp_to_getutcdate,
        datetime_to_datetime2,
        bool_to_bit,
        blob_to_varbinary,
    ];
    translate(statement, CHAIN)
}

// ---------------------------------------------------------------------------
// Lookup by name
// ---------------------------------------------------------------------------

const NAMED: &[(&str, Translator)] = &[
    ("mariadb_to_sqlite", mariadb_to_sqlite),
    ("mariadb_to_sqlite_update", mariadb_to_sqlite_update),
    ("mariadb_to_mssql", mariadb_to_mssql),
    ("int_to_integer", int_to_integer),
    ("reformat_id_column", reformat_id_column),
    ("remove_primary_key_clause", remove_primary_key_clause),
    ("utc_timestamp_default", utc_timestamp_default),
    ("datetime_to_text", datetime_to_text),
    ("date_to_text", date_to_text),
    ("time_to_text", time_to_text),
    ("blob_tiers_to_blob", blob_tiers_to_blob),
    ("varchar_to_text", varchar_to_text),
    ("decimal_to_real", decimal_to_real),
    ("bool_to_integer", bool_to_integer),
    ("auto_increment_to_identity", auto_increment_to_identity),
    ("utc_timestamp_to_getutcdate", utc_timestamp_to_getutcdate),
    ("datetime_to_datetime2", datetime_to_datetime2),
    ("bool_to_bit", bool_to_bit),
    ("blob_to_varbinary", blob_to_varbinary),
];

/// Looks up a built-in translator by its function name.
pub fn translator_by_name(name: &str) -> Option<Translator> {
    NAMED
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, rule)| *rule)
}

/// Names accepted by [`translator_by_name`].
pub fn translator_names() -> impl Iterator<Item = &'static str> {
    NAMED.iter().map(|(name, _)| *name)
}

/// Replaces each `KEYWORD(...)` span with `replacement` until none remain.
///
/// The span ends at the first `)` after the keyword; width arguments never
/// nest. A keyword with no closing parenthesis is replaced on its own.
fn erase_width(statement: &str, keyword: &str, replacement: &str) -> String {
    let mut out = statement.to_string();
    while let Some(start) = out.find(keyword) {
        let end = match out[start..].find(')') {
            Some(close) => start + close + 1,
            None => start + keyword.len(),
        };
        out.replace_range(start..end, replacement);
    }
    out
}
