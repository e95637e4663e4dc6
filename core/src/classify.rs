//! Classification of statement failures that are safe to ignore.
//!
//! Update statements are written to be re-run on every start. The second run
//! of `ALTER TABLE users ADD COLUMN Email TEXT` fails with a duplicate-column
//! error even though the schema is exactly as intended. An [`ErrorHandler`]
//! recognizes one such re-run artifact from the statement text together with
//! the driver's error message; [`should_ignore`] asks a chain of handlers and
//! accepts the first "yes".
//!
//! Statement keywords are matched as whole words against the upper-cased
//! statement, so `DROP` never matches inside an identifier like `dropoffs`.
//! Message fragments are matched against the lower-cased message (including
//! every error in its `source()` chain), so handlers work the same across
//! drivers that differ only in capitalization.

use std::error::Error;

/// Predicate deciding whether the error from running a statement is ignorable.
pub type ErrorHandler = fn(&str, &dyn Error) -> bool;

/// Returns `true` if any handler in `handlers` claims the failure.
///
/// Handlers are consulted in order and the first match short-circuits. An
/// empty chain never ignores anything.
pub fn should_ignore(statement: &str, err: &dyn Error, handlers: &[ErrorHandler]) -> bool {
    handlers.iter().any(|handler| handler(statement, err))
}

/// Every built-in handler, in the order they are documented.
pub fn default_error_handlers() -> Vec<ErrorHandler> {
    vec![
        ignore_duplicate_column,
        ignore_drop_unknown_column,
        ignore_sqlite_modify,
        ignore_index_already_exists,
        ignore_drop_does_not_exist,
        ignore_rename_does_not_exist,
    ]
}

/// Ignores `ADD COLUMN` failing because the column already exists.
pub fn ignore_duplicate_column(statement: &str, err: &dyn Error) -> bool {
    let (statement, message) = normalize(statement, err);
    has_keyword(&statement, "ADD COLUMN")
        && (message.contains("duplicate column")
            || message.contains("column names in each table must be unique"))
}

/// Ignores `DROP COLUMN` failing because the column is already gone.
pub fn ignore_drop_unknown_column(statement: &str, err: &dyn Error) -> bool {
    let (statement, message) = normalize(statement, err);
    has_keyword(&statement, "DROP COLUMN")
        && (message.contains("check that it exists")
            || message.contains("no such column")
            || message.contains("does not exist"))
}

/// Ignores SQLite rejecting `MODIFY COLUMN`, which it has no syntax for.
///
/// SQLite columns accept any value regardless of declared type, so skipping a
/// type change is usually harmless. Changing constraints requires rebuilding
/// the table instead.
pub fn ignore_sqlite_modify(statement: &str, err: &dyn Error) -> bool {
    let (statement, message) = normalize(statement, err);
    has_keyword(&statement, "MODIFY COLUMN")
        && message.contains("near \"modify\"")
        && message.contains("syntax error")
}

/// Ignores `CREATE [UNIQUE] INDEX` failing because the index exists.
pub fn ignore_index_already_exists(statement: &str, err: &dyn Error) -> bool {
    let (statement, message) = normalize(statement, err);
    (has_keyword(&statement, "CREATE INDEX") || has_keyword(&statement, "CREATE UNIQUE INDEX"))
        && (message.contains("duplicate key name") || message.contains("already exists"))
}

/// Ignores a `DROP` of something that does not exist.
pub fn ignore_drop_does_not_exist(statement: &str, err: &dyn Error) -> bool {
    let (statement, message) = normalize(statement, err);
    if !has_keyword(&statement, "DROP") {
        return false;
    }
    message.contains("check that it exists")
        || (message.contains("unknown column") && !message.contains("foreign key definition"))
}

/// Ignores renames whose source no longer exists or whose target already does.
pub fn ignore_rename_does_not_exist(statement: &str, err: &dyn Error) -> bool {
    let (statement, message) = normalize(statement, err);
    if has_keyword(&statement, "RENAME COLUMN") {
        return message.contains("unknown column") || message.contains("no such column");
    }
    if has_keyword(&statement, "RENAME TO") {
        return (message.contains("table") && message.contains("already exists"))
            || message.contains("no such table");
    }
    false
}

const NAMED: &[(&str, ErrorHandler)] = &[
    ("ignore_duplicate_column", ignore_duplicate_column),
    ("ignore_drop_unknown_column", ignore_drop_unknown_column),
    ("ignore_sqlite_modify", ignore_sqlite_modify),
    ("ignore_index_already_exists", ignore_index_already_exists),
    ("ignore_drop_does_not_exist", ignore_drop_does_not_exist),
    ("ignore_rename_does_not_exist", ignore_rename_does_not_exist),
];

/// Looks up a built-in handler by its function name.
pub fn error_handler_by_name(name: &str) -> Option<ErrorHandler> {
    NAMED
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, handler)| *handler)
}

/// Names accepted by [`error_handler_by_name`].
pub fn error_handler_names() -> impl Iterator<Item = &'static str> {
    NAMED.iter().map(|(name, _)| *name)
}

fn normalize(statement: &str, err: &dyn Error) -> (String, String) {
    (statement.to_uppercase(), error_text(err).to_lowercase())
}

/// Returns `true` if `keyword` appears in `statement` delimited on both sides
/// by something that cannot be part of an identifier.
fn has_keyword(statement: &str, keyword: &str) -> bool {
    statement.match_indices(keyword).any(|(start, _)| {
        let before = statement[..start].chars().next_back();
        let after = statement[start + keyword.len()..].chars().next();
        !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char)
    })
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '`' | '"' | '[' | ']')
}

/// Joins the messages of `err` and all of its sources.
fn error_text(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}
