//! Column-list builders for hand-written queries.
//!
//! [`Columns`] keeps the column list and the `?` placeholder list of a query
//! in step, so an `INSERT` never ends up with one placeholder too many.
//!
//! ```
//! use sqldeploy_core::Columns;
//!
//! let cols = Columns::from(["Fname", "Birthday", "CompanyID"]);
//! let (names, values) = cols.for_insert().unwrap();
//! let query = format!("INSERT INTO users ({names}) VALUES ({values})");
//! assert_eq!(query, "INSERT INTO users (Fname,Birthday,CompanyID) VALUES (?,?,?)");
//! ```

use std::fmt;

use thiserror::Error;

/// Errors from building a column list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnsError {
    #[error("no columns provided")]
    NoColumns,

    #[error("extra comma in column list: {0}")]
    ExtraComma(String),
}

/// An ordered list of column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns(Vec<String>);

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>) {
        self.0.push(column.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `a,b,c`
    pub fn for_select(&self) -> Result<String, ColumnsError> {
        self.check()?;
        Ok(self.0.join(","))
    }

    /// `(a,b,c, ?,?,?)`: the column list and a matching placeholder list.
    pub fn for_insert(&self) -> Result<(String, String), ColumnsError> {
        let names = self.for_select()?;
        let values = vec!["?"; self.0.len()].join(",");
        Ok((names, values))
    }

    /// `a=?,b=?,c=?`
    pub fn for_update(&self) -> Result<String, ColumnsError> {
        self.check()?;
        let mut out = self.0.join("=?,");
        out.push_str("=?");
        Ok(out)
    }

    fn check(&self) -> Result<(), ColumnsError> {
        if self.0.is_empty() {
            return Err(ColumnsError::NoColumns);
        }
        // A column that is blank or carries its own separator produces `,,`
        // or a trailing comma once joined.
        let joined = self.0.join(",");
        let stray = self
            .0
            .iter()
            .any(|c| c.trim().is_empty() || c.starts_with(',') || c.ends_with(','));
        if stray || joined.contains(",,") {
            return Err(ColumnsError::ExtraComma(joined));
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for Columns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Columns {
    fn from(columns: [S; N]) -> Self {
        columns.into_iter().collect()
    }
}

impl From<Vec<String>> for Columns {
    fn from(columns: Vec<String>) -> Self {
        Self(columns)
    }
}

/// The text of a `WHERE` clause, kept distinct from arbitrary strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Where(String);

impl Where {
    pub fn new(clause: impl Into<String>) -> Self {
        Self(clause.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Where {
    fn from(clause: &str) -> Self {
        Self::new(clause)
    }
}
