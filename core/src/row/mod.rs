//! Result-set plumbing: column descriptions and in-memory row sets.
//!
//! The mapper consumes a column list plus an iterator of scanned rows. Driver
//! adapters (behind their cargo features) turn a driver's rows into [`Cell`]
//! vectors; [`RowSet`] does the same for rows already held in memory.

// Driver-specific adapters
#[cfg(feature = "rusqlite")]
mod rusqlite;
#[cfg(feature = "rusqlite")]
pub use self::rusqlite::statement_columns;

use core::convert::Infallible;

use crate::value::{Cell, DeclType};

/// Name and declared type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub decl: DeclType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl: DeclType::Unknown,
        }
    }

    /// Sets the type hint from a database type name such as `"BIGINT"`.
    pub fn with_decl(mut self, decl: &str) -> Self {
        self.decl = DeclType::parse(decl);
        self
    }
}

/// Builds a `Vec<Cell>` from heterogeneous values.
///
/// ```
/// use nestrow_core::cells;
///
/// let row = cells![1_i64, "Ann", None::<i64>];
/// assert!(row[2].is_null());
/// ```
#[macro_export]
macro_rules! cells {
    () => { ::std::vec::Vec::<$crate::value::Cell>::new() };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::value::Cell::from($value)),+]
    };
}

// =============================================================================
// RowSet
// =============================================================================

/// Rows held in memory, for tests, fixtures and pre-fetched results.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Cell>>,
}

impl RowSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_columns(names.into_iter().map(ColumnInfo::new).collect())
    }

    pub fn with_columns(columns: Vec<ColumnInfo>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. Cells pick up their column's type hint when they
    /// carry none of their own.
    pub fn push(&mut self, row: Vec<Cell>) {
        let row = row
            .into_iter()
            .zip(self.columns.iter().map(|c| c.decl).chain(core::iter::repeat(DeclType::Unknown)))
            .map(|(cell, decl)| match cell.decl() {
                DeclType::Unknown => cell.with_decl(decl),
                _ => cell,
            })
            .collect();
        self.rows.push(row);
    }

    pub fn with_row(mut self, row: Vec<Cell>) -> Self {
        self.push(row);
        self
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows as an infallible row source.
    pub fn scan(&self) -> impl Iterator<Item = Result<Vec<Cell>, Infallible>> + '_ {
        self.rows.iter().cloned().map(Ok)
    }
}
