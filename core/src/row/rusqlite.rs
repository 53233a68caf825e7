//! Row source for [`rusqlite`] statements.

use ::rusqlite::types::ValueRef;
use ::rusqlite::{Params, Row, Statement};

use crate::error::{MapError, Result};
use crate::mapper::Mapper;
use crate::row::ColumnInfo;
use crate::target::Target;
use crate::value::Cell;

impl TryFrom<ValueRef<'_>> for Cell {
    type Error = MapError;

    fn try_from(value: ValueRef<'_>) -> Result<Self> {
        let mut cell = Cell::null();
        match value {
            ValueRef::Null => {}
            ValueRef::Integer(i) => cell.set_i64(i),
            ValueRef::Real(f) => cell.set_f64(f),
            // SQLite does not enforce encodings; both TEXT and BLOB must be UTF-8 here
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                let text = core::str::from_utf8(bytes)
                    .map_err(|e| MapError::Source(format!("invalid UTF-8 in column value: {e}")))?;
                cell.set_string(text);
            }
        }
        Ok(cell)
    }
}

/// Column names of a prepared statement.
pub fn statement_columns(stmt: &Statement<'_>) -> Vec<ColumnInfo> {
    stmt.column_names().into_iter().map(ColumnInfo::new).collect()
}

fn scan(row: &Row<'_>, width: usize) -> Result<Vec<Cell>> {
    (0..width)
        .map(|idx| Cell::try_from(row.get_ref(idx)?))
        .collect()
}

/// Runs `stmt` and hands its columns and scanned rows to `f`.
fn with_rows<P, R, F>(stmt: &mut Statement<'_>, params: P, f: F) -> Result<R>
where
    P: Params,
    F: FnOnce(&[ColumnInfo], &mut dyn Iterator<Item = Result<Vec<Cell>>>) -> Result<R>,
{
    let columns = statement_columns(stmt);
    let width = columns.len();
    let mut rows = stmt.query(params)?;
    let mut source = core::iter::from_fn(move || match rows.next() {
        Ok(Some(row)) => Some(scan(row, width)),
        Ok(None) => None,
        Err(e) => Some(Err(e.into())),
    });
    f(&columns, &mut source)
}

impl Mapper {
    /// Runs `stmt` with `params` and maps its rows into `T`.
    pub fn query<T, P>(&self, stmt: &mut Statement<'_>, params: P) -> Result<Vec<T>>
    where
        T: Target + 'static,
        P: Params,
    {
        with_rows(stmt, params, |columns, rows| self.map(columns, rows))
    }

    /// Like [`query`](Self::query) but keeps only the first value.
    pub fn query_one<T, P>(&self, stmt: &mut Statement<'_>, params: P) -> Result<Option<T>>
    where
        T: Target + 'static,
        P: Params,
    {
        with_rows(stmt, params, |columns, rows| self.map_one(columns, rows))
    }
}
