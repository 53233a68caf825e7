//! # nestrow
//!
//! Maps the flat rows of a SQL join into nested Rust structs.
//!
//! Columns are matched to fields by name. Rows that repeat the same parent
//! data fold into one parent whose `Vec` fields collect the distinct children
//! from every row, at any depth.
//!
//! ## Quick Start
//!
//! ```rust
//! use nestrow::prelude::*;
//!
//! #[derive(Debug, FromRows)]
//! struct Blog {
//!     id: i64,
//!     title: String,
//!     posts: Vec<Post>,
//! }
//!
//! #[derive(Debug, FromRows)]
//! struct Post {
//!     id: i64,
//!     body: Option<String>,
//! }
//!
//! # fn main() -> nestrow::Result<()> {
//! let rows = RowSet::new(["id", "title", "posts_id", "posts_body"])
//!     .with_row(cells![1_i64, "Rust", 10_i64, "ownership"])
//!     .with_row(cells![1_i64, "Rust", 11_i64, "borrowing"])
//!     .with_row(cells![2_i64, "SQL", None::<i64>, None::<String>]);
//!
//! let blogs: Vec<Blog> = nestrow::map(rows.columns(), rows.scan())?;
//! assert_eq!(blogs.len(), 2);
//! assert_eq!(blogs[0].posts.len(), 2);
//! assert!(blogs[1].posts.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Column matching
//!
//! A field accepts a column named after the field itself, its snake_case or
//! lowercase form, or any of those prefixed by the names of the association
//! fields leading to it, joined with the delimiter (`_` unless configured
//! through [`Mapper::builder`] or `#[column(delimiter = "...")]`). Each column
//! is claimed by the shallowest level that matches it.
//!
//! ## Drivers
//!
//! | Driver   | Feature Flag |
//! |----------|--------------|
//! | rusqlite | `rusqlite`   |
//!
//! Any other source works through [`Mapper::map`] with a column list and an
//! iterator of [`Cell`] rows.

// The derive names items through `::nestrow`
extern crate self as nestrow;

pub use nestrow_core::{
    allocate, cache, error, mapper, naming, resolver, row, schema, target, value,
};

pub use nestrow_core::{
    Cell, ColumnInfo, ConversionError, DEFAULT_DELIMITER, DeclType, Element, FieldDef, FieldKind,
    MapError, Mapper, MapperBuilder, MapperConfig, NestedSlot, RecordSlot, Resolver, Result,
    RowSet, ScalarKind, ScalarType, Schema, SchemaCache, SchemaKey, Shape, Slot, Target, Value,
    cells, default_mapper, map, map_one,
};
pub use nestrow_macros::FromRows;

/// Runs `stmt` on the default mapper and maps its rows into `T`.
#[cfg(feature = "rusqlite")]
pub fn query<T, P>(stmt: &mut rusqlite::Statement<'_>, params: P) -> Result<Vec<T>>
where
    T: Target + 'static,
    P: rusqlite::Params,
{
    default_mapper().query(stmt, params)
}

/// Runs `stmt` on the default mapper and keeps the first value.
#[cfg(feature = "rusqlite")]
pub fn query_one<T, P>(stmt: &mut rusqlite::Statement<'_>, params: P) -> Result<Option<T>>
where
    T: Target + 'static,
    P: rusqlite::Params,
{
    default_mapper().query_one(stmt, params)
}

/// Import this to derive and map.
pub mod prelude {
    pub use crate::{
        Cell, ColumnInfo, FromRows, MapError, Mapper, RowSet, Target, cells,
    };
}
