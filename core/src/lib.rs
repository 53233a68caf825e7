//! Core of nestrow: cells, schemas, column allocation, row resolution and
//! the [`Mapper`] that ties them together.

#[macro_use]
mod tracing;
#[macro_use]
pub mod profiling;

pub mod allocate;
pub mod cache;
pub mod error;
pub mod mapper;
pub mod naming;
pub mod resolver;
pub mod row;
pub mod schema;
pub mod target;
pub mod value;

// Re-export key types and traits
pub use cache::{SchemaCache, SchemaKey};
pub use error::{ConversionError, MapError, Result};
pub use mapper::{
    DEFAULT_DELIMITER, Mapper, MapperBuilder, MapperConfig, default_mapper, map, map_one,
};
pub use resolver::{Element, Resolver};
pub use row::{ColumnInfo, RowSet};
pub use schema::{FieldDef, FieldKind, ScalarKind, Schema, Shape};
pub use target::{NestedSlot, RecordSlot, Slot, Target};
pub use value::{Cell, DeclType, ScalarType, Value};
