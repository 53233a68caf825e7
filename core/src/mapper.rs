//! The mapping entry points.
//!
//! A [`Mapper`] owns its configuration and a [`SchemaCache`]. Mapping a result
//! set looks up (or builds and allocates) the schema for the column layout
//! and target type, folds every row into a resolver, and binds the resolved
//! elements into target values.

use std::any::type_name;
use std::sync::{Arc, LazyLock};

use crate::allocate::allocate;
use crate::cache::{SchemaCache, SchemaKey};
use crate::error::{MapError, Result};
use crate::resolver::{Resolver, consume_row};
use crate::row::ColumnInfo;
use crate::schema::{ColumnPool, Schema};
use crate::target::{Target, bind, bind_first};
use crate::value::Cell;

/// Delimiter joining ancestor names to field names in column names.
pub const DEFAULT_DELIMITER: &str = "_";

/// Mapper settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// Default delimiter for associations without their own
    pub delimiter: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// Builder for a [`Mapper`].
#[derive(Debug, Clone, Default)]
pub struct MapperBuilder {
    config: MapperConfig,
}

impl MapperBuilder {
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.delimiter = delimiter.into();
        self
    }

    pub fn build(self) -> Mapper {
        Mapper::with_config(self.config)
    }
}

/// Maps flat joined rows into nested targets.
///
/// ```
/// use nestrow_core::{Mapper, RowSet, cells};
///
/// let rows = RowSet::new(["name"]).with_row(cells!["a"]).with_row(cells!["a"]);
/// let names: Vec<String> = Mapper::new().map(rows.columns(), rows.scan()).unwrap();
/// assert_eq!(names, ["a", "a"]);
/// ```
#[derive(Debug, Default)]
pub struct Mapper {
    config: MapperConfig,
    cache: SchemaCache,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MapperBuilder {
        MapperBuilder::default()
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            config,
            cache: SchemaCache::new(),
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// The allocated schema of `T` for this column layout.
    pub fn schema<T: Target + 'static>(&self, columns: &[ColumnInfo]) -> Result<Arc<Schema>> {
        let key = SchemaKey::new::<T>(columns);
        if let Some(schema) = self.cache.lookup(&key) {
            nestrow_trace_cache!("hit", type_name::<T>());
            return Ok(schema);
        }
        self.cache.get_or_try_build(key, || {
            nestrow_profile_scope!("schema", "build");
            nestrow_trace_cache!("build", type_name::<T>());
            let mut schema = Schema::build::<T>(&self.config.delimiter)?;
            allocate(&mut schema, &mut ColumnPool::new(columns))?;
            Ok(schema)
        })
    }

    /// Maps every row into the distinct `T` values they describe, in
    /// first-seen order.
    pub fn map<T, I, E>(&self, columns: &[ColumnInfo], rows: I) -> Result<Vec<T>>
    where
        T: Target + 'static,
        I: IntoIterator<Item = std::result::Result<Vec<Cell>, E>>,
        E: Into<MapError>,
    {
        nestrow_profile_function!();
        let schema = self.schema::<T>(columns)?;
        let resolver = resolve(&schema, columns.len(), rows)?;
        bind(&schema, &resolver)
    }

    /// Like [`map`](Self::map) but keeps only the first value. All rows are
    /// still consumed, since later rows may add to its associations.
    pub fn map_one<T, I, E>(&self, columns: &[ColumnInfo], rows: I) -> Result<Option<T>>
    where
        T: Target + 'static,
        I: IntoIterator<Item = std::result::Result<Vec<Cell>, E>>,
        E: Into<MapError>,
    {
        nestrow_profile_function!();
        let schema = self.schema::<T>(columns)?;
        let resolver = resolve(&schema, columns.len(), rows)?;
        bind_first(&schema, &resolver)
    }
}

/// Folds `rows` into a resolver for `schema`, checking each row is `width`
/// cells wide.
pub fn resolve<I, E>(schema: &Schema, width: usize, rows: I) -> Result<Resolver>
where
    I: IntoIterator<Item = std::result::Result<Vec<Cell>, E>>,
    E: Into<MapError>,
{
    let mut resolver = Resolver::new();
    let mut seen = 0usize;
    for row in rows {
        let row = row.map_err(Into::into)?;
        if row.len() != width {
            return Err(MapError::RowWidth {
                expected: width,
                got: row.len(),
            });
        }
        consume_row(schema, &row, &mut resolver)?;
        seen += 1;
    }
    nestrow_trace_map!(schema.type_name(), seen, resolver.len());
    Ok(resolver)
}

static DEFAULT_MAPPER: LazyLock<Mapper> = LazyLock::new(Mapper::new);

/// The process-wide mapper behind [`map`] and [`map_one`].
pub fn default_mapper() -> &'static Mapper {
    &DEFAULT_MAPPER
}

/// [`Mapper::map`] on the default mapper.
pub fn map<T, I, E>(columns: &[ColumnInfo], rows: I) -> Result<Vec<T>>
where
    T: Target + 'static,
    I: IntoIterator<Item = std::result::Result<Vec<Cell>, E>>,
    E: Into<MapError>,
{
    DEFAULT_MAPPER.map(columns, rows)
}

/// [`Mapper::map_one`] on the default mapper.
pub fn map_one<T, I, E>(columns: &[ColumnInfo], rows: I) -> Result<Option<T>>
where
    T: Target + 'static,
    I: IntoIterator<Item = std::result::Result<Vec<Cell>, E>>,
    E: Into<MapError>,
{
    DEFAULT_MAPPER.map_one(columns, rows)
}
