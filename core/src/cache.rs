//! Allocated schemas, memoized per result-set layout and target type.

use std::any::TypeId;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;

use crate::error::Result;
use crate::row::ColumnInfo;
use crate::schema::Schema;

/// Cache key: the ordered column names and the target type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    columns: Vec<String>,
    target: TypeId,
}

impl SchemaKey {
    pub fn new<T: 'static>(columns: &[ColumnInfo]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.name.clone()).collect(),
            target: TypeId::of::<T>(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Thread-safe map from [`SchemaKey`] to an allocated [`Schema`].
///
/// Each key is built at most once; racing callers for the same key wait on
/// the lock and then share the first build.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: Mutex<HashMap<SchemaKey, Arc<Schema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SchemaKey, Arc<Schema>>> {
        // entries are only ever inserted whole, so a poisoned map is still sound
        self.schemas.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lookup(&self, key: &SchemaKey) -> Option<Arc<Schema>> {
        self.lock().get(key).cloned()
    }

    /// Stores `schema` unless the key is already present, and returns the
    /// cached entry.
    pub fn store(&self, key: SchemaKey, schema: Schema) -> Arc<Schema> {
        self.lock()
            .entry(key)
            .or_insert_with(|| Arc::new(schema))
            .clone()
    }

    /// Returns the cached schema for `key`, building and storing it first if
    /// needed. A failed build stores nothing.
    pub fn get_or_try_build<F>(&self, key: SchemaKey, build: F) -> Result<Arc<Schema>>
    where
        F: FnOnce() -> Result<Schema>,
    {
        let mut schemas = self.lock();
        if let Some(schema) = schemas.get(&key) {
            return Ok(Arc::clone(schema));
        }
        let schema = Arc::new(build()?);
        schemas.insert(key, Arc::clone(&schema));
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
