//! Row consumption.
//!
//! A [`Resolver`] collects the distinct elements seen at one schema level,
//! keyed by the identity of the columns that level owns, in first-seen
//! order. Each element keeps its coerced field values and one child resolver
//! per association, so repeated parent data across joined rows folds into a
//! single element whose children accumulate.

use std::collections::BTreeMap;

use compact_str::CompactString;
use hashbrown::HashMap;

use crate::error::{MapError, Result};
use crate::schema::{Column, FieldKind, ScalarKind, Schema};
use crate::value::{Cell, Value};

/// Separates the per-column tokens of a composite identity key.
pub const KEY_SEPARATOR: char = '\u{1f}';

pub(crate) static NULL_VALUE: Value = Value::Null;

/// One assembled element: field values plus nested resolvers.
#[derive(Debug, Clone, Default)]
pub struct Element {
    values: Vec<Value>,
    children: BTreeMap<usize, Resolver>,
}

impl Element {
    fn scalar(value: Value) -> Self {
        Self {
            values: vec![value],
            children: BTreeMap::new(),
        }
    }

    /// Coerced values, one per field of the element's schema.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    /// The element's value when its schema is scalar.
    pub fn scalar_value(&self) -> &Value {
        self.values.first().unwrap_or(&NULL_VALUE)
    }

    /// Elements collected for the association at field `pos`. `None` when
    /// no row ever produced one.
    pub fn child(&self, pos: usize) -> Option<&Resolver> {
        self.children.get(&pos)
    }
}

/// Distinct elements of one schema level, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    entries: Vec<(CompactString, Element)>,
    index: HashMap<CompactString, usize>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.index.get(key).map(|&at| &self.entries[at].1)
    }

    /// Identity keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.entries.iter().map(|(_, element)| element)
    }

    fn insert(&mut self, key: CompactString, element: Element) -> usize {
        let at = self.entries.len();
        self.index.insert(key.clone(), at);
        self.entries.push((key, element));
        at
    }

    /// Appends without deduplicating. Only the root of a scalar mapping
    /// keeps repeated keys.
    fn push(&mut self, key: CompactString, element: Element) {
        if !self.index.contains_key(&key) {
            self.index.insert(key.clone(), self.entries.len());
        }
        self.entries.push((key, element));
    }
}

/// Identity key for `schema`'s element in `row`: the identity tokens of the
/// owned columns in row order. Levels that own no columns share one key.
pub fn identity_key(schema: &Schema, row: &[Cell]) -> Result<CompactString> {
    let mut key = CompactString::default();
    for (n, &index) in schema.owned.iter().enumerate() {
        if n > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(&cell_at(row, index)?.uid());
    }
    Ok(key)
}

/// Folds one row into `resolver` and, recursively, into the child resolvers
/// of the element it lands in.
///
/// Below the root, a row with null in any owned column contributes nothing
/// to that level or beneath it; sibling associations still see the row. At
/// the root every row contributes.
pub fn consume_row(schema: &Schema, row: &[Cell], resolver: &mut Resolver) -> Result<()> {
    if let Some(kind) = schema.scalar {
        return consume_scalar(schema, kind, row, resolver);
    }

    if !schema.is_root() {
        for &index in &schema.owned {
            if cell_at(row, index)?.is_null() {
                return Ok(());
            }
        }
    }

    let key = identity_key(schema, row)?;
    let at = match resolver.index.get(key.as_str()) {
        Some(&at) => at,
        None => {
            let element = populate(schema, row)?;
            resolver.insert(key, element)
        }
    };

    let element = &mut resolver.entries[at].1;
    for (&pos, child) in &schema.children {
        let nested = element.children.entry(pos).or_default();
        consume_row(child, row, nested)?;
    }
    Ok(())
}

fn consume_scalar(
    schema: &Schema,
    kind: ScalarKind,
    row: &[Cell],
    resolver: &mut Resolver,
) -> Result<()> {
    let column = schema.bindings.first().ok_or_else(|| {
        MapError::Schema(format!(
            "scalar level `{}` has no column; allocate the schema first",
            schema.path()
        ))
    })?;
    let cell = cell_at(row, column.index)?;

    if schema.is_root() {
        let value = read(cell, kind, column, schema.type_name)?;
        resolver.push(cell.uid(), Element::scalar(value));
        return Ok(());
    }

    if cell.is_null() {
        return Ok(());
    }
    let key = cell.uid();
    if !resolver.contains(&key) {
        let value = read(cell, kind, column, schema.type_name)?;
        resolver.insert(key, Element::scalar(value));
    }
    Ok(())
}

/// Coerces the bound columns of a new element into its field values.
fn populate(schema: &Schema, row: &[Cell]) -> Result<Element> {
    let mut values = vec![Value::Null; schema.fields.len()];
    for column in &schema.bindings {
        let Some(pos) = column.field else { continue };
        let field = &schema.fields[pos];
        let FieldKind::Scalar(kind) = field.kind else {
            continue;
        };
        values[pos] = read(cell_at(row, column.index)?, kind, column, &field.name)?;
    }
    Ok(Element {
        values,
        children: BTreeMap::new(),
    })
}

fn read(cell: &Cell, kind: ScalarKind, column: &Column, field: &str) -> Result<Value> {
    if cell.is_null() {
        if kind.nullable {
            return Ok(Value::Null);
        }
        return Err(MapError::NullConstraint {
            column: column.name.clone(),
            field: field.to_string(),
        });
    }
    cell.coerce(kind.ty).map_err(|e| e.at(&column.name, field))
}

#[inline]
fn cell_at(row: &[Cell], index: usize) -> Result<&Cell> {
    row.get(index).ok_or(MapError::RowWidth {
        expected: index + 1,
        got: row.len(),
    })
}
