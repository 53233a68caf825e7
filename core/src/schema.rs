//! Target schemas.
//!
//! A [`Shape`] is what a destination type says about itself: its scalar
//! type, or its fields and their shapes. [`Schema::build`] walks a shape into
//! a tree of [`Schema`] levels, one per record or scalar association, and
//! [`allocate`](crate::allocate::allocate) then binds result columns to each
//! level.

use std::any::type_name;
use std::collections::BTreeMap;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::{MapError, Result};
use crate::row::ColumnInfo;
use crate::target::Target;
use crate::value::ScalarType;

//------------------------------------------------------------------------------
// Shapes
//------------------------------------------------------------------------------

/// A scalar destination: its type and whether it accepts null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarKind {
    pub ty: ScalarType,
    pub nullable: bool,
}

impl ScalarKind {
    pub const fn new(ty: ScalarType) -> Self {
        Self {
            ty,
            nullable: false,
        }
    }
}

/// A record destination's type name and field list.
#[derive(Debug, Clone, Copy)]
pub struct RecordShape {
    pub type_name: &'static str,
    pub fields: fn() -> Vec<FieldDef>,
}

/// How a destination type is laid out.
#[derive(Debug, Clone)]
pub enum Shape {
    Scalar(ScalarKind),
    Record(RecordShape),
    /// A sequence of the inner shape
    Many(Box<Shape>),
}

impl Shape {
    pub const fn scalar(ty: ScalarType) -> Self {
        Shape::Scalar(ScalarKind::new(ty))
    }

    /// Record shape for `T`, with fields produced lazily so that records may
    /// name each other without recursing at construction time.
    pub fn record<T: ?Sized>(fields: fn() -> Vec<FieldDef>) -> Self {
        Shape::Record(RecordShape {
            type_name: type_name::<T>(),
            fields,
        })
    }

    pub fn many(inner: Shape) -> Self {
        Shape::Many(Box::new(inner))
    }

    /// Marks a scalar shape as accepting null. Associations are unaffected.
    pub fn nullable(self) -> Self {
        match self {
            Shape::Scalar(kind) => Shape::Scalar(ScalarKind {
                nullable: true,
                ..kind
            }),
            other => other,
        }
    }
}

/// One declared field of a record shape.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    /// Overrides the mapper's delimiter for an association's column names
    pub delimiter: Option<String>,
    pub shape: Shape,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            delimiter: None,
            shape,
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }
}

//------------------------------------------------------------------------------
// Schema tree
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// One-to-one association
    One,
    /// One-to-many association
    Many,
}

/// A field of a record schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar(ScalarKind::new(ty)),
        }
    }

    pub fn nullable(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar(ScalarKind { ty, nullable: true }),
        }
    }

    pub fn one(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::One,
        }
    }

    pub fn many(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Many,
        }
    }

    #[inline]
    pub const fn is_association(&self) -> bool {
        !matches!(self.kind, FieldKind::Scalar(_))
    }
}

/// A result column claimed by a schema level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Position in the row
    pub index: usize,
    /// Field the column feeds; `None` for a scalar schema's single column
    pub field: Option<usize>,
}

/// One level of the destination tree.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) type_name: &'static str,
    pub(crate) fields: Vec<Field>,
    pub(crate) children: BTreeMap<usize, Schema>,
    pub(crate) delimiter: String,
    pub(crate) ancestors: Vec<String>,
    pub(crate) scalar: Option<ScalarKind>,
    pub(crate) present: BTreeMap<String, Column>,
    pub(crate) owned: SmallVec<[usize; 8]>,
    /// Claimed columns that carry values into this level, by row position
    pub(crate) bindings: Vec<Column>,
}

impl Schema {
    /// A record level with no associations yet.
    pub fn record(
        type_name: &'static str,
        fields: Vec<Field>,
        delimiter: impl Into<String>,
    ) -> Self {
        Self {
            type_name,
            fields,
            children: BTreeMap::new(),
            delimiter: delimiter.into(),
            ancestors: Vec::new(),
            scalar: None,
            present: BTreeMap::new(),
            owned: SmallVec::new(),
            bindings: Vec::new(),
        }
    }

    /// A scalar level: a sequence of primitives.
    pub fn scalar(kind: ScalarKind, delimiter: impl Into<String>) -> Self {
        let mut schema = Self::record(kind.ty.name(), Vec::new(), delimiter);
        schema.scalar = Some(kind);
        schema
    }

    /// Attaches the schema of the association at field `pos`.
    pub fn with_child(mut self, pos: usize, child: Schema) -> Self {
        self.children.insert(pos, child);
        self
    }

    /// Builds the unallocated schema tree for `T`.
    ///
    /// Fails for sequences of sequences and for records that contain
    /// themselves.
    pub fn build<T: Target>(delimiter: &str) -> Result<Self> {
        Self::from_shape(&T::shape(), delimiter)
    }

    pub fn from_shape(shape: &Shape, delimiter: &str) -> Result<Self> {
        match shape {
            Shape::Scalar(kind) => Ok(Self::scalar(*kind, delimiter)),
            Shape::Record(record) => build_record(record, delimiter, delimiter, &mut Vec::new()),
            Shape::Many(_) => Err(MapError::Schema(
                "cannot map rows into a sequence of sequences".to_string(),
            )),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn child(&self, pos: usize) -> Option<&Schema> {
        self.children.get(&pos)
    }

    /// Association schemas keyed by field position, in declaration order.
    pub fn children(&self) -> impl Iterator<Item = (usize, &Schema)> {
        self.children.iter().map(|(pos, child)| (*pos, child))
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Field names from the root down to this level.
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.ancestors.is_empty()
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        self.scalar
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.scalar.is_some()
    }

    /// Columns claimed by this level, keyed by name.
    pub fn present_columns(&self) -> &BTreeMap<String, Column> {
        &self.present
    }

    /// Row positions whose values decide this level's element identity.
    pub fn owned_columns(&self) -> &[usize] {
        &self.owned
    }

    /// The last column bound to field `pos`, if any.
    pub fn binding(&self, pos: usize) -> Option<&Column> {
        if self.scalar.is_some() {
            return self.bindings.first();
        }
        self.bindings.iter().rev().find(|c| c.field == Some(pos))
    }

    /// Dotted path used in error messages.
    pub(crate) fn path(&self) -> String {
        if self.ancestors.is_empty() {
            self.type_name.to_string()
        } else {
            self.ancestors.join(".")
        }
    }
}

fn build_record(
    record: &RecordShape,
    delimiter: &str,
    default_delimiter: &str,
    stack: &mut Vec<&'static str>,
) -> Result<Schema> {
    if stack.contains(&record.type_name) {
        return Err(MapError::Schema(format!(
            "{} contains itself through {}",
            record.type_name,
            stack.join(" -> ")
        )));
    }
    stack.push(record.type_name);

    let defs = (record.fields)();
    let mut fields = Vec::with_capacity(defs.len());
    let mut children = BTreeMap::new();
    for (pos, def) in defs.iter().enumerate() {
        let child_delimiter = def.delimiter.as_deref().unwrap_or(default_delimiter);
        let kind = match &def.shape {
            Shape::Scalar(kind) => FieldKind::Scalar(*kind),
            Shape::Record(inner) => {
                let child = build_record(inner, child_delimiter, default_delimiter, stack)?;
                children.insert(pos, child);
                FieldKind::One
            }
            Shape::Many(inner) => {
                let child = match inner.as_ref() {
                    Shape::Scalar(kind) => Schema::scalar(*kind, child_delimiter),
                    Shape::Record(inner) => {
                        build_record(inner, child_delimiter, default_delimiter, stack)?
                    }
                    Shape::Many(_) => {
                        return Err(MapError::Schema(format!(
                            "field `{}` of {} is a sequence of sequences",
                            def.name, record.type_name
                        )));
                    }
                };
                children.insert(pos, child);
                FieldKind::Many
            }
        };
        fields.push(Field {
            name: def.name.clone(),
            kind,
        });
    }

    stack.pop();
    let mut schema = Schema::record(record.type_name, fields, delimiter);
    schema.children = children;
    Ok(schema)
}

//------------------------------------------------------------------------------
// Column pool
//------------------------------------------------------------------------------

/// Result columns not yet claimed by any schema level.
#[derive(Debug, Clone, Default)]
pub struct ColumnPool {
    columns: HashMap<String, usize>,
}

impl ColumnPool {
    /// Pools the result set's columns. A repeated name keeps its last position.
    pub fn new(columns: &[ColumnInfo]) -> Self {
        let columns = columns
            .iter()
            .enumerate()
            .map(|(index, info)| (info.name.clone(), index))
            .collect();
        Self { columns }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Removes and returns every column named in `candidates`, by row position.
    pub(crate) fn claim_matching<'a, I>(&mut self, candidates: I) -> Vec<Column>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut claimed: Vec<Column> = candidates
            .into_iter()
            .filter_map(|name| {
                self.columns
                    .remove_entry(name.as_str())
                    .map(|(name, index)| Column {
                        name,
                        index,
                        field: None,
                    })
            })
            .collect();
        claimed.sort_unstable_by_key(|c| c.index);
        claimed
    }

    /// Removes the only remaining column.
    pub(crate) fn take_only(&mut self) -> Option<Column> {
        if self.columns.len() != 1 {
            return None;
        }
        let name = self.columns.keys().next()?.clone();
        let index = self.columns.remove(&name)?;
        Some(Column {
            name,
            index,
            field: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Label;
    struct Post;
    struct Node;

    fn label_fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("ID", Shape::scalar(ScalarType::I64)),
            FieldDef::new("Name", Shape::scalar(ScalarType::Text).nullable()),
        ]
    }

    fn post_fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("ID", Shape::scalar(ScalarType::I64)),
            FieldDef::new("Labels", Shape::many(Shape::record::<Label>(label_fields)))
                .with_delimiter("->"),
            FieldDef::new("Tags", Shape::many(Shape::scalar(ScalarType::Text))),
        ]
    }

    fn node_fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("ID", Shape::scalar(ScalarType::I64)),
            FieldDef::new("Children", Shape::many(Shape::record::<Node>(node_fields))),
        ]
    }

    #[test]
    fn test_build_record_tree() {
        let schema = Schema::from_shape(&Shape::record::<Post>(post_fields), "_").unwrap();
        assert!(schema.type_name().ends_with("Post"));
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.fields()[1].kind, FieldKind::Many);
        assert_eq!(schema.delimiter(), "_");

        let labels = schema.child(1).unwrap();
        assert_eq!(labels.delimiter(), "->");
        assert_eq!(
            labels.fields()[1].kind,
            FieldKind::Scalar(ScalarKind {
                ty: ScalarType::Text,
                nullable: true
            })
        );

        let tags = schema.child(2).unwrap();
        assert!(tags.is_scalar());
        assert_eq!(tags.delimiter(), "_");
        assert!(schema.child(0).is_none());
    }

    #[test]
    fn test_build_rejects_recursive_records() {
        let err = Schema::from_shape(&Shape::record::<Node>(node_fields), "_").unwrap_err();
        assert!(matches!(err, MapError::Schema(msg) if msg.contains("contains itself")));
    }

    #[test]
    fn test_build_rejects_nested_sequences() {
        let err = Schema::build::<Vec<Vec<i64>>>("_").unwrap_err();
        assert!(matches!(err, MapError::Schema(_)));

        let shape = Shape::record::<Post>(|| {
            vec![FieldDef::new(
                "Grid",
                Shape::many(Shape::many(Shape::scalar(ScalarType::I64))),
            )]
        });
        assert!(Schema::from_shape(&shape, "_").is_err());
    }

    #[test]
    fn test_build_scalar_root() {
        let schema = Schema::build::<Option<String>>("_").unwrap();
        assert_eq!(
            schema.scalar_kind(),
            Some(ScalarKind {
                ty: ScalarType::Text,
                nullable: true
            })
        );
        assert!(schema.is_root());
        assert!(schema.fields().is_empty());
    }

    #[test]
    fn test_pool_claims_in_row_order() {
        let mut pool = ColumnPool::new(&[
            ColumnInfo::new("b"),
            ColumnInfo::new("a"),
            ColumnInfo::new("c"),
        ]);
        let wanted = ["c".to_string(), "a".to_string(), "missing".to_string()];
        let claimed = pool.claim_matching(&wanted);
        assert_eq!(
            claimed.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(pool.len(), 1);
        assert!(pool.contains("b"));
        assert!(pool.claim_matching(&wanted).is_empty());
    }

    #[test]
    fn test_pool_repeated_name_keeps_last_position() {
        let pool = ColumnPool::new(&[ColumnInfo::new("id"), ColumnInfo::new("id")]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.columns["id"], 1);
    }

    #[test]
    fn test_take_only() {
        let mut pool = ColumnPool::new(&[
            ColumnInfo::new("a"),
            ColumnInfo::new("b").with_decl("BIGINT"),
        ]);
        assert!(pool.take_only().is_none());
        pool.claim_matching(&["a".to_string()]);
        // declared types stay with the cells, not the claimed column
        let only = pool.take_only().unwrap();
        assert_eq!(
            only,
            Column {
                name: "b".to_string(),
                index: 1,
                field: None,
            }
        );
        assert!(pool.is_empty());
    }
}
