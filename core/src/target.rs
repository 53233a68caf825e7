//! Destination types.
//!
//! [`Target`] is implemented by every type rows can be mapped into: the
//! primitive scalars, `Option`, `Vec` and `Box` wrappers, and records via
//! `#[derive(FromRows)]`. A target describes itself with a [`Shape`] and
//! rebuilds itself from a [`Slot`], a borrowed view of assembled elements.

use std::any::type_name;

use chrono::{DateTime, NaiveDateTime, Utc};
use compact_str::CompactString;

use crate::error::{MapError, Result};
use crate::resolver::{Element, NULL_VALUE, Resolver};
use crate::schema::{Schema, Shape};
use crate::value::{ScalarType, Value};

/// A type rows can be mapped into.
#[diagnostic::on_unimplemented(
    message = "cannot map rows into `{Self}`",
    label = "this type does not implement Target",
    note = "derive #[derive(FromRows)] on the record type"
)]
pub trait Target: Sized {
    /// Layout of the type, used to build its schema.
    fn shape() -> Shape;

    /// Rebuilds a value from assembled data.
    fn from_slot(slot: Slot<'_>) -> Result<Self>;
}

// =============================================================================
// Slots
// =============================================================================

/// Borrowed view of the data destined for one target value.
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    /// A coerced scalar and the column it came from
    Value {
        value: &'a Value,
        column: &'a str,
        field: &'a str,
    },
    /// A scalar field that no column was bound to
    Unbound { field: &'a str },
    /// One assembled record element
    Record(RecordSlot<'a>),
    /// The elements collected for an association
    Nested(NestedSlot<'a>),
}

impl<'a> Slot<'a> {
    /// Slot for one element of `schema`'s level.
    pub fn element(element: &'a Element, schema: &'a Schema) -> Self {
        if schema.is_scalar() {
            Slot::Value {
                value: element.scalar_value(),
                column: schema.binding(0).map_or("", |c| c.name.as_str()),
                field: schema.type_name(),
            }
        } else {
            Slot::Record(RecordSlot { element, schema })
        }
    }

    /// The record this slot holds. A one-to-one association yields its
    /// first element and fails when it has none.
    pub fn into_record(self, target: &str) -> Result<RecordSlot<'a>> {
        match self {
            Slot::Record(record) => Ok(record),
            Slot::Nested(nested) => match nested.first() {
                Some(slot) => slot.into_record(target),
                None => Err(nested.missing()),
            },
            Slot::Unbound { field } | Slot::Value { field, .. } => Err(MapError::Schema(format!(
                "field `{field}` holds a scalar but {target} is a record"
            ))),
        }
    }

    /// The non-null scalar this slot holds.
    pub fn into_value(self, target: &str) -> Result<&'a Value> {
        match self {
            Slot::Value { value, column, field } => {
                if value.is_null() {
                    Err(MapError::NullConstraint {
                        column: column.to_string(),
                        field: field.to_string(),
                    })
                } else {
                    Ok(value)
                }
            }
            Slot::Unbound { field } => Err(MapError::Unbound {
                field: field.to_string(),
            }),
            Slot::Nested(nested) => match nested.first() {
                Some(slot) => slot.into_value(target),
                None => Err(nested.missing()),
            },
            Slot::Record(record) => Err(MapError::Schema(format!(
                "{} cannot be read into {target}",
                record.schema.type_name()
            ))),
        }
    }

    /// `true` for data that maps to `None`.
    pub fn is_absent(&self) -> bool {
        match self {
            Slot::Value { value, .. } => value.is_null(),
            Slot::Unbound { .. } => true,
            Slot::Nested(nested) => nested.is_empty(),
            Slot::Record(_) => false,
        }
    }
}

/// One record element and its schema.
#[derive(Debug, Clone, Copy)]
pub struct RecordSlot<'a> {
    element: &'a Element,
    schema: &'a Schema,
}

impl<'a> RecordSlot<'a> {
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Slot for field `pos` of the record.
    pub fn slot(&self, pos: usize) -> Result<Slot<'a>> {
        let field = self.schema.fields().get(pos).ok_or_else(|| {
            MapError::Schema(format!(
                "{} has no field at position {pos}",
                self.schema.type_name()
            ))
        })?;
        if let Some(child) = self.schema.child(pos) {
            return Ok(Slot::Nested(NestedSlot {
                resolver: self.element.child(pos),
                schema: child,
                field: &field.name,
            }));
        }
        Ok(match self.schema.binding(pos) {
            Some(column) => Slot::Value {
                value: self.element.value(pos).unwrap_or(&NULL_VALUE),
                column: &column.name,
                field: &field.name,
            },
            None => Slot::Unbound { field: &field.name },
        })
    }

    /// Reads field `pos` as `T`.
    pub fn field<T: Target>(&self, pos: usize) -> Result<T> {
        T::from_slot(self.slot(pos)?)
    }
}

/// The elements an association collected.
#[derive(Debug, Clone, Copy)]
pub struct NestedSlot<'a> {
    resolver: Option<&'a Resolver>,
    schema: &'a Schema,
    field: &'a str,
}

impl<'a> NestedSlot<'a> {
    pub fn len(&self) -> usize {
        self.resolver.map_or(0, Resolver::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Slot<'a>> + 'a {
        let schema = self.schema;
        self.resolver
            .into_iter()
            .flat_map(|resolver| resolver.elements())
            .map(move |element| Slot::element(element, schema))
    }

    pub fn first(&self) -> Option<Slot<'a>> {
        self.iter().next()
    }

    fn missing(&self) -> MapError {
        MapError::NullConstraint {
            column: self.schema.ancestors().join(self.schema.delimiter()),
            field: self.field.to_string(),
        }
    }
}

// =============================================================================
// Scalar targets
// =============================================================================

macro_rules! impl_scalar_target {
    ($($ty:ty => $scalar:ident, |$v:ident| $extract:expr);+ $(;)?) => {
        $(
            impl Target for $ty {
                fn shape() -> Shape {
                    Shape::scalar(ScalarType::$scalar)
                }

                fn from_slot(slot: Slot<'_>) -> Result<Self> {
                    match slot.into_value(stringify!($ty))? {
                        Value::$scalar($v) => Ok($extract),
                        other => Err(mismatch(stringify!($ty), other)),
                    }
                }
            }
        )+
    };
}

impl_scalar_target! {
    bool => Bool, |v| *v;
    i8 => I8, |v| *v;
    i16 => I16, |v| *v;
    i32 => I32, |v| *v;
    i64 => I64, |v| *v;
    u8 => U8, |v| *v;
    u16 => U16, |v| *v;
    u32 => U32, |v| *v;
    u64 => U64, |v| *v;
    f32 => F32, |v| *v;
    f64 => F64, |v| *v;
    String => Text, |v| v.clone();
    CompactString => Text, |v| CompactString::from(v.as_str());
    DateTime<Utc> => Time, |v| *v;
    NaiveDateTime => Time, |v| v.naive_utc();
}

fn mismatch(target: &str, value: &Value) -> MapError {
    MapError::Schema(format!("expected {target}, found {value:?}"))
}

// =============================================================================
// Wrappers
// =============================================================================

impl<T: Target> Target for Option<T> {
    fn shape() -> Shape {
        T::shape().nullable()
    }

    fn from_slot(slot: Slot<'_>) -> Result<Self> {
        if slot.is_absent() {
            return Ok(None);
        }
        T::from_slot(slot).map(Some)
    }
}

impl<T: Target> Target for Vec<T> {
    fn shape() -> Shape {
        Shape::many(T::shape())
    }

    fn from_slot(slot: Slot<'_>) -> Result<Self> {
        match slot {
            Slot::Nested(nested) => nested.iter().map(T::from_slot).collect(),
            _ => Err(MapError::Schema(format!(
                "{} must be filled from an association",
                type_name::<Self>()
            ))),
        }
    }
}

impl<T: Target> Target for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn from_slot(slot: Slot<'_>) -> Result<Self> {
        T::from_slot(slot).map(Box::new)
    }
}

/// Builds one `T` per element of `resolver`, in first-seen order.
pub fn bind<T: Target>(schema: &Schema, resolver: &Resolver) -> Result<Vec<T>> {
    resolver
        .elements()
        .map(|element| T::from_slot(Slot::element(element, schema)))
        .collect()
}

/// Builds `T` from the first element of `resolver`, if any.
pub fn bind_first<T: Target>(schema: &Schema, resolver: &Resolver) -> Result<Option<T>> {
    resolver
        .elements()
        .next()
        .map(|element| T::from_slot(Slot::element(element, schema)))
        .transpose()
}
