//! Scanned column values and their coercions.
//!
//! A [`Cell`] holds one column's value for one row exactly as the driver
//! produced it. Typed getters coerce it on demand, [`Cell::as_dynamic`] widens
//! or narrows it to the declared column type, and [`Cell::uid`] reduces it to
//! a stable identity token.

mod convert;
mod uid;

use chrono::{DateTime, Utc};
use compact_str::CompactString;

pub use uid::{FALSE_UID, NULL_UID, TRUE_UID};

use crate::error::ConversionError;

//------------------------------------------------------------------------------
// Declared column types
//------------------------------------------------------------------------------

/// Column type hint captured from the result set's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeclType {
    /// No usable metadata; values keep their scanned representation
    #[default]
    Unknown,
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Text,
    Timestamp,
}

impl DeclType {
    /// Parses a database type name such as `INT`, `BIGINT UNSIGNED` or
    /// `VARCHAR(255)`.
    pub fn parse(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let unsigned = upper.contains("UNSIGNED");
        let base = upper
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        match base {
            "BOOL" | "BOOLEAN" | "BIT" => Self::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INT2" | "INT4" | "INTEGER"
            | "SERIAL" => {
                if unsigned {
                    Self::Uint32
                } else {
                    Self::Int32
                }
            }
            "BIGINT" | "INT8" | "BIGSERIAL" => {
                if unsigned {
                    Self::Uint64
                } else {
                    Self::Int64
                }
            }
            "FLOAT" | "FLOAT4" => Self::Float32,
            "REAL" | "DOUBLE" | "FLOAT8" | "NUMERIC" | "DECIMAL" => Self::Float64,
            "TEXT" | "VARCHAR" | "CHAR" | "CHARACTER" | "NVARCHAR" | "NCHAR" | "CLOB"
            | "STRING" | "UUID" => Self::Text,
            "DATE" | "DATETIME" | "TIMESTAMP" | "TIMESTAMPTZ" => Self::Timestamp,
            _ => Self::Unknown,
        }
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::Uint32 | Self::Uint64)
    }
}

//------------------------------------------------------------------------------
// Scalar types and coerced values
//------------------------------------------------------------------------------

/// Primitive field types a cell can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Text,
    Time,
}

impl ScalarType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Text => "text",
            Self::Time => "timestamp",
        }
    }
}

/// A typed value: either a coerced field value or the result of
/// [`Cell::as_dynamic`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl Value {
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

//------------------------------------------------------------------------------
// Cell
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
enum Payload {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(CompactString),
    Time(DateTime<Utc>),
}

/// One scanned column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    decl: DeclType,
    payload: Payload,
}

impl Cell {
    /// Creates a null cell for a column with the given type hint.
    pub const fn new(decl: DeclType) -> Self {
        Self {
            decl,
            payload: Payload::Null,
        }
    }

    pub const fn null() -> Self {
        Self::new(DeclType::Unknown)
    }

    /// Replaces the declared type hint, keeping the payload.
    pub fn with_decl(mut self, decl: DeclType) -> Self {
        self.decl = decl;
        self
    }

    pub const fn decl(&self) -> DeclType {
        self.decl
    }

    /// `false` only for null cells.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        !matches!(self.payload, Payload::Null)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        !self.is_valid()
    }

    /// Name of the stored representation, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self.payload {
            Payload::Null => "null",
            Payload::Bool(_) => "bool",
            Payload::Int(_) => "integer",
            Payload::Float(_) => "float",
            Payload::Text(_) => "text",
            Payload::Time(_) => "timestamp",
        }
    }

    pub fn set_null(&mut self) {
        self.payload = Payload::Null;
    }

    pub fn set_bool(&mut self, value: bool) {
        self.payload = Payload::Bool(value);
    }

    pub fn set_i64(&mut self, value: i64) {
        self.payload = Payload::Int(value);
    }

    pub fn set_f64(&mut self, value: f64) {
        self.payload = Payload::Float(value);
    }

    pub fn set_string(&mut self, value: impl Into<CompactString>) {
        self.payload = Payload::Text(value.into());
    }

    pub fn set_time(&mut self, value: DateTime<Utc>) {
        self.payload = Payload::Time(value);
    }

    /// Coerces the cell into `ty`, mapping null to [`Value::Null`].
    pub fn coerce(&self, ty: ScalarType) -> Result<Value, ConversionError> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        Ok(match ty {
            ScalarType::Bool => Value::Bool(self.to_bool()?),
            ScalarType::I8 => Value::I8(self.narrow_signed(ty)?),
            ScalarType::I16 => Value::I16(self.narrow_signed(ty)?),
            ScalarType::I32 => Value::I32(self.to_i32()?),
            ScalarType::I64 => Value::I64(self.to_i64()?),
            ScalarType::U8 => Value::U8(self.narrow_unsigned(ty)?),
            ScalarType::U16 => Value::U16(self.narrow_unsigned(ty)?),
            ScalarType::U32 => Value::U32(self.to_u32()?),
            ScalarType::U64 => Value::U64(self.to_u64()?),
            ScalarType::F32 => Value::F32(self.to_f32()?),
            ScalarType::F64 => Value::F64(self.to_f64()?),
            ScalarType::Text => Value::Text(self.to_text()?),
            ScalarType::Time => Value::Time(self.to_time()?),
        })
    }

    /// Returns the value at the width implied by the declared column type.
    ///
    /// Without a usable hint the stored representation is returned as is.
    pub fn as_dynamic(&self) -> Result<Value, ConversionError> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        let ty = match self.decl {
            DeclType::Bool => ScalarType::Bool,
            DeclType::Int32 => ScalarType::I32,
            DeclType::Int64 => ScalarType::I64,
            DeclType::Uint32 => ScalarType::U32,
            DeclType::Uint64 => ScalarType::U64,
            DeclType::Float32 => ScalarType::F32,
            DeclType::Float64 => ScalarType::F64,
            DeclType::Text => ScalarType::Text,
            DeclType::Timestamp => ScalarType::Time,
            DeclType::Unknown => match self.payload {
                Payload::Null => return Ok(Value::Null),
                Payload::Bool(_) => ScalarType::Bool,
                Payload::Int(_) => ScalarType::I64,
                Payload::Float(_) => ScalarType::F64,
                Payload::Text(_) => ScalarType::Text,
                Payload::Time(_) => ScalarType::Time,
            },
        };
        self.coerce(ty)
    }
}

macro_rules! impl_cell_from {
    ($($ty:ty => |$v:ident| $decl:expr, $payload:expr);+ $(;)?) => {
        $(
            impl From<$ty> for Cell {
                fn from($v: $ty) -> Self {
                    Self {
                        decl: $decl,
                        payload: $payload,
                    }
                }
            }
        )+
    };
}

impl_cell_from! {
    bool => |v| DeclType::Bool, Payload::Bool(v);
    i8 => |v| DeclType::Int32, Payload::Int(v as i64);
    i16 => |v| DeclType::Int32, Payload::Int(v as i64);
    i32 => |v| DeclType::Int32, Payload::Int(v as i64);
    i64 => |v| DeclType::Int64, Payload::Int(v);
    u8 => |v| DeclType::Uint32, Payload::Int(v as i64);
    u16 => |v| DeclType::Uint32, Payload::Int(v as i64);
    u32 => |v| DeclType::Uint32, Payload::Int(v as i64);
    u64 => |v| DeclType::Uint64, Payload::Int(v as i64);
    f32 => |v| DeclType::Float32, Payload::Float(v as f64);
    f64 => |v| DeclType::Float64, Payload::Float(v);
    &str => |v| DeclType::Text, Payload::Text(CompactString::from(v));
    String => |v| DeclType::Text, Payload::Text(CompactString::from(v));
    DateTime<Utc> => |v| DeclType::Timestamp, Payload::Time(v);
}

impl<T> From<Option<T>> for Cell
where
    Cell: From<T>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Cell::null, Cell::from)
    }
}
