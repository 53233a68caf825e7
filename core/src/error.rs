use thiserror::Error;

/// A cell could not be coerced into the requested type.
///
/// Carries the stored representation's tag name and the requested type only,
/// never the stored payload's internals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {from} to {to}: {detail}")]
pub struct ConversionError {
    pub from: &'static str,
    pub to: &'static str,
    pub detail: String,
}

impl ConversionError {
    pub(crate) fn new(from: &'static str, to: &'static str, detail: impl Into<String>) -> Self {
        Self {
            from,
            to,
            detail: detail.into(),
        }
    }

    /// Attaches the column and field the failed conversion was feeding.
    pub fn at(self, column: &str, field: &str) -> MapError {
        MapError::Conversion {
            column: column.to_string(),
            field: field.to_string(),
            source: self,
        }
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    /// Target type cannot be described as a mappable schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// A root scalar target did not see exactly one column
    #[error(
        "when mapping to a sequence of {target}, the result set must have exactly one column (got {got})"
    )]
    ColumnCount { target: String, got: usize },

    /// A nested scalar association did not find exactly one matching column
    #[error("scalar association `{path}` expected exactly one matching column, got {matches}")]
    AmbiguousOrMissingColumn { path: String, matches: usize },

    /// A cell could not be coerced into the field's declared type
    #[error("Conversion error in column `{column}` (field `{field}`): {source}")]
    Conversion {
        column: String,
        field: String,
        #[source]
        source: ConversionError,
    },

    /// NULL scanned into a field that cannot be absent
    #[error("NULL in column `{column}` cannot be stored in non-nullable field `{field}`")]
    NullConstraint { column: String, field: String },

    /// A non-nullable field matched no result column
    #[error("field `{field}` is not bound to any result column")]
    Unbound { field: String },

    /// A row's width disagrees with the declared column list
    #[error("row has {got} values but the result set declares {expected} columns")]
    RowWidth { expected: usize, got: usize },

    /// Error reported by the row source
    #[error("Row source error: {0}")]
    Source(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl From<core::convert::Infallible> for MapError {
    fn from(never: core::convert::Infallible) -> Self {
        match never {}
    }
}

/// Result type for mapping operations
pub type Result<T> = std::result::Result<T, MapError>;
