//! Attribute parsing and input validation for derive macros.

use syn::{Data, DeriveInput, Error, Field, Fields, LitStr, Result};

/// Settings from a field's `#[column(...)]` attribute.
#[derive(Debug, Default)]
pub(crate) struct ColumnAttr {
    /// Name matched against result columns instead of the field's ident
    pub name: Option<LitStr>,
    /// Delimiter for the columns of an association field
    pub delimiter: Option<LitStr>,
}

/// Parse `#[column(name = "...", delimiter = "...")]` from a field.
///
/// # Example
///
/// ```ignore
/// #[derive(FromRows)]
/// struct Post {
///     #[column(name = "post_id")]
///     id: i64,
///     #[column(delimiter = "->")]
///     labels: Vec<Label>,
/// }
/// ```
pub(crate) fn parse_column_attr(field: &Field) -> Result<ColumnAttr> {
    let mut out = ColumnAttr::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("column")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(Error::new_spanned(&lit, "column name cannot be empty"));
                }
                out.name = Some(lit);
                Ok(())
            } else if meta.path.is_ident("delimiter") {
                out.delimiter = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"` or `delimiter = \"...\"`"))
            }
        })?;
    }
    Ok(out)
}

/// Extract the named fields of a struct.
///
/// # Errors
///
/// Returns an error for tuple structs, unit structs, enums and unions.
pub(crate) fn extract_named_fields(
    input: &DeriveInput,
) -> Result<&syn::punctuated::Punctuated<Field, syn::token::Comma>> {
    let struct_name = &input.ident;
    match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => Ok(&fields.named),
            Fields::Unnamed(_) => Err(Error::new_spanned(
                struct_name,
                "FromRows needs named fields to match against column names",
            )),
            Fields::Unit => Err(Error::new_spanned(
                struct_name,
                "FromRows cannot be derived for unit structs",
            )),
        },
        _ => Err(Error::new_spanned(
            struct_name,
            "FromRows can only be derived for structs",
        )),
    }
}
