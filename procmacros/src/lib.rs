#![recursion_limit = "128"]

extern crate proc_macro;

mod common;
mod from_rows;
mod paths;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `nestrow::Target` for a struct with named fields, so joined rows
/// can be mapped into it.
///
/// Scalar fields match result columns by name (the field name, its
/// snake_case and lowercase forms, optionally prefixed by the ancestor
/// fields). `Vec<T>` fields are one-to-many associations and record-typed
/// fields are one-to-one associations.
///
/// # Field attributes
///
/// - `#[column(name = "...")]` matches columns against this name instead of
///   the field's identifier
/// - `#[column(delimiter = "...")]` joins ancestor and field names of an
///   association's columns with this delimiter
///
/// # Example
///
/// ```ignore
/// use nestrow::FromRows;
///
/// #[derive(FromRows)]
/// struct Blog {
///     id: i64,
///     #[column(name = "title")]
///     name: String,
///     posts: Vec<Post>,
/// }
///
/// #[derive(FromRows)]
/// struct Post {
///     id: i64,
///     body: Option<String>,
/// }
/// ```
#[proc_macro_derive(FromRows, attributes(column))]
pub fn derive_from_rows(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match from_rows::generate_from_rows(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
