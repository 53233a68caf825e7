//! Helpers shared by the derive implementations.

mod helpers;

pub(crate) use helpers::{extract_named_fields, parse_column_attr};
