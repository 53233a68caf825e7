//! Column-name matching.
//!
//! A field accepts a column when the column's name is one of the field's
//! candidate spellings: the literal field name, its snake_case and lowercase
//! forms, and the same forms qualified by every suffix of the ancestor chain.

use hashbrown::HashSet;

const SNAKE_DELIMITER: char = '_';

/// Converts `name` to snake_case.
///
/// Inserts `_` at case boundaries, maps spaces and hyphens to `_`, and
/// lowercases the result. Surrounding spaces are trimmed first.
///
/// ```
/// use nestrow_core::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("UserID2"), "user_id2");
/// assert_eq!(to_snake_case("user-name"), "user_name");
/// ```
pub fn to_snake_case(name: &str) -> String {
    let trimmed = name.trim_matches(' ');
    let mut out = String::with_capacity(trimmed.len() + 4);
    let mut chars = trimmed.chars().peekable();
    let mut first = true;

    while let Some(c) = chars.next() {
        let boundary = chars.peek().is_some_and(|&next| {
            (c.is_ascii_uppercase() && next.is_ascii_lowercase())
                || (c.is_ascii_lowercase() && next.is_ascii_uppercase())
        });

        if !first && boundary && !out.ends_with(SNAKE_DELIMITER) {
            if c.is_ascii_uppercase() {
                out.push(SNAKE_DELIMITER);
                out.push(c);
            } else {
                out.push(c);
                out.push(SNAKE_DELIMITER);
            }
        } else if c == ' ' || c == '-' {
            out.push(SNAKE_DELIMITER);
        } else {
            out.push(c);
        }
        first = false;
    }

    out.to_lowercase()
}

/// Every column name a field is willing to accept.
///
/// `field` is empty for scalar schemas, which match on their ancestor chain
/// alone. `ancestors` runs from the root to the schema that owns the field.
pub fn candidates(field: &str, ancestors: &[String], delimiter: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    if !field.is_empty() {
        out.insert(field.to_string());
        out.insert(to_snake_case(field));
        out.insert(field.to_lowercase());
    }

    let mut concat = field.to_string();
    let mut snake_concat = to_snake_case(field);
    for ancestor in ancestors.iter().rev() {
        let snake_ancestor = to_snake_case(ancestor);
        if concat.is_empty() {
            concat = ancestor.clone();
            snake_concat = snake_ancestor;
        } else {
            concat = format!("{ancestor}{delimiter}{concat}");
            snake_concat = format!("{snake_ancestor}{SNAKE_DELIMITER}{snake_concat}");
        }
        out.insert(concat.to_lowercase());
        out.insert(concat.clone());
        out.insert(snake_concat.to_lowercase());
        out.insert(snake_concat.clone());
    }
    out
}
