//! Column allocation.
//!
//! Walks a schema tree top-down and hands each result column to the first
//! level that asks for it. A level asks with the candidate names of its
//! scalar fields (see [`naming::candidates`]); a scalar level asks with its
//! ancestor chain alone. Claimed columns leave the pool, so deeper levels
//! only see what their ancestors left behind.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::error::{MapError, Result};
use crate::naming;
use crate::schema::{Column, ColumnPool, FieldKind, Schema};

/// Binds columns from `pool` to `schema` and, in field order, to every
/// association below it.
///
/// A root scalar schema requires the pool to hold exactly one column. A
/// nested scalar schema requires exactly one column to match its ancestor
/// chain.
pub fn allocate(schema: &mut Schema, pool: &mut ColumnPool) -> Result<()> {
    nestrow_profile_function!();

    let mut present = BTreeMap::new();
    if schema.scalar.is_some() {
        let column = if schema.is_root() {
            pool.take_only().ok_or_else(|| MapError::ColumnCount {
                target: schema.type_name.to_string(),
                got: pool.len(),
            })?
        } else {
            let wanted = naming::candidates("", &schema.ancestors, &schema.delimiter);
            let mut matched = pool.claim_matching(&wanted);
            if matched.len() != 1 {
                return Err(MapError::AmbiguousOrMissingColumn {
                    path: schema.ancestors.join(&schema.delimiter),
                    matches: matched.len(),
                });
            }
            matched.remove(0)
        };
        present.insert(column.name.clone(), column);
    } else {
        for (pos, field) in schema.fields.iter().enumerate() {
            if !matches!(field.kind, FieldKind::Scalar(_)) {
                continue;
            }
            let wanted = naming::candidates(&field.name, &schema.ancestors, &schema.delimiter);
            for mut column in pool.claim_matching(&wanted) {
                column.field = Some(pos);
                present.insert(column.name.clone(), column);
            }
        }
    }

    let mut bindings: Vec<Column> = present
        .values()
        .filter(|c| c.field.is_none_or(|pos| !schema.children.contains_key(&pos)))
        .cloned()
        .collect();
    bindings.sort_unstable_by_key(|c| c.index);
    let owned: SmallVec<[usize; 8]> = bindings.iter().map(|c| c.index).collect();

    nestrow_trace_alloc!(&schema.ancestors, present.len(), pool.len());
    schema.present = present;
    schema.owned = owned;
    schema.bindings = bindings;

    for (pos, child) in schema.children.iter_mut() {
        let mut ancestors = schema.ancestors.clone();
        ancestors.push(schema.fields[*pos].name.clone());
        child.ancestors = ancestors;
        allocate(child, pool)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::ColumnInfo;
    use crate::schema::{Field, ScalarKind};
    use crate::value::ScalarType;

    fn pool(names: &[&str]) -> ColumnPool {
        let columns: Vec<ColumnInfo> = names.iter().map(|n| ColumnInfo::new(*n)).collect();
        ColumnPool::new(&columns)
    }

    fn present(schema: &Schema) -> Vec<&str> {
        schema.present_columns().keys().map(String::as_str).collect()
    }

    /// Blog -> Posts -> Labels, all joined on `id`/`name` style columns.
    fn blog_schema(delimiter: &str) -> Schema {
        let labels = Schema::record(
            "Label",
            vec![
                Field::scalar("ID", ScalarType::I64),
                Field::nullable("Name", ScalarType::Text),
            ],
            delimiter,
        );
        let posts = Schema::record(
            "Post",
            vec![
                Field::scalar("ID", ScalarType::I64),
                Field::scalar("Name", ScalarType::Text),
                Field::many("Labels"),
            ],
            delimiter,
        )
        .with_child(2, labels);
        Schema::record(
            "Blog",
            vec![
                Field::scalar("ID", ScalarType::I64),
                Field::scalar("Name", ScalarType::Text),
                Field::many("Posts"),
            ],
            delimiter,
        )
        .with_child(2, posts)
    }

    #[test]
    fn test_allocate_three_levels() {
        let mut schema = blog_schema("_");
        let mut pool = pool(&[
            "id",
            "name",
            "posts_id",
            "posts_name",
            "posts_labels_id",
            "posts_labels_name",
        ]);
        allocate(&mut schema, &mut pool).unwrap();
        assert!(pool.is_empty());

        assert_eq!(present(&schema), vec!["id", "name"]);
        assert_eq!(schema.owned_columns(), &[0, 1]);

        let posts = schema.child(2).unwrap();
        assert_eq!(posts.ancestors(), &["Posts".to_string()]);
        assert_eq!(present(posts), vec!["posts_id", "posts_name"]);
        assert_eq!(posts.owned_columns(), &[2, 3]);

        let labels = posts.child(2).unwrap();
        assert_eq!(
            labels.ancestors(),
            &["Posts".to_string(), "Labels".to_string()]
        );
        assert_eq!(labels.owned_columns(), &[4, 5]);
        assert_eq!(labels.binding(1).unwrap().name, "posts_labels_name");
    }

    #[test]
    fn test_claimed_columns_leave_the_pool() {
        let mut schema = blog_schema("_");
        let mut pool = pool(&["id", "name", "posts_id", "unrelated"]);
        let before = pool.len();
        allocate(&mut schema, &mut pool).unwrap();

        let claimed = schema.present_columns().len()
            + schema.child(2).unwrap().present_columns().len();
        assert_eq!(before - pool.len(), claimed);
        assert!(pool.contains("unrelated"));

        let labels = schema.child(2).unwrap().child(2).unwrap();
        assert!(labels.owned_columns().is_empty());
        assert!(labels.binding(0).is_none());
    }

    #[test]
    fn test_nearest_level_wins_bare_names() {
        // bare "name" is claimed by the root before Posts can see it
        let mut schema = blog_schema("_");
        let mut pool = pool(&["name", "id"]);
        allocate(&mut schema, &mut pool).unwrap();
        assert_eq!(schema.present_columns().len(), 2);
        assert!(schema.child(2).unwrap().present_columns().is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let mut schema = blog_schema("->");
        let mut pool = pool(&["id", "Posts->ID", "Posts->Labels->Name"]);
        allocate(&mut schema, &mut pool).unwrap();
        assert!(pool.is_empty());
        let posts = schema.child(2).unwrap();
        assert_eq!(present(posts), vec!["Posts->ID"]);
        assert_eq!(present(posts.child(2).unwrap()), vec!["Posts->Labels->Name"]);
    }

    #[test]
    fn test_root_scalar_takes_the_only_column() {
        let mut schema = Schema::scalar(ScalarKind::new(ScalarType::Text), "_");
        let mut single = pool(&["whatever"]);
        allocate(&mut schema, &mut single).unwrap();
        assert_eq!(schema.owned_columns(), &[0]);
        assert_eq!(schema.binding(0).unwrap().name, "whatever");
    }

    #[test]
    fn test_root_scalar_column_count() {
        let mut schema = Schema::scalar(ScalarKind::new(ScalarType::Text), "_");
        let err = allocate(&mut schema, &mut pool(&["a", "b"])).unwrap_err();
        assert!(matches!(err, MapError::ColumnCount { got: 2, .. }));

        let err = allocate(&mut schema, &mut pool(&[])).unwrap_err();
        assert!(matches!(err, MapError::ColumnCount { got: 0, .. }));
    }

    #[test]
    fn test_nested_scalar_association() {
        let tags = Schema::scalar(ScalarKind::new(ScalarType::Text), "_");
        let mut schema = Schema::record(
            "Post",
            vec![Field::scalar("ID", ScalarType::I64), Field::many("Tags")],
            "_",
        )
        .with_child(1, tags);
        let mut columns = pool(&["id", "tags"]);
        allocate(&mut schema, &mut columns).unwrap();
        let tags = schema.child(1).unwrap();
        assert_eq!(present(tags), vec!["tags"]);
        assert_eq!(tags.owned_columns(), &[1]);
    }

    #[test]
    fn test_nested_scalar_needs_exactly_one_column() {
        let build = || {
            Schema::record("Post", vec![Field::many("Tags")], "_")
                .with_child(0, Schema::scalar(ScalarKind::new(ScalarType::Text), "_"))
        };

        let err = allocate(&mut build(), &mut pool(&["id"])).unwrap_err();
        assert!(matches!(
            err,
            MapError::AmbiguousOrMissingColumn { matches: 0, .. }
        ));

        let err = allocate(&mut build(), &mut pool(&["tags", "Tags"])).unwrap_err();
        assert!(matches!(
            err,
            MapError::AmbiguousOrMissingColumn { matches: 2, .. }
        ));
    }

    #[test]
    fn test_several_columns_for_one_field() {
        let mut schema = Schema::record("User", vec![Field::scalar("Name", ScalarType::Text)], "_");
        let mut columns = pool(&["Name", "name"]);
        allocate(&mut schema, &mut columns).unwrap();
        assert_eq!(schema.owned_columns(), &[0, 1]);
        assert_eq!(schema.binding(0).unwrap().name, "name");
    }
}
