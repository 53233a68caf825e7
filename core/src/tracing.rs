//! Tracing utilities for schema allocation and row mapping.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! Without the feature the macros only borrow their arguments, so call sites
//! need no `#[cfg]` of their own.

/// Emit a debug-level event after one schema level has claimed its columns.
///
/// ```ignore
/// nestrow_trace_alloc!(&schema.ancestors, claimed, pool.len());
/// ```
#[macro_export]
macro_rules! nestrow_trace_alloc {
    ($ancestors:expr, $claimed:expr, $remaining:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(
            ancestors = ?$ancestors,
            claimed = $claimed,
            remaining = $remaining,
            "nestrow.allocate"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (&$ancestors, &$claimed, &$remaining);
    };
}

/// Emit a debug-level event summarising one mapping call.
///
/// ```ignore
/// nestrow_trace_map!(type_name::<T>(), rows, resolver.len());
/// ```
#[macro_export]
macro_rules! nestrow_trace_map {
    ($target:expr, $rows:expr, $elements:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(
            target_type = $target,
            rows = $rows,
            elements = $elements,
            "nestrow.map"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (&$target, &$rows, &$elements);
    };
}

/// Emit a trace-level event for schema cache lookups (hit, build).
///
/// ```ignore
/// nestrow_trace_cache!("hit", type_name::<T>());
/// ```
#[macro_export]
macro_rules! nestrow_trace_cache {
    ($event:literal, $target:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(event = $event, target_type = $target, "nestrow.schema_cache");
        #[cfg(not(feature = "tracing"))]
        let _ = &$target;
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_consume_their_arguments() {
        let ancestors = vec!["posts".to_string()];
        let rows = 3usize;
        nestrow_trace_alloc!(&ancestors, 2usize, 0usize);
        nestrow_trace_map!("Post", rows, 1usize);
        nestrow_trace_cache!("hit", "Post");
        assert_eq!(ancestors.len(), 1);
    }
}
