//! Dotted field path resolution.
//!
//! A field name such as `largeImage.meta` addresses a mapping nested inside the item's
//! attributes. Reads go through [`lookup`], which never creates anything; writes go
//! through [`resolve_or_create`], which materializes missing intermediate mappings.
//!
//! Precondition for writes: every segment along the path is either absent or already a
//! mapping. A segment holding any other value is reported as
//! [`MetaEditError::PathConflict`] and the root is left untouched.

use serde_json::Value;

use crate::error::{MetaEditError, Result};
use crate::model::Mapping;

/// Find the mapping at `path` without creating anything.
pub fn lookup<'a>(root: &'a Mapping, path: &str) -> Option<&'a Mapping> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = root.get(first)?.as_object()?;
    for segment in segments {
        current = current.get(segment)?.as_object()?;
    }
    Some(current)
}

/// Walk `path` from `root`, creating empty mappings for absent or `null` segments, and
/// return the innermost mapping (the one that directly holds the field's keys).
pub fn resolve_or_create<'a>(root: &'a mut Mapping, path: &str) -> Result<&'a mut Mapping> {
    check_path(root, path)?;

    let mut current = root;
    for segment in path.split('.') {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Mapping::new()));
        if slot.is_null() {
            *slot = Value::Object(Mapping::new());
        }
        current = slot
            .as_object_mut()
            .ok_or_else(|| MetaEditError::PathConflict {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
    }
    Ok(current)
}

// Validates the whole path up front so a conflict deep in the path does not leave
// freshly created intermediate mappings behind.
fn check_path(root: &Mapping, path: &str) -> Result<()> {
    let mut current = Some(root);
    for segment in path.split('.') {
        let Some(map) = current else {
            return Ok(());
        };
        current = match map.get(segment) {
            None | Some(Value::Null) => None,
            Some(Value::Object(inner)) => Some(inner),
            Some(_) => {
                return Err(MetaEditError::PathConflict {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })
            }
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> Mapping {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn resolves_existing_top_level_field() {
        let mut root = mapping(json!({"meta": {"a": "1"}}));
        let field = resolve_or_create(&mut root, "meta").unwrap();
        assert_eq!(field["a"], json!("1"));
    }

    #[test]
    fn creates_missing_intermediate_mappings() {
        let mut root = Mapping::new();
        let field = resolve_or_create(&mut root, "largeImage.meta").unwrap();
        field.insert("k".into(), json!("v"));
        assert_eq!(root, mapping(json!({"largeImage": {"meta": {"k": "v"}}})));
    }

    #[test]
    fn null_segments_are_replaced_with_mappings() {
        let mut root = mapping(json!({"meta": null}));
        resolve_or_create(&mut root, "meta").unwrap();
        assert_eq!(root["meta"], json!({}));
    }

    #[test]
    fn non_mapping_segment_is_a_conflict() {
        let mut root = mapping(json!({"largeImage": "not a mapping"}));
        let err = resolve_or_create(&mut root, "largeImage.meta").unwrap_err();
        match err {
            MetaEditError::PathConflict { segment, .. } => assert_eq!(segment, "largeImage"),
            other => panic!("Expected PathConflict, got {other:?}"),
        }
    }

    #[test]
    fn conflict_deep_in_path_leaves_root_untouched() {
        let mut root = mapping(json!({"a": {"b": 5}}));
        let before = root.clone();
        assert!(resolve_or_create(&mut root, "a.b.c").is_err());
        assert_eq!(root, before);
    }

    #[test]
    fn lookup_never_creates() {
        let root = mapping(json!({"a": {"b": {"c": 1}}}));
        assert_eq!(lookup(&root, "a.b").unwrap()["c"], json!(1));
        assert!(lookup(&root, "a.x").is_none());
        assert!(lookup(&root, "a.b.c").is_none());
    }
}
