//! # Item Stores
//!
//! The [`ItemStore`] trait is the server side of the remote persistence strategy: the
//! list controller sends it add/edit/remove requests for one metadata field and adopts
//! the item it sends back. The list never assumes how (or where) items are kept.
//!
//! ## Request Semantics
//!
//! Every request is scoped by a [`FieldTarget`] (`field` path plus the resource `path`
//! the item is served from) and either succeeds with the updated item or fails with a
//! human-readable [`MetaEditError::Persistence`] message.
//!
//! - **add**: fails if the key already exists.
//! - **edit**: same key → overwrite; renamed key → fails if the new key exists,
//!   otherwise the old key is removed and the new one written.
//! - **remove**: fails if the key does not exist.
//!
//! Keys are checked with [`validate_store_key`]: they must be non-empty, must not
//! contain `.` (it would be read as a path separator) and must not start with `$`.
//!
//! Each successful write stamps the item's `updated` time.
//!
//! ## Implementations
//!
//! - [`memory::MemoryItemStore`]: in-memory, for tests and `--no-save` style hosts.
//! - [`fs::FileItemStore`]: one JSON document per item on disk.

use chrono::Utc;
use serde_json::Value;

use crate::error::{MetaEditError, Result};
use crate::model::{FieldTarget, Item};
use crate::resolver::resolve_or_create;

pub mod fs;
pub mod memory;

pub trait ItemStore {
    /// Fetch an item as currently stored.
    fn get_item(&self, id: &str, resource: &str) -> Result<Item>;

    /// Add `key` to the field.
    fn add_metadata(
        &mut self,
        item_id: &str,
        key: &str,
        value: &Value,
        target: &FieldTarget,
    ) -> Result<Item>;

    /// Overwrite `old_key`, renaming it to `new_key` when they differ.
    fn edit_metadata(
        &mut self,
        item_id: &str,
        new_key: &str,
        old_key: &str,
        value: &Value,
        target: &FieldTarget,
    ) -> Result<Item>;

    fn remove_metadata(&mut self, item_id: &str, key: &str, target: &FieldTarget) -> Result<Item>;
}

/// Server-side key rules.
pub fn validate_store_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(MetaEditError::Persistence(
            "Metadata keys must not be empty.".to_string(),
        ));
    }
    if key.contains('.') || key.starts_with('$') {
        return Err(MetaEditError::Persistence(format!(
            "Invalid key {}: keys must not contain the \".\" character and must not begin with \"$\".",
            key
        )));
    }
    Ok(())
}

pub(crate) fn apply_add(
    item: &mut Item,
    key: &str,
    value: &Value,
    target: &FieldTarget,
) -> Result<()> {
    validate_store_key(key)?;
    let field = resolve_or_create(&mut item.attributes, &target.field)?;
    if field.contains_key(key) {
        return Err(MetaEditError::Persistence(format!(
            "{} is already a metadata key",
            key
        )));
    }
    field.insert(key.to_string(), value.clone());
    item.updated = Some(Utc::now());
    Ok(())
}

pub(crate) fn apply_edit(
    item: &mut Item,
    new_key: &str,
    old_key: &str,
    value: &Value,
    target: &FieldTarget,
) -> Result<()> {
    validate_store_key(new_key)?;
    let field = resolve_or_create(&mut item.attributes, &target.field)?;
    if new_key != old_key {
        if field.contains_key(new_key) {
            return Err(MetaEditError::Persistence(format!(
                "{} is already a metadata key",
                new_key
            )));
        }
        field.remove(old_key);
    }
    field.insert(new_key.to_string(), value.clone());
    item.updated = Some(Utc::now());
    Ok(())
}

pub(crate) fn apply_remove(item: &mut Item, key: &str, target: &FieldTarget) -> Result<()> {
    let field = resolve_or_create(&mut item.attributes, &target.field)?;
    if field.remove(key).is_none() {
        return Err(MetaEditError::Persistence(format!(
            "{} is not a metadata key",
            key
        )));
    }
    item.updated = Some(Utc::now());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item() -> Item {
        Item::new("i1").with_attribute("meta", json!({"a": "1", "b": "2"}))
    }

    #[test]
    fn key_rules() {
        assert!(validate_store_key("stain").is_ok());
        assert!(validate_store_key("with space").is_ok());
        assert!(validate_store_key("").is_err());
        assert!(validate_store_key("a.b").is_err());
        assert!(validate_store_key("$set").is_err());
    }

    #[test]
    fn add_rejects_existing_key() {
        let mut item = item();
        let err = apply_add(&mut item, "a", &json!("x"), &FieldTarget::new("meta")).unwrap_err();
        assert_eq!(err.to_string(), "a is already a metadata key");
        assert_eq!(item.field("meta").unwrap()["a"], json!("1"));
        assert!(item.updated.is_none());
    }

    #[test]
    fn add_creates_nested_field() {
        let mut item = Item::new("i1");
        apply_add(&mut item, "k", &json!(1), &FieldTarget::new("largeImage.meta")).unwrap();
        assert_eq!(item.field("largeImage.meta").unwrap()["k"], json!(1));
        assert!(item.updated.is_some());
    }

    #[test]
    fn edit_renames_and_overwrites() {
        let mut item = item();
        let target = FieldTarget::new("meta");
        apply_edit(&mut item, "a", "a", &json!("10"), &target).unwrap();
        apply_edit(&mut item, "c", "b", &json!("20"), &target).unwrap();
        assert_eq!(
            Value::Object(item.field_snapshot("meta")),
            json!({"a": "10", "c": "20"})
        );
    }

    #[test]
    fn edit_rename_onto_existing_key_fails() {
        let mut item = item();
        let before = item.clone();
        assert!(apply_edit(&mut item, "b", "a", &json!("x"), &FieldTarget::new("meta")).is_err());
        assert_eq!(item, before);
    }

    #[test]
    fn remove_missing_key_fails() {
        let mut item = item();
        let target = FieldTarget::new("meta");
        apply_remove(&mut item, "a", &target).unwrap();
        assert!(apply_remove(&mut item, "a", &target).is_err());
        assert_eq!(Value::Object(item.field_snapshot("meta")), json!({"b": "2"}));
    }
}
