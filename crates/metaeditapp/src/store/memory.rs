use serde_json::Value;
use std::collections::HashMap;

use super::{apply_add, apply_edit, apply_remove, ItemStore};
use crate::error::{MetaEditError, Result};
use crate::model::{FieldTarget, Item};

/// In-memory item store.
///
/// Items are keyed by `(resource, id)`. Requests work on a copy of the item and only
/// commit it when the whole request succeeded.
#[derive(Debug, Default, Clone)]
pub struct MemoryItemStore {
    items: HashMap<(String, String), Item>,
    fail_with: Option<String>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.insert(item);
        self
    }

    /// Store an item under the default `item` resource.
    pub fn insert(&mut self, item: Item) {
        self.insert_at("item", item);
    }

    pub fn insert_at(&mut self, resource: &str, item: Item) {
        self.items
            .insert((resource.to_string(), item.id.clone()), item);
    }

    /// Make every following write fail with `message` (simulates a server rejection).
    pub fn set_simulated_failure(&mut self, message: Option<&str>) {
        self.fail_with = message.map(str::to_string);
    }

    fn update<F>(&mut self, item_id: &str, target: &FieldTarget, apply: F) -> Result<Item>
    where
        F: FnOnce(&mut Item) -> Result<()>,
    {
        if let Some(message) = &self.fail_with {
            return Err(MetaEditError::Persistence(message.clone()));
        }
        let slot = (target.resource().to_string(), item_id.to_string());
        let mut working = self
            .items
            .get(&slot)
            .cloned()
            .ok_or_else(|| MetaEditError::ItemNotFound(item_id.to_string()))?;
        apply(&mut working)?;
        self.items.insert(slot, working.clone());
        Ok(working)
    }
}

impl ItemStore for MemoryItemStore {
    fn get_item(&self, id: &str, resource: &str) -> Result<Item> {
        self.items
            .get(&(resource.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| MetaEditError::ItemNotFound(id.to_string()))
    }

    fn add_metadata(
        &mut self,
        item_id: &str,
        key: &str,
        value: &Value,
        target: &FieldTarget,
    ) -> Result<Item> {
        self.update(item_id, target, |item| apply_add(item, key, value, target))
    }

    fn edit_metadata(
        &mut self,
        item_id: &str,
        new_key: &str,
        old_key: &str,
        value: &Value,
        target: &FieldTarget,
    ) -> Result<Item> {
        self.update(item_id, target, |item| {
            apply_edit(item, new_key, old_key, value, target)
        })
    }

    fn remove_metadata(&mut self, item_id: &str, key: &str, target: &FieldTarget) -> Result<Item> {
        self.update(item_id, target, |item| apply_remove(item, key, target))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use serde_json::json;

    /// Builds items with a populated `meta` field.
    pub struct ItemFixture {
        pub item: Item,
    }

    impl ItemFixture {
        pub fn new(id: &str) -> Self {
            Self {
                item: Item::new(id).with_attribute("name", json!(format!("{id}.svs"))),
            }
        }

        pub fn with_meta(mut self, meta: Value) -> Self {
            self.item.attributes.insert("meta".to_string(), meta);
            self
        }

        pub fn into_store(self) -> (Item, MemoryItemStore) {
            let store = MemoryItemStore::new().with_item(self.item.clone());
            (self.item, store)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::ItemFixture;
    use super::*;
    use serde_json::json;

    #[test]
    fn add_then_get_reflects_write() {
        let (item, mut store) = ItemFixture::new("i1").with_meta(json!({})).into_store();
        let target = FieldTarget::new("meta");
        let updated = store
            .add_metadata(&item.id, "k", &json!("v"), &target)
            .unwrap();
        assert_eq!(updated.field("meta").unwrap()["k"], json!("v"));
        assert_eq!(store.get_item("i1", "item").unwrap(), updated);
    }

    #[test]
    fn unknown_item_is_reported() {
        let mut store = MemoryItemStore::new();
        match store.add_metadata("nope", "k", &json!(1), &FieldTarget::new("meta")) {
            Err(MetaEditError::ItemNotFound(id)) => assert_eq!(id, "nope"),
            other => panic!("Expected ItemNotFound, got {other:?}"),
        }
    }

    #[test]
    fn items_are_scoped_by_resource() {
        let mut store = MemoryItemStore::new();
        store.insert_at("folder", Item::new("f1"));
        assert!(store.get_item("f1", "item").is_err());

        let target = FieldTarget::new("meta").with_path(Some("folder".into()));
        assert!(store.add_metadata("f1", "k", &json!(1), &target).is_ok());
    }

    #[test]
    fn simulated_failure_leaves_item_untouched() {
        let (item, mut store) = ItemFixture::new("i1")
            .with_meta(json!({"a": "1"}))
            .into_store();
        store.set_simulated_failure(Some("Server unavailable"));

        let err = store
            .remove_metadata(&item.id, "a", &FieldTarget::new("meta"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Server unavailable");
        assert_eq!(store.get_item("i1", "item").unwrap(), item);
    }

    #[test]
    fn failed_request_does_not_commit_partial_changes() {
        let (item, mut store) = ItemFixture::new("i1").into_store();
        // Field does not exist yet; removing would create it before failing.
        assert!(store
            .remove_metadata(&item.id, "a", &FieldTarget::new("meta"))
            .is_err());
        assert!(store.get_item("i1", "item").unwrap().field("meta").is_none());
    }
}
