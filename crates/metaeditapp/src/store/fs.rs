use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::{apply_add, apply_edit, apply_remove, ItemStore};
use crate::error::{MetaEditError, Result};
use crate::model::{FieldTarget, Item};

/// Item store backed by JSON documents on disk.
///
/// ```text
/// <root>/
/// ├── item/
/// │   └── {id}.json
/// └── folder/
///     └── {id}.json
/// ```
///
/// Every write goes to a temporary file in the same directory and is renamed over the
/// document, so a crash never leaves a half-written item behind.
#[derive(Debug, Clone)]
pub struct FileItemStore {
    root: PathBuf,
}

impl FileItemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn item_path(&self, id: &str, resource: &str) -> Result<PathBuf> {
        check_segment(resource, "resource")?;
        check_segment(id, "item id")?;
        Ok(self.root.join(resource).join(format!("{}.json", id)))
    }

    /// Write an item document (creating its resource directory when needed).
    pub fn save_item(&self, item: &Item, resource: &str) -> Result<()> {
        let path = self.item_path(&item.id, resource)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(MetaEditError::Io)?;
        }
        let content = serde_json::to_string_pretty(item).map_err(MetaEditError::Serialization)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(MetaEditError::Io)?;
        fs::rename(&tmp, &path).map_err(MetaEditError::Io)?;
        tracing::debug!(item = %item.id, path = %path.display(), "item written");
        Ok(())
    }

    fn update<F>(&self, item_id: &str, target: &FieldTarget, apply: F) -> Result<Item>
    where
        F: FnOnce(&mut Item) -> Result<()>,
    {
        let mut item = self.get_item(item_id, target.resource())?;
        apply(&mut item)?;
        self.save_item(&item, target.resource())?;
        Ok(item)
    }
}

fn check_segment(segment: &str, what: &str) -> Result<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\'])
    {
        return Err(MetaEditError::Persistence(format!(
            "Invalid {}: {:?}",
            what, segment
        )));
    }
    Ok(())
}

impl ItemStore for FileItemStore {
    fn get_item(&self, id: &str, resource: &str) -> Result<Item> {
        let path = self.item_path(id, resource)?;
        if !path.exists() {
            return Err(MetaEditError::ItemNotFound(id.to_string()));
        }
        let content = fs::read_to_string(&path).map_err(MetaEditError::Io)?;
        let item = serde_json::from_str(&content).map_err(MetaEditError::Serialization)?;
        Ok(item)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileItemStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = FileItemStore::new(temp.path());
        let item = Item::new("i1").with_attribute("meta", json!({"a": "1"}));
        store.save_item(&item, "item").unwrap();
        (temp, store)
    }

    #[test]
    fn writes_are_persisted_to_disk() {
        let (_temp, mut store) = setup();
        store
            .add_metadata("i1", "b", &json!({"x": 1}), &FieldTarget::new("meta"))
            .unwrap();

        let reloaded = FileItemStore::new(store.root()).get_item("i1", "item").unwrap();
        assert_eq!(
            Value::Object(reloaded.field_snapshot("meta")),
            json!({"a": "1", "b": {"x": 1}})
        );
        assert!(reloaded.updated.is_some());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let (temp, store) = setup();
        let entries: Vec<_> = fs::read_dir(temp.path().join("item"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["i1.json".to_string()]);
        drop(store);
    }

    #[test]
    fn rejected_write_keeps_document() {
        let (_temp, mut store) = setup();
        let before = store.get_item("i1", "item").unwrap();
        assert!(store
            .edit_metadata("i1", "bad.key", "a", &json!("1"), &FieldTarget::new("meta"))
            .is_err());
        assert_eq!(store.get_item("i1", "item").unwrap(), before);
    }

    #[test]
    fn missing_item_is_not_found() {
        let (_temp, store) = setup();
        assert!(matches!(
            store.get_item("nope", "item"),
            Err(MetaEditError::ItemNotFound(_))
        ));
    }

    #[test]
    fn path_traversal_is_rejected() {
        let (_temp, store) = setup();
        assert!(store.item_path("../escape", "item").is_err());
        assert!(store.item_path("i1", "..").is_err());
    }
}
