//! # Domain Model
//!
//! The editor works on an [`Item`]: a JSON document with an id, a model type and an
//! open set of attributes. A *metadata field* is any attribute (addressed by a dotted
//! path such as `meta` or `largeImage.meta`) holding a mapping from string keys to
//! arbitrary JSON values.
//!
//! ```text
//! {
//!   "_id": "5e8f...",
//!   "_modelType": "item",
//!   "name": "slide-01.svs",
//!   "meta": { "stain": "H&E", "magnification": 40 }
//! }
//! ```
//!
//! Entries are never stored as objects of their own: a [`MetadataEntry`] is derived
//! from `field[key]` every time the list renders, and an [`EditingSession`] only lives
//! while a row is being edited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolver;

/// A metadata field: string keys to arbitrary JSON values.
pub type Mapping = serde_json::Map<String, Value>;

/// Field used when the host does not name one.
pub const DEFAULT_FIELD_NAME: &str = "meta";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    Item,
    Folder,
    Collection,
    User,
}

/// Access the current user has on the item. Computed by the host.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Read,
    Write,
    Admin,
}

impl AccessLevel {
    pub fn can_write(self) -> bool {
        self >= AccessLevel::Write
    }
}

/// The entity metadata fields hang off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_modelType", default)]
    pub model_type: ModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: Mapping,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_type: ModelType::Item,
            updated: None,
            attributes: Mapping::new(),
        }
    }

    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Read a metadata field without creating anything. Missing fields read as `None`.
    pub fn field(&self, field_name: &str) -> Option<&Mapping> {
        resolver::lookup(&self.attributes, field_name)
    }

    /// A copy of the field, empty when the field does not exist yet.
    pub fn field_snapshot(&self, field_name: &str) -> Mapping {
        self.field(field_name).cloned().unwrap_or_default()
    }
}

/// Where a field lives, as seen by the item store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTarget {
    /// Dotted path of the field inside the item (`meta`, `largeImage.meta`).
    pub field: String,
    /// Resource path the item is served from (`item`, `folder`, ...). `None` means `item`.
    pub path: Option<String>,
}

impl FieldTarget {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.path = path;
        self
    }

    pub fn resource(&self) -> &str {
        self.path.as_deref().unwrap_or("item")
    }
}

/// The unit of editing.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: Value,
    pub mode: String,
}

impl MetadataEntry {
    pub fn new(key: impl Into<String>, value: Value, mode: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value,
            mode: mode.into(),
        }
    }
}

/// Transient state attached to a row while it is being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditingSession {
    pub original_key: String,
    pub original_value: Value,
    pub current_mode: String,
    pub is_new_entry: bool,
}

impl EditingSession {
    pub fn existing(entry: &MetadataEntry) -> Self {
        Self {
            original_key: entry.key.clone(),
            original_value: entry.value.clone(),
            current_mode: entry.mode.clone(),
            is_new_entry: false,
        }
    }

    pub fn new_entry(key: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            original_key: key.into(),
            original_value: Value::String(String::new()),
            current_mode: mode.into(),
            is_new_entry: true,
        }
    }
}

/// A read-only hint describing a metadata key the host expects on items
/// (the "limetadata" shown in the list header).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadataHint {
    /// The metadata key this hint adds.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
}

impl ItemMetadataHint {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            title: None,
            description: None,
            kind: None,
            choices: Vec::new(),
            default: None,
            required: false,
        }
    }

    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.value)
    }
}
