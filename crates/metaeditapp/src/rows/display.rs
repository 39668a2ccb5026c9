use serde_json::Value;

use super::EditRow;
use crate::error::{MetaEditError, Result};
use crate::model::{AccessLevel, MetadataEntry};
use crate::modes::{ModeRegistry, RowTemplate};

/// Raw attributes kept on a rendered row for later inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAttributes {
    pub key: String,
    pub value: String,
}

/// A read-only row.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    entry: MetadataEntry,
    display_value: String,
    template: RowTemplate,
    editable: bool,
}

impl DisplayRow {
    /// Render `entry` through its mode.
    pub fn render(
        entry: MetadataEntry,
        registry: &ModeRegistry,
        access: AccessLevel,
    ) -> Result<Self> {
        let mode = registry.get(&entry.mode)?;
        Ok(Self {
            display_value: mode.display_value(&entry.value),
            template: mode.template(),
            editable: access.can_write(),
            entry,
        })
    }

    pub fn entry(&self) -> &MetadataEntry {
        &self.entry
    }

    pub fn key(&self) -> &str {
        &self.entry.key
    }

    pub fn value(&self) -> &Value {
        &self.entry.value
    }

    pub fn mode(&self) -> &str {
        &self.entry.mode
    }

    pub fn display_value(&self) -> &str {
        &self.display_value
    }

    pub fn template(&self) -> RowTemplate {
        self.template
    }

    /// Whether an edit affordance is offered.
    pub fn editable(&self) -> bool {
        self.editable
    }

    pub fn attributes(&self) -> RowAttributes {
        RowAttributes {
            key: self.entry.key.clone(),
            value: self.display_value.clone(),
        }
    }

    /// Viewing → Editing: open an editor for this entry in its current mode.
    pub fn start_edit(&self, registry: &ModeRegistry) -> Result<EditRow> {
        if !self.editable {
            return Err(MetaEditError::ReadOnly);
        }
        EditRow::open(&self.entry, registry)
    }
}
