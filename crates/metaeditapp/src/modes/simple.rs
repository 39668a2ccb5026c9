//! Plain text mode.

use serde_json::Value;

use super::{EditorSeed, ModeDescriptor, RowTemplate, ValueEditor, SIMPLE};
use crate::error::Result;

/// Strings show as themselves; anything else falls back to compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn descriptor() -> ModeDescriptor {
    ModeDescriptor::new(SIMPLE, RowTemplate::Inline, display_value, |seed| {
        Box::new(SimpleEditor::from_seed(seed)) as Box<dyn ValueEditor>
    })
}

/// A single text box. Whatever is typed is saved as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleEditor {
    text: String,
}

impl SimpleEditor {
    pub fn from_seed(seed: EditorSeed) -> Self {
        let text = match seed {
            EditorSeed::Value(value) => display_value(&value),
            EditorSeed::Text(text) => text,
        };
        Self { text }
    }
}

impl ValueEditor for SimpleEditor {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn value(&self) -> Result<Value> {
        Ok(Value::String(self.text.clone()))
    }
}
