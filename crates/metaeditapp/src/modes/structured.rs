//! Structured (JSON) mode.
//!
//! The editing surface holds JSON text. Extraction parses it, so an unparsable surface
//! blocks the save instead of storing garbage. Seeding with text that does not parse is
//! tolerated: the raw text is kept and a warning is raised for the renderer.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use super::{
    EditorSeed, ModeDescriptor, RowTemplate, TransitionRule, ValueEditor, SIMPLE, STRUCTURED,
};
use crate::error::{MetaEditError, Result};

pub const CONVERSION_REJECTED: &str =
    "The simple field is not valid JSON and can not be converted.";
pub const RENDER_WARNING: &str =
    "The field contains invalid JSON and can not be viewed in Tree Mode.";

/// JSON with four-space indentation.
pub fn display_value(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

pub fn descriptor() -> ModeDescriptor {
    ModeDescriptor::new(STRUCTURED, RowTemplate::Block, display_value, |seed| {
        Box::new(StructuredEditor::from_seed(seed)) as Box<dyn ValueEditor>
    })
    .with_rule_from(SIMPLE, TransitionRule::new(is_valid_json, CONVERSION_REJECTED))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredEditor {
    text: String,
    warning: Option<String>,
}

impl StructuredEditor {
    pub fn from_seed(seed: EditorSeed) -> Self {
        match seed {
            EditorSeed::Value(value) => Self {
                text: display_value(&value),
                warning: None,
            },
            EditorSeed::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => Self {
                    text: display_value(&value),
                    warning: None,
                },
                Err(_) => Self {
                    text,
                    warning: Some(RENDER_WARNING.to_string()),
                },
            },
        }
    }
}

impl ValueEditor for StructuredEditor {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn value(&self) -> Result<Value> {
        serde_json::from_str(&self.text).map_err(MetaEditError::MalformedStructuredValue)
    }

    fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn displays_with_four_space_indent() {
        assert_eq!(display_value(&json!({"a": 1})), "{\n    \"a\": 1\n}");
        assert_eq!(display_value(&json!(false)), "false");
        assert_eq!(display_value(&Value::Null), "null");
    }

    #[test]
    fn non_string_literals_round_trip() {
        for literal in [json!(false), Value::Null, json!(6), json!([1, "x"])] {
            let editor = StructuredEditor::from_seed(EditorSeed::Value(literal.clone()));
            assert_eq!(editor.value().unwrap(), literal);
        }
    }

    #[test]
    fn text_seed_is_normalized_when_valid() {
        let editor = StructuredEditor::from_seed(EditorSeed::Text(r#"{"a":[1,2]}"#.into()));
        assert!(editor.warning().is_none());
        assert_eq!(editor.value().unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn invalid_text_seed_warns_but_keeps_text() {
        let editor = StructuredEditor::from_seed(EditorSeed::Text("{oops".into()));
        assert_eq!(editor.text(), "{oops");
        assert_eq!(editor.warning(), Some(RENDER_WARNING));
    }

    #[test]
    fn malformed_surface_fails_extraction() {
        let mut editor = StructuredEditor::from_seed(EditorSeed::Value(json!({})));
        editor.set_text("not json");
        assert!(matches!(
            editor.value(),
            Err(MetaEditError::MalformedStructuredValue(_))
        ));
        assert_eq!(editor.text(), "not json");
    }
}
