use serde_json::Value;
use std::fmt;

use crate::error::{MetaEditError, Result};
use crate::model::{EditingSession, MetadataEntry};
use crate::modes::{EditorSeed, ModeRegistry, ValueEditor, SIMPLE};
use crate::persistence::Confirmation;

pub const KEY_REQUIRED: &str = "A key is required for all metadata.";

/// A row being edited: a key input plus the value surface of the active mode.
pub struct EditRow {
    session: EditingSession,
    key_input: String,
    editor: Box<dyn ValueEditor>,
    pending_delete: Option<Confirmation>,
}

impl EditRow {
    /// Start editing an existing entry in its current mode.
    pub fn open(entry: &MetadataEntry, registry: &ModeRegistry) -> Result<Self> {
        let mode = registry.get(&entry.mode)?;
        Ok(Self {
            session: EditingSession::existing(entry),
            key_input: entry.key.clone(),
            editor: mode.editor(EditorSeed::Value(entry.value.clone())),
            pending_delete: None,
        })
    }

    /// A blank entry in `simple` mode, not yet part of the field.
    pub fn new_entry(key: &str, registry: &ModeRegistry) -> Result<Self> {
        let mode = registry.get(SIMPLE)?;
        let session = EditingSession::new_entry(key, SIMPLE);
        Ok(Self {
            editor: mode.editor(EditorSeed::Value(session.original_value.clone())),
            key_input: key.to_string(),
            session,
            pending_delete: None,
        })
    }

    pub fn session(&self) -> &EditingSession {
        &self.session
    }

    pub fn mode(&self) -> &str {
        &self.session.current_mode
    }

    pub fn key_input(&self) -> &str {
        &self.key_input
    }

    pub fn set_key_input(&mut self, key: &str) {
        self.key_input = key.to_string();
    }

    /// Live text of the value surface.
    pub fn text(&self) -> &str {
        self.editor.text()
    }

    pub fn set_text(&mut self, text: &str) {
        self.editor.set_text(text);
    }

    pub fn warning(&self) -> Option<&str> {
        self.editor.warning()
    }

    /// The key and value text exactly as the user left them.
    pub fn capture(&self) -> (String, String) {
        (self.key_input.clone(), self.editor.text().to_string())
    }

    /// Resolve the key and extract the value a save would commit.
    ///
    /// The key is trimmed. A blank key is an error on a new entry and falls back to
    /// the original key on an existing one.
    pub fn prepare_save(&self) -> Result<(String, Value)> {
        let trimmed = self.key_input.trim();
        let key = if !trimmed.is_empty() {
            trimmed.to_string()
        } else if self.session.is_new_entry {
            return Err(MetaEditError::Validation(KEY_REQUIRED.to_string()));
        } else {
            self.session.original_key.clone()
        };
        let value = self.editor.value()?;
        Ok((key, value))
    }

    /// Switch the value surface to `target`, carrying the live text across.
    ///
    /// Nothing changes when the target mode refuses the text.
    pub fn toggle(&mut self, target: &str, registry: &ModeRegistry) -> Result<()> {
        if target == self.session.current_mode {
            return Ok(());
        }
        let text = self.editor.text().to_string();
        registry.validate_transition(&self.session.current_mode, target, &text)?;
        let mode = registry.get(target)?;
        self.editor = mode.editor(EditorSeed::Text(text));
        self.session.current_mode = target.to_string();
        Ok(())
    }

    pub fn pending_delete(&self) -> Option<&Confirmation> {
        self.pending_delete.as_ref()
    }

    pub(crate) fn park_delete(&mut self, confirmation: Confirmation) {
        self.pending_delete = Some(confirmation);
    }

    pub(crate) fn take_pending_delete(&mut self) -> Option<Confirmation> {
        self.pending_delete.take()
    }
}

impl fmt::Debug for EditRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditRow")
            .field("session", &self.session)
            .field("key_input", &self.key_input)
            .field("text", &self.editor.text())
            .field("pending_delete", &self.pending_delete)
            .finish()
    }
}
