//! # List Controller
//!
//! [`MetadataList`] owns the rows of one metadata field of one item. It is the only
//! entry point hosts use: every user gesture (edit, type, toggle, save, cancel, delete)
//! is a method taking the [`RowId`] it applies to.
//!
//! ## Rendering
//!
//! [`MetadataList::render`] reads the field fresh, sorts its keys (case-insensitive,
//! then by raw key), derives each entry's mode from its value and rebuilds every row in
//! the `Viewing` state. It runs once when the list is built and again whenever the host
//! swaps or changes the item. Open editors do not survive it.
//!
//! ## Committing
//!
//! Saves and deletes go through the [`PersistenceStrategy`] chosen at build time. After
//! a successful commit the list *reconciles* instead of re-rendering: viewing rows are
//! rebuilt from the field, while other rows that are still being edited keep their
//! input. Unsaved new entries stay at the end of the list.
//!
//! Any rejected operation (validation, key collision, refused mode switch, malformed
//! JSON, store or delegate failure, missing write access) is reported through the
//! [`NotificationSink`] and returned as an error. The row is left exactly as it was.

use deunicode::deunicode;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{MetaEditError, Result};
use crate::model::{
    AccessLevel, EditingSession, FieldTarget, Item, ItemMetadataHint, Mapping, MetadataEntry,
    ModelType, DEFAULT_FIELD_NAME,
};
use crate::modes::{mode_for_value, ModeRegistry, SIMPLE, STRUCTURED};
use crate::notify::{Notification, NotificationSink, NullSink};
use crate::persistence::{Confirmation, MetadataDelegate, PersistenceStrategy};
use crate::resolver::resolve_or_create;
use crate::rows::{DisplayRow, EditRow, Row, RowId, RowState};
use crate::store::ItemStore;

pub const DEFAULT_TITLE: &str = "Metadata";

/// What the list shows above its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ListHeader {
    pub title: String,
    pub field_name: String,
    /// Whether add/edit affordances are offered.
    pub editable: bool,
    /// Expected keys, only for plain items.
    pub hints: Vec<ItemMetadataHint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row (and its key, if it was saved) is gone.
    Removed,
    /// Nothing happened yet. Ask the user, then call `confirm_delete` or `dismiss_delete`.
    ConfirmationRequired(Confirmation),
}

enum Commit {
    /// The delegate owns the value; the field was not touched.
    Detached,
    Local,
    Remote(Item),
}

pub struct MetadataListBuilder {
    item: Item,
    field_name: String,
    api_path: Option<String>,
    access_level: AccessLevel,
    title: String,
    no_save: bool,
    delegate: Option<Box<dyn MetadataDelegate>>,
    store: Option<Box<dyn ItemStore>>,
    registry: Option<Arc<ModeRegistry>>,
    notifier: Option<Box<dyn NotificationSink>>,
    item_metadata: Vec<ItemMetadataHint>,
}

impl MetadataListBuilder {
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    pub fn with_api_path(mut self, api_path: Option<String>) -> Self {
        self.api_path = api_path;
        self
    }

    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Keep edits in memory only. Deletes are no longer confirmed.
    pub fn with_no_save(mut self, no_save: bool) -> Self {
        self.no_save = no_save;
        self
    }

    pub fn with_delegate(mut self, delegate: impl MetadataDelegate + 'static) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    pub fn with_store(mut self, store: impl ItemStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_registry(mut self, registry: Arc<ModeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_notifier(mut self, notifier: impl NotificationSink + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn with_item_metadata(mut self, hints: Vec<ItemMetadataHint>) -> Self {
        self.item_metadata = hints;
        self
    }

    /// Select the persistence strategy, check the registry and render once.
    pub fn build(self) -> Result<MetadataList> {
        let persistence = PersistenceStrategy::select(self.no_save, self.delegate, self.store)
            .ok_or_else(|| {
                MetaEditError::Config(
                    "a metadata list needs an item store, a delegate or no_save".to_string(),
                )
            })?;
        let registry = self.registry.unwrap_or_else(ModeRegistry::shared);
        for mode in [SIMPLE, STRUCTURED] {
            if !registry.contains(mode) {
                return Err(MetaEditError::Config(format!(
                    "mode registry is missing the built-in {} mode",
                    mode
                )));
            }
        }

        let mut list = MetadataList {
            target: FieldTarget::new(self.field_name).with_path(self.api_path),
            item: self.item,
            access: self.access_level,
            title: self.title,
            persistence,
            no_save: self.no_save,
            registry,
            notifier: self.notifier.unwrap_or_else(|| Box::new(NullSink)),
            item_metadata: self.item_metadata,
            rows: Vec::new(),
            next_id: 0,
        };
        tracing::debug!(
            item = %list.item.id,
            field = %list.target.field,
            strategy = list.persistence.name(),
            "metadata list bound"
        );
        list.render()?;
        Ok(list)
    }
}

pub struct MetadataList {
    item: Item,
    target: FieldTarget,
    access: AccessLevel,
    title: String,
    persistence: PersistenceStrategy,
    no_save: bool,
    registry: Arc<ModeRegistry>,
    notifier: Box<dyn NotificationSink>,
    item_metadata: Vec<ItemMetadataHint>,
    rows: Vec<Row>,
    next_id: u64,
}

impl MetadataList {
    pub fn builder(item: Item) -> MetadataListBuilder {
        MetadataListBuilder {
            item,
            field_name: DEFAULT_FIELD_NAME.to_string(),
            api_path: None,
            access_level: AccessLevel::default(),
            title: DEFAULT_TITLE.to_string(),
            no_save: false,
            delegate: None,
            store: None,
            registry: None,
            notifier: None,
            item_metadata: Vec::new(),
        }
    }

    // --- Rendering ---

    /// Rebuild every row from the field. Discards open editors.
    pub fn render(&mut self) -> Result<()> {
        let displays = self.display_rows()?;
        let rows: Vec<Row> = displays
            .into_iter()
            .map(|display| Row::new(self.next_row_id(), RowState::Viewing(display)))
            .collect();
        self.rows = rows;
        tracing::debug!(field = %self.target.field, rows = self.rows.len(), "rendered");
        Ok(())
    }

    /// Bind to a different version of the item (or a different item) and re-render.
    pub fn set_item(&mut self, item: Item) -> Result<()> {
        self.item = item;
        self.render()
    }

    /// The host changed the bound item in place.
    pub fn item_changed(&mut self) -> Result<()> {
        self.render()
    }

    pub fn set_item_metadata(&mut self, hints: Vec<ItemMetadataHint>) {
        self.item_metadata = hints;
    }

    // --- Inspection ---

    pub fn header(&self) -> ListHeader {
        let hints = if self.item.model_type == ModelType::Item {
            self.item_metadata.clone()
        } else {
            Vec::new()
        };
        ListHeader {
            title: self.title.clone(),
            field_name: self.target.field.clone(),
            editable: self.access.can_write(),
            hints,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Result<&Row> {
        self.rows
            .iter()
            .find(|row| row.id() == id)
            .ok_or(MetaEditError::RowNotFound(id))
    }

    pub fn row_for_key(&self, key: &str) -> Option<&Row> {
        self.rows
            .iter()
            .find(|row| !row.is_new_entry() && row.key() == key)
    }

    /// Access an open editor to change its key or value input.
    pub fn edit_row_mut(&mut self, id: RowId) -> Result<&mut EditRow> {
        let idx = self.index_of(id)?;
        self.rows[idx].as_edit_mut()
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn target(&self) -> &FieldTarget {
        &self.target
    }

    pub fn access_level(&self) -> AccessLevel {
        self.access
    }

    pub fn strategy(&self) -> &PersistenceStrategy {
        &self.persistence
    }

    /// The field as the list currently sees it.
    pub fn field(&self) -> Mapping {
        self.item.field_snapshot(&self.target.field)
    }

    // --- Editing ---

    /// Viewing → Editing.
    pub fn begin_edit(&mut self, id: RowId) -> Result<()> {
        self.require_write()?;
        let idx = self.index_of(id)?;
        let opened = self.rows[idx].as_display()?.start_edit(&self.registry);
        let edit = match opened {
            Ok(edit) => edit,
            Err(err) => return Err(self.report(err)),
        };
        if let Some(warning) = edit.warning() {
            self.notifier.notify(Notification::warning(warning));
        }
        tracing::debug!(row = %id, key = %edit.session().original_key, "editing");
        self.rows[idx].set_state(RowState::Editing(edit));
        Ok(())
    }

    /// Append a blank entry already in `Editing`. The field is untouched until it is saved.
    pub fn add_entry_by_key(&mut self, key: &str) -> Result<RowId> {
        self.require_write()?;
        let edit = EditRow::new_entry(key, &self.registry)?;
        let id = self.next_row_id();
        self.rows.push(Row::new(id, RowState::Editing(edit)));
        tracing::debug!(row = %id, key, "new entry");
        Ok(id)
    }

    /// Commit an open editor through the persistence strategy.
    pub fn save(&mut self, id: RowId) -> Result<()> {
        self.require_write()?;
        let idx = self.index_of(id)?;
        let edit = self.rows[idx].as_edit()?;
        let session = edit.session().clone();
        let (key, value) = match edit.prepare_save() {
            Ok(prepared) => prepared,
            Err(err) => return Err(self.report(err)),
        };

        let detached = matches!(self.persistence, PersistenceStrategy::CallbackDelegate(_));
        let renamed = session.is_new_entry || key != session.original_key;
        if renamed && !detached && self.field_contains(&key) {
            return Err(self.report(MetaEditError::KeyCollision { key }));
        }

        let committed = match &mut self.persistence {
            PersistenceStrategy::CallbackDelegate(delegate) => {
                let outcome = if session.is_new_entry {
                    delegate.on_added(&key, &value)
                } else {
                    delegate.on_edited(&key, &session.original_key, &value)
                };
                outcome
                    .map(|()| Commit::Detached)
                    .map_err(MetaEditError::Persistence)
            }
            PersistenceStrategy::LocalOnly => {
                commit_local(&mut self.item, &self.target.field, &session, &key, &value)
                    .map(|()| Commit::Local)
            }
            PersistenceStrategy::RemoteCrud(store) => {
                let request = if session.is_new_entry {
                    store.add_metadata(&self.item.id, &key, &value, &self.target)
                } else {
                    store.edit_metadata(
                        &self.item.id,
                        &key,
                        &session.original_key,
                        &value,
                        &self.target,
                    )
                };
                request.map(Commit::Remote)
            }
        };

        let commit = match committed {
            Ok(commit) => commit,
            Err(err) => return Err(self.report(err)),
        };
        tracing::debug!(
            row = %id,
            key = %key,
            old_key = %session.original_key,
            strategy = self.persistence.name(),
            "saved"
        );
        match commit {
            Commit::Detached => {
                let display = self.display_row(&key, value)?;
                self.rows[idx].set_state(RowState::Viewing(display));
                Ok(())
            }
            Commit::Local => self.reconcile(Some((id, key.as_str()))),
            Commit::Remote(item) => {
                self.item = item;
                self.reconcile(Some((id, key.as_str())))
            }
        }
    }

    /// Drop an open editor. New entries disappear; existing ones show the field again.
    pub fn cancel(&mut self, id: RowId) -> Result<()> {
        let idx = self.index_of(id)?;
        let session = self.rows[idx].as_edit()?.session().clone();
        if session.is_new_entry {
            self.rows.remove(idx);
            tracing::debug!(row = %id, "new entry discarded");
            return Ok(());
        }
        let current = self
            .item
            .field(&self.target.field)
            .and_then(|field| field.get(&session.original_key))
            .cloned();
        match current {
            Some(value) => {
                let display = self.display_row(&session.original_key, value)?;
                self.rows[idx].set_state(RowState::Viewing(display));
            }
            None => {
                self.rows.remove(idx);
            }
        }
        tracing::debug!(row = %id, key = %session.original_key, "edit cancelled");
        Ok(())
    }

    /// Switch an open editor to another mode, keeping the typed key and value.
    pub fn toggle_mode(&mut self, id: RowId, target: &str) -> Result<()> {
        self.require_write()?;
        let idx = self.index_of(id)?;
        let toggled = self.rows[idx].as_edit_mut()?.toggle(target, &self.registry);
        if let Err(err) = toggled {
            return Err(self.report(err));
        }
        if let Some(warning) = self.rows[idx].as_edit()?.warning() {
            self.notifier.notify(Notification::warning(warning));
        }
        tracing::debug!(row = %id, mode = target, "mode switched");
        Ok(())
    }

    // --- Deleting ---

    /// Delete the entry an open editor stands for.
    ///
    /// Lists built with `no_save` remove the key from the item right away, whatever
    /// strategy commits their saves. Otherwise a [`Confirmation`] is parked on the row and
    /// returned; nothing is removed until [`confirm_delete`](Self::confirm_delete).
    pub fn delete(&mut self, id: RowId) -> Result<DeleteOutcome> {
        self.require_write()?;
        let idx = self.index_of(id)?;
        let session = self.rows[idx].as_edit()?.session().clone();
        if session.is_new_entry {
            self.rows.remove(idx);
            return Ok(DeleteOutcome::Removed);
        }

        if !self.confirms_delete() {
            let removed = remove_local(&mut self.item, &self.target.field, &session.original_key);
            if let Err(err) = removed {
                return Err(self.report(err));
            }
            self.rows.remove(idx);
            tracing::debug!(row = %id, key = %session.original_key, "deleted");
            return Ok(DeleteOutcome::Removed);
        }

        let confirmation = Confirmation::delete_key(&session.original_key);
        self.rows[idx]
            .as_edit_mut()?
            .park_delete(confirmation.clone());
        Ok(DeleteOutcome::ConfirmationRequired(confirmation))
    }

    /// The user accepted the pending delete confirmation.
    pub fn confirm_delete(&mut self, id: RowId) -> Result<()> {
        self.require_write()?;
        let idx = self.index_of(id)?;
        let edit = self.rows[idx].as_edit_mut()?;
        if edit.take_pending_delete().is_none() {
            return Err(MetaEditError::InvalidRowState {
                row: id,
                expected: "awaiting delete confirmation",
                actual: "editing",
            });
        }
        let key = edit.session().original_key.clone();

        let removal = match &mut self.persistence {
            PersistenceStrategy::CallbackDelegate(delegate) => delegate
                .on_removed(&key)
                .map(|()| None)
                .map_err(MetaEditError::Persistence),
            PersistenceStrategy::LocalOnly => {
                remove_local(&mut self.item, &self.target.field, &key).map(|()| None)
            }
            PersistenceStrategy::RemoteCrud(store) => store
                .remove_metadata(&self.item.id, &key, &self.target)
                .map(Some),
        };

        let updated = match removal {
            Ok(updated) => updated,
            Err(err) => return Err(self.report(err)),
        };
        self.rows.remove(idx);
        tracing::debug!(row = %id, key = %key, "deleted");
        if let Some(item) = updated {
            self.item = item;
            self.reconcile(None)?;
        }
        Ok(())
    }

    /// The user declined the pending delete confirmation.
    pub fn dismiss_delete(&mut self, id: RowId) -> Result<()> {
        let idx = self.index_of(id)?;
        self.rows[idx].as_edit_mut()?.take_pending_delete();
        Ok(())
    }

    // --- Internals ---

    fn next_row_id(&mut self) -> RowId {
        self.next_id += 1;
        RowId(self.next_id)
    }

    fn index_of(&self, id: RowId) -> Result<usize> {
        self.rows
            .iter()
            .position(|row| row.id() == id)
            .ok_or(MetaEditError::RowNotFound(id))
    }

    fn field_contains(&self, key: &str) -> bool {
        self.item
            .field(&self.target.field)
            .is_some_and(|field| field.contains_key(key))
    }

    fn confirms_delete(&self) -> bool {
        !self.no_save && self.persistence.confirms_delete()
    }

    fn require_write(&self) -> Result<()> {
        if self.access.can_write() {
            Ok(())
        } else {
            Err(self.report(MetaEditError::ReadOnly))
        }
    }

    /// Tell the user about a rejected operation and hand the error back.
    fn report(&self, err: MetaEditError) -> MetaEditError {
        let notification = match &err {
            MetaEditError::Persistence(_) => Notification::danger(err.to_string()),
            _ => Notification::warning(err.to_string()),
        };
        tracing::warn!(field = %self.target.field, error = %err, "metadata operation rejected");
        self.notifier.notify(notification);
        err
    }

    fn display_row(&self, key: &str, value: Value) -> Result<DisplayRow> {
        let mode = mode_for_value(&value);
        DisplayRow::render(
            MetadataEntry::new(key, value, mode),
            &self.registry,
            self.access,
        )
    }

    fn display_rows(&self) -> Result<Vec<DisplayRow>> {
        let Some(field) = self.item.field(&self.target.field) else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<(&String, &Value)> = field.iter().collect();
        entries.sort_by(|(a, _), (b, _)| locale_cmp(a, b));
        entries
            .into_iter()
            .map(|(key, value)| self.display_row(key, value.clone()))
            .collect()
    }

    /// Rebuild viewing rows from the field while keeping other open editors.
    ///
    /// `adopt` names the row that was just committed and the key it now stands for; that
    /// row comes back as a viewing row under the same id.
    fn reconcile(&mut self, adopt: Option<(RowId, &str)>) -> Result<()> {
        let displays = self.display_rows()?;

        let mut viewing_ids: HashMap<String, RowId> = HashMap::new();
        let mut editing: HashMap<String, Row> = HashMap::new();
        let mut unsaved = Vec::new();
        for row in std::mem::take(&mut self.rows) {
            if adopt.is_some_and(|(id, _)| id == row.id()) {
                continue;
            }
            if row.is_new_entry() {
                unsaved.push(row);
            } else if row.is_editing() {
                editing.insert(row.key().to_string(), row);
            } else {
                viewing_ids.insert(row.key().to_string(), row.id());
            }
        }

        let mut rows = Vec::with_capacity(displays.len() + unsaved.len());
        for display in displays {
            let id = match adopt {
                Some((id, key)) if key == display.key() => id,
                _ => {
                    if let Some(row) = editing.remove(display.key()) {
                        rows.push(row);
                        continue;
                    }
                    match viewing_ids.get(display.key()) {
                        Some(id) => *id,
                        None => self.next_row_id(),
                    }
                }
            };
            rows.push(Row::new(id, RowState::Viewing(display)));
        }
        for (key, row) in editing {
            tracing::debug!(row = %row.id(), key = %key, "key removed, dropping its editor");
        }
        rows.extend(unsaved);
        self.rows = rows;
        Ok(())
    }
}

fn commit_local(
    item: &mut Item,
    field_name: &str,
    session: &EditingSession,
    key: &str,
    value: &Value,
) -> Result<()> {
    let field = resolve_or_create(&mut item.attributes, field_name)?;
    if !session.is_new_entry && key != session.original_key {
        field.remove(&session.original_key);
    }
    field.insert(key.to_string(), value.clone());
    Ok(())
}

fn remove_local(item: &mut Item, field_name: &str, key: &str) -> Result<()> {
    let field = resolve_or_create(&mut item.attributes, field_name)?;
    field.remove(key);
    Ok(())
}

/// Key order used for rendering, after the usual locale collation levels.
///
/// Keys compare by base letters first (transliterated to ASCII, ignoring case), so `é`
/// sorts with `e`. Among equal base letters plain letters come before accented ones and
/// lowercase before uppercase. The raw key breaks any remaining tie.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| uppercase_mask(a).cmp(uppercase_mask(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(key: &str) -> String {
    deunicode(key).to_lowercase()
}

fn uppercase_mask(key: &str) -> impl Iterator<Item = bool> + '_ {
    key.chars().map(char::is_uppercase)
}
