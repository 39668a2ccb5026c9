//! # Rows
//!
//! Every entry of a list lives in a [`Row`] with a stable [`RowId`]. A row is either
//! viewing its entry ([`DisplayRow`]) or editing it ([`EditRow`]):
//!
//! ```text
//!             begin_edit                     save ok / cancel
//!   Viewing ─────────────▶ Editing ─────────────────────────────▶ Viewing
//!                           │  ▲
//!                toggle_mode│  │ (validation failure, save failure:
//!                           ▼  │  stays in Editing, input intact)
//!                         Editing
//! ```
//!
//! New entries are born in `Editing`; cancelling them removes the row.

use std::fmt;

pub mod display;
pub mod edit;

pub use display::{DisplayRow, RowAttributes};
pub use edit::EditRow;

use crate::error::{MetaEditError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub(crate) u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub enum RowState {
    Viewing(DisplayRow),
    Editing(EditRow),
}

impl RowState {
    pub fn label(&self) -> &'static str {
        match self {
            RowState::Viewing(_) => "viewing",
            RowState::Editing(_) => "editing",
        }
    }
}

#[derive(Debug)]
pub struct Row {
    id: RowId,
    state: RowState,
}

impl Row {
    pub(crate) fn new(id: RowId, state: RowState) -> Self {
        Self { id, state }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn state(&self) -> &RowState {
        &self.state
    }

    pub(crate) fn set_state(&mut self, state: RowState) {
        self.state = state;
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, RowState::Editing(_))
    }

    /// The key this row stands for: the shown key, or the key being edited.
    pub fn key(&self) -> &str {
        match &self.state {
            RowState::Viewing(display) => display.key(),
            RowState::Editing(edit) => &edit.session().original_key,
        }
    }

    pub fn is_new_entry(&self) -> bool {
        matches!(&self.state, RowState::Editing(edit) if edit.session().is_new_entry)
    }

    pub fn as_display(&self) -> Result<&DisplayRow> {
        match &self.state {
            RowState::Viewing(display) => Ok(display),
            other => Err(self.wrong_state("viewing", other)),
        }
    }

    pub fn as_edit(&self) -> Result<&EditRow> {
        match &self.state {
            RowState::Editing(edit) => Ok(edit),
            other => Err(self.wrong_state("editing", other)),
        }
    }

    pub fn as_edit_mut(&mut self) -> Result<&mut EditRow> {
        let id = self.id;
        match &mut self.state {
            RowState::Editing(edit) => Ok(edit),
            other => Err(MetaEditError::InvalidRowState {
                row: id,
                expected: "editing",
                actual: other.label(),
            }),
        }
    }

    fn wrong_state(&self, expected: &'static str, actual: &RowState) -> MetaEditError {
        MetaEditError::InvalidRowState {
            row: self.id,
            expected,
            actual: actual.label(),
        }
    }
}
