use thiserror::Error;

use crate::rows::RowId;

/// Errors produced by the metadata editor core.
///
/// Every variant except `Io`, `Serialization` and `Config` is recoverable at the row
/// level: the list controller reports it through the notification sink and leaves the
/// editor open with the user's input intact.
#[derive(Debug, Error)]
pub enum MetaEditError {
    /// A required input was missing (e.g. the key of a new entry).
    #[error("{0}")]
    Validation(String),

    /// Saving would produce a key that already exists in the field.
    #[error("{key} is already a metadata key")]
    KeyCollision { key: String },

    /// The target mode's structural validator refused the current value.
    #[error("{message}")]
    ModeTransitionRejected {
        from: String,
        to: String,
        message: String,
    },

    /// The structured editing surface does not hold parsable JSON.
    #[error("The field contains invalid JSON and can not be saved.")]
    MalformedStructuredValue(#[source] serde_json::Error),

    /// The item store (or a caller delegate) rejected the operation.
    #[error("{0}")]
    Persistence(String),

    #[error("Unsupported metadatum mode {0} detected.")]
    UnknownMode(String),

    /// A dotted field path crosses a value that is not a mapping.
    #[error("Cannot resolve field path '{path}': '{segment}' is not a mapping")]
    PathConflict { path: String, segment: String },

    #[error("You do not have write access to this metadata")]
    ReadOnly,

    #[error("Row {0} not found")]
    RowNotFound(RowId),

    /// An operation was issued against a row in the wrong state.
    #[error("Row {row} is {actual}, expected {expected}")]
    InvalidRowState {
        row: RowId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MetaEditError>;
