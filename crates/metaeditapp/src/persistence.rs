//! # Persistence Strategies
//!
//! A list commits edits through exactly one strategy, chosen when it is built and
//! fixed for its lifetime:
//!
//! | Strategy | Save | Delete |
//! |----------|------|--------|
//! | [`CallbackDelegate`](PersistenceStrategy::CallbackDelegate) | the caller's delegate owns it | confirm, then delegate |
//! | [`LocalOnly`](PersistenceStrategy::LocalOnly) | mutate the item's field in memory | immediate, no confirmation |
//! | [`RemoteCrud`](PersistenceStrategy::RemoteCrud) | request to the [`ItemStore`] | confirm, then request |
//!
//! A list built with `no_save` deletes from the item without confirmation whichever
//! strategy commits its saves.
//!
//! The delegate path never touches the field mapping: whatever the delegate does with
//! the value is its own business, the row only learns whether it succeeded.

use serde_json::Value;
use std::fmt;

use crate::store::ItemStore;

/// Caller-owned persistence (`onMetadataAdded` / `onMetadataEdited`).
///
/// `Err` carries a message shown to the user; the row stays in editing.
pub trait MetadataDelegate {
    fn on_added(&mut self, key: &str, value: &Value) -> Result<(), String>;

    fn on_edited(&mut self, new_key: &str, old_key: &str, value: &Value) -> Result<(), String>;

    fn on_removed(&mut self, key: &str) -> Result<(), String>;
}

pub enum PersistenceStrategy {
    RemoteCrud(Box<dyn ItemStore>),
    LocalOnly,
    CallbackDelegate(Box<dyn MetadataDelegate>),
}

impl PersistenceStrategy {
    /// Pick the strategy from the list's construction parameters.
    ///
    /// A delegate always wins; otherwise `no_save` selects local-only editing, and the
    /// store is used for everything else. Returns `None` when neither a delegate,
    /// `no_save` nor a store was supplied.
    pub fn select(
        no_save: bool,
        delegate: Option<Box<dyn MetadataDelegate>>,
        store: Option<Box<dyn ItemStore>>,
    ) -> Option<Self> {
        match (delegate, no_save, store) {
            (Some(delegate), _, _) => Some(PersistenceStrategy::CallbackDelegate(delegate)),
            (None, true, _) => Some(PersistenceStrategy::LocalOnly),
            (None, false, Some(store)) => Some(PersistenceStrategy::RemoteCrud(store)),
            (None, false, None) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PersistenceStrategy::RemoteCrud(_) => "remote",
            PersistenceStrategy::LocalOnly => "local",
            PersistenceStrategy::CallbackDelegate(_) => "delegate",
        }
    }

    /// Whether deletes through this strategy are confirmed by the user first.
    pub fn confirms_delete(&self) -> bool {
        !matches!(self, PersistenceStrategy::LocalOnly)
    }
}

impl fmt::Debug for PersistenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersistenceStrategy::{}", self.name())
    }
}

/// A question the host must put to the user before a destructive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Message with any user-supplied text HTML-escaped.
    pub message: String,
    pub confirm_label: String,
    pub escaped_html: bool,
}

impl Confirmation {
    pub fn delete_key(key: &str) -> Self {
        Self {
            message: format!(
                "Are you sure you want to delete the metadatum <b>{}</b>?",
                escape_html(key)
            ),
            confirm_label: "Delete".to_string(),
            escaped_html: true,
        }
    }

    /// The message with markup stripped, for plain-text hosts.
    pub fn plain_message(&self) -> String {
        let stripped = self.message.replace("<b>", "").replace("</b>", "");
        unescape_html(&stripped)
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '`' => escaped.push_str("&#x60;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#x60;", "`")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryItemStore;

    struct Nop;

    impl MetadataDelegate for Nop {
        fn on_added(&mut self, _key: &str, _value: &Value) -> Result<(), String> {
            Ok(())
        }

        fn on_edited(&mut self, _new: &str, _old: &str, _value: &Value) -> Result<(), String> {
            Ok(())
        }

        fn on_removed(&mut self, _key: &str) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn delegate_takes_priority() {
        let strategy = PersistenceStrategy::select(
            true,
            Some(Box::new(Nop)),
            Some(Box::new(MemoryItemStore::new())),
        )
        .unwrap();
        assert_eq!(strategy.name(), "delegate");
        assert!(strategy.confirms_delete());
    }

    #[test]
    fn no_save_selects_local_only() {
        let strategy =
            PersistenceStrategy::select(true, None, Some(Box::new(MemoryItemStore::new())))
                .unwrap();
        assert_eq!(strategy.name(), "local");
        assert!(!strategy.confirms_delete());
    }

    #[test]
    fn store_selects_remote() {
        let strategy =
            PersistenceStrategy::select(false, None, Some(Box::new(MemoryItemStore::new())))
                .unwrap();
        assert_eq!(strategy.name(), "remote");
        assert!(PersistenceStrategy::select(false, None, None).is_none());
    }

    #[test]
    fn delete_confirmation_escapes_key() {
        let confirmation = Confirmation::delete_key("<script>&");
        assert_eq!(
            confirmation.message,
            "Are you sure you want to delete the metadatum <b>&lt;script&gt;&amp;</b>?"
        );
        assert_eq!(confirmation.confirm_label, "Delete");
        assert!(confirmation.escaped_html);
        assert_eq!(
            confirmation.plain_message(),
            "Are you sure you want to delete the metadatum <script>&?"
        );
    }
}
