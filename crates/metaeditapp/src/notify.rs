//! User-facing notifications.
//!
//! Components never print or raise alerts themselves; they hand a [`Notification`] to the
//! [`NotificationSink`] injected at construction. Delivery is fire-and-forget.

use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub text: String,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Danger,
            text: text.into(),
        }
    }
}

pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// Drops everything. Useful for hosts that only care about returned errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: Notification) {}
}

/// Keeps every notification in memory.
///
/// Clones share the same buffer, so a host can keep one handle and give the other to
/// the list. Uses `Rc<RefCell<_>>` since the editor is single-threaded.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    received: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.borrow().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received.borrow().last().cloned()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.received.borrow().is_empty()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.received.borrow_mut().push(notification);
    }
}
