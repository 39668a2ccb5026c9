//! # Mode Registry
//!
//! A *mode* is a pluggable strategy for showing and editing one metadata value. Each
//! mode is described by a [`ModeDescriptor`]:
//!
//! - a **display function** turning the stored value into the read-only string,
//! - an **editor factory** producing a [`ValueEditor`] seeded with a stored value or text,
//! - a **template** hint telling renderers whether the value is inline or a block,
//! - a table of **transition rules**, keyed by the *source* mode, that a candidate
//!   value must satisfy before a row may switch *into* this mode.
//!
//! Two modes ship built-in:
//!
//! | Mode | Display | Editor surface | Rules |
//! |------|---------|----------------|-------|
//! | `simple` | the string itself | plain text | none |
//! | `structured` | pretty JSON | JSON text | from `simple`: must parse as JSON |
//!
//! Transitions without a rule are always allowed. The registry is read-only once it is
//! handed to a list; hosts that need extra modes build their own registry with
//! [`ModeRegistry::builtin`] and [`ModeRegistry::register`] before constructing it.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{MetaEditError, Result};

pub mod simple;
pub mod structured;

pub use simple::SimpleEditor;
pub use structured::StructuredEditor;

pub const SIMPLE: &str = "simple";
pub const STRUCTURED: &str = "structured";

static BUILTIN: Lazy<Arc<ModeRegistry>> = Lazy::new(|| Arc::new(ModeRegistry::builtin()));

/// What an editor is seeded with when it is created.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorSeed {
    /// The stored value, straight from the field.
    Value(Value),
    /// Live text captured from another editor (used when toggling modes).
    Text(String),
}

/// The value-editing surface of an edit row.
///
/// The key input is owned by the row; an editor only deals with the value.
pub trait ValueEditor: Send {
    /// The live text of the surface, exactly as the user left it.
    fn text(&self) -> &str;

    /// Replace the live text (user input).
    fn set_text(&mut self, text: &str);

    /// Extract the value to persist.
    fn value(&self) -> Result<Value>;

    /// Non-fatal problem noticed while rendering the initial content.
    fn warning(&self) -> Option<&str> {
        None
    }
}

/// Layout hint for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTemplate {
    /// Single-line value next to its key.
    Inline,
    /// Multi-line value rendered under its key.
    Block,
}

pub type CheckFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;
pub type DisplayFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;
pub type EditorFactory = Arc<dyn Fn(EditorSeed) -> Box<dyn ValueEditor> + Send + Sync>;

/// A structural check a candidate value must pass to enter a mode.
#[derive(Clone)]
pub struct TransitionRule {
    check: CheckFn,
    message: String,
}

impl TransitionRule {
    pub fn new<F>(check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            message: message.into(),
        }
    }

    pub fn allows(&self, candidate: &str) -> bool {
        (self.check)(candidate)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ModeDescriptor {
    name: String,
    template: RowTemplate,
    display: DisplayFn,
    editor: EditorFactory,
    rules: HashMap<String, TransitionRule>,
}

impl ModeDescriptor {
    pub fn new<D, E>(name: impl Into<String>, template: RowTemplate, display: D, editor: E) -> Self
    where
        D: Fn(&Value) -> String + Send + Sync + 'static,
        E: Fn(EditorSeed) -> Box<dyn ValueEditor> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            template,
            display: Arc::new(display),
            editor: Arc::new(editor),
            rules: HashMap::new(),
        }
    }

    /// Require `rule` to pass when a row switches from `from` into this mode.
    pub fn with_rule_from(mut self, from: impl Into<String>, rule: TransitionRule) -> Self {
        self.rules.insert(from.into(), rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> RowTemplate {
        self.template
    }

    pub fn display_value(&self, value: &Value) -> String {
        (self.display)(value)
    }

    pub fn editor(&self, seed: EditorSeed) -> Box<dyn ValueEditor> {
        (self.editor)(seed)
    }

    pub fn rule_from(&self, from: &str) -> Option<&TransitionRule> {
        self.rules.get(from)
    }
}

impl fmt::Debug for ModeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sources: Vec<&String> = self.rules.keys().collect();
        sources.sort();
        f.debug_struct("ModeDescriptor")
            .field("name", &self.name)
            .field("template", &self.template)
            .field("rules_from", &sources)
            .finish_non_exhaustive()
    }
}

/// Table of modes available to a list.
#[derive(Debug, Clone, Default)]
pub struct ModeRegistry {
    modes: HashMap<String, ModeDescriptor>,
}

impl ModeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the `simple` and `structured` modes.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(simple::descriptor());
        registry.register(structured::descriptor());
        registry
    }

    /// Process-wide built-in registry.
    pub fn shared() -> Arc<ModeRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Add or replace a mode. Returns the descriptor it replaced, if any.
    pub fn register(&mut self, descriptor: ModeDescriptor) -> Option<ModeDescriptor> {
        self.modes.insert(descriptor.name.clone(), descriptor)
    }

    pub fn get(&self, name: &str) -> Result<&ModeDescriptor> {
        self.modes
            .get(name)
            .ok_or_else(|| MetaEditError::UnknownMode(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modes.contains_key(name)
    }

    /// Registered mode names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check whether `candidate` may move from mode `from` into mode `to`.
    ///
    /// The rule is looked up on the *target* mode, keyed by the *source* mode. No rule
    /// means the transition is allowed.
    pub fn validate_transition(&self, from: &str, to: &str, candidate: &str) -> Result<()> {
        let target = self.get(to)?;
        match target.rule_from(from) {
            Some(rule) if !rule.allows(candidate) => Err(MetaEditError::ModeTransitionRejected {
                from: from.to_string(),
                to: to.to_string(),
                message: rule.message().to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn allows_transition(&self, from: &str, to: &str, candidate: &str) -> bool {
        self.validate_transition(from, to, candidate).is_ok()
    }
}

/// The mode a stored value is shown in: strings are `simple`, everything else is
/// `structured`.
pub fn mode_for_value(value: &Value) -> &'static str {
    if value.is_string() {
        SIMPLE
    } else {
        STRUCTURED
    }
}
