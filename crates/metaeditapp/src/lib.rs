//! # Metaedit Architecture
//!
//! Metaedit is a **UI-agnostic metadata editor core**. It models what an in-place
//! key/value editor does (which rows exist, what state each is in, what a save or a
//! delete commits, what the user must be told) and leaves drawing and prompting to the
//! host. The `metaedit` binary is one such host; a web view or a TUI could be another.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (CLI, web view, ...)                                  │
//! │  - Draws rows, collects input, asks for confirmation        │
//! │  - Shows notifications                                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  List Controller (list.rs)                                  │
//! │  - Owns the rows of one field, drives render + reconcile    │
//! │  - Routes commits through the persistence strategy          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Rows (rows/) + Modes (modes/)                              │
//! │  - DisplayRow / EditRow state, key and value input          │
//! │  - Pluggable value editors and transition rules             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence (persistence.rs) + Storage (store/)            │
//! │  - RemoteCrud / LocalOnly / CallbackDelegate                │
//! │  - ItemStore trait: MemoryItemStore, FileItemStore          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Nothing in this crate writes to stdout/stderr or blocks on user input. Messages for
//! the user go to the injected [`notify::NotificationSink`]; confirmations come back as
//! [`persistence::Confirmation`] values the host answers later. Diagnostics go through
//! `tracing` and are only visible when the host installs a subscriber.
//!
//! ## Testing Strategy
//!
//! Each module carries its own unit tests. List-level behavior is tested against
//! [`store::memory::MemoryItemStore`] with a [`notify::RecordingSink`], so every test
//! can assert both the field contents and what the user was told. Hosts can reuse the
//! fixtures by enabling the `test_utils` feature.
//!
//! ## Module Overview
//!
//! - [`list`]: the list controller
//! - [`rows`]: display and edit rows
//! - [`modes`]: mode registry and the built-in `simple` / `structured` modes
//! - [`persistence`]: strategies, delegate trait, delete confirmation
//! - [`store`]: item stores
//! - [`resolver`]: dotted field paths
//! - [`model`]: items, entries, sessions, hints
//! - [`notify`]: notifications
//! - [`config`]: layered configuration
//! - [`error`]: error type

pub mod config;
pub mod error;
pub mod list;
pub mod model;
pub mod modes;
pub mod notify;
pub mod persistence;
pub mod resolver;
pub mod rows;
pub mod store;

pub use error::{MetaEditError, Result};
pub use list::{DeleteOutcome, ListHeader, MetadataList, MetadataListBuilder};
pub use model::{AccessLevel, Item, MetadataEntry, ModelType};
pub use modes::ModeRegistry;
