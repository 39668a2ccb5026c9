//! # CLI Behavior
//!
//! One possible host for the metadata editor. Items live as JSON documents under the
//! data directory (`<data-dir>/<api-path>/<id>.json`).
//!
//! ## Commands
//!
//! - `metaedit list <item>`: header, expected keys and the sorted entries.
//! - `metaedit get <item> <key>`: the display value of one entry.
//! - `metaedit set <item> <key> <value> [--structured]`: add or overwrite an entry. With
//!   `--structured` the value must be JSON; otherwise it is stored as a string.
//! - `metaedit rename <item> <old> <new>`
//! - `metaedit delete <item> <key> [--yes]`: asks for confirmation unless `--yes`.
//!
//! ## Local-only Editing
//!
//! `--no-save` (or `no_save = true` in the config) never writes the item back. The edit
//! is applied in memory and the resulting field is printed as JSON on stdout. Deletes
//! are not confirmed in this mode.
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap
//! - `commands`: config, logging, dispatch
//! - `render`: output formatting
//! - `prompt`: delete confirmation
//! - `styles`: terminal styles

mod commands;
mod prompt;
mod render;
pub mod setup;
mod styles;

pub use commands::{run, AlreadyReported};
