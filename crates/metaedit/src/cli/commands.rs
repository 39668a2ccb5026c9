//! # CLI Layer
//!
//! The only place that knows about stdout, stderr and exit codes.
//!
//! ## Responsibilities
//!
//! 1. **Configuration**: load `MetaEditConfig`, then apply command-line overrides
//! 2. **Logging**: install the `tracing` subscriber (`METAEDIT_LOG`, `-v`)
//! 3. **Dispatch**: open a `MetadataList` on the item and drive it like a user would
//! 4. **Output**: rendered views on stdout, notifications on stderr

use anyhow::{anyhow, Result};
use clap::Parser;
use metaeditapp::config::MetaEditConfig;
use metaeditapp::list::{DeleteOutcome, MetadataList};
use metaeditapp::model::{AccessLevel, FieldTarget};
use metaeditapp::modes::{SIMPLE, STRUCTURED};
use metaeditapp::notify::{Notification, NotificationSink};
use metaeditapp::rows::{Row, RowId};
use metaeditapp::store::fs::FileItemStore;
use metaeditapp::store::ItemStore;
use serde_json::Value;
use std::fmt;
use tracing_subscriber::EnvFilter;

use super::setup::{Cli, Commands};
use super::{prompt, render, styles};

/// An error the user has already been told about through the notification sink.
#[derive(Debug)]
pub struct AlreadyReported;

impl fmt::Display for AlreadyReported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation rejected")
    }
}

impl std::error::Error for AlreadyReported {}

/// Prints notifications on stderr.
#[derive(Debug, Default, Clone, Copy)]
struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn notify(&self, notification: Notification) {
        eprintln!(
            "{}",
            styles::for_severity(notification.severity).apply_to(&notification.text)
        );
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context::load(&cli)?;
    match &cli.command {
        Commands::List { item } => list(&ctx, item),
        Commands::Get { item, key } => get(&ctx, item, key),
        Commands::Set {
            item,
            key,
            value,
            structured,
        } => set(&ctx, item, key, value, *structured),
        Commands::Rename { item, old, new } => rename(&ctx, item, old, new),
        Commands::Delete { item, key, yes } => delete(&ctx, item, key, *yes),
    }
}

/// `-v` forces debug output; otherwise `METAEDIT_LOG` applies, defaulting to warnings.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("METAEDIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

struct Context {
    config: MetaEditConfig,
    store: FileItemStore,
}

impl Context {
    fn load(cli: &Cli) -> Result<Self> {
        let mut config = MetaEditConfig::load(cli.config.as_deref())?;
        if let Some(field) = &cli.field {
            config.field_name = field.clone();
        }
        if cli.api_path.is_some() {
            config.api_path = cli.api_path.clone();
        }
        if cli.data_dir.is_some() {
            config.data_dir = cli.data_dir.clone();
        }
        if cli.no_save {
            config.no_save = true;
        }

        let root = config.resolve_data_dir()?;
        tracing::debug!(
            root = %root.display(),
            field = %config.field_name,
            no_save = config.no_save,
            "context loaded"
        );
        Ok(Self {
            store: FileItemStore::new(root),
            config,
        })
    }

    fn open_list(&self, item_id: &str) -> Result<MetadataList> {
        let target = FieldTarget::new(self.config.field_name.clone())
            .with_path(self.config.api_path.clone());
        let item = self.store.get_item(item_id, target.resource())?;

        let builder = MetadataList::builder(item)
            .with_field_name(target.field)
            .with_api_path(target.path)
            .with_access_level(AccessLevel::Admin)
            .with_no_save(self.config.no_save)
            .with_notifier(TerminalSink)
            .with_item_metadata(self.config.item_metadata());
        let builder = if self.config.no_save {
            builder
        } else {
            builder.with_store(self.store.clone())
        };
        Ok(builder.build()?)
    }

    /// Report a finished edit: the field as JSON when nothing is saved, a message otherwise.
    fn finish(&self, list: &MetadataList, message: String) -> Result<()> {
        if self.config.no_save {
            println!("{}", serde_json::to_string_pretty(&Value::Object(list.field()))?);
        } else {
            TerminalSink.notify(Notification::success(message));
        }
        Ok(())
    }
}

/// The list has already notified the user about the failure.
fn reported<T>(result: metaeditapp::Result<T>) -> Result<T> {
    result.map_err(|err| {
        tracing::debug!(error = %err, "operation rejected");
        anyhow::Error::new(AlreadyReported)
    })
}

fn find_row(list: &MetadataList, key: &str) -> Result<RowId> {
    list.row_for_key(key)
        .map(Row::id)
        .ok_or_else(|| anyhow!("{} is not a metadata key", key))
}

fn list(ctx: &Context, item_id: &str) -> Result<()> {
    let list = ctx.open_list(item_id)?;
    print!("{}", render::list_view(&list.header(), list.rows()));
    Ok(())
}

fn get(ctx: &Context, item_id: &str, key: &str) -> Result<()> {
    let list = ctx.open_list(item_id)?;
    let id = find_row(&list, key)?;
    println!("{}", list.row(id)?.as_display()?.display_value());
    Ok(())
}

fn set(ctx: &Context, item_id: &str, key: &str, value: &str, structured: bool) -> Result<()> {
    let mut list = ctx.open_list(item_id)?;
    let id = match list.row_for_key(key).map(Row::id) {
        Some(id) => {
            reported(list.begin_edit(id))?;
            id
        }
        None => reported(list.add_entry_by_key(key))?,
    };

    let row = list.edit_row_mut(id)?;
    row.set_key_input(key);
    row.set_text(value);
    // Typing first, then switching, makes the target mode validate the new text.
    let mode = if structured { STRUCTURED } else { SIMPLE };
    reported(list.toggle_mode(id, mode))?;
    reported(list.save(id))?;

    ctx.finish(&list, format!("Saved {}", key.trim()))
}

fn rename(ctx: &Context, item_id: &str, old: &str, new: &str) -> Result<()> {
    let mut list = ctx.open_list(item_id)?;
    let id = find_row(&list, old)?;
    reported(list.begin_edit(id))?;
    list.edit_row_mut(id)?.set_key_input(new);
    reported(list.save(id))?;

    ctx.finish(&list, format!("Renamed {} to {}", old, new.trim()))
}

fn delete(ctx: &Context, item_id: &str, key: &str, yes: bool) -> Result<()> {
    let mut list = ctx.open_list(item_id)?;
    let id = find_row(&list, key)?;
    reported(list.begin_edit(id))?;

    if let DeleteOutcome::ConfirmationRequired(confirmation) = reported(list.delete(id))? {
        if !(yes || prompt::confirm(&confirmation)?) {
            list.dismiss_delete(id)?;
            TerminalSink.notify(Notification::info("Delete cancelled"));
            return Ok(());
        }
        reported(list.confirm_delete(id))?;
    }

    ctx.finish(&list, format!("Deleted {}", key))
}
