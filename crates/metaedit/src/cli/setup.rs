use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including the git hash for non-release builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{} ({})", VERSION, GIT_HASH)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "metaedit",
    bin_name = "metaedit",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "View and edit key/value metadata on stored items", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Root directory of the item store
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to metaedit.toml in the OS config directory)
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Metadata field to edit, as a dotted path
    #[arg(long, global = true, value_name = "PATH", help_heading = "Options")]
    pub field: Option<String>,

    /// Resource the item is stored under (item, folder, ...)
    #[arg(long, global = true, value_name = "NAME", help_heading = "Options")]
    pub api_path: Option<String>,

    /// Edit in memory only and print the resulting field
    #[arg(long, global = true, help_heading = "Options")]
    pub no_save: bool,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show an item's metadata
    #[command(alias = "ls")]
    List { item: String },

    /// Print one value
    Get { item: String, key: String },

    /// Add or overwrite an entry
    Set {
        item: String,
        key: String,
        value: String,

        /// Parse the value as JSON
        #[arg(short, long)]
        structured: bool,
    },

    /// Rename an entry
    #[command(alias = "mv")]
    Rename {
        item: String,
        old: String,
        new: String,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        item: String,
        key: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Commands {
    pub fn item(&self) -> &str {
        match self {
            Commands::List { item }
            | Commands::Get { item, .. }
            | Commands::Set { item, .. }
            | Commands::Rename { item, .. }
            | Commands::Delete { item, .. } => item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "metaedit",
            "set",
            "i1",
            "k",
            "[1]",
            "--structured",
            "--field",
            "largeImage.meta",
            "--no-save",
        ])
        .unwrap();
        assert_eq!(cli.field.as_deref(), Some("largeImage.meta"));
        assert!(cli.no_save);
        match cli.command {
            Commands::Set {
                ref key,
                ref value,
                structured,
                ..
            } => {
                assert_eq!(key, "k");
                assert_eq!(value, "[1]");
                assert!(structured);
            }
            ref other => panic!("Expected Set, got {other:?}"),
        }
        assert_eq!(cli.command.item(), "i1");
    }

    #[test]
    fn delete_accepts_yes() {
        let cli = Cli::try_parse_from(["metaedit", "rm", "i1", "k", "-y"]).unwrap();
        assert!(matches!(cli.command, Commands::Delete { yes: true, .. }));
    }
}
