//! # Configuration
//!
//! Settings are loaded with [`confique`], in priority order:
//!
//! 1. **Environment variables**: `METAEDIT_FIELD_NAME`, `METAEDIT_API_PATH`,
//!    `METAEDIT_NO_SAVE`, `METAEDIT_DATA_DIR`.
//! 2. **Config file**: the path given by the host (`--config`), or `metaedit.toml` in the
//!    OS config directory (via `directories`).
//! 3. **Compiled defaults**.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `field_name` | `meta` | Dotted path of the metadata field inside each item |
//! | `api_path` | *(none)* | Resource the items are served from (`item` when unset) |
//! | `no_save` | `false` | Keep edits in memory only |
//! | `data_dir` | OS data dir | Root of the file item store |
//! | `item_metadata` | *(none)* | Expected keys shown in the list header |
//!
//! Item metadata hints are file-only:
//!
//! ```toml
//! [[item_metadata]]
//! value = "stain"
//! title = "Stain"
//! type = "enum"
//! enum = ["H&E", "IHC"]
//! ```

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MetaEditError, Result};
use crate::model::{ItemMetadataHint, DEFAULT_FIELD_NAME};

pub const CONFIG_FILE_NAME: &str = "metaedit.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetaEditConfig {
    /// Dotted path of the metadata field inside each item.
    #[config(default = "meta", env = "METAEDIT_FIELD_NAME")]
    pub field_name: String,

    /// Resource path items are served from.
    #[config(env = "METAEDIT_API_PATH")]
    pub api_path: Option<String>,

    /// Keep edits in memory only.
    #[config(default = false, env = "METAEDIT_NO_SAVE")]
    pub no_save: bool,

    #[config(env = "METAEDIT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    pub item_metadata: Option<Vec<ItemMetadataHint>>,
}

impl Default for MetaEditConfig {
    fn default() -> Self {
        Self {
            field_name: DEFAULT_FIELD_NAME.to_string(),
            api_path: None,
            no_save: false,
            data_dir: None,
            item_metadata: None,
        }
    }
}

impl MetaEditConfig {
    /// Load environment, then `path` (or the default config file), then defaults.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.exists() => {
                return Err(MetaEditError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )))
            }
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let mut builder = Self::builder().env();
        if let Some(file) = &file {
            tracing::debug!(path = %file.display(), "loading config file");
            builder = builder.file(file);
        }
        builder
            .load()
            .map_err(|e| MetaEditError::Config(e.to_string()))
    }

    /// Where the file item store lives.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                MetaEditError::Config("no data directory configured or available".to_string())
            })
    }

    pub fn item_metadata(&self) -> Vec<ItemMetadataHint> {
        self.item_metadata.clone().unwrap_or_default()
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "metaedit")
}

/// `metaedit.toml` in the OS config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults() {
        let config = MetaEditConfig::default();
        assert_eq!(config.field_name, "meta");
        assert!(!config.no_save);
        assert!(config.item_metadata().is_empty());
    }

    #[test]
    fn reads_toml_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
field_name = "largeImage.meta"
api_path = "folder"
data_dir = "/srv/items"

[[item_metadata]]
value = "stain"
title = "Stain"
type = "enum"
enum = ["H&E", "IHC"]
required = true
"#,
        )
        .unwrap();

        let config = MetaEditConfig::builder().file(&path).load().unwrap();
        assert_eq!(config.field_name, "largeImage.meta");
        assert_eq!(config.api_path.as_deref(), Some("folder"));
        assert_eq!(
            config.resolve_data_dir().unwrap(),
            PathBuf::from("/srv/items")
        );

        let hints = config.item_metadata();
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].label(), "Stain");
        assert_eq!(hints[0].kind.as_deref(), Some("enum"));
        assert_eq!(hints[0].choices, vec!["H&E", "IHC"]);
        assert!(hints[0].required);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let result = MetaEditConfig::load(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(MetaEditError::Config(_))));
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let config = MetaEditConfig::builder().load().unwrap();
        assert_eq!(config.field_name, DEFAULT_FIELD_NAME);
        assert!(!config.no_save);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn default_path_is_named_after_the_tool() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }
}
