//! Loader configuration.
//!
//! Read from a RON file; every field has a default so a config may be as
//! small as `(mod_roots: ["mods"])`.

use std::fs;
use std::path::{Path, PathBuf};

use porcupine_core::registry::ClassSpaceMode;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};

/// Placeholder replaced by the mod name in [`LoaderConfig::config_file_names`].
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Where to look for mods and how they are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directories whose child directories are mods.
    pub mod_roots: Vec<PathBuf>,
    /// Game version directory inside each mod.
    pub game_version_tag: String,
    /// Scripts directory below the version directory, `/`-separated.
    pub scripts_dir: String,
    /// Extension of script archives, without the dot.
    pub archive_extension: String,
    /// One class namespace for all mods (`true`) or one per mod.
    pub shared_class_space: bool,
    /// Config file names tried in order inside `saves/`.
    pub config_file_names: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            mod_roots: Vec::new(),
            game_version_tag: "V63".to_string(),
            scripts_dir: "script/jar".to_string(),
            archive_extension: "jar".to_string(),
            shared_class_space: true,
            config_file_names: vec![
                format!("{NAME_PLACEHOLDER}.properties"),
                "config.properties".to_string(),
            ],
        }
    }
}

impl LoaderConfig {
    /// Default layout over the given roots.
    pub fn with_roots(mod_roots: Vec<PathBuf>) -> Self {
        Self {
            mod_roots,
            ..Self::default()
        }
    }

    /// Parse from RON text.
    pub fn from_ron(text: &str) -> std::result::Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Read and parse a RON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text).map_err(|source| LoadError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Class namespace mode implied by `shared_class_space`.
    pub fn class_space_mode(&self) -> ClassSpaceMode {
        if self.shared_class_space {
            ClassSpaceMode::Shared
        } else {
            ClassSpaceMode::Isolated
        }
    }

    /// Config file names for `mod_name`, in lookup order.
    pub fn config_file_names_for(&self, mod_name: &str) -> Vec<String> {
        config_file_names(&self.config_file_names, mod_name)
    }
}

/// Substitute `mod_name` for [`NAME_PLACEHOLDER`] in each pattern.
pub fn config_file_names(patterns: &[String], mod_name: &str) -> Vec<String> {
    patterns
        .iter()
        .map(|pattern| pattern.replace(NAME_PLACEHOLDER, mod_name))
        .collect()
}
