//! Immutable per-mod metadata.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Well-known directories of a mod, resolved under `<root>/<tag>/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModulePaths {
    root: PathBuf,
    campaigns: PathBuf,
    examples: PathBuf,
    saves: PathBuf,
    scripts: PathBuf,
}

impl ModulePaths {
    /// Resolve the layout of a mod rooted at `mod_root`.
    ///
    /// `scripts_dir` uses `/` separators regardless of platform.
    pub fn resolve(mod_root: &Path, game_version_tag: &str, scripts_dir: &str) -> Self {
        let versioned = mod_root.join(game_version_tag);
        let scripts = scripts_dir
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(versioned.clone(), |path, part| path.join(part));

        Self {
            root: mod_root.to_path_buf(),
            campaigns: versioned.join("campaigns"),
            examples: versioned.join("examples"),
            saves: versioned.join("saves"),
            scripts,
        }
    }

    /// Mod root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Campaign definitions.
    pub fn campaigns(&self) -> &Path {
        &self.campaigns
    }

    /// Example content.
    pub fn examples(&self) -> &Path {
        &self.examples
    }

    /// Saves directory; also holds the mod's config file.
    pub fn saves(&self) -> &Path {
        &self.saves
    }

    /// Directory searched for script archives.
    pub fn scripts(&self) -> &Path {
        &self.scripts
    }
}

/// Identity and layout of one discovered mod.
///
/// Built once per mod directory and never mutated afterwards. Modules hold a
/// shared handle; [`crate::config::ModuleBase`] keeps its own clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    name: String,
    description: String,
    author: String,
    version: Version,
    paths: ModulePaths,
    archives: Vec<PathBuf>,
}

impl ModuleDescriptor {
    /// Create a descriptor with empty description, author and archive list.
    pub fn new(name: impl Into<String>, version: Version, paths: ModulePaths) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            author: String::new(),
            version,
            paths,
            archives: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the archives found under the scripts directory.
    pub fn with_archives(mut self, archives: Vec<PathBuf>) -> Self {
        self.archives = archives;
        self
    }

    /// Mod name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Author credit.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Declared version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Resolved directories.
    pub fn paths(&self) -> &ModulePaths {
        &self.paths
    }

    /// Script archives, sorted by path.
    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }
}
