//! Mod folder discovery.
//!
//! Every child directory of a mods root is one mod:
//!
//! ```text
//! <root>/<mod>/mod.ron                     manifest (optional)
//! <root>/<mod>/<tag>/campaigns
//! <root>/<mod>/<tag>/examples
//! <root>/<mod>/<tag>/saves                 config lives here
//! <root>/<mod>/<tag>/<scripts_dir>/**.jar  script archives
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use porcupine_core::descriptor::{ModuleDescriptor, ModulePaths};
use porcupine_core::version::Version;
use serde::{Deserialize, Serialize};

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};

/// Manifest file name inside a mod directory.
pub const MANIFEST_FILE: &str = "mod.ron";

/// Contents of `mod.ron`. Missing fields fall back to the directory name
/// and version `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModManifest {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Author credit.
    pub author: String,
    /// Version string, `major[.minor[.patch[-suffix]]]`.
    pub version: String,
}

impl ModManifest {
    /// Read the manifest of the mod at `mod_root`.
    ///
    /// A missing or malformed manifest yields the default manifest and a
    /// warning; it never fails the load.
    pub fn read(mod_root: &Path) -> Self {
        let path = mod_root.join(MANIFEST_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => {
                tracing::warn!("No {} in {}, using defaults", MANIFEST_FILE, mod_root.display());
                return Self::default();
            }
        };

        match ron::from_str(&text) {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::warn!("Ignoring malformed {}: {}", path.display(), err);
                Self::default()
            }
        }
    }
}

/// Describe the mod rooted at `mod_root`.
pub fn describe_mod(mod_root: &Path, config: &LoaderConfig) -> Result<ModuleDescriptor> {
    let manifest = ModManifest::read(mod_root);

    let name = if manifest.name.trim().is_empty() {
        directory_name(mod_root)
    } else {
        manifest.name.clone()
    };

    let version = if manifest.version.trim().is_empty() {
        Version::default()
    } else {
        manifest.version.parse().unwrap_or_else(|err| {
            tracing::warn!("Mod {} has an invalid version: {}", name, err);
            Version::default()
        })
    };

    let paths = ModulePaths::resolve(mod_root, &config.game_version_tag, &config.scripts_dir);
    let archives = find_archives(paths.scripts(), &config.archive_extension)?;
    if archives.is_empty() {
        tracing::warn!(
            "No .{} archives found for mod {} in {}",
            config.archive_extension,
            name,
            paths.scripts().display()
        );
    }

    Ok(ModuleDescriptor::new(name, version, paths)
        .with_description(manifest.description)
        .with_author(manifest.author)
        .with_archives(archives))
}

/// Describe every mod under every configured root, root by root, each root
/// in path order. A missing root is skipped with a warning.
pub fn discover_mods(config: &LoaderConfig) -> Result<Vec<ModuleDescriptor>> {
    let mut descriptors = Vec::new();

    for root in &config.mod_roots {
        if !root.is_dir() {
            tracing::warn!("Mods root {} does not exist", root.display());
            continue;
        }

        for mod_root in sorted_children(root)?.into_iter().filter(|p| p.is_dir()) {
            let descriptor = describe_mod(&mod_root, config)?;
            tracing::info!(
                "Discovered mod {} {} at {}",
                descriptor.name(),
                descriptor.version(),
                mod_root.display()
            );
            descriptors.push(descriptor);
        }
    }

    Ok(descriptors)
}

/// Every file below `dir` whose extension is `extension` (ASCII
/// case-insensitive), sorted by path. A missing directory yields nothing.
pub fn find_archives(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    if dir.is_dir() {
        collect_archives(dir, extension, &mut archives)?;
    }
    archives.sort();
    Ok(archives)
}

fn collect_archives(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    for path in sorted_children(dir)? {
        if path.is_dir() {
            collect_archives(&path, extension, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        {
            out.push(path);
        }
    }
    Ok(())
}

fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_error = |source| LoadError::ModsIo {
        path: dir.to_path_buf(),
        source,
    };

    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        children.push(entry.map_err(io_error)?.path());
    }
    children.sort();
    Ok(children)
}

fn directory_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
