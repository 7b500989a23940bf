//! Mod folder scanner.
//!
//! Runs discovery and archive listing exactly as the game would, then
//! reports what each mod ships. Classes are resolved against the built-in
//! registry only, so plugin classes show up as unregistered.

use std::fmt;

use porcupine_core::builtin::builtin_classes;
use porcupine_core::class_space::{ClassSpace, DuplicateClass, DuplicateTracker};
use porcupine_core::registry::{aggregate_mods, ClassSpaceMode};
use porcupine_loader::{LoaderConfig, ModuleLoader};

use crate::error::Result;

/// One archive of a mod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Archive file name.
    pub name: String,
    /// Class entries, excluding metadata classes.
    pub classes: usize,
}

/// One discovered mod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModReport {
    /// Mod name.
    pub name: String,
    /// Version, display form.
    pub version: String,
    /// Author credit.
    pub author: String,
    /// Archives in path order.
    pub archives: Vec<ArchiveReport>,
    /// Config keys loaded.
    pub config_keys: usize,
}

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Mods in discovery order.
    pub mods: Vec<ModReport>,
    /// Classes defined by more than one archive.
    pub duplicates: Vec<DuplicateClass>,
    /// Built-in modules found in the archives.
    pub builtin_modules: usize,
}

impl ScanReport {
    /// Total archives over all mods.
    pub fn archive_count(&self) -> usize {
        self.mods.iter().map(|m| m.archives.len()).sum()
    }
}

/// Scan every mod `config` points at.
pub fn scan(config: &LoaderConfig) -> Result<ScanReport> {
    let loader = ModuleLoader::new(config.clone(), builtin_classes());
    let sources = loader.sources()?;

    let mods = sources
        .iter()
        .map(|source| {
            let descriptor = source.context.descriptor();
            ModReport {
                name: descriptor.name().to_string(),
                version: descriptor.version().to_string(),
                author: descriptor.author().to_string(),
                archives: source
                    .archives
                    .iter()
                    .map(|archive| ArchiveReport {
                        name: archive.name.clone(),
                        classes: archive.class_names().count(),
                    })
                    .collect(),
                config_keys: source.context.config().borrow().len(),
            }
        })
        .collect();

    let duplicates = match config.class_space_mode() {
        ClassSpaceMode::Shared => {
            let mut tracker = DuplicateTracker::new();
            let archives = sources
                .iter()
                .enumerate()
                .flat_map(|(owner, source)| source.archives.iter().map(move |a| (owner, a)));
            ClassSpace::build(archives, &mut tracker).duplicates().to_vec()
        }
        ClassSpaceMode::Isolated => Vec::new(),
    };

    let loaded = aggregate_mods(loader.registry(), &sources, config.class_space_mode());

    Ok(ScanReport {
        mods,
        duplicates,
        builtin_modules: loaded.modules.len(),
    })
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} mods, {} archives, {} built-in modules",
            self.mods.len(),
            self.archive_count(),
            self.builtin_modules
        )?;
        for report in &self.mods {
            writeln!(
                f,
                "  {} {} by {} ({} config keys)",
                report.name,
                report.version,
                if report.author.is_empty() { "unknown" } else { report.author.as_str() },
                report.config_keys
            )?;
            if report.archives.is_empty() {
                writeln!(f, "    no archives")?;
            }
            for archive in &report.archives {
                writeln!(f, "    {}: {} classes", archive.name, archive.classes)?;
            }
        }
        for duplicate in &self.duplicates {
            writeln!(
                f,
                "  duplicate {} in {} and {}",
                duplicate.class_name, duplicate.first_archive, duplicate.duplicate_archive
            )?;
        }
        Ok(())
    }
}
