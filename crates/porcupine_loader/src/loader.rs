//! The load pass.
//!
//! ```text
//! discover mods -> list archives -> read configs -> aggregate classes
//! ```
//!
//! Any archive or directory failure aborts the pass. Per-class failures are
//! collected in [`LoadedModules::failures`] and never abort.

use std::cell::OnceCell;

use porcupine_core::class_space::{ArchiveListing, ClassRegistry};
use porcupine_core::config::ModuleContext;
use porcupine_core::descriptor::ModuleDescriptor;
use porcupine_core::registry::{aggregate_mods, LoadedModules, ModSource};

use crate::archive::read_listing;
use crate::config::LoaderConfig;
use crate::discovery::discover_mods;
use crate::error::Result;
use crate::properties::load_module_config;

/// Loads every mod under the configured roots against one class registry.
#[derive(Debug)]
pub struct ModuleLoader {
    config: LoaderConfig,
    registry: ClassRegistry,
}

impl ModuleLoader {
    /// Loader over `config` resolving classes through `registry`.
    pub fn new(config: LoaderConfig, registry: ClassRegistry) -> Self {
        Self { config, registry }
    }

    /// Loader settings.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Known classes.
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Descriptors and configs of every mod, archives listed.
    pub fn sources(&self) -> Result<Vec<ModSource>> {
        let mut sources = Vec::new();
        for descriptor in discover_mods(&self.config)? {
            sources.push(self.source_for(descriptor)?);
        }
        Ok(sources)
    }

    fn source_for(&self, descriptor: ModuleDescriptor) -> Result<ModSource> {
        let archives = descriptor
            .archives()
            .iter()
            .map(|path| read_listing(path))
            .collect::<Result<Vec<ArchiveListing>>>()?;

        let file_names = self.config.config_file_names_for(descriptor.name());
        let config = load_module_config(&descriptor, &file_names);

        Ok(ModSource {
            context: ModuleContext::new(descriptor, config),
            archives,
        })
    }

    /// Run the full pass.
    pub fn load(&self) -> Result<LoadedModules> {
        let sources = self.sources()?;

        let archive_count: usize = sources.iter().map(|s| s.archives.len()).sum();
        if archive_count == 0 {
            tracing::warn!("No script archives found in any mod");
        }

        let loaded = aggregate_mods(&self.registry, &sources, self.config.class_space_mode());
        tracing::info!(
            "Loaded {} modules, {} global events, {} room events from {} mods ({} archives)",
            loaded.modules.len(),
            loaded.global_events.len(),
            loaded.room_events.len(),
            sources.len(),
            archive_count
        );
        Ok(loaded)
    }

    /// Run the full pass; a fatal error is logged and yields nothing.
    pub fn load_or_empty(&self) -> LoadedModules {
        self.load().unwrap_or_else(|err| {
            tracing::error!("Module loading aborted: {}", err);
            LoadedModules::default()
        })
    }
}

/// Load-once holder for a session's modules.
///
/// The first [`ModuleCache::get_or_load`] runs the pass; later calls return
/// the same collection, even when the first pass failed.
#[derive(Debug, Default)]
pub struct ModuleCache {
    loaded: OnceCell<LoadedModules>,
}

impl ModuleCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached modules, loading them with `loader` on first use.
    pub fn get_or_load(&self, loader: &ModuleLoader) -> &LoadedModules {
        self.loaded.get_or_init(|| loader.load_or_empty())
    }

    /// Cached modules if a pass has run.
    pub fn get(&self) -> Option<&LoadedModules> {
        self.loaded.get()
    }

    /// Whether a pass has run.
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Take the cached modules out, leaving the cache empty.
    pub fn take(&mut self) -> Option<LoadedModules> {
        self.loaded.take()
    }
}
