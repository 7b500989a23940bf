//! Aggregation pass over every discovered mod.
//!
//! Given the archive listings of each mod, builds the class namespace,
//! resolves every class entry against the [`ClassRegistry`] and collects the
//! resulting modules and events. Per-class failures are logged and skipped.

use std::fmt;

use crate::capability::Shared;
use crate::class_space::{ArchiveListing, ClassRegistry, ClassSpace, DuplicateClass, DuplicateTracker};
use crate::config::ModuleContext;
use crate::error::ClassError;
use crate::events::{GlobalEvent, RoomEvent};
use crate::module::{aggregate, Module};

/// One mod ready for aggregation.
#[derive(Debug, Clone)]
pub struct ModSource {
    /// Descriptor and config handed to every factory of this mod.
    pub context: ModuleContext,
    /// The mod's script archives.
    pub archives: Vec<ArchiveListing>,
}

/// Whether mods see each other's classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassSpaceMode {
    /// One namespace and duplicate tracker for all mods.
    #[default]
    Shared,
    /// Each mod gets its own namespace and duplicate tracker.
    Isolated,
}

/// Everything one aggregation pass produced.
#[derive(Clone, Default)]
pub struct LoadedModules {
    /// Modules in discovery order.
    pub modules: Vec<Module>,
    /// Global events in discovery order.
    pub global_events: Vec<Shared<dyn GlobalEvent>>,
    /// Room events in discovery order.
    pub room_events: Vec<Shared<dyn RoomEvent>>,
    /// Class names defined by more than one archive.
    pub duplicates: Vec<DuplicateClass>,
    /// Classes that were skipped.
    pub failures: Vec<ClassError>,
}

impl LoadedModules {
    /// True when no module or event was loaded.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.global_events.is_empty() && self.room_events.is_empty()
    }

    /// Failures other than unregistered helper classes.
    pub fn reportable_failures(&self) -> impl Iterator<Item = &ClassError> {
        self.failures.iter().filter(|f| f.is_reportable())
    }

    /// Modules belonging to the mod named `name`.
    pub fn modules_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Module> + 'a {
        self.modules.iter().filter(move |m| m.name() == name)
    }
}

impl fmt::Debug for LoadedModules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModules")
            .field("modules", &self.modules)
            .field("global_events", &self.global_events.len())
            .field("room_events", &self.room_events.len())
            .field("duplicates", &self.duplicates)
            .field("failures", &self.failures)
            .finish()
    }
}

/// Aggregate every class of every mod in `sources`.
pub fn aggregate_mods(
    registry: &ClassRegistry,
    sources: &[ModSource],
    mode: ClassSpaceMode,
) -> LoadedModules {
    let spaces = match mode {
        ClassSpaceMode::Shared => {
            let mut tracker = DuplicateTracker::new();
            let archives = sources
                .iter()
                .enumerate()
                .flat_map(|(owner, source)| source.archives.iter().map(move |a| (owner, a)));
            vec![ClassSpace::build(archives, &mut tracker)]
        }
        ClassSpaceMode::Isolated => sources
            .iter()
            .enumerate()
            .map(|(owner, source)| {
                let mut tracker = DuplicateTracker::new();
                ClassSpace::build(source.archives.iter().map(|a| (owner, a)), &mut tracker)
            })
            .collect(),
    };

    let mut loaded = LoadedModules::default();
    for space in spaces {
        loaded.duplicates.extend_from_slice(space.duplicates());

        for entry in space.entries() {
            let context = &sources[entry.owner].context;
            let definition = registry.resolve(&entry.class_name);

            match aggregate(definition, &entry.class_name, &entry.archive, context) {
                Ok(result) => {
                    if let Some(module) = result.module {
                        tracing::info!(
                            "Loaded module {} ({:?}) from {} [{} {}]",
                            module.class_name(),
                            module.capabilities(),
                            module.archive(),
                            module.name(),
                            module.version()
                        );
                        loaded.modules.push(module);
                    }
                    if let Some(event) = result.global_event {
                        tracing::info!("Loaded global event {} from {}", entry.class_name, entry.archive);
                        loaded.global_events.push(event);
                    }
                    if let Some(event) = result.room_event {
                        tracing::info!("Loaded room event {} from {}", entry.class_name, entry.archive);
                        loaded.room_events.push(event);
                    }
                }
                Err(err @ ClassError::ClassNotFound { .. }) => {
                    tracing::debug!("{}", err);
                    loaded.failures.push(err);
                }
                Err(err @ ClassError::Instantiation { .. }) => {
                    tracing::error!("{}", err);
                    loaded.failures.push(err);
                }
                Err(err @ ClassError::InvalidAggregate { .. }) => {
                    tracing::warn!("{}", err);
                    loaded.failures.push(err);
                }
            }
        }
    }

    loaded
}
