//! # Porcupine Core
//!
//! Mod framework core for the Porcupine scripting extension.
//!
//! This crate contains **only** in-memory logic:
//! - No filesystem IO (archive reading and config files live in `porcupine_loader`)
//! - No rendering (the host supplies a [`capability::Renderer`])
//! - No global mutable state (every registry is an owned value)
//!
//! This separation enables:
//! - Testing the whole aggregation pipeline against in-memory archive listings
//! - Hosting several independent load sessions in one process
//! - Deterministic raid composition under a seeded RNG
//!
//! ## Crate Structure
//!
//! - [`capability`] - The four capability traits and the capability set builder
//! - [`version`] - Semantic versions of mods
//! - [`descriptor`] - Immutable per-mod metadata and well-known paths
//! - [`config`] - Per-mod key/value configuration and module base helpers
//! - [`class_space`] - Class registry, class namespace, duplicate tracking
//! - [`module`] - Capability-tagged module records and the aggregator
//! - [`registry`] - The aggregation pass over every discovered mod
//! - [`events`] - Scripted global and room events
//! - [`statistics`] - Cached settlement statistics
//! - [`raid`] - Raid budget, army composer, and the raid event
//! - [`dispatcher`] - Per-tick/per-frame/save/load fan-out
//! - [`builtin`] - Classes shipped with the framework itself

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builtin;
pub mod capability;
pub mod class_space;
pub mod config;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod module;
pub mod persist;
pub mod raid;
pub mod registry;
pub mod statistics;
pub mod version;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::capability::{
        Capability, CapabilitySet, Facets, RenderCapable, Renderer, ScriptEntity, Serializable,
        Shared, TickCapable,
    };
    pub use crate::class_space::{
        ArchiveEntry, ArchiveListing, ClassDefinition, ClassRegistry, ClassSpace, DuplicateTracker,
    };
    pub use crate::config::{ConfigPersistence, ModuleBase, ModuleConfig, ModuleContext, SharedConfig};
    pub use crate::descriptor::{ModuleDescriptor, ModulePaths};
    pub use crate::dispatcher::{Dispatcher, HostWorld};
    pub use crate::error::{ClassError, ConstructError};
    pub use crate::events::{GlobalEvent, RoomEvent, RoomInstance};
    pub use crate::module::Module;
    pub use crate::persist::{PersistError, SaveBuffer, StateReader, StateWriter};
    pub use crate::raid::{ArmyBudget, ArmyBudgetDivision, ArmyComposer, ComposerConfig};
    pub use crate::registry::{aggregate_mods, ClassSpaceMode, LoadedModules, ModSource};
    pub use crate::version::Version;
}
