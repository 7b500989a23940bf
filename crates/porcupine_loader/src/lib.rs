//! # Porcupine Loader
//!
//! Filesystem side of the mod framework:
//! - [`config`] - Loader settings read from RON
//! - [`discovery`] - Mod folders, `mod.ron` manifests, script archive search
//! - [`archive`] - Listing the entries of jar archives
//! - [`properties`] - Per-mod `.properties` configs, read and written back
//! - [`loader`] - The full load pass and the load-once [`ModuleCache`]
//!
//! Everything here hands plain data to `porcupine_core`, which never touches
//! the disk itself.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod archive;
pub mod config;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod properties;

pub use config::LoaderConfig;
pub use error::{ConfigError, LoadError};
pub use loader::{ModuleCache, ModuleLoader};
pub use properties::PropertiesStore;
