//! Per-mod `.properties` configs.
//!
//! A mod's config lives in its `saves/` directory under the first of the
//! configured file names that exists. It is read once at discovery and
//! written back by [`PropertiesStore`] after every save.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use java_properties::PropertiesWriter;
use porcupine_core::config::{ConfigPersistence, ModuleConfig};
use porcupine_core::descriptor::ModuleDescriptor;
use porcupine_core::persist::PersistError;

use crate::config::{config_file_names, LoaderConfig};
use crate::error::ConfigError;

/// Comment written at the top of every persisted config.
pub const CONFIG_HEADER: &str = "Porcupine Aggregate Module Config";

/// Where `descriptor`'s config is read from and written to: the first
/// existing candidate, otherwise the first candidate.
pub fn config_path(descriptor: &ModuleDescriptor, file_names: &[String]) -> Option<PathBuf> {
    let saves = descriptor.paths().saves();
    let candidates: Vec<_> = file_names.iter().map(|name| saves.join(name)).collect();
    candidates
        .iter()
        .find(|path| path.is_file())
        .or_else(|| candidates.first())
        .cloned()
}

/// Read a properties file.
pub fn read_properties(path: &Path) -> Result<ModuleConfig, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let values = java_properties::read(BufReader::new(file)).map_err(|source| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(values.into_iter().collect())
}

/// Write `config` as a properties file, keys in sorted order.
pub fn write_properties(path: &Path, config: &ModuleConfig) -> Result<(), ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    let write_error = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = File::create(path).map_err(io_error)?;

    let mut writer = PropertiesWriter::new(BufWriter::new(file));
    writer.write_comment(CONFIG_HEADER).map_err(write_error)?;
    for (key, value) in config.iter() {
        writer.write(key, value).map_err(write_error)?;
    }
    writer.finish().map_err(write_error)
}

/// Load the config of `descriptor`.
///
/// Never fails: a missing file gives an empty config and a warning, an
/// unreadable one gives an empty config and an error log.
pub fn load_module_config(descriptor: &ModuleDescriptor, file_names: &[String]) -> ModuleConfig {
    let existing = file_names
        .iter()
        .map(|name| descriptor.paths().saves().join(name))
        .find(|path| path.is_file());

    let Some(path) = existing else {
        tracing::warn!(
            "No config found for mod {} in {}",
            descriptor.name(),
            descriptor.paths().saves().display()
        );
        return ModuleConfig::new();
    };

    match read_properties(&path) {
        Ok(config) => {
            tracing::debug!("Loaded {} config keys for {}", config.len(), descriptor.name());
            config
        }
        Err(err) => {
            tracing::error!("{}", err);
            ModuleConfig::new()
        }
    }
}

/// Writes mod configs back to their properties files.
#[derive(Debug, Clone)]
pub struct PropertiesStore {
    file_names: Vec<String>,
}

impl PropertiesStore {
    /// Store using the given file name patterns. `{name}` is replaced by the
    /// mod name, as the loader does.
    pub fn new(file_names: Vec<String>) -> Self {
        Self { file_names }
    }

    /// Store using the loader's configured file names.
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.config_file_names.clone())
    }

    /// Load `descriptor`'s config with this store's file names.
    pub fn load(&self, descriptor: &ModuleDescriptor) -> ModuleConfig {
        load_module_config(descriptor, &config_file_names(&self.file_names, descriptor.name()))
    }
}

impl Default for PropertiesStore {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

impl ConfigPersistence for PropertiesStore {
    fn persist(
        &self,
        descriptor: &ModuleDescriptor,
        config: &ModuleConfig,
    ) -> Result<(), PersistError> {
        let names = config_file_names(&self.file_names, descriptor.name());
        let Some(path) = config_path(descriptor, &names) else {
            tracing::warn!("No config file name configured for {}", descriptor.name());
            return Ok(());
        };

        write_properties(&path, config).map_err(|err| PersistError::Backend {
            context: format!("Failed to persist config of {}", descriptor.name()),
            source: Box::new(err),
        })?;
        tracing::debug!("Persisted config of {} to {}", descriptor.name(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use porcupine_core::descriptor::ModulePaths;
    use porcupine_core::version::Version;
    use porcupine_test_utils::mod_folder::{ModsRoot, FIXTURE_TAG};

    use super::*;

    fn descriptor(root: &ModsRoot, name: &str) -> ModuleDescriptor {
        let paths = ModulePaths::resolve(&root.mod_dir(name).unwrap(), FIXTURE_TAG, "script/jar");
        ModuleDescriptor::new(name, Version::new(1, 0, 0), paths)
    }

    #[test]
    fn test_named_file_wins_over_generic() {
        let root = ModsRoot::new().unwrap();
        root.write_config("raid", "config.properties", &[("k", "generic")])
            .unwrap();
        root.write_config("raid", "raid.properties", &[("k", "named")])
            .unwrap();

        let config = PropertiesStore::default().load(&descriptor(&root, "raid"));

        assert_eq!(config.get("k"), Some("named"));
    }

    #[test]
    fn test_generic_file_is_fallback() {
        let root = ModsRoot::new().unwrap();
        root.write_config("raid", "config.properties", &[("raid.seed", "7")])
            .unwrap();

        let config = PropertiesStore::default().load(&descriptor(&root, "raid"));

        assert_eq!(config.get_parsed::<u64>("raid.seed"), Some(7));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let root = ModsRoot::new().unwrap();
        let config = PropertiesStore::default().load(&descriptor(&root, "none"));
        assert!(config.is_empty());
    }

    #[test]
    fn test_persist_roundtrip() {
        let root = ModsRoot::new().unwrap();
        let descriptor = descriptor(&root, "raid");
        let store = PropertiesStore::default();

        let mut config = ModuleConfig::new();
        config.set("raid.chance_per_second", "0.001");
        config.set("greeting", "hello world = yes");
        store.persist(&descriptor, &config).unwrap();

        let written = descriptor.paths().saves().join("raid.properties");
        let text = fs::read_to_string(&written).unwrap();
        assert!(text.contains(CONFIG_HEADER));

        assert_eq!(store.load(&descriptor), config);
    }

    #[test]
    fn test_store_uses_loader_file_names() {
        let root = ModsRoot::new().unwrap();
        let mut loader = LoaderConfig::default();
        loader.config_file_names = vec!["{name}-settings.properties".to_string()];
        let descriptor = descriptor(&root, "raid");
        let store = PropertiesStore::from_config(&loader);

        let mut config = ModuleConfig::new();
        config.set("k", "v");
        store.persist(&descriptor, &config).unwrap();

        let names = loader.config_file_names_for("raid");
        assert_eq!(names, vec!["raid-settings.properties"]);
        let written = descriptor.paths().saves().join(&names[0]);
        assert_eq!(read_properties(&written).unwrap(), config);
        assert_eq!(load_module_config(&descriptor, &names), config);
    }

    #[test]
    fn test_persist_rewrites_existing_fallback_file() {
        let root = ModsRoot::new().unwrap();
        let generic = root
            .write_config("raid", "config.properties", &[("a", "1")])
            .unwrap();
        let descriptor = descriptor(&root, "raid");

        let mut config = PropertiesStore::default().load(&descriptor);
        config.set("a", "2");
        PropertiesStore::default().persist(&descriptor, &config).unwrap();

        assert_eq!(read_properties(&generic).unwrap().get("a"), Some("2"));
        assert!(!descriptor.paths().saves().join("raid.properties").exists());
    }
}
