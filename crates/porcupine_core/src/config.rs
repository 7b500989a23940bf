//! Per-mod key/value configuration.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::str::FromStr;

use crate::descriptor::ModuleDescriptor;
use crate::persist::PersistError;

/// Sorted string key/value store bound to one mod.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleConfig {
    values: BTreeMap<String, String>,
}

/// Config handle shared between a mod's modules and the dispatcher.
pub type SharedConfig = Rc<RefCell<ModuleConfig>>;

impl ModuleConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a shared handle.
    pub fn into_shared(self) -> SharedConfig {
        Rc::new(RefCell::new(self))
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Value for `key` parsed as `T`. Absent and unparsable values both give `None`.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| value.trim().parse().ok())
    }

    /// Store a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Whether `key` is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no key is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl Extend<(String, String)> for ModuleConfig {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

impl FromIterator<(String, String)> for ModuleConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Host-side storage for mod configs.
pub trait ConfigPersistence {
    /// Write `config` back to wherever `descriptor`'s config lives.
    fn persist(&self, descriptor: &ModuleDescriptor, config: &ModuleConfig)
        -> Result<(), PersistError>;
}

/// What a class factory receives: the mod's descriptor and config.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    descriptor: Rc<ModuleDescriptor>,
    config: SharedConfig,
}

impl ModuleContext {
    /// Bind a descriptor to its config.
    pub fn new(descriptor: ModuleDescriptor, config: ModuleConfig) -> Self {
        Self {
            descriptor: Rc::new(descriptor),
            config: config.into_shared(),
        }
    }

    /// Descriptor handle.
    pub fn descriptor(&self) -> &Rc<ModuleDescriptor> {
        &self.descriptor
    }

    /// Config handle.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Helper for plugin authors that want a base to embed.
    pub fn base(&self) -> ModuleBase {
        ModuleBase::from_context(self)
    }

    /// Whether two contexts belong to the same mod.
    pub fn same_mod(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.config, &other.config)
    }
}

/// Embeddable helper holding a mod's descriptor and config.
#[derive(Debug, Clone)]
pub struct ModuleBase {
    descriptor: ModuleDescriptor,
    config: SharedConfig,
}

impl ModuleBase {
    /// Take a descriptor clone and a config handle from `context`.
    pub fn from_context(context: &ModuleContext) -> Self {
        Self {
            descriptor: ModuleDescriptor::clone(&context.descriptor),
            config: Rc::clone(&context.config),
        }
    }

    /// The mod this base belongs to.
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Copy of a config value.
    pub fn config_value(&self, key: &str) -> Option<String> {
        self.config.borrow().get(key).map(str::to_string)
    }

    /// Parsed config value.
    pub fn config_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.config.borrow().get_parsed(key)
    }

    /// Update a config value, returning the previous one.
    pub fn set_config(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.config.borrow_mut().set(key, value)
    }

    /// Write the config through `store`.
    pub fn persist_config(&self, store: &dyn ConfigPersistence) -> Result<(), PersistError> {
        store.persist(&self.descriptor, &self.config.borrow())
    }
}
