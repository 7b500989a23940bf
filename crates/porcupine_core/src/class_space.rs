//! Class registry and class namespace.
//!
//! Plugins register their concrete types by fully-qualified class name in a
//! [`ClassRegistry`]. Archives dropped into a mod folder then decide *which*
//! of those classes are active: a class is only instantiated when its name
//! appears as a `.class` entry in one of the scanned archives.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::capability::CapabilitySet;
use crate::config::ModuleContext;
use crate::error::ConstructError;
use crate::events::{GlobalEvent, RoomEvent, ScriptedEvent};

/// Builds a module's capability set.
pub type ModuleFactory = Rc<dyn Fn(&ModuleContext) -> Result<CapabilitySet, ConstructError>>;

/// Builds a global event.
pub type GlobalEventFactory =
    Rc<dyn Fn(&ModuleContext) -> Result<ScriptedEvent<dyn GlobalEvent>, ConstructError>>;

/// Builds a room event.
pub type RoomEventFactory =
    Rc<dyn Fn(&ModuleContext) -> Result<ScriptedEvent<dyn RoomEvent>, ConstructError>>;

/// How a registered class is turned into an instance.
#[derive(Clone)]
pub enum ClassDefinition {
    /// Declared but never instantiated.
    Interface,
    /// A module.
    Module(ModuleFactory),
    /// A global event.
    GlobalEvent(GlobalEventFactory),
    /// A room event.
    RoomEvent(RoomEventFactory),
}

impl ClassDefinition {
    /// Short label for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Interface => "interface",
            Self::Module(_) => "module",
            Self::GlobalEvent(_) => "global event",
            Self::RoomEvent(_) => "room event",
        }
    }
}

impl fmt::Debug for ClassDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Static plugin registration table.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, ClassDefinition>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. The first registration of a name wins;
    /// returns `false` when the name was already taken.
    pub fn register(&mut self, class_name: impl Into<String>, definition: ClassDefinition) -> bool {
        let class_name = class_name.into();
        if self.classes.contains_key(&class_name) {
            tracing::warn!(
                "Class {} is already registered; keeping the first registration",
                class_name
            );
            return false;
        }
        self.classes.insert(class_name, definition);
        true
    }

    /// Register a name that must never be instantiated.
    pub fn register_interface(&mut self, class_name: impl Into<String>) -> bool {
        self.register(class_name, ClassDefinition::Interface)
    }

    /// Register a module factory.
    pub fn register_module<F>(&mut self, class_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(&ModuleContext) -> Result<CapabilitySet, ConstructError> + 'static,
    {
        self.register(class_name, ClassDefinition::Module(Rc::new(factory)))
    }

    /// Register a global event factory.
    pub fn register_global_event<F>(&mut self, class_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(&ModuleContext) -> Result<ScriptedEvent<dyn GlobalEvent>, ConstructError> + 'static,
    {
        self.register(class_name, ClassDefinition::GlobalEvent(Rc::new(factory)))
    }

    /// Register a room event factory.
    pub fn register_room_event<F>(&mut self, class_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(&ModuleContext) -> Result<ScriptedEvent<dyn RoomEvent>, ConstructError> + 'static,
    {
        self.register(class_name, ClassDefinition::RoomEvent(Rc::new(factory)))
    }

    /// Copy every definition of `other` that is not already registered.
    pub fn merge(&mut self, other: &Self) {
        for (name, definition) in &other.classes {
            self.classes
                .entry(name.clone())
                .or_insert_with(|| definition.clone());
        }
    }

    /// Definition registered under `class_name`.
    pub fn resolve(&self, class_name: &str) -> Option<&ClassDefinition> {
        self.classes.get(class_name)
    }

    /// Whether `class_name` is registered.
    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.classes.iter()).finish()
    }
}

/// One entry of an archive's central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive, `/`-separated.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl ArchiveEntry {
    /// A file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// A directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// The entries of one script archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveListing {
    /// File name, used in log messages.
    pub name: String,
    /// Location on disk.
    pub path: PathBuf,
    /// Entries in archive order.
    pub entries: Vec<ArchiveEntry>,
}

impl ArchiveListing {
    /// Listing for an archive at `path`; the name is the path's file name.
    pub fn new(path: impl Into<PathBuf>, entries: Vec<ArchiveEntry>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            name,
            path,
            entries,
        }
    }

    /// Class names exposed by this archive, in entry order.
    pub fn class_names(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().filter_map(class_name_from_entry)
    }
}

const METADATA_CLASSES: [&str; 2] = ["package-info", "module-info"];

/// Map `org/foo/Bar.class` to `org.foo.Bar`.
///
/// Directories, non-class files and package/module metadata give `None`.
pub fn class_name_from_entry(entry: &ArchiveEntry) -> Option<String> {
    if entry.is_dir || entry.name.ends_with('/') {
        return None;
    }
    let stem = entry.name.strip_suffix(".class")?;
    let simple_name = stem.rsplit('/').next().unwrap_or(stem);
    if simple_name.is_empty() || METADATA_CLASSES.contains(&simple_name) {
        return None;
    }
    Some(stem.trim_start_matches('/').replace('/', "."))
}

/// Outcome of observing a class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sighting {
    /// First time this session.
    First,
    /// Already seen in `first_archive`.
    Duplicate {
        /// Archive the class was first seen in.
        first_archive: String,
    },
}

/// Session-scoped map of class name to the archive it was first seen in.
///
/// Only grows; one tracker per load session.
#[derive(Debug, Clone, Default)]
pub struct DuplicateTracker {
    first_seen: HashMap<String, String>,
}

impl DuplicateTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting of `class_name` in `archive`.
    pub fn observe(&mut self, class_name: &str, archive: &str) -> Sighting {
        match self.first_seen.get(class_name) {
            Some(first_archive) => Sighting::Duplicate {
                first_archive: first_archive.clone(),
            },
            None => {
                self.first_seen
                    .insert(class_name.to_string(), archive.to_string());
                Sighting::First
            }
        }
    }

    /// Archive `class_name` was first seen in.
    pub fn first_archive(&self, class_name: &str) -> Option<&str> {
        self.first_seen.get(class_name).map(String::as_str)
    }

    /// Number of distinct classes seen.
    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    /// True when nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

/// A class exposed by the namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    /// Fully-qualified class name.
    pub class_name: String,
    /// Archive file name that defines it.
    pub archive: String,
    /// Index of the mod that contributed the archive.
    pub owner: usize,
}

/// A class name seen in more than one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateClass {
    /// Fully-qualified class name.
    pub class_name: String,
    /// Archive whose definition is used.
    pub first_archive: String,
    /// Archive whose definition is ignored.
    pub duplicate_archive: String,
}

/// Namespace of class names over a set of archives.
///
/// Each class name appears once; later archives defining the same name are
/// reported as duplicates and their definition is ignored.
#[derive(Debug, Clone, Default)]
pub struct ClassSpace {
    entries: Vec<ClassEntry>,
    duplicates: Vec<DuplicateClass>,
}

impl ClassSpace {
    /// Build a namespace over `archives`, each tagged with its owning mod.
    pub fn build<'a, I>(archives: I, tracker: &mut DuplicateTracker) -> Self
    where
        I: IntoIterator<Item = (usize, &'a ArchiveListing)>,
    {
        let mut space = Self::default();
        for (owner, archive) in archives {
            for class_name in archive.class_names() {
                match tracker.observe(&class_name, &archive.name) {
                    Sighting::First => space.entries.push(ClassEntry {
                        class_name,
                        archive: archive.name.clone(),
                        owner,
                    }),
                    Sighting::Duplicate { first_archive } => {
                        tracing::warn!(
                            "Duplicate class {} found in {} and {}. Please contact the module developers.",
                            class_name,
                            first_archive,
                            archive.name
                        );
                        space.duplicates.push(DuplicateClass {
                            class_name,
                            first_archive,
                            duplicate_archive: archive.name.clone(),
                        });
                    }
                }
            }
        }
        space
    }

    /// Classes in discovery order.
    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }

    /// Duplicates found while building.
    pub fn duplicates(&self) -> &[DuplicateClass] {
        &self.duplicates
    }

    /// Whether `class_name` is visible in this namespace.
    pub fn contains(&self, class_name: &str) -> bool {
        self.entries.iter().any(|e| e.class_name == class_name)
    }

    /// Number of visible classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no archive exposed a class.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
