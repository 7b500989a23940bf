//! Capability-tagged module records and the aggregator.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::capability::{
    CapabilitySet, RenderCapable, ScriptEntity, Serializable, Shared, TickCapable,
};
use crate::class_space::ClassDefinition;
use crate::config::{ModuleContext, SharedConfig};
use crate::descriptor::ModuleDescriptor;
use crate::error::{ClassError, ConstructError, Result};
use crate::events::{GlobalEvent, RoomEvent};
use crate::version::Version;

/// One loaded plugin instance with at least one capability.
///
/// Equality and hashing consider only the identity of the four facets.
#[derive(Clone)]
pub struct Module {
    class_name: String,
    archive: String,
    capabilities: CapabilitySet,
    context: ModuleContext,
}

impl Module {
    /// Wrap a capability set. Fails with [`ClassError::InvalidAggregate`]
    /// when the set is empty.
    pub fn from_capabilities(
        class_name: impl Into<String>,
        archive: impl Into<String>,
        capabilities: CapabilitySet,
        context: ModuleContext,
    ) -> Result<Self> {
        let class_name = class_name.into();
        let archive = archive.into();
        if capabilities.is_empty() {
            return Err(ClassError::InvalidAggregate {
                class: class_name,
                archive,
            });
        }
        Ok(Self {
            class_name,
            archive,
            capabilities,
            context,
        })
    }

    /// Fully-qualified class name.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// File name of the archive the class came from.
    pub fn archive(&self) -> &str {
        &self.archive
    }

    /// Owning mod's descriptor.
    pub fn descriptor(&self) -> &Rc<ModuleDescriptor> {
        self.context.descriptor()
    }

    /// Owning mod's config.
    pub fn config(&self) -> &SharedConfig {
        self.context.config()
    }

    /// Descriptor and config together.
    pub fn context(&self) -> &ModuleContext {
        &self.context
    }

    /// Owning mod's name.
    pub fn name(&self) -> &str {
        self.context.descriptor().name()
    }

    /// Owning mod's version.
    pub fn version(&self) -> &Version {
        self.context.descriptor().version()
    }

    /// All facets.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Entity facet.
    pub fn entity(&self) -> Option<&Shared<dyn ScriptEntity>> {
        self.capabilities.entity()
    }

    /// Tick facet.
    pub fn tickable(&self) -> Option<&Shared<dyn TickCapable>> {
        self.capabilities.tickable()
    }

    /// Render facet.
    pub fn renderable(&self) -> Option<&Shared<dyn RenderCapable>> {
        self.capabilities.renderable()
    }

    /// Save/load facet.
    pub fn serializable(&self) -> Option<&Shared<dyn Serializable>> {
        self.capabilities.serializable()
    }

    /// Key under which this module's save sections are namespaced.
    pub fn save_key(&self) -> String {
        format!("{}::{}", self.name(), self.class_name)
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.capabilities == other.capabilities
    }
}

impl Eq for Module {}

impl Hash for Module {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.capabilities.hash(state);
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("class_name", &self.class_name)
            .field("archive", &self.archive)
            .field("mod", &self.name())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// What one class entry contributed.
#[derive(Default)]
pub struct Aggregate {
    /// Module, when the class exposes any capability.
    pub module: Option<Module>,
    /// Global event, when the class is one.
    pub global_event: Option<Shared<dyn GlobalEvent>>,
    /// Room event, when the class is one.
    pub room_event: Option<Shared<dyn RoomEvent>>,
}

impl Aggregate {
    /// True when the class contributed nothing.
    pub fn is_empty(&self) -> bool {
        self.module.is_none() && self.global_event.is_none() && self.room_event.is_none()
    }
}

impl fmt::Debug for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregate")
            .field("module", &self.module)
            .field("global_event", &self.global_event.is_some())
            .field("room_event", &self.room_event.is_some())
            .finish()
    }
}

/// Turn one resolved class into a module and/or event.
///
/// - `None` (unregistered) gives [`ClassError::ClassNotFound`]
/// - interfaces contribute nothing
/// - a failing factory gives [`ClassError::Instantiation`]
/// - a module with no capability gives [`ClassError::InvalidAggregate`]
///
/// Events may expose capabilities too; those also become a module sharing
/// the event's instance.
pub fn aggregate(
    definition: Option<&ClassDefinition>,
    class_name: &str,
    archive: &str,
    context: &ModuleContext,
) -> Result<Aggregate> {
    let instantiation = |source: ConstructError| ClassError::Instantiation {
        class: class_name.to_string(),
        archive: archive.to_string(),
        source,
    };

    match definition {
        None => Err(ClassError::ClassNotFound {
            class: class_name.to_string(),
            archive: archive.to_string(),
        }),
        Some(ClassDefinition::Interface) => {
            tracing::debug!("Skipping interface {} from {}", class_name, archive);
            Ok(Aggregate::default())
        }
        Some(ClassDefinition::Module(factory)) => {
            let capabilities = factory(context).map_err(instantiation)?;
            let module =
                Module::from_capabilities(class_name, archive, capabilities, context.clone())?;
            Ok(Aggregate {
                module: Some(module),
                ..Aggregate::default()
            })
        }
        Some(ClassDefinition::GlobalEvent(factory)) => {
            let (event, capabilities) = factory(context).map_err(instantiation)?.into_parts();
            Ok(Aggregate {
                module: event_module(class_name, archive, capabilities, context),
                global_event: Some(event),
                room_event: None,
            })
        }
        Some(ClassDefinition::RoomEvent(factory)) => {
            let (event, capabilities) = factory(context).map_err(instantiation)?.into_parts();
            Ok(Aggregate {
                module: event_module(class_name, archive, capabilities, context),
                global_event: None,
                room_event: Some(event),
            })
        }
    }
}

fn event_module(
    class_name: &str,
    archive: &str,
    capabilities: CapabilitySet,
    context: &ModuleContext,
) -> Option<Module> {
    if capabilities.is_empty() {
        None
    } else {
        Module::from_capabilities(class_name, archive, capabilities, context.clone()).ok()
    }
}
