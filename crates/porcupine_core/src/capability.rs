//! Capability model.
//!
//! A plugin instance is one shared value (`Rc<RefCell<T>>`) that exposes any
//! subset of four capabilities. Instead of probing the instance at runtime,
//! the plugin author declares the capabilities it implements through
//! [`Facets`], which only offers the facets `T` actually implements:
//!
//! ```
//! use porcupine_core::capability::{Facets, ScriptEntity, TickCapable};
//!
//! #[derive(Default)]
//! struct Clock {
//!     elapsed: f64,
//! }
//!
//! impl ScriptEntity for Clock {}
//!
//! impl TickCapable for Clock {
//!     fn on_tick(&mut self, delta_seconds: f64) {
//!         self.elapsed += delta_seconds;
//!     }
//! }
//!
//! let facets = Facets::new(Clock::default()).entity().tickable();
//! let clock = facets.instance();
//! let capabilities = facets.build();
//!
//! if let Some(tickable) = capabilities.tickable() {
//!     tickable.borrow_mut().on_tick(0.5);
//! }
//! assert!((clock.borrow().elapsed - 0.5).abs() < f64::EPSILON);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::events::{GlobalEvent, RoomEvent, ScriptedEvent};
use crate::persist::{PersistError, StateReader, StateWriter};

/// Shared, single-threaded handle to a plugin instance or facet.
pub type Shared<T> = Rc<RefCell<T>>;

/// Lifecycle hooks run once when the dispatcher is created.
///
/// Every entity's early hook runs before any entity's late hook.
pub trait ScriptEntity {
    /// Called first, before any late hook.
    fn on_initialize_early(&mut self) {}

    /// Called after every early hook has run.
    fn on_initialize_late(&mut self) {}
}

/// Per-tick simulation hook.
pub trait TickCapable {
    /// Advance by `delta_seconds` of game time.
    fn on_tick(&mut self, _delta_seconds: f64) {}
}

/// Per-frame render hook.
pub trait RenderCapable {
    /// Draw through the host renderer.
    fn on_render(&mut self, _renderer: &mut dyn Renderer, _delta_seconds: f64) {}
}

/// Save/load hooks.
pub trait Serializable {
    /// Write this module's state.
    fn on_serialize(&mut self, _writer: &mut dyn StateWriter) -> Result<(), PersistError> {
        Ok(())
    }

    /// Restore this module's state.
    fn on_deserialize(&mut self, _reader: &dyn StateReader) -> Result<(), PersistError> {
        Ok(())
    }
}

/// Opaque host renderer.
pub trait Renderer {
    /// Draw a line of text at screen position `(x, y)`.
    fn draw_text(&mut self, x: i32, y: i32, text: &str);
}

/// One of the four capabilities a module can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// [`ScriptEntity`]
    Entity,
    /// [`TickCapable`]
    Tickable,
    /// [`RenderCapable`]
    Renderable,
    /// [`Serializable`]
    Serializable,
}

impl Capability {
    /// All capabilities in dispatch order.
    pub const ALL: [Self; 4] = [
        Self::Entity,
        Self::Tickable,
        Self::Renderable,
        Self::Serializable,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entity => "entity",
            Self::Tickable => "tickable",
            Self::Renderable => "renderable",
            Self::Serializable => "serializable",
        };
        f.write_str(name)
    }
}

/// The facets a plugin instance exposes.
///
/// Every present facet points at the same underlying instance. Equality and
/// hashing use reference identity of the four facets.
#[derive(Clone, Default)]
pub struct CapabilitySet {
    entity: Option<Shared<dyn ScriptEntity>>,
    tickable: Option<Shared<dyn TickCapable>>,
    renderable: Option<Shared<dyn RenderCapable>>,
    serializable: Option<Shared<dyn Serializable>>,
}

impl CapabilitySet {
    /// Entity facet.
    pub fn entity(&self) -> Option<&Shared<dyn ScriptEntity>> {
        self.entity.as_ref()
    }

    /// Tick facet.
    pub fn tickable(&self) -> Option<&Shared<dyn TickCapable>> {
        self.tickable.as_ref()
    }

    /// Render facet.
    pub fn renderable(&self) -> Option<&Shared<dyn RenderCapable>> {
        self.renderable.as_ref()
    }

    /// Save/load facet.
    pub fn serializable(&self) -> Option<&Shared<dyn Serializable>> {
        self.serializable.as_ref()
    }

    /// Whether the capability is present.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Entity => self.entity.is_some(),
            Capability::Tickable => self.tickable.is_some(),
            Capability::Renderable => self.renderable.is_some(),
            Capability::Serializable => self.serializable.is_some(),
        }
    }

    /// Present capabilities, in dispatch order.
    pub fn kinds(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.has(*capability))
            .collect()
    }

    /// True when no facet is present.
    pub fn is_empty(&self) -> bool {
        self.entity.is_none()
            && self.tickable.is_none()
            && self.renderable.is_none()
            && self.serializable.is_none()
    }

    fn identity(&self) -> [Option<*const ()>; 4] {
        [
            self.entity.as_ref().map(|f| Rc::as_ptr(f).cast::<()>()),
            self.tickable.as_ref().map(|f| Rc::as_ptr(f).cast::<()>()),
            self.renderable.as_ref().map(|f| Rc::as_ptr(f).cast::<()>()),
            self.serializable.as_ref().map(|f| Rc::as_ptr(f).cast::<()>()),
        ]
    }
}

impl PartialEq for CapabilitySet {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for CapabilitySet {}

impl std::hash::Hash for CapabilitySet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}

/// Typed builder for a [`CapabilitySet`].
///
/// Each facet method is only available when `T` implements the matching
/// trait, so a set can never claim a capability its instance lacks.
pub struct Facets<T> {
    instance: Shared<T>,
    set: CapabilitySet,
}

impl<T: 'static> Facets<T> {
    /// Wrap a fresh instance.
    pub fn new(value: T) -> Self {
        Self::from_shared(Rc::new(RefCell::new(value)))
    }

    /// Expose an instance the caller already shares.
    pub fn from_shared(instance: Shared<T>) -> Self {
        Self {
            instance,
            set: CapabilitySet::default(),
        }
    }

    /// Handle to the underlying instance.
    pub fn instance(&self) -> Shared<T> {
        Rc::clone(&self.instance)
    }

    /// Finish with the facets attached so far.
    pub fn build(self) -> CapabilitySet {
        self.set
    }
}

impl<T: ScriptEntity + 'static> Facets<T> {
    /// Attach the [`ScriptEntity`] facet.
    pub fn entity(mut self) -> Self {
        let facet: Shared<dyn ScriptEntity> = self.instance.clone();
        self.set.entity = Some(facet);
        self
    }
}

impl<T: TickCapable + 'static> Facets<T> {
    /// Attach the [`TickCapable`] facet.
    pub fn tickable(mut self) -> Self {
        let facet: Shared<dyn TickCapable> = self.instance.clone();
        self.set.tickable = Some(facet);
        self
    }
}

impl<T: RenderCapable + 'static> Facets<T> {
    /// Attach the [`RenderCapable`] facet.
    pub fn renderable(mut self) -> Self {
        let facet: Shared<dyn RenderCapable> = self.instance.clone();
        self.set.renderable = Some(facet);
        self
    }
}

impl<T: Serializable + 'static> Facets<T> {
    /// Attach the [`Serializable`] facet.
    pub fn serializable(mut self) -> Self {
        let facet: Shared<dyn Serializable> = self.instance.clone();
        self.set.serializable = Some(facet);
        self
    }
}

impl<T: GlobalEvent + 'static> Facets<T> {
    /// Finish as a global event, keeping any facets attached so far.
    pub fn global_event(self) -> ScriptedEvent<dyn GlobalEvent> {
        let event: Shared<dyn GlobalEvent> = self.instance;
        ScriptedEvent::new(event, self.set)
    }
}

impl<T: RoomEvent + 'static> Facets<T> {
    /// Finish as a room event, keeping any facets attached so far.
    pub fn room_event(self) -> ScriptedEvent<dyn RoomEvent> {
        let event: Shared<dyn RoomEvent> = self.instance;
        ScriptedEvent::new(event, self.set)
    }
}
