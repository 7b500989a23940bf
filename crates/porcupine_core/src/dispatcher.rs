//! Lifecycle dispatch.
//!
//! The [`Dispatcher`] is what the host drives: it owns the loaded modules and
//! events and fans every host callback out to them.
//!
//! ```text
//! new      every entity early hook, then every entity late hook
//! update   statistics refresh -> tickables -> global events -> room events
//! render   renderables
//! save     serializables, then each mod's config
//! load     serializables
//! ```

use std::collections::HashSet;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::capability::{Renderer, Shared};
use crate::config::ConfigPersistence;
use crate::events::{should_fire, GlobalEvent, RoomDirectory, RoomEvent};
use crate::module::Module;
use crate::persist::{ScopedReader, ScopedWriter, StateReader, StateWriter};
use crate::registry::LoadedModules;
use crate::statistics::{EconomySource, StatisticsCache};

/// What the dispatcher needs from the host on every update.
pub trait HostWorld: RoomDirectory {
    /// Settlement economy used to refresh statistics caches.
    fn economy(&self) -> &dyn EconomySource;
}

/// Drives loaded modules and events.
pub struct Dispatcher {
    modules: Vec<Module>,
    global_events: Vec<Shared<dyn GlobalEvent>>,
    room_events: Vec<Shared<dyn RoomEvent>>,
    statistics: Vec<Shared<dyn StatisticsCache>>,
    rng: StdRng,
}

impl Dispatcher {
    /// Take ownership of `loaded` and run the initialization hooks.
    pub fn new(loaded: LoadedModules) -> Self {
        Self::with_rng(loaded, StdRng::from_entropy())
    }

    /// Like [`Dispatcher::new`] with a fixed event seed.
    pub fn seeded(loaded: LoadedModules, seed: u64) -> Self {
        Self::with_rng(loaded, StdRng::seed_from_u64(seed))
    }

    /// Like [`Dispatcher::new`] with a caller-supplied RNG.
    pub fn with_rng(loaded: LoadedModules, rng: StdRng) -> Self {
        let dispatcher = Self {
            modules: loaded.modules,
            global_events: loaded.global_events,
            room_events: loaded.room_events,
            statistics: Vec::new(),
            rng,
        };
        dispatcher.initialize();
        dispatcher
    }

    fn initialize(&self) {
        let entities: Vec<_> = self.modules.iter().filter_map(Module::entity).collect();
        for entity in &entities {
            entity.borrow_mut().on_initialize_early();
        }
        for entity in &entities {
            entity.borrow_mut().on_initialize_late();
        }
        tracing::info!(
            "Initialized {} modules ({} entities), {} global events, {} room events",
            self.modules.len(),
            entities.len(),
            self.global_events.len(),
            self.room_events.len()
        );
    }

    /// Add a cache refreshed at the start of every update.
    pub fn with_statistics(mut self, cache: Shared<dyn StatisticsCache>) -> Self {
        self.statistics.push(cache);
        self
    }

    /// Loaded modules.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Number of global events.
    pub fn global_event_count(&self) -> usize {
        self.global_events.len()
    }

    /// Number of room events.
    pub fn room_event_count(&self) -> usize {
        self.room_events.len()
    }

    /// Advance one simulation step of `delta_seconds`.
    pub fn update(&mut self, delta_seconds: f64, host: &dyn HostWorld) {
        for cache in &self.statistics {
            cache.borrow_mut().refresh(host.economy());
        }

        for tickable in self.modules.iter().filter_map(Module::tickable) {
            tickable.borrow_mut().on_tick(delta_seconds);
        }

        for event in &self.global_events {
            let chance = event.borrow().chance_per_second();
            let roll: f64 = self.rng.gen();
            if should_fire(chance, delta_seconds, roll) {
                event.borrow_mut().on_event();
            }
        }

        for event in &self.room_events {
            let (room_type, chance) = {
                let event = event.borrow();
                (event.room_type().to_string(), event.chance_per_second())
            };
            for room in host.room_instances(&room_type) {
                let roll: f64 = self.rng.gen();
                if should_fire(chance, delta_seconds, roll) {
                    event.borrow_mut().on_event(&room);
                }
            }
        }
    }

    /// Draw one frame.
    pub fn render(&mut self, renderer: &mut dyn Renderer, delta_seconds: f64) {
        for renderable in self.modules.iter().filter_map(Module::renderable) {
            renderable.borrow_mut().on_render(renderer, delta_seconds);
        }
    }

    /// Save every serializable module, then write back its mod's config.
    ///
    /// Sections are namespaced by [`Module::save_key`]. Returns the number
    /// of failures; each one is logged and the loop continues.
    pub fn save(&mut self, writer: &mut dyn StateWriter, store: &dyn ConfigPersistence) -> usize {
        tracing::info!("Saving Porcupine framework state");
        let mut failures = 0;
        let mut persisted = HashSet::new();

        for module in &self.modules {
            let Some(serializable) = module.serializable() else {
                continue;
            };

            let key = module.save_key();
            let result = {
                let mut scoped = ScopedWriter::new(&key, writer);
                serializable.borrow_mut().on_serialize(&mut scoped)
            };
            if let Err(err) = result {
                tracing::error!("Failed to save {}: {}", key, err);
                failures += 1;
            }

            if persisted.insert(Rc::as_ptr(module.config())) {
                let config = module.config().borrow();
                if let Err(err) = store.persist(module.descriptor(), &config) {
                    tracing::error!("Failed to persist config of {}: {}", module.name(), err);
                    failures += 1;
                }
            }
        }

        failures
    }

    /// Restore every serializable module. Returns the number of failures.
    pub fn load(&mut self, reader: &dyn StateReader) -> usize {
        tracing::info!("Loading Porcupine framework state");
        let mut failures = 0;

        for module in &self.modules {
            let Some(serializable) = module.serializable() else {
                continue;
            };

            let key = module.save_key();
            let scoped = ScopedReader::new(&key, reader);
            if let Err(err) = serializable.borrow_mut().on_deserialize(&scoped) {
                tracing::error!("Failed to load {}: {}", key, err);
                failures += 1;
            }
        }

        failures
    }
}
