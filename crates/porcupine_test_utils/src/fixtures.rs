//! Fixture modules and helpers.
//!
//! Every fixture appends to a shared [`EventLog`] so tests can assert on the
//! exact order hooks ran in.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use porcupine_core::capability::{
    CapabilitySet, Facets, RenderCapable, Renderer, ScriptEntity, Serializable, TickCapable,
};
use porcupine_core::class_space::{ArchiveEntry, ArchiveListing, ClassRegistry};
use porcupine_core::config::{ModuleConfig, ModuleContext};
use porcupine_core::descriptor::{ModuleDescriptor, ModulePaths};
use porcupine_core::error::ConstructError;
use porcupine_core::events::{GlobalEvent, RoomEvent, RoomInstance};
use porcupine_core::persist::{read_value, write_value, PersistError, StateReader, StateWriter};
use porcupine_core::version::Version;

/// Shared, ordered record of hook calls.
pub type EventLog = Rc<RefCell<Vec<String>>>;

/// Create an empty log.
#[must_use]
pub fn event_log() -> EventLog {
    Rc::default()
}

/// Module exposing all four capabilities.
pub const RECORDER_CLASS: &str = "org.fixture.Recorder";
/// Module exposing only the tick capability.
pub const TICK_ONLY_CLASS: &str = "org.fixture.TickOnly";
/// Class whose factory yields no capability.
pub const INERT_CLASS: &str = "org.fixture.Inert";
/// Registered interface.
pub const API_CLASS: &str = "org.fixture.Api";
/// Class whose factory always fails.
pub const BROKEN_CLASS: &str = "org.fixture.Broken";
/// Global event that fires whenever rolled.
pub const BEACON_CLASS: &str = "org.fixture.Beacon";
/// Room event bound to `SMITHY` rooms.
pub const SPARK_CLASS: &str = "org.fixture.Spark";

/// Records every hook it receives.
pub struct Recorder {
    label: String,
    log: EventLog,
    ticks: u32,
}

impl Recorder {
    /// Create a recorder that logs as `label`.
    pub fn new(label: impl Into<String>, log: &EventLog) -> Self {
        Self {
            label: label.into(),
            log: Rc::clone(log),
            ticks: 0,
        }
    }

    /// Ticks received.
    #[must_use]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{hook}", self.label));
    }
}

impl ScriptEntity for Recorder {
    fn on_initialize_early(&mut self) {
        self.record("early");
    }

    fn on_initialize_late(&mut self) {
        self.record("late");
    }
}

impl TickCapable for Recorder {
    fn on_tick(&mut self, _delta_seconds: f64) {
        self.ticks += 1;
        self.record("tick");
    }
}

impl RenderCapable for Recorder {
    fn on_render(&mut self, renderer: &mut dyn Renderer, _delta_seconds: f64) {
        renderer.draw_text(0, 0, &self.label);
        self.record("render");
    }
}

impl Serializable for Recorder {
    fn on_serialize(&mut self, writer: &mut dyn StateWriter) -> Result<(), PersistError> {
        self.record("save");
        write_value(writer, "ticks", &self.ticks)
    }

    fn on_deserialize(&mut self, reader: &dyn StateReader) -> Result<(), PersistError> {
        self.record("load");
        if let Some(ticks) = read_value(reader, "ticks")? {
            self.ticks = ticks;
        }
        Ok(())
    }
}

/// Ticks and nothing else.
pub struct TickOnly {
    log: EventLog,
}

impl TickCapable for TickOnly {
    fn on_tick(&mut self, _delta_seconds: f64) {
        self.log.borrow_mut().push("tick-only:tick".to_string());
    }
}

/// Fires with the chance read from the mod's `beacon.chance` key.
pub struct Beacon {
    chance: f64,
    log: EventLog,
}

impl GlobalEvent for Beacon {
    fn on_event(&mut self) {
        self.log.borrow_mut().push("beacon:fired".to_string());
    }

    fn chance_per_second(&self) -> f64 {
        self.chance
    }
}

/// Logs the id of every `SMITHY` room it fires for.
pub struct Spark {
    log: EventLog,
}

impl RoomEvent for Spark {
    fn on_event(&mut self, room: &RoomInstance) {
        self.log.borrow_mut().push(format!("spark:{}", room.id));
    }

    fn chance_per_second(&self) -> f64 {
        1_000.0
    }

    fn room_type(&self) -> &str {
        "SMITHY"
    }
}

/// Registry of every fixture class. Each instantiation logs
/// `new:<class>:<mod>`.
#[must_use]
pub fn fixture_registry(log: &EventLog) -> ClassRegistry {
    let mut registry = ClassRegistry::new();

    let recorder_log = Rc::clone(log);
    registry.register_module(RECORDER_CLASS, move |context| {
        note_instance(&recorder_log, RECORDER_CLASS, context);
        Ok(Facets::new(Recorder::new(context.descriptor().name(), &recorder_log))
            .entity()
            .tickable()
            .renderable()
            .serializable()
            .build())
    });

    let tick_log = Rc::clone(log);
    registry.register_module(TICK_ONLY_CLASS, move |context| {
        note_instance(&tick_log, TICK_ONLY_CLASS, context);
        Ok(Facets::new(TickOnly {
            log: Rc::clone(&tick_log),
        })
        .tickable()
        .build())
    });

    let inert_log = Rc::clone(log);
    registry.register_module(INERT_CLASS, move |context| {
        note_instance(&inert_log, INERT_CLASS, context);
        Ok(CapabilitySet::default())
    });

    registry.register_interface(API_CLASS);

    registry.register_module(BROKEN_CLASS, |_| {
        Err(ConstructError::new("fixture refuses to construct"))
    });

    let beacon_log = Rc::clone(log);
    registry.register_global_event(BEACON_CLASS, move |context| {
        note_instance(&beacon_log, BEACON_CLASS, context);
        let chance = context
            .config()
            .borrow()
            .get_parsed("beacon.chance")
            .unwrap_or(0.0);
        Ok(Facets::new(Beacon {
            chance,
            log: Rc::clone(&beacon_log),
        })
        .global_event())
    });

    let spark_log = Rc::clone(log);
    registry.register_room_event(SPARK_CLASS, move |context| {
        note_instance(&spark_log, SPARK_CLASS, context);
        Ok(Facets::new(Spark {
            log: Rc::clone(&spark_log),
        })
        .room_event())
    });

    registry
}

fn note_instance(log: &EventLog, class: &str, context: &ModuleContext) {
    log.borrow_mut()
        .push(format!("new:{class}:{}", context.descriptor().name()));
}

/// Entries of `log` that start with `prefix`.
#[must_use]
pub fn entries_with_prefix(log: &EventLog, prefix: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|entry| entry.starts_with(prefix))
        .cloned()
        .collect()
}

/// Context for an in-memory mod named `name` at version 1.0.0.
#[must_use]
pub fn mod_context(name: &str) -> ModuleContext {
    mod_context_with_config(name, ModuleConfig::new())
}

/// Context for an in-memory mod with the given config.
#[must_use]
pub fn mod_context_with_config(name: &str, config: ModuleConfig) -> ModuleContext {
    let root = Path::new("/mods").join(name);
    let paths = ModulePaths::resolve(&root, "V63", "script/jar");
    ModuleContext::new(
        ModuleDescriptor::new(name, Version::new(1, 0, 0), paths),
        config,
    )
}

/// Listing of an in-memory jar holding `classes` (dotted names).
#[must_use]
pub fn jar_listing(file_name: &str, classes: &[&str]) -> ArchiveListing {
    let entries = classes
        .iter()
        .map(|class| ArchiveEntry::file(format!("{}.class", class.replace('.', "/"))))
        .collect();
    ArchiveListing::new(Path::new("/jars").join(file_name), entries)
}

/// Renderer that records drawn text.
#[derive(Debug, Default)]
pub struct TextCapture {
    /// `(x, y, text)` per draw call.
    pub lines: Vec<(i32, i32, String)>,
}

impl Renderer for TextCapture {
    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        self.lines.push((x, y, text.to_string()));
    }
}
