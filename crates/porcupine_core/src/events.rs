//! Scripted events.
//!
//! Events fire as a Bernoulli trial each update: an event with
//! `chance_per_second = c` fires during a step of `dt` seconds when a uniform
//! draw in `[0, 1)` is below `c * dt`. This approximates a Poisson process and
//! is only accurate while `c * dt` stays small.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::{CapabilitySet, Shared};

/// Event that affects the whole game.
pub trait GlobalEvent {
    /// Apply the event.
    fn on_event(&mut self);

    /// Expected firings per second of game time.
    fn chance_per_second(&self) -> f64;
}

/// Event bound to every room of one type.
pub trait RoomEvent {
    /// Apply the event to one room.
    fn on_event(&mut self, room: &RoomInstance);

    /// Expected firings per second, per room.
    fn chance_per_second(&self) -> f64;

    /// The room type this event binds to.
    fn room_type(&self) -> &str;
}

/// A concrete room in the host's settlement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomInstance {
    /// Host identifier.
    pub id: u64,
    /// Room type key.
    pub room_type: String,
    /// Tile coordinates of the room's anchor.
    pub position: (i32, i32),
}

/// Host lookup of room instances by type.
pub trait RoomDirectory {
    /// Every room of `room_type` currently in the settlement.
    fn room_instances(&self, room_type: &str) -> Vec<RoomInstance>;
}

/// An event instance plus whatever module capabilities it also exposes.
pub struct ScriptedEvent<E: ?Sized> {
    event: Shared<E>,
    capabilities: CapabilitySet,
}

impl<E: ?Sized> ScriptedEvent<E> {
    /// Pair an event with its capabilities.
    pub fn new(event: Shared<E>, capabilities: CapabilitySet) -> Self {
        Self {
            event,
            capabilities,
        }
    }

    /// The event handle.
    pub fn event(&self) -> &Shared<E> {
        &self.event
    }

    /// Capabilities attached alongside the event. May be empty.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Split into parts.
    pub fn into_parts(self) -> (Shared<E>, CapabilitySet) {
        (self.event, self.capabilities)
    }
}

impl<E: ?Sized> fmt::Debug for ScriptedEvent<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedEvent")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// Firing rule shared by global and room events.
///
/// `roll` is a uniform draw in `[0, 1)`. A non-positive chance never fires.
pub fn should_fire(chance_per_second: f64, delta_seconds: f64, roll: f64) -> bool {
    chance_per_second > 0.0 && roll < chance_per_second * delta_seconds
}
