//! Combat session lifecycle.
//!
//! A [`CombatSession`] claims the context's single combat slot, switches the
//! game into [`GameMode::Combat`](game_core::GameMode::Combat), and drives
//! units through their turns until one side is beaten, a unit flees, or the
//! round limit is hit. Combat events subscribed for the encounter run at
//! their trigger points and suspend the turn loop while they play.

mod combat;
mod notification;

pub use combat::CombatSession;
pub use notification::{CombatNotification, CombatResult};

use game_core::Unit;

use crate::combat::CombatEvent;

/// Everything needed to start a combat: who fights, where, and what
/// scripted events can fire.
#[derive(Debug)]
pub struct Encounter {
    pub name: String,
    pub scene: String,
    pub units: Vec<Unit>,
    pub events: Vec<CombatEvent>,
}

impl Encounter {
    pub fn new(name: impl Into<String>, scene: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scene: scene.into(),
            units: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn with_event(mut self, event: CombatEvent) -> Self {
        self.events.push(event);
        self
    }
}
