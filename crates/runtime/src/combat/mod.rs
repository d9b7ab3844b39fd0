//! Conditionally triggered event sequences.
//!
//! # Architecture
//!
//! - A [`CombatEvent`] pairs an [`EventSequence`] with the trigger type it
//!   listens for, a priority and a fire-once flag
//! - The per-session [`CombatEventHandler`] keeps subscriptions per trigger,
//!   ordered by priority with insertion order breaking ties
//! - Dispatch snapshots the subscriber list before any sequence runs, so
//!   sequences that mutate subscriptions cannot cause skipped or duplicated
//!   firings

mod handler;

pub use handler::CombatEventHandler;

use game_core::{CombatEventTriggerType, GameConfig};

use crate::sequence::EventSequence;

/// Identifier of a combat event, unique within an encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CombatEventId(pub u32);

impl std::fmt::Display for CombatEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "combat-event#{}", self.0)
    }
}

/// An event sequence fired by a combat condition.
#[derive(Debug)]
pub struct CombatEvent {
    pub id: CombatEventId,
    pub trigger: CombatEventTriggerType,
    pub priority: i32,
    pub triggers_once: bool,
    pub sequence: EventSequence,
}

impl CombatEvent {
    pub fn new(
        id: CombatEventId,
        trigger: CombatEventTriggerType,
        sequence: EventSequence,
    ) -> Self {
        Self {
            id,
            trigger,
            priority: GameConfig::DEFAULT_EVENT_PRIORITY,
            triggers_once: false,
            sequence,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the event to unsubscribe itself the first time it fires.
    pub fn once(mut self) -> Self {
        self.triggers_once = true;
        self
    }

    pub fn name(&self) -> &str {
        self.sequence.name()
    }
}
