//! Deterministic combat rules and data types shared across crates.
//!
//! `game-core` defines the synchronous half of the combat orchestration:
//! units and their actions, the per-unit [`turn::TurnController`] state
//! machine, trigger classification, and the [`GameMode`] flag. Nothing here
//! suspends or performs I/O; the `runtime` crate drives these types from its
//! async session loop.
pub mod action;
pub mod config;
pub mod error;
pub mod mode;
pub mod trigger;
pub mod turn;
pub mod unit;

pub use action::{ActionKind, ActionOutcome, ActionTarget, CombatAction, StatDelta};
pub use config::{GameConfig, PriorityOrder};
pub use error::{ErrorSeverity, GameError};
pub use mode::GameMode;
pub use trigger::CombatEventTriggerType;
pub use turn::{TurnController, TurnError, TurnOption, TurnResolution, TurnState};
pub use unit::{
    MenuMemory, Mentality, MentalityEffect, MentalityEffectKind, RemovalReport, Roster, Side,
    Unit, UnitId, UnitStats,
};
