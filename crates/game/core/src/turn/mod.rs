//! Per-unit turn state machine.
//!
//! A turn walks the menus `TurnMenu → ActionMenu → {ItemsMenu | FleeResolution}`
//! and ends in [`TurnState::ActionResolved`], at which point the pending
//! action is taken out with [`TurnController::take_resolution`] and the turn
//! is discarded.

mod controller;

pub use controller::TurnController;

use crate::action::CombatAction;
use crate::error::{ErrorSeverity, GameError};
use crate::unit::{MenuMemory, UnitId};

/// Where a turn currently stands.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TurnState {
    /// No turn has begun.
    #[default]
    Idle,
    AwaitingTurnMenu,
    AwaitingActionMenu,
    AwaitingItemsMenu,
    AwaitingFleeResolution,
    /// An action is pending and ready to be resolved.
    ActionResolved,
}

impl TurnState {
    /// True while the player is expected to pick from a menu.
    pub const fn awaits_input(self) -> bool {
        matches!(
            self,
            Self::AwaitingTurnMenu
                | Self::AwaitingActionMenu
                | Self::AwaitingItemsMenu
                | Self::AwaitingFleeResolution
        )
    }
}

/// Entries of the top-level turn menu.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TurnOption {
    Act,
    Items,
    Flee,
}

/// The action chosen for a finished turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnResolution {
    pub unit: UnitId,
    pub action: CombatAction,
    /// Menu positions to store back on the unit.
    pub menu_memory: MenuMemory,
}

/// Errors that can occur while driving a turn.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("no unit is taking a turn")]
    NoActiveUnit,

    #[error("{operation} is not valid while {state}")]
    InvalidState {
        operation: &'static str,
        state: TurnState,
    },

    #[error("turn has no resolved action (state: {0})")]
    NotResolved(TurnState),
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoActiveUnit => ErrorSeverity::Validation,
            Self::InvalidState { .. } => ErrorSeverity::Recoverable,
            Self::NotResolved(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoActiveUnit => "TURN_NO_ACTIVE_UNIT",
            Self::InvalidState { .. } => "TURN_INVALID_STATE",
            Self::NotResolved(_) => "TURN_NOT_RESOLVED",
        }
    }
}
