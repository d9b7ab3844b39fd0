use game_core::{ActionOutcome, CombatAction, CombatEventTriggerType, UnitId};

use crate::combat::CombatEventId;

/// How a combat session ended.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CombatResult {
    /// Every enemy unit was defeated.
    Victory,
    /// Every player unit was defeated.
    Defeat,
    Fled,
    /// The round limit was reached.
    Stalemate,
    /// Ended early: cancelled, failed, or ended before a result was reached.
    Aborted,
}

/// Progress broadcast by a running [`CombatSession`](super::CombatSession).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CombatNotification {
    Started {
        encounter: String,
    },
    TurnStarted {
        unit: UnitId,
        round: u32,
    },
    ActionResolved {
        unit: UnitId,
        action: CombatAction,
        outcome: ActionOutcome,
    },
    EventFired {
        event: CombatEventId,
        trigger: CombatEventTriggerType,
    },
    /// Sent at most once per session.
    Ended {
        result: CombatResult,
    },
}
