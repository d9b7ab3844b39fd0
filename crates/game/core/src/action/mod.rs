//! Combat actions a unit can select, and the outcomes they produce.
//!
//! Actions are plain data: resolving them against a roster is the job of an
//! external resolver, which reports an [`ActionOutcome`] back to the session.

mod outcome;

pub use outcome::{ActionOutcome, StatDelta};

use crate::unit::{MentalityEffect, UnitId};

/// What an action does when resolved.
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
pub enum ActionKind {
    /// Deals `power` damage to each target.
    Attack,
    /// Like an attack, usually paired with a mentality effect.
    Skill,
    /// Restores `power` health to each target.
    Item,
    /// Attempts to leave combat.
    Flee,
    /// Does nothing.
    Pass,
}

impl ActionKind {
    /// True for kinds meant for the actor's own side.
    pub const fn aids_target(self) -> bool {
        matches!(self, Self::Item)
    }
}

/// Who an action is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionTarget {
    /// The acting unit itself.
    Actor,
    /// A single unit.
    Unit(UnitId),
    /// Every living unit on the opposing side.
    AllOpponents,
    /// Every living unit on the actor's side.
    AllAllies,
}

/// An action offered in a unit's action or items menu.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatAction {
    pub name: String,
    pub kind: ActionKind,
    pub target: ActionTarget,
    pub power: i32,
    pub effect: Option<MentalityEffect>,
}

impl CombatAction {
    pub fn new(
        name: impl Into<String>,
        kind: ActionKind,
        target: ActionTarget,
        power: i32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            target,
            power,
            effect: None,
        }
    }

    pub fn attack(name: impl Into<String>, target: ActionTarget, power: i32) -> Self {
        Self::new(name, ActionKind::Attack, target, power)
    }

    pub fn item(name: impl Into<String>, power: i32) -> Self {
        Self::new(name, ActionKind::Item, ActionTarget::Actor, power)
    }

    pub fn flee() -> Self {
        Self::new("Flee", ActionKind::Flee, ActionTarget::Actor, 0)
    }

    pub fn pass() -> Self {
        Self::new("Pass", ActionKind::Pass, ActionTarget::Actor, 0)
    }

    /// Attaches a mentality effect applied to every target.
    pub fn with_effect(mut self, effect: MentalityEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Returns a copy aimed at a different target.
    pub fn aimed_at(&self, target: ActionTarget) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}
