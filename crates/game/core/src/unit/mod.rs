//! Combat participants.

mod mentality;
mod roster;

pub use mentality::{Mentality, MentalityEffect, MentalityEffectKind, RemovalReport};
pub use roster::Roster;

use crate::action::CombatAction;

/// Unique identifier of a unit within one encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl core::fmt::Display for UnitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Which side of the encounter a unit fights for.
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
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitStats {
    pub hp: u32,
    pub max_hp: u32,
    /// Higher speed acts earlier in a round.
    pub speed: u32,
}

impl UnitStats {
    pub const fn new(max_hp: u32, speed: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            speed,
        }
    }

    /// Applies a signed health change, clamped to `[0, max_hp]`.
    pub fn apply_hp(&mut self, delta: i32) {
        let hp = i64::from(self.hp) + i64::from(delta);
        self.hp = hp.clamp(0, i64::from(self.max_hp)) as u32;
    }
}

/// Last highlighted index of each menu, restored on the unit's next turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MenuMemory {
    pub turn_menu: usize,
    pub action_menu: usize,
    pub items_menu: usize,
}

/// A combat participant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub class: String,
    pub side: Side,
    pub stats: UnitStats,
    pub mentality: Mentality,
    pub actions: Vec<CombatAction>,
    pub items: Vec<CombatAction>,
    pub menu_memory: MenuMemory,
}

impl Unit {
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        class: impl Into<String>,
        side: Side,
        stats: UnitStats,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            class: class.into(),
            side,
            stats,
            mentality: Mentality::default(),
            actions: Vec::new(),
            items: Vec::new(),
            menu_memory: MenuMemory::default(),
        }
    }

    pub fn with_action(mut self, action: CombatAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_item(mut self, item: CombatAction) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_menu_memory(mut self, memory: MenuMemory) -> Self {
        self.menu_memory = memory;
        self
    }

    pub fn is_defeated(&self) -> bool {
        self.stats.hp == 0
    }

    pub fn is_player(&self) -> bool {
        self.side == Side::Player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hp_changes_are_clamped() {
        let mut stats = UnitStats::new(20, 5);
        stats.apply_hp(-50);
        assert_eq!(stats.hp, 0);
        stats.apply_hp(100);
        assert_eq!(stats.hp, 20);
    }

    #[test]
    fn defeated_at_zero_hp() {
        let mut unit = Unit::new(UnitId(1), "Ghost", "Spirit", Side::Enemy, UnitStats::new(1, 1));
        assert!(!unit.is_defeated());
        unit.stats.apply_hp(-1);
        assert!(unit.is_defeated());
    }
}
