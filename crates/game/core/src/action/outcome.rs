use crate::trigger::CombatEventTriggerType;
use crate::unit::{MentalityEffect, Roster, Side, UnitId};

/// Health change applied to one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatDelta {
    pub unit: UnitId,
    pub hp: i32,
}

/// Everything a resolved action changed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub actor: UnitId,
    pub deltas: Vec<StatDelta>,
    pub effects: Vec<(UnitId, MentalityEffect)>,
    /// Units defeated by this action.
    ///
    /// Filled by [`Roster::apply`]; resolvers may leave it empty.
    pub defeated: Vec<UnitId>,
    pub fled: bool,
}

impl ActionOutcome {
    /// An outcome that changes nothing.
    pub fn none(actor: UnitId) -> Self {
        Self {
            actor,
            deltas: Vec::new(),
            effects: Vec::new(),
            defeated: Vec::new(),
            fled: false,
        }
    }

    pub fn with_delta(mut self, unit: UnitId, hp: i32) -> Self {
        self.deltas.push(StatDelta { unit, hp });
        self
    }

    pub fn with_effect(mut self, unit: UnitId, effect: MentalityEffect) -> Self {
        self.effects.push((unit, effect));
        self
    }

    pub fn fled(mut self) -> Self {
        self.fled = true;
        self
    }

    /// Trigger types raised by this outcome, deduplicated, in firing order.
    ///
    /// Each defeat raises [`CombatEventTriggerType::UnitDefeated`] followed by
    /// the side-specific trigger.
    pub fn triggers(&self, roster: &Roster) -> Vec<CombatEventTriggerType> {
        let mut triggers = Vec::new();
        for &id in &self.defeated {
            let side_trigger = match roster.get(id).map(|unit| unit.side) {
                Some(Side::Player) => Some(CombatEventTriggerType::PlayerUnitDefeated),
                Some(Side::Enemy) => Some(CombatEventTriggerType::EnemyUnitDefeated),
                None => None,
            };
            let raised = core::iter::once(CombatEventTriggerType::UnitDefeated).chain(side_trigger);
            for trigger in raised {
                if !triggers.contains(&trigger) {
                    triggers.push(trigger);
                }
            }
        }
        triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Unit, UnitStats};

    #[test]
    fn defeats_raise_generic_then_side_triggers() {
        let roster = Roster::new(vec![
            Unit::new(UnitId(1), "Rin", "Psychic", Side::Player, UnitStats::new(10, 1)),
            Unit::new(UnitId(2), "Shade", "Spirit", Side::Enemy, UnitStats::new(10, 1)),
            Unit::new(UnitId(3), "Wisp", "Spirit", Side::Enemy, UnitStats::new(10, 1)),
        ]);
        let mut outcome = ActionOutcome::none(UnitId(1));
        outcome.defeated = vec![UnitId(2), UnitId(3), UnitId(1)];

        assert_eq!(
            outcome.triggers(&roster),
            vec![
                CombatEventTriggerType::UnitDefeated,
                CombatEventTriggerType::EnemyUnitDefeated,
                CombatEventTriggerType::PlayerUnitDefeated,
            ]
        );
    }

    #[test]
    fn no_defeats_raise_nothing() {
        let outcome = ActionOutcome::none(UnitId(1)).with_delta(UnitId(2), -3);
        assert!(outcome.triggers(&Roster::default()).is_empty());
    }
}
