use crate::action::{ActionOutcome, ActionTarget, CombatAction};

use super::{Side, Unit, UnitId};

/// Every unit in an encounter, kept in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    units: Vec<Unit>,
}

impl Roster {
    pub fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Living units of one side, in declaration order.
    pub fn living(&self, side: Side) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(move |unit| unit.side == side && !unit.is_defeated())
    }

    /// True once a side has no living units left.
    pub fn is_side_defeated(&self, side: Side) -> bool {
        self.living(side).next().is_none()
    }

    /// Acting order for a new round: living units by speed, fastest first.
    ///
    /// Ties keep declaration order.
    pub fn turn_order(&self) -> Vec<UnitId> {
        let mut order: Vec<(usize, &Unit)> = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, unit)| !unit.is_defeated())
            .collect();
        order.sort_by_key(|(index, unit)| (core::cmp::Reverse(unit.stats.speed), *index));
        order.into_iter().map(|(_, unit)| unit.id).collect()
    }

    /// Resolves an action target to concrete living unit ids.
    pub fn resolve_target(&self, actor: UnitId, target: ActionTarget) -> Vec<UnitId> {
        let Some(side) = self.get(actor).map(|unit| unit.side) else {
            return Vec::new();
        };
        match target {
            ActionTarget::Actor => vec![actor],
            ActionTarget::Unit(id) => self
                .get(id)
                .filter(|unit| !unit.is_defeated())
                .map(|unit| vec![unit.id])
                .unwrap_or_default(),
            ActionTarget::AllOpponents => self.living(side.opponent()).map(|u| u.id).collect(),
            ActionTarget::AllAllies => self.living(side).map(|u| u.id).collect(),
        }
    }

    /// First living unit that can stand in for the single target of `action`.
    ///
    /// The replacement comes from the original target's side when that unit
    /// is known. Otherwise items look among the actor's allies (the actor
    /// included) and every other kind among its opponents.
    pub fn fallback_target(&self, actor: UnitId, action: &CombatAction) -> Option<UnitId> {
        let actor = self.get(actor)?;
        let original_side = match action.target {
            ActionTarget::Unit(id) => self.get(id).map(|unit| unit.side),
            _ => None,
        };
        let side = original_side.unwrap_or(if action.kind.aids_target() {
            actor.side
        } else {
            actor.side.opponent()
        });
        self.living(side).next().map(|unit| unit.id)
    }

    /// Applies an outcome's health changes and effects.
    ///
    /// Records newly defeated units in `outcome.defeated` and returns them.
    /// Unknown unit ids are ignored.
    pub fn apply(&mut self, outcome: &mut ActionOutcome) -> Vec<UnitId> {
        let mut defeated = Vec::new();
        for delta in &outcome.deltas {
            if let Some(unit) = self.get_mut(delta.unit) {
                let was_defeated = unit.is_defeated();
                unit.stats.apply_hp(delta.hp);
                if !was_defeated && unit.is_defeated() && !defeated.contains(&unit.id) {
                    defeated.push(unit.id);
                }
            }
        }
        for (id, effect) in &outcome.effects {
            if let Some(unit) = self.get_mut(*id) {
                unit.mentality.apply_effect(*effect);
            }
        }
        for id in &defeated {
            if !outcome.defeated.contains(id) {
                outcome.defeated.push(*id);
            }
        }
        defeated
    }
}

impl From<Vec<Unit>> for Roster {
    fn from(units: Vec<Unit>) -> Self {
        Self::new(units)
    }
}
