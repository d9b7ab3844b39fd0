//! Mentality level and the timed effects layered on top of it.

use crate::config::GameConfig;

/// Kinds of mentality effects a unit can carry.
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
pub enum MentalityEffectKind {
    Focused,
    Anxious,
    Enraged,
    Calm,
    Shaken,
}

/// A timed modifier on a unit's mentality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MentalityEffect {
    pub kind: MentalityEffectKind,
    /// Signed shift applied to the mentality level while active.
    pub magnitude: i32,
    /// Turns left before the effect expires.
    pub turns_remaining: u32,
}

impl MentalityEffect {
    pub const fn new(kind: MentalityEffectKind, magnitude: i32, turns: u32) -> Self {
        Self {
            kind,
            magnitude,
            turns_remaining: turns,
        }
    }
}

/// Result of removing several effect kinds at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub removed: Vec<MentalityEffectKind>,
    pub missing: Vec<MentalityEffectKind>,
}

impl RemovalReport {
    /// True when every requested kind was present and removed.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Base mentality level plus active effects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mentality {
    level: i32,
    effects: Vec<MentalityEffect>,
}

impl Mentality {
    pub fn new(level: i32) -> Self {
        Self {
            level: clamp_level(level),
            effects: Vec::new(),
        }
    }

    /// Base level without effects.
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Level including every active effect, clamped to the valid range.
    pub fn effective_level(&self) -> i32 {
        let shift = self
            .effects
            .iter()
            .map(|e| e.magnitude)
            .fold(0i32, i32::saturating_add);
        clamp_level(self.level.saturating_add(shift))
    }

    pub fn shift(&mut self, delta: i32) {
        self.level = clamp_level(self.level.saturating_add(delta));
    }

    pub fn effects(&self) -> &[MentalityEffect] {
        &self.effects
    }

    pub fn has_effect(&self, kind: MentalityEffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// Adds an effect, replacing any existing effect of the same kind.
    pub fn apply_effect(&mut self, effect: MentalityEffect) {
        match self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            Some(existing) => *existing = effect,
            None => self.effects.push(effect),
        }
    }

    /// Removes every requested kind, reporting which ones were absent.
    ///
    /// A missing kind does not stop the remaining removals.
    pub fn remove_effects(&mut self, kinds: &[MentalityEffectKind]) -> RemovalReport {
        let mut report = RemovalReport::default();
        for &kind in kinds {
            let before = self.effects.len();
            self.effects.retain(|e| e.kind != kind);
            if self.effects.len() < before {
                report.removed.push(kind);
            } else {
                report.missing.push(kind);
            }
        }
        report
    }

    /// Advances effect timers by one turn and drops expired effects.
    ///
    /// Returns the kinds that expired.
    pub fn tick(&mut self) -> Vec<MentalityEffectKind> {
        let mut expired = Vec::new();
        self.effects.retain_mut(|effect| {
            effect.turns_remaining = effect.turns_remaining.saturating_sub(1);
            if effect.turns_remaining == 0 {
                expired.push(effect.kind);
                false
            } else {
                true
            }
        });
        expired
    }
}

fn clamp_level(level: i32) -> i32 {
    level.clamp(GameConfig::MENTALITY_MIN, GameConfig::MENTALITY_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use MentalityEffectKind::*;

    #[test]
    fn remove_effects_continues_past_missing_kinds() {
        let mut mentality = Mentality::new(0);
        mentality.apply_effect(MentalityEffect::new(Focused, 10, 2));
        mentality.apply_effect(MentalityEffect::new(Calm, 5, 2));

        let report = mentality.remove_effects(&[Anxious, Focused, Calm]);

        assert_eq!(report.removed, vec![Focused, Calm]);
        assert_eq!(report.missing, vec![Anxious]);
        assert!(!report.is_complete());
        assert!(mentality.effects().is_empty());
    }

    #[test]
    fn successful_removal_reports_complete() {
        let mut mentality = Mentality::new(0);
        mentality.apply_effect(MentalityEffect::new(Shaken, -20, 1));

        let report = mentality.remove_effects(&[Shaken]);
        assert!(report.is_complete());
    }

    #[test]
    fn apply_replaces_same_kind() {
        let mut mentality = Mentality::new(0);
        mentality.apply_effect(MentalityEffect::new(Enraged, 10, 1));
        mentality.apply_effect(MentalityEffect::new(Enraged, 30, 3));

        assert_eq!(mentality.effects().len(), 1);
        assert_eq!(mentality.effective_level(), 30);
    }

    #[test]
    fn tick_expires_effects() {
        let mut mentality = Mentality::new(90);
        mentality.apply_effect(MentalityEffect::new(Focused, 50, 1));
        mentality.apply_effect(MentalityEffect::new(Calm, 1, 2));
        assert_eq!(mentality.effective_level(), 100);

        assert_eq!(mentality.tick(), vec![Focused]);
        assert!(mentality.has_effect(Calm));
        assert_eq!(mentality.effective_level(), 91);
    }

    #[test]
    fn extreme_effects_saturate_instead_of_overflowing() {
        let mut mentality = Mentality::new(0);
        mentality.apply_effect(MentalityEffect::new(Enraged, i32::MAX, 1));
        mentality.apply_effect(MentalityEffect::new(Focused, i32::MAX, 1));
        assert_eq!(mentality.effective_level(), GameConfig::MENTALITY_MAX);

        mentality.remove_effects(&[Enraged, Focused]);
        mentality.apply_effect(MentalityEffect::new(Shaken, i32::MIN, 1));
        mentality.apply_effect(MentalityEffect::new(Anxious, i32::MIN, 1));
        assert_eq!(mentality.effective_level(), GameConfig::MENTALITY_MIN);
    }

    #[test]
    fn level_is_clamped() {
        let mut mentality = Mentality::new(500);
        assert_eq!(mentality.level(), 100);
        mentality.shift(-1000);
        assert_eq!(mentality.level(), -100);
    }
}
