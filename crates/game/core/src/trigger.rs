/// Condition under which a combat event fires.
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
pub enum CombatEventTriggerType {
    /// Right after the session switches into combat.
    CombatStart,
    /// Before a unit's turn menu opens.
    TurnStart,
    /// Any unit reached zero health.
    UnitDefeated,
    /// A player-side unit reached zero health.
    PlayerUnitDefeated,
    /// An enemy-side unit reached zero health.
    EnemyUnitDefeated,
    /// After every living unit has acted once.
    RoundEnd,
    /// Just before the session restores the previous mode.
    CombatEnd,
}
