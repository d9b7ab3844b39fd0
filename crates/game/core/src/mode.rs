//! Top-level game modes.

/// Which top-level activity is currently running.
///
/// Exactly one mode is active at a time. Transitions are unrestricted at this
/// layer; restoring a prior mode is the caller's responsibility.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GameMode {
    /// No mode has been set yet.
    #[default]
    None,
    /// Free movement through a level.
    Exploration,
    /// A scripted event sequence is running.
    Event,
    /// A combat encounter is running.
    Combat,
    /// Anything else (menus, cutscenes owned by other systems).
    Other,
}
