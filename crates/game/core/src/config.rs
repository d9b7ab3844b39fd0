/// Ordering convention for combat event priorities.
///
/// The default fires lower numeric priorities first, matching the `-1`
/// default priority used for ordinary events.
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
pub enum PriorityOrder {
    /// Lower numeric priority fires first.
    #[default]
    LowestFirst,
    /// Higher numeric priority fires first.
    HighestFirst,
}

impl PriorityOrder {
    /// Returns true if an event with priority `a` must fire before one with `b`.
    ///
    /// Equal priorities never precede each other, so callers keep insertion
    /// order for ties.
    pub fn precedes(self, a: i32, b: i32) -> bool {
        match self {
            Self::LowestFirst => a < b,
            Self::HighestFirst => a > b,
        }
    }
}

/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// How combat event priorities are ordered during dispatch.
    pub priority_order: PriorityOrder,
    /// Whether the turn menu offers a flee option.
    pub allow_flee: bool,
    /// Rounds after which combat ends as a stalemate.
    pub max_rounds: u32,
}

impl GameConfig {
    pub const DEFAULT_EVENT_PRIORITY: i32 = -1;
    pub const DEFAULT_MAX_ROUNDS: u32 = 99;
    pub const MENTALITY_MIN: i32 = -100;
    pub const MENTALITY_MAX: i32 = 100;

    pub fn new() -> Self {
        Self {
            priority_order: PriorityOrder::default(),
            allow_flee: true,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_priority_order(mut self, priority_order: PriorityOrder) -> Self {
        self.priority_order = priority_order;
        self
    }

    pub fn with_allow_flee(mut self, allow_flee: bool) -> Self {
        self.allow_flee = allow_flee;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
