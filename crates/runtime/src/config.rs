//! Runtime configuration and its environment loader.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use game_core::{GameConfig, PriorityOrder};

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Capacity of each session's notification channel.
    pub event_buffer_size: usize,
    /// Restore and save each player unit's turn-menu index through the store.
    pub persist_menu_memory: bool,
    /// Directory for a file-backed object store. `None` keeps state in memory.
    pub save_data_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 64,
            persist_menu_memory: true,
            save_data_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PSYCHOUT_EVENT_BUFFER` - Notification channel capacity (default: 64)
    /// - `PSYCHOUT_PERSIST_MENU` - Persist turn-menu positions (default: true)
    /// - `PSYCHOUT_SAVE_DIR` - Directory for saved objects (default: in-memory)
    /// - `PSYCHOUT_MAX_ROUNDS` - Rounds before a stalemate (default: 99)
    /// - `PSYCHOUT_PRIORITY_ORDER` - `lowest_first` or `highest_first`
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_var::<usize>(&lookup, "PSYCHOUT_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(persist) = read_bool(&lookup, "PSYCHOUT_PERSIST_MENU") {
            config.persist_menu_memory = persist;
        }
        if let Some(dir) = lookup("PSYCHOUT_SAVE_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.save_data_dir = Some(PathBuf::from(dir));
        }
        if let Some(max_rounds) = read_var::<u32>(&lookup, "PSYCHOUT_MAX_ROUNDS") {
            config.game_config = config.game_config.with_max_rounds(max_rounds.max(1));
        }
        if let Some(order) = read_var::<PriorityOrder>(&lookup, "PSYCHOUT_PRIORITY_ORDER") {
            config.game_config = config.game_config.with_priority_order(order);
        }

        config
    }

    pub fn with_game_config(mut self, game_config: GameConfig) -> Self {
        self.game_config = game_config;
        self
    }

    pub fn with_save_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_data_dir = Some(dir.into());
        self
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
{
    lookup(key)?.trim().parse().ok()
}

fn read_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    match lookup(key)?.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
