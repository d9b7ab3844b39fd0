//! Shared services handed to sequences and combat sessions.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::RuntimeConfig;
use crate::mode::GameModeController;
use crate::repository::{FileObjectStore, InMemoryObjectStore, ObjectStore, Result};
use crate::sequence::Collaborators;

/// Everything the orchestration core needs from the surrounding game.
///
/// Cloning is cheap and every clone shares the same mode state, store and
/// combat slot.
#[derive(Clone)]
pub struct GameContext {
    modes: GameModeController,
    collaborators: Collaborators,
    store: Arc<dyn ObjectStore>,
    config: RuntimeConfig,
    combat_slot: Arc<AtomicBool>,
}

impl GameContext {
    /// Context with an in-memory store and no collaborators.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            modes: GameModeController::new(),
            collaborators: Collaborators::default(),
            store: Arc::new(InMemoryObjectStore::new()),
            config,
            combat_slot: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Context whose store follows `config.save_data_dir`.
    pub fn from_config(config: RuntimeConfig) -> Result<Self> {
        let store: Arc<dyn ObjectStore> = match &config.save_data_dir {
            Some(dir) => Arc::new(FileObjectStore::new(dir)?),
            None => Arc::new(InMemoryObjectStore::new()),
        };
        Ok(Self::new(config).with_store(store))
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = store;
        self
    }

    pub fn modes(&self) -> &GameModeController {
        &self.modes
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// True while a combat session holds the slot.
    pub fn combat_active(&self) -> bool {
        self.combat_slot.load(Ordering::Acquire)
    }

    /// Claims the single combat slot; `None` if another session holds it.
    pub(crate) fn acquire_combat_slot(&self) -> Option<CombatSlot> {
        self.combat_slot
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CombatSlot(Arc::clone(&self.combat_slot)))
    }
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl std::fmt::Debug for GameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameContext")
            .field("mode", &self.modes.current_mode())
            .field("collaborators", &self.collaborators)
            .field("config", &self.config)
            .field("combat_active", &self.combat_active())
            .finish_non_exhaustive()
    }
}

/// Held by the active combat session; frees the slot when dropped.
#[derive(Debug)]
pub(crate) struct CombatSlot(Arc<AtomicBool>);

impl Drop for CombatSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combat_slot_is_exclusive_until_dropped() {
        let ctx = GameContext::default();
        let other = ctx.clone();

        let slot = ctx.acquire_combat_slot().unwrap();
        assert!(other.combat_active());
        assert!(other.acquire_combat_slot().is_none());

        drop(slot);
        assert!(!ctx.combat_active());
        assert!(other.acquire_combat_slot().is_some());
    }

    #[test]
    fn from_config_opens_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig::default().with_save_data_dir(dir.path().join("saves"));
        let ctx = GameContext::from_config(config).unwrap();

        assert!(crate::repository::save_object(ctx.store(), "marker", &1u8));
        assert!(dir.path().join("saves/marker.json").exists());
    }
}
