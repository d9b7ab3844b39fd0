//! Process-wide game mode state, passed around explicitly.

use std::sync::{Arc, Mutex, PoisonError};

use game_core::GameMode;
use tracing::debug;

use crate::observer::{ObserverHandle, ObserverList};

/// Holds the current [`GameMode`] and notifies observers on change.
///
/// Cloning yields another handle to the same state. Writes are idempotent:
/// setting the mode that is already active notifies nobody.
#[derive(Clone, Debug, Default)]
pub struct GameModeController {
    inner: Arc<ModeInner>,
}

#[derive(Debug, Default)]
struct ModeInner {
    current: Mutex<GameMode>,
    observers: ObserverList<GameMode>,
}

impl GameModeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last assigned mode, or [`GameMode::None`] before the first write.
    pub fn current_mode(&self) -> GameMode {
        *self
            .inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches to `mode` and notifies observers.
    ///
    /// Returns false without notifying when `mode` is already active.
    pub fn set_mode(&self, mode: GameMode) -> bool {
        let previous = {
            let mut current = self
                .inner
                .current
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *current == mode {
                return false;
            }
            std::mem::replace(&mut *current, mode)
        };

        debug!(target: "runtime::mode", from = %previous, to = %mode, "Game mode changed");
        self.inner.observers.notify(&mode);
        true
    }

    /// Enters `mode` until the returned scope is dropped.
    ///
    /// Dropping the scope restores whatever mode was active before, even when
    /// the owning task is torn down mid-way.
    pub fn scoped(&self, mode: GameMode) -> ModeScope {
        let prior = self.current_mode();
        self.set_mode(mode);
        ModeScope {
            controller: self.clone(),
            prior: Some(prior),
        }
    }

    pub fn subscribe(
        &self,
        observer: impl Fn(GameMode) + Send + Sync + 'static,
    ) -> ObserverHandle {
        self.inner.observers.subscribe(move |mode| observer(*mode))
    }

    pub fn unsubscribe(&self, handle: ObserverHandle) -> bool {
        self.inner.observers.unsubscribe(handle)
    }
}

/// Restores the prior mode on drop.
#[derive(Debug)]
pub struct ModeScope {
    controller: GameModeController,
    prior: Option<GameMode>,
}

impl ModeScope {
    /// Mode that was active when the scope was entered.
    pub fn prior(&self) -> Option<GameMode> {
        self.prior
    }

    /// Restores the prior mode now.
    pub fn restore(mut self) {
        self.restore_prior();
    }

    fn restore_prior(&mut self) {
        if let Some(prior) = self.prior.take() {
            self.controller.set_mode(prior);
        }
    }
}

impl Drop for ModeScope {
    fn drop(&mut self) {
        self.restore_prior();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn defaults_to_none() {
        assert_eq!(GameModeController::new().current_mode(), GameMode::None);
    }

    #[test]
    fn repeated_write_notifies_once() {
        let modes = GameModeController::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        modes.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(modes.set_mode(GameMode::Combat));
        assert!(!modes.set_mode(GameMode::Combat));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(modes.current_mode(), GameMode::Combat);
    }

    #[test]
    fn observers_receive_new_mode() {
        let modes = GameModeController::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = modes.subscribe(move |mode| sink.lock().unwrap().push(mode));

        modes.set_mode(GameMode::Exploration);
        modes.set_mode(GameMode::Event);
        modes.unsubscribe(handle);
        modes.set_mode(GameMode::Other);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![GameMode::Exploration, GameMode::Event]
        );
    }

    #[test]
    fn scope_restores_prior_mode() {
        let modes = GameModeController::new();
        modes.set_mode(GameMode::Combat);
        {
            let scope = modes.scoped(GameMode::Event);
            assert_eq!(scope.prior(), Some(GameMode::Combat));
            assert_eq!(modes.current_mode(), GameMode::Event);
        }
        assert_eq!(modes.current_mode(), GameMode::Combat);
    }

    #[test]
    fn observer_may_write_mode_reentrantly() {
        let modes = GameModeController::new();
        let inner = modes.clone();
        modes.subscribe(move |mode| {
            if mode == GameMode::Other {
                inner.set_mode(GameMode::Exploration);
            }
        });

        modes.set_mode(GameMode::Other);
        assert_eq!(modes.current_mode(), GameMode::Exploration);
    }
}
