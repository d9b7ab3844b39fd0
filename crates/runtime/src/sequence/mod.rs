//! Scripted event sequences.
//!
//! An [`EventSequence`] runs its [`SequenceEvent`]s strictly one after the
//! other, optionally switching the game into its trigger mode for the
//! duration of the run and restoring the prior mode afterwards.

mod cancel;
mod collaborators;
mod event;

pub use cancel::CancelToken;
pub use collaborators::{
    Collaborators, CombatLauncher, DialogueRunner, Ease, FadeDirection, FlashParams,
    ScreenEffects, TutorialRunner,
};
pub use event::{CustomEvent, SequenceEvent};

use std::sync::atomic::{AtomicBool, Ordering};

use game_core::GameMode;
use tracing::debug;

use crate::api::{Result, RuntimeError};
use crate::context::GameContext;
use crate::observer::{ObserverHandle, ObserverList};

/// How a sequence run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Every event ran to completion.
    Completed { events: usize },
    /// The run was cancelled after `completed` events.
    Cancelled { completed: usize },
}

impl SequenceOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Ordered composition of sequence events run as one logical step.
#[derive(Debug)]
pub struct EventSequence {
    name: String,
    events: Vec<SequenceEvent>,
    trigger_mode: GameMode,
    running: AtomicBool,
    completion: ObserverList<SequenceOutcome>,
}

impl EventSequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
            trigger_mode: GameMode::Event,
            running: AtomicBool::new(false),
            completion: ObserverList::new(),
        }
    }

    pub fn with_events(name: impl Into<String>, events: Vec<SequenceEvent>) -> Self {
        Self {
            events,
            ..Self::new(name)
        }
    }

    /// Appends an event (builder pattern).
    pub fn then(mut self, event: SequenceEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Overrides the mode entered while the sequence runs.
    pub fn with_trigger_mode(mut self, mode: GameMode) -> Self {
        self.trigger_mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn events(&self) -> &[SequenceEvent] {
        &self.events
    }

    pub fn trigger_mode(&self) -> GameMode {
        self.trigger_mode
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Registers a callback fired after every run, completed or cancelled.
    pub fn on_complete(
        &self,
        callback: impl Fn(SequenceOutcome) + Send + Sync + 'static,
    ) -> ObserverHandle {
        self.completion.subscribe(move |outcome| callback(*outcome))
    }

    pub fn remove_on_complete(&self, handle: ObserverHandle) -> bool {
        self.completion.unsubscribe(handle)
    }

    /// Runs the sequence with mode capture and no external cancellation.
    pub async fn run(&self, ctx: &GameContext) -> Result<SequenceOutcome> {
        self.invoke(ctx, true, &CancelToken::new()).await
    }

    /// Runs every event in order, suspending on each until it completes.
    ///
    /// With `capture_game_mode`, the current mode is saved, the trigger mode
    /// entered, and the saved mode restored when the run ends (also on
    /// cancellation or when this future is dropped). A sequence cannot be
    /// invoked again while a run is in flight.
    pub async fn invoke(
        &self,
        ctx: &GameContext,
        capture_game_mode: bool,
        cancel: &CancelToken,
    ) -> Result<SequenceOutcome> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::SequenceAlreadyRunning {
                name: self.name.clone(),
            });
        }
        let _running = RunningFlag(&self.running);

        let scope = capture_game_mode.then(|| ctx.modes().scoped(self.trigger_mode));
        debug!(
            target: "runtime::sequence",
            sequence = %self.name,
            events = self.events.len(),
            prior_mode = ?scope.as_ref().and_then(|s| s.prior()),
            "Sequence started"
        );

        let mut completed = 0;
        let mut outcome = None;
        for event in &self.events {
            match cancel.run_until_cancelled(event.invoke(ctx.collaborators())).await {
                Some(()) => completed += 1,
                None => {
                    outcome = Some(SequenceOutcome::Cancelled { completed });
                    break;
                }
            }
        }
        let outcome = outcome.unwrap_or(SequenceOutcome::Completed { events: completed });

        drop(scope);
        debug!(target: "runtime::sequence", sequence = %self.name, ?outcome, "Sequence finished");
        self.completion.notify(&outcome);
        Ok(outcome)
    }
}

struct RunningFlag<'a>(&'a AtomicBool);

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn recorder(log: &Arc<Mutex<Vec<usize>>>, index: usize) -> SequenceEvent {
        let log = Arc::clone(log);
        SequenceEvent::custom(format!("record-{index}"), move || {
            log.lock().unwrap().push(index)
        })
    }

    #[tokio::test]
    async fn runs_children_in_declared_order() {
        let ctx = GameContext::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sequence = EventSequence::new("intro")
            .then(recorder(&log, 0))
            .then(SequenceEvent::dialogue("missing-manager"))
            .then(recorder(&log, 1))
            .then(recorder(&log, 1))
            .then(recorder(&log, 2));

        let outcome = sequence.run(&ctx).await.unwrap();

        assert_eq!(outcome, SequenceOutcome::Completed { events: 5 });
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 1, 2]);
    }

    #[tokio::test]
    async fn captures_and_restores_mode() {
        let ctx = GameContext::default();
        ctx.modes().set_mode(GameMode::Exploration);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let modes = ctx.modes().clone();
        let sequence =
            EventSequence::new("cutscene").then(SequenceEvent::custom("observe_mode", move || {
                *sink.lock().unwrap() = Some(modes.current_mode());
            }));

        sequence.run(&ctx).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), Some(GameMode::Event));
        assert_eq!(ctx.modes().current_mode(), GameMode::Exploration);
    }

    #[tokio::test]
    async fn without_capture_mode_is_untouched() {
        let ctx = GameContext::default();
        ctx.modes().set_mode(GameMode::Combat);
        let changes = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&changes);
        ctx.modes().subscribe(move |_| *counter.lock().unwrap() += 1);

        EventSequence::new("silent")
            .then(SequenceEvent::wait(Duration::ZERO))
            .invoke(&ctx, false, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(*changes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_sequence_completes_after_bookkeeping() {
        let ctx = GameContext::default();
        ctx.modes().set_mode(GameMode::Exploration);
        let done = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&done);
        let sequence = EventSequence::new("empty");
        sequence.on_complete(move |outcome| *sink.lock().unwrap() = Some(outcome));

        let outcome = sequence.run(&ctx).await.unwrap();

        assert_eq!(outcome, SequenceOutcome::Completed { events: 0 });
        assert_eq!(*done.lock().unwrap(), Some(outcome));
        assert_eq!(ctx.modes().current_mode(), GameMode::Exploration);
    }

    #[tokio::test]
    async fn rejects_reentrant_invocation() {
        let ctx = GameContext::default();
        let sequence =
            EventSequence::new("slow").then(SequenceEvent::wait(Duration::from_millis(10)));
        let token = CancelToken::new();

        let (first, second) = tokio::join!(
            sequence.invoke(&ctx, true, &token),
            sequence.invoke(&ctx, true, &token)
        );

        assert!(first.unwrap().is_completed());
        assert!(matches!(
            second,
            Err(RuntimeError::SequenceAlreadyRunning { .. })
        ));
        assert!(!sequence.is_running());
    }

    #[tokio::test]
    async fn cancellation_stops_remaining_events_and_restores_mode() {
        let ctx = GameContext::default();
        ctx.modes().set_mode(GameMode::Combat);
        let token = CancelToken::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let canceller = token.clone();
        let sequence = EventSequence::new("interrupted")
            .then(SequenceEvent::custom("cancel", move || canceller.cancel()))
            .then(recorder(&log, 9));

        let outcome = sequence.invoke(&ctx, true, &token).await.unwrap();

        assert_eq!(outcome, SequenceOutcome::Cancelled { completed: 1 });
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(ctx.modes().current_mode(), GameMode::Combat);
    }

    #[tokio::test]
    async fn panicking_completion_subscriber_does_not_corrupt_state() {
        let ctx = GameContext::default();
        let sequence = EventSequence::new("fragile");
        sequence.on_complete(|_| panic!("subscriber failure"));

        assert!(sequence.run(&ctx).await.unwrap().is_completed());
        assert!(!sequence.is_running());
        assert!(sequence.run(&ctx).await.is_ok());
    }
}
