//! Async orchestration for scripted sequences and turn-based combat.
//!
//! This crate drives the synchronous rules in `game-core` from tokio tasks.
//! Consumers build a [`GameContext`], run [`EventSequence`]s through it, and
//! start a [`CombatSession`] to play an [`Encounter`] to completion.
//!
//! Modules are organized by responsibility:
//! - [`mode`] holds the shared game mode and its observers
//! - [`sequence`] composes sequence events and their collaborators
//! - [`combat`] keeps trigger subscriptions for combat events
//! - [`session`] hosts the combat lifecycle and turn loop
//! - [`api`] exposes provider traits and the runtime error type
//! - [`repository`] persists light state such as menu positions
pub mod api;
pub mod combat;
pub mod config;
pub mod context;
pub mod mode;
pub mod repository;
pub mod sequence;
pub mod session;

mod observer;

pub use api::{
    ActionProvider, ActionResolver, ChannelMenuProvider, DefaultActionResolver,
    FirstActionProvider, MenuChoice, MenuProvider, MenuRequest, ProviderKind, Result,
    RuntimeError, ScriptedMenuProvider,
};
pub use combat::{CombatEvent, CombatEventHandler, CombatEventId};
pub use config::RuntimeConfig;
pub use context::GameContext;
pub use mode::{GameModeController, ModeScope};
pub use observer::ObserverHandle;
pub use repository::{
    FileObjectStore, InMemoryObjectStore, ObjectStore, RepositoryError, load_object, save_object,
};
pub use sequence::{
    CancelToken, Collaborators, CombatLauncher, CustomEvent, DialogueRunner, Ease, EventSequence,
    FadeDirection, FlashParams, ScreenEffects, SequenceEvent, SequenceOutcome, TutorialRunner,
};
pub use session::{CombatNotification, CombatResult, CombatSession, Encounter};
