//! Demo client wiring the runtime to log-only collaborators.
//!
//! # Architecture
//!
//! ```text
//! Client (composition root)
//!   ├─→ GameContext (mode state, object store, config)
//!   ├─→ Collaborators (dialogue, screen, tutorial, combat launcher)
//!   └─→ Intro EventSequence (ends by launching a combat)
//! ```

mod builder;
pub mod demo;
pub mod logging;

pub use builder::ClientBuilder;

use anyhow::Result;
use game_core::GameMode;
use runtime::{CancelToken, EventSequence, GameContext, SequenceOutcome};

/// Top-level client container.
///
/// # Lifecycle
///
/// 1. Client::builder() assembles the context and collaborators
/// 2. Client::run() enters exploration and plays the intro sequence
/// 3. Ctrl-C cancels the intro; the previous mode is still restored
pub struct Client {
    ctx: GameContext,
    intro: EventSequence,
}

impl Client {
    /// Create a new ClientBuilder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    /// Plays the intro until it completes or Ctrl-C is pressed.
    pub async fn run(self) -> Result<SequenceOutcome> {
        self.ctx.modes().set_mode(GameMode::Exploration);

        let cancel = CancelToken::new();
        let interrupt = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, cancelling");
                interrupt.cancel();
            }
        });

        let outcome = self.intro.invoke(&self.ctx, true, &cancel).await;
        watcher.abort();

        let outcome = outcome?;
        tracing::info!(
            ?outcome,
            mode = %self.ctx.modes().current_mode(),
            "Intro finished"
        );
        Ok(outcome)
    }
}
