//! Client builder with dependency injection pattern.

use anyhow::{Context, Result};
use runtime::{Collaborators, EventSequence, GameContext, MenuChoice, RuntimeConfig};

use crate::Client;
use crate::demo::{self, DemoLauncher, LogDialogue, LogScreen, LogTutorial};

/// Builder for constructing a [`Client`].
///
/// Configuration defaults to [`RuntimeConfig::default`], the intro to
/// [`demo::intro`] and the player input to [`demo::menu_script`].
#[derive(Default)]
pub struct ClientBuilder {
    config: Option<RuntimeConfig>,
    intro: Option<EventSequence>,
    menu_script: Option<Vec<MenuChoice>>,
}

impl ClientBuilder {
    /// Create a new ClientBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the sequence played by [`Client::run`].
    pub fn intro(mut self, intro: EventSequence) -> Self {
        self.intro = Some(intro);
        self
    }

    /// Replace the scripted menu choices used in combat.
    pub fn menu_script(mut self, script: Vec<MenuChoice>) -> Self {
        self.menu_script = Some(script);
        self
    }

    /// Build the Client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured save directory cannot be created.
    pub fn build(self) -> Result<Client> {
        let config = self.config.unwrap_or_default();
        let base = GameContext::from_config(config).context("failed to open the object store")?;

        // Combat events inside the launched session need every collaborator
        // except the launcher itself.
        let collaborators = Collaborators::new()
            .with_dialogue(LogDialogue)
            .with_screen(LogScreen)
            .with_tutorial(LogTutorial);
        let combat_ctx = base.clone().with_collaborators(collaborators.clone());
        let launcher = DemoLauncher::new(
            combat_ctx,
            self.menu_script.unwrap_or_else(demo::menu_script),
        );
        let ctx = base.with_collaborators(collaborators.with_combat(launcher));

        Ok(Client {
            ctx,
            intro: self.intro.unwrap_or_else(demo::intro),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::GameMode;
    use runtime::SequenceEvent;

    #[tokio::test]
    async fn demo_intro_plays_combat_and_restores_exploration() {
        let client = Client::builder().build().unwrap();
        let ctx = client.context().clone();

        let outcome = client.run().await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(ctx.modes().current_mode(), GameMode::Exploration);
        assert!(!ctx.combat_active());
    }

    #[tokio::test]
    async fn custom_intro_replaces_demo() {
        let client = Client::builder()
            .intro(EventSequence::new("short").then(SequenceEvent::tutorial("controls")))
            .build()
            .unwrap();

        assert!(client.run().await.unwrap().is_completed());
    }
}
