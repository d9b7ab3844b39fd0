use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::collaborators::{Collaborators, FadeDirection, FlashParams};

/// Callback run by [`SequenceEvent::Custom`].
#[derive(Clone)]
pub struct CustomEvent {
    pub name: String,
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl CustomEvent {
    pub fn new(name: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            callback: Arc::new(callback),
        }
    }
}

impl std::fmt::Debug for CustomEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomEvent")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Smallest schedulable unit of scripted game action.
///
/// Each variant carries the configuration captured when the sequence was
/// authored. Invoking an event suspends until it is done and completes
/// exactly once; a missing collaborator makes the event a logged no-op.
#[derive(Clone, Debug)]
pub enum SequenceEvent {
    Wait { duration: Duration },
    Dialogue { story: String },
    ScreenCover { direction: FadeDirection },
    FlashScreen(FlashParams),
    Tutorial { tutorial: String },
    Combat { encounter: String, scene: String },
    Custom(CustomEvent),
}

impl SequenceEvent {
    pub fn wait(duration: Duration) -> Self {
        Self::Wait { duration }
    }

    pub fn dialogue(story: impl Into<String>) -> Self {
        Self::Dialogue {
            story: story.into(),
        }
    }

    pub fn screen_cover(direction: FadeDirection) -> Self {
        Self::ScreenCover { direction }
    }

    pub fn tutorial(tutorial: impl Into<String>) -> Self {
        Self::Tutorial {
            tutorial: tutorial.into(),
        }
    }

    pub fn combat(encounter: impl Into<String>, scene: impl Into<String>) -> Self {
        Self::Combat {
            encounter: encounter.into(),
            scene: scene.into(),
        }
    }

    pub fn custom(name: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self::Custom(CustomEvent::new(name, callback))
    }

    /// Short name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Wait { .. } => "wait",
            Self::Dialogue { .. } => "dialogue",
            Self::ScreenCover { .. } => "screen_cover",
            Self::FlashScreen(_) => "flash_screen",
            Self::Tutorial { .. } => "tutorial",
            Self::Combat { .. } => "combat",
            Self::Custom(_) => "custom",
        }
    }

    /// Runs the event until it completes.
    pub async fn invoke(&self, collaborators: &Collaborators) {
        debug!(target: "runtime::sequence", kind = self.kind(), "Invoking sequence event");
        match self {
            Self::Wait { duration } => tokio::time::sleep(*duration).await,
            Self::Dialogue { story } => match &collaborators.dialogue {
                Some(dialogue) => dialogue.run(story).await,
                None => missing_collaborator(self, "dialogue"),
            },
            Self::ScreenCover { direction } => match &collaborators.screen {
                Some(screen) => screen.cover(*direction).await,
                None => missing_collaborator(self, "screen"),
            },
            Self::FlashScreen(params) => match &collaborators.screen {
                Some(screen) => screen.flash(params).await,
                None => missing_collaborator(self, "screen"),
            },
            Self::Tutorial { tutorial } => match &collaborators.tutorial {
                Some(runner) => runner.show(tutorial).await,
                None => missing_collaborator(self, "tutorial"),
            },
            Self::Combat { encounter, scene } => match &collaborators.combat {
                Some(launcher) => launcher.launch(encounter, scene).await,
                None => missing_collaborator(self, "combat"),
            },
            Self::Custom(custom) => (custom.callback)(),
        }
    }
}

fn missing_collaborator(event: &SequenceEvent, collaborator: &'static str) {
    warn!(
        target: "runtime::sequence",
        kind = event.kind(),
        collaborator,
        "Collaborator unavailable, skipping sequence event"
    );
}
