//! Engine-side collaborators consumed by sequence events.
//!
//! Each collaborator exposes a single suspend-until-done operation. None of
//! them is required: a sequence event whose collaborator is absent logs a
//! warning and completes immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Direction of a full-screen fade.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FadeDirection {
    /// Fade to an opaque cover.
    In,
    /// Fade the cover away.
    Out,
}

/// Interpolation curve for screen effects.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
}

/// Parameters of a screen flash sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlashParams {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub duration: Duration,
    pub ease: Ease,
}

#[async_trait]
pub trait DialogueRunner: Send + Sync {
    /// Plays a story asset until the player dismisses the last line.
    async fn run(&self, story: &str);
}

#[async_trait]
pub trait ScreenEffects: Send + Sync {
    async fn cover(&self, direction: FadeDirection);

    async fn flash(&self, params: &FlashParams);
}

#[async_trait]
pub trait TutorialRunner: Send + Sync {
    async fn show(&self, tutorial: &str);
}

#[async_trait]
pub trait CombatLauncher: Send + Sync {
    /// Loads `scene` and plays the named encounter until it ends.
    async fn launch(&self, encounter: &str, scene: &str);
}

/// The set of collaborators available to sequence events.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub dialogue: Option<Arc<dyn DialogueRunner>>,
    pub screen: Option<Arc<dyn ScreenEffects>>,
    pub tutorial: Option<Arc<dyn TutorialRunner>>,
    pub combat: Option<Arc<dyn CombatLauncher>>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialogue(mut self, dialogue: impl DialogueRunner + 'static) -> Self {
        self.dialogue = Some(Arc::new(dialogue));
        self
    }

    pub fn with_screen(mut self, screen: impl ScreenEffects + 'static) -> Self {
        self.screen = Some(Arc::new(screen));
        self
    }

    pub fn with_tutorial(mut self, tutorial: impl TutorialRunner + 'static) -> Self {
        self.tutorial = Some(Arc::new(tutorial));
        self
    }

    pub fn with_combat(mut self, combat: impl CombatLauncher + 'static) -> Self {
        self.combat = Some(Arc::new(combat));
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("dialogue", &self.dialogue.is_some())
            .field("screen", &self.screen.is_some())
            .field("tutorial", &self.tutorial.is_some())
            .field("combat", &self.combat.is_some())
            .finish()
    }
}
