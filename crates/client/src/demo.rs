//! Demo content and log-only collaborators.
//!
//! Stand-ins for the dialogue, screen and tutorial systems that only log
//! what they would show, and a combat launcher that plays encounters with a
//! scripted menu.

use std::time::Duration;

use async_trait::async_trait;
use game_core::{
    ActionTarget, CombatAction, CombatEventTriggerType, MentalityEffect,
    MentalityEffectKind, Side, Unit, UnitId, UnitStats,
};
use runtime::{
    CancelToken, CombatEvent, CombatEventId, CombatLauncher, CombatNotification, CombatResult,
    CombatSession, DialogueRunner, Ease, Encounter, EventSequence, FadeDirection,
    FirstActionProvider, FlashParams, GameContext, MenuChoice, ScreenEffects,
    ScriptedMenuProvider, SequenceEvent, TutorialRunner,
};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

pub const AMBUSH: &str = "shade_ambush";

/// Prints dialogue lines instead of showing a dialogue box.
#[derive(Debug, Default)]
pub struct LogDialogue;

#[async_trait]
impl DialogueRunner for LogDialogue {
    async fn run(&self, story: &str) {
        info!(target: "psychout::dialogue", story, "Dialogue");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[derive(Debug, Default)]
pub struct LogScreen;

#[async_trait]
impl ScreenEffects for LogScreen {
    async fn cover(&self, direction: FadeDirection) {
        info!(target: "psychout::screen", %direction, "Screen cover");
    }

    async fn flash(&self, params: &FlashParams) {
        info!(
            target: "psychout::screen",
            duration_ms = params.duration.as_millis() as u64,
            ease = %params.ease,
            "Screen flash"
        );
        tokio::time::sleep(params.duration).await;
    }
}

#[derive(Debug, Default)]
pub struct LogTutorial;

#[async_trait]
impl TutorialRunner for LogTutorial {
    async fn show(&self, tutorial: &str) {
        info!(target: "psychout::tutorial", tutorial, "Tutorial");
    }
}

/// Plays encounters from [`encounter`] with scripted player input.
pub struct DemoLauncher {
    ctx: GameContext,
    script: Vec<MenuChoice>,
}

impl DemoLauncher {
    /// `ctx` must share mode state and store with the context running the
    /// sequences that launch combats.
    pub fn new(ctx: GameContext, script: Vec<MenuChoice>) -> Self {
        Self { ctx, script }
    }
}

#[async_trait]
impl CombatLauncher for DemoLauncher {
    async fn launch(&self, encounter_name: &str, scene: &str) {
        let Some(encounter) = encounter(encounter_name, scene) else {
            warn!(target: "psychout::combat", encounter = encounter_name, "Unknown encounter");
            return;
        };

        let previous_mode = self.ctx.modes().current_mode();
        let mut session = match CombatSession::start(&self.ctx, encounter, previous_mode) {
            Ok(session) => session
                .with_menu_provider(ScriptedMenuProvider::new(self.script.clone()))
                .with_enemy_provider(FirstActionProvider),
            Err(error) => {
                warn!(target: "psychout::combat", %error, "Combat could not start");
                return;
            }
        };

        let reporter = tokio::spawn(report_notifications(session.subscribe()));

        match session.run(&CancelToken::new()).await {
            Ok(result) => info!(target: "psychout::combat", %result, "Combat over"),
            Err(error) => warn!(target: "psychout::combat", %error, "Combat failed"),
        }
        drop(session);
        if let Err(error) = reporter.await {
            warn!(target: "psychout::combat", %error, "Notification reporter stopped");
        }
    }
}

/// Logs notifications until the combat ends or the channel closes.
///
/// Returns the result carried by `Ended`, if it was received.
async fn report_notifications(
    mut notifications: broadcast::Receiver<CombatNotification>,
) -> Option<CombatResult> {
    loop {
        match notifications.recv().await {
            Ok(notification) => {
                report(&notification);
                if let CombatNotification::Ended { result } = notification {
                    return Some(result);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(target: "psychout::combat", skipped, "Dropped stale combat notifications");
            }
            Err(RecvError::Closed) => {
                warn!(target: "psychout::combat", "Combat notification stream closed");
                return None;
            }
        }
    }
}

fn report(notification: &CombatNotification) {
    match notification {
        CombatNotification::Started { encounter } => {
            info!(target: "psychout::combat", %encounter, "Battle begins");
        }
        CombatNotification::TurnStarted { unit, round } => {
            info!(target: "psychout::combat", %unit, round, "Turn");
        }
        CombatNotification::ActionResolved {
            unit,
            action,
            outcome,
        } => {
            info!(
                target: "psychout::combat",
                %unit,
                action = %action.name,
                hits = outcome.deltas.len(),
                defeated = ?outcome.defeated,
                "Action"
            );
        }
        CombatNotification::EventFired { event, trigger } => {
            info!(target: "psychout::combat", %event, %trigger, "Combat event");
        }
        CombatNotification::Ended { result } => {
            info!(target: "psychout::combat", %result, "Battle ends");
        }
    }
}

/// Builds the named encounter, if it exists.
pub fn encounter(name: &str, scene: &str) -> Option<Encounter> {
    if name != AMBUSH {
        return None;
    }

    let rin = Unit::new(UnitId(1), "Rin", "Psychic", Side::Player, UnitStats::new(34, 6))
        .with_action(CombatAction::attack("Strike", ActionTarget::Unit(UnitId(3)), 6))
        .with_action(
            CombatAction::attack("Mind Spike", ActionTarget::AllOpponents, 4).with_effect(
                MentalityEffect::new(MentalityEffectKind::Shaken, -15, 2),
            ),
        );
    let kai = Unit::new(UnitId(2), "Kai", "Medium", Side::Player, UnitStats::new(26, 4))
        .with_action(CombatAction::attack("Ward Bolt", ActionTarget::Unit(UnitId(4)), 5))
        .with_item(CombatAction::item("Calming Tea", 8).aimed_at(ActionTarget::AllAllies));
    let shade = Unit::new(UnitId(3), "Shade", "Spirit", Side::Enemy, UnitStats::new(18, 5))
        .with_action(CombatAction::attack("Cold Touch", ActionTarget::Unit(UnitId(1)), 4));
    let wisp = Unit::new(UnitId(4), "Wisp", "Spirit", Side::Enemy, UnitStats::new(12, 7))
        .with_action(CombatAction::attack("Flicker", ActionTarget::Unit(UnitId(2)), 3));

    let opening = CombatEvent::new(
        CombatEventId(1),
        CombatEventTriggerType::CombatStart,
        EventSequence::new("ambush_opening")
            .then(SequenceEvent::dialogue("shade_taunt"))
            .then(SequenceEvent::tutorial("turn_menu_basics")),
    )
    .once();
    let first_fall = CombatEvent::new(
        CombatEventId(2),
        CombatEventTriggerType::EnemyUnitDefeated,
        EventSequence::new("first_spirit_falls").then(SequenceEvent::dialogue("rin_relief")),
    )
    .with_priority(0)
    .once();
    let flash_on_loss = CombatEvent::new(
        CombatEventId(3),
        CombatEventTriggerType::PlayerUnitDefeated,
        EventSequence::new("ally_down").then(SequenceEvent::FlashScreen(FlashParams {
            from: (0.0, 0.0),
            to: (1.0, 1.0),
            duration: Duration::from_millis(120),
            ease: Ease::OutQuad,
        })),
    );

    Some(
        Encounter::new(name, scene)
            .with_unit(rin)
            .with_unit(kai)
            .with_unit(shade)
            .with_unit(wisp)
            .with_event(opening)
            .with_event(first_fall)
            .with_event(flash_on_loss),
    )
}

/// Exploration intro that ends by launching the ambush.
pub fn intro() -> EventSequence {
    EventSequence::new("forest_intro")
        .then(SequenceEvent::screen_cover(FadeDirection::In))
        .then(SequenceEvent::dialogue("forest_arrival"))
        .then(SequenceEvent::wait(Duration::from_millis(100)))
        .then(SequenceEvent::combat(AMBUSH, "whispering_forest"))
        .then(SequenceEvent::dialogue("after_the_ambush"))
        .then(SequenceEvent::screen_cover(FadeDirection::Out))
}

/// Player input used by the demo: open the action menu, pick the second
/// action, back out once to show menu navigation, and default afterwards.
pub fn menu_script() -> Vec<MenuChoice> {
    vec![
        MenuChoice::Select(0),
        MenuChoice::Back,
        MenuChoice::Select(0),
        MenuChoice::Select(1),
        MenuChoice::Select(1),
        MenuChoice::Select(0),
    ]
}
