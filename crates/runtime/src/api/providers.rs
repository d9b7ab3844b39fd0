//! Abstractions for sourcing player input, enemy intent, and action results.
//!
//! Sessions plug in [`MenuProvider`] and [`ActionProvider`] implementations so
//! combat can run with human input, scripted fixtures, or AI policies, and an
//! [`ActionResolver`] to turn a chosen action into stat changes.
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use game_core::{
    ActionKind, ActionOutcome, ActionTarget, CombatAction, Roster, TurnState, Unit, UnitId,
};
use tokio::sync::mpsc;
use tracing::debug;

use super::errors::{Result, RuntimeError};

/// A menu waiting for the player's choice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuRequest {
    pub unit: UnitId,
    pub unit_name: String,
    pub state: TurnState,
    pub labels: Vec<String>,
    /// Index the menu should highlight initially.
    pub cursor: usize,
}

/// The player's answer to a [`MenuRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Select(usize),
    Back,
}

/// Trait for presenting menus and reporting the selected index.
#[async_trait]
pub trait MenuProvider: Send + Sync {
    /// Suspends until the player picks an entry or backs out.
    async fn choose(&self, request: MenuRequest) -> Result<MenuChoice>;
}

/// Trait for choosing actions for units without a menu (enemies).
#[async_trait]
pub trait ActionProvider: Send + Sync {
    async fn provide_action(&self, unit: &Unit, roster: &Roster) -> Result<CombatAction>;
}

/// Trait for resolving a chosen action into its outcome.
pub trait ActionResolver: Send + Sync {
    fn resolve(&self, action: &CombatAction, actor: &Unit, roster: &Roster) -> ActionOutcome;
}

/// Menu provider replaying a fixed list of choices.
///
/// Once the script runs out it keeps answering `Select(0)`.
#[derive(Debug, Default)]
pub struct ScriptedMenuProvider {
    choices: Mutex<VecDeque<MenuChoice>>,
}

impl ScriptedMenuProvider {
    pub fn new(choices: impl IntoIterator<Item = MenuChoice>) -> Self {
        Self {
            choices: Mutex::new(choices.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.choices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl MenuProvider for ScriptedMenuProvider {
    async fn choose(&self, request: MenuRequest) -> Result<MenuChoice> {
        let next = self
            .choices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        Ok(next.unwrap_or_else(|| {
            debug!(
                target: "runtime::session",
                unit = %request.unit,
                state = %request.state,
                "Menu script exhausted, selecting first entry"
            );
            MenuChoice::Select(0)
        }))
    }
}

/// Menu provider fed by a UI task through a channel.
pub struct ChannelMenuProvider {
    rx_choice: tokio::sync::Mutex<mpsc::Receiver<MenuChoice>>,
}

impl ChannelMenuProvider {
    pub fn new(rx_choice: mpsc::Receiver<MenuChoice>) -> Self {
        Self {
            rx_choice: tokio::sync::Mutex::new(rx_choice),
        }
    }

    /// Creates a provider together with the sender the UI writes to.
    pub fn channel(buffer: usize) -> (mpsc::Sender<MenuChoice>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl MenuProvider for ChannelMenuProvider {
    async fn choose(&self, _request: MenuRequest) -> Result<MenuChoice> {
        let mut rx = self.rx_choice.lock().await;
        rx.recv().await.ok_or(RuntimeError::MenuInputClosed)
    }
}

/// Picks the unit's first action.
///
/// A single-target action is aimed at the first living unit on the side it
/// is meant for: allies for items, opponents otherwise. Units without
/// actions, or without anyone left to target, pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstActionProvider;

#[async_trait]
impl ActionProvider for FirstActionProvider {
    async fn provide_action(&self, unit: &Unit, roster: &Roster) -> Result<CombatAction> {
        let Some(action) = unit.actions.first() else {
            return Ok(CombatAction::pass());
        };
        let action = match action.target {
            ActionTarget::Unit(_) => match roster.fallback_target(unit.id, action) {
                Some(target) => action.aimed_at(ActionTarget::Unit(target)),
                None => CombatAction::pass(),
            },
            _ => action.clone(),
        };
        Ok(action)
    }
}

/// Straightforward damage/heal resolution.
///
/// Attacks and skills deal `power` damage to each target, items restore
/// `power` health, fleeing marks the outcome as fled, and any attached
/// mentality effect lands on every target.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultActionResolver;

impl ActionResolver for DefaultActionResolver {
    fn resolve(&self, action: &CombatAction, actor: &Unit, roster: &Roster) -> ActionOutcome {
        let mut outcome = ActionOutcome::none(actor.id);
        let targets = roster.resolve_target(actor.id, action.target);

        let hp = match action.kind {
            ActionKind::Attack | ActionKind::Skill => Some(-action.power.max(0)),
            ActionKind::Item => Some(action.power.max(0)),
            ActionKind::Flee => {
                outcome = outcome.fled();
                None
            }
            ActionKind::Pass => None,
        };

        for target in targets {
            if let Some(hp) = hp {
                outcome = outcome.with_delta(target, hp);
            }
            if let Some(effect) = action.effect {
                outcome = outcome.with_effect(target, effect);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{MentalityEffect, MentalityEffectKind, Side, UnitStats};

    fn roster() -> Roster {
        Roster::new(vec![
            Unit::new(UnitId(1), "Rin", "Psychic", Side::Player, UnitStats::new(30, 5))
                .with_action(CombatAction::attack("Strike", ActionTarget::Unit(UnitId(0)), 4)),
            Unit::new(UnitId(2), "Shade", "Spirit", Side::Enemy, UnitStats::new(10, 3))
                .with_action(CombatAction::attack("Claw", ActionTarget::Unit(UnitId(0)), 6)),
        ])
    }

    #[tokio::test]
    async fn scripted_provider_replays_then_defaults() {
        let provider = ScriptedMenuProvider::new([MenuChoice::Select(2), MenuChoice::Back]);
        let request = MenuRequest {
            unit: UnitId(1),
            unit_name: "Rin".into(),
            state: TurnState::AwaitingTurnMenu,
            labels: vec![],
            cursor: 0,
        };

        assert_eq!(provider.choose(request.clone()).await.unwrap(), MenuChoice::Select(2));
        assert_eq!(provider.choose(request.clone()).await.unwrap(), MenuChoice::Back);
        assert_eq!(provider.choose(request).await.unwrap(), MenuChoice::Select(0));
        assert_eq!(provider.remaining(), 0);
    }

    #[tokio::test]
    async fn channel_provider_reports_closed_input() {
        let (tx, provider) = ChannelMenuProvider::channel(4);
        tx.send(MenuChoice::Select(1)).await.unwrap();
        drop(tx);
        let request = MenuRequest {
            unit: UnitId(1),
            unit_name: "Rin".into(),
            state: TurnState::AwaitingActionMenu,
            labels: vec![],
            cursor: 0,
        };

        assert_eq!(provider.choose(request.clone()).await.unwrap(), MenuChoice::Select(1));
        assert!(matches!(
            provider.choose(request).await,
            Err(RuntimeError::MenuInputClosed)
        ));
    }

    #[tokio::test]
    async fn first_action_provider_targets_first_living_opponent() {
        let roster = roster();
        let enemy = roster.get(UnitId(2)).unwrap();
        let action = FirstActionProvider.provide_action(enemy, &roster).await.unwrap();
        assert_eq!(action.target, ActionTarget::Unit(UnitId(1)));
        assert_eq!(action.name, "Claw");
    }

    #[tokio::test]
    async fn first_action_provider_aims_items_at_allies() {
        let medic = Unit::new(UnitId(3), "Wisp", "Spirit", Side::Enemy, UnitStats::new(8, 2))
            .with_action(CombatAction::item("Soothe", 4).aimed_at(ActionTarget::Unit(UnitId(0))));
        let roster = Roster::new(roster().iter().cloned().chain([medic]).collect());
        let medic = roster.get(UnitId(3)).unwrap();

        let action = FirstActionProvider.provide_action(medic, &roster).await.unwrap();

        assert_eq!(action.target, ActionTarget::Unit(UnitId(2)));
    }

    #[test]
    fn default_resolver_damages_and_applies_effects() {
        let roster = roster();
        let actor = roster.get(UnitId(1)).unwrap();
        let effect = MentalityEffect::new(MentalityEffectKind::Shaken, -10, 2);
        let action = CombatAction::attack("Mind Spike", ActionTarget::AllOpponents, 7)
            .with_effect(effect);

        let outcome = DefaultActionResolver.resolve(&action, actor, &roster);

        assert_eq!(outcome.deltas.len(), 1);
        assert_eq!(outcome.deltas[0].unit, UnitId(2));
        assert_eq!(outcome.deltas[0].hp, -7);
        assert_eq!(outcome.effects, vec![(UnitId(2), effect)]);
        assert!(!outcome.fled);
    }

    #[test]
    fn default_resolver_marks_flee() {
        let roster = roster();
        let actor = roster.get(UnitId(1)).unwrap();
        let outcome = DefaultActionResolver.resolve(&CombatAction::flee(), actor, &roster);
        assert!(outcome.fled);
        assert!(outcome.deltas.is_empty());
    }
}
