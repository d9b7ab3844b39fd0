use std::sync::Arc;

use game_core::{
    ActionOutcome, ActionTarget, CombatAction, CombatEventTriggerType, GameMode, Roster, Side,
    TurnController, TurnError, TurnOption, TurnResolution, TurnState, Unit, UnitId,
};
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::api::{
    ActionProvider, ActionResolver, DefaultActionResolver, MenuChoice, MenuProvider, MenuRequest,
    ProviderKind, Result, RuntimeError,
};
use crate::combat::{CombatEvent, CombatEventHandler, CombatEventId};
use crate::context::{CombatSlot, GameContext};
use crate::repository::{load_object, save_object};
use crate::sequence::{CancelToken, SequenceOutcome};

use super::{CombatNotification, CombatResult, Encounter};

/// One combat, from [`start`](Self::start) to [`end`](Self::end).
///
/// Only one session can be playing per [`GameContext`]. Ending restores the
/// mode captured at start, and happens at most once: when `run` finishes,
/// when `end` is called, or when the session is dropped.
pub struct CombatSession {
    ctx: GameContext,
    encounter: String,
    scene: String,
    previous_mode: GameMode,
    roster: Roster,
    turns: TurnController,
    handler: Option<CombatEventHandler>,
    menu_provider: Option<Box<dyn MenuProvider>>,
    enemy_provider: Option<Box<dyn ActionProvider>>,
    resolver: Box<dyn ActionResolver>,
    notifications: broadcast::Sender<CombatNotification>,
    round: u32,
    result: Option<CombatResult>,
    slot: Option<CombatSlot>,
}

impl CombatSession {
    /// Claims the combat slot, switches to combat mode and subscribes the
    /// encounter's events to a fresh handler.
    ///
    /// `previous_mode` is restored when the session ends.
    pub fn start(ctx: &GameContext, encounter: Encounter, previous_mode: GameMode) -> Result<Self> {
        if encounter.units.is_empty() {
            return Err(RuntimeError::NoUnits);
        }
        let slot = ctx
            .acquire_combat_slot()
            .ok_or(RuntimeError::SessionAlreadyActive)?;
        let config = ctx.config();

        let mut handler = CombatEventHandler::new(config.game_config.priority_order);
        for event in encounter.events {
            handler.subscribe_event(Arc::new(event));
        }

        let mut roster = Roster::new(encounter.units);
        if config.persist_menu_memory {
            restore_menu_memory(ctx, &mut roster);
        }

        let (notifications, _) = broadcast::channel(config.event_buffer_size.max(1));
        ctx.modes().set_mode(GameMode::Combat);

        info!(
            target: "runtime::session",
            encounter = %encounter.name,
            scene = %encounter.scene,
            units = roster.len(),
            events = handler.len(),
            ?previous_mode,
            "Combat started"
        );

        Ok(Self {
            ctx: ctx.clone(),
            encounter: encounter.name,
            scene: encounter.scene,
            previous_mode,
            roster,
            turns: TurnController::new(&config.game_config),
            handler: Some(handler),
            menu_provider: None,
            enemy_provider: None,
            resolver: Box::new(DefaultActionResolver),
            notifications,
            round: 0,
            result: None,
            slot: Some(slot),
        })
    }

    pub fn with_menu_provider(mut self, provider: impl MenuProvider + 'static) -> Self {
        self.set_menu_provider(provider);
        self
    }

    pub fn with_enemy_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.set_enemy_provider(provider);
        self
    }

    pub fn with_resolver(mut self, resolver: impl ActionResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Set the provider answering player menus
    pub fn set_menu_provider(&mut self, provider: impl MenuProvider + 'static) {
        self.menu_provider = Some(Box::new(provider));
    }

    /// Set the provider choosing enemy actions
    pub fn set_enemy_provider(&mut self, provider: impl ActionProvider + 'static) {
        self.enemy_provider = Some(Box::new(provider));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CombatNotification> {
        self.notifications.subscribe()
    }

    /// Adds an event to the running session's handler.
    pub fn add_event(&mut self, event: CombatEvent) -> Result<bool> {
        let handler = self.handler.as_mut().ok_or(RuntimeError::SessionNotActive)?;
        Ok(handler.subscribe_event(Arc::new(event)))
    }

    pub fn remove_event(
        &mut self,
        id: CombatEventId,
        trigger: CombatEventTriggerType,
    ) -> Result<bool> {
        let handler = self.handler.as_mut().ok_or(RuntimeError::SessionNotActive)?;
        Ok(handler.unsubscribe(id, trigger))
    }

    pub fn encounter(&self) -> &str {
        &self.encounter
    }

    pub fn scene(&self) -> &str {
        &self.scene
    }

    pub fn previous_mode(&self) -> GameMode {
        self.previous_mode
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Current round, starting at 1 once the first round begins.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn turn_state(&self) -> TurnState {
        self.turns.state()
    }

    /// The per-session handler; `None` once the session has ended.
    pub fn handler(&self) -> Option<&CombatEventHandler> {
        self.handler.as_ref()
    }

    pub fn result(&self) -> Option<CombatResult> {
        self.result
    }

    pub fn is_playing(&self) -> bool {
        self.slot.is_some()
    }

    /// Plays the combat to its end and ends the session.
    ///
    /// Cancellation is honoured at every suspension point and yields
    /// [`CombatResult::Aborted`]. Errors from providers or the turn machine
    /// also end the session as aborted before being returned.
    pub async fn run(&mut self, cancel: &CancelToken) -> Result<CombatResult> {
        if !self.is_playing() {
            return Err(RuntimeError::SessionNotActive);
        }
        self.check_providers()?;

        self.notify(CombatNotification::Started {
            encounter: self.encounter.clone(),
        });

        let result = match self.drive(cancel).await {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    target: "runtime::session",
                    encounter = %self.encounter,
                    %error,
                    "Combat aborted by error"
                );
                self.end_with(CombatResult::Aborted);
                return Err(error);
            }
        };

        if result != CombatResult::Aborted {
            self.fire(CombatEventTriggerType::CombatEnd, cancel).await;
        }
        self.end_with(result);
        Ok(result)
    }

    /// Ends the session, restoring the previous mode.
    ///
    /// Returns false if the session had already ended.
    pub fn end(&mut self) -> bool {
        let result = self.result.unwrap_or(CombatResult::Aborted);
        self.end_with(result)
    }

    fn end_with(&mut self, result: CombatResult) -> bool {
        let Some(slot) = self.slot.take() else {
            return false;
        };

        self.result = Some(result);
        self.turns.abandon();
        self.handler = None;
        self.ctx.modes().set_mode(self.previous_mode);

        info!(
            target: "runtime::session",
            encounter = %self.encounter,
            %result,
            rounds = self.round,
            restored_mode = ?self.previous_mode,
            "Combat ended"
        );
        self.notify(CombatNotification::Ended { result });
        drop(slot);
        true
    }

    fn check_providers(&self) -> Result<()> {
        let has = |side: Side| self.roster.iter().any(|unit| unit.side == side);
        if has(Side::Player) && self.menu_provider.is_none() {
            return Err(RuntimeError::ProviderNotSet {
                kind: ProviderKind::Menu,
            });
        }
        if has(Side::Enemy) && self.enemy_provider.is_none() {
            return Err(RuntimeError::ProviderNotSet {
                kind: ProviderKind::Enemy,
            });
        }
        Ok(())
    }

    async fn drive(&mut self, cancel: &CancelToken) -> Result<CombatResult> {
        if !self.fire(CombatEventTriggerType::CombatStart, cancel).await {
            return Ok(CombatResult::Aborted);
        }

        let max_rounds = self.ctx.config().game_config.max_rounds;
        loop {
            if let Some(result) = self.decided_result() {
                return Ok(result);
            }
            if self.round >= max_rounds {
                return Ok(CombatResult::Stalemate);
            }
            self.round += 1;
            debug!(target: "runtime::session", round = self.round, "Round started");

            for unit in self.roster.turn_order() {
                if cancel.is_cancelled() {
                    return Ok(CombatResult::Aborted);
                }
                if self.roster.get(unit).is_none_or(Unit::is_defeated) {
                    continue;
                }

                self.notify(CombatNotification::TurnStarted {
                    unit,
                    round: self.round,
                });
                if !self.fire(CombatEventTriggerType::TurnStart, cancel).await {
                    return Ok(CombatResult::Aborted);
                }

                self.tick_effects(unit);
                let Some(action) = cancel.run_until_cancelled(self.choose_action(unit)).await
                else {
                    return Ok(CombatResult::Aborted);
                };
                let outcome = self.resolve(unit, action?);
                if outcome.fled {
                    return Ok(CombatResult::Fled);
                }

                for trigger in outcome.triggers(&self.roster) {
                    if !self.fire(trigger, cancel).await {
                        return Ok(CombatResult::Aborted);
                    }
                }
                if let Some(result) = self.decided_result() {
                    return Ok(result);
                }
            }

            if !self.fire(CombatEventTriggerType::RoundEnd, cancel).await {
                return Ok(CombatResult::Aborted);
            }
        }
    }

    /// Result implied by the roster alone. A wiped player side loses even if
    /// the enemy side fell in the same action.
    fn decided_result(&self) -> Option<CombatResult> {
        if self.roster.is_side_defeated(Side::Player) {
            Some(CombatResult::Defeat)
        } else if self.roster.is_side_defeated(Side::Enemy) {
            Some(CombatResult::Victory)
        } else {
            None
        }
    }

    async fn choose_action(&mut self, unit: UnitId) -> Result<CombatAction> {
        let actor = self
            .roster
            .get(unit)
            .cloned()
            .ok_or(TurnError::NoActiveUnit)?;
        self.turns.begin_turn(&actor);

        match actor.side {
            Side::Player => {
                let provider = self
                    .menu_provider
                    .as_deref()
                    .ok_or(RuntimeError::ProviderNotSet {
                        kind: ProviderKind::Menu,
                    })?;
                while self.turns.state().awaits_input() {
                    let request = MenuRequest {
                        unit,
                        unit_name: actor.name.clone(),
                        state: self.turns.state(),
                        labels: self.turns.menu_labels(),
                        cursor: self.turns.cursor(),
                    };
                    match provider.choose(request).await? {
                        MenuChoice::Select(index) => self.turns.select(index)?,
                        MenuChoice::Back => self.turns.return_to_previous_menu()?,
                    };
                }
            }
            Side::Enemy => {
                let provider = self
                    .enemy_provider
                    .as_deref()
                    .ok_or(RuntimeError::ProviderNotSet {
                        kind: ProviderKind::Enemy,
                    })?;
                let action = provider.provide_action(&actor, &self.roster).await?;
                self.turns.choose(TurnOption::Act)?;
                self.turns.select_action(action)?;
            }
        }

        let resolution = self.turns.take_resolution()?;
        self.remember_menu(&resolution);
        Ok(resolution.action)
    }

    fn remember_menu(&mut self, resolution: &TurnResolution) {
        let Some(unit) = self.roster.get_mut(resolution.unit) else {
            return;
        };
        unit.menu_memory = resolution.menu_memory;
        if unit.is_player() && self.ctx.config().persist_menu_memory {
            save_object(
                self.ctx.store(),
                &menu_key(&unit.name),
                &resolution.menu_memory.turn_menu,
            );
        }
    }

    fn tick_effects(&mut self, unit: UnitId) {
        let Some(unit) = self.roster.get_mut(unit) else {
            return;
        };
        let expired = unit.mentality.tick();
        if !expired.is_empty() {
            debug!(
                target: "runtime::session",
                unit = %unit.id,
                ?expired,
                "Mentality effects expired"
            );
        }
    }

    fn resolve(&mut self, unit: UnitId, action: CombatAction) -> ActionOutcome {
        let Some(actor) = self.roster.get(unit) else {
            return ActionOutcome::none(unit);
        };
        let action = retarget(action, actor, &self.roster);
        let mut outcome = self.resolver.resolve(&action, actor, &self.roster);
        let defeated = self.roster.apply(&mut outcome);

        debug!(
            target: "runtime::session",
            %unit,
            action = %action.name,
            ?defeated,
            fled = outcome.fled,
            "Action resolved"
        );
        self.notify(CombatNotification::ActionResolved {
            unit,
            action,
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Runs every event subscribed to `trigger`, one after the other.
    ///
    /// Returns false if the run was cancelled.
    async fn fire(&mut self, trigger: CombatEventTriggerType, cancel: &CancelToken) -> bool {
        let Some(handler) = self.handler.as_mut() else {
            return !cancel.is_cancelled();
        };
        let events = handler.dispatch(trigger);
        if !events.is_empty() {
            debug!(
                target: "runtime::combat",
                %trigger,
                events = events.len(),
                "Dispatching combat events"
            );
        }

        for event in events {
            self.notify(CombatNotification::EventFired {
                event: event.id,
                trigger,
            });
            match event.sequence.invoke(&self.ctx, true, cancel).await {
                Ok(SequenceOutcome::Completed { .. }) => {}
                Ok(SequenceOutcome::Cancelled { .. }) => return false,
                Err(error) => {
                    warn!(
                        target: "runtime::combat",
                        event = %event.id,
                        %error,
                        "Combat event skipped"
                    );
                }
            }
        }
        !cancel.is_cancelled()
    }

    fn notify(&self, notification: CombatNotification) {
        if self.notifications.send(notification).is_err() {
            trace!(target: "runtime::session", "No combat notification subscribers");
        }
    }
}

impl Drop for CombatSession {
    fn drop(&mut self) {
        self.end();
    }
}

impl std::fmt::Debug for CombatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatSession")
            .field("encounter", &self.encounter)
            .field("scene", &self.scene)
            .field("previous_mode", &self.previous_mode)
            .field("round", &self.round)
            .field("result", &self.result)
            .field("is_playing", &self.is_playing())
            .finish_non_exhaustive()
    }
}

/// Store key holding a unit's remembered turn-menu index.
fn menu_key(unit_name: &str) -> String {
    format!("menu/{unit_name}/turn")
}

fn restore_menu_memory(ctx: &GameContext, roster: &mut Roster) {
    for unit in roster.iter_mut().filter(|unit| unit.is_player()) {
        let stored: Option<usize> = load_object(ctx.store(), &menu_key(&unit.name));
        if let Some(index) = stored {
            unit.menu_memory.turn_menu = index;
        }
    }
}

/// Re-aims a single-target action whose target is gone at a living unit on
/// the side it was meant for.
fn retarget(action: CombatAction, actor: &Unit, roster: &Roster) -> CombatAction {
    let ActionTarget::Unit(target) = action.target else {
        return action;
    };
    if roster.get(target).is_some_and(|unit| !unit.is_defeated()) {
        return action;
    }
    match roster.fallback_target(actor.id, &action) {
        Some(replacement) => action.aimed_at(ActionTarget::Unit(replacement)),
        None => action,
    }
}
