use crate::action::CombatAction;
use crate::config::GameConfig;
use crate::unit::{MenuMemory, Unit, UnitId};

use super::{TurnError, TurnOption, TurnResolution, TurnState};

/// Snapshot of the acting unit taken when its turn begins.
#[derive(Clone, Debug)]
struct ActiveTurn {
    unit: UnitId,
    options: Vec<TurnOption>,
    actions: Vec<CombatAction>,
    items: Vec<CombatAction>,
    memory: MenuMemory,
    cursor: usize,
    pending: Option<CombatAction>,
}

impl ActiveTurn {
    fn list(&self, state: TurnState) -> &[CombatAction] {
        match state {
            TurnState::AwaitingActionMenu => &self.actions,
            TurnState::AwaitingItemsMenu => &self.items,
            _ => &[],
        }
    }
}

/// Menu-driven action selection for one unit at a time.
///
/// The controller never touches the roster: it works on a snapshot of the
/// acting unit and hands back a [`TurnResolution`] carrying the chosen action
/// and the menu positions to remember for the unit's next turn.
#[derive(Clone, Debug)]
pub struct TurnController {
    allow_flee: bool,
    state: TurnState,
    turn: Option<ActiveTurn>,
}

impl TurnController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            allow_flee: config.allow_flee,
            state: TurnState::Idle,
            turn: None,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Unit currently taking its turn, if any.
    pub fn unit(&self) -> Option<UnitId> {
        self.turn.as_ref().map(|turn| turn.unit)
    }

    /// Turn menu entries offered to the current unit.
    pub fn options(&self) -> &[TurnOption] {
        self.turn.as_ref().map_or(&[], |turn| turn.options.as_slice())
    }

    /// Highlighted index of the current menu.
    pub fn cursor(&self) -> usize {
        self.turn.as_ref().map_or(0, |turn| turn.cursor)
    }

    pub fn pending_action(&self) -> Option<&CombatAction> {
        self.turn.as_ref().and_then(|turn| turn.pending.as_ref())
    }

    /// Labels for the menu currently awaiting input.
    pub fn menu_labels(&self) -> Vec<String> {
        let Some(turn) = &self.turn else {
            return Vec::new();
        };
        match self.state {
            TurnState::AwaitingTurnMenu => turn.options.iter().map(|o| o.to_string()).collect(),
            TurnState::AwaitingActionMenu | TurnState::AwaitingItemsMenu => turn
                .list(self.state)
                .iter()
                .map(|action| action.name.clone())
                .collect(),
            TurnState::AwaitingFleeResolution => vec!["confirm".to_string()],
            TurnState::Idle | TurnState::ActionResolved => Vec::new(),
        }
    }

    /// Starts a turn for `unit`, discarding any previous turn.
    ///
    /// The turn menu cursor resumes at the unit's remembered index; a
    /// remembered index outside the offered options resets to 0. A unit with
    /// no actions is offered a single pass.
    pub fn begin_turn(&mut self, unit: &Unit) -> TurnState {
        let mut options = vec![TurnOption::Act];
        if !unit.items.is_empty() {
            options.push(TurnOption::Items);
        }
        if self.allow_flee {
            options.push(TurnOption::Flee);
        }

        let mut memory = unit.menu_memory;
        memory.turn_menu = restore_index(memory.turn_menu, options.len());

        self.turn = Some(ActiveTurn {
            unit: unit.id,
            options,
            actions: if unit.actions.is_empty() {
                vec![CombatAction::pass()]
            } else {
                unit.actions.clone()
            },
            items: unit.items.clone(),
            memory,
            cursor: memory.turn_menu,
            pending: None,
        });
        self.state = TurnState::AwaitingTurnMenu;
        self.state
    }

    /// Picks the turn menu entry at `index`.
    ///
    /// An out-of-range index leaves the state unchanged.
    pub fn select_turn_option(&mut self, index: usize) -> Result<TurnState, TurnError> {
        let state = self.state;
        let turn = self.active_turn("select_turn_option", &[TurnState::AwaitingTurnMenu])?;
        let Some(&option) = turn.options.get(index) else {
            return Ok(state);
        };

        turn.memory.turn_menu = index;
        let next = match option {
            TurnOption::Act => {
                turn.cursor = restore_index(turn.memory.action_menu, turn.actions.len());
                TurnState::AwaitingActionMenu
            }
            TurnOption::Items => {
                turn.cursor = restore_index(turn.memory.items_menu, turn.items.len());
                TurnState::AwaitingItemsMenu
            }
            TurnOption::Flee => {
                turn.cursor = 0;
                TurnState::AwaitingFleeResolution
            }
        };
        self.state = next;
        Ok(next)
    }

    /// Picks a turn menu entry by kind; a kind not offered is a no-op.
    pub fn choose(&mut self, option: TurnOption) -> Result<TurnState, TurnError> {
        let index = self
            .options()
            .iter()
            .position(|&offered| offered == option)
            .unwrap_or(usize::MAX);
        self.select_turn_option(index)
    }

    /// Records `action` as pending and resolves the turn.
    pub fn select_action(&mut self, action: CombatAction) -> Result<TurnState, TurnError> {
        let turn = self.active_turn(
            "select_action",
            &[TurnState::AwaitingActionMenu, TurnState::AwaitingItemsMenu],
        )?;
        turn.pending = Some(action);
        self.state = TurnState::ActionResolved;
        Ok(self.state)
    }

    /// Picks the entry at `index` of the action or items menu.
    ///
    /// An out-of-range index leaves the state unchanged.
    pub fn select_action_index(&mut self, index: usize) -> Result<TurnState, TurnError> {
        let state = self.state;
        let turn = self.active_turn(
            "select_action_index",
            &[TurnState::AwaitingActionMenu, TurnState::AwaitingItemsMenu],
        )?;
        let Some(action) = turn.list(state).get(index).cloned() else {
            return Ok(state);
        };

        if state == TurnState::AwaitingItemsMenu {
            turn.memory.items_menu = index;
        } else {
            turn.memory.action_menu = index;
        }
        turn.cursor = index;
        self.select_action(action)
    }

    /// Confirms a flee attempt.
    pub fn confirm_flee(&mut self) -> Result<TurnState, TurnError> {
        let turn = self.active_turn("confirm_flee", &[TurnState::AwaitingFleeResolution])?;
        turn.pending = Some(CombatAction::flee());
        self.state = TurnState::ActionResolved;
        Ok(self.state)
    }

    /// Routes a menu index to whichever menu is awaiting input.
    pub fn select(&mut self, index: usize) -> Result<TurnState, TurnError> {
        match self.state {
            TurnState::AwaitingTurnMenu => self.select_turn_option(index),
            TurnState::AwaitingActionMenu | TurnState::AwaitingItemsMenu => {
                self.select_action_index(index)
            }
            TurnState::AwaitingFleeResolution if index == 0 => self.confirm_flee(),
            TurnState::AwaitingFleeResolution => Ok(self.state),
            TurnState::Idle => Err(TurnError::NoActiveUnit),
            TurnState::ActionResolved => Err(TurnError::InvalidState {
                operation: "select",
                state: self.state,
            }),
        }
    }

    /// Goes back one menu level.
    ///
    /// Returning from a sub-menu restores the turn menu cursor. At the turn
    /// menu there is nothing to go back to and the state is unchanged.
    pub fn return_to_previous_menu(&mut self) -> Result<TurnState, TurnError> {
        let turn = self.active_turn(
            "return_to_previous_menu",
            &[
                TurnState::AwaitingTurnMenu,
                TurnState::AwaitingActionMenu,
                TurnState::AwaitingItemsMenu,
                TurnState::AwaitingFleeResolution,
            ],
        )?;
        turn.memory.turn_menu = restore_index(turn.memory.turn_menu, turn.options.len());
        turn.cursor = turn.memory.turn_menu;
        self.state = TurnState::AwaitingTurnMenu;
        Ok(self.state)
    }

    /// Takes the resolved action out and discards the turn.
    pub fn take_resolution(&mut self) -> Result<TurnResolution, TurnError> {
        if self.turn.is_none() {
            return Err(TurnError::NoActiveUnit);
        }
        if self.state != TurnState::ActionResolved {
            return Err(TurnError::NotResolved(self.state));
        }
        let turn = self.turn.take().ok_or(TurnError::NoActiveUnit)?;
        self.state = TurnState::Idle;
        let action = turn.pending.ok_or(TurnError::NotResolved(TurnState::ActionResolved))?;
        Ok(TurnResolution {
            unit: turn.unit,
            action,
            menu_memory: turn.memory,
        })
    }

    /// Drops the current turn without resolving it.
    pub fn abandon(&mut self) {
        self.turn = None;
        self.state = TurnState::Idle;
    }

    fn active_turn(
        &mut self,
        operation: &'static str,
        allowed: &[TurnState],
    ) -> Result<&mut ActiveTurn, TurnError> {
        let state = self.state;
        let turn = self.turn.as_mut().ok_or(TurnError::NoActiveUnit)?;
        if !allowed.contains(&state) {
            return Err(TurnError::InvalidState { operation, state });
        }
        Ok(turn)
    }
}

fn restore_index(stored: usize, count: usize) -> usize {
    if stored < count { stored } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionTarget;
    use crate::unit::{Side, UnitStats};

    fn unit() -> Unit {
        Unit::new(UnitId(1), "Rin", "Psychic", Side::Player, UnitStats::new(30, 5))
            .with_action(CombatAction::attack("Strike", ActionTarget::AllOpponents, 5))
            .with_action(CombatAction::attack("Mind Spike", ActionTarget::AllOpponents, 8))
    }

    fn controller() -> TurnController {
        TurnController::new(&GameConfig::default())
    }

    #[test]
    fn begin_turn_resets_out_of_range_memory() {
        let unit = unit().with_menu_memory(MenuMemory {
            turn_menu: 5,
            ..MenuMemory::default()
        });
        let mut controller = controller();

        assert_eq!(controller.begin_turn(&unit), TurnState::AwaitingTurnMenu);
        assert_eq!(controller.options(), &[TurnOption::Act, TurnOption::Flee]);
        assert_eq!(controller.cursor(), 0);
    }

    #[test]
    fn begin_turn_restores_valid_memory() {
        let unit = unit().with_menu_memory(MenuMemory {
            turn_menu: 1,
            ..MenuMemory::default()
        });
        let mut controller = controller();
        controller.begin_turn(&unit);
        assert_eq!(controller.cursor(), 1);
    }

    #[test]
    fn selection_without_turn_is_invalid() {
        let mut controller = controller();
        assert_eq!(controller.select_turn_option(0), Err(TurnError::NoActiveUnit));
        assert_eq!(
            controller.select_action(CombatAction::pass()),
            Err(TurnError::NoActiveUnit)
        );
        assert_eq!(controller.take_resolution(), Err(TurnError::NoActiveUnit));
    }

    #[test]
    fn out_of_range_turn_option_is_noop() {
        let mut controller = controller();
        controller.begin_turn(&unit());
        assert_eq!(controller.select_turn_option(7), Ok(TurnState::AwaitingTurnMenu));
    }

    #[test]
    fn act_then_action_resolves_and_remembers_indices() {
        let mut controller = controller();
        controller.begin_turn(&unit());

        assert_eq!(controller.select_turn_option(0), Ok(TurnState::AwaitingActionMenu));
        assert_eq!(controller.menu_labels(), vec!["Strike", "Mind Spike"]);
        assert_eq!(controller.select_action_index(1), Ok(TurnState::ActionResolved));

        let resolution = controller.take_resolution().unwrap();
        assert_eq!(resolution.unit, UnitId(1));
        assert_eq!(resolution.action.name, "Mind Spike");
        assert_eq!(resolution.menu_memory.turn_menu, 0);
        assert_eq!(resolution.menu_memory.action_menu, 1);
        assert_eq!(controller.state(), TurnState::Idle);
    }

    #[test]
    fn return_to_previous_menu_restores_turn_cursor() {
        let unit = unit().with_item(CombatAction::item("Tonic", 10));
        let mut controller = controller();
        controller.begin_turn(&unit);

        assert_eq!(controller.select_turn_option(1), Ok(TurnState::AwaitingItemsMenu));
        assert_eq!(
            controller.return_to_previous_menu(),
            Ok(TurnState::AwaitingTurnMenu)
        );
        assert_eq!(controller.cursor(), 1);
    }

    #[test]
    fn flee_branch_resolves_with_flee_action() {
        let mut controller = controller();
        controller.begin_turn(&unit());

        assert_eq!(controller.choose(TurnOption::Flee), Ok(TurnState::AwaitingFleeResolution));
        assert_eq!(controller.select(0), Ok(TurnState::ActionResolved));
        let resolution = controller.take_resolution().unwrap();
        assert_eq!(resolution.action, CombatAction::flee());
    }

    #[test]
    fn flee_not_offered_when_disabled() {
        let mut controller = TurnController::new(&GameConfig::default().with_allow_flee(false));
        controller.begin_turn(&unit());
        assert_eq!(controller.options(), &[TurnOption::Act]);
        assert_eq!(controller.choose(TurnOption::Flee), Ok(TurnState::AwaitingTurnMenu));
    }

    #[test]
    fn action_selection_from_turn_menu_is_rejected() {
        let mut controller = controller();
        controller.begin_turn(&unit());
        assert_eq!(
            controller.select_action(CombatAction::pass()),
            Err(TurnError::InvalidState {
                operation: "select_action",
                state: TurnState::AwaitingTurnMenu,
            })
        );
    }

    #[test]
    fn resolution_requires_resolved_state() {
        let mut controller = controller();
        controller.begin_turn(&unit());
        assert_eq!(
            controller.take_resolution(),
            Err(TurnError::NotResolved(TurnState::AwaitingTurnMenu))
        );
    }

    #[test]
    fn unit_without_actions_can_only_pass() {
        let idle = Unit::new(UnitId(3), "Husk", "Shell", Side::Player, UnitStats::new(5, 1));
        let mut controller = controller();
        controller.begin_turn(&idle);
        controller.choose(TurnOption::Act).unwrap();

        assert_eq!(controller.menu_labels(), vec!["Pass".to_string()]);
        controller.select(0).unwrap();
        let resolution = controller.take_resolution().unwrap();
        assert_eq!(resolution.action, CombatAction::pass());
    }
}
