//! Turn scheduling and action execution pipeline.
//!
//! The [`GameEngine`] is the authoritative reducer for [`GameState`]. Every
//! [`Action`] runs through `pre_validate → apply → post_validate`; a failure
//! at any stage restores the state the action started from, so an action
//! either applies completely or not at all.
//!
//! A committed action bumps [`GameState::revision`] and yields the
//! [`DomainEvent`]s derived from the before/after states. Delivering those to
//! subscribers is the caller's job (see [`crate::session::GameSession`]).

mod errors;
mod transition;
mod turns;

pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};
pub use turns::{
    SkipOutcome, TurnError, auto_advance_turn_if_needed, consume_action, ensure_can_act,
    ensure_can_skip, skip_action,
};

use crate::action::{Action, ActionResult, SkipAction};
use crate::env::GameEnv;
use crate::events::{DomainEvent, extract_events};
use crate::state::{ActionAllowance, GameState, PlayerId};

/// Complete outcome of action execution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ExecutionOutcome {
    /// Events derived from the state change, in publication order.
    pub events: Vec<DomainEvent>,

    /// Action-specific execution result.
    pub action_result: ActionResult,
}

/// Game engine that manages action execution and turn scheduling.
pub struct GameEngine<'a> {
    state: &'a mut GameState,
}

impl<'a> GameEngine<'a> {
    /// Creates a new game engine with the given state.
    pub fn new(state: &'a mut GameState) -> Self {
        Self { state }
    }

    /// Executes an action by routing it through the appropriate transition pipeline.
    ///
    /// On error the state is left exactly as it was before the call.
    pub fn execute(
        &mut self,
        env: GameEnv<'_>,
        action: &Action,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let before = self.state.clone();

        let action_result = match transition::execute_transition(action, self.state, &env) {
            Ok(result) => result,
            Err(err) => {
                *self.state = before;
                return Err(err);
            }
        };

        self.state.revision += 1;
        let events = extract_events(&before, self.state);

        Ok(ExecutionOutcome {
            events,
            action_result,
        })
    }

    /// Spends one action of the current turn outside the action pipeline.
    pub fn consume_action(&mut self) -> Result<ActionAllowance, TurnError> {
        consume_action(self.state)
    }

    /// Hands the turn on if the current player is out of actions or passed.
    pub fn auto_advance_turn_if_needed(&mut self, env: GameEnv<'_>) -> bool {
        auto_advance_turn_if_needed(self.state, env.config())
    }

    /// Skips (or passes) for `player_id`.
    pub fn skip_action(
        &mut self,
        env: GameEnv<'_>,
        player_id: &PlayerId,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        self.execute(env, &Action::Skip(SkipAction::new(player_id.clone())))
    }

    /// Runs production and opens the next generation.
    pub fn advance_generation(&mut self, env: GameEnv<'_>) -> Result<ExecutionOutcome, ExecuteError> {
        self.execute(env, &Action::AdvanceGeneration)
    }
}
