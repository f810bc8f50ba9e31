//! System actions that move the game between generations.

use tracing::info;

use crate::env::GameEnv;
use crate::state::{GamePhase, GameState, GameStatus, InitializationError, PlayerId, TurnState};

use super::{ActionError, ActionTransition, ensure_active};

/// Moves a lobby into generation 1 with the first seat to act.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartGameAction;

impl ActionTransition for StartGameAction {
    type Error = ActionError;
    type Result = ();

    fn actor(&self) -> Option<&PlayerId> {
        None
    }

    fn pre_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        if state.status != GameStatus::Lobby {
            return Err(InitializationError::AlreadyStarted.into());
        }
        if state.players.is_empty() {
            return Err(InitializationError::NoPlayers.into());
        }
        Ok(())
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        state.start(env.config())?;
        info!(
            target: "core::turn",
            game_id = %state.id,
            players = state.players.len(),
            "game started"
        );
        Ok(())
    }
}

/// Runs production and opens the next generation.
///
/// For every player: energy becomes heat, production is added (MC income is
/// MC production plus TR), the pass flag, generational counters and card
/// action uses are reset. The turn order rotated when the last player
/// passed, so the first seat now opens the new generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceGenerationAction;

impl ActionTransition for AdvanceGenerationAction {
    type Error = ActionError;
    type Result = ();

    fn actor(&self) -> Option<&PlayerId> {
        None
    }

    fn pre_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_active(state)?;
        if state.current_phase != GamePhase::ProductionAndCardDraw {
            return Err(ActionError::WrongPhase {
                expected: GamePhase::ProductionAndCardDraw,
                actual: state.current_phase,
            });
        }
        Ok(())
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        for player in state.players.values_mut() {
            player.resources.heat += player.resources.energy;
            player.resources.energy = 0;

            let income = player.production;
            player.resources.merge(&income);
            player.resources.credits += player.terraform_rating;

            player.reset_generation();
        }

        state.generation += 1;
        state.current_phase = GamePhase::Action;
        let allowance = state.fresh_allowance(env.config());
        state.current_turn = state
            .turn_order
            .first()
            .cloned()
            .map(|first| TurnState::new(first, allowance));

        info!(
            target: "core::turn",
            game_id = %state.id,
            generation = state.generation,
            first_player = ?state.current_player_id(),
            "generation advanced"
        );
        Ok(())
    }

    fn post_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        debug_assert!(
            state.players.values().all(|p| !p.passed),
            "no player may start a generation passed"
        );
        Ok(())
    }
}

/// Finishes the game. Reactive subscriptions are torn down on `GameEnded`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EndGameAction;

impl ActionTransition for EndGameAction {
    type Error = ActionError;
    type Result = ();

    fn actor(&self) -> Option<&PlayerId> {
        None
    }

    fn pre_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_active(state)
    }

    fn apply(&self, state: &mut GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        state.status = GameStatus::Finished;
        state.current_phase = GamePhase::Complete;
        state.current_turn = None;
        info!(
            target: "core::turn",
            game_id = %state.id,
            generation = state.generation,
            "game ended"
        );
        Ok(())
    }
}
