//! Action transition dispatch and execution logic.

use crate::action::{
    Action, ActionResult, ActionTransition, AdvanceGenerationAction, EndGameAction,
    StartGameAction,
};
use crate::env::GameEnv;
use crate::state::GameState;

use super::errors::{ExecuteError, TransitionPhase, TransitionPhaseError};

/// Executes a transition through the three-phase pipeline and returns the result.
///
/// Phases:
/// 1. `pre_validate` - Check preconditions before mutation
/// 2. `apply` - Mutate the game state and return result
/// 3. `post_validate` - Verify postconditions after mutation
#[inline]
fn drive_transition<T>(
    transition: &T,
    state: &mut GameState,
    env: &GameEnv<'_>,
) -> Result<T::Result, TransitionPhaseError<T::Error>>
where
    T: ActionTransition,
{
    transition
        .pre_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

    let result = transition
        .apply(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(result)
}

/// Routes each action to its transition and wraps the result in [`ActionResult`].
///
/// Leaves partial mutations in place on failure; [`super::GameEngine`]
/// restores the pre-action state.
pub(super) fn execute_transition(
    action: &Action,
    state: &mut GameState,
    env: &GameEnv<'_>,
) -> Result<ActionResult, ExecuteError> {
    match action {
        Action::PlayCard(transition) => {
            let resolution =
                drive_transition(transition, state, env).map_err(ExecuteError::PlayCard)?;
            Ok(ActionResult::Resolved(resolution))
        }
        Action::UseCardAction(transition) => {
            let resolution =
                drive_transition(transition, state, env).map_err(ExecuteError::UseCardAction)?;
            Ok(ActionResult::Resolved(resolution))
        }
        Action::StandardProject(transition) => {
            let resolution =
                drive_transition(transition, state, env).map_err(ExecuteError::StandardProject)?;
            Ok(ActionResult::Resolved(resolution))
        }
        Action::ConfirmSellPatents(transition) => {
            let earned = drive_transition(transition, state, env)
                .map_err(ExecuteError::ConfirmSellPatents)?;
            Ok(ActionResult::PatentsSold { earned })
        }
        Action::PlaceTile(transition) => {
            let resolution =
                drive_transition(transition, state, env).map_err(ExecuteError::PlaceTile)?;
            Ok(ActionResult::Resolved(resolution))
        }
        Action::Skip(transition) => {
            let outcome = drive_transition(transition, state, env).map_err(ExecuteError::Skip)?;
            Ok(ActionResult::Skipped { outcome })
        }
        Action::SelectCorporation(transition) => {
            let resolution = drive_transition(transition, state, env)
                .map_err(ExecuteError::SelectCorporation)?;
            Ok(ActionResult::Resolved(resolution))
        }
        Action::CompleteForcedAction(transition) => {
            let resolution = drive_transition(transition, state, env)
                .map_err(ExecuteError::CompleteForcedAction)?;
            Ok(ActionResult::Resolved(resolution))
        }
        Action::StartGame => {
            drive_transition(&StartGameAction, state, env).map_err(ExecuteError::StartGame)?;
            Ok(ActionResult::Completed)
        }
        Action::AdvanceGeneration => {
            drive_transition(&AdvanceGenerationAction, state, env)
                .map_err(ExecuteError::AdvanceGeneration)?;
            Ok(ActionResult::Completed)
        }
        Action::EndGame => {
            drive_transition(&EndGameAction, state, env).map_err(ExecuteError::EndGame)?;
            Ok(ActionResult::Completed)
        }
    }
}
