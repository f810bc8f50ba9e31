//! Error types for action execution pipeline.

use crate::action::{
    ActionTransition, AdvanceGenerationAction, CompleteForcedAction, ConfirmSellPatentsAction,
    EndGameAction, PlaceTileAction, PlayCardAction, SelectCorporationAction, SkipAction,
    StandardProjectAction, StartGameAction, UseCardAction,
};
use crate::error::{ErrorSeverity, GameError};

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Errors surfaced while executing an action through the game engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    #[error("play card action failed: {0}")]
    PlayCard(TransitionPhaseError<<PlayCardAction as ActionTransition>::Error>),

    #[error("card action failed: {0}")]
    UseCardAction(TransitionPhaseError<<UseCardAction as ActionTransition>::Error>),

    #[error("standard project failed: {0}")]
    StandardProject(TransitionPhaseError<<StandardProjectAction as ActionTransition>::Error>),

    #[error("sell patents confirmation failed: {0}")]
    ConfirmSellPatents(
        TransitionPhaseError<<ConfirmSellPatentsAction as ActionTransition>::Error>,
    ),

    #[error("tile placement failed: {0}")]
    PlaceTile(TransitionPhaseError<<PlaceTileAction as ActionTransition>::Error>),

    #[error("skip action failed: {0}")]
    Skip(TransitionPhaseError<<SkipAction as ActionTransition>::Error>),

    #[error("corporation selection failed: {0}")]
    SelectCorporation(
        TransitionPhaseError<<SelectCorporationAction as ActionTransition>::Error>,
    ),

    #[error("forced first action failed: {0}")]
    CompleteForcedAction(TransitionPhaseError<<CompleteForcedAction as ActionTransition>::Error>),

    #[error("start game failed: {0}")]
    StartGame(TransitionPhaseError<<StartGameAction as ActionTransition>::Error>),

    #[error("advance generation failed: {0}")]
    AdvanceGeneration(TransitionPhaseError<<AdvanceGenerationAction as ActionTransition>::Error>),

    #[error("end game failed: {0}")]
    EndGame(TransitionPhaseError<<EndGameAction as ActionTransition>::Error>),
}

impl ExecuteError {
    /// Pipeline stage that rejected the action.
    pub fn phase(&self) -> TransitionPhase {
        match self {
            Self::Skip(e) => e.phase,
            Self::PlayCard(e)
            | Self::UseCardAction(e)
            | Self::StandardProject(e)
            | Self::ConfirmSellPatents(e)
            | Self::PlaceTile(e)
            | Self::SelectCorporation(e)
            | Self::CompleteForcedAction(e)
            | Self::StartGame(e)
            | Self::AdvanceGeneration(e)
            | Self::EndGame(e) => e.phase,
        }
    }

    /// True when the action was rejected before any mutation was attempted.
    pub fn is_rejection(&self) -> bool {
        self.phase() == TransitionPhase::PreValidate
    }

    fn inner(&self) -> &dyn GameError {
        match self {
            Self::Skip(e) => &e.error,
            Self::PlayCard(e)
            | Self::UseCardAction(e)
            | Self::StandardProject(e)
            | Self::ConfirmSellPatents(e)
            | Self::PlaceTile(e)
            | Self::SelectCorporation(e)
            | Self::CompleteForcedAction(e)
            | Self::StartGame(e)
            | Self::AdvanceGeneration(e)
            | Self::EndGame(e) => &e.error,
        }
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self.phase() {
            TransitionPhase::PreValidate => self.inner().severity(),
            // Rolled back, but validation should have caught it.
            TransitionPhase::Apply | TransitionPhase::PostValidate => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        self.inner().error_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionError;
    use crate::engine::TurnError;

    #[test]
    fn display_names_action_and_phase() {
        let err = ExecuteError::Skip(TransitionPhaseError::new(
            TransitionPhase::PreValidate,
            TurnError::NoCurrentTurn,
        ));
        assert_eq!(
            err.to_string(),
            "skip action failed: pre_validate failed: no turn is in progress"
        );
        assert_eq!(err.error_code(), "TURN_NO_CURRENT_TURN");
        assert!(err.is_rejection());
    }

    #[test]
    fn failures_after_validation_are_internal() {
        let err = ExecuteError::EndGame(TransitionPhaseError::new(
            TransitionPhase::Apply,
            ActionError::NoPendingTile("p1".into()),
        ));
        assert_eq!(err.severity(), ErrorSeverity::Internal);
        assert_eq!(err.phase().as_str(), "apply");
    }
}
