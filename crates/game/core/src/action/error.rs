//! Action execution errors.

use crate::card::{BehaviorError, ResourceType, TileType};
use crate::engine::TurnError;
use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError, ValidationError};
use crate::payment::PaymentError;
use crate::resolver::ResolveError;
use crate::state::{CardId, GamePhase, GameStatus, InitializationError, PlayerId};

// ============================================================================
// Action Execution Errors
// ============================================================================

/// Errors that can occur while executing a player or system action.
///
/// Execution fails fast: the first violated precondition is reported and the
/// engine discards every change the action made.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("game is {0}, not active")]
    GameNotActive(GameStatus),

    #[error("action not allowed in phase {actual} (expected {expected})")]
    WrongPhase { expected: GamePhase, actual: GamePhase },

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// First reason reported by the playability calculator.
    #[error("card cannot be played: {0}")]
    NotPlayable(ValidationError),

    /// First reason reported for a card action or standard project.
    #[error("not available: {0}")]
    Unavailable(ValidationError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("{player} has no action at behavior {behavior_index} of card {card}")]
    CardActionNotFound {
        player: PlayerId,
        card: CardId,
        behavior_index: usize,
    },

    #[error("no tile placement is pending for {0}")]
    NoPendingTile(PlayerId),

    #[error("pending placement is a {expected} tile, not {requested}")]
    TileMismatch { expected: TileType, requested: TileType },

    #[error("no card selection is pending for {0}")]
    NoPendingSelection(PlayerId),

    #[error("must select between {min} and {max} cards, got {selected}")]
    SelectionCount {
        selected: usize,
        min: usize,
        max: usize,
    },

    #[error("card {0} is not available for selection")]
    CardNotOffered(CardId),

    #[error("card {0} is not a corporation")]
    NotACorporation(CardId),

    #[error("{0} already has a corporation")]
    CorporationAlreadySelected(PlayerId),

    #[error("{0} has no outstanding forced first action")]
    NoForcedAction(PlayerId),

    #[error("{player} holds negative {resource} after the action")]
    NegativeResource {
        player: PlayerId,
        resource: ResourceType,
    },

    #[error("{player} holds a negative amount on card {card} after the action")]
    NegativeStorage { player: PlayerId, card: CardId },

    #[error(transparent)]
    Initialization(#[from] InitializationError),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            Turn(error) => error.severity(),
            Oracle(error) => error.severity(),
            Payment(error) => error.severity(),
            Resolve(error) => error.severity(),
            PlayerNotFound(_) | GameNotActive(_) | WrongPhase { .. } => ErrorSeverity::Validation,
            NotPlayable(_) | Unavailable(_) => ErrorSeverity::Recoverable,
            Behavior(_) | CardActionNotFound { .. } => ErrorSeverity::Validation,
            NoPendingTile(_) | TileMismatch { .. } => ErrorSeverity::Validation,
            NoPendingSelection(_) | SelectionCount { .. } | CardNotOffered(_) => {
                ErrorSeverity::Validation
            }
            NotACorporation(_) | CorporationAlreadySelected(_) | NoForcedAction(_) => {
                ErrorSeverity::Validation
            }
            NegativeResource { .. } | NegativeStorage { .. } => ErrorSeverity::Internal,
            Initialization(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            Turn(error) => error.error_code(),
            Oracle(error) => error.error_code(),
            Payment(error) => error.error_code(),
            Resolve(error) => error.error_code(),
            PlayerNotFound(_) => "ACTION_PLAYER_NOT_FOUND",
            GameNotActive(_) => "ACTION_GAME_NOT_ACTIVE",
            WrongPhase { .. } => "ACTION_WRONG_PHASE",
            NotPlayable(_) => "ACTION_CARD_NOT_PLAYABLE",
            Unavailable(_) => "ACTION_UNAVAILABLE",
            Behavior(_) => "ACTION_INVALID_CHOICE",
            CardActionNotFound { .. } => "ACTION_CARD_ACTION_NOT_FOUND",
            NoPendingTile(_) => "ACTION_NO_PENDING_TILE",
            TileMismatch { .. } => "ACTION_TILE_MISMATCH",
            NoPendingSelection(_) => "ACTION_NO_PENDING_SELECTION",
            SelectionCount { .. } => "ACTION_SELECTION_COUNT",
            CardNotOffered(_) => "ACTION_CARD_NOT_OFFERED",
            NotACorporation(_) => "ACTION_NOT_A_CORPORATION",
            CorporationAlreadySelected(_) => "ACTION_CORPORATION_ALREADY_SELECTED",
            NoForcedAction(_) => "ACTION_NO_FORCED_ACTION",
            NegativeResource { .. } => "ACTION_NEGATIVE_RESOURCE",
            NegativeStorage { .. } => "ACTION_NEGATIVE_STORAGE",
            Initialization(_) => "ACTION_INITIALIZATION",
        }
    }
}

impl ActionError {
    /// The diagnostic entry behind a rejection, when there is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::NotPlayable(error) | Self::Unavailable(error) => Some(error),
            _ => None,
        }
    }
}
