//! Turn and phase state machine.
//!
//! Free functions over [`GameState`] so that transitions can drive the turn
//! from inside `apply`; [`super::GameEngine`] exposes the same operations to
//! callers outside the action pipeline.

use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{ActionAllowance, GamePhase, GameState, PlayerId, TurnState};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnError {
    #[error("not in action phase (current: {0})")]
    NotActionPhase(GamePhase),

    #[error("no turn is in progress")]
    NoCurrentTurn,

    #[error("it is {current}'s turn, not {player}'s")]
    NotYourTurn { player: PlayerId, current: PlayerId },

    #[error("{0} has no actions remaining")]
    NoActionsRemaining(PlayerId),

    #[error("{0} must place a pending tile first")]
    PendingTilePlacement(PlayerId),

    #[error("{0} must complete the forced corporation action first")]
    PendingForcedAction(PlayerId),

    #[error("{0} must resolve a pending card selection first")]
    PendingCardSelection(PlayerId),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotActionPhase(_)
            | Self::NotYourTurn { .. }
            | Self::NoActionsRemaining(_)
            | Self::PendingTilePlacement(_)
            | Self::PendingForcedAction(_)
            | Self::PendingCardSelection(_) => ErrorSeverity::Recoverable,
            Self::NoCurrentTurn => ErrorSeverity::Validation,
            Self::PlayerNotFound(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotActionPhase(_) => "TURN_NOT_ACTION_PHASE",
            Self::NoCurrentTurn => "TURN_NO_CURRENT_TURN",
            Self::NotYourTurn { .. } => "TURN_NOT_YOUR_TURN",
            Self::NoActionsRemaining(_) => "TURN_NO_ACTIONS_REMAINING",
            Self::PendingTilePlacement(_) => "TURN_PENDING_TILE_PLACEMENT",
            Self::PendingForcedAction(_) => "TURN_PENDING_FORCED_ACTION",
            Self::PendingCardSelection(_) => "TURN_PENDING_CARD_SELECTION",
            Self::PlayerNotFound(_) => "TURN_PLAYER_NOT_FOUND",
        }
    }
}

/// What a skip did to the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum SkipOutcome {
    /// No action was taken this turn: the player passed for the generation.
    Passed,
    /// The player had acted already: only the turn ended.
    TurnEnded,
}

/// Checks that `player_id` holds the turn in the action phase and may act.
pub fn ensure_can_act(state: &GameState, player_id: &PlayerId) -> Result<(), TurnError> {
    if state.current_phase != GamePhase::Action {
        return Err(TurnError::NotActionPhase(state.current_phase));
    }
    let turn = state.current_turn.as_ref().ok_or(TurnError::NoCurrentTurn)?;
    if turn.player_id != *player_id {
        return Err(TurnError::NotYourTurn {
            player: player_id.clone(),
            current: turn.player_id.clone(),
        });
    }
    if turn.actions_remaining.is_exhausted() {
        return Err(TurnError::NoActionsRemaining(player_id.clone()));
    }
    let player = state
        .player(player_id)
        .ok_or_else(|| TurnError::PlayerNotFound(player_id.clone()))?;
    if player.has_pending_tile_selection() {
        return Err(TurnError::PendingTilePlacement(player_id.clone()));
    }
    Ok(())
}

/// Spends one action of the current turn. Unlimited turns are unaffected.
pub fn consume_action(state: &mut GameState) -> Result<ActionAllowance, TurnError> {
    let turn = state.current_turn.as_mut().ok_or(TurnError::NoCurrentTurn)?;
    turn.actions_remaining = match turn.actions_remaining {
        ActionAllowance::Unlimited => ActionAllowance::Unlimited,
        ActionAllowance::Limited(0) => {
            return Err(TurnError::NoActionsRemaining(turn.player_id.clone()));
        }
        ActionAllowance::Limited(n) => ActionAllowance::Limited(n - 1),
    };
    Ok(turn.actions_remaining)
}

/// Advances the turn once the current player is out of actions or has passed.
///
/// Does nothing while the player still owes a tile placement, a forced first
/// action or a card selection. Returns true when the turn pointer moved.
pub fn auto_advance_turn_if_needed(state: &mut GameState, config: &GameConfig) -> bool {
    let Some(turn) = state.current_turn.as_ref() else {
        return false;
    };
    let Some(player) = state.player(&turn.player_id) else {
        return false;
    };
    if !turn.actions_remaining.is_exhausted() && !player.passed {
        return false;
    }
    if player.blocks_turn_advance() {
        debug!(
            target: "core::turn",
            player_id = %player.id,
            "turn advance deferred until pending obligations resolve"
        );
        return false;
    }
    advance_turn(state, config)
}

/// Checks that `player_id` may skip now and returns their remaining allowance.
///
/// Unlike [`ensure_can_act`] an exhausted allowance is fine, but any pending
/// obligation is not.
pub fn ensure_can_skip(state: &GameState, player_id: &PlayerId) -> Result<ActionAllowance, TurnError> {
    if state.current_phase != GamePhase::Action {
        return Err(TurnError::NotActionPhase(state.current_phase));
    }
    let turn = state.current_turn.as_ref().ok_or(TurnError::NoCurrentTurn)?;
    if turn.player_id != *player_id {
        return Err(TurnError::NotYourTurn {
            player: player_id.clone(),
            current: turn.player_id.clone(),
        });
    }
    let player = state
        .player(player_id)
        .ok_or_else(|| TurnError::PlayerNotFound(player_id.clone()))?;
    if player.has_pending_tile_selection() {
        return Err(TurnError::PendingTilePlacement(player_id.clone()));
    }
    if player.has_outstanding_forced_action() {
        return Err(TurnError::PendingForcedAction(player_id.clone()));
    }
    if player.pending_card_selection.is_some() {
        return Err(TurnError::PendingCardSelection(player_id.clone()));
    }
    Ok(turn.actions_remaining)
}

/// Ends the current player's turn.
///
/// With no action taken yet (a full allowance, or an unlimited turn) the
/// player passes for the rest of the generation. Otherwise only the turn
/// ends and no further action is consumed.
pub fn skip_action(
    state: &mut GameState,
    config: &GameConfig,
    player_id: &PlayerId,
) -> Result<SkipOutcome, TurnError> {
    let allowance = ensure_can_skip(state, player_id)?;
    let outcome = match allowance {
        ActionAllowance::Unlimited => SkipOutcome::Passed,
        ActionAllowance::Limited(n) if n >= config.actions_per_turn => SkipOutcome::Passed,
        ActionAllowance::Limited(_) => SkipOutcome::TurnEnded,
    };
    if outcome == SkipOutcome::Passed
        && let Some(player) = state.player_mut(player_id)
    {
        player.passed = true;
    }
    debug!(
        target: "core::turn",
        player_id = %player_id,
        ?outcome,
        "player skipped"
    );
    advance_turn(state, config);
    Ok(outcome)
}

/// Moves the turn to the next player who has not passed.
///
/// When everyone has passed the game enters production and the turn order
/// rotates so the next generation starts with the following seat.
fn advance_turn(state: &mut GameState, config: &GameConfig) -> bool {
    let order = state.turn_order.clone();
    if order.is_empty() {
        return false;
    }

    if state.players.values().all(|p| p.passed) {
        state.current_turn = None;
        state.current_phase = GamePhase::ProductionAndCardDraw;
        state.turn_order.rotate_left(1);
        info!(
            target: "core::turn",
            generation = state.generation,
            "all players passed, entering production"
        );
        return true;
    }

    let current = state
        .current_player_id()
        .and_then(|id| order.iter().position(|p| p == id))
        .unwrap_or(order.len() - 1);
    let Some(next) = (1..=order.len())
        .map(|offset| &order[(current + offset) % order.len()])
        .find(|id| state.player(id).is_some_and(|p| !p.passed))
        .cloned()
    else {
        return false;
    };

    let allowance = if state.active_player_count() == 1 {
        ActionAllowance::Unlimited
    } else {
        ActionAllowance::Limited(config.actions_per_turn)
    };
    info!(
        target: "core::turn",
        player_id = %next,
        actions_remaining = %allowance,
        "turn advanced"
    );
    state.current_turn = Some(TurnState::new(next, allowance));
    true
}
