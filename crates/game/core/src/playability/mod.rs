//! Diagnostic playability calculators.
//!
//! Every function here is pure and infallible: it inspects a snapshot and
//! returns the full list of reasons a card, card action or standard project
//! cannot be used right now. Execution paths reuse the same checks but stop at
//! the first failure.
mod action;
mod card;
mod project;
mod reactive;

pub use action::{MAX_ACTION_USES_PER_GENERATION, calculate_player_card_action_state};
pub use card::{CardPlayability, calculate_player_card_state, can_play_card};
pub use project::calculate_player_standard_project_state;
pub(crate) use project::project_cost;
pub use reactive::{
    CardActionStateHandle, CardStateHandle, CardStateTracker, CardStates, ReactiveCardActionState,
    ReactiveCardState, StateHandle,
};

use std::collections::BTreeMap;

use crate::card::{ResourceType, StandardProject};
use crate::error::{ErrorCategory, ValidationError};
use crate::state::{CardId, GamePhase, GameState, PlayerState};

/// Shared shape of every calculated entity state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct EntityState {
    pub errors: Vec<ValidationError>,
    /// Resources the entity costs to use, after discounts.
    pub cost: BTreeMap<ResourceType, i32>,
    pub metadata: BTreeMap<String, i32>,
    /// Logical sequence number of the last recompute.
    pub last_calculated: u64,
}

impl EntityState {
    /// Available exactly when no error was collected.
    pub fn available(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Calculated state of one hand card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PlayerCardState {
    pub card_id: CardId,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub state: EntityState,
}

impl PlayerCardState {
    pub fn available(&self) -> bool {
        self.state.available()
    }
}

/// Calculated state of a repeatable card action or a standard project.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PlayerCardActionState {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub card_id: Option<CardId>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub behavior_index: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub project: Option<StandardProject>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub state: EntityState,
}

impl PlayerCardActionState {
    pub fn available(&self) -> bool {
        self.state.available()
    }
}

// ============================================================================
// Shared checks
// ============================================================================

pub(crate) fn phase_error(game: &GameState) -> Option<ValidationError> {
    (game.current_phase != GamePhase::Action).then(|| {
        ValidationError::new(
            ErrorCategory::Phase,
            "PHASE_NOT_ACTION",
            format!("Not in action phase (current: {})", game.current_phase),
        )
    })
}

/// Turn ownership, remaining actions and outstanding tile placements.
pub(crate) fn turn_errors(game: &GameState, player: &PlayerState) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    match &game.current_turn {
        Some(turn) if turn.player_id == player.id => {
            if turn.actions_remaining.is_exhausted() {
                errors.push(
                    ValidationError::new(
                        ErrorCategory::Turn,
                        "TURN_NO_ACTIONS_REMAINING",
                        "No actions remaining",
                    )
                    .with_values(1, 0),
                );
            }
        }
        _ => errors.push(ValidationError::new(
            ErrorCategory::Turn,
            "TURN_NOT_YOUR_TURN",
            "Not your turn",
        )),
    }
    if player.has_pending_tile_selection() {
        errors.push(ValidationError::new(
            ErrorCategory::Turn,
            "TURN_PENDING_TILE_PLACEMENT",
            "A tile placement must be resolved first",
        ));
    }
    errors
}

pub(crate) fn cost_error(required: i32, current: i32) -> ValidationError {
    ValidationError::new(
        ErrorCategory::Cost,
        "COST_INSUFFICIENT_CREDITS",
        format!("Insufficient credits: need {required}, have {current}"),
    )
    .with_values(required, current)
}
