//! Player and system actions.
//!
//! Every mutation of a started game is one of the [`Action`] variants. Each
//! variant wraps a struct implementing [`ActionTransition`], which the engine
//! drives through `pre_validate → apply → post_validate`.
//!
//! # Module Structure
//!
//! - `card`: playing a card from hand, using a played card's action
//! - `project`: standard projects and the sell-patents confirmation
//! - `tile`: resolving the head of the tile placement queue
//! - `turn`: skipping / passing
//! - `corporation`: corporation selection and its forced first action
//! - `generation`: starting the game, advancing the generation, ending the game

mod card;
mod corporation;
mod error;
mod generation;
mod project;
mod tile;
mod turn;

pub use card::{PlayCardAction, UseCardAction};
pub use corporation::{CompleteForcedAction, SelectCorporationAction};
pub use error::ActionError;
pub use generation::{AdvanceGenerationAction, EndGameAction, StartGameAction};
pub use project::{ConfirmSellPatentsAction, StandardProjectAction};
pub use tile::PlaceTileAction;
pub use turn::SkipAction;

use crate::card::{Card, ResourceType};
use crate::config::GameConfig;
use crate::engine::{SkipOutcome, auto_advance_turn_if_needed, consume_action};
use crate::env::GameEnv;
use crate::resolver::{CalculatedOutput, Occurrence, ResolveError, fire_triggers};
use crate::state::{CardAction, CardEffect, GameState, GameStatus, PlayerId, PlayerState};

/// Defines how a concrete action variant mutates game state.
pub trait ActionTransition {
    type Error;
    type Result;

    /// Returns the player performing this action, `None` for system actions.
    fn actor(&self) -> Option<&PlayerId>;

    /// Validates pre-conditions using the state **before** mutation.
    fn pre_validate(&self, _state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies the action by mutating the game state directly.
    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<Self::Result, Self::Error>;

    /// Validates post-conditions using the state **after** mutation.
    fn post_validate(&self, _state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Top-level action enum routed by [`crate::engine::GameEngine`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "kebab-case")
)]
pub enum Action {
    PlayCard(PlayCardAction),
    UseCardAction(UseCardAction),
    StandardProject(StandardProjectAction),
    ConfirmSellPatents(ConfirmSellPatentsAction),
    PlaceTile(PlaceTileAction),
    Skip(SkipAction),
    SelectCorporation(SelectCorporationAction),
    CompleteForcedAction(CompleteForcedAction),

    /// Lobby → first generation.
    StartGame,
    /// Production and reset once every player has passed.
    AdvanceGeneration,
    EndGame,
}

impl Action {
    /// Returns the player performing this action, `None` for system actions.
    pub fn actor(&self) -> Option<&PlayerId> {
        match self {
            Action::PlayCard(action) => action.actor(),
            Action::UseCardAction(action) => action.actor(),
            Action::StandardProject(action) => action.actor(),
            Action::ConfirmSellPatents(action) => action.actor(),
            Action::PlaceTile(action) => action.actor(),
            Action::Skip(action) => action.actor(),
            Action::SelectCorporation(action) => action.actor(),
            Action::CompleteForcedAction(action) => action.actor(),
            Action::StartGame | Action::AdvanceGeneration | Action::EndGame => None,
        }
    }

    pub fn is_system(&self) -> bool {
        self.actor().is_none()
    }

    /// Returns the snake_case string representation of the action.
    ///
    /// Used for logging and error reporting.
    pub fn as_snake_case(&self) -> &'static str {
        match self {
            Action::PlayCard(_) => "play_card",
            Action::UseCardAction(_) => "use_card_action",
            Action::StandardProject(_) => "standard_project",
            Action::ConfirmSellPatents(_) => "confirm_sell_patents",
            Action::PlaceTile(_) => "place_tile",
            Action::Skip(_) => "skip",
            Action::SelectCorporation(_) => "select_corporation",
            Action::CompleteForcedAction(_) => "complete_forced_action",
            Action::StartGame => "start_game",
            Action::AdvanceGeneration => "advance_generation",
            Action::EndGame => "end_game",
        }
    }
}

impl From<PlayCardAction> for Action {
    fn from(action: PlayCardAction) -> Self {
        Self::PlayCard(action)
    }
}

impl From<UseCardAction> for Action {
    fn from(action: UseCardAction) -> Self {
        Self::UseCardAction(action)
    }
}

impl From<StandardProjectAction> for Action {
    fn from(action: StandardProjectAction) -> Self {
        Self::StandardProject(action)
    }
}

impl From<ConfirmSellPatentsAction> for Action {
    fn from(action: ConfirmSellPatentsAction) -> Self {
        Self::ConfirmSellPatents(action)
    }
}

impl From<PlaceTileAction> for Action {
    fn from(action: PlaceTileAction) -> Self {
        Self::PlaceTile(action)
    }
}

impl From<SkipAction> for Action {
    fn from(action: SkipAction) -> Self {
        Self::Skip(action)
    }
}

impl From<SelectCorporationAction> for Action {
    fn from(action: SelectCorporationAction) -> Self {
        Self::SelectCorporation(action)
    }
}

impl From<CompleteForcedAction> for Action {
    fn from(action: CompleteForcedAction) -> Self {
        Self::CompleteForcedAction(action)
    }
}

// ============================================================================
// Results
// ============================================================================

/// What resolving a behavior produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Resolution {
    /// Outputs after per-condition scaling, in application order.
    pub calculated: Vec<CalculatedOutput>,
    /// Conditional effects fired by this action, counting repeats.
    pub triggers_fired: u32,
}

/// Action-specific execution result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "kebab-case")
)]
pub enum ActionResult {
    Resolved(Resolution),
    Skipped { outcome: SkipOutcome },
    /// MC received for the confirmed patent sale.
    PatentsSold { earned: i32 },
    Completed,
}

// ============================================================================
// Shared helpers
// ============================================================================

pub(crate) fn ensure_active(state: &GameState) -> Result<(), ActionError> {
    if state.status != GameStatus::Active {
        return Err(ActionError::GameNotActive(state.status));
    }
    Ok(())
}

pub(crate) fn player_of<'s>(
    state: &'s GameState,
    player_id: &PlayerId,
) -> Result<&'s PlayerState, ActionError> {
    state
        .player(player_id)
        .ok_or_else(|| ActionError::PlayerNotFound(player_id.clone()))
}

pub(crate) fn player_of_mut<'s>(
    state: &'s mut GameState,
    player_id: &PlayerId,
) -> Result<&'s mut PlayerState, ActionError> {
    state
        .player_mut(player_id)
        .ok_or_else(|| ActionError::PlayerNotFound(player_id.clone()))
}

/// Fires conditional effects for each occurrence in order.
pub(crate) fn fire_all(
    state: &mut GameState,
    env: &GameEnv<'_>,
    occurrences: &[Occurrence],
) -> Result<u32, ResolveError> {
    let mut fired = 0;
    for occurrence in occurrences {
        fired += fire_triggers(state, env, occurrence)?;
    }
    Ok(fired)
}

/// Spends the action a turn-consuming action costs and hands the turn on
/// if the player is now out of actions.
pub(crate) fn spend_action(state: &mut GameState, config: &GameConfig) -> Result<(), ActionError> {
    consume_action(state)?;
    auto_advance_turn_if_needed(state, config);
    Ok(())
}

/// Registers a played card's lasting behaviors and storage on its owner.
///
/// Persistent behaviors become [`CardEffect`]s, manual ones [`CardAction`]s.
pub(crate) fn register_card(player: &mut PlayerState, card: &Card) {
    for (behavior_index, behavior) in card.behaviors.iter().enumerate() {
        if behavior.is_persistent() {
            player.effects.push(CardEffect {
                card_id: card.id.clone(),
                card_name: card.name.clone(),
                behavior_index,
                behavior: behavior.clone(),
            });
        }
        if behavior.is_manual() {
            player.actions.push(CardAction {
                card_id: card.id.clone(),
                card_name: card.name.clone(),
                behavior_index,
                behavior: behavior.clone(),
                play_count: 0,
            });
        }
    }
    if let Some(storage) = &card.resource_storage {
        player
            .card_storage
            .entry(card.id.clone())
            .or_insert(storage.starting.max(0));
    }
}

/// Post-condition shared by resource-spending actions.
pub(crate) fn ensure_non_negative(
    state: &GameState,
    player_id: &PlayerId,
) -> Result<(), ActionError> {
    let player = player_of(state, player_id)?;
    for resource in ResourceType::BASIC {
        if player.resources.get(resource).unwrap_or(0) < 0 {
            return Err(ActionError::NegativeResource {
                player: player_id.clone(),
                resource,
            });
        }
    }
    if let Some((card, _)) = player.card_storage.iter().find(|(_, amount)| **amount < 0) {
        return Err(ActionError::NegativeStorage {
            player: player_id.clone(),
            card: card.clone(),
        });
    }
    Ok(())
}
