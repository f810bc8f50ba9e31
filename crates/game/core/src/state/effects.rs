//! Per-player owned copies of card behaviors and outstanding obligations.

use crate::card::{CardBehavior, ResourceTriggerType, TileType};

use super::CardId;

/// Persistent effect registered when a card with a lasting behavior is played.
///
/// The behavior is an owned clone of the catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct CardEffect {
    pub card_id: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: CardBehavior,
}

/// Repeatable manual behavior of a played card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct CardAction {
    pub card_id: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: CardBehavior,
    /// Times used this generation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub play_count: u32,
}

/// Tile waiting to be placed by its owner before the turn can continue.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PendingTileSelection {
    pub tile_type: TileType,
    /// Card id or standard project id that queued the placement.
    pub source: String,
}

/// Cards offered for a selection the player must confirm (sell patents).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PendingCardSelection {
    pub source: String,
    pub available_cards: Vec<CardId>,
    /// MC received per selected card.
    pub reward_per_card: i32,
    pub min_cards: usize,
    pub max_cards: usize,
}

/// Mandatory free action granted by a corporation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ForcedFirstAction {
    pub action_type: ResourceTriggerType,
    pub corporation_id: CardId,
    pub source: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub completed: bool,
}

impl ForcedFirstAction {
    pub fn is_outstanding(&self) -> bool {
        !self.completed
    }
}
