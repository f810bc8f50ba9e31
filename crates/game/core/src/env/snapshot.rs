//! Serializable catalog snapshot backing [`CardOracle`].

use std::collections::BTreeMap;

use super::{CardFilter, CardOracle};
use crate::card::Card;
use crate::state::CardId;

/// Owned, ordered set of catalog cards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardSnapshot {
    cards: BTreeMap<CardId, Card>,
}

impl CardSnapshot {
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards
                .into_iter()
                .map(|card| (card.id.clone(), card))
                .collect(),
        }
    }

    /// Adds or replaces a card. Returns the previous definition.
    pub fn insert(&mut self, card: Card) -> Option<Card> {
        self.cards.insert(card.id.clone(), card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardOracle for CardSnapshot {
    fn get_by_id(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    fn list(&self, filter: &CardFilter) -> Vec<&Card> {
        self.cards.values().filter(|card| filter.matches(card)).collect()
    }
}
