use std::collections::{BTreeMap, VecDeque};

use crate::card::ResourceType;

use super::{
    CardAction, CardEffect, CardId, ForcedFirstAction, GenerationalEventCounters,
    PendingCardSelection, PendingTileSelection, PlayerId, ResourceSet,
};

/// Extra resource a player may spend as MC, at `rate` MC per unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PaymentSubstitute {
    pub resource_type: ResourceType,
    pub conversion_rate: i32,
}

/// Everything the engine tracks for one seated player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub corporation: Option<CardId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resources: ResourceSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub production: ResourceSet,
    pub terraform_rating: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hand: Vec<CardId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub played_cards: Vec<CardId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub passed: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<CardEffect>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub actions: Vec<CardAction>,
    /// Card-bound resource counters, keyed by the card holding them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub card_storage: BTreeMap<CardId, i32>,
    /// Accumulated conversion-rate bonuses (e.g. +1 titanium value).
    #[cfg_attr(feature = "serde", serde(default))]
    pub value_modifiers: BTreeMap<ResourceType, i32>,
    /// Substitutes granted by played cards, on top of steel and titanium.
    #[cfg_attr(feature = "serde", serde(default))]
    pub payment_substitutes: Vec<PaymentSubstitute>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub generational_events: GenerationalEventCounters,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pending_tile_selections: VecDeque<PendingTileSelection>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pending_card_selection: Option<PendingCardSelection>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub forced_first_action: Option<ForcedFirstAction>,
}

impl PlayerState {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, terraform_rating: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            corporation: None,
            resources: ResourceSet::new(),
            production: ResourceSet::new(),
            terraform_rating,
            hand: Vec::new(),
            played_cards: Vec::new(),
            passed: false,
            effects: Vec::new(),
            actions: Vec::new(),
            card_storage: BTreeMap::new(),
            value_modifiers: BTreeMap::new(),
            payment_substitutes: Vec::new(),
            generational_events: GenerationalEventCounters::new(),
            pending_tile_selections: VecDeque::new(),
            pending_card_selection: None,
            forced_first_action: None,
        }
    }

    pub fn has_in_hand(&self, card_id: &CardId) -> bool {
        self.hand.contains(card_id)
    }

    /// Removes the card from hand. Returns false if it was not there.
    pub fn remove_from_hand(&mut self, card_id: &CardId) -> bool {
        match self.hand.iter().position(|id| id == card_id) {
            Some(index) => {
                self.hand.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has_pending_tile_selection(&self) -> bool {
        !self.pending_tile_selections.is_empty()
    }

    pub fn has_outstanding_forced_action(&self) -> bool {
        self.forced_first_action
            .as_ref()
            .is_some_and(ForcedFirstAction::is_outstanding)
    }

    /// True when the player must resolve something before the turn may advance.
    pub fn blocks_turn_advance(&self) -> bool {
        self.has_pending_tile_selection()
            || self.has_outstanding_forced_action()
            || self.pending_card_selection.is_some()
    }

    pub fn stored(&self, card_id: &CardId) -> i32 {
        self.card_storage.get(card_id).copied().unwrap_or(0)
    }

    pub fn value_modifier(&self, resource: ResourceType) -> i32 {
        self.value_modifiers.get(&resource).copied().unwrap_or(0)
    }

    /// Reads any player-level quantity: pool, production track or TR.
    pub fn quantity(&self, resource: ResourceType) -> Option<i32> {
        if resource == ResourceType::Tr {
            Some(self.terraform_rating)
        } else if resource.is_production() {
            self.production.get(resource)
        } else {
            self.resources.get(resource)
        }
    }

    /// Current generation's card actions are reset at generation advance.
    pub fn reset_generation(&mut self) {
        self.passed = false;
        self.generational_events.clear();
        for action in &mut self.actions {
            action.play_count = 0;
        }
    }
}
