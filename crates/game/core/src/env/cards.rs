use crate::card::{Card, CardType};
use crate::state::CardId;

/// Selects catalog entries by pack and type. Empty lists match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub packs: Vec<String>,
    pub card_types: Vec<CardType>,
}

impl CardFilter {
    pub fn packs(packs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            packs: packs.into_iter().map(Into::into).collect(),
            card_types: Vec::new(),
        }
    }

    pub fn matches(&self, card: &Card) -> bool {
        (self.packs.is_empty() || self.packs.iter().any(|p| *p == card.pack))
            && (self.card_types.is_empty() || self.card_types.contains(&card.card_type))
    }
}

/// Read-only card catalog. Entries are never mutated after load.
pub trait CardOracle: Send + Sync {
    fn get_by_id(&self, id: &CardId) -> Option<&Card>;

    fn list(&self, filter: &CardFilter) -> Vec<&Card>;
}
