//! Card catalog loaded from JSON.

use std::fs;
use std::path::Path;

use mars_core::{Card, CardFilter, CardId, CardOracle, CardSnapshot};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read card catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid card catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("card {0} is defined more than once")]
    DuplicateCard(CardId),
}

/// Immutable card definitions shared by every game.
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: CardSnapshot,
}

impl CardCatalog {
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Result<Self, CatalogError> {
        let mut snapshot = CardSnapshot::default();
        for card in cards {
            let id = card.id.clone();
            if snapshot.insert(card).is_some() {
                return Err(CatalogError::DuplicateCard(id));
            }
        }
        Ok(Self { cards: snapshot })
    }

    /// Parses a JSON array of card definitions.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<Card> = serde_json::from_str(json)?;
        Self::new(cards)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let catalog = Self::from_json_str(&fs::read_to_string(path)?)?;
        info!(
            target: "runtime::catalog",
            path = %path.display(),
            cards = catalog.len(),
            "card catalog loaded"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardOracle for CardCatalog {
    fn get_by_id(&self, id: &CardId) -> Option<&Card> {
        self.cards.get_by_id(id)
    }

    fn list(&self, filter: &CardFilter) -> Vec<&Card> {
        self.cards.list(filter)
    }
}
