//! Static game content shared by every game worker.
//!
//! The catalog and rule constants are immutable at runtime; dynamic state
//! lives in each worker's session and in the repository.
mod catalog;

use std::sync::Arc;

use mars_core::{GameConfig, GameEnv};

pub use catalog::{CardCatalog, CatalogError};

/// Bundles the card catalog with the rule constants.
#[derive(Clone, Debug)]
pub struct OracleManager {
    pub(crate) cards: Arc<CardCatalog>,
    pub(crate) config: Arc<GameConfig>,
}

impl OracleManager {
    pub fn new(cards: CardCatalog, config: GameConfig) -> Self {
        Self {
            cards: Arc::new(cards),
            config: Arc::new(config),
        }
    }

    /// Borrows the oracles as the environment the core rules consult.
    pub fn as_game_env(&self) -> GameEnv<'_> {
        GameEnv::new(self.cards.as_ref(), self.config.as_ref())
    }

    pub fn cards(&self) -> &CardCatalog {
        &self.cards
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
