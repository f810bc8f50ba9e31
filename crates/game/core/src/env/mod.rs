//! Read-only collaborators consulted by the rules.
//!
//! The card catalog is owned outside the core. [`GameEnv`] bundles it with the
//! rule constants so calculators and transitions get everything they need
//! without coupling to a concrete catalog implementation.
mod cards;
mod error;
mod snapshot;

pub use cards::{CardFilter, CardOracle};
pub use error::OracleError;
pub use snapshot::CardSnapshot;

use crate::card::Card;
use crate::config::GameConfig;
use crate::state::CardId;

/// Aggregates the read-only collaborators required by the engine.
#[derive(Clone, Copy)]
pub struct GameEnv<'a> {
    cards: &'a dyn CardOracle,
    config: &'a GameConfig,
}

impl<'a> GameEnv<'a> {
    pub fn new(cards: &'a dyn CardOracle, config: &'a GameConfig) -> Self {
        Self { cards, config }
    }

    pub fn cards(&self) -> &'a dyn CardOracle {
        self.cards
    }

    pub fn config(&self) -> &'a GameConfig {
        self.config
    }

    /// Looks up a card, mapping absence to [`OracleError::CardNotFound`].
    pub fn card(&self, id: &CardId) -> Result<&'a Card, OracleError> {
        self.cards
            .get_by_id(id)
            .ok_or_else(|| OracleError::CardNotFound(id.clone()))
    }
}

impl std::fmt::Debug for GameEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
