//! Repository contracts for saving and loading games.

use mars_core::{GameId, GameState};

use super::error::Result;

/// Storage for the latest committed state of each game.
pub trait GameRepository: Send + Sync {
    /// Saves a game, replacing any earlier revision.
    fn save(&self, state: &GameState) -> Result<()>;

    fn load(&self, game_id: &GameId) -> Result<Option<GameState>>;

    fn exists(&self, game_id: &GameId) -> bool;

    fn delete(&self, game_id: &GameId) -> Result<()>;

    /// Ids of every stored game, sorted.
    fn list_ids(&self) -> Result<Vec<GameId>> {
        Ok(vec![])
    }
}
