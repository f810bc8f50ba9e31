//! In-memory [`GameRepository`] for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use mars_core::{GameId, GameState};

use super::{GameRepository, RepositoryError, Result};

/// Keeps the latest state of each game in a map.
#[derive(Debug, Default)]
pub struct InMemoryGameRepo {
    games: RwLock<HashMap<GameId, GameState>>,
}

impl InMemoryGameRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameRepository for InMemoryGameRepo {
    fn save(&self, state: &GameState) -> Result<()> {
        let mut games = self
            .games
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        games.insert(state.id.clone(), state.clone());
        Ok(())
    }

    fn load(&self, game_id: &GameId) -> Result<Option<GameState>> {
        let games = self
            .games
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(games.get(game_id).cloned())
    }

    fn exists(&self, game_id: &GameId) -> bool {
        self.games
            .read()
            .map(|games| games.contains_key(game_id))
            .unwrap_or(false)
    }

    fn delete(&self, game_id: &GameId) -> Result<()> {
        let mut games = self
            .games
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        games.remove(game_id);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<GameId>> {
        let games = self
            .games
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<GameId> = games.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mars_core::GameConfig;

    #[test]
    fn save_replaces_the_previous_revision() {
        let repo = InMemoryGameRepo::new();
        let config = GameConfig::default();
        let mut state = GameState::new("g1", &config);
        repo.save(&state).unwrap();

        state.revision = 3;
        repo.save(&state).unwrap();

        let loaded = repo.load(&GameId::from("g1")).unwrap().unwrap();
        assert_eq!(loaded.revision, 3);
        assert_eq!(repo.list_ids().unwrap(), vec![GameId::from("g1")]);

        repo.delete(&GameId::from("g1")).unwrap();
        assert!(!repo.exists(&GameId::from("g1")));
    }
}
