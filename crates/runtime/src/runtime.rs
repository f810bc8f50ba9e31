//! High-level runtime orchestrator.
//!
//! The runtime owns one worker per game, wires up command channels and a
//! shared event bus, and exposes a builder-based API for spawning, loading
//! and shutting down games.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use mars_core::{GameConfig, GameId, GameState, PlayerState};

use crate::api::{GameHandle, Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::oracle::{CardCatalog, OracleManager};
use crate::repository::{GameRepository, InMemoryGameRepo};
use crate::workers::{Command, GameWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// JSON card catalog loaded by [`RuntimeBuilder::build`] when no catalog
    /// is injected.
    pub card_catalog: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            card_catalog: None,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `MARS_COMMAND_BUFFER`, `MARS_EVENT_BUFFER`,
    /// `MARS_ACTIONS_PER_TURN` and `MARS_CARD_CATALOG`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("MARS_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("MARS_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(actions) = read_env::<u8>("MARS_ACTIONS_PER_TURN") {
            config.game_config.actions_per_turn = actions.max(1);
        }
        if let Some(path) = read_env::<PathBuf>("MARS_CARD_CATALOG") {
            config.card_catalog = Some(path);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

struct RunningGame {
    handle: GameHandle,
    worker: JoinHandle<()>,
}

/// Main runtime that hosts any number of independent games.
///
/// Design: each game is owned by one worker task; [`GameHandle`] provides a
/// cloneable façade for clients.
pub struct Runtime {
    config: RuntimeConfig,
    oracles: OracleManager,
    repository: Arc<dyn GameRepository>,
    event_bus: EventBus,
    games: HashMap<GameId, RunningGame>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn repository(&self) -> Arc<dyn GameRepository> {
        Arc::clone(&self.repository)
    }

    /// Builds a lobby for `players` in seat order and spawns it.
    pub fn create_game(
        &mut self,
        game_id: impl Into<GameId>,
        players: impl IntoIterator<Item = PlayerState>,
    ) -> Result<GameHandle> {
        let mut state = GameState::new(game_id, &self.config.game_config);
        for player in players {
            state.add_player(player).map_err(RuntimeError::InitialState)?;
        }
        self.spawn_game(state)
    }

    /// Spawns a worker that owns `state` and returns its handle.
    ///
    /// The initial state is saved before the worker accepts commands.
    pub fn spawn_game(&mut self, state: GameState) -> Result<GameHandle> {
        let game_id = state.id.clone();
        if self.games.contains_key(&game_id) {
            return Err(RuntimeError::GameAlreadyRunning(game_id));
        }
        self.repository.save(&state)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let handle = GameHandle::new(game_id.clone(), command_tx, self.event_bus.clone());

        info!(
            target: "runtime::registry",
            game_id = %game_id,
            revision = state.revision,
            status = ?state.status,
            "spawning game worker"
        );
        let worker = GameWorker::new(
            state,
            self.oracles.clone(),
            Arc::clone(&self.repository),
            command_rx,
            self.event_bus.clone(),
        );
        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        self.games.insert(
            game_id,
            RunningGame {
                handle: handle.clone(),
                worker,
            },
        );
        Ok(handle)
    }

    /// Respawns a saved game from the repository.
    pub fn load_game(&mut self, game_id: &GameId) -> Result<GameHandle> {
        if let Some(running) = self.games.get(game_id) {
            debug!(target: "runtime::registry", game_id = %game_id, "game already running");
            return Ok(running.handle.clone());
        }
        let state = self
            .repository
            .load(game_id)?
            .ok_or_else(|| RuntimeError::SavedGameNotFound(game_id.clone()))?;
        self.spawn_game(state)
    }

    pub fn handle(&self, game_id: &GameId) -> Result<GameHandle> {
        self.games
            .get(game_id)
            .map(|running| running.handle.clone())
            .ok_or_else(|| RuntimeError::GameNotFound(game_id.clone()))
    }

    /// Ids of the running games, sorted.
    pub fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<_> = self.games.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Subscribe to one topic across every game hosted by this runtime.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Stops tracking a game and waits for its worker to drain.
    ///
    /// The worker exits once every outstanding [`GameHandle`] clone is dropped.
    pub async fn stop_game(&mut self, game_id: &GameId) -> Result<()> {
        let running = self
            .games
            .remove(game_id)
            .ok_or_else(|| RuntimeError::GameNotFound(game_id.clone()))?;
        drop(running.handle);
        running.worker.await.map_err(RuntimeError::WorkerJoin)?;
        info!(target: "runtime::registry", game_id = %game_id, "game worker joined");
        Ok(())
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(mut self) -> Result<()> {
        for game_id in self.game_ids() {
            self.stop_game(&game_id).await?;
        }
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    catalog: Option<CardCatalog>,
    repository: Option<Arc<dyn GameRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            catalog: None,
            repository: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Inject the card catalog instead of reading `config.card_catalog`.
    pub fn catalog(mut self, catalog: CardCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the game repository (default: [`InMemoryGameRepo`])
    pub fn repository(mut self, repository: Arc<dyn GameRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let catalog = match (self.catalog, &self.config.card_catalog) {
            (Some(catalog), _) => catalog,
            (None, Some(path)) => CardCatalog::from_path(path)?,
            (None, None) => return Err(RuntimeError::MissingCatalog),
        };
        let oracles = OracleManager::new(catalog, self.config.game_config.clone());
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryGameRepo::new()));
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        debug!(
            target: "runtime::registry",
            cards = oracles.cards().len(),
            command_buffer = self.config.command_buffer_size,
            event_buffer = self.config.event_buffer_size,
            "runtime built"
        );

        Ok(Runtime {
            config: self.config,
            oracles,
            repository,
            event_bus,
            games: HashMap::new(),
        })
    }
}
