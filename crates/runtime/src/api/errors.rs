//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories and the rules
//! engine so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use mars_core::{
    CardId, ExecuteError, GameError, GameId, InitializationError, OracleError, PlayerId, TurnError,
};

pub use crate::oracle::CatalogError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("game {0} is not running")]
    GameNotFound(GameId),

    #[error("game {0} is already running")]
    GameAlreadyRunning(GameId),

    #[error("no saved game with id {0}")]
    SavedGameNotFound(GameId),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("card {card} has no action at index {behavior_index}")]
    CardActionNotFound { card: CardId, behavior_index: usize },

    #[error("game worker command channel closed")]
    CommandChannelClosed,

    #[error("game worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("game worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a card catalog before building")]
    MissingCatalog,

    #[error("failed to initialize game state")]
    InitialState(#[source] InitializationError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl RuntimeError {
    /// Stable code of the underlying rules error, if there is one.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Execute(err) => Some(err.error_code()),
            Self::Turn(err) => Some(err.error_code()),
            _ => None,
        }
    }
}
