//! Event types for different topics.

use serde::{Deserialize, Serialize};

use mars_core::engine::TransitionPhase;
use mars_core::{
    Action, ActionAllowance, ActionResult, DomainEvent, GameId, GamePhase, PlayerId,
};

/// Events describing what happened to a game's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum GameEvent {
    /// An action was committed.
    ActionExecuted {
        game_id: GameId,
        revision: u64,
        action: Action,
        result: ActionResult,
        events: Vec<DomainEvent>,
    },

    /// A turn-machine operation committed outside the action pipeline.
    TurnMaintenance {
        game_id: GameId,
        revision: u64,
        events: Vec<DomainEvent>,
    },

    /// An action was rejected or failed; the state is unchanged.
    ActionFailed {
        game_id: GameId,
        action: Action,
        phase: TransitionPhase,
        code: String,
        error: String,
    },
}

/// Lightweight turn-management events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum TurnEvent {
    TurnChanged {
        game_id: GameId,
        player_id: Option<PlayerId>,
        actions_remaining: Option<ActionAllowance>,
    },
    PhaseChanged {
        game_id: GameId,
        phase: GamePhase,
    },
    GenerationAdvanced {
        game_id: GameId,
        generation: u32,
    },
    GameEnded {
        game_id: GameId,
    },
}

impl TurnEvent {
    /// Projects the turn-relevant subset of a committed change.
    pub fn from_domain(game_id: &GameId, event: &DomainEvent) -> Option<Self> {
        let game_id = game_id.clone();
        match event {
            DomainEvent::TurnChanged {
                player_id,
                actions_remaining,
            } => Some(Self::TurnChanged {
                game_id,
                player_id: player_id.clone(),
                actions_remaining: *actions_remaining,
            }),
            DomainEvent::PhaseChanged { new, .. } => Some(Self::PhaseChanged {
                game_id,
                phase: *new,
            }),
            DomainEvent::GenerationAdvanced { generation } => Some(Self::GenerationAdvanced {
                game_id,
                generation: *generation,
            }),
            DomainEvent::GameEnded => Some(Self::GameEnded { game_id }),
            _ => None,
        }
    }
}
