//! Domain events and the synchronous in-call-path dispatcher.
//!
//! Events are extracted from the difference between the state before and
//! after a committed action. Every subscriber runs to completion before
//! [`EventDispatcher::publish`] returns, so derived state (generational
//! counters, cached card playability) is always consistent with the state the
//! caller observes.
mod dispatcher;
mod extract;
mod generational;

pub use dispatcher::{DispatchContext, EventDispatcher, EventSubscriber, SubscriptionId};
pub use extract::extract_events;
pub use generational::GenerationalEventTracker;

use bitflags::bitflags;

use crate::card::TileType;
use crate::state::{ActionAllowance, CardId, GamePhase, GlobalParameter, PlayerId};

/// High-level occurrence published after a committed mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")
)]
pub enum DomainEvent {
    TerraformRatingChanged {
        player_id: PlayerId,
        old: i32,
        new: i32,
    },
    TilePlaced {
        player_id: Option<PlayerId>,
        tile_type: TileType,
    },
    GlobalParameterChanged {
        parameter: GlobalParameter,
        old: i32,
        new: i32,
    },
    ResourcesChanged {
        player_id: PlayerId,
    },
    ProductionChanged {
        player_id: PlayerId,
    },
    PhaseChanged {
        old: GamePhase,
        new: GamePhase,
    },
    TurnChanged {
        player_id: Option<PlayerId>,
        actions_remaining: Option<ActionAllowance>,
    },
    CardAddedToHand {
        player_id: PlayerId,
        card_id: CardId,
    },
    CardRemovedFromHand {
        player_id: PlayerId,
        card_id: CardId,
    },
    CardPlayed {
        player_id: PlayerId,
        card_id: CardId,
    },
    /// Effects, actions or payment substitutes of a player changed.
    EffectsChanged {
        player_id: PlayerId,
    },
    GenerationAdvanced {
        generation: u32,
    },
    GameEnded,
}

bitflags! {
    /// Set of event kinds a subscriber wants to hear about.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EventKinds: u16 {
        const TERRAFORM_RATING   = 1 << 0;
        const TILE_PLACED        = 1 << 1;
        const GLOBAL_PARAMETER   = 1 << 2;
        const RESOURCES          = 1 << 3;
        const PRODUCTION         = 1 << 4;
        const PHASE              = 1 << 5;
        const TURN               = 1 << 6;
        const CARD_ADDED         = 1 << 7;
        const CARD_REMOVED       = 1 << 8;
        const CARD_PLAYED        = 1 << 9;
        const EFFECTS            = 1 << 10;
        const GENERATION         = 1 << 11;
        const GAME_ENDED         = 1 << 12;
    }
}

impl DomainEvent {
    pub fn kind(&self) -> EventKinds {
        match self {
            Self::TerraformRatingChanged { .. } => EventKinds::TERRAFORM_RATING,
            Self::TilePlaced { .. } => EventKinds::TILE_PLACED,
            Self::GlobalParameterChanged { .. } => EventKinds::GLOBAL_PARAMETER,
            Self::ResourcesChanged { .. } => EventKinds::RESOURCES,
            Self::ProductionChanged { .. } => EventKinds::PRODUCTION,
            Self::PhaseChanged { .. } => EventKinds::PHASE,
            Self::TurnChanged { .. } => EventKinds::TURN,
            Self::CardAddedToHand { .. } => EventKinds::CARD_ADDED,
            Self::CardRemovedFromHand { .. } => EventKinds::CARD_REMOVED,
            Self::CardPlayed { .. } => EventKinds::CARD_PLAYED,
            Self::EffectsChanged { .. } => EventKinds::EFFECTS,
            Self::GenerationAdvanced { .. } => EventKinds::GENERATION,
            Self::GameEnded => EventKinds::GAME_ENDED,
        }
    }

    /// The player the event concerns, when it concerns exactly one.
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Self::TerraformRatingChanged { player_id, .. }
            | Self::ResourcesChanged { player_id }
            | Self::ProductionChanged { player_id }
            | Self::CardAddedToHand { player_id, .. }
            | Self::CardRemovedFromHand { player_id, .. }
            | Self::CardPlayed { player_id, .. }
            | Self::EffectsChanged { player_id } => Some(player_id),
            Self::TilePlaced { player_id, .. } | Self::TurnChanged { player_id, .. } => {
                player_id.as_ref()
            }
            Self::GlobalParameterChanged { .. }
            | Self::PhaseChanged { .. }
            | Self::GenerationAdvanced { .. }
            | Self::GameEnded => None,
        }
    }

    /// Events relevant to observers of turn flow rather than board state.
    pub fn is_turn_event(&self) -> bool {
        self.kind()
            .intersects(EventKinds::PHASE | EventKinds::TURN | EventKinds::GENERATION | EventKinds::GAME_ENDED)
    }
}
