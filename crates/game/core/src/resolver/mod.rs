//! Resource condition resolver.
//!
//! Interprets behavior inputs and outputs against a [`GameState`]. Every
//! resource type is handled by one arm of an exhaustive match so each effect
//! path can be tested in isolation.
//!
//! Resolution is split the same way callers use it:
//! - [`input_shortfalls`] and [`production_shortfalls`] never mutate and feed
//!   the diagnostic calculators;
//! - [`resolve_behavior`] checks both, then pays inputs and applies outputs.
mod inputs;
mod outputs;
mod scaling;
mod terraform;
mod triggers;

pub use inputs::{apply_inputs, input_shortfalls};
pub use outputs::{CalculatedOutput, OutputReport, apply_outputs, validate_targets};
pub use scaling::{count_per, production_shortfalls, scaled_amount};
pub use terraform::{place_tile, raise_parameter};
pub use triggers::{Occurrence, fire_triggers};

use crate::card::{ResourceCondition, ResourceType};
use crate::env::GameEnv;
use crate::error::{ErrorCategory, ErrorSeverity, GameError, ValidationError};
use crate::state::{CardId, GameState, PlayerId};

/// Player and card choices supplied alongside an action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct BehaviorTargets {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub target_player: Option<PlayerId>,
    /// Card receiving an `any-card` output.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub target_card: Option<CardId>,
    /// Card losing resources to a `steal-from-any-card` output.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub steal_source_card: Option<CardId>,
}

impl BehaviorTargets {
    pub fn player(player: impl Into<PlayerId>) -> Self {
        Self {
            target_player: Some(player.into()),
            ..Self::default()
        }
    }

    pub fn card(card: impl Into<CardId>) -> Self {
        Self {
            target_card: Some(card.into()),
            ..Self::default()
        }
    }
}

/// Who is resolving a behavior and on whose behalf.
#[derive(Clone, Copy, Debug)]
pub struct ResolveContext<'a> {
    pub player_id: &'a PlayerId,
    /// Card id or standard project id, recorded on queued tile selections.
    pub source: &'a str,
    /// Card whose storage backs `self-card` inputs and outputs.
    pub source_card: Option<&'a CardId>,
    pub targets: &'a BehaviorTargets,
}

impl<'a> ResolveContext<'a> {
    pub fn for_card(player_id: &'a PlayerId, card: &'a CardId, targets: &'a BehaviorTargets) -> Self {
        Self {
            player_id,
            source: card.as_str(),
            source_card: Some(card),
            targets,
        }
    }

    pub fn for_project(player_id: &'a PlayerId, project: &'a str, targets: &'a BehaviorTargets) -> Self {
        Self {
            player_id,
            source: project,
            source_card: None,
            targets,
        }
    }
}

/// What kind of quantity fell short.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortfallKind {
    Resource,
    CardStorage,
    /// Production would fall below its floor; `required` is the floor and
    /// `available` the resulting value.
    Production,
}

/// One unmet input or production bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shortfall {
    pub kind: ShortfallKind,
    pub resource: ResourceType,
    pub required: i32,
    pub available: i32,
}

impl Shortfall {
    pub fn to_validation_error(&self) -> ValidationError {
        let (code, message) = match self.kind {
            ShortfallKind::Resource => (
                "INPUT_INSUFFICIENT",
                format!("Need {} {}, have {}", self.required, self.resource, self.available),
            ),
            ShortfallKind::CardStorage => (
                "INPUT_INSUFFICIENT_STORAGE",
                format!(
                    "Need {} {} on card, have {}",
                    self.required, self.resource, self.available
                ),
            ),
            ShortfallKind::Production => (
                "PRODUCTION_BELOW_MINIMUM",
                format!("{} cannot go below {}", self.resource, self.required),
            ),
        };
        ValidationError::new(ErrorCategory::Input, code, message)
            .with_values(self.required, self.available)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("target player {0} not found")]
    TargetPlayerNotFound(PlayerId),

    #[error("player {0} cannot target themselves as an opponent")]
    SelfTargeted(PlayerId),

    #[error("insufficient {resource}: need {required}, have {available}")]
    InsufficientInput {
        resource: ResourceType,
        required: i32,
        available: i32,
    },

    #[error("insufficient {resource} on card: need {required}, have {available}")]
    InsufficientStorage {
        resource: ResourceType,
        required: i32,
        available: i32,
    },

    #[error("{resource} would drop to {resulting}, below minimum {minimum}")]
    ProductionBelowMinimum {
        resource: ResourceType,
        minimum: i32,
        resulting: i32,
    },

    #[error("card {card} cannot hold {resource}")]
    InvalidTargetCard { card: CardId, resource: ResourceType },
}

impl From<Shortfall> for ResolveError {
    fn from(shortfall: Shortfall) -> Self {
        let Shortfall {
            kind,
            resource,
            required,
            available,
        } = shortfall;
        match kind {
            ShortfallKind::Resource => Self::InsufficientInput {
                resource,
                required,
                available,
            },
            ShortfallKind::CardStorage => Self::InsufficientStorage {
                resource,
                required,
                available,
            },
            ShortfallKind::Production => Self::ProductionBelowMinimum {
                resource,
                minimum: required,
                resulting: available,
            },
        }
    }
}

impl GameError for ResolveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PlayerNotFound(_) => ErrorSeverity::Internal,
            Self::TargetPlayerNotFound(_)
            | Self::SelfTargeted(_)
            | Self::InvalidTargetCard { .. } => ErrorSeverity::Validation,
            Self::InsufficientInput { .. }
            | Self::InsufficientStorage { .. }
            | Self::ProductionBelowMinimum { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PlayerNotFound(_) => "RESOLVE_PLAYER_NOT_FOUND",
            Self::TargetPlayerNotFound(_) => "RESOLVE_TARGET_PLAYER_NOT_FOUND",
            Self::SelfTargeted(_) => "RESOLVE_SELF_TARGETED",
            Self::InsufficientInput { .. } => "RESOLVE_INSUFFICIENT_INPUT",
            Self::InsufficientStorage { .. } => "RESOLVE_INSUFFICIENT_STORAGE",
            Self::ProductionBelowMinimum { .. } => "RESOLVE_PRODUCTION_BELOW_MINIMUM",
            Self::InvalidTargetCard { .. } => "RESOLVE_INVALID_TARGET_CARD",
        }
    }
}

/// Checks every input and production bound, then pays inputs and applies outputs.
///
/// Fails on the first shortfall before anything is mutated.
pub fn resolve_behavior(
    state: &mut GameState,
    env: &GameEnv<'_>,
    ctx: &ResolveContext<'_>,
    inputs: &[ResourceCondition],
    outputs: &[ResourceCondition],
) -> Result<OutputReport, ResolveError> {
    let player = state
        .player(ctx.player_id)
        .ok_or_else(|| ResolveError::PlayerNotFound(ctx.player_id.clone()))?;

    if let Some(shortfall) = input_shortfalls(inputs, player, ctx.source_card, env.config())
        .into_iter()
        .next()
    {
        return Err(shortfall.into());
    }
    if let Some(shortfall) = production_shortfalls(outputs, state, player, ctx.source_card, env)
        .into_iter()
        .next()
    {
        return Err(shortfall.into());
    }
    validate_targets(outputs, state, env, ctx)?;

    apply_inputs(state, env, ctx, inputs)?;
    apply_outputs(state, env, ctx, outputs)
}
