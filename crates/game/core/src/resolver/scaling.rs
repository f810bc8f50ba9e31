use std::collections::BTreeMap;
use std::str::FromStr;

use crate::card::{
    CardTag, PerCondition, RequirementLocation, ResourceCondition, ResourceType, TargetType,
    TileType,
};
use crate::env::{CardOracle, GameEnv};
use crate::requirement::count_tags;
use crate::state::{CardId, GameState, PlayerState};

use super::{Shortfall, ShortfallKind};

/// Output amount after per-condition scaling:
/// `amount × floor(counted / per.amount)`.
///
/// A per-condition with a non-positive divisor is ignored.
pub fn scaled_amount(
    condition: &ResourceCondition,
    game: &GameState,
    player: &PlayerState,
    source_card: Option<&CardId>,
    cards: &dyn CardOracle,
) -> i32 {
    match &condition.per {
        Some(per) if per.amount > 0 => {
            let counted = count_per(per, game, player, source_card, cards);
            condition.amount * (counted / per.amount)
        }
        _ => condition.amount,
    }
}

/// Counts the quantity a per-condition refers to.
pub fn count_per(
    per: &PerCondition,
    game: &GameState,
    player: &PlayerState,
    source_card: Option<&CardId>,
    cards: &dyn CardOracle,
) -> i32 {
    if per.target == Some(TargetType::SelfCard) {
        return source_card.map_or(0, |card| player.stored(card));
    }

    let everyone = per.location == Some(RequirementLocation::Anywhere)
        || per.target == Some(TargetType::AnyPlayer);

    if let Some(tag) = per.tag {
        return count_tag_scope(tag, everyone, game, player, cards);
    }

    match per.resource_type {
        ResourceType::Ocean | ResourceType::OceanPlacement => {
            game.board.count(TileType::Ocean, None)
        }
        ResourceType::CityPlacement | ResourceType::GreeneryPlacement => {
            let tile = per.resource_type.tile_placement().unwrap_or(TileType::City);
            let own = per.target == Some(TargetType::SelfPlayer)
                || per.location == Some(RequirementLocation::Owned);
            game.board.count(tile, own.then_some(&player.id))
        }
        resource if resource.is_basic() || resource.is_production() || resource == ResourceType::Tr => {
            player.quantity(resource).unwrap_or(0)
        }
        resource => CardTag::from_str(resource.as_ref())
            .map(|tag| count_tag_scope(tag, everyone, game, player, cards))
            .unwrap_or(0),
    }
}

fn count_tag_scope(
    tag: CardTag,
    everyone: bool,
    game: &GameState,
    player: &PlayerState,
    cards: &dyn CardOracle,
) -> i32 {
    if everyone {
        game.players
            .values()
            .map(|p| count_tags(p, tag, cards))
            .sum()
    } else {
        count_tags(player, tag, cards)
    }
}

/// Production tracks the actor's own outputs would push below their floor.
///
/// Outputs aimed at other players are clamped on application instead.
pub fn production_shortfalls(
    outputs: &[ResourceCondition],
    game: &GameState,
    player: &PlayerState,
    source_card: Option<&CardId>,
    env: &GameEnv<'_>,
) -> Vec<Shortfall> {
    let mut deltas: BTreeMap<ResourceType, i32> = BTreeMap::new();
    for output in outputs {
        if !output.resource_type.is_production()
            || !matches!(output.target, TargetType::SelfPlayer | TargetType::None)
        {
            continue;
        }
        let amount = scaled_amount(output, game, player, source_card, env.cards());
        *deltas.entry(output.resource_type).or_insert(0) += amount;
    }

    deltas
        .into_iter()
        .filter(|(_, delta)| *delta < 0)
        .filter_map(|(resource, delta)| {
            let base = resource.production_base()?;
            let minimum = env.config().min_production(base);
            let resulting = player.production.get(resource)? + delta;
            (resulting < minimum).then_some(Shortfall {
                kind: ShortfallKind::Production,
                resource,
                required: minimum,
                available: resulting,
            })
        })
        .collect()
}
