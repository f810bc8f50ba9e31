use std::collections::BTreeMap;

use crate::card::{Card, CardBehavior, ResourceType, TargetType};
use crate::discount::{effective_card_cost, payment_substitutes};
use crate::env::GameEnv;
use crate::error::{ErrorCategory, ValidationError};
use crate::requirement::{evaluate_generational_requirements, evaluate_requirements};
use crate::resolver::{input_shortfalls, production_shortfalls};
use crate::state::{GameState, PlayerState};

use super::{EntityState, PlayerCardState, cost_error, phase_error};

/// Outcome of [`can_play_card`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardPlayability {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Checks whether `player` may play `card` from hand right now.
///
/// A card missing from the hand yields a single `game-state` error and nothing
/// else is evaluated. Otherwise phase, requirements, generational bounds,
/// on-play inputs and production floors, and affordability are all checked.
/// Affordability only counts what is left after the on-play inputs are taken.
pub fn can_play_card(
    card: &Card,
    game: &GameState,
    player: &PlayerState,
    env: &GameEnv<'_>,
) -> CardPlayability {
    if !player.has_in_hand(&card.id) {
        return CardPlayability {
            valid: false,
            errors: vec![ValidationError::new(
                ErrorCategory::GameState,
                "CARD_NOT_IN_HAND",
                "Card not in player's hand",
            )],
        };
    }

    let mut errors: Vec<ValidationError> = phase_error(game).into_iter().collect();
    errors.extend(evaluate_requirements(
        &card.requirements,
        game,
        player,
        env.cards(),
    ));

    let on_play: Vec<&CardBehavior> = card
        .behaviors
        .iter()
        .filter(|b| b.applies_on_play())
        .collect();
    for behavior in &on_play {
        errors.extend(evaluate_generational_requirements(
            &behavior.generational_event_requirements,
            player,
        ));
    }
    for behavior in &on_play {
        errors.extend(
            input_shortfalls(&behavior.inputs, player, Some(&card.id), env.config())
                .iter()
                .map(|s| s.to_validation_error()),
        );
        errors.extend(
            production_shortfalls(&behavior.outputs, game, player, Some(&card.id), env)
                .iter()
                .map(|s| s.to_validation_error()),
        );
    }

    let (cost, _) = effective_card_cost(player, card);
    let spendable = spendable_value(card, player, env, &reserved_inputs(&on_play));
    if spendable < cost {
        errors.push(cost_error(cost, spendable));
    }

    CardPlayability {
        valid: errors.is_empty(),
        errors,
    }
}

/// Diagnostic state of one hand card: availability, discounted cost and metadata.
pub fn calculate_player_card_state(
    card: &Card,
    player: &PlayerState,
    game: &GameState,
    env: &GameEnv<'_>,
) -> PlayerCardState {
    let playability = can_play_card(card, game, player, env);
    let (cost, discount) = effective_card_cost(player, card);

    let mut metadata = BTreeMap::new();
    if discount != 0 {
        metadata.insert("discount".to_string(), discount);
    }
    let mut costs = BTreeMap::new();
    if cost > 0 {
        costs.insert(ResourceType::Credits, cost);
    }

    PlayerCardState {
        card_id: card.id.clone(),
        state: EntityState {
            errors: playability.errors,
            cost: costs,
            metadata,
            last_calculated: game.revision,
        },
    }
}

/// Basic resources the on-play inputs take from the player's own pool.
fn reserved_inputs(on_play: &[&CardBehavior]) -> BTreeMap<ResourceType, i32> {
    let mut reserved = BTreeMap::new();
    for input in on_play.iter().flat_map(|b| &b.inputs) {
        if input.target == TargetType::SelfPlayer && input.resource_type.production_base().is_none() {
            *reserved.entry(input.resource_type).or_insert(0) += input.amount.max(0);
        }
    }
    reserved
}

/// Most MC the player could put towards this card once `reserved` is set aside.
fn spendable_value(
    card: &Card,
    player: &PlayerState,
    env: &GameEnv<'_>,
    reserved: &BTreeMap<ResourceType, i32>,
) -> i32 {
    let left = |resource: ResourceType| {
        let held = player.resources.get(resource).unwrap_or(0);
        (held - reserved.get(&resource).copied().unwrap_or(0)).max(0)
    };
    let rates = payment_substitutes(player, env.config());
    rates
        .iter()
        .filter(|rate| match rate.resource_type {
            ResourceType::Steel => card.allows_steel(),
            ResourceType::Titanium => card.allows_titanium(),
            _ => true,
        })
        .map(|rate| left(rate.resource_type) * rate.conversion_rate)
        .sum::<i32>()
        + left(ResourceType::Credits)
}
