use std::collections::BTreeMap;

use crate::card::{ResourceCondition, ResourceType, TargetType};
use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::state::{CardId, GameState, PlayerState};

use super::{ResolveContext, ResolveError, Shortfall, ShortfallKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum InputSlot {
    Pool(ResourceType),
    Production(ResourceType),
    Storage(ResourceType),
}

fn slot_of(input: &ResourceCondition) -> Option<InputSlot> {
    let resource = input.resource_type;
    if input.target == TargetType::SelfCard || resource.is_card_storage() {
        Some(InputSlot::Storage(resource))
    } else if resource.is_basic() {
        Some(InputSlot::Pool(resource))
    } else if resource.is_production() {
        Some(InputSlot::Production(resource))
    } else {
        None
    }
}

fn required_by_slot(inputs: &[ResourceCondition]) -> BTreeMap<InputSlot, i32> {
    let mut required = BTreeMap::new();
    for input in inputs {
        if let Some(slot) = slot_of(input) {
            *required.entry(slot).or_insert(0) += input.amount;
        }
    }
    required
}

/// Inputs the player cannot currently pay, summed per resource.
///
/// `self-card` inputs draw from the storage of `source_card`; production
/// inputs may not take a track below its floor.
pub fn input_shortfalls(
    inputs: &[ResourceCondition],
    player: &PlayerState,
    source_card: Option<&CardId>,
    config: &GameConfig,
) -> Vec<Shortfall> {
    required_by_slot(inputs)
        .into_iter()
        .filter(|(_, required)| *required > 0)
        .filter_map(|(slot, required)| {
            let (kind, resource, available) = match slot {
                InputSlot::Pool(resource) => (
                    ShortfallKind::Resource,
                    resource,
                    player.resources.get(resource).unwrap_or(0),
                ),
                InputSlot::Production(resource) => {
                    let floor = resource
                        .production_base()
                        .map_or(0, |base| config.min_production(base));
                    (
                        ShortfallKind::Resource,
                        resource,
                        player.production.get(resource).unwrap_or(0) - floor,
                    )
                }
                InputSlot::Storage(resource) => (
                    ShortfallKind::CardStorage,
                    resource,
                    source_card.map_or(0, |card| player.stored(card)),
                ),
            };
            (available < required).then_some(Shortfall {
                kind,
                resource,
                required,
                available,
            })
        })
        .collect()
}

/// Pays every input, all or nothing.
pub fn apply_inputs(
    state: &mut GameState,
    env: &GameEnv<'_>,
    ctx: &ResolveContext<'_>,
    inputs: &[ResourceCondition],
) -> Result<(), ResolveError> {
    let player = state
        .player_mut(ctx.player_id)
        .ok_or_else(|| ResolveError::PlayerNotFound(ctx.player_id.clone()))?;

    if let Some(shortfall) = input_shortfalls(inputs, player, ctx.source_card, env.config())
        .into_iter()
        .next()
    {
        return Err(shortfall.into());
    }

    for (slot, amount) in required_by_slot(inputs) {
        match slot {
            InputSlot::Pool(resource) => {
                player.resources.add(resource, -amount);
            }
            InputSlot::Production(resource) => {
                player.production.add(resource, -amount);
            }
            InputSlot::Storage(_) => {
                if let Some(card) = ctx.source_card {
                    *player.card_storage.entry(card.clone()).or_insert(0) -= amount;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::CardSnapshot;
    use crate::resolver::BehaviorTargets;
    use crate::state::PlayerId;

    #[test]
    fn inputs_are_summed_per_resource() {
        let config = GameConfig::default();
        let mut player = PlayerState::new("p1", "Ann", 20);
        player.resources.energy = 3;
        let inputs = [
            ResourceCondition::new(ResourceType::Energy, 2),
            ResourceCondition::new(ResourceType::Energy, 2),
        ];
        let shortfalls = input_shortfalls(&inputs, &player, None, &config);
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].required, 4);
        assert_eq!(shortfalls[0].available, 3);
        assert_eq!(shortfalls[0].to_validation_error().message, "Need 4 energy, have 3");
    }

    #[test]
    fn self_card_inputs_read_card_storage() {
        let config = GameConfig::default();
        let mut player = PlayerState::new("p1", "Ann", 20);
        let card = CardId::from("tardigrades");
        player.card_storage.insert(card.clone(), 1);
        let inputs = [ResourceCondition::new(ResourceType::Microbe, 2).target(TargetType::SelfCard)];

        let shortfalls = input_shortfalls(&inputs, &player, Some(&card), &config);
        assert_eq!(shortfalls[0].kind, ShortfallKind::CardStorage);
        assert_eq!(shortfalls[0].available, 1);

        player.card_storage.insert(card.clone(), 2);
        assert!(input_shortfalls(&inputs, &player, Some(&card), &config).is_empty());
    }

    #[test]
    fn apply_deducts_only_when_everything_is_covered() {
        let config = GameConfig::default();
        let cards = CardSnapshot::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = GameState::default();
        let mut player = PlayerState::new("p1", "Ann", 20);
        player.resources.heat = 5;
        player.resources.plants = 1;
        state.add_player(player).unwrap();

        let id = PlayerId::from("p1");
        let targets = BehaviorTargets::default();
        let ctx = ResolveContext::for_project(&id, "test", &targets);
        let inputs = [
            ResourceCondition::new(ResourceType::Heat, 3),
            ResourceCondition::new(ResourceType::Plants, 2),
        ];
        assert!(apply_inputs(&mut state, &env, &ctx, &inputs).is_err());
        assert_eq!(state.players[&id].resources.heat, 5);

        apply_inputs(&mut state, &env, &ctx, &inputs[..1]).unwrap();
        assert_eq!(state.players[&id].resources.heat, 2);
    }
}
