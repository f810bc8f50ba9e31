use tracing::debug;

use crate::card::{
    Card, ResourceCondition, ResourceTriggerCondition, ResourceTriggerType, StandardProject,
    TargetType, TileType, TriggerEvent,
};
use crate::env::GameEnv;
use crate::state::{CardId, GameState, GlobalParameter, PlayerId};

use super::{BehaviorTargets, ResolveContext, ResolveError, apply_outputs};

/// Something that happened during an action that conditional effects may react to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "kebab-case")
)]
pub enum Occurrence {
    CardPlayed { player: PlayerId, card: CardId },
    TilePlaced { player: PlayerId, tile: TileType },
    ParameterRaised { player: PlayerId, parameter: GlobalParameter },
    StandardProjectPlayed { player: PlayerId, project: StandardProject },
}

impl Occurrence {
    pub fn player(&self) -> &PlayerId {
        match self {
            Self::CardPlayed { player, .. }
            | Self::TilePlaced { player, .. }
            | Self::ParameterRaised { player, .. }
            | Self::StandardProjectPlayed { player, .. } => player,
        }
    }
}

struct Firing {
    owner: PlayerId,
    card: CardId,
    outputs: Vec<ResourceCondition>,
    times: u32,
}

/// Fires every registered conditional effect matching `occurrence`.
///
/// Occurrences produced by the fired outputs themselves are not fed back in,
/// so effects never chain. Returns the number of firings.
pub fn fire_triggers(
    state: &mut GameState,
    env: &GameEnv<'_>,
    occurrence: &Occurrence,
) -> Result<u32, ResolveError> {
    let played = match occurrence {
        Occurrence::CardPlayed { card, .. } => env.cards().get_by_id(card),
        _ => None,
    };

    let mut firings = Vec::new();
    for owner in state.players_in_order() {
        for effect in &owner.effects {
            if matches!(occurrence, Occurrence::CardPlayed { card, .. } if *card == effect.card_id)
            {
                continue;
            }
            let times = effect
                .behavior
                .triggers
                .iter()
                .filter(|t| t.trigger_type == ResourceTriggerType::Auto)
                .filter_map(|t| t.condition.as_ref())
                .map(|condition| match_count(condition, occurrence, &owner.id, played))
                .max()
                .unwrap_or(0);
            if times == 0 {
                continue;
            }

            let cap = effect
                .behavior
                .outputs
                .iter()
                .filter_map(|o| o.max_trigger)
                .filter_map(|max| u32::try_from(max).ok())
                .filter(|max| *max > 0)
                .min();
            firings.push(Firing {
                owner: owner.id.clone(),
                card: effect.card_id.clone(),
                outputs: effect
                    .behavior
                    .outputs
                    .iter()
                    .filter(|o| !o.is_persistent_modifier())
                    .cloned()
                    .collect(),
                times: cap.map_or(times, |cap| times.min(cap)),
            });
        }
    }

    let targets = BehaviorTargets::default();
    let mut fired = 0;
    for firing in firings {
        let ctx = ResolveContext::for_card(&firing.owner, &firing.card, &targets);
        for _ in 0..firing.times {
            apply_outputs(state, env, &ctx, &firing.outputs)?;
        }
        debug!(
            target: "core::resolver",
            player_id = %firing.owner,
            card_id = %firing.card,
            times = firing.times,
            "triggered effect fired"
        );
        fired += firing.times;
    }
    Ok(fired)
}

/// How many times a condition fires for one occurrence. Zero means no match.
fn match_count(
    condition: &ResourceTriggerCondition,
    occurrence: &Occurrence,
    owner: &PlayerId,
    played: Option<&Card>,
) -> u32 {
    let own = occurrence.player() == owner;
    let in_scope = match condition.target {
        Some(TargetType::SelfPlayer) => own,
        Some(TargetType::Opponent) => !own,
        _ => true,
    };
    if !in_scope {
        return 0;
    }

    match (condition.event, occurrence) {
        (TriggerEvent::CardPlayed, Occurrence::CardPlayed { .. }) => {
            let Some(card) = played else {
                return 0;
            };
            let tags_ok = condition.affected_tags.is_empty()
                || card.tags.iter().any(|t| condition.affected_tags.contains(t));
            let type_ok = condition.affected_card_types.is_empty()
                || condition.affected_card_types.contains(&card.card_type);
            let cost_ok = condition
                .required_original_cost
                .is_none_or(|bounds| bounds.contains(card.cost));
            u32::from(tags_ok && type_ok && cost_ok)
        }
        (TriggerEvent::TagPlayed, Occurrence::CardPlayed { .. }) => played.map_or(0, |card| {
            card.tags
                .iter()
                .filter(|t| condition.affected_tags.is_empty() || condition.affected_tags.contains(t))
                .count() as u32
        }),
        (TriggerEvent::TilePlaced, Occurrence::TilePlaced { .. }) => 1,
        (TriggerEvent::OceanPlaced, Occurrence::TilePlaced { tile, .. }) => {
            u32::from(*tile == TileType::Ocean)
        }
        (TriggerEvent::CityPlaced, Occurrence::TilePlaced { tile, .. }) => {
            u32::from(*tile == TileType::City)
        }
        (TriggerEvent::GreeneryPlaced, Occurrence::TilePlaced { tile, .. }) => {
            u32::from(*tile == TileType::Greenery)
        }
        (TriggerEvent::TemperatureRaise, Occurrence::ParameterRaised { parameter, .. }) => {
            u32::from(*parameter == GlobalParameter::Temperature)
        }
        (TriggerEvent::OxygenRaise, Occurrence::ParameterRaised { parameter, .. }) => {
            u32::from(*parameter == GlobalParameter::Oxygen)
        }
        (TriggerEvent::StandardProjectPlayed, Occurrence::StandardProjectPlayed { .. }) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardBehavior, CardTag, CardType, MinMax, ResourceType, Trigger};
    use crate::config::GameConfig;
    use crate::env::CardSnapshot;
    use crate::state::{CardEffect, PlayerState};

    fn effect(card: &str, condition: ResourceTriggerCondition, output: ResourceCondition) -> CardEffect {
        CardEffect {
            card_id: card.into(),
            card_name: card.into(),
            behavior_index: 0,
            behavior: CardBehavior::new()
                .with_trigger(Trigger::on(condition))
                .with_output(output),
        }
    }

    fn game_with(effects: Vec<CardEffect>) -> GameState {
        let mut state = GameState::default();
        let mut ann = PlayerState::new("p1", "Ann", 20);
        ann.effects = effects;
        state.add_player(ann).unwrap();
        state.add_player(PlayerState::new("p2", "Bo", 20)).unwrap();
        state
    }

    #[test]
    fn tag_played_fires_once_per_matching_tag() {
        let cards = CardSnapshot::new([Card::new("sat", "Satellites", CardType::Automated, 10)
            .with_tags([CardTag::Space, CardTag::Space, CardTag::Earth])]);
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);

        let mut condition = ResourceTriggerCondition::new(TriggerEvent::TagPlayed);
        condition.affected_tags = vec![CardTag::Space];
        condition.target = Some(TargetType::SelfPlayer);
        let mut state = game_with(vec![effect(
            "optimal",
            condition,
            ResourceCondition::new(ResourceType::Credits, 2),
        )]);

        let own = Occurrence::CardPlayed {
            player: "p1".into(),
            card: "sat".into(),
        };
        assert_eq!(fire_triggers(&mut state, &env, &own).unwrap(), 2);
        assert_eq!(state.players[&PlayerId::from("p1")].resources.credits, 4);

        let theirs = Occurrence::CardPlayed {
            player: "p2".into(),
            card: "sat".into(),
        };
        assert_eq!(fire_triggers(&mut state, &env, &theirs).unwrap(), 0);
    }

    #[test]
    fn card_played_respects_cost_bounds_and_max_trigger() {
        let cards = CardSnapshot::new([
            Card::new("big", "Big", CardType::Automated, 20),
            Card::new("small", "Small", CardType::Automated, 5),
        ]);
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);

        let mut condition = ResourceTriggerCondition::new(TriggerEvent::CardPlayed);
        condition.required_original_cost = Some(MinMax::new(Some(20), None));
        let mut state = game_with(vec![effect(
            "standard-tech",
            condition,
            ResourceCondition::new(ResourceType::Plants, 1),
        )]);

        let small = Occurrence::CardPlayed {
            player: "p2".into(),
            card: "small".into(),
        };
        assert_eq!(fire_triggers(&mut state, &env, &small).unwrap(), 0);
        let big = Occurrence::CardPlayed {
            player: "p2".into(),
            card: "big".into(),
        };
        assert_eq!(fire_triggers(&mut state, &env, &big).unwrap(), 1);
        assert_eq!(state.players[&PlayerId::from("p1")].resources.plants, 1);
    }

    #[test]
    fn tile_events_match_by_type() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game_with(vec![effect(
            "arctic-algae",
            ResourceTriggerCondition::new(TriggerEvent::OceanPlaced),
            ResourceCondition::new(ResourceType::Plants, 2),
        )]);

        let city = Occurrence::TilePlaced {
            player: "p2".into(),
            tile: TileType::City,
        };
        assert_eq!(fire_triggers(&mut state, &env, &city).unwrap(), 0);
        let ocean = Occurrence::TilePlaced {
            player: "p2".into(),
            tile: TileType::Ocean,
        };
        assert_eq!(fire_triggers(&mut state, &env, &ocean).unwrap(), 1);
        assert_eq!(state.players[&PlayerId::from("p1")].resources.plants, 2);
    }
}
