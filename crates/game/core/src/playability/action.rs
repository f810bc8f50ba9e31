use std::collections::BTreeMap;

use crate::card::{CardBehavior, ResourceCondition};
use crate::env::GameEnv;
use crate::error::{ErrorCategory, ValidationError};
use crate::requirement::evaluate_generational_requirements;
use crate::resolver::{Shortfall, input_shortfalls, production_shortfalls};
use crate::state::{CardId, GameState, PlayerState};

use super::{EntityState, PlayerCardActionState, phase_error, turn_errors};

/// Card actions may be used once per generation.
pub const MAX_ACTION_USES_PER_GENERATION: u32 = 1;

/// Diagnostic state of a repeatable card action.
///
/// With choices present the action is available when at least one choice
/// can be afforded on top of the base inputs; `metadata["playableChoices"]`
/// counts them.
pub fn calculate_player_card_action_state(
    card_id: &CardId,
    behavior_index: usize,
    behavior: &CardBehavior,
    times_used: u32,
    player: &PlayerState,
    game: &GameState,
    env: &GameEnv<'_>,
) -> PlayerCardActionState {
    let mut errors: Vec<ValidationError> = phase_error(game).into_iter().collect();
    errors.extend(turn_errors(game, player));

    if times_used >= MAX_ACTION_USES_PER_GENERATION {
        errors.push(
            ValidationError::new(
                ErrorCategory::Availability,
                "ACTION_ALREADY_USED",
                "Action already used this generation",
            )
            .with_values(MAX_ACTION_USES_PER_GENERATION as i32, times_used as i32),
        );
    }

    errors.extend(evaluate_generational_requirements(
        &behavior.generational_event_requirements,
        player,
    ));

    let shortfalls = |inputs: &[ResourceCondition], outputs: &[ResourceCondition]| {
        let mut found = input_shortfalls(inputs, player, Some(card_id), env.config());
        found.extend(production_shortfalls(outputs, game, player, Some(card_id), env));
        found
    };

    errors.extend(
        shortfalls(&behavior.inputs, &behavior.outputs)
            .iter()
            .map(Shortfall::to_validation_error),
    );

    let mut metadata = BTreeMap::new();
    metadata.insert("timesUsed".to_string(), times_used as i32);
    if !behavior.choices.is_empty() {
        let playable = (0..behavior.choices.len())
            .filter(|index| {
                behavior
                    .extract_inputs_outputs(Some(*index))
                    .is_ok_and(|resolved| shortfalls(&resolved.inputs, &resolved.outputs).is_empty())
            })
            .count();
        metadata.insert("playableChoices".to_string(), playable as i32);
        if playable == 0 {
            errors.push(ValidationError::new(
                ErrorCategory::Input,
                "INPUT_NO_AFFORDABLE_CHOICE",
                "No choice can be afforded",
            ));
        }
    }

    let mut cost = BTreeMap::new();
    for input in &behavior.inputs {
        *cost.entry(input.resource_type).or_insert(0) += input.amount;
    }

    PlayerCardActionState {
        card_id: Some(card_id.clone()),
        behavior_index: Some(behavior_index),
        project: None,
        state: EntityState {
            errors,
            cost,
            metadata,
            last_calculated: game.revision,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Choice, ResourceType, TargetType, Trigger};
    use crate::config::GameConfig;
    use crate::env::CardSnapshot;
    use crate::state::{ActionAllowance, GamePhase, TurnState};

    fn my_turn(player: &PlayerState) -> GameState {
        let mut game = GameState::default();
        game.current_phase = GamePhase::Action;
        game.current_turn = Some(TurnState::new(player.id.clone(), ActionAllowance::Limited(2)));
        game
    }

    #[test]
    fn used_action_is_unavailable_until_reset() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let player = PlayerState::new("p1", "Ann", 20);
        let game = my_turn(&player);
        let behavior = CardBehavior::new()
            .with_trigger(Trigger::manual())
            .with_output(ResourceCondition::new(ResourceType::Credits, 1));
        let card = CardId::from("bank");

        let fresh = calculate_player_card_action_state(&card, 0, &behavior, 0, &player, &game, &env);
        assert!(fresh.available());
        let used = calculate_player_card_action_state(&card, 0, &behavior, 1, &player, &game, &env);
        assert_eq!(used.state.errors[0].code, "ACTION_ALREADY_USED");
    }

    #[test]
    fn storage_inputs_and_choices() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut player = PlayerState::new("p1", "Ann", 20);
        let card = CardId::from("regolith-eaters");
        player.card_storage.insert(card.clone(), 1);
        let game = my_turn(&player);

        let behavior = CardBehavior::new()
            .with_trigger(Trigger::manual())
            .with_choice(Choice {
                inputs: vec![],
                outputs: vec![
                    ResourceCondition::new(ResourceType::Microbe, 1).target(TargetType::SelfCard),
                ],
            })
            .with_choice(Choice {
                inputs: vec![
                    ResourceCondition::new(ResourceType::Microbe, 2).target(TargetType::SelfCard),
                ],
                outputs: vec![ResourceCondition::new(ResourceType::Oxygen, 1)],
            });

        let state = calculate_player_card_action_state(&card, 0, &behavior, 0, &player, &game, &env);
        assert!(state.available());
        assert_eq!(state.state.metadata.get("playableChoices"), Some(&1));
    }

    #[test]
    fn other_players_turn_and_pending_tiles_block() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut player = PlayerState::new("p1", "Ann", 20);
        let other = PlayerState::new("p2", "Bo", 20);
        let game = my_turn(&other);
        player
            .pending_tile_selections
            .push_back(crate::state::PendingTileSelection {
                tile_type: crate::card::TileType::City,
                source: "city".into(),
            });
        let behavior = CardBehavior::new().with_trigger(Trigger::manual());

        let state =
            calculate_player_card_action_state(&"c".into(), 0, &behavior, 0, &player, &game, &env);
        let codes: Vec<_> = state.state.errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, ["TURN_NOT_YOUR_TURN", "TURN_PENDING_TILE_PLACEMENT"]);
    }
}
