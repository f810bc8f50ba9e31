use crate::state::{GameState, GameStatus, GlobalParameter, PlayerState};

use super::DomainEvent;

/// Derives domain events from the difference between two snapshots.
///
/// Ordering: phase and generation first, then per-player changes in turn
/// order, then board and global parameters, then the turn pointer, and
/// finally `GameEnded`.
pub fn extract_events(before: &GameState, after: &GameState) -> Vec<DomainEvent> {
    let mut events = Vec::new();

    if before.current_phase != after.current_phase {
        events.push(DomainEvent::PhaseChanged {
            old: before.current_phase,
            new: after.current_phase,
        });
    }
    if after.generation > before.generation && before.generation > 0 {
        events.push(DomainEvent::GenerationAdvanced {
            generation: after.generation,
        });
    }

    for player in after.players_in_order() {
        match before.player(&player.id) {
            Some(old) => player_events(old, player, &mut events),
            None => events.extend(player.hand.iter().map(|card| DomainEvent::CardAddedToHand {
                player_id: player.id.clone(),
                card_id: card.clone(),
            })),
        }
    }

    for tile in after.board.tiles.iter().skip(before.board.tiles.len()) {
        events.push(DomainEvent::TilePlaced {
            player_id: tile.owner.clone(),
            tile_type: tile.tile_type,
        });
    }

    for parameter in [
        GlobalParameter::Temperature,
        GlobalParameter::Oxygen,
        GlobalParameter::Oceans,
        GlobalParameter::Venus,
    ] {
        let old = before.global_parameters.get(parameter);
        let new = after.global_parameters.get(parameter);
        if old != new {
            events.push(DomainEvent::GlobalParameterChanged { parameter, old, new });
        }
    }

    if before.current_turn != after.current_turn {
        events.push(DomainEvent::TurnChanged {
            player_id: after.current_turn.as_ref().map(|t| t.player_id.clone()),
            actions_remaining: after.current_turn.as_ref().map(|t| t.actions_remaining),
        });
    }

    if before.status != GameStatus::Finished && after.status == GameStatus::Finished {
        events.push(DomainEvent::GameEnded);
    }

    events
}

fn player_events(before: &PlayerState, after: &PlayerState, events: &mut Vec<DomainEvent>) {
    let player_id = &after.id;

    for card in after.hand.iter().filter(|c| !before.hand.contains(c)) {
        events.push(DomainEvent::CardAddedToHand {
            player_id: player_id.clone(),
            card_id: card.clone(),
        });
    }
    for card in before.hand.iter().filter(|c| !after.hand.contains(c)) {
        events.push(DomainEvent::CardRemovedFromHand {
            player_id: player_id.clone(),
            card_id: card.clone(),
        });
    }
    for card in after.played_cards.iter().skip(before.played_cards.len()) {
        events.push(DomainEvent::CardPlayed {
            player_id: player_id.clone(),
            card_id: card.clone(),
        });
    }

    if before.resources != after.resources || before.card_storage != after.card_storage {
        events.push(DomainEvent::ResourcesChanged {
            player_id: player_id.clone(),
        });
    }
    if before.production != after.production {
        events.push(DomainEvent::ProductionChanged {
            player_id: player_id.clone(),
        });
    }
    if before.effects != after.effects
        || before.actions != after.actions
        || before.value_modifiers != after.value_modifiers
        || before.payment_substitutes != after.payment_substitutes
    {
        events.push(DomainEvent::EffectsChanged {
            player_id: player_id.clone(),
        });
    }
    if before.terraform_rating != after.terraform_rating {
        events.push(DomainEvent::TerraformRatingChanged {
            player_id: player_id.clone(),
            old: before.terraform_rating,
            new: after.terraform_rating,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::TileType;
    use crate::state::{GamePhase, PlacedTile, PlayerId};

    fn two_players() -> GameState {
        let mut state = GameState::default();
        state.add_player(PlayerState::new("p1", "Ann", 20)).unwrap();
        state.add_player(PlayerState::new("p2", "Bo", 20)).unwrap();
        state
    }

    #[test]
    fn unchanged_state_yields_nothing() {
        let state = two_players();
        assert!(extract_events(&state, &state.clone()).is_empty());
    }

    #[test]
    fn hand_moves_and_terraforming() {
        let mut before = two_players();
        before
            .player_mut(&PlayerId::from("p1"))
            .unwrap()
            .hand
            .push("comet".into());

        let mut after = before.clone();
        let p1 = after.player_mut(&PlayerId::from("p1")).unwrap();
        p1.hand.clear();
        p1.played_cards.push("comet".into());
        p1.terraform_rating = 21;
        after.global_parameters.temperature += 2;
        after.board.tiles.push(PlacedTile {
            tile_type: TileType::Ocean,
            owner: Some("p1".into()),
        });

        let events = extract_events(&before, &after);
        assert_eq!(
            events,
            vec![
                DomainEvent::CardRemovedFromHand {
                    player_id: "p1".into(),
                    card_id: "comet".into(),
                },
                DomainEvent::CardPlayed {
                    player_id: "p1".into(),
                    card_id: "comet".into(),
                },
                DomainEvent::TerraformRatingChanged {
                    player_id: "p1".into(),
                    old: 20,
                    new: 21,
                },
                DomainEvent::TilePlaced {
                    player_id: Some("p1".into()),
                    tile_type: TileType::Ocean,
                },
                DomainEvent::GlobalParameterChanged {
                    parameter: GlobalParameter::Temperature,
                    old: -30,
                    new: -28,
                },
            ]
        );
    }

    #[test]
    fn phase_and_end_of_game() {
        let before = two_players();
        let mut after = before.clone();
        after.current_phase = GamePhase::Complete;
        after.status = GameStatus::Finished;

        let events = extract_events(&before, &after);
        assert_eq!(events.first(), Some(&DomainEvent::PhaseChanged {
            old: GamePhase::WaitingForStart,
            new: GamePhase::Complete,
        }));
        assert_eq!(events.last(), Some(&DomainEvent::GameEnded));
    }
}
