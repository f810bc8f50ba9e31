use crate::card::TileType;
use crate::state::GenerationalEvent;

use super::{DispatchContext, DomainEvent, EventKinds, EventSubscriber};

/// Counts per-generation occurrences on the player they belong to.
///
/// A TR increase counts one `tr-raise` per step gained; a placed ocean, city or greenery
/// counts one of the matching placement events for the tile's owner. The
/// counters themselves are reset by the generation advance.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenerationalEventTracker;

impl GenerationalEventTracker {
    fn classify(event: &DomainEvent) -> Option<(GenerationalEvent, i32)> {
        match event {
            DomainEvent::TerraformRatingChanged { old, new, .. } if new > old => {
                Some((GenerationalEvent::TrRaise, new - old))
            }
            DomainEvent::TilePlaced { tile_type, .. } => match tile_type {
                TileType::Ocean => Some((GenerationalEvent::OceanPlacement, 1)),
                TileType::City => Some((GenerationalEvent::CityPlacement, 1)),
                TileType::Greenery => Some((GenerationalEvent::GreeneryPlacement, 1)),
            },
            _ => None,
        }
    }
}

impl EventSubscriber for GenerationalEventTracker {
    fn name(&self) -> &'static str {
        "generational-event-tracker"
    }

    fn interests(&self) -> EventKinds {
        EventKinds::TERRAFORM_RATING | EventKinds::TILE_PLACED
    }

    fn on_event(&mut self, event: &DomainEvent, ctx: &mut DispatchContext<'_>) {
        let Some((counted, n)) = Self::classify(event) else {
            return;
        };
        let Some(player_id) = event.player_id().cloned() else {
            return;
        };
        if let Some(player) = ctx.state_mut().player_mut(&player_id) {
            player.generational_events.add(counted, n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::env::{CardSnapshot, GameEnv};
    use crate::events::EventDispatcher;
    use crate::state::{GameState, PlayerId, PlayerState};

    #[test]
    fn counts_n_events_and_ignores_decreases() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = GameState::default();
        state.add_player(PlayerState::new("p1", "Ann", 20)).unwrap();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(Box::new(GenerationalEventTracker));

        let raise = DomainEvent::TerraformRatingChanged {
            player_id: "p1".into(),
            old: 20,
            new: 21,
        };
        let drop = DomainEvent::TerraformRatingChanged {
            player_id: "p1".into(),
            old: 21,
            new: 20,
        };
        let ocean = DomainEvent::TilePlaced {
            player_id: Some("p1".into()),
            tile_type: TileType::Ocean,
        };
        dispatcher.publish_all(&[raise.clone(), raise, drop, ocean], &mut state, env);

        let counters = &state.players[&PlayerId::from("p1")].generational_events;
        assert_eq!(counters.count(GenerationalEvent::TrRaise), 2);
        assert_eq!(counters.count(GenerationalEvent::OceanPlacement), 1);
        assert_eq!(counters.count(GenerationalEvent::CityPlacement), 0);
    }

    #[test]
    fn a_multi_step_raise_counts_every_step() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = GameState::default();
        state.add_player(PlayerState::new("p1", "Ann", 20)).unwrap();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(Box::new(GenerationalEventTracker));

        let jump = DomainEvent::TerraformRatingChanged {
            player_id: "p1".into(),
            old: 20,
            new: 23,
        };
        dispatcher.publish_all(&[jump], &mut state, env);

        let counters = &state.players[&PlayerId::from("p1")].generational_events;
        assert_eq!(counters.count(GenerationalEvent::TrRaise), 3);
    }
}
