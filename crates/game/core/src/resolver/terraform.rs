use tracing::debug;

use crate::card::TileType;
use crate::config::GameConfig;
use crate::state::{GameState, GlobalParameter, PlacedTile, PlayerId};

use super::{Occurrence, ResolveError};

/// Raises a global parameter for `player_id`, clamped at its maximum.
///
/// Every step actually taken adds one TR to the player. Returns the steps taken.
pub fn raise_parameter(
    state: &mut GameState,
    config: &GameConfig,
    player_id: &PlayerId,
    parameter: GlobalParameter,
    steps: i32,
) -> Result<i32, ResolveError> {
    if !state.players.contains_key(player_id) {
        return Err(ResolveError::PlayerNotFound(player_id.clone()));
    }
    if steps <= 0 {
        return Ok(0);
    }

    let taken = state.global_parameters.raise(parameter, steps, config);
    if taken < steps {
        debug!(
            target: "core::resolver",
            player_id = %player_id,
            parameter = %parameter,
            requested = steps,
            taken,
            "global parameter clamped at maximum"
        );
    }
    if let Some(player) = state.player_mut(player_id) {
        player.terraform_rating += taken;
    }
    Ok(taken)
}

/// Records a tile for `player_id` and applies its global effect.
///
/// Oceans raise the ocean count and greeneries raise oxygen, each with TR.
/// A maxed parameter still lets the tile be placed.
pub fn place_tile(
    state: &mut GameState,
    config: &GameConfig,
    player_id: &PlayerId,
    tile_type: TileType,
) -> Result<Vec<Occurrence>, ResolveError> {
    if !state.players.contains_key(player_id) {
        return Err(ResolveError::PlayerNotFound(player_id.clone()));
    }

    state.board.tiles.push(PlacedTile {
        tile_type,
        owner: Some(player_id.clone()),
    });

    let mut occurrences = vec![Occurrence::TilePlaced {
        player: player_id.clone(),
        tile: tile_type,
    }];

    let parameter = match tile_type {
        TileType::Ocean => Some(GlobalParameter::Oceans),
        TileType::Greenery => Some(GlobalParameter::Oxygen),
        TileType::City => None,
    };
    if let Some(parameter) = parameter
        && raise_parameter(state, config, player_id, parameter, 1)? > 0
    {
        occurrences.push(Occurrence::ParameterRaised {
            player: player_id.clone(),
            parameter,
        });
    }
    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PlayerState;

    fn solo() -> (GameState, PlayerId) {
        let mut state = GameState::default();
        state.add_player(PlayerState::new("p1", "Ann", 20)).unwrap();
        (state, PlayerId::from("p1"))
    }

    #[test]
    fn each_step_taken_raises_tr() {
        let config = GameConfig::default();
        let (mut state, id) = solo();
        state.global_parameters.temperature = 4;
        let taken = raise_parameter(&mut state, &config, &id, GlobalParameter::Temperature, 3).unwrap();
        assert_eq!(taken, 2);
        assert_eq!(state.global_parameters.temperature, 8);
        assert_eq!(state.players[&id].terraform_rating, 22);
    }

    #[test]
    fn ocean_on_full_board_gives_no_tr() {
        let config = GameConfig::default();
        let (mut state, id) = solo();

        let occurrences = place_tile(&mut state, &config, &id, TileType::Ocean).unwrap();
        assert_eq!(occurrences.len(), 2);
        assert_eq!(state.global_parameters.oceans, 1);
        assert_eq!(state.players[&id].terraform_rating, 21);

        state.global_parameters.oceans = config.max_oceans;
        let occurrences = place_tile(&mut state, &config, &id, TileType::Ocean).unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(state.players[&id].terraform_rating, 21);
        assert_eq!(state.board.count(TileType::Ocean, None), 2);
    }

    #[test]
    fn city_changes_no_parameter() {
        let config = GameConfig::default();
        let (mut state, id) = solo();
        place_tile(&mut state, &config, &id, TileType::City).unwrap();
        assert_eq!(state.board.count(TileType::City, Some(&id)), 1);
        assert_eq!(state.players[&id].terraform_rating, 20);
    }
}
