use crate::card::TileType;
use crate::engine::auto_advance_turn_if_needed;
use crate::env::GameEnv;
use crate::resolver::place_tile;
use crate::state::{GameState, PlayerId};

use super::{
    ActionError, ActionTransition, Resolution, ensure_active, fire_all, player_of, player_of_mut,
};

/// Places the tile at the head of the player's placement queue.
///
/// Placing is part of the action that queued it, so no further action is
/// consumed; the turn may advance once the queue is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PlaceTileAction {
    pub player_id: PlayerId,
    pub tile_type: TileType,
}

impl PlaceTileAction {
    pub fn new(player_id: impl Into<PlayerId>, tile_type: TileType) -> Self {
        Self {
            player_id: player_id.into(),
            tile_type,
        }
    }
}

impl ActionTransition for PlaceTileAction {
    type Error = ActionError;
    type Result = Resolution;

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn pre_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_active(state)?;
        let player = player_of(state, &self.player_id)?;
        let pending = player
            .pending_tile_selections
            .front()
            .ok_or_else(|| ActionError::NoPendingTile(self.player_id.clone()))?;
        if pending.tile_type != self.tile_type {
            return Err(ActionError::TileMismatch {
                expected: pending.tile_type,
                requested: self.tile_type,
            });
        }
        Ok(())
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<Resolution, Self::Error> {
        player_of_mut(state, &self.player_id)?
            .pending_tile_selections
            .pop_front()
            .ok_or_else(|| ActionError::NoPendingTile(self.player_id.clone()))?;

        let occurrences = place_tile(state, env.config(), &self.player_id, self.tile_type)?;
        let triggers_fired = fire_all(state, env, &occurrences)?;

        auto_advance_turn_if_needed(state, env.config());
        Ok(Resolution {
            calculated: Vec::new(),
            triggers_fired,
        })
    }
}
