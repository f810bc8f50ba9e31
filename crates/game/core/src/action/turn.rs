use crate::engine::{SkipOutcome, TurnError, ensure_can_skip, skip_action};
use crate::env::GameEnv;
use crate::state::{GameState, PlayerId};

use super::ActionTransition;

/// Ends the turn, passing for the generation if no action was taken.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SkipAction {
    pub player_id: PlayerId,
}

impl SkipAction {
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
        }
    }
}

impl ActionTransition for SkipAction {
    type Error = TurnError;
    type Result = SkipOutcome;

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn pre_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_can_skip(state, &self.player_id).map(|_| ())
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<SkipOutcome, Self::Error> {
        skip_action(state, env.config(), &self.player_id)
    }
}
