//! Authoritative game state aggregate.
//!
//! [`GameState`] is owned by exactly one writer at a time (the per-game worker
//! in the runtime). Calculators read it by shared reference; every mutation
//! goes through [`crate::engine::GameEngine`].
mod effects;
mod generational;
mod global;
mod ids;
mod player;
mod resources;
mod turn;

use std::collections::BTreeMap;

pub use effects::{
    CardAction, CardEffect, ForcedFirstAction, PendingCardSelection, PendingTileSelection,
};
pub use generational::{GenerationalEvent, GenerationalEventCounters};
pub use global::{Board, GlobalParameter, GlobalParameters, PlacedTile};
pub use ids::{CardId, GameId, PlayerId};
pub use player::{PaymentSubstitute, PlayerState};
pub use resources::ResourceSet;
pub use turn::{ActionAllowance, GamePhase, GameStatus, InvalidAllowance, TurnState};

use crate::config::GameConfig;

/// Errors raised while seating players or starting a game.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitializationError {
    #[error("player {0} is already seated")]
    DuplicatePlayer(PlayerId),

    #[error("cannot start a game without players")]
    NoPlayers,

    #[error("game already started")]
    AlreadyStarted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct GameState {
    pub id: GameId,
    pub status: GameStatus,
    pub current_phase: GamePhase,
    pub generation: u32,
    /// Seating order for the current generation; rotates at generation advance.
    pub turn_order: Vec<PlayerId>,
    pub current_turn: Option<TurnState>,
    pub global_parameters: GlobalParameters,
    #[cfg_attr(feature = "serde", serde(default))]
    pub board: Board,
    pub players: BTreeMap<PlayerId, PlayerState>,
    /// Draw pile, top card first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub deck: Vec<CardId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub discard_pile: Vec<CardId>,
    /// Incremented for every committed action.
    #[cfg_attr(feature = "serde", serde(default))]
    pub revision: u64,
}

impl GameState {
    pub fn new(id: impl Into<GameId>, config: &GameConfig) -> Self {
        Self {
            id: id.into(),
            status: GameStatus::Lobby,
            current_phase: GamePhase::WaitingForStart,
            generation: 0,
            turn_order: Vec::new(),
            current_turn: None,
            global_parameters: GlobalParameters::initial(config),
            board: Board::default(),
            players: BTreeMap::new(),
            deck: Vec::new(),
            discard_pile: Vec::new(),
            revision: 0,
        }
    }

    /// Seats a player at the end of the turn order.
    pub fn add_player(&mut self, player: PlayerState) -> Result<(), InitializationError> {
        if self.players.contains_key(&player.id) {
            return Err(InitializationError::DuplicatePlayer(player.id));
        }
        self.turn_order.push(player.id.clone());
        self.players.insert(player.id.clone(), player);
        Ok(())
    }

    /// Moves a lobby into the action phase of generation 1.
    pub fn start(&mut self, config: &GameConfig) -> Result<(), InitializationError> {
        if self.status != GameStatus::Lobby {
            return Err(InitializationError::AlreadyStarted);
        }
        let first = self
            .turn_order
            .first()
            .cloned()
            .ok_or(InitializationError::NoPlayers)?;

        self.status = GameStatus::Active;
        self.current_phase = GamePhase::Action;
        self.generation = 1;
        self.current_turn = Some(TurnState::new(first, self.fresh_allowance(config)));
        Ok(())
    }

    /// Allowance handed to a player whose turn begins normally.
    pub fn fresh_allowance(&self, config: &GameConfig) -> ActionAllowance {
        if self.players.len() == 1 {
            ActionAllowance::Unlimited
        } else {
            ActionAllowance::Limited(config.actions_per_turn)
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id)
    }

    pub fn current_player_id(&self) -> Option<&PlayerId> {
        self.current_turn.as_ref().map(|turn| &turn.player_id)
    }

    pub fn is_current_player(&self, id: &PlayerId) -> bool {
        self.current_player_id() == Some(id)
    }

    /// Players in turn order.
    pub fn players_in_order(&self) -> impl Iterator<Item = &PlayerState> {
        self.turn_order.iter().filter_map(|id| self.players.get(id))
    }

    pub fn active_player_count(&self) -> usize {
        self.players.values().filter(|p| !p.passed).count()
    }

    /// Moves up to `count` cards from the top of the deck into a hand.
    pub fn draw_cards(&mut self, player_id: &PlayerId, count: usize) -> usize {
        let count = count.min(self.deck.len());
        let drawn: Vec<CardId> = self.deck.drain(..count).collect();
        match self.players.get_mut(player_id) {
            Some(player) => {
                player.hand.extend(drawn);
                count
            }
            None => {
                self.deck.splice(0..0, drawn);
                0
            }
        }
    }

    /// Every card id currently held in a hand, paired with its holder.
    pub fn hands(&self) -> impl Iterator<Item = (&PlayerId, &CardId)> {
        self.players
            .values()
            .flat_map(|p| p.hand.iter().map(move |card| (&p.id, card)))
    }

    /// Every registered card action, paired with its owner.
    pub fn card_actions(&self) -> impl Iterator<Item = (&PlayerId, &CardAction)> {
        self.players
            .values()
            .flat_map(|p| p.actions.iter().map(move |action| (&p.id, action)))
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new("game", &GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_assigns_first_seat() {
        let config = GameConfig::default();
        let mut state = GameState::new("g1", &config);
        assert_eq!(state.start(&config), Err(InitializationError::NoPlayers));

        state.add_player(PlayerState::new("p1", "Ann", 20)).unwrap();
        state.add_player(PlayerState::new("p2", "Bo", 20)).unwrap();
        assert_eq!(
            state.add_player(PlayerState::new("p1", "Dup", 20)),
            Err(InitializationError::DuplicatePlayer(PlayerId::from("p1")))
        );

        state.start(&config).unwrap();
        let turn = state.current_turn.as_ref().unwrap();
        assert_eq!(turn.player_id, PlayerId::from("p1"));
        assert_eq!(turn.actions_remaining, ActionAllowance::Limited(2));
        assert_eq!(state.current_phase, GamePhase::Action);
    }

    #[test]
    fn solo_game_starts_unlimited() {
        let config = GameConfig::default();
        let mut state = GameState::new("solo", &config);
        state.add_player(PlayerState::new("p1", "Ann", 20)).unwrap();
        state.start(&config).unwrap();
        assert_eq!(
            state.current_turn.unwrap().actions_remaining,
            ActionAllowance::Unlimited
        );
    }
}
