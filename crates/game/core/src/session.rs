//! A game aggregate together with its in-call-path subscribers.

use tracing::trace;

use crate::action::Action;
use crate::engine::{ExecuteError, ExecutionOutcome, GameEngine, TurnError};
use crate::env::GameEnv;
use crate::events::{DomainEvent, EventDispatcher, GenerationalEventTracker, extract_events};
use crate::playability::{CardStateTracker, CardStates};
use crate::state::{ActionAllowance, GameState};

/// Owns one game's state and the dispatcher that keeps derived state current.
///
/// [`GameSession::execute`] commits through the [`GameEngine`] and publishes
/// the resulting events before it returns, so generational counters and
/// tracked card states are up to date for the next caller.
#[derive(Debug)]
pub struct GameSession {
    state: GameState,
    dispatcher: EventDispatcher,
    card_states: Option<CardStates>,
}

impl GameSession {
    /// Wraps a prepared game state and subscribes the generational tracker.
    pub fn new(state: GameState) -> Self {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(Box::new(GenerationalEventTracker));
        Self {
            state,
            dispatcher,
            card_states: None,
        }
    }

    /// Starts tracking playability for every hand card.
    ///
    /// Idempotent: later calls return the handle installed by the first.
    pub fn track_card_states(&mut self, env: GameEnv<'_>) -> CardStates {
        if let Some(states) = &self.card_states {
            return states.clone();
        }
        let states = CardStateTracker::install(&mut self.dispatcher, &self.state, &env);
        self.card_states = Some(states.clone());
        states
    }

    pub fn card_states(&self) -> Option<&CardStates> {
        self.card_states.as_ref()
    }

    /// Executes an action and delivers its events to every subscriber.
    pub fn execute(
        &mut self,
        env: GameEnv<'_>,
        action: &Action,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let outcome = GameEngine::new(&mut self.state).execute(env, action)?;
        trace!(
            target: "core::events",
            game_id = %self.state.id,
            revision = self.state.revision,
            events = outcome.events.len(),
            "publishing events"
        );
        self.dispatcher
            .publish_all(&outcome.events, &mut self.state, env);
        Ok(outcome)
    }

    /// Spends one action of the current turn outside the action pipeline.
    pub fn consume_action(
        &mut self,
        env: GameEnv<'_>,
    ) -> Result<(ActionAllowance, Vec<DomainEvent>), TurnError> {
        let before = self.state.clone();
        let remaining = GameEngine::new(&mut self.state).consume_action()?;
        Ok((remaining, self.commit(&before, env)))
    }

    /// Hands the turn on if the current player is done. Returns whether it moved.
    pub fn auto_advance_turn_if_needed(&mut self, env: GameEnv<'_>) -> (bool, Vec<DomainEvent>) {
        let before = self.state.clone();
        if !GameEngine::new(&mut self.state).auto_advance_turn_if_needed(env) {
            return (false, Vec::new());
        }
        (true, self.commit(&before, env))
    }

    fn commit(&mut self, before: &GameState, env: GameEnv<'_>) -> Vec<DomainEvent> {
        self.state.revision += 1;
        let events = extract_events(before, &self.state);
        self.dispatcher.publish_all(&events, &mut self.state, env);
        events
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn into_state(self) -> GameState {
        self.state
    }
}
