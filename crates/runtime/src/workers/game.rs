//! Game worker that owns one authoritative [`mars_core::GameSession`].
//!
//! Receives commands from [`crate::GameHandle`], executes them against the
//! session, saves every committed state and publishes notifications to the
//! [`EventBus`]. Queries are answered from the worker's own state, so every
//! calculation sees a consistent snapshot.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use mars_core::{
    Action, ActionAllowance, ActionResult, CardId, CardPlayability, CardStates, DomainEvent,
    GameError, GameSession, GameState, PlayerCardActionState, PlayerCardState, PlayerId,
    PlayerState, calculate_player_card_action_state, calculate_player_card_state,
    calculate_player_standard_project_state, can_play_card,
};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, GameEvent, TurnEvent};
use crate::oracle::OracleManager;
use crate::repository::GameRepository;

/// Commands that can be sent to a game worker.
pub enum Command {
    /// Run an action through the engine.
    Execute {
        action: Action,
        reply: oneshot::Sender<Result<ActionResult>>,
    },
    /// Spend one action of the current turn.
    ConsumeAction {
        reply: oneshot::Sender<Result<ActionAllowance>>,
    },
    /// Hand the turn on if the current player is done.
    AutoAdvanceTurn { reply: oneshot::Sender<Result<bool>> },
    CanPlayCard {
        player_id: PlayerId,
        card_id: CardId,
        reply: oneshot::Sender<Result<CardPlayability>>,
    },
    CardState {
        player_id: PlayerId,
        card_id: CardId,
        reply: oneshot::Sender<Result<PlayerCardState>>,
    },
    CardActionState {
        player_id: PlayerId,
        card_id: CardId,
        behavior_index: usize,
        reply: oneshot::Sender<Result<PlayerCardActionState>>,
    },
    StandardProjectState {
        player_id: PlayerId,
        project: String,
        reply: oneshot::Sender<Result<PlayerCardActionState>>,
    },
    /// Cached states of the player's hand cards.
    TrackedCardStates {
        player_id: PlayerId,
        reply: oneshot::Sender<Vec<PlayerCardState>>,
    },
    /// Cached states of the player's registered card actions.
    TrackedCardActionStates {
        player_id: PlayerId,
        reply: oneshot::Sender<Vec<PlayerCardActionState>>,
    },
    /// Query the current game state (read-only).
    QueryState { reply: oneshot::Sender<GameState> },
}

/// Background task that processes one game's commands in arrival order.
pub struct GameWorker {
    session: GameSession,
    card_states: CardStates,
    oracles: OracleManager,
    repository: Arc<dyn GameRepository>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl GameWorker {
    pub fn new(
        state: GameState,
        oracles: OracleManager,
        repository: Arc<dyn GameRepository>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        let mut session = GameSession::new(state);
        let card_states = session.track_card_states(oracles.as_game_env());
        info!(
            target: "runtime::worker",
            game_id = %session.state().id,
            players = session.state().players.len(),
            tracked_states = card_states.len(),
            "game worker initialized"
        );

        Self {
            session,
            card_states,
            oracles,
            repository,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends when every handle has been dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        debug!(
            target: "runtime::worker",
            game_id = %self.session.state().id,
            "game worker stopped"
        );
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Execute { action, reply } => {
                let result = self.execute(action);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Execute reply channel closed (caller dropped)");
                }
            }
            Command::ConsumeAction { reply } => {
                let result = self.consume_action();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "ConsumeAction reply channel closed (caller dropped)");
                }
            }
            Command::AutoAdvanceTurn { reply } => {
                let result = self.auto_advance_turn();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "AutoAdvanceTurn reply channel closed (caller dropped)");
                }
            }
            Command::CanPlayCard {
                player_id,
                card_id,
                reply,
            } => {
                let result = self.with_card(&player_id, &card_id, |card, player, game, env| {
                    can_play_card(card, game, player, env)
                });
                let _ = reply.send(result);
            }
            Command::CardState {
                player_id,
                card_id,
                reply,
            } => {
                let result = self.with_card(&player_id, &card_id, |card, player, game, env| {
                    calculate_player_card_state(card, player, game, env)
                });
                let _ = reply.send(result);
            }
            Command::CardActionState {
                player_id,
                card_id,
                behavior_index,
                reply,
            } => {
                let _ = reply.send(self.card_action_state(&player_id, &card_id, behavior_index));
            }
            Command::StandardProjectState {
                player_id,
                project,
                reply,
            } => {
                let result = self.player(&player_id).map(|player| {
                    calculate_player_standard_project_state(
                        &project,
                        player,
                        self.session.state(),
                        &self.oracles.as_game_env(),
                    )
                });
                let _ = reply.send(result);
            }
            Command::TrackedCardStates { player_id, reply } => {
                let _ = reply.send(self.card_states.for_player(&player_id));
            }
            Command::TrackedCardActionStates { player_id, reply } => {
                let _ = reply.send(self.card_states.actions_for_player(&player_id));
            }
            Command::QueryState { reply } => {
                if reply.send(self.session.state().clone()).is_err() {
                    debug!(target: "runtime::worker", "QueryState reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Executes an action and publishes the outcome.
    ///
    /// This is the only place the worker calls into the engine for actions.
    fn execute(&mut self, action: Action) -> Result<ActionResult> {
        let env = self.oracles.as_game_env();
        let game_id = self.session.state().id.clone();

        let outcome = match self.session.execute(env, &action) {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_rejection() {
                    debug!(
                        target: "runtime::worker",
                        game_id = %game_id,
                        action = action.as_snake_case(),
                        code = err.error_code(),
                        error = %err,
                        "action rejected during pre-validate"
                    );
                } else {
                    error!(
                        target: "runtime::worker",
                        game_id = %game_id,
                        action = action.as_snake_case(),
                        phase = err.phase().as_str(),
                        error = %err,
                        "action execution failed, state restored"
                    );
                }
                self.event_bus.publish(Event::Game(GameEvent::ActionFailed {
                    game_id,
                    action,
                    phase: err.phase(),
                    code: err.error_code().to_string(),
                    error: err.to_string(),
                }));
                return Err(err.into());
            }
        };

        self.persist()?;
        let revision = self.session.state().revision;
        self.publish_turn_events(&outcome.events);
        self.event_bus.publish(Event::Game(GameEvent::ActionExecuted {
            game_id,
            revision,
            action,
            result: outcome.action_result.clone(),
            events: outcome.events,
        }));
        Ok(outcome.action_result)
    }

    fn consume_action(&mut self) -> Result<ActionAllowance> {
        let env = self.oracles.as_game_env();
        let (remaining, events) = self.session.consume_action(env).inspect_err(|err| {
            debug!(
                target: "runtime::worker",
                game_id = %self.session.state().id,
                error = %err,
                "consume action rejected"
            );
        })?;
        self.commit_maintenance(events)?;
        Ok(remaining)
    }

    fn auto_advance_turn(&mut self) -> Result<bool> {
        let env = self.oracles.as_game_env();
        let (advanced, events) = self.session.auto_advance_turn_if_needed(env);
        if advanced {
            self.commit_maintenance(events)?;
        }
        Ok(advanced)
    }

    fn commit_maintenance(&mut self, events: Vec<DomainEvent>) -> Result<()> {
        self.persist()?;
        self.publish_turn_events(&events);
        self.event_bus.publish(Event::Game(GameEvent::TurnMaintenance {
            game_id: self.session.state().id.clone(),
            revision: self.session.state().revision,
            events,
        }));
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.repository.save(self.session.state()).map_err(|err| {
            error!(
                target: "runtime::worker",
                game_id = %self.session.state().id,
                revision = self.session.state().revision,
                error = %err,
                "failed to save committed state"
            );
            RuntimeError::from(err)
        })
    }

    fn publish_turn_events(&self, events: &[DomainEvent]) {
        let game_id = &self.session.state().id;
        for event in events
            .iter()
            .filter_map(|event| TurnEvent::from_domain(game_id, event))
        {
            self.event_bus.publish(Event::Turn(event));
        }
    }

    fn player(&self, player_id: &PlayerId) -> Result<&PlayerState> {
        self.session
            .state()
            .player(player_id)
            .ok_or_else(|| RuntimeError::PlayerNotFound(player_id.clone()))
    }

    fn with_card<T>(
        &self,
        player_id: &PlayerId,
        card_id: &CardId,
        calculate: impl FnOnce(
            &mars_core::Card,
            &PlayerState,
            &GameState,
            &mars_core::GameEnv<'_>,
        ) -> T,
    ) -> Result<T> {
        let env = self.oracles.as_game_env();
        let player = self.player(player_id)?;
        let card = env.card(card_id)?;
        Ok(calculate(card, player, self.session.state(), &env))
    }

    fn card_action_state(
        &self,
        player_id: &PlayerId,
        card_id: &CardId,
        behavior_index: usize,
    ) -> Result<PlayerCardActionState> {
        let player = self.player(player_id)?;
        let action = player
            .actions
            .iter()
            .find(|a| a.card_id == *card_id && a.behavior_index == behavior_index)
            .ok_or_else(|| RuntimeError::CardActionNotFound {
                card: card_id.clone(),
                behavior_index,
            })?;
        Ok(calculate_player_card_action_state(
            card_id,
            behavior_index,
            &action.behavior,
            action.play_count,
            player,
            self.session.state(),
            &self.oracles.as_game_env(),
        ))
    }
}
