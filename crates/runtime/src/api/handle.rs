//! Cloneable façade for issuing commands to one running game.
//!
//! [`GameHandle`] hides channel plumbing and offers async helpers for every
//! engine operation plus topic-based event streams.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use mars_core::{
    Action, ActionAllowance, ActionResult, CardId, CardPayment, CardPlayability, GameId,
    GameState, PlayCardAction, PlayerCardActionState, PlayerCardState, PlayerId, SkipAction,
    SkipOutcome, UseCardAction,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to one game worker.
#[derive(Clone)]
pub struct GameHandle {
    game_id: GameId,
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl GameHandle {
    pub(crate) fn new(game_id: GameId, command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            game_id,
            command_tx,
            event_bus,
        }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Execute an action. The state is untouched when this returns an error.
    pub async fn execute_action(&self, action: impl Into<Action>) -> Result<ActionResult> {
        let action = action.into();
        self.request(|reply| Command::Execute { action, reply })
            .await?
    }

    pub async fn play_card(
        &self,
        player_id: impl Into<PlayerId>,
        card_id: impl Into<CardId>,
        payment: CardPayment,
    ) -> Result<ActionResult> {
        self.execute_action(PlayCardAction::new(player_id, card_id, payment))
            .await
    }

    pub async fn use_card_action(
        &self,
        player_id: impl Into<PlayerId>,
        card_id: impl Into<CardId>,
        behavior_index: usize,
    ) -> Result<ActionResult> {
        self.execute_action(UseCardAction::new(player_id, card_id, behavior_index))
            .await
    }

    /// Skip for `player_id`, passing if no action was taken this turn.
    pub async fn skip_action(&self, player_id: impl Into<PlayerId>) -> Result<SkipOutcome> {
        match self.execute_action(SkipAction::new(player_id)).await? {
            ActionResult::Skipped { outcome } => Ok(outcome),
            other => unreachable!("skip produced {other:?}"),
        }
    }

    pub async fn advance_generation(&self) -> Result<()> {
        self.execute_action(Action::AdvanceGeneration).await.map(|_| ())
    }

    /// Spend one action of the current turn outside any action pipeline.
    pub async fn consume_action(&self) -> Result<ActionAllowance> {
        self.request(|reply| Command::ConsumeAction { reply }).await?
    }

    /// Hand the turn on if the current player is out of actions.
    ///
    /// Returns `true` when the turn moved.
    pub async fn auto_advance_turn_if_needed(&self) -> Result<bool> {
        self.request(|reply| Command::AutoAdvanceTurn { reply })
            .await?
    }

    pub async fn can_play_card(
        &self,
        player_id: impl Into<PlayerId>,
        card_id: impl Into<CardId>,
    ) -> Result<CardPlayability> {
        let (player_id, card_id) = (player_id.into(), card_id.into());
        self.request(|reply| Command::CanPlayCard {
            player_id,
            card_id,
            reply,
        })
        .await?
    }

    pub async fn card_state(
        &self,
        player_id: impl Into<PlayerId>,
        card_id: impl Into<CardId>,
    ) -> Result<PlayerCardState> {
        let (player_id, card_id) = (player_id.into(), card_id.into());
        self.request(|reply| Command::CardState {
            player_id,
            card_id,
            reply,
        })
        .await?
    }

    pub async fn card_action_state(
        &self,
        player_id: impl Into<PlayerId>,
        card_id: impl Into<CardId>,
        behavior_index: usize,
    ) -> Result<PlayerCardActionState> {
        let (player_id, card_id) = (player_id.into(), card_id.into());
        self.request(|reply| Command::CardActionState {
            player_id,
            card_id,
            behavior_index,
            reply,
        })
        .await?
    }

    /// State of a standard project, addressed by its kebab-case id.
    pub async fn standard_project_state(
        &self,
        player_id: impl Into<PlayerId>,
        project: impl Into<String>,
    ) -> Result<PlayerCardActionState> {
        let (player_id, project) = (player_id.into(), project.into());
        self.request(|reply| Command::StandardProjectState {
            player_id,
            project,
            reply,
        })
        .await?
    }

    /// Cached hand card states, kept current by the worker's subscriptions.
    pub async fn tracked_card_states(
        &self,
        player_id: impl Into<PlayerId>,
    ) -> Result<Vec<PlayerCardState>> {
        let player_id = player_id.into();
        self.request(|reply| Command::TrackedCardStates { player_id, reply })
            .await
    }

    /// Cached card action states, kept current the same way.
    pub async fn tracked_card_action_states(
        &self,
        player_id: impl Into<PlayerId>,
    ) -> Result<Vec<PlayerCardActionState>> {
        let player_id = player_id.into();
        self.request(|reply| Command::TrackedCardActionStates { player_id, reply })
            .await
    }

    /// Query the current game state (read-only snapshot)
    pub async fn query_state(&self) -> Result<GameState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Game` - Action execution, maintenance and failures
    /// - `Topic::Turn` - Turn, phase and generation changes
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }
}
