//! Cached card and card-action playability that stays current through event
//! subscriptions.
//!
//! Each hand card gets one [`ReactiveCardState`] subscription and each
//! registered card action one [`ReactiveCardActionState`]. The
//! [`CardStateTracker`] owns their lifecycle: it subscribes a card when it
//! enters a hand and an action when its card is registered, and unsubscribes
//! them when they go away or the game ends, after which the cached state is
//! frozen.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::env::GameEnv;
use crate::events::{DispatchContext, DomainEvent, EventDispatcher, EventKinds, EventSubscriber, SubscriptionId};
use crate::state::{CardId, GameState, PlayerId};

use super::{
    PlayerCardActionState, PlayerCardState, calculate_player_card_action_state,
    calculate_player_card_state,
};

type CardKey = (PlayerId, CardId);
type ActionKey = (PlayerId, CardId, usize);

/// Shared read handle onto one cached state.
#[derive(Debug)]
pub struct StateHandle<T>(Arc<RwLock<T>>);

pub type CardStateHandle = StateHandle<PlayerCardState>;
pub type CardActionStateHandle = StateHandle<PlayerCardActionState>;

impl<T> Clone for StateHandle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Clone> StateHandle<T> {
    fn new(state: T) -> Self {
        Self(Arc::new(RwLock::new(state)))
    }

    pub fn snapshot(&self) -> T {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace(&self, state: T) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

impl StateHandle<PlayerCardState> {
    pub fn last_calculated(&self) -> u64 {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .last_calculated
    }
}

impl StateHandle<PlayerCardActionState> {
    pub fn last_calculated(&self) -> u64 {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .last_calculated
    }
}

/// Live card and card-action states keyed by holder.
#[derive(Clone, Debug, Default)]
pub struct CardStates {
    cards: Arc<RwLock<BTreeMap<CardKey, CardStateHandle>>>,
    actions: Arc<RwLock<BTreeMap<ActionKey, CardActionStateHandle>>>,
}

impl CardStates {
    pub fn get(&self, player_id: &PlayerId, card_id: &CardId) -> Option<CardStateHandle> {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(player_id.clone(), card_id.clone()))
            .cloned()
    }

    pub fn action(
        &self,
        player_id: &PlayerId,
        card_id: &CardId,
        behavior_index: usize,
    ) -> Option<CardActionStateHandle> {
        self.actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(player_id.clone(), card_id.clone(), behavior_index))
            .cloned()
    }

    /// Snapshots of every tracked card held by `player_id`.
    pub fn for_player(&self, player_id: &PlayerId) -> Vec<PlayerCardState> {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|((holder, _), _)| holder == player_id)
            .map(|(_, handle)| handle.snapshot())
            .collect()
    }

    /// Snapshots of every tracked card action owned by `player_id`.
    pub fn actions_for_player(&self, player_id: &PlayerId) -> Vec<PlayerCardActionState> {
        self.actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|((owner, _, _), _)| owner == player_id)
            .map(|(_, handle)| handle.snapshot())
            .collect()
    }

    /// Tracked hand cards plus tracked card actions.
    pub fn len(&self) -> usize {
        self.cards.read().unwrap_or_else(PoisonError::into_inner).len()
            + self.actions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_card(&self, key: CardKey, handle: CardStateHandle) {
        self.cards
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, handle);
    }

    fn remove_card(&self, key: &CardKey) {
        self.cards
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn insert_action(&self, key: ActionKey, handle: CardActionStateHandle) {
        self.actions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, handle);
    }

    fn remove_action(&self, key: &ActionKey) {
        self.actions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.cards.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.actions.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Subscription that recomputes one hand card whenever its availability may change.
#[derive(Debug)]
pub struct ReactiveCardState {
    player_id: PlayerId,
    card_id: CardId,
    handle: CardStateHandle,
}

impl ReactiveCardState {
    /// Computes the initial state. `None` when the card or player is unknown.
    pub fn new(
        player_id: PlayerId,
        card_id: CardId,
        game: &GameState,
        env: &GameEnv<'_>,
        sequence: u64,
    ) -> Option<Self> {
        let state = compute_card(&player_id, &card_id, game, env, sequence)?;
        Some(Self {
            player_id,
            card_id,
            handle: CardStateHandle::new(state),
        })
    }

    pub fn handle(&self) -> CardStateHandle {
        self.handle.clone()
    }
}

fn compute_card(
    player_id: &PlayerId,
    card_id: &CardId,
    game: &GameState,
    env: &GameEnv<'_>,
    sequence: u64,
) -> Option<PlayerCardState> {
    let player = game.player(player_id)?;
    let card = env.cards().get_by_id(card_id)?;
    let mut state = calculate_player_card_state(card, player, game, env);
    state.state.last_calculated = sequence;
    Some(state)
}

/// Player-scoped kinds only concern the subscriber when they name its player.
fn concerns(event: &DomainEvent, player_id: &PlayerId) -> bool {
    let player_scoped = EventKinds::RESOURCES
        | EventKinds::PRODUCTION
        | EventKinds::TERRAFORM_RATING
        | EventKinds::CARD_PLAYED
        | EventKinds::EFFECTS;
    !event.kind().intersects(player_scoped) || event.player_id() == Some(player_id)
}

impl EventSubscriber for ReactiveCardState {
    fn name(&self) -> &'static str {
        "reactive-card-state"
    }

    fn interests(&self) -> EventKinds {
        EventKinds::GLOBAL_PARAMETER
            | EventKinds::TILE_PLACED
            | EventKinds::RESOURCES
            | EventKinds::PRODUCTION
            | EventKinds::TERRAFORM_RATING
            | EventKinds::PHASE
            | EventKinds::CARD_PLAYED
            | EventKinds::EFFECTS
            | EventKinds::GENERATION
    }

    fn on_event(&mut self, event: &DomainEvent, ctx: &mut DispatchContext<'_>) {
        if !concerns(event, &self.player_id) {
            return;
        }

        let env = ctx.env();
        if let Some(state) = compute_card(&self.player_id, &self.card_id, ctx.state(), &env, ctx.sequence()) {
            trace!(
                target: "core::playability",
                player_id = %self.player_id,
                card_id = %self.card_id,
                sequence = ctx.sequence(),
                available = state.available(),
                "card state recomputed"
            );
            self.handle.replace(state);
        }
    }
}

/// Subscription that recomputes one registered card action.
///
/// Unlike hand cards, action availability also follows the turn: whose turn
/// it is and pending obligations both gate it.
#[derive(Debug)]
pub struct ReactiveCardActionState {
    player_id: PlayerId,
    card_id: CardId,
    behavior_index: usize,
    handle: CardActionStateHandle,
}

impl ReactiveCardActionState {
    /// Computes the initial state. `None` when the player owns no such action.
    pub fn new(
        player_id: PlayerId,
        card_id: CardId,
        behavior_index: usize,
        game: &GameState,
        env: &GameEnv<'_>,
        sequence: u64,
    ) -> Option<Self> {
        let state = compute_action(&player_id, &card_id, behavior_index, game, env, sequence)?;
        Some(Self {
            player_id,
            card_id,
            behavior_index,
            handle: CardActionStateHandle::new(state),
        })
    }

    pub fn handle(&self) -> CardActionStateHandle {
        self.handle.clone()
    }
}

fn compute_action(
    player_id: &PlayerId,
    card_id: &CardId,
    behavior_index: usize,
    game: &GameState,
    env: &GameEnv<'_>,
    sequence: u64,
) -> Option<PlayerCardActionState> {
    let player = game.player(player_id)?;
    let action = player
        .actions
        .iter()
        .find(|a| &a.card_id == card_id && a.behavior_index == behavior_index)?;
    let mut state = calculate_player_card_action_state(
        card_id,
        behavior_index,
        &action.behavior,
        action.play_count,
        player,
        game,
        env,
    );
    state.state.last_calculated = sequence;
    Some(state)
}

impl EventSubscriber for ReactiveCardActionState {
    fn name(&self) -> &'static str {
        "reactive-card-action-state"
    }

    fn interests(&self) -> EventKinds {
        EventKinds::GLOBAL_PARAMETER
            | EventKinds::TILE_PLACED
            | EventKinds::RESOURCES
            | EventKinds::PRODUCTION
            | EventKinds::TERRAFORM_RATING
            | EventKinds::PHASE
            | EventKinds::TURN
            | EventKinds::CARD_PLAYED
            | EventKinds::EFFECTS
            | EventKinds::GENERATION
    }

    fn on_event(&mut self, event: &DomainEvent, ctx: &mut DispatchContext<'_>) {
        if !concerns(event, &self.player_id) {
            return;
        }

        let env = ctx.env();
        let computed = compute_action(
            &self.player_id,
            &self.card_id,
            self.behavior_index,
            ctx.state(),
            &env,
            ctx.sequence(),
        );
        if let Some(state) = computed {
            trace!(
                target: "core::playability",
                player_id = %self.player_id,
                card_id = %self.card_id,
                behavior_index = self.behavior_index,
                sequence = ctx.sequence(),
                available = state.available(),
                "card action state recomputed"
            );
            self.handle.replace(state);
        }
    }
}

/// Owns the subscribe/unsubscribe lifecycle of every [`ReactiveCardState`]
/// and [`ReactiveCardActionState`].
#[derive(Debug)]
pub struct CardStateTracker {
    cards: BTreeMap<CardKey, SubscriptionId>,
    actions: BTreeMap<ActionKey, SubscriptionId>,
    states: CardStates,
}

impl CardStateTracker {
    /// Subscribes every card currently in a hand, every registered card
    /// action, plus the tracker itself.
    pub fn install(
        dispatcher: &mut EventDispatcher,
        game: &GameState,
        env: &GameEnv<'_>,
    ) -> CardStates {
        let states = CardStates::default();
        let mut tracker = Self {
            cards: BTreeMap::new(),
            actions: BTreeMap::new(),
            states: states.clone(),
        };

        for (player_id, card_id) in game.hands() {
            let key = (player_id.clone(), card_id.clone());
            if tracker.cards.contains_key(&key) {
                continue;
            }
            let Some(reactive) = ReactiveCardState::new(
                player_id.clone(),
                card_id.clone(),
                game,
                env,
                dispatcher.sequence(),
            ) else {
                continue;
            };
            states.insert_card(key.clone(), reactive.handle());
            let id = dispatcher.subscribe(Box::new(reactive));
            tracker.cards.insert(key, id);
        }

        for (player_id, action) in game.card_actions() {
            let key = (player_id.clone(), action.card_id.clone(), action.behavior_index);
            if tracker.actions.contains_key(&key) {
                continue;
            }
            let Some(reactive) = ReactiveCardActionState::new(
                key.0.clone(),
                key.1.clone(),
                key.2,
                game,
                env,
                dispatcher.sequence(),
            ) else {
                continue;
            };
            states.insert_action(key.clone(), reactive.handle());
            let id = dispatcher.subscribe(Box::new(reactive));
            tracker.actions.insert(key, id);
        }

        dispatcher.subscribe(Box::new(tracker));
        states
    }

    fn track(&mut self, player_id: &PlayerId, card_id: &CardId, ctx: &mut DispatchContext<'_>) {
        let key = (player_id.clone(), card_id.clone());
        if self.cards.contains_key(&key) {
            return;
        }
        let env = ctx.env();
        let Some(reactive) =
            ReactiveCardState::new(player_id.clone(), card_id.clone(), ctx.state(), &env, ctx.sequence())
        else {
            return;
        };
        self.states.insert_card(key.clone(), reactive.handle());
        let id = ctx.subscribe(Box::new(reactive));
        self.cards.insert(key, id);
    }

    fn untrack(&mut self, player_id: &PlayerId, card_id: &CardId, ctx: &mut DispatchContext<'_>) {
        let key = (player_id.clone(), card_id.clone());
        if let Some(id) = self.cards.remove(&key) {
            ctx.unsubscribe(id);
            self.states.remove_card(&key);
        }
    }

    /// Aligns the tracked actions of `player_id` with the actions it owns now.
    fn sync_actions(&mut self, player_id: &PlayerId, ctx: &mut DispatchContext<'_>) {
        let owned: BTreeSet<ActionKey> = ctx
            .state()
            .player(player_id)
            .map(|player| {
                player
                    .actions
                    .iter()
                    .map(|a| (player_id.clone(), a.card_id.clone(), a.behavior_index))
                    .collect()
            })
            .unwrap_or_default();

        let stale: Vec<ActionKey> = self
            .actions
            .keys()
            .filter(|key| &key.0 == player_id && !owned.contains(*key))
            .cloned()
            .collect();
        for key in stale {
            if let Some(id) = self.actions.remove(&key) {
                ctx.unsubscribe(id);
                self.states.remove_action(&key);
            }
        }

        for key in owned {
            if self.actions.contains_key(&key) {
                continue;
            }
            let env = ctx.env();
            let Some(reactive) = ReactiveCardActionState::new(
                key.0.clone(),
                key.1.clone(),
                key.2,
                ctx.state(),
                &env,
                ctx.sequence(),
            ) else {
                continue;
            };
            self.states.insert_action(key.clone(), reactive.handle());
            let id = ctx.subscribe(Box::new(reactive));
            self.actions.insert(key, id);
        }
    }
}

impl EventSubscriber for CardStateTracker {
    fn name(&self) -> &'static str {
        "card-state-tracker"
    }

    fn interests(&self) -> EventKinds {
        EventKinds::CARD_ADDED
            | EventKinds::CARD_REMOVED
            | EventKinds::CARD_PLAYED
            | EventKinds::EFFECTS
            | EventKinds::GAME_ENDED
    }

    fn on_event(&mut self, event: &DomainEvent, ctx: &mut DispatchContext<'_>) {
        match event {
            DomainEvent::CardAddedToHand { player_id, card_id } => {
                self.track(player_id, card_id, ctx);
            }
            DomainEvent::CardRemovedFromHand { player_id, card_id } => {
                self.untrack(player_id, card_id, ctx);
            }
            DomainEvent::CardPlayed { player_id, .. } | DomainEvent::EffectsChanged { player_id } => {
                self.sync_actions(player_id, ctx);
            }
            DomainEvent::GameEnded => {
                let cards = std::mem::take(&mut self.cards).into_values();
                let actions = std::mem::take(&mut self.actions).into_values();
                for id in cards.chain(actions) {
                    ctx.unsubscribe(id);
                }
                self.states.clear();
                ctx.unsubscribe(ctx.current());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{
        Card, CardBehavior, CardType, Requirement, RequirementType, ResourceCondition,
        ResourceType, Trigger,
    };
    use crate::config::GameConfig;
    use crate::env::CardSnapshot;
    use crate::events::extract_events;
    use crate::state::{
        ActionAllowance, CardAction, GamePhase, GameStatus, PlayerState, TurnState,
    };

    fn setup() -> (CardSnapshot, GameState) {
        let cards = CardSnapshot::new([
            Card::new("lichen", "Lichen", CardType::Automated, 7)
                .with_requirement(Requirement::new(RequirementType::Temperature).min(-24)),
            Card::new("mine", "Mine", CardType::Automated, 4),
        ]);
        let mut game = GameState::default();
        let mut ann = PlayerState::new("p1", "Ann", 20);
        ann.resources.credits = 10;
        ann.hand.push("lichen".into());
        game.add_player(ann).unwrap();
        game.current_phase = GamePhase::Action;
        (cards, game)
    }

    fn commit(
        dispatcher: &mut EventDispatcher,
        before: &GameState,
        after: &mut GameState,
        env: GameEnv<'_>,
    ) {
        let events = extract_events(before, after);
        dispatcher.publish_all(&events, after, env);
    }

    #[test]
    fn recomputes_on_parameter_change() {
        let (cards, mut game) = setup();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut dispatcher = EventDispatcher::new();
        let states = CardStateTracker::install(&mut dispatcher, &game, &env);

        let lichen = states.get(&"p1".into(), &"lichen".into()).unwrap();
        assert!(!lichen.snapshot().available());

        let before = game.clone();
        game.global_parameters.temperature = -24;
        commit(&mut dispatcher, &before, &mut game, env);

        assert!(lichen.snapshot().available());
        assert_eq!(lichen.last_calculated(), dispatcher.sequence());
    }

    #[test]
    fn removal_from_hand_freezes_the_state() {
        let (cards, mut game) = setup();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut dispatcher = EventDispatcher::new();
        let states = CardStateTracker::install(&mut dispatcher, &game, &env);
        let lichen = states.get(&"p1".into(), &"lichen".into()).unwrap();

        let before = game.clone();
        let ann = game.player_mut(&"p1".into()).unwrap();
        ann.hand.retain(|c| c.as_str() != "lichen");
        ann.hand.push("mine".into());
        commit(&mut dispatcher, &before, &mut game, env);

        let frozen = lichen.last_calculated();
        assert!(states.get(&"p1".into(), &"lichen".into()).is_none());
        assert!(states.get(&"p1".into(), &"mine".into()).is_some());

        let before = game.clone();
        game.global_parameters.temperature = -20;
        game.player_mut(&"p1".into()).unwrap().resources.credits = 3;
        commit(&mut dispatcher, &before, &mut game, env);

        assert_eq!(lichen.last_calculated(), frozen);
        let mine = states.get(&"p1".into(), &"mine".into()).unwrap();
        assert_eq!(mine.last_calculated(), dispatcher.sequence());
        assert!(!mine.snapshot().available());
    }

    #[test]
    fn game_end_tears_down_everything() {
        let (cards, mut game) = setup();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut dispatcher = EventDispatcher::new();
        let states = CardStateTracker::install(&mut dispatcher, &game, &env);
        let lichen = states.get(&"p1".into(), &"lichen".into()).unwrap();
        assert_eq!(dispatcher.len(), 2);

        let before = game.clone();
        game.status = GameStatus::Finished;
        commit(&mut dispatcher, &before, &mut game, env);
        assert!(dispatcher.is_empty());
        assert!(states.is_empty());

        let frozen = lichen.last_calculated();
        let before = game.clone();
        game.global_parameters.temperature = 0;
        commit(&mut dispatcher, &before, &mut game, env);
        assert_eq!(lichen.last_calculated(), frozen);
    }

    #[test]
    fn registered_actions_are_tracked_and_follow_the_turn() {
        let (cards, mut game) = setup();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut dispatcher = EventDispatcher::new();
        let states = CardStateTracker::install(&mut dispatcher, &game, &env);
        assert!(states.action(&"p1".into(), &"mine".into(), 0).is_none());

        let before = game.clone();
        game.player_mut(&"p1".into()).unwrap().actions.push(CardAction {
            card_id: "mine".into(),
            card_name: "Mine".into(),
            behavior_index: 0,
            behavior: CardBehavior::new()
                .with_trigger(Trigger::manual())
                .with_output(ResourceCondition::new(ResourceType::Credits, 1)),
            play_count: 0,
        });
        game.current_turn = Some(TurnState::new("p1".into(), ActionAllowance::Limited(2)));
        commit(&mut dispatcher, &before, &mut game, env);

        let mine = states.action(&"p1".into(), &"mine".into(), 0).unwrap();
        assert!(mine.snapshot().available());
        assert_eq!(states.actions_for_player(&"p1".into()).len(), 1);

        let before = game.clone();
        game.current_turn = Some(TurnState::new("p2".into(), ActionAllowance::Limited(2)));
        commit(&mut dispatcher, &before, &mut game, env);

        assert_eq!(mine.last_calculated(), dispatcher.sequence());
        assert_eq!(mine.snapshot().state.errors[0].code, "TURN_NOT_YOUR_TURN");
    }
}
