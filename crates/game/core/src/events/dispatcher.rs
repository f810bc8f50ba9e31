use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::trace;

use crate::env::GameEnv;
use crate::state::GameState;

use super::{DomainEvent, EventKinds};

/// Handle returned by [`EventDispatcher::subscribe`]; pass it back to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A synchronous event handler.
///
/// Handlers are invoked in subscription order and may mutate the game state
/// (the generational tracker does) or register and remove other
/// subscriptions through the [`DispatchContext`].
pub trait EventSubscriber: Send {
    fn name(&self) -> &'static str;

    /// Event kinds this subscriber is invoked for.
    fn interests(&self) -> EventKinds;

    fn on_event(&mut self, event: &DomainEvent, ctx: &mut DispatchContext<'_>);
}

/// What a subscriber sees while handling one event.
pub struct DispatchContext<'a> {
    state: &'a mut GameState,
    env: GameEnv<'a>,
    sequence: u64,
    current: SubscriptionId,
    next_id: &'a mut u64,
    added: Vec<(SubscriptionId, Box<dyn EventSubscriber>)>,
    removed: BTreeSet<SubscriptionId>,
}

impl<'a> DispatchContext<'a> {
    pub fn state(&self) -> &GameState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        self.state
    }

    pub fn env(&self) -> GameEnv<'a> {
        self.env
    }

    /// Logical timestamp of the event being dispatched.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Subscription id of the handler currently running.
    pub fn current(&self) -> SubscriptionId {
        self.current
    }

    /// Registers a subscriber. It starts receiving events after the current one.
    pub fn subscribe(&mut self, subscriber: Box<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(*self.next_id);
        *self.next_id += 1;
        self.added.push((id, subscriber));
        id
    }

    /// Removes a subscription. It receives nothing further, including the
    /// remainder of the current event.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.added.retain(|(added, _)| *added != id);
        self.removed.insert(id);
    }
}

/// In-call-path publisher owned alongside the game aggregate.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: BTreeMap<SubscriptionId, Box<dyn EventSubscriber>>,
    next_id: u64,
    sequence: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.insert(id, subscriber);
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Sequence number of the most recently published event.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Delivers one event to every interested subscriber before returning.
    pub fn publish(&mut self, event: &DomainEvent, state: &mut GameState, env: GameEnv<'_>) {
        self.sequence += 1;
        let kind = event.kind();

        let mut ctx = DispatchContext {
            state,
            env,
            sequence: self.sequence,
            current: SubscriptionId(0),
            next_id: &mut self.next_id,
            added: Vec::new(),
            removed: BTreeSet::new(),
        };

        for (id, subscriber) in self.subscribers.iter_mut() {
            if !subscriber.interests().intersects(kind) || ctx.removed.contains(id) {
                continue;
            }
            trace!(
                target: "core::events",
                subscriber = subscriber.name(),
                subscription = %id,
                sequence = ctx.sequence,
                ?kind,
                "dispatching event"
            );
            ctx.current = *id;
            subscriber.on_event(event, &mut ctx);
        }

        let DispatchContext { added, removed, .. } = ctx;
        for id in removed {
            self.subscribers.remove(&id);
        }
        self.subscribers.extend(added);
    }

    pub fn publish_all(&mut self, events: &[DomainEvent], state: &mut GameState, env: GameEnv<'_>) {
        for event in events {
            self.publish(event, state, env);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field(
                "subscribers",
                &self
                    .subscribers
                    .iter()
                    .map(|(id, s)| (id.0, s.name()))
                    .collect::<Vec<_>>(),
            )
            .field("sequence", &self.sequence)
            .finish()
    }
}
