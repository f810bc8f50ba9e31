//! Topic-based event bus for outside observers.
//!
//! This is separate from the in-call-path dispatcher inside each game
//! session: core subscribers have already run by the time anything is
//! published here.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{GameEvent, TurnEvent};
