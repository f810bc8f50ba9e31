//! Worker tasks that back the runtime orchestration.
//!
//! Each running game gets one [`GameWorker`] that owns its aggregate; games
//! never share mutable state, so they run in parallel.

mod game;

pub use game::{Command, GameWorker};
