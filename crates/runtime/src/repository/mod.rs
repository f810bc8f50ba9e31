//! Repository layer for dynamic runtime data.
//!
//! Repositories hold game state that changes during play. Static content
//! (the card catalog) is handled by oracles, not repositories.

mod error;
mod state;
mod traits;

pub use error::RepositoryError;
pub use state::InMemoryGameRepo;
pub use traits::GameRepository;

pub(crate) use error::Result;
