//! Async runtime hosting Terraforming Mars games.
//!
//! Each game runs in its own worker task that owns the authoritative
//! [`mars_core::GameSession`]; clients talk to it through a cloneable
//! [`GameHandle`]. Committed states are saved to a [`GameRepository`] and
//! notifications fan out over a topic-based [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the game registry and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`oracle`] and [`repository`] provide card content and persistence
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{GameHandle, Result, RuntimeError};
pub use events::{Event, EventBus, GameEvent, Topic, TurnEvent};
pub use oracle::{CardCatalog, CatalogError, OracleManager};
pub use repository::{GameRepository, InMemoryGameRepo, RepositoryError};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
