//! Deterministic Terraforming Mars rules shared by the runtime and tooling.
//!
//! `mars-core` defines the card model, the requirement and resource-condition
//! rules, the playability calculators and the turn/phase machine. It performs
//! no I/O and reads no clock. All state mutation flows through
//! [`engine::GameEngine`]; [`session::GameSession`] adds the synchronous
//! subscribers that keep derived state current.
pub mod action;
pub mod card;
pub mod config;
pub mod discount;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod payment;
pub mod playability;
pub mod requirement;
pub mod resolver;
pub mod session;
pub mod state;

pub use action::{
    Action, ActionError, ActionResult, ActionTransition, CompleteForcedAction,
    ConfirmSellPatentsAction, PlaceTileAction, PlayCardAction, Resolution,
    SelectCorporationAction, SkipAction, StandardProjectAction, UseCardAction,
};
pub use card::{
    Card, CardBehavior, CardTag, CardType, Choice, Requirement, RequirementType,
    ResourceCondition, ResourceType, StandardProject, TargetType, TileType, Trigger,
};
pub use config::GameConfig;
pub use engine::{
    ExecuteError, ExecutionOutcome, GameEngine, SkipOutcome, TransitionPhase,
    TransitionPhaseError, TurnError,
};
pub use env::{CardFilter, CardOracle, CardSnapshot, GameEnv, OracleError};
pub use error::{ErrorCategory, ErrorSeverity, GameError, ValidationError};
pub use events::{DomainEvent, EventDispatcher, EventKinds, EventSubscriber, SubscriptionId};
pub use payment::{CardPayment, PaymentError};
pub use playability::{
    CardActionStateHandle, CardPlayability, CardStateHandle, CardStates, PlayerCardActionState,
    PlayerCardState,
    calculate_player_card_action_state, calculate_player_card_state,
    calculate_player_standard_project_state, can_play_card,
};
pub use resolver::{BehaviorTargets, ResolveError};
pub use session::GameSession;
pub use state::{
    ActionAllowance, CardId, GameId, GamePhase, GameState, GameStatus, InitializationError,
    PlayerId, PlayerState, ResourceSet, TurnState,
};
