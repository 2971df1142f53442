//! Game domain: state, phase transitions and the economy
//!
//! The [`orchestrator`] holds the pure transition functions. The [`engine`]
//! wraps them with persistence, locking and notification.

pub mod captured;
pub mod duel;
pub mod engine;
pub mod error;
pub mod history;
pub mod ledger;
pub mod orchestrator;
pub mod retreat;
pub mod state;
pub mod tactics;
pub mod types;
pub mod view;

pub use duel::{ActiveDuel, DuelOutcome, DuelRole};
pub use engine::Engine;
pub use error::{GameError, GameResult};
pub use ledger::{BpLedger, Regeneration};
pub use orchestrator::{AllocationOutcome, MoveOutcome, RetreatOutcome};
pub use retreat::{RetreatContext, RetreatOption};
pub use state::{GamePhase, GameState, GameStatus};
pub use tactics::{TacticInstance, TacticKind, TacticsDetector};
pub use view::{GameView, Viewer};
