//! Error types for game operations
//!
//! Every public engine operation returns [`GameResult`]. Caller-correctable
//! failures leave the stored game untouched. [`GameError::Internal`] marks
//! corrupted state: the engine flags the game and refuses further mutation.

use crate::game::state::GamePhase;
use crate::game::types::{Color, GameId, Square};
use crate::networking::store::StoreError;
use chess_rules::RulesError;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Game already exists: {0}")]
    GameAlreadyExists(GameId),

    /// Supplied starting board breaks the board invariants
    #[error("Invalid board: {0}")]
    InvalidBoard(RulesError),

    #[error("Not your turn: {expected} to move")]
    WrongTurn { expected: Color },

    #[error("Operation not allowed during {phase}")]
    WrongPhase { phase: GamePhase },

    /// Rejected by the move oracle
    #[error("Invalid move: {0}")]
    InvalidMove(RulesError),

    #[error("No piece of the side to move at {square}")]
    PieceNotFound { square: Square },

    #[error("Player is not a participant in this game")]
    NotAParticipant,

    #[error("{color} has already allocated for this duel")]
    AlreadyAllocated { color: Color },

    #[error("Allocation {amount} out of range (pool {pool}, max {max})")]
    AllocationOutOfRange { amount: i64, pool: u32, max: u32 },

    #[error("{square} is not a retreat option")]
    InvalidRetreatTarget { square: Square },

    #[error("Retreat cost mismatch: option costs {expected}, acknowledged {acknowledged}")]
    RetreatCostMismatch { expected: u32, acknowledged: u32 },

    #[error("Insufficient BP: need {needed}, have {available}")]
    InsufficientBp { needed: u32, available: u32 },

    #[error("Game is over")]
    GameOver,

    #[error("Game is flagged: {reason}")]
    GameFlagged { reason: String },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// Broken invariant; the game is flagged when this escapes an operation
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GameError {
    pub fn internal(message: impl Into<String>) -> Self {
        GameError::Internal {
            message: message.into(),
        }
    }

    /// Stable identifier for clients
    pub fn code(&self) -> &'static str {
        match self {
            GameError::GameNotFound(_) => "game_not_found",
            GameError::GameAlreadyExists(_) => "game_already_exists",
            GameError::InvalidBoard(_) => "invalid_board",
            GameError::WrongTurn { .. } => "wrong_turn",
            GameError::WrongPhase { .. } => "wrong_phase",
            GameError::InvalidMove(_) => "invalid_move",
            GameError::PieceNotFound { .. } => "piece_not_found",
            GameError::NotAParticipant => "not_a_participant",
            GameError::AlreadyAllocated { .. } => "already_allocated",
            GameError::AllocationOutOfRange { .. } => "allocation_out_of_range",
            GameError::InvalidRetreatTarget { .. } => "invalid_retreat_target",
            GameError::RetreatCostMismatch { .. } => "retreat_cost_mismatch",
            GameError::InsufficientBp { .. } => "insufficient_bp",
            GameError::GameOver => "game_over",
            GameError::GameFlagged { .. } => "game_flagged",
            GameError::Persistence(_) => "persistence",
            GameError::Internal { .. } => "internal",
        }
    }

    /// The caller may repeat the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::Persistence(_))
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, GameError::Internal { .. })
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
