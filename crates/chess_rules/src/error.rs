//! Error types for board construction and move validation

use crate::types::Square;
use thiserror::Error;

/// Why the oracle refused a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveRejection {
    SameSquare,
    OwnPiece,
    /// Kings are never captured; the game ends by checkmate instead
    KingCapture,
    IllegalPattern,
    PathBlocked,
    LeavesKingInCheck,
    CastlingNotAllowed,
    InvalidPromotion,
}

impl std::fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            MoveRejection::SameSquare => "origin and destination are the same square",
            MoveRejection::OwnPiece => "destination is occupied by a friendly piece",
            MoveRejection::KingCapture => "kings cannot be captured",
            MoveRejection::IllegalPattern => "piece cannot move that way",
            MoveRejection::PathBlocked => "path is blocked",
            MoveRejection::LeavesKingInCheck => "move leaves own king in check",
            MoveRejection::CastlingNotAllowed => "castling is not allowed",
            MoveRejection::InvalidPromotion => "invalid promotion piece",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("illegal move {from}{to}: {reason}")]
    InvalidMove {
        from: Square,
        to: Square,
        reason: MoveRejection,
    },

    #[error("no piece at {0}")]
    NoPieceAtSquare(Square),

    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    /// Board invariant broken (duplicate ids, two pieces on one square, missing king)
    #[error("board invariant violated: {0}")]
    Invariant(String),
}

pub type RulesResult<T> = Result<T, RulesError>;
