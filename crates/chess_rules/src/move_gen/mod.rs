//! Move generation and attack geometry
//!
//! Per-piece generators return pseudo-legal destinations: they respect
//! piece patterns, blocking and friendly occupancy, but not king safety.
//! [`crate::oracle::StandardOracle`] filters for self-check.
//!
//! # Module Structure
//!
//! - `attack` - Which squares a piece attacks, rays and lines between squares
//! - `sliding` - Bishop, rook and queen rays
//! - `knight` - Knight jumps
//! - `pawn` - Pushes, captures, en passant and promotion flags
//! - `king` - Single steps and castling

pub mod attack;
pub mod king;
pub mod knight;
pub mod pawn;
pub mod sliding;

pub use attack::{
    attacked_squares, attacks, is_in_check, is_square_attacked, line_between, line_direction,
    ray,
};

use crate::board::Board;
use crate::types::{MoveType, Piece, PieceType, Square};

/// Pseudo-legal destinations for one piece, classified by move type.
///
/// Promotion is reported as [`MoveType::Promotion`] or
/// [`MoveType::PromotionCapture`]; the promotion piece is chosen later.
pub fn pseudo_legal_moves(board: &Board, piece: &Piece) -> Vec<(Square, MoveType)> {
    match piece.piece_type {
        PieceType::Pawn => pawn::pawn_moves(board, piece),
        PieceType::Knight => classify(board, piece, knight::knight_targets(board, piece)),
        PieceType::Bishop | PieceType::Rook | PieceType::Queen => {
            classify(board, piece, sliding::sliding_targets(board, piece))
        }
        PieceType::King => king::king_moves(board, piece),
    }
}

/// Tag plain destinations as quiet moves or captures
pub(crate) fn classify(
    board: &Board,
    piece: &Piece,
    targets: Vec<Square>,
) -> Vec<(Square, MoveType)> {
    targets
        .into_iter()
        .map(|sq| match board.piece_at(sq) {
            Some(other) if other.color != piece.color => (sq, MoveType::Capture),
            _ => (sq, MoveType::Quiet),
        })
        .collect()
}
