//! Sliding piece move generation
//!
//! Bishops, rooks and queens share one generator parameterised by their
//! ray directions. Each ray stops at the first occupied square; that square
//! is a destination only when it holds an enemy piece.

use super::attack::ray;
use crate::board::Board;
use crate::types::{Piece, Square};

/// Destinations for a bishop, rook or queen
pub fn sliding_targets(board: &Board, piece: &Piece) -> Vec<Square> {
    let mut targets = Vec::new();
    for dir in piece.piece_type.directions() {
        for sq in ray(board, piece.square, *dir) {
            match board.piece_at(sq) {
                Some(other) if other.color == piece.color => {}
                _ => targets.push(sq),
            }
        }
    }
    targets
}
