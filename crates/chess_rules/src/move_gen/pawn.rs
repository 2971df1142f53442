//! Pawn move generation
//!
//! ## Pawn Movement Rules
//!
//! - One square forward onto an empty square
//! - Two squares forward from the start rank when both squares are empty
//! - Diagonal forward capture of an enemy piece
//! - En passant onto the board's en passant target square
//! - Reaching the last rank is tagged as a promotion

use crate::board::Board;
use crate::types::{MoveType, Piece, Square};

pub fn pawn_moves(board: &Board, piece: &Piece) -> Vec<(Square, MoveType)> {
    let mut moves = Vec::new();
    let dir = piece.color.pawn_direction();
    let last_rank = piece.color.promotion_rank();

    if let Some(one) = piece.square.offset(0, dir) {
        if !board.is_occupied(one) {
            let move_type = if one.rank == last_rank {
                MoveType::Promotion
            } else {
                MoveType::Quiet
            };
            moves.push((one, move_type));

            if piece.square.rank == piece.color.pawn_start_rank() {
                if let Some(two) = one.offset(0, dir) {
                    if !board.is_occupied(two) {
                        moves.push((two, MoveType::DoublePawnPush));
                    }
                }
            }
        }
    }

    for df in [-1, 1] {
        let Some(diag) = piece.square.offset(df, dir) else {
            continue;
        };
        match board.piece_at(diag) {
            Some(other) if other.color != piece.color => {
                let move_type = if diag.rank == last_rank {
                    MoveType::PromotionCapture
                } else {
                    MoveType::Capture
                };
                moves.push((diag, move_type));
            }
            Some(_) => {}
            None if board.en_passant() == Some(diag) => {
                // Only a double-pushed enemy pawn beside us makes this legal
                let passed = Square {
                    file: diag.file,
                    rank: piece.square.rank,
                };
                if board
                    .piece_at(passed)
                    .is_some_and(|p| p.color != piece.color)
                {
                    moves.push((diag, MoveType::EnPassant));
                }
            }
            None => {}
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn start_rank_pawn_has_single_and_double_push() {
        let board = Board::standard();
        let pawn = *board.piece_at(sq("e2")).unwrap();
        let moves = pawn_moves(&board, &pawn);
        assert_eq!(
            moves,
            vec![(sq("e3"), MoveType::Quiet), (sq("e4"), MoveType::DoublePawnPush)]
        );
    }

    #[test]
    fn blocked_pawn_cannot_push() {
        let board = Board::from_placement("4k3/8/8/8/8/4p3/4P3/4K3").unwrap();
        let pawn = *board.piece_at(sq("e2")).unwrap();
        assert!(pawn_moves(&board, &pawn).is_empty());
    }

    #[test]
    fn promotion_capture_is_tagged() {
        let board = Board::from_placement("1r2k3/P7/8/8/8/8/8/4K3").unwrap();
        let pawn = *board.piece_at(sq("a7")).unwrap();
        let moves = pawn_moves(&board, &pawn);
        assert!(moves.contains(&(sq("a8"), MoveType::Promotion)));
        assert!(moves.contains(&(sq("b8"), MoveType::PromotionCapture)));
    }
}
