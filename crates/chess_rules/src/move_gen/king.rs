//! King move generation
//!
//! Kings step one square in any direction. Castling is generated here as
//! well, under the usual conditions:
//!
//! - king and rook have not moved
//! - every square between them is empty
//! - the king is not in check
//! - the king does not pass through or land on an attacked square

use super::attack::{is_in_check, is_square_attacked};
use super::classify;
use crate::board::Board;
use crate::constants::{KING_FILE, KING_OFFSETS, ROOK_FILES};
use crate::types::{MoveType, Piece, PieceType, Square};

pub fn king_moves(board: &Board, piece: &Piece) -> Vec<(Square, MoveType)> {
    let steps = KING_OFFSETS
        .iter()
        .filter_map(|(df, dr)| piece.square.offset(*df, *dr))
        .filter(|sq| {
            board
                .piece_at(*sq)
                .map(|other| other.color != piece.color)
                .unwrap_or(true)
        })
        .collect();
    let mut moves = classify(board, piece, steps);

    if can_castle(board, piece, true) {
        moves.push((
            Square {
                file: KING_FILE + 2,
                rank: piece.square.rank,
            },
            MoveType::CastleKingside,
        ));
    }
    if can_castle(board, piece, false) {
        moves.push((
            Square {
                file: KING_FILE - 2,
                rank: piece.square.rank,
            },
            MoveType::CastleQueenside,
        ));
    }
    moves
}

/// Castling availability for one side
pub fn can_castle(board: &Board, king: &Piece, kingside: bool) -> bool {
    let rank = king.color.home_rank();
    if king.has_moved || king.square != (Square { file: KING_FILE, rank }) {
        return false;
    }
    let rook_file = if kingside { ROOK_FILES.1 } else { ROOK_FILES.0 };
    let rook_ok = board
        .piece_at(Square {
            file: rook_file,
            rank,
        })
        .is_some_and(|r| r.piece_type == PieceType::Rook && r.color == king.color && !r.has_moved);
    if !rook_ok {
        return false;
    }

    let (low, high) = if kingside {
        (KING_FILE + 1, rook_file - 1)
    } else {
        (rook_file + 1, KING_FILE - 1)
    };
    if (low..=high).any(|file| board.is_occupied(Square { file, rank })) {
        return false;
    }

    if is_in_check(board, king.color) {
        return false;
    }
    let passing: [u8; 2] = if kingside {
        [KING_FILE + 1, KING_FILE + 2]
    } else {
        [KING_FILE - 1, KING_FILE - 2]
    };
    !passing
        .iter()
        .any(|file| is_square_attacked(board, Square { file: *file, rank }, king.color.opposite()))
}
