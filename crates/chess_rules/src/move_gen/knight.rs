//! Knight move generation

use crate::board::Board;
use crate::constants::KNIGHT_OFFSETS;
use crate::types::{Piece, Square};

/// Knight jumps that stay on the board and do not land on a friendly piece
pub fn knight_targets(board: &Board, piece: &Piece) -> Vec<Square> {
    KNIGHT_OFFSETS
        .iter()
        .filter_map(|(df, dr)| piece.square.offset(*df, *dr))
        .filter(|sq| {
            board
                .piece_at(*sq)
                .map(|other| other.color != piece.color)
                .unwrap_or(true)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_knight_has_two_jumps() {
        let board = Board::standard();
        let knight = *board
            .piece_at(Square::from_algebraic("b1").unwrap())
            .unwrap();
        let mut targets = knight_targets(&board, &knight);
        targets.sort();
        let names: Vec<_> = targets.iter().map(|s| s.to_algebraic()).collect();
        assert_eq!(names, ["a3", "c3"]);
    }
}
