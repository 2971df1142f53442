//! Attack geometry
//!
//! "Attacks" means the piece could capture on the square if an enemy stood
//! there: pawns attack diagonally forward whatever occupies the square,
//! sliders attack up to and including the first occupied square.

use crate::board::Board;
use crate::constants::{KING_OFFSETS, KNIGHT_OFFSETS};
use crate::types::{Color, Piece, PieceType, Square};

/// Does `piece` attack `target` on this board?
pub fn attacks(board: &Board, piece: &Piece, target: Square) -> bool {
    if piece.square == target {
        return false;
    }
    let (df, dr) = piece.square.delta_to(target);
    match piece.piece_type {
        PieceType::Pawn => dr == piece.color.pawn_direction() && df.abs() == 1,
        PieceType::Knight => KNIGHT_OFFSETS.contains(&(df, dr)),
        PieceType::King => KING_OFFSETS.contains(&(df, dr)),
        PieceType::Bishop | PieceType::Rook | PieceType::Queen => {
            match line_direction(piece.square, target) {
                Some(dir) if piece.piece_type.directions().contains(&dir) => {
                    line_between(piece.square, target)
                        .into_iter()
                        .all(|sq| !board.is_occupied(sq))
                }
                _ => false,
            }
        }
    }
}

/// Every square `piece` attacks, in generation order
pub fn attacked_squares(board: &Board, piece: &Piece) -> Vec<Square> {
    match piece.piece_type {
        PieceType::Pawn => [-1, 1]
            .iter()
            .filter_map(|df| piece.square.offset(*df, piece.color.pawn_direction()))
            .collect(),
        PieceType::Knight => KNIGHT_OFFSETS
            .iter()
            .filter_map(|(df, dr)| piece.square.offset(*df, *dr))
            .collect(),
        PieceType::King => KING_OFFSETS
            .iter()
            .filter_map(|(df, dr)| piece.square.offset(*df, *dr))
            .collect(),
        PieceType::Bishop | PieceType::Rook | PieceType::Queen => piece
            .piece_type
            .directions()
            .iter()
            .flat_map(|dir| ray(board, piece.square, *dir))
            .collect(),
    }
}

/// Is `square` attacked by any piece of color `by`?
pub fn is_square_attacked(board: &Board, square: Square, by: Color) -> bool {
    board.pieces_of(by).any(|p| attacks(board, p, square))
}

/// Is `color`'s king attacked? A board without that king reports `false`.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king(color)
        .map(|king| is_square_attacked(board, king.square, color.opposite()))
        .unwrap_or(false)
}

/// Walk from `from` (exclusive) along `dir`, stopping after the first
/// occupied square or at the edge.
pub fn ray(board: &Board, from: Square, dir: (i8, i8)) -> Vec<Square> {
    let mut squares = Vec::new();
    let mut current = from;
    while let Some(next) = current.offset(dir.0, dir.1) {
        squares.push(next);
        if board.is_occupied(next) {
            break;
        }
        current = next;
    }
    squares
}

/// Unit step from `a` towards `b` when they share a rank, file or diagonal
pub fn line_direction(a: Square, b: Square) -> Option<(i8, i8)> {
    if a == b {
        return None;
    }
    let (df, dr) = a.delta_to(b);
    if df == 0 || dr == 0 || df.abs() == dr.abs() {
        Some((df.signum(), dr.signum()))
    } else {
        None
    }
}

/// Squares strictly between `a` and `b`; empty when they are not aligned
pub fn line_between(a: Square, b: Square) -> Vec<Square> {
    let Some((sf, sr)) = line_direction(a, b) else {
        return Vec::new();
    };
    let mut squares = Vec::new();
    let mut current = a;
    while let Some(next) = current.offset(sf, sr) {
        if next == b {
            break;
        }
        squares.push(next);
        current = next;
    }
    squares
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn rook_attack_is_blocked() {
        let board = Board::from_placement("4k3/8/8/8/R2p3q/8/8/4K3").unwrap();
        let rook = *board.piece_at(sq("a4")).unwrap();
        assert!(attacks(&board, &rook, sq("d4")));
        assert!(!attacks(&board, &rook, sq("h4")));
    }

    #[test]
    fn pawn_attacks_diagonally_forward_only() {
        let board = Board::from_placement("4k3/8/8/8/8/8/4P3/4K3").unwrap();
        let pawn = *board.piece_at(sq("e2")).unwrap();
        assert!(attacks(&board, &pawn, sq("d3")));
        assert!(attacks(&board, &pawn, sq("f3")));
        assert!(!attacks(&board, &pawn, sq("e3")));
        assert!(!attacks(&board, &pawn, sq("d1")));
    }

    #[test]
    fn check_detection() {
        let board = Board::from_placement("4k3/8/8/8/8/8/8/4K2r").unwrap();
        assert!(is_in_check(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
    }

    #[test]
    fn line_between_diagonal() {
        let between = line_between(sq("a1"), sq("d4"));
        assert_eq!(between, vec![sq("b2"), sq("c3")]);
        assert!(line_between(sq("a1"), sq("b3")).is_empty());
    }

    #[test]
    fn ray_includes_first_blocker() {
        let board = Board::from_placement("4k3/8/8/8/8/2p5/8/B3K3").unwrap();
        assert_eq!(ray(&board, sq("a1"), (1, 1)), vec![sq("b2"), sq("c3")]);
    }
}
