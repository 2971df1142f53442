//! Direction vectors and board setup constants
//!
//! Directions are `(file_delta, rank_delta)` pairs. Rank deltas are positive
//! towards Black's side of the board (rank 0 is White's back rank).

/// Number of files and ranks
pub const BOARD_SIZE: u8 = 8;

/// Orthogonal rays used by rooks and queens
pub const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Diagonal rays used by bishops and queens
pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// All eight rays; queens slide along every one of them
pub const QUEEN_DIRS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Single-step king offsets
pub const KING_OFFSETS: [(i8, i8); 8] = QUEEN_DIRS;

/// Knight jumps, clockwise starting from "two up, one right"
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Piece order on each back rank, file a through h
pub const BACK_RANK: [crate::types::PieceType; 8] = {
    use crate::types::PieceType::*;
    [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook]
};

/// FEN piece placement of the standard starting position
pub const STANDARD_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// File of the king's home square
pub const KING_FILE: u8 = 4;

/// Files of the rooks' home squares (queenside, kingside)
pub const ROOK_FILES: (u8, u8) = (0, 7);
