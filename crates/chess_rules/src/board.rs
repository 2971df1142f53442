//! Board snapshot
//!
//! A [`Board`] is a list of [`Piece`]s ordered by id plus the en passant
//! target square. Cloning a board is the way to take a snapshot; tactic
//! detection compares two snapshots of the same game.
//!
//! ## Invariants
//!
//! - no two pieces share a square
//! - piece ids are unique
//! - exactly one king per color
//!
//! [`Board::validate`] checks all three. Mutators (`apply`, `relocate`) keep
//! the first two by construction; the king invariant is checked by callers
//! before persisting.

use crate::constants::{BACK_RANK, BOARD_SIZE, KING_FILE, ROOK_FILES};
use crate::error::{RulesError, RulesResult};
use crate::types::{ChessMove, Color, MoveType, Piece, PieceId, PieceType, Square};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pieces: Vec<Piece>,
    en_passant: Option<Square>,
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// Standard starting position.
    ///
    /// Ids run a1..h1, a2..h2, a7..h7, a8..h8 (0..31), matching the order
    /// [`Board::from_placement`] assigns for the same layout.
    pub fn standard() -> Self {
        let mut pieces = Vec::with_capacity(32);
        let mut push = |piece_type, color, file, rank| {
            pieces.push(Piece {
                id: PieceId(pieces.len() as u8),
                piece_type,
                color,
                square: Square { file, rank },
                has_moved: false,
            });
        };
        for (file, piece_type) in BACK_RANK.iter().enumerate() {
            push(*piece_type, Color::White, file as u8, 0);
        }
        for file in 0..BOARD_SIZE {
            push(PieceType::Pawn, Color::White, file, 1);
        }
        for file in 0..BOARD_SIZE {
            push(PieceType::Pawn, Color::Black, file, 6);
        }
        for (file, piece_type) in BACK_RANK.iter().enumerate() {
            push(*piece_type, Color::Black, file as u8, 7);
        }
        Self {
            pieces,
            en_passant: None,
        }
    }

    /// Board with no pieces; fails [`Board::validate`] until both kings are placed
    pub fn empty() -> Self {
        Self {
            pieces: Vec::new(),
            en_passant: None,
        }
    }

    /// Build a board from the piece-placement field of a FEN string.
    ///
    /// Ids are assigned scanning rank 1 to rank 8, file a to h. Pawns off
    /// their start rank and kings or rooks off their home squares are
    /// marked as moved, so castling rights follow from the placement.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let board = Board::from_placement("4k3/8/8/8/8/8/8/R3K2R")?;
    /// assert_eq!(board.pieces().len(), 4);
    /// ```
    pub fn from_placement(placement: &str) -> RulesResult<Self> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(RulesError::InvalidPlacement(format!(
                "expected 8 ranks, found {}",
                rows.len()
            )));
        }

        let mut found = Vec::new();
        for (row_index, row) in rows.iter().enumerate() {
            let rank = BOARD_SIZE - 1 - row_index as u8;
            let mut file = 0u8;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || u32::from(file) + skip > u32::from(BOARD_SIZE) {
                        return Err(RulesError::InvalidPlacement(format!(
                            "rank {} has a bad empty-square count '{c}'",
                            rank + 1
                        )));
                    }
                    file += skip as u8;
                    continue;
                }
                let (piece_type, color) = PieceType::from_char(c).ok_or_else(|| {
                    RulesError::InvalidPlacement(format!("unknown piece letter '{c}'"))
                })?;
                if file >= BOARD_SIZE {
                    return Err(RulesError::InvalidPlacement(format!(
                        "rank {} has more than 8 files",
                        rank + 1
                    )));
                }
                found.push((piece_type, color, Square { file, rank }));
                file += 1;
            }
            if file != BOARD_SIZE {
                return Err(RulesError::InvalidPlacement(format!(
                    "rank {} does not describe 8 files",
                    rank + 1
                )));
            }
        }

        found.sort_by_key(|(_, _, sq)| (sq.rank, sq.file));
        let mut board = Self::empty();
        for (piece_type, color, square) in found {
            board.place(piece_type, color, square)?;
        }
        Ok(board)
    }

    /// Add a piece to the board and return its new id.
    ///
    /// The has-moved flag is derived from the square, as in
    /// [`Board::from_placement`].
    pub fn place(
        &mut self,
        piece_type: PieceType,
        color: Color,
        square: Square,
    ) -> RulesResult<PieceId> {
        if self.is_occupied(square) {
            return Err(RulesError::InvalidPlacement(format!(
                "square {square} is already occupied"
            )));
        }
        let next = self.pieces.iter().map(|p| p.id.0 + 1).max().unwrap_or(0);
        let id = PieceId(next);
        let has_moved = match piece_type {
            PieceType::Pawn => square.rank != color.pawn_start_rank(),
            PieceType::King => square != Square { file: KING_FILE, rank: color.home_rank() },
            PieceType::Rook => {
                square.rank != color.home_rank()
                    || (square.file != ROOK_FILES.0 && square.file != ROOK_FILES.1)
            }
            _ => false,
        };
        self.pieces.push(Piece {
            id,
            piece_type,
            color,
            square,
            has_moved,
        });
        Ok(id)
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(move |p| p.color == color)
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.square == square)
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn king(&self, color: Color) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|p| p.color == color && p.piece_type == PieceType::King)
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.piece_at(square).is_some()
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn clear_en_passant(&mut self) {
        self.en_passant = None;
    }

    /// Check the board invariants
    pub fn validate(&self) -> RulesResult<()> {
        let mut squares = Vec::with_capacity(self.pieces.len());
        let mut ids = Vec::with_capacity(self.pieces.len());
        for piece in &self.pieces {
            if squares.contains(&piece.square) {
                return Err(RulesError::Invariant(format!(
                    "two pieces on {}",
                    piece.square
                )));
            }
            if ids.contains(&piece.id) {
                return Err(RulesError::Invariant(format!(
                    "duplicate piece id {}",
                    piece.id
                )));
            }
            squares.push(piece.square);
            ids.push(piece.id);
        }
        for color in [Color::White, Color::Black] {
            let kings = self
                .pieces_of(color)
                .filter(|p| p.piece_type == PieceType::King)
                .count();
            if kings != 1 {
                return Err(RulesError::Invariant(format!(
                    "{color} has {kings} kings"
                )));
            }
        }
        Ok(())
    }

    /// Execute a move the oracle has already classified.
    ///
    /// Returns the captured piece, if any. Handles the castling rook, the
    /// en passant victim and promotion (the pawn keeps its id and changes
    /// type).
    pub fn apply(&mut self, mv: &ChessMove) -> RulesResult<Option<Piece>> {
        let mover_index = self
            .index_at(mv.from)
            .ok_or(RulesError::NoPieceAtSquare(mv.from))?;
        let mover_color = self.pieces[mover_index].color;

        let victim_square = match mv.move_type {
            MoveType::EnPassant => Square {
                file: mv.to.file,
                rank: mv.from.rank,
            },
            _ => mv.to,
        };
        let captured = match self.index_at(victim_square) {
            Some(index) if self.pieces[index].color != mover_color => {
                Some(self.pieces.remove(index))
            }
            Some(_) => {
                return Err(RulesError::Invariant(format!(
                    "move {mv} lands on a friendly piece"
                )))
            }
            None => None,
        };

        let mover = self
            .pieces
            .iter_mut()
            .find(|p| p.square == mv.from)
            .ok_or(RulesError::NoPieceAtSquare(mv.from))?;
        mover.square = mv.to;
        mover.has_moved = true;
        if let Some(promoted) = mv.promotion {
            mover.piece_type = promoted;
        }

        if mv.move_type.is_castle() {
            let rank = mv.from.rank;
            let (rook_from, rook_to) = match mv.move_type {
                MoveType::CastleKingside => (ROOK_FILES.1, KING_FILE + 1),
                _ => (ROOK_FILES.0, KING_FILE - 1),
            };
            let rook_square = Square {
                file: rook_from,
                rank,
            };
            let rook = self
                .pieces
                .iter_mut()
                .find(|p| p.square == rook_square)
                .ok_or(RulesError::NoPieceAtSquare(rook_square))?;
            rook.square = Square {
                file: rook_to,
                rank,
            };
            rook.has_moved = true;
        }

        self.en_passant = match mv.move_type {
            MoveType::DoublePawnPush => Some(Square {
                file: mv.from.file,
                rank: (mv.from.rank + mv.to.rank) / 2,
            }),
            _ => None,
        };

        Ok(captured)
    }

    /// Move a piece to an empty square outside the normal move rules.
    ///
    /// Used for tactical retreats. Clears the en passant target.
    pub fn relocate(&mut self, id: PieceId, to: Square) -> RulesResult<()> {
        if let Some(occupant) = self.piece_at(to) {
            if occupant.id != id {
                return Err(RulesError::Invariant(format!(
                    "cannot relocate {id} onto occupied {to}"
                )));
            }
        }
        let piece = self
            .pieces
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RulesError::Invariant(format!("piece {id} is not on the board")))?;
        if piece.square != to {
            piece.square = to;
            piece.has_moved = true;
        }
        self.en_passant = None;
        Ok(())
    }

    /// FEN piece-placement field for this board
    pub fn placement(&self) -> String {
        let mut out = String::new();
        for rank in (0..BOARD_SIZE).rev() {
            let mut empty = 0;
            for file in 0..BOARD_SIZE {
                match self.piece_at(Square { file, rank }) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.piece_type.to_char(piece.color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    fn index_at(&self, square: Square) -> Option<usize> {
        self.pieces.iter().position(|p| p.square == square)
    }
}
