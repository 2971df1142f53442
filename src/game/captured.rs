//! Captured pieces
//!
//! Tracks which pieces each side has taken through won duels and derives the
//! material balance from [`PieceType::value`].

use super::types::{Color, PieceType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPieces {
    /// Black pieces taken by White
    pub white_captured: Vec<PieceType>,
    /// White pieces taken by Black
    pub black_captured: Vec<PieceType>,
}

impl CapturedPieces {
    /// Record a capture by the color of the piece that was lost
    pub fn add_capture(&mut self, captured_piece_color: Color, piece_type: PieceType) {
        match captured_piece_color {
            Color::White => self.black_captured.push(piece_type),
            Color::Black => self.white_captured.push(piece_type),
        }
    }

    /// Pieces taken by `color`
    pub fn taken_by(&self, color: Color) -> &[PieceType] {
        match color {
            Color::White => &self.white_captured,
            Color::Black => &self.black_captured,
        }
    }

    /// Positive when White is ahead
    pub fn material_advantage(&self) -> i32 {
        let score = |pieces: &[PieceType]| -> i32 { pieces.iter().map(|p| p.value() as i32).sum() };
        score(&self.white_captured) - score(&self.black_captured)
    }
}
