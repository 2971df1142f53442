//! Board model and move-legality oracle
//!
//! This crate answers the questions the duel engine asks about an ordinary
//! chess position: where the pieces are, which squares they attack, whether a
//! move is legal, and whether a side is in check, checkmated or stalemated.
//! It knows nothing about Battle Points, duels or retreats.
//!
//! # Module Structure
//!
//! - `types` - Squares, colors, piece tags and move classification
//! - `board` - Immutable-by-convention board snapshot with invariant checks
//! - `move_gen` - Attack geometry and pseudo-legal move generation per piece
//! - `oracle` - The [`MoveOracle`] seam and the [`StandardOracle`] implementation
//! - `error` - [`RulesError`] returned by fallible operations

pub mod board;
pub mod constants;
pub mod error;
pub mod move_gen;
pub mod oracle;
pub mod types;

pub use board::Board;
pub use error::{MoveRejection, RulesError, RulesResult};
pub use oracle::{MoveOracle, StandardOracle};
pub use types::{ChessMove, Color, MoveType, Piece, PieceId, PieceType, Square};
