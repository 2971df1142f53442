//! Move legality oracle
//!
//! The duel engine never decides on its own whether a move is legal chess.
//! It asks a [`MoveOracle`]. [`StandardOracle`] implements ordinary FIDE
//! movement with one refinement: kings are never captured, so a move whose
//! destination holds a king is rejected.
//!
//! ## Validation order
//!
//! 1. origin and destination differ
//! 2. a piece stands on the origin
//! 3. the destination is not a friendly piece and not a king
//! 4. the piece pattern reaches the destination (castling included)
//! 5. the promotion piece fits the move
//! 6. the move does not leave the mover's king attacked

use crate::board::Board;
use crate::error::{MoveRejection, RulesError, RulesResult};
use crate::move_gen::{self, attack};
use crate::types::{ChessMove, Color, MoveType, PieceType, Square};

pub trait MoveOracle: Send + Sync {
    /// Validate and classify a move. A missing promotion defaults to a queen.
    fn validate_move(
        &self,
        board: &Board,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> RulesResult<ChessMove>;

    fn is_in_check(&self, board: &Board, color: Color) -> bool;

    fn is_checkmate(&self, board: &Board, color: Color) -> bool;

    fn is_stalemate(&self, board: &Board, color: Color) -> bool;

    /// Would moving the piece on `from` to `to` leave `color`'s king attacked?
    fn would_result_in_check(&self, board: &Board, from: Square, to: Square, color: Color)
        -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardOracle;

impl StandardOracle {
    pub fn new() -> Self {
        Self
    }

    /// Every legal move for `color`, promotions expanded to a queen
    pub fn legal_moves(&self, board: &Board, color: Color) -> Vec<ChessMove> {
        let mut moves = Vec::new();
        for piece in board.pieces_of(color) {
            for (to, move_type) in move_gen::pseudo_legal_moves(board, piece) {
                if board
                    .piece_at(to)
                    .is_some_and(|p| p.piece_type == PieceType::King)
                {
                    continue;
                }
                let promotion = matches!(
                    move_type,
                    MoveType::Promotion | MoveType::PromotionCapture
                )
                .then_some(PieceType::Queen);
                let mv = ChessMove {
                    from: piece.square,
                    to,
                    move_type,
                    promotion,
                };
                if !leaves_in_check(board, &mv, color) {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    fn has_legal_move(&self, board: &Board, color: Color) -> bool {
        !self.legal_moves(board, color).is_empty()
    }
}

impl MoveOracle for StandardOracle {
    fn validate_move(
        &self,
        board: &Board,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> RulesResult<ChessMove> {
        let reject = |reason| RulesError::InvalidMove { from, to, reason };

        if from == to {
            return Err(reject(MoveRejection::SameSquare));
        }
        let piece = board.piece_at(from).ok_or(RulesError::NoPieceAtSquare(from))?;
        if let Some(target) = board.piece_at(to) {
            if target.color == piece.color {
                return Err(reject(MoveRejection::OwnPiece));
            }
            if target.piece_type == PieceType::King {
                return Err(reject(MoveRejection::KingCapture));
            }
        }

        let candidates = move_gen::pseudo_legal_moves(board, piece);
        let Some(&(_, move_type)) = candidates.iter().find(|(sq, _)| *sq == to) else {
            return Err(reject(explain_unreachable(board, piece.piece_type, from, to)));
        };

        let promotes = matches!(
            move_type,
            MoveType::Promotion | MoveType::PromotionCapture
        );
        let promotion = match (promotes, promotion) {
            (true, None) => Some(PieceType::Queen),
            (true, Some(p)) if p.is_promotion_target() => Some(p),
            (false, None) => None,
            _ => return Err(reject(MoveRejection::InvalidPromotion)),
        };

        let mv = ChessMove {
            from,
            to,
            move_type,
            promotion,
        };
        if leaves_in_check(board, &mv, piece.color) {
            return Err(reject(MoveRejection::LeavesKingInCheck));
        }
        Ok(mv)
    }

    fn is_in_check(&self, board: &Board, color: Color) -> bool {
        attack::is_in_check(board, color)
    }

    fn is_checkmate(&self, board: &Board, color: Color) -> bool {
        attack::is_in_check(board, color) && !self.has_legal_move(board, color)
    }

    fn is_stalemate(&self, board: &Board, color: Color) -> bool {
        !attack::is_in_check(board, color) && !self.has_legal_move(board, color)
    }

    fn would_result_in_check(
        &self,
        board: &Board,
        from: Square,
        to: Square,
        color: Color,
    ) -> bool {
        let Some(piece) = board.piece_at(from) else {
            return attack::is_in_check(board, color);
        };
        let move_type = move_gen::pseudo_legal_moves(board, piece)
            .into_iter()
            .find(|(sq, _)| *sq == to)
            .map(|(_, t)| t)
            .unwrap_or(MoveType::Quiet);
        let mv = ChessMove {
            from,
            to,
            move_type,
            promotion: None,
        };
        leaves_in_check(board, &mv, color)
    }
}

fn leaves_in_check(board: &Board, mv: &ChessMove, color: Color) -> bool {
    let mut after = board.clone();
    match after.apply(mv) {
        Ok(_) => attack::is_in_check(&after, color),
        Err(_) => true,
    }
}

/// Distinguish a blocked line from a shape the piece cannot move in
fn explain_unreachable(
    board: &Board,
    piece_type: PieceType,
    from: Square,
    to: Square,
) -> MoveRejection {
    if piece_type == PieceType::King && from.rank == to.rank && from.file.abs_diff(to.file) == 2 {
        return MoveRejection::CastlingNotAllowed;
    }
    let blocked_line = piece_type.is_sliding()
        && attack::line_direction(from, to)
            .is_some_and(|dir| piece_type.directions().contains(&dir))
        && attack::line_between(from, to)
            .into_iter()
            .any(|sq| board.is_occupied(sq));
    let blocked_pawn = piece_type == PieceType::Pawn
        && from.file == to.file
        && (board.is_occupied(to)
            || attack::line_between(from, to)
                .into_iter()
                .any(|sq| board.is_occupied(sq)));
    if blocked_line || blocked_pawn {
        MoveRejection::PathBlocked
    } else {
        MoveRejection::IllegalPattern
    }
}
