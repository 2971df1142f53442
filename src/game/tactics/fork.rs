//! Fork detection

use super::{PatternDetector, TacticInstance, TacticKind, TacticalContext};
use chess_rules::move_gen::attacks;
use chess_rules::PieceType;

/// One piece attacking two or more non-king enemy pieces
pub struct ForkDetector;

impl PatternDetector for ForkDetector {
    fn detect(&self, ctx: &TacticalContext) -> Vec<TacticInstance> {
        let enemy = ctx.perspective.opposite();
        let mut found = Vec::new();
        for attacker in ctx.board.pieces_of(ctx.perspective) {
            let targets: Vec<_> = ctx
                .board
                .pieces_of(enemy)
                .filter(|e| e.piece_type != PieceType::King)
                .filter(|e| attacks(ctx.board, attacker, e.square))
                .map(|e| e.id)
                .collect();
            if targets.len() >= 2 {
                found.push(TacticInstance::new(
                    TacticKind::Fork,
                    Some(attacker.id),
                    targets,
                ));
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{Board, Color, Square, StandardOracle};

    fn detect(placement: &str, perspective: Color) -> Vec<TacticInstance> {
        let board = Board::from_placement(placement).unwrap();
        let oracle = StandardOracle;
        let ctx = TacticalContext {
            board: &board,
            perspective,
            oracle: &oracle,
        };
        ForkDetector.detect(&ctx)
    }

    #[test]
    fn knight_forks_rook_and_queen() {
        // Knight d5 hits c7 rook and f6 queen
        let found = detect("4k3/2r5/5q2/3N4/8/8/8/4K3", Color::White);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].targets.len(), 2);
    }

    #[test]
    fn king_does_not_count_as_fork_target() {
        // Knight d6 hits e8 king and b7 pawn: only one non-king target
        let found = detect("4k3/1p6/3N4/8/8/8/8/4K3", Color::White);
        assert!(found.is_empty());
    }

    #[test]
    fn pawn_fork() {
        let board = Board::from_placement("4k3/8/8/2n1b3/3P4/8/8/4K3").unwrap();
        let found = detect("4k3/8/8/2n1b3/3P4/8/8/4K3", Color::White);
        let pawn = board
            .piece_at(Square::from_algebraic("d4").unwrap())
            .unwrap()
            .id;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attacker, Some(pawn));
    }
}
