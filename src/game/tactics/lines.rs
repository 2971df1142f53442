//! Pins and skewers
//!
//! Both patterns are a friendly slider looking down one of its rays at two
//! enemy pieces in a row. What separates them is what stands behind:
//!
//! - **Pin**: the enemy king is behind exactly one enemy piece
//! - **Skewer**: the nearer enemy is worth at least as much as the farther
//!   one, which is not the king (king counts as the highest value)

use super::{PatternDetector, TacticInstance, TacticKind, TacticalContext};
use chess_rules::move_gen::{line_between, line_direction, ray};
use chess_rules::{Board, Piece, PieceType};

pub struct PinDetector;

impl PatternDetector for PinDetector {
    fn detect(&self, ctx: &TacticalContext) -> Vec<TacticInstance> {
        let Some(king) = ctx.board.king(ctx.perspective.opposite()) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for slider in sliders(ctx) {
            let aligned = line_direction(slider.square, king.square)
                .is_some_and(|dir| slider.piece_type.directions().contains(&dir));
            if !aligned {
                continue;
            }
            let blockers: Vec<&Piece> = line_between(slider.square, king.square)
                .into_iter()
                .filter_map(|sq| ctx.board.piece_at(sq))
                .collect();
            if let [pinned] = blockers.as_slice() {
                if pinned.color == king.color {
                    found.push(TacticInstance::new(
                        TacticKind::Pin,
                        Some(slider.id),
                        vec![pinned.id],
                    ));
                }
            }
        }
        found
    }
}

pub struct SkewerDetector;

impl PatternDetector for SkewerDetector {
    fn detect(&self, ctx: &TacticalContext) -> Vec<TacticInstance> {
        let mut found = Vec::new();
        for slider in sliders(ctx) {
            for dir in slider.piece_type.directions() {
                let Some((front, back)) = first_two_on_ray(ctx.board, slider, *dir) else {
                    continue;
                };
                let enemy = slider.color.opposite();
                if front.color != enemy || back.color != enemy {
                    continue;
                }
                if back.piece_type == PieceType::King {
                    continue;
                }
                if front.piece_type.value() >= back.piece_type.value() {
                    found.push(TacticInstance::new(
                        TacticKind::Skewer,
                        Some(slider.id),
                        vec![front.id, back.id],
                    ));
                }
            }
        }
        found
    }
}

fn sliders<'a>(ctx: &'a TacticalContext<'a>) -> impl Iterator<Item = &'a Piece> + 'a {
    ctx.board
        .pieces_of(ctx.perspective)
        .filter(|p| p.piece_type.is_sliding())
}

/// First and second occupied squares along a ray from `slider`
fn first_two_on_ray<'b>(
    board: &'b Board,
    slider: &Piece,
    dir: (i8, i8),
) -> Option<(&'b Piece, &'b Piece)> {
    let front_square = *ray(board, slider.square, dir).last()?;
    let front = board.piece_at(front_square)?;
    let back_square = *ray(board, front_square, dir).last()?;
    let back = board.piece_at(back_square)?;
    Some((front, back))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{Color, StandardOracle};

    fn run(detector: &dyn PatternDetector, placement: &str) -> Vec<TacticInstance> {
        let board = Board::from_placement(placement).unwrap();
        let oracle = StandardOracle;
        let ctx = TacticalContext {
            board: &board,
            perspective: Color::White,
            oracle: &oracle,
        };
        detector.detect(&ctx)
    }

    #[test]
    fn rook_pins_knight_to_king() {
        let found = run(&PinDetector, "4k3/8/4n3/8/8/8/8/K3R3");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, TacticKind::Pin);
    }

    #[test]
    fn two_blockers_is_not_a_pin() {
        assert!(run(&PinDetector, "4k3/4p3/4n3/8/8/8/8/K3R3").is_empty());
    }

    #[test]
    fn friendly_blocker_is_not_a_pin() {
        assert!(run(&PinDetector, "4k3/8/4N3/8/8/8/8/K3R3").is_empty());
    }

    #[test]
    fn king_in_front_of_rook_is_a_skewer() {
        // Bishop b2 looks through e5 king to h8 rook
        let found = run(&SkewerDetector, "7r/8/8/4k3/8/8/1B6/K7");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, TacticKind::Skewer);
        assert_eq!(found[0].targets.len(), 2);
    }

    #[test]
    fn queen_in_front_of_rook_is_a_skewer() {
        assert_eq!(run(&SkewerDetector, "k7/8/8/r2q3R/8/8/8/7K").len(), 1);
    }

    #[test]
    fn equal_values_in_line_are_a_skewer() {
        let found = run(&SkewerDetector, "k7/8/8/r2r3R/8/8/8/7K");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, TacticKind::Skewer);
    }

    #[test]
    fn cheap_piece_in_front_is_not_a_skewer() {
        assert!(run(&SkewerDetector, "k7/8/8/q2p3R/8/8/8/7K").is_empty());
    }

    #[test]
    fn king_behind_is_left_to_pins() {
        assert!(run(&SkewerDetector, "4k3/8/4n3/8/8/8/8/K3R3").is_empty());
    }
}
