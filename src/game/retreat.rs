//! Tactical retreat calculator
//!
//! When an attacker loses its duel it may buy a retreat instead of simply
//! staying on its origin. Options depend on the geometry of the failed
//! attack:
//!
//! - every piece gets the origin at cost 0
//! - knights get the hops that point away from the target, from a table
//!   keyed by the attack displacement; the exact reverse hop costs 1 and the
//!   other two cost 2
//! - bishops, rooks and queens walk backwards along the attack line, paying
//!   one BP per step, and stop at the first occupied square or the edge
//!
//! Options are ordered origin first, then by cost, then by square.

use super::duel::DuelOutcome;
use super::types::{Color, MoveType, PieceId, PieceType, Square};
use chess_rules::constants::KNIGHT_OFFSETS;
use chess_rules::move_gen::line_direction;
use chess_rules::Board;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetreatOption {
    pub square: Square,
    pub cost: u32,
}

/// Pending retreat decision after a lost duel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetreatContext {
    pub piece_id: PieceId,
    pub piece_type: PieceType,
    pub color: Color,
    pub origin: Square,
    /// Square of the failed capture
    pub target: Square,
    pub move_type: MoveType,
    /// Lost duel, recorded with the ply once the retreat completes
    pub outcome: DuelOutcome,
    pub options: Vec<RetreatOption>,
}

impl RetreatContext {
    pub fn option_for(&self, square: Square) -> Option<&RetreatOption> {
        self.options.iter().find(|o| o.square == square)
    }
}

/// Knights and sliders may retreat; everything else snaps back
pub fn is_retreat_eligible(piece_type: PieceType) -> bool {
    piece_type == PieceType::Knight || piece_type.is_sliding()
}

/// Knight retreat hops for an attack displacement `d = target - origin`.
///
/// Returns `(offset, cost)` pairs for hops `o` with `o . d < 0`.
pub fn knight_retreat_table(displacement: (i8, i8)) -> Vec<((i8, i8), u32)> {
    let (dx, dy) = displacement;
    KNIGHT_OFFSETS
        .iter()
        .filter(|(ox, oy)| ox * dx + oy * dy < 0)
        .map(|&(ox, oy)| {
            let cost = if (ox, oy) == (-dx, -dy) { 1 } else { 2 };
            ((ox, oy), cost)
        })
        .collect()
}

pub fn compute_options(
    piece_type: PieceType,
    origin: Square,
    target: Square,
    board: &Board,
) -> Vec<RetreatOption> {
    let mut options = vec![RetreatOption {
        square: origin,
        cost: 0,
    }];

    if piece_type == PieceType::Knight {
        for ((ox, oy), cost) in knight_retreat_table(origin.delta_to(target)) {
            if let Some(square) = origin.offset(ox, oy) {
                if !board.is_occupied(square) {
                    options.push(RetreatOption { square, cost });
                }
            }
        }
    } else if piece_type.is_sliding() {
        if let Some((fx, fy)) = line_direction(origin, target) {
            let (bx, by) = (-fx, -fy);
            let mut current = origin;
            let mut distance = 0;
            while let Some(next) = current.offset(bx, by) {
                if board.is_occupied(next) {
                    break;
                }
                distance += 1;
                options.push(RetreatOption {
                    square: next,
                    cost: distance,
                });
                current = next;
            }
        }
    }

    options.sort_by_key(|o| (o.cost, o.square));
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn squares(options: &[RetreatOption]) -> Vec<(String, u32)> {
        options
            .iter()
            .map(|o| (o.square.to_algebraic(), o.cost))
            .collect()
    }

    #[test]
    fn knight_table_points_away_from_target() {
        let table = knight_retreat_table((1, 2));
        assert_eq!(table.len(), 3);
        assert!(table.contains(&((-1, -2), 1)));
        assert!(table.contains(&((1, -2), 2)));
        assert!(table.contains(&((-2, -1), 2)));
    }

    #[test]
    fn every_knight_displacement_has_three_entries_with_one_reverse() {
        for d in KNIGHT_OFFSETS {
            let table = knight_retreat_table(d);
            assert_eq!(table.len(), 3, "displacement {d:?}");
            assert_eq!(table.iter().filter(|(_, c)| *c == 1).count(), 1);
        }
    }

    #[test]
    fn knight_options_filtered_by_occupancy() {
        // Knight d4 attacked e6; c2 is blocked by a friendly pawn
        let board = Board::from_placement("4k3/8/4p3/8/3N4/8/2P5/4K3").unwrap();
        let options = compute_options(PieceType::Knight, sq("d4"), sq("e6"), &board);
        assert_eq!(
            squares(&options),
            vec![("d4".into(), 0), ("b3".into(), 2), ("e2".into(), 2)]
        );
    }

    #[test]
    fn slider_walks_back_until_blocked() {
        // Rook d4 attacked d8; d1 is occupied by the king
        let board = Board::from_placement("3pk3/8/8/8/3R4/8/8/3K4").unwrap();
        let options = compute_options(PieceType::Rook, sq("d4"), sq("d8"), &board);
        assert_eq!(
            squares(&options),
            vec![("d4".into(), 0), ("d3".into(), 1), ("d2".into(), 2)]
        );
        let costs: Vec<u32> = options.iter().map(|o| o.cost).collect();
        assert!(costs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn slider_at_edge_only_has_origin() {
        let board = Board::from_placement("4k3/8/8/8/8/8/8/B3K3").unwrap();
        let options = compute_options(PieceType::Bishop, sq("a1"), sq("e5"), &board);
        assert_eq!(squares(&options), vec![("a1".into(), 0)]);
    }

    #[test]
    fn pawns_and_kings_get_origin_only() {
        let board = Board::standard();
        for piece in [PieceType::Pawn, PieceType::King] {
            let options = compute_options(piece, sq("e4"), sq("d5"), &board);
            assert_eq!(options, vec![RetreatOption { square: sq("e4"), cost: 0 }]);
            assert!(!is_retreat_eligible(piece));
        }
    }
}
