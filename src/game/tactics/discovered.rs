//! Discovered attacks and discovered checks
//!
//! A discovered pattern needs both snapshots. The moved pieces are the
//! perspective side's pieces whose square changed (two for castling). A
//! friendly slider that did not move, and whose line to an enemy piece is
//! clear after the move but ran across a moved piece's old square before,
//! has had its line opened. The target decides the kind: the enemy king
//! gives [`TacticKind::DiscoveredCheck`], anything else
//! [`TacticKind::DiscoveredAttack`].

use super::{TacticInstance, TacticKind};
use chess_rules::move_gen::{attacks, line_between};
use chess_rules::{Board, Color, PieceType, Square};

pub fn discovered_patterns(
    before: &Board,
    after: &Board,
    perspective: Color,
) -> Vec<TacticInstance> {
    let vacated: Vec<Square> = before
        .pieces_of(perspective)
        .filter(|old| {
            after
                .piece(old.id)
                .map(|new| new.square != old.square)
                .unwrap_or(true)
        })
        .map(|old| old.square)
        .collect();
    if vacated.is_empty() {
        return Vec::new();
    }

    let mut found = Vec::new();
    let enemy = perspective.opposite();
    for slider in after
        .pieces_of(perspective)
        .filter(|p| p.piece_type.is_sliding())
    {
        let stayed = before
            .piece(slider.id)
            .is_some_and(|old| old.square == slider.square);
        if !stayed {
            continue;
        }
        for target in after.pieces_of(enemy) {
            if !attacks(after, slider, target.square) {
                continue;
            }
            let opened = line_between(slider.square, target.square)
                .iter()
                .any(|sq| vacated.contains(sq));
            if opened {
                let kind = if target.piece_type == PieceType::King {
                    TacticKind::DiscoveredCheck
                } else {
                    TacticKind::DiscoveredAttack
                };
                found.push(TacticInstance::new(kind, Some(slider.id), vec![target.id]));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{MoveOracle, StandardOracle};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn after_move(before: &Board, from: &str, to: &str) -> Board {
        let mv = StandardOracle
            .validate_move(before, sq(from), sq(to), None)
            .unwrap();
        let mut after = before.clone();
        after.apply(&mv).unwrap();
        after
    }

    #[test]
    fn knight_uncovers_rook_check() {
        let before = Board::from_placement("4k3/8/8/8/4N3/8/8/K3R3").unwrap();
        let after = after_move(&before, "e4", "c5");
        let found = discovered_patterns(&before, &after, Color::White);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, TacticKind::DiscoveredCheck);
    }

    #[test]
    fn bishop_uncovers_attack_on_queen() {
        let before = Board::from_placement("k3q3/8/8/8/8/4B3/8/K3R3").unwrap();
        let after = after_move(&before, "e3", "g5");
        let found = discovered_patterns(&before, &after, Color::White);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, TacticKind::DiscoveredAttack);
    }

    #[test]
    fn moving_slider_itself_is_not_discovered() {
        let before = Board::from_placement("4k3/8/8/8/8/8/8/K2R4").unwrap();
        let after = after_move(&before, "d1", "e1");
        assert!(discovered_patterns(&before, &after, Color::White).is_empty());
    }

    #[test]
    fn identical_snapshots_find_nothing() {
        let board = Board::from_placement("4k3/8/8/8/4N3/8/8/K3R3").unwrap();
        assert!(discovered_patterns(&board, &board, Color::White).is_empty());
    }
}
