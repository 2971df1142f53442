//! Move history
//!
//! An append-only log with one [`MoveRecord`] per completed ply. A ply is
//! complete when the turn passes: a quiet move, a won capture, a failed
//! capture that snapped back, or a tactical retreat. Records are never
//! edited after they are appended.

use super::duel::DuelOutcome;
use super::ledger::BpLedger;
use super::tactics::TacticKind;
use super::types::{Color, MoveType, PieceId, PieceType, Square};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a losing attacker ended up and what it paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetreatRecord {
    pub to: Square,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Zero-based ply index
    pub ply: u32,
    pub color: Color,
    pub piece: PieceType,
    pub piece_id: PieceId,
    pub from: Square,
    /// Destination requested by the mover; for a failed capture this is the defender's square
    pub to: Square,
    pub move_type: MoveType,
    pub promotion: Option<PieceType>,
    pub captured: Option<PieceType>,
    pub duel: Option<DuelOutcome>,
    pub retreat: Option<RetreatRecord>,
    /// Tactic kinds that earned a bonus on this ply
    pub tactics: Vec<TacticKind>,
    pub regenerated: u32,
    pub pools_after: BpLedger,
    pub recorded_at: DateTime<Utc>,
}

/// Chronological list of completed plies.
///
/// Index 0 is White's first move, index 1 Black's reply, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistory {
    moves: Vec<MoveRecord>,
}

impl MoveHistory {
    /// Append a record. Call after the board and ledger are updated and
    /// before the turn switches.
    pub fn add_move(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn get(&self, ply: usize) -> Option<&MoveRecord> {
        self.moves.get(ply)
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Ply index the next record will carry
    pub fn next_ply(&self) -> u32 {
        self.moves.len() as u32
    }

    /// Number of duels fought so far
    pub fn duel_count(&self) -> usize {
        self.moves.iter().filter(|m| m.duel.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ply: u32, duel: Option<DuelOutcome>) -> MoveRecord {
        MoveRecord {
            ply,
            color: if ply % 2 == 0 { Color::White } else { Color::Black },
            piece: PieceType::Pawn,
            piece_id: PieceId(8),
            from: Square::new(4, 1).unwrap(),
            to: Square::new(4, 3).unwrap(),
            move_type: MoveType::DoublePawnPush,
            promotion: None,
            captured: None,
            duel,
            retreat: None,
            tactics: Vec::new(),
            regenerated: 1,
            pools_after: BpLedger::new(39),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_history_starts_empty() {
        let history = MoveHistory::default();
        assert!(history.is_empty());
        assert_eq!(history.next_ply(), 0);
        assert!(history.last_move().is_none());
    }

    #[test]
    fn test_add_move_appends_in_order() {
        let mut history = MoveHistory::default();
        history.add_move(record(0, None));
        history.add_move(record(
            1,
            Some(DuelOutcome::resolve(2, 2)),
        ));

        assert_eq!(history.len(), 2);
        assert_eq!(history.next_ply(), 2);
        assert_eq!(history.get(0).unwrap().color, Color::White);
        assert_eq!(history.last_move().unwrap().ply, 1);
        assert_eq!(history.duel_count(), 1);
    }
}
