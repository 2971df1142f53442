//! Authoritative per-game state
//!
//! [`GameState`] is the canonical snapshot the store persists: board, phase,
//! pools, open duel or retreat, history and status. Loading a game is a
//! single deserialisation, never a replay of its history.
//!
//! ## Phase invariants
//!
//! | Phase             | `duel`  | `retreat` |
//! |-------------------|---------|-----------|
//! | `NORMAL_MOVE`     | `None`  | `None`    |
//! | `DUEL_ALLOCATION` | `Some`  | `None`    |
//! | `TACTICAL_RETREAT`| `None`  | `Some`    |

use super::captured::CapturedPieces;
use super::duel::ActiveDuel;
use super::error::{GameError, GameResult};
use super::history::MoveHistory;
use super::ledger::BpLedger;
use super::retreat::RetreatContext;
use super::types::{Color, GameId};
use chess_rules::Board;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    /// Side to move may submit a move
    #[default]
    NormalMove,
    /// Both sides owe a secret allocation
    DuelAllocation,
    /// Losing attacker picks a retreat square
    TacticalRetreat,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GamePhase::NormalMove => "NORMAL_MOVE",
            GamePhase::DuelAllocation => "DUEL_ALLOCATION",
            GamePhase::TacticalRetreat => "TACTICAL_RETREAT",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Active,
    Checkmate {
        winner: Color,
    },
    Stalemate,
    Resigned {
        winner: Color,
    },
    /// Ended by an outside collaborator (clock, abandonment)
    Ended {
        reason: String,
    },
    /// Corrupted state; kept for inspection, never mutated again
    Flagged {
        reason: String,
    },
}

impl GameStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, GameStatus::Active)
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } | GameStatus::Resigned { winner } => Some(*winner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: GameId,
    pub board: Board,
    pub phase: GamePhase,
    /// Side that owns the current phase
    pub turn: Color,
    pub ledger: BpLedger,
    pub duel: Option<ActiveDuel>,
    pub retreat: Option<RetreatContext>,
    pub history: MoveHistory,
    pub captured: CapturedPieces,
    pub status: GameStatus,
    /// Incremented on every save
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameState {
    pub fn new(game_id: GameId, board: Board, starting_bp: u32) -> Self {
        let now = Utc::now();
        Self {
            game_id,
            board,
            phase: GamePhase::NormalMove,
            turn: Color::White,
            ledger: BpLedger::new(starting_bp),
            duel: None,
            retreat: None,
            history: MoveHistory::default(),
            captured: CapturedPieces::default(),
            status: GameStatus::Active,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fail unless the game accepts mutations
    pub fn ensure_active(&self) -> GameResult<()> {
        match &self.status {
            GameStatus::Active => Ok(()),
            GameStatus::Flagged { reason } => Err(GameError::GameFlagged {
                reason: reason.clone(),
            }),
            _ => Err(GameError::GameOver),
        }
    }

    pub fn ensure_phase(&self, phase: GamePhase) -> GameResult<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::WrongPhase { phase: self.phase })
        }
    }

    /// Check everything that must hold before a save
    pub fn check_invariants(&self) -> GameResult<()> {
        self.board
            .validate()
            .map_err(|e| GameError::internal(e.to_string()))?;
        let consistent = match self.phase {
            GamePhase::NormalMove => self.duel.is_none() && self.retreat.is_none(),
            GamePhase::DuelAllocation => self.duel.is_some() && self.retreat.is_none(),
            GamePhase::TacticalRetreat => self.duel.is_none() && self.retreat.is_some(),
        };
        if !consistent {
            return Err(GameError::internal(format!(
                "phase {} does not match duel/retreat context",
                self.phase
            )));
        }
        Ok(())
    }

    /// Hand the move to the other side and return to `NORMAL_MOVE`
    pub fn pass_turn(&mut self) {
        self.turn = self.turn.opposite();
        self.phase = GamePhase::NormalMove;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_starts_in_normal_move() {
        let state = GameState::new(GameId::new(), Board::standard(), 39);
        assert_eq!(state.phase, GamePhase::NormalMove);
        assert_eq!(state.turn, Color::White);
        assert_eq!(state.ledger.balance(Color::Black), 39);
        assert!(state.check_invariants().is_ok());
        assert!(state.ensure_active().is_ok());
    }

    #[test]
    fn phase_without_context_is_an_invariant_violation() {
        let mut state = GameState::new(GameId::new(), Board::standard(), 39);
        state.phase = GamePhase::DuelAllocation;
        assert!(state.check_invariants().unwrap_err().is_internal());
    }

    #[test]
    fn phase_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&GamePhase::TacticalRetreat).unwrap();
        assert_eq!(json, "\"TACTICAL_RETREAT\"");
    }

    #[test]
    fn finished_games_refuse_mutation() {
        let mut state = GameState::new(GameId::new(), Board::standard(), 39);
        state.status = GameStatus::Resigned {
            winner: Color::Black,
        };
        assert!(matches!(state.ensure_active(), Err(GameError::GameOver)));
        state.status = GameStatus::Flagged {
            reason: "missing king".into(),
        };
        assert!(matches!(
            state.ensure_active(),
            Err(GameError::GameFlagged { .. })
        ));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let state = GameState::new(GameId::new(), Board::standard(), 39);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
