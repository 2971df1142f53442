//! Duels
//!
//! A capture attempt does not capture. It opens an [`ActiveDuel`] and both
//! sides commit BP in secret. Once both allocations are in, the higher bid
//! wins and ties go to the defender.
//!
//! The board is left untouched while the duel is open: the attacker still
//! stands on its origin and the defender on its square. The validated move
//! is kept on the duel and executed only if the attacker wins.

use super::error::{GameError, GameResult};
use super::types::{ChessMove, Color, MoveType, PieceId, PieceType, Square};
use chess_rules::Board;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelRole {
    Attacker,
    Defender,
}

/// Revealed result of a duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelOutcome {
    pub attacker_allocation: u32,
    pub defender_allocation: u32,
    pub winner: DuelRole,
}

impl DuelOutcome {
    /// The attacker needs strictly more than the defender
    pub fn resolve(attacker_allocation: u32, defender_allocation: u32) -> Self {
        let winner = if attacker_allocation > defender_allocation {
            DuelRole::Attacker
        } else {
            DuelRole::Defender
        };
        Self {
            attacker_allocation,
            defender_allocation,
            winner,
        }
    }

    pub fn attacker_won(&self) -> bool {
        self.winner == DuelRole::Attacker
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDuel {
    pub attacker_id: PieceId,
    pub defender_id: PieceId,
    pub attacker_color: Color,
    pub attacker_type: PieceType,
    pub defender_type: PieceType,
    /// Attacker's square before the attempt
    pub origin: Square,
    /// Destination the attacker asked for
    pub target: Square,
    /// Where the defender stands; differs from `target` only for en passant
    pub defender_square: Square,
    /// Move to execute if the attacker wins, promotion included
    pub mv: ChessMove,
    pub attacker_allocation: Option<u32>,
    pub defender_allocation: Option<u32>,
    pub opened_at: DateTime<Utc>,
}

impl ActiveDuel {
    pub fn open(board: &Board, mv: ChessMove) -> GameResult<Self> {
        let attacker = board
            .piece_at(mv.from)
            .ok_or_else(|| GameError::internal(format!("duel attacker missing at {}", mv.from)))?;
        let defender_square = match mv.move_type {
            MoveType::EnPassant => Square {
                file: mv.to.file,
                rank: mv.from.rank,
            },
            _ => mv.to,
        };
        let defender = board
            .piece_at(defender_square)
            .filter(|d| d.color != attacker.color)
            .ok_or_else(|| {
                GameError::internal(format!("duel defender missing at {defender_square}"))
            })?;

        Ok(Self {
            attacker_id: attacker.id,
            defender_id: defender.id,
            attacker_color: attacker.color,
            attacker_type: attacker.piece_type,
            defender_type: defender.piece_type,
            origin: mv.from,
            target: mv.to,
            defender_square,
            mv,
            attacker_allocation: None,
            defender_allocation: None,
            opened_at: Utc::now(),
        })
    }

    pub fn defender_color(&self) -> Color {
        self.attacker_color.opposite()
    }

    pub fn role_of(&self, color: Color) -> DuelRole {
        if color == self.attacker_color {
            DuelRole::Attacker
        } else {
            DuelRole::Defender
        }
    }

    pub fn allocation(&self, role: DuelRole) -> Option<u32> {
        match role {
            DuelRole::Attacker => self.attacker_allocation,
            DuelRole::Defender => self.defender_allocation,
        }
    }

    pub fn has_committed(&self, color: Color) -> bool {
        self.allocation(self.role_of(color)).is_some()
    }

    /// Store an allocation; each side commits exactly once
    pub fn record_allocation(&mut self, color: Color, amount: u32) -> GameResult<()> {
        let slot = match self.role_of(color) {
            DuelRole::Attacker => &mut self.attacker_allocation,
            DuelRole::Defender => &mut self.defender_allocation,
        };
        if slot.is_some() {
            return Err(GameError::AlreadyAllocated { color });
        }
        *slot = Some(amount);
        Ok(())
    }

    /// `Some` once both sides have committed
    pub fn outcome(&self) -> Option<DuelOutcome> {
        Some(DuelOutcome::resolve(
            self.attacker_allocation?,
            self.defender_allocation?,
        ))
    }

    /// Check the duel still matches the board before resolving it
    pub fn verify(&self, board: &Board) -> GameResult<()> {
        let attacker_ok = board
            .piece(self.attacker_id)
            .is_some_and(|p| p.square == self.origin && p.color == self.attacker_color);
        let defender_ok = board
            .piece(self.defender_id)
            .is_some_and(|p| p.square == self.defender_square && p.color != self.attacker_color);
        if attacker_ok && defender_ok {
            Ok(())
        } else {
            Err(GameError::internal(format!(
                "duel {}{} no longer matches the board",
                self.origin, self.target
            )))
        }
    }
}

/// Bounds-check a requested allocation against the pool and the per-duel cap
pub fn validate_allocation(amount: i64, pool: u32, max: u32) -> GameResult<u32> {
    let out_of_range = GameError::AllocationOutOfRange { amount, pool, max };
    let amount = u32::try_from(amount).map_err(|_| out_of_range)?;
    if amount > pool || amount > max {
        return Err(GameError::AllocationOutOfRange {
            amount: amount as i64,
            pool,
            max,
        });
    }
    Ok(amount)
}
