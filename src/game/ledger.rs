//! BP ledger
//!
//! Owns both players' Battle Point pools. Pools are unsigned and every
//! debit is checked before it is applied, so a pool can never go negative
//! and a rejected debit leaves it untouched.
//!
//! Regeneration is credited to the side that just moved, in the same
//! operation as its move, before the turn passes:
//!
//! ```text
//! regeneration = base + sum(bonus(kind) for kind in new tactic kinds)
//! ```

use super::error::{GameError, GameResult};
use super::tactics::{TacticInstance, TacticKind, TacticsDetector};
use super::types::Color;
use crate::core::EngineConfig;
use chess_rules::{Board, MoveOracle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpLedger {
    pub white: u32,
    pub black: u32,
}

/// What one regeneration credit consisted of
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Regeneration {
    pub base: u32,
    pub bonus: u32,
    /// Distinct kinds that earned a bonus, in a fixed order
    pub kinds: Vec<TacticKind>,
}

impl Regeneration {
    pub fn total(&self) -> u32 {
        self.base + self.bonus
    }

    /// Base credit only, used for failed captures and retreats
    pub fn base_only(config: &EngineConfig) -> Self {
        Self {
            base: config.base_regeneration,
            bonus: 0,
            kinds: Vec::new(),
        }
    }

    /// Base plus one bonus per tactic kind present in `new_tactics`
    pub fn from_tactics<'a>(
        config: &EngineConfig,
        new_tactics: impl IntoIterator<Item = &'a TacticInstance>,
    ) -> Self {
        let kinds: BTreeSet<TacticKind> = new_tactics.into_iter().map(|t| t.kind).collect();
        let bonus = kinds
            .iter()
            .map(|k| config.tactic_bonuses.bonus_for(*k))
            .sum();
        Self {
            base: config.base_regeneration,
            bonus,
            kinds: kinds.into_iter().collect(),
        }
    }
}

impl BpLedger {
    pub fn new(starting_bp: u32) -> Self {
        Self {
            white: starting_bp,
            black: starting_bp,
        }
    }

    pub fn balance(&self, color: Color) -> u32 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn pool_mut(&mut self, color: Color) -> &mut u32 {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Remove `amount`, rejecting without mutation if the pool is too small
    pub fn debit(&mut self, color: Color, amount: u32) -> GameResult<()> {
        let pool = self.pool_mut(color);
        let remaining = pool
            .checked_sub(amount)
            .ok_or(GameError::InsufficientBp {
                needed: amount,
                available: *pool,
            })?;
        *pool = remaining;
        Ok(())
    }

    pub fn credit(&mut self, color: Color, amount: u32) -> GameResult<()> {
        let pool = self.pool_mut(color);
        *pool = pool
            .checked_add(amount)
            .ok_or_else(|| GameError::internal(format!("{color} BP pool overflow")))?;
        Ok(())
    }

    /// Credit the mover for a completed move that changed the board
    /// from `before` to `after`.
    pub fn credit_regeneration(
        &mut self,
        color: Color,
        config: &EngineConfig,
        oracle: &dyn MoveOracle,
        before: &Board,
        after: &Board,
    ) -> GameResult<Regeneration> {
        let detector = TacticsDetector::new(oracle);
        let new_tactics = detector.detect_new(before, after, color);
        let regeneration = Regeneration::from_tactics(config, &new_tactics);
        self.apply(color, &regeneration)?;
        Ok(regeneration)
    }

    /// Credit a precomputed regeneration
    pub fn apply(&mut self, color: Color, regeneration: &Regeneration) -> GameResult<()> {
        self.credit(color, regeneration.total())?;
        debug!(
            color = %color,
            base = regeneration.base,
            bonus = regeneration.bonus,
            balance = self.balance(color),
            "[LEDGER] Regeneration credited"
        );
        Ok(())
    }
}
