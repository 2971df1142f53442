//! Tactics detection
//!
//! Recognises tactical patterns on a board from one side's perspective and
//! diffs two snapshots to find the patterns a move created. The ledger pays
//! a regeneration bonus for each kind of newly created pattern.
//!
//! # Pattern detectors
//!
//! Static patterns are found by zero-sized [`PatternDetector`]s that look at
//! a single board:
//!
//! - [`CheckDetector`] - the enemy king is attacked
//! - [`fork::ForkDetector`] - one piece attacks two or more non-king enemies
//! - [`lines::PinDetector`] - a slider, one enemy piece, then the enemy king
//! - [`lines::SkewerDetector`] - a slider, then two enemies with the nearer
//!   worth at least as much as the farther
//!
//! Discovered attacks and checks only exist relative to a move, so
//! [`discovered::discovered_patterns`] takes both snapshots.
//!
//! # Instance identity
//!
//! A [`TacticInstance`] is identified by its kind, attacking piece id and
//! sorted target ids. A pattern maintained by the same pieces is the same
//! instance even if a piece slid along the line, so it is never rewarded
//! twice.

pub mod discovered;
pub mod fork;
pub mod lines;

use chess_rules::{Board, Color, MoveOracle, PieceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use fork::ForkDetector;
pub use lines::{PinDetector, SkewerDetector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticKind {
    Check,
    Fork,
    Pin,
    Skewer,
    DiscoveredAttack,
    DiscoveredCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TacticInstance {
    pub kind: TacticKind,
    /// `None` for patterns not tied to one piece (check)
    pub attacker: Option<PieceId>,
    /// Always sorted
    pub targets: Vec<PieceId>,
}

impl TacticInstance {
    pub fn new(kind: TacticKind, attacker: Option<PieceId>, mut targets: Vec<PieceId>) -> Self {
        targets.sort();
        targets.dedup();
        Self {
            kind,
            attacker,
            targets,
        }
    }
}

/// Read-only input shared by the static detectors
pub struct TacticalContext<'a> {
    pub board: &'a Board,
    /// Side whose patterns are being looked for
    pub perspective: Color,
    pub oracle: &'a dyn MoveOracle,
}

pub trait PatternDetector {
    fn detect(&self, ctx: &TacticalContext) -> Vec<TacticInstance>;
}

pub struct CheckDetector;

impl PatternDetector for CheckDetector {
    fn detect(&self, ctx: &TacticalContext) -> Vec<TacticInstance> {
        let enemy = ctx.perspective.opposite();
        match ctx.board.king(enemy) {
            Some(king) if ctx.oracle.is_in_check(ctx.board, enemy) => {
                vec![TacticInstance::new(TacticKind::Check, None, vec![king.id])]
            }
            _ => Vec::new(),
        }
    }
}

/// Runs every detector; pure in its inputs
pub struct TacticsDetector<'a> {
    oracle: &'a dyn MoveOracle,
}

impl<'a> TacticsDetector<'a> {
    pub fn new(oracle: &'a dyn MoveOracle) -> Self {
        Self { oracle }
    }

    /// Patterns present on `board` for `perspective`
    pub fn detect(&self, board: &Board, perspective: Color) -> BTreeSet<TacticInstance> {
        let ctx = TacticalContext {
            board,
            perspective,
            oracle: self.oracle,
        };
        let detectors: [&dyn PatternDetector; 4] =
            [&CheckDetector, &ForkDetector, &PinDetector, &SkewerDetector];
        detectors
            .iter()
            .flat_map(|d| d.detect(&ctx))
            .collect()
    }

    /// Patterns `perspective` created by moving from `before` to `after`.
    ///
    /// Static patterns already present before the move are excluded.
    /// Discovered patterns are derived from the pair and are new by
    /// definition.
    pub fn detect_new(
        &self,
        before: &Board,
        after: &Board,
        perspective: Color,
    ) -> BTreeSet<TacticInstance> {
        let existing = self.detect(before, perspective);
        let mut created: BTreeSet<TacticInstance> = self
            .detect(after, perspective)
            .into_iter()
            .filter(|t| !existing.contains(t))
            .collect();
        created.extend(discovered::discovered_patterns(before, after, perspective));
        created
    }
}
