//! Per-viewer projection of a game
//!
//! [`GameView`] is what a client may see. A seated player sees their own
//! pool, their own pending allocation and, when they are the one retreating,
//! the retreat options. Opponents and spectators see only that a side has
//! committed or that a retreat is pending. Revealed duel outcomes in the
//! history are public.

use super::captured::CapturedPieces;
use super::duel::DuelOutcome;
use super::history::{MoveRecord, RetreatRecord};
use super::retreat::RetreatOption;
use super::state::{GamePhase, GameState, GameStatus};
use super::tactics::TacticKind;
use super::types::{Color, GameId, MoveType, Piece, PieceType, Square};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "color", rename_all = "snake_case")]
pub enum Viewer {
    Player(Color),
    Spectator,
}

impl Viewer {
    pub fn from_seat(seat: Option<Color>) -> Self {
        seat.map(Viewer::Player).unwrap_or(Viewer::Spectator)
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Viewer::Player(color) => Some(*color),
            Viewer::Spectator => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelView {
    pub attacker: Color,
    pub attacker_square: Square,
    pub target: Square,
    pub defender_square: Square,
    pub attacker_committed: bool,
    pub defender_committed: bool,
    /// The viewer's own allocation, once committed
    pub your_allocation: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetreatView {
    pub color: Color,
    pub origin: Square,
    pub target: Square,
    /// Only present for the retreating player
    pub options: Option<Vec<RetreatOption>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ply: u32,
    pub color: Color,
    pub piece: PieceType,
    pub from: Square,
    pub to: Square,
    pub move_type: MoveType,
    pub promotion: Option<PieceType>,
    pub captured: Option<PieceType>,
    pub duel: Option<DuelOutcome>,
    pub retreat: Option<RetreatRecord>,
    pub tactics: Vec<TacticKind>,
    /// Viewer's own pool after this ply
    pub your_bp_after: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: GameId,
    pub viewer: Viewer,
    pub phase: GamePhase,
    pub turn: Color,
    pub status: GameStatus,
    pub pieces: Vec<Piece>,
    /// FEN piece placement, for clients that render from text
    pub placement: String,
    pub captured: CapturedPieces,
    pub your_bp: Option<u32>,
    pub duel: Option<DuelView>,
    pub retreat: Option<RetreatView>,
    pub history: Vec<HistoryEntry>,
    pub version: u64,
}

pub fn filtered_view(state: &GameState, viewer: Viewer) -> GameView {
    let seat = viewer.color();

    let duel = state.duel.as_ref().map(|d| DuelView {
        attacker: d.attacker_color,
        attacker_square: d.origin,
        target: d.target,
        defender_square: d.defender_square,
        attacker_committed: d.attacker_allocation.is_some(),
        defender_committed: d.defender_allocation.is_some(),
        your_allocation: seat.and_then(|c| d.allocation(d.role_of(c))),
    });

    let retreat = state.retreat.as_ref().map(|r| RetreatView {
        color: r.color,
        origin: r.origin,
        target: r.target,
        options: (seat == Some(r.color)).then(|| r.options.clone()),
    });

    GameView {
        game_id: state.game_id,
        viewer,
        phase: state.phase,
        turn: state.turn,
        status: state.status.clone(),
        pieces: state.board.pieces().to_vec(),
        placement: state.board.placement(),
        captured: state.captured.clone(),
        your_bp: seat.map(|c| state.ledger.balance(c)),
        duel,
        retreat,
        history: state
            .history
            .records()
            .iter()
            .map(|m| history_entry(m, seat))
            .collect(),
        version: state.version,
    }
}

fn history_entry(record: &MoveRecord, seat: Option<Color>) -> HistoryEntry {
    HistoryEntry {
        ply: record.ply,
        color: record.color,
        piece: record.piece,
        from: record.from,
        to: record.to,
        move_type: record.move_type,
        promotion: record.promotion,
        captured: record.captured,
        duel: record.duel,
        retreat: record.retreat,
        tactics: record.tactics.clone(),
        your_bp_after: seat.map(|c| record.pools_after.balance(c)),
    }
}
