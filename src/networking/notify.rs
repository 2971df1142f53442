//! Notification transport
//!
//! The engine publishes [`Notification`]s after a successful save. Delivery
//! is fire and forget: a notifier never fails an operation.
//!
//! Private events (`BpChanged`, `RetreatOptions`) are addressed to one
//! color. Allocation amounts are never published until the duel resolves;
//! `AllocationCommitted` only says that a side has committed.

use crate::game::duel::DuelOutcome;
use crate::game::retreat::RetreatOption;
use crate::game::state::{GamePhase, GameStatus};
use crate::game::types::{Color, GameId, MoveType, PieceType, Square};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "color", rename_all = "snake_case")]
pub enum Audience {
    Everyone,
    Player(Color),
}

impl Audience {
    /// Should a client seated as `viewer` (or a spectator) receive this?
    pub fn includes(&self, viewer: Option<Color>) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Player(color) => viewer == Some(*color),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    MoveApplied {
        color: Color,
        from: Square,
        to: Square,
        move_type: MoveType,
        captured: Option<PieceType>,
    },
    DuelOpened {
        attacker: Color,
        attacker_square: Square,
        defender_square: Square,
        attacker_piece: PieceType,
        defender_piece: PieceType,
    },
    AllocationCommitted {
        color: Color,
    },
    DuelResolved {
        outcome: DuelOutcome,
    },
    RetreatOptions {
        options: Vec<RetreatOption>,
    },
    RetreatExecuted {
        color: Color,
        from: Square,
        to: Square,
        cost: u32,
    },
    PhaseChanged {
        phase: GamePhase,
        turn: Color,
    },
    BpChanged {
        color: Color,
        balance: u32,
    },
    GameEnded {
        status: GameStatus,
    },
}

/// An event addressed to an audience, before the game id is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub audience: Audience,
    pub event: GameEvent,
}

impl Notice {
    pub fn everyone(event: GameEvent) -> Self {
        Self {
            audience: Audience::Everyone,
            event,
        }
    }

    pub fn player(color: Color, event: GameEvent) -> Self {
        Self {
            audience: Audience::Player(color),
            event,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub game_id: GameId,
    pub audience: Audience,
    pub event: GameEvent,
}

pub trait Notifier: Send + Sync {
    fn publish(&self, notification: Notification);
}

/// In-process fan-out over a tokio broadcast channel
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            trace!("[NOTIFY] No subscribers, notification dropped");
        }
    }
}

/// Keeps every notification; for tests and audits
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    /// Drain everything recorded so far
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}
