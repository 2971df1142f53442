//! Duel Chess rules and economy engine
//!
//! Captures in Duel Chess are contested: a capture attempt opens a duel in
//! which both players secretly commit Battle Points (BP). The attacker wins
//! only by outbidding the defender. A losing knight or slider may buy a
//! tactical retreat. BP regenerate every move, with bonuses for newly
//! created tactics.
//!
//! # Architecture
//!
//! - [`core`] - Engine configuration and the service registry
//! - [`game`] - Game state, phase transitions, duels, retreats, tactics and the ledger
//! - [`networking`] - Collaborator seams: persistence, notification and identity
//!
//! The [`game::engine::Engine`] is the only type that mutates stored games.
//! Every operation runs load, validate, mutate, save and notify under a
//! per-game lock.

pub mod core;
pub mod game;
pub mod networking;

pub use crate::core::{ConfigError, EngineConfig, ServiceRegistry, TacticBonuses};
pub use crate::game::engine::Engine;
pub use crate::game::error::{GameError, GameResult};
pub use crate::game::types::{GameId, PlayerId};
pub use chess_rules;
