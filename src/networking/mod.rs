//! Collaborator seams
//!
//! The engine reaches the outside world only through these traits:
//!
//! - [`store::GameStore`] - load and save canonical game snapshots
//! - [`notify::Notifier`] - fire-and-forget event delivery
//! - [`identity::IdentityResolver`] - player id to seat color
//!
//! In-process implementations are provided for each so the engine runs
//! standalone and in tests.

pub mod identity;
pub mod notify;
pub mod store;

pub use identity::{IdentityResolver, SeatTable};
pub use notify::{
    Audience, BroadcastNotifier, GameEvent, Notification, Notifier, RecordingNotifier,
};
pub use store::{GameStore, InMemoryStore, StoreError};
