//! Game persistence
//!
//! [`GameStore`] is the load/save seam the engine awaits around every
//! mutation. [`InMemoryStore`] keeps one canonical `serde_json` snapshot per
//! game, so loading never replays history.
//!
//! # Versioning
//!
//! Each save carries `state.version`. A save of version `n` succeeds only if
//! the stored version is `n - 1` (or nothing is stored and `n == 0`), which
//! rejects a writer working from a stale load.
//!
//! # Expiry
//!
//! Entries expire `ttl` after their last save. Expired entries are dropped
//! lazily on the next access.

use crate::game::state::GameState;
use crate::game::types::GameId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Version conflict for game {game_id}: stored {stored:?}, attempted {attempted}")]
    VersionConflict {
        game_id: GameId,
        stored: Option<u64>,
        attempted: u64,
    },

    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub trait GameStore: Send + Sync {
    fn load(&self, game_id: GameId) -> Result<Option<GameState>, StoreError>;

    fn save(&self, state: &GameState, ttl: Duration) -> Result<(), StoreError>;
}

struct StoredGame {
    snapshot: String,
    version: u64,
    expires_at: Instant,
}

impl StoredGame {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    games: RwLock<HashMap<GameId, StoredGame>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) games
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.games
            .read()
            .values()
            .filter(|g| !g.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove(&self, game_id: GameId) -> bool {
        self.games.write().remove(&game_id).is_some()
    }
}

impl GameStore for InMemoryStore {
    fn load(&self, game_id: GameId) -> Result<Option<GameState>, StoreError> {
        let now = Instant::now();
        {
            let games = self.games.read();
            match games.get(&game_id) {
                None => return Ok(None),
                Some(stored) if !stored.is_expired(now) => {
                    return Ok(Some(serde_json::from_str(&stored.snapshot)?));
                }
                Some(_) => {}
            }
        }
        let mut games = self.games.write();
        if games.get(&game_id).is_some_and(|g| g.is_expired(now)) {
            games.remove(&game_id);
            debug!(game_id = %game_id, "[STORE] Expired game evicted");
        }
        Ok(None)
    }

    fn save(&self, state: &GameState, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let snapshot = serde_json::to_string(state)?;
        let mut games = self.games.write();
        let stored = games
            .get(&state.game_id)
            .filter(|g| !g.is_expired(now))
            .map(|g| g.version);

        let expected = stored.map(|v| v + 1).unwrap_or(0);
        if state.version != expected {
            return Err(StoreError::VersionConflict {
                game_id: state.game_id,
                stored,
                attempted: state.version,
            });
        }

        games.insert(
            state.game_id,
            StoredGame {
                snapshot,
                version: state.version,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::Board;

    const TTL: Duration = Duration::from_secs(60);

    fn fresh() -> GameState {
        GameState::new(GameId::new(), Board::standard(), 39)
    }

    #[test]
    fn save_then_load_returns_equal_state() {
        let store = InMemoryStore::new();
        let state = fresh();
        store.save(&state, TTL).unwrap();
        assert_eq!(store.load(state.game_id).unwrap(), Some(state));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn versions_must_advance_by_one() {
        let store = InMemoryStore::new();
        let mut state = fresh();
        store.save(&state, TTL).unwrap();

        // Same version again is a stale writer
        assert!(matches!(
            store.save(&state, TTL),
            Err(StoreError::VersionConflict { .. })
        ));
        state.version = 2;
        assert!(store.save(&state, TTL).is_err());
        state.version = 1;
        store.save(&state, TTL).unwrap();
    }

    #[test]
    fn first_save_must_be_version_zero() {
        let store = InMemoryStore::new();
        let mut state = fresh();
        state.version = 3;
        assert!(store.save(&state, TTL).is_err());
    }

    #[test]
    fn expired_games_disappear() {
        let store = InMemoryStore::new();
        let state = fresh();
        store.save(&state, Duration::from_millis(1)).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(store.load(state.game_id).unwrap().is_none());
        assert!(store.is_empty());
    }
}
