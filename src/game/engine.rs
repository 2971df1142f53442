//! Engine facade
//!
//! Every mutating call runs the same cycle under a per-game lock:
//!
//! 1. load the canonical snapshot from the [`GameStore`]
//! 2. run the orchestrator transition on a clone
//! 3. check the state invariants on the result
//! 4. bump the version and save
//! 5. publish the transition's notices
//!
//! A rejected request leaves the stored game untouched. An internal fault
//! (a broken invariant or an impossible state) flags the last good snapshot
//! so nobody keeps playing on top of it.
//!
//! [`GameStore`]: crate::networking::GameStore

use super::error::{GameError, GameResult};
use super::orchestrator::{
    self, AllocationOutcome, MoveOutcome, RetreatOutcome, RulesContext, Transition,
};
use super::state::{GameState, GameStatus};
use super::types::{Color, GameId, PlayerId, PieceType, Square};
use super::view::{filtered_view, GameView, Viewer};
use crate::core::{EngineConfig, ServiceRegistry};
use crate::networking::{Audience, GameEvent, Notification};
use chess_rules::Board;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct Engine {
    services: ServiceRegistry,
    locks: Mutex<HashMap<GameId, Arc<Mutex<()>>>>,
}

impl Engine {
    pub fn new(services: ServiceRegistry) -> Self {
        Self {
            services,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.services.config
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Create a game from the standard position or a supplied board
    pub fn create_game(&self, game_id: GameId, board: Option<Board>) -> GameResult<()> {
        let board = board.unwrap_or_default();
        board.validate().map_err(GameError::InvalidBoard)?;

        self.with_game_lock(game_id, || {
            if self.load(game_id)?.is_some() {
                return Err(GameError::GameAlreadyExists(game_id));
            }
            let state = GameState::new(game_id, board, self.services.config.starting_bp);
            self.save(&state)
        })?;

        info!(
            "[ENGINE] Created game {} with {} BP per side",
            game_id, self.services.config.starting_bp
        );
        Ok(())
    }

    pub fn submit_move(
        &self,
        game_id: GameId,
        player: &PlayerId,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> GameResult<MoveOutcome> {
        let seat = self.seat_of(game_id, player);
        self.mutate(game_id, "submit_move", |state, ctx| {
            orchestrator::submit_move(state, ctx, seat, from, to, promotion)
        })
    }

    /// `amount` is signed so a negative request reaches range validation
    /// instead of failing to parse upstream.
    pub fn submit_allocation(
        &self,
        game_id: GameId,
        player: &PlayerId,
        amount: i64,
    ) -> GameResult<AllocationOutcome> {
        let seat = self.seat_of(game_id, player);
        self.mutate(game_id, "submit_allocation", |state, ctx| {
            orchestrator::submit_allocation(state, ctx, seat, amount)
        })
    }

    pub fn execute_retreat(
        &self,
        game_id: GameId,
        player: &PlayerId,
        destination: Square,
        acknowledged_cost: u32,
    ) -> GameResult<RetreatOutcome> {
        let seat = self.seat_of(game_id, player);
        self.mutate(game_id, "execute_retreat", |state, ctx| {
            orchestrator::execute_retreat(state, ctx, seat, destination, acknowledged_cost)
        })
    }

    pub fn resign(&self, game_id: GameId, player: &PlayerId) -> GameResult<GameStatus> {
        let seat = self.seat_of(game_id, player);
        self.mutate(game_id, "resign", |state, _| orchestrator::resign(state, seat))
    }

    /// Administrative end, e.g. abandonment or timeout
    pub fn end_game(&self, game_id: GameId, reason: &str) -> GameResult<GameStatus> {
        self.mutate(game_id, "end_game", |state, _| {
            orchestrator::end_game(state, reason)
        })
    }

    /// The game as `viewer` may see it. `None` (or an unseated player) is a
    /// spectator.
    pub fn get_filtered_state(
        &self,
        game_id: GameId,
        viewer: Option<&PlayerId>,
    ) -> GameResult<GameView> {
        let state = self
            .load(game_id)?
            .ok_or(GameError::GameNotFound(game_id))?;
        let seat = viewer.and_then(|p| self.seat_of(game_id, p));
        Ok(filtered_view(&state, Viewer::from_seat(seat)))
    }

    fn seat_of(&self, game_id: GameId, player: &PlayerId) -> Option<Color> {
        self.services.identity.color_for_player(game_id, player)
    }

    /// Run `f` holding the game's lock. The entry is dropped from the map
    /// once no other caller holds a clone, so idle and unknown ids cost
    /// nothing.
    fn with_game_lock<R>(&self, game_id: GameId, f: impl FnOnce() -> R) -> R {
        let lock = self.locks.lock().entry(game_id).or_default().clone();
        let result = {
            let _guard = lock.lock();
            f()
        };
        let mut locks = self.locks.lock();
        // Clones are only taken under the map lock: one for the map, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&game_id);
        }
        result
    }

    fn load(&self, game_id: GameId) -> GameResult<Option<GameState>> {
        self.services.store.load(game_id).map_err(|e| {
            error!("[STORE] Load failed for game {}: {}", game_id, e);
            GameError::Persistence(e)
        })
    }

    fn save(&self, state: &GameState) -> GameResult<()> {
        self.services
            .store
            .save(state, self.services.config.state_ttl())
            .map_err(|e| {
                error!(
                    "[STORE] Save failed for game {} at version {}: {}",
                    state.game_id, state.version, e
                );
                GameError::Persistence(e)
            })
    }

    fn mutate<T, F>(&self, game_id: GameId, op: &'static str, transition: F) -> GameResult<T>
    where
        F: FnOnce(&mut GameState, RulesContext<'_>) -> GameResult<Transition<T>>,
    {
        self.with_game_lock(game_id, || self.apply_locked(game_id, op, transition))
    }

    fn apply_locked<T, F>(&self, game_id: GameId, op: &'static str, transition: F) -> GameResult<T>
    where
        F: FnOnce(&mut GameState, RulesContext<'_>) -> GameResult<Transition<T>>,
    {
        let current = self
            .load(game_id)?
            .ok_or(GameError::GameNotFound(game_id))?;
        let ctx = RulesContext {
            oracle: self.services.oracle.as_ref(),
            config: &self.services.config,
        };

        let mut next = current.clone();
        let result = transition(&mut next, ctx).and_then(|t| {
            next.check_invariants()?;
            Ok(t)
        });
        let Transition { outcome, notices } = match result {
            Ok(t) => t,
            Err(e) if e.is_internal() => return Err(self.flag(current, op, e)),
            Err(e) => {
                debug!(game_id = %game_id, op, code = e.code(), "[ENGINE] Rejected: {}", e);
                return Err(e);
            }
        };

        next.version = current.version + 1;
        next.updated_at = Utc::now();
        self.save(&next)?;

        debug!(
            game_id = %game_id,
            op,
            version = next.version,
            phase = %next.phase,
            "[ENGINE] Applied"
        );
        for notice in notices {
            self.services.notifier.publish(Notification {
                game_id,
                audience: notice.audience,
                event: notice.event,
            });
        }
        Ok(outcome)
    }

    /// Freeze the last good snapshot and hand back the original fault
    fn flag(&self, mut last_good: GameState, op: &'static str, fault: GameError) -> GameError {
        let game_id = last_good.game_id;
        error!(game_id = %game_id, op, "[ENGINE] Internal fault, flagging game: {}", fault);

        let status = GameStatus::Flagged {
            reason: fault.to_string(),
        };
        last_good.status = status.clone();
        last_good.version += 1;
        last_good.updated_at = Utc::now();

        match self.save(&last_good) {
            Ok(()) => self.services.notifier.publish(Notification {
                game_id,
                audience: Audience::Everyone,
                event: GameEvent::GameEnded { status },
            }),
            Err(e) => warn!(game_id = %game_id, "[ENGINE] Could not persist flag: {}", e),
        }
        fault
    }
}
