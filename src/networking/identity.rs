//! Identity resolution
//!
//! The engine never authenticates anyone. It asks an [`IdentityResolver`]
//! which color a player controls in a game; `None` means the player is not
//! seated there (a spectator or a stranger).

use crate::game::types::{Color, GameId, PlayerId};
use parking_lot::RwLock;
use std::collections::HashMap;

pub trait IdentityResolver: Send + Sync {
    fn color_for_player(&self, game_id: GameId, player: &PlayerId) -> Option<Color>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seats {
    pub white: PlayerId,
    pub black: PlayerId,
}

/// In-process seat assignments, filled in when a game is created
#[derive(Default)]
pub struct SeatTable {
    seats: RwLock<HashMap<GameId, Seats>>,
}

impl SeatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seat(&self, game_id: GameId, white: PlayerId, black: PlayerId) {
        self.seats.write().insert(game_id, Seats { white, black });
    }

    pub fn unseat(&self, game_id: GameId) -> Option<Seats> {
        self.seats.write().remove(&game_id)
    }

    pub fn seats(&self, game_id: GameId) -> Option<Seats> {
        self.seats.read().get(&game_id).cloned()
    }
}

impl IdentityResolver for SeatTable {
    fn color_for_player(&self, game_id: GameId, player: &PlayerId) -> Option<Color> {
        let seats = self.seats.read();
        let seats = seats.get(&game_id)?;
        if &seats.white == player {
            Some(Color::White)
        } else if &seats.black == player {
            Some(Color::Black)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seated_players_resolve_to_their_color() {
        let table = SeatTable::new();
        let game = GameId::new();
        table.seat(game, "alice".into(), "bob".into());

        assert_eq!(table.color_for_player(game, &"alice".into()), Some(Color::White));
        assert_eq!(table.color_for_player(game, &"bob".into()), Some(Color::Black));
        assert_eq!(table.color_for_player(game, &"carol".into()), None);
        assert_eq!(table.color_for_player(GameId::new(), &"alice".into()), None);
    }

    #[test]
    fn unseat_forgets_the_game() {
        let table = SeatTable::new();
        let game = GameId::new();
        table.seat(game, "a".into(), "b".into());
        assert!(table.unseat(game).is_some());
        assert!(table.seats(game).is_none());
    }
}
