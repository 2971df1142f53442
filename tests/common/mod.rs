//! Shared fixture for engine-level tests

#![allow(dead_code)]

use duelchess::chess_rules::{Board, Square};
use duelchess::networking::{InMemoryStore, RecordingNotifier, SeatTable};
use duelchess::{Engine, EngineConfig, GameId, PlayerId, ServiceRegistry};
use std::sync::Arc;

pub struct Table {
    pub engine: Arc<Engine>,
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub seats: Arc<SeatTable>,
    pub game_id: GameId,
    pub white: PlayerId,
    pub black: PlayerId,
}

impl Table {
    pub fn new(placement: Option<&str>) -> Self {
        Self::with_config(placement, EngineConfig::default())
    }

    pub fn with_config(placement: Option<&str>, config: EngineConfig) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("duelchess=debug")
            .with_test_writer()
            .try_init();

        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let seats = Arc::new(SeatTable::new());
        let registry = ServiceRegistry::builder()
            .store(store.clone())
            .notifier(notifier.clone())
            .identity(seats.clone())
            .config(config)
            .build()
            .expect("registry");
        let engine = Arc::new(Engine::new(registry));

        let game_id = GameId::new();
        let white = PlayerId::from("white-player");
        let black = PlayerId::from("black-player");
        seats.seat(game_id, white.clone(), black.clone());
        let board = placement.map(|p| Board::from_placement(p).expect("placement"));
        engine.create_game(game_id, board).expect("create game");

        Self {
            engine,
            store,
            notifier,
            seats,
            game_id,
            white,
            black,
        }
    }

    /// Seat two fresh players at a new game on the same engine
    pub fn another_game(&self) -> (GameId, PlayerId, PlayerId) {
        let game_id = GameId::new();
        let white = PlayerId::new(format!("white-{game_id}"));
        let black = PlayerId::new(format!("black-{game_id}"));
        self.seats.seat(game_id, white.clone(), black.clone());
        self.engine.create_game(game_id, None).expect("create game");
        (game_id, white, black)
    }
}

pub fn sq(name: &str) -> Square {
    Square::from_algebraic(name).expect("square")
}
