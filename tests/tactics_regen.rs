//! Regeneration and tactic bonuses across plies

mod common;

use common::{sq, Table};
use duelchess::chess_rules::Color;
use duelchess::game::TacticKind;
use duelchess::networking::GameStore;

#[test]
fn test_new_pin_is_rewarded_once() {
    let table = Table::new(Some("4k3/p7/4n3/8/8/8/8/R6K"));
    let engine = &table.engine;

    // Re1 pins the knight to its king
    engine
        .submit_move(table.game_id, &table.white, sq("a1"), sq("e1"), None)
        .unwrap();
    engine
        .submit_move(table.game_id, &table.black, sq("a7"), sq("a6"), None)
        .unwrap();
    // The pin still stands but is no longer new
    engine
        .submit_move(table.game_id, &table.white, sq("h1"), sq("h2"), None)
        .unwrap();

    let stored = table.store.load(table.game_id).unwrap().unwrap();
    let records = stored.history.records();
    assert_eq!(records[0].tactics, vec![TacticKind::Pin]);
    assert_eq!(records[0].regenerated, 1 + 2);
    assert!(records[2].tactics.is_empty());
    assert_eq!(records[2].regenerated, 1);
    assert_eq!(stored.ledger.balance(Color::White), 39 + 3 + 1);
    assert_eq!(stored.ledger.balance(Color::Black), 39 + 1);
}

#[test]
fn test_check_earns_bonus_for_the_mover() {
    let table = Table::new(Some("4k3/8/8/8/8/8/8/R6K"));
    table
        .engine
        .submit_move(table.game_id, &table.white, sq("a1"), sq("a8"), None)
        .unwrap();

    let stored = table.store.load(table.game_id).unwrap().unwrap();
    let record = stored.history.last_move().unwrap();
    assert!(record.tactics.contains(&TacticKind::Check));
    assert_eq!(stored.ledger.balance(Color::White), 39 + 1 + 2);
}

#[test]
fn test_pools_snapshot_matches_ledger_after_each_ply() {
    let table = Table::new(None);
    let engine = &table.engine;
    engine
        .submit_move(table.game_id, &table.white, sq("d2"), sq("d4"), None)
        .unwrap();
    engine
        .submit_move(table.game_id, &table.black, sq("d7"), sq("d5"), None)
        .unwrap();

    let stored = table.store.load(table.game_id).unwrap().unwrap();
    let last = stored.history.last_move().unwrap();
    assert_eq!(last.pools_after, stored.ledger);
    assert_eq!(stored.history.records()[0].ply, 0);
    assert_eq!(last.ply, 1);
}
