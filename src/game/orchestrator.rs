//! Move and phase orchestration
//!
//! Pure state transitions over a [`GameState`]. Each function takes the
//! current state, validates the request against the phase machine and
//! mutates the state in place, returning the caller-facing outcome plus the
//! notices to publish once the new state is saved.
//!
//! Phase flow:
//!
//! ```text
//! NORMAL_MOVE --capture--> DUEL_ALLOCATION --attacker wins--------> NORMAL_MOVE
//!                                          --defender wins, pawn/king--> NORMAL_MOVE
//!                                          --defender wins, knight/slider--> TACTICAL_RETREAT
//! TACTICAL_RETREAT --retreat executed--> NORMAL_MOVE
//! ```
//!
//! Errors are returned before any mutation for caller mistakes. An
//! `Internal` error may leave the state half-mutated; the engine discards
//! that copy.

use super::duel::{validate_allocation, ActiveDuel, DuelOutcome};
use super::error::{GameError, GameResult};
use super::history::{MoveRecord, RetreatRecord};
use super::ledger::Regeneration;
use super::retreat::{compute_options, is_retreat_eligible, RetreatContext, RetreatOption};
use super::state::{GamePhase, GameState, GameStatus};
use super::types::{ChessMove, Color, MoveType, PieceId, PieceType, Square};
use crate::core::EngineConfig;
use crate::networking::notify::{GameEvent, Notice};
use chess_rules::{MoveOracle, RulesError};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Collaborators a transition reads but never mutates
#[derive(Clone, Copy)]
pub struct RulesContext<'a> {
    pub oracle: &'a dyn MoveOracle,
    pub config: &'a EngineConfig,
}

/// Result of a transition plus the notices it produced
#[derive(Debug)]
pub struct Transition<T> {
    pub outcome: T,
    pub notices: Vec<Notice>,
}

/// A capture never completes here; it opens a duel and the captured piece
/// is reported by [`AllocationOutcome`] once the duel is won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub triggers_duel: bool,
    pub move_type: MoveType,
    pub status: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationOutcome {
    pub duel_resolved: bool,
    pub outcome: Option<DuelOutcome>,
    pub retreat_pending: bool,
    /// Only filled in for the retreating player
    pub retreat_options: Option<Vec<RetreatOption>>,
    /// Piece removed by a won capture
    pub captured_piece: Option<PieceType>,
    pub status: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetreatOutcome {
    pub cost_applied: u32,
    pub status: GameStatus,
}

/// Everything needed to append a record and hand over the turn
struct CompletedPly {
    color: Color,
    piece: PieceType,
    piece_id: PieceId,
    from: Square,
    to: Square,
    move_type: MoveType,
    promotion: Option<PieceType>,
    captured: Option<PieceType>,
    duel: Option<DuelOutcome>,
    retreat: Option<RetreatRecord>,
    regeneration: Regeneration,
}

fn seated(seat: Option<Color>) -> GameResult<Color> {
    seat.ok_or(GameError::NotAParticipant)
}

/// Validate and apply a move for the side to move.
///
/// A capture opens a duel and leaves the board untouched. Anything else is
/// executed, regenerates BP for the mover and passes the turn.
pub fn submit_move(
    state: &mut GameState,
    ctx: RulesContext<'_>,
    seat: Option<Color>,
    from: Square,
    to: Square,
    promotion: Option<PieceType>,
) -> GameResult<Transition<MoveOutcome>> {
    state.ensure_active()?;
    state.ensure_phase(GamePhase::NormalMove)?;
    let color = seated(seat)?;
    if color != state.turn {
        return Err(GameError::WrongTurn {
            expected: state.turn,
        });
    }
    let piece = *state
        .board
        .piece_at(from)
        .filter(|p| p.color == color)
        .ok_or(GameError::PieceNotFound { square: from })?;

    let mv = ctx
        .oracle
        .validate_move(&state.board, from, to, promotion)
        .map_err(|e| match e {
            RulesError::NoPieceAtSquare(square) => GameError::PieceNotFound { square },
            other => GameError::InvalidMove(other),
        })?;
    debug!(
        game_id = %state.game_id,
        mv = %mv,
        move_type = ?mv.move_type,
        "[ORCHESTRATOR] Move validated"
    );

    if mv.move_type.is_capture() {
        let duel = ActiveDuel::open(&state.board, mv)?;
        let mut notices = vec![Notice::everyone(GameEvent::DuelOpened {
            attacker: color,
            attacker_square: duel.origin,
            defender_square: duel.defender_square,
            attacker_piece: duel.attacker_type,
            defender_piece: duel.defender_type,
        })];
        state.duel = Some(duel);
        state.phase = GamePhase::DuelAllocation;
        notices.push(phase_notice(state));
        info!(
            game_id = %state.game_id,
            phase = %state.phase,
            "[ORCHESTRATOR] Capture attempt {} opened a duel", mv
        );
        return Ok(Transition {
            outcome: MoveOutcome {
                triggers_duel: true,
                move_type: mv.move_type,
                status: state.status.clone(),
            },
            notices,
        });
    }

    let before = state.board.clone();
    execute(state, &mv)?;
    let regeneration = state.ledger.credit_regeneration(
        color,
        ctx.config,
        ctx.oracle,
        &before,
        &state.board,
    )?;
    let mut notices = vec![Notice::everyone(GameEvent::MoveApplied {
        color,
        from,
        to,
        move_type: mv.move_type,
        captured: None,
    })];
    notices.extend(complete_ply(
        state,
        ctx,
        CompletedPly {
            color,
            piece: piece.piece_type,
            piece_id: piece.id,
            from,
            to,
            move_type: mv.move_type,
            promotion: mv.promotion,
            captured: None,
            duel: None,
            retreat: None,
            regeneration,
        },
    ));

    Ok(Transition {
        outcome: MoveOutcome {
            triggers_duel: false,
            move_type: mv.move_type,
            status: state.status.clone(),
        },
        notices,
    })
}

/// Commit one side's secret allocation; resolves the duel once both are in
pub fn submit_allocation(
    state: &mut GameState,
    ctx: RulesContext<'_>,
    seat: Option<Color>,
    amount: i64,
) -> GameResult<Transition<AllocationOutcome>> {
    state.ensure_active()?;
    state.ensure_phase(GamePhase::DuelAllocation)?;
    let color = seated(seat)?;

    let pool = state.ledger.balance(color);
    let duel = state
        .duel
        .as_mut()
        .ok_or_else(|| GameError::internal("DUEL_ALLOCATION without an active duel"))?;
    if duel.has_committed(color) {
        return Err(GameError::AlreadyAllocated { color });
    }
    let amount = validate_allocation(amount, pool, ctx.config.max_allocation_per_duel)?;
    duel.record_allocation(color, amount)?;
    let outcome = duel.outcome();
    state.ledger.debit(color, amount)?;
    debug!(
        game_id = %state.game_id,
        color = %color,
        "[DUEL] Allocation committed"
    );

    let mut notices = vec![
        Notice::everyone(GameEvent::AllocationCommitted { color }),
        bp_notice(state, color),
    ];

    let Some(outcome) = outcome else {
        return Ok(Transition {
            outcome: AllocationOutcome {
                duel_resolved: false,
                outcome: None,
                retreat_pending: false,
                retreat_options: None,
                captured_piece: None,
                status: state.status.clone(),
            },
            notices,
        });
    };

    notices.extend(resolve_duel(state, ctx, outcome)?);
    let retreat_options = state
        .retreat
        .as_ref()
        .filter(|r| r.color == color)
        .map(|r| r.options.clone());
    let captured_piece = if outcome.attacker_won() {
        state.history.last_move().and_then(|m| m.captured)
    } else {
        None
    };
    Ok(Transition {
        outcome: AllocationOutcome {
            duel_resolved: true,
            outcome: Some(outcome),
            retreat_pending: state.retreat.is_some(),
            retreat_options,
            captured_piece,
            status: state.status.clone(),
        },
        notices,
    })
}

fn resolve_duel(
    state: &mut GameState,
    ctx: RulesContext<'_>,
    outcome: DuelOutcome,
) -> GameResult<Vec<Notice>> {
    let duel = state
        .duel
        .take()
        .ok_or_else(|| GameError::internal("duel vanished during resolution"))?;
    duel.verify(&state.board)?;
    let color = duel.attacker_color;
    info!(
        game_id = %state.game_id,
        attacker = outcome.attacker_allocation,
        defender = outcome.defender_allocation,
        winner = ?outcome.winner,
        "[DUEL] Resolved"
    );
    let mut notices = vec![Notice::everyone(GameEvent::DuelResolved { outcome })];

    if outcome.attacker_won() {
        let before = state.board.clone();
        let captured = execute(state, &duel.mv)?
            .filter(|p| p.id == duel.defender_id)
            .ok_or_else(|| GameError::internal("winning capture removed no defender"))?;
        state.captured.add_capture(captured.color, captured.piece_type);
        let regeneration = state.ledger.credit_regeneration(
            color,
            ctx.config,
            ctx.oracle,
            &before,
            &state.board,
        )?;
        notices.push(Notice::everyone(GameEvent::MoveApplied {
            color,
            from: duel.origin,
            to: duel.target,
            move_type: duel.mv.move_type,
            captured: Some(captured.piece_type),
        }));
        notices.extend(complete_ply(
            state,
            ctx,
            CompletedPly {
                color,
                piece: duel.attacker_type,
                piece_id: duel.attacker_id,
                from: duel.origin,
                to: duel.target,
                move_type: duel.mv.move_type,
                promotion: duel.mv.promotion,
                captured: Some(captured.piece_type),
                duel: Some(outcome),
                retreat: None,
                regeneration,
            },
        ));
        return Ok(notices);
    }

    if is_retreat_eligible(duel.attacker_type) {
        let options = compute_options(duel.attacker_type, duel.origin, duel.target, &state.board);
        state.retreat = Some(RetreatContext {
            piece_id: duel.attacker_id,
            piece_type: duel.attacker_type,
            color,
            origin: duel.origin,
            target: duel.target,
            move_type: duel.mv.move_type,
            outcome,
            options: options.clone(),
        });
        state.phase = GamePhase::TacticalRetreat;
        notices.push(phase_notice(state));
        notices.push(Notice::player(color, GameEvent::RetreatOptions { options }));
        return Ok(notices);
    }

    // Pawns and kings snap back for free
    state.board.clear_en_passant();
    let regeneration = Regeneration::base_only(ctx.config);
    state.ledger.apply(color, &regeneration)?;
    notices.extend(complete_ply(
        state,
        ctx,
        CompletedPly {
            color,
            piece: duel.attacker_type,
            piece_id: duel.attacker_id,
            from: duel.origin,
            to: duel.target,
            move_type: duel.mv.move_type,
            promotion: None,
            captured: None,
            duel: Some(outcome),
            retreat: None,
            regeneration,
        },
    ));
    Ok(notices)
}

/// Move the losing attacker to a chosen option and pay its cost
pub fn execute_retreat(
    state: &mut GameState,
    ctx: RulesContext<'_>,
    seat: Option<Color>,
    destination: Square,
    acknowledged_cost: u32,
) -> GameResult<Transition<RetreatOutcome>> {
    state.ensure_active()?;
    state.ensure_phase(GamePhase::TacticalRetreat)?;
    let color = seated(seat)?;
    let retreat = state
        .retreat
        .as_ref()
        .ok_or_else(|| GameError::internal("TACTICAL_RETREAT without a retreat context"))?;
    if retreat.color != color {
        return Err(GameError::NotAParticipant);
    }
    let option = *retreat
        .option_for(destination)
        .ok_or(GameError::InvalidRetreatTarget {
            square: destination,
        })?;
    if option.cost != acknowledged_cost {
        warn!(
            game_id = %state.game_id,
            expected = option.cost,
            acknowledged = acknowledged_cost,
            "[RETREAT] Stale retreat cost from client"
        );
        return Err(GameError::RetreatCostMismatch {
            expected: option.cost,
            acknowledged: acknowledged_cost,
        });
    }
    state.ledger.debit(color, option.cost)?;

    let retreat = state
        .retreat
        .take()
        .ok_or_else(|| GameError::internal("retreat context vanished"))?;
    if destination != retreat.origin {
        state
            .board
            .relocate(retreat.piece_id, destination)
            .map_err(|e| GameError::internal(e.to_string()))?;
    } else {
        state.board.clear_en_passant();
    }
    let regeneration = Regeneration::base_only(ctx.config);
    state.ledger.apply(color, &regeneration)?;
    info!(
        game_id = %state.game_id,
        to = %destination,
        cost = option.cost,
        "[RETREAT] Executed"
    );

    let mut notices = vec![Notice::everyone(GameEvent::RetreatExecuted {
        color,
        from: retreat.origin,
        to: destination,
        cost: option.cost,
    })];
    notices.extend(complete_ply(
        state,
        ctx,
        CompletedPly {
            color,
            piece: retreat.piece_type,
            piece_id: retreat.piece_id,
            from: retreat.origin,
            to: retreat.target,
            move_type: retreat.move_type,
            promotion: None,
            captured: None,
            duel: Some(retreat.outcome),
            retreat: Some(RetreatRecord {
                to: destination,
                cost: option.cost,
            }),
            regeneration,
        },
    ));

    Ok(Transition {
        outcome: RetreatOutcome {
            cost_applied: option.cost,
            status: state.status.clone(),
        },
        notices,
    })
}

/// The seated player gives up; the opponent wins
pub fn resign(state: &mut GameState, seat: Option<Color>) -> GameResult<Transition<GameStatus>> {
    state.ensure_active()?;
    let color = seated(seat)?;
    state.status = GameStatus::Resigned {
        winner: color.opposite(),
    };
    info!(game_id = %state.game_id, loser = %color, "[ORCHESTRATOR] Resignation");
    Ok(Transition {
        outcome: state.status.clone(),
        notices: vec![Notice::everyone(GameEvent::GameEnded {
            status: state.status.clone(),
        })],
    })
}

/// End a game from outside (clock, abandonment)
pub fn end_game(state: &mut GameState, reason: &str) -> GameResult<Transition<GameStatus>> {
    state.ensure_active()?;
    state.status = GameStatus::Ended {
        reason: reason.to_string(),
    };
    info!(game_id = %state.game_id, reason, "[ORCHESTRATOR] Game ended externally");
    Ok(Transition {
        outcome: state.status.clone(),
        notices: vec![Notice::everyone(GameEvent::GameEnded {
            status: state.status.clone(),
        })],
    })
}

/// Apply a validated move to the board, mapping board failures to internal errors
fn execute(state: &mut GameState, mv: &ChessMove) -> GameResult<Option<chess_rules::Piece>> {
    state
        .board
        .apply(mv)
        .map_err(|e| GameError::internal(format!("board rejected validated move {mv}: {e}")))
}

/// Append the record, pass the turn and look for mate or stalemate
fn complete_ply(state: &mut GameState, ctx: RulesContext<'_>, ply: CompletedPly) -> Vec<Notice> {
    let mut notices = vec![bp_notice(state, ply.color)];
    state.history.add_move(MoveRecord {
        ply: state.history.next_ply(),
        color: ply.color,
        piece: ply.piece,
        piece_id: ply.piece_id,
        from: ply.from,
        to: ply.to,
        move_type: ply.move_type,
        promotion: ply.promotion,
        captured: ply.captured,
        duel: ply.duel,
        retreat: ply.retreat,
        tactics: ply.regeneration.kinds.clone(),
        regenerated: ply.regeneration.total(),
        pools_after: state.ledger,
        recorded_at: Utc::now(),
    });
    state.pass_turn();
    notices.push(phase_notice(state));

    let side = state.turn;
    if ctx.oracle.is_checkmate(&state.board, side) {
        state.status = GameStatus::Checkmate {
            winner: side.opposite(),
        };
    } else if ctx.oracle.is_stalemate(&state.board, side) {
        state.status = GameStatus::Stalemate;
    }
    if !state.status.is_active() {
        info!(
            game_id = %state.game_id,
            status = ?state.status,
            "[ORCHESTRATOR] Game over"
        );
        notices.push(Notice::everyone(GameEvent::GameEnded {
            status: state.status.clone(),
        }));
    }
    notices
}

fn phase_notice(state: &GameState) -> Notice {
    Notice::everyone(GameEvent::PhaseChanged {
        phase: state.phase,
        turn: state.turn,
    })
}

fn bp_notice(state: &GameState, color: Color) -> Notice {
    Notice::player(
        color,
        GameEvent::BpChanged {
            color,
            balance: state.ledger.balance(color),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::duel::DuelRole;
    use crate::game::types::GameId;
    use chess_rules::{Board, StandardOracle};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn game(placement: &str) -> GameState {
        GameState::new(
            GameId::new(),
            Board::from_placement(placement).unwrap(),
            EngineConfig::default().starting_bp,
        )
    }

    fn ctx<'a>(oracle: &'a StandardOracle, config: &'a EngineConfig) -> RulesContext<'a> {
        RulesContext { oracle, config }
    }

    #[test]
    fn quiet_move_passes_turn_and_regenerates() {
        let (oracle, config) = (StandardOracle, EngineConfig::default());
        let mut state = GameState::new(GameId::new(), Board::standard(), 39);
        let c = ctx(&oracle, &config);
        let t = submit_move(&mut state, c, Some(Color::White), sq("e2"), sq("e4"), None).unwrap();
        assert!(!t.outcome.triggers_duel);
        assert_eq!(state.turn, Color::Black);
        assert_eq!(state.ledger.balance(Color::White), 40);
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn precondition_order() {
        let (oracle, config) = (StandardOracle, EngineConfig::default());
        let mut state = GameState::new(GameId::new(), Board::standard(), 39);
        let c = ctx(&oracle, &config);

        assert!(matches!(
            submit_move(&mut state, c, None, sq("e2"), sq("e4"), None),
            Err(GameError::NotAParticipant)
        ));
        assert!(matches!(
            submit_move(&mut state, c, Some(Color::Black), sq("e7"), sq("e5"), None),
            Err(GameError::WrongTurn { expected: Color::White })
        ));
        assert!(matches!(
            submit_move(&mut state, c, Some(Color::White), sq("e7"), sq("e5"), None),
            Err(GameError::PieceNotFound { .. })
        ));
        assert!(matches!(
            submit_move(&mut state, c, Some(Color::White), sq("e2"), sq("e5"), None),
            Err(GameError::InvalidMove(_))
        ));
        assert_eq!(state.version, 0);
        assert!(state.history.is_empty());
    }

    #[test]
    fn capture_opens_duel_without_touching_board() {
        let (oracle, config) = (StandardOracle, EngineConfig::default());
        let mut state = game("4k3/8/8/3p4/8/8/8/3QK3");
        let before = state.board.clone();
        let c = ctx(&oracle, &config);
        let t = submit_move(&mut state, c, Some(Color::White), sq("d1"), sq("d5"), None).unwrap();
        assert!(t.outcome.triggers_duel);
        assert_eq!(state.phase, GamePhase::DuelAllocation);
        assert_eq!(state.turn, Color::White);
        assert_eq!(state.board, before);
        assert!(matches!(
            submit_move(&mut state, c, Some(Color::White), sq("e1"), sq("e2"), None),
            Err(GameError::WrongPhase { .. })
        ));
    }

    #[test]
    fn pawn_losing_duel_snaps_back_with_base_regeneration() {
        let (oracle, config) = (StandardOracle, EngineConfig::default());
        let mut state = game("4k3/8/8/3p4/4P3/8/8/4K3");
        let c = ctx(&oracle, &config);
        submit_move(&mut state, c, Some(Color::White), sq("e4"), sq("d5"), None).unwrap();
        submit_allocation(&mut state, c, Some(Color::White), 2).unwrap();
        let t = submit_allocation(&mut state, c, Some(Color::Black), 3).unwrap();

        assert!(t.outcome.duel_resolved);
        assert!(!t.outcome.retreat_pending);
        assert_eq!(state.phase, GamePhase::NormalMove);
        assert_eq!(state.turn, Color::Black);
        assert!(state.board.piece_at(sq("e4")).is_some());
        assert_eq!(state.ledger.balance(Color::White), 39 - 2 + config.base_regeneration);
        assert_eq!(state.ledger.balance(Color::Black), 36);
        let record = state.history.last_move().unwrap();
        assert_eq!(record.duel.unwrap().winner, DuelRole::Defender);
    }

    #[test]
    fn winning_attacker_captures_and_records() {
        let (oracle, config) = (StandardOracle, EngineConfig::default());
        let mut state = game("4k3/8/8/3p4/8/8/8/3QK3");
        let c = ctx(&oracle, &config);
        submit_move(&mut state, c, Some(Color::White), sq("d1"), sq("d5"), None).unwrap();
        submit_allocation(&mut state, c, Some(Color::Black), 1).unwrap();
        let t = submit_allocation(&mut state, c, Some(Color::White), 4).unwrap();

        assert!(t.outcome.outcome.unwrap().attacker_won());
        assert_eq!(t.outcome.captured_piece, Some(PieceType::Pawn));
        assert_eq!(state.board.piece_at(sq("d5")).unwrap().piece_type, PieceType::Queen);
        assert_eq!(state.captured.taken_by(Color::White), &[PieceType::Pawn]);
        assert_eq!(state.turn, Color::Black);
        assert_eq!(state.history.last_move().unwrap().captured, Some(PieceType::Pawn));
    }

    #[test]
    fn retreat_rejections_leave_state_alone() {
        let (oracle, config) = (StandardOracle, EngineConfig::default());
        let mut state = game("4k3/8/8/3p4/8/8/8/3QK3");
        let c = ctx(&oracle, &config);
        submit_move(&mut state, c, Some(Color::White), sq("d1"), sq("d5"), None).unwrap();
        submit_allocation(&mut state, c, Some(Color::White), 1).unwrap();
        let t = submit_allocation(&mut state, c, Some(Color::Black), 1).unwrap();
        assert!(t.outcome.retreat_pending);
        assert!(t.outcome.retreat_options.is_none());
        assert_eq!(state.phase, GamePhase::TacticalRetreat);
        let snapshot = state.clone();

        assert!(matches!(
            execute_retreat(&mut state, c, Some(Color::Black), sq("d1"), 0),
            Err(GameError::NotAParticipant)
        ));
        assert!(matches!(
            execute_retreat(&mut state, c, Some(Color::White), sq("d3"), 0),
            Err(GameError::InvalidRetreatTarget { .. })
        ));
        assert!(matches!(
            execute_retreat(&mut state, c, Some(Color::White), sq("d1"), 1),
            Err(GameError::RetreatCostMismatch { expected: 0, acknowledged: 1 })
        ));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn resign_and_end_game_stop_play() {
        let (oracle, config) = (StandardOracle, EngineConfig::default());
        let mut state = GameState::new(GameId::new(), Board::standard(), 39);
        resign(&mut state, Some(Color::White)).unwrap();
        assert_eq!(state.status.winner(), Some(Color::Black));
        let c = ctx(&oracle, &config);
        assert!(matches!(
            submit_move(&mut state, c, Some(Color::White), sq("e2"), sq("e4"), None),
            Err(GameError::GameOver)
        ));
        assert!(end_game(&mut state, "timeout").is_err());
    }
}
