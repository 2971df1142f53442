use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use duelchess::chess_rules::{Board, PieceType, Square};
use duelchess::networking::{BroadcastNotifier, SeatTable};
use duelchess::{Engine, EngineConfig, GameError, GameId, PlayerId, ServiceRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub seats: Arc<SeatTable>,
    pub notifier: Arc<BroadcastNotifier>,
}

impl AppState {
    /// Wire an engine with in-process store, seat table and broadcast notifier
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        let seats = Arc::new(SeatTable::new());
        let notifier = Arc::new(BroadcastNotifier::default());
        let registry = ServiceRegistry::builder()
            .identity(seats.clone())
            .notifier(notifier.clone())
            .config(config)
            .build()?;
        Ok(Self {
            engine: Arc::new(Engine::new(registry)),
            seats,
            notifier,
        })
    }
}

#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub white: String,
    pub black: String,
    /// FEN piece placement; the standard position when absent
    pub placement: Option<String>,
}

#[derive(Serialize)]
pub struct CreateGameResponse {
    pub success: bool,
    pub game_id: GameId,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub player_id: String,
    pub from: String,
    pub to: String,
    pub promotion: Option<char>,
}

#[derive(Deserialize)]
pub struct AllocationRequest {
    pub player_id: String,
    pub amount: i64,
}

#[derive(Deserialize)]
pub struct RetreatRequest {
    pub player_id: String,
    pub destination: String,
    pub cost: u32,
}

#[derive(Deserialize)]
pub struct PlayerRequest {
    pub player_id: String,
}

#[derive(Deserialize)]
pub struct ViewQuery {
    pub viewer: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/moves", post(submit_move))
        .route("/games/{id}/allocations", post(submit_allocation))
        .route("/games/{id}/retreats", post(execute_retreat))
        .route("/games/{id}/resign", post(resign))
        .with_state(state)
}

/// Request failures rendered as `{ success: false, error, message }`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Game(GameError),
    Worker(String),
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        ApiError::Game(err)
    }
}

pub fn status_for(err: &GameError) -> StatusCode {
    match err {
        GameError::GameNotFound(_) => StatusCode::NOT_FOUND,
        GameError::NotAParticipant => StatusCode::FORBIDDEN,
        GameError::GameAlreadyExists(_)
        | GameError::WrongTurn { .. }
        | GameError::WrongPhase { .. }
        | GameError::AlreadyAllocated { .. }
        | GameError::RetreatCostMismatch { .. }
        | GameError::GameOver
        | GameError::GameFlagged { .. } => StatusCode::CONFLICT,
        GameError::InvalidMove(_)
        | GameError::InvalidBoard(_)
        | GameError::PieceNotFound { .. }
        | GameError::AllocationOutOfRange { .. }
        | GameError::InvalidRetreatTarget { .. }
        | GameError::InsufficientBp { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        GameError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
        GameError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
            ApiError::Game(err) => (status_for(&err), err.code(), err.to_string()),
            ApiError::Worker(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        };
        let body = json!({
            "success": false,
            "error": code,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn parse_game_id(raw: &str) -> Result<GameId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid game id: {raw}")))
}

fn parse_square(raw: &str) -> Result<Square, ApiError> {
    Square::from_algebraic(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid square: {raw}")))
}

fn parse_promotion(raw: Option<char>) -> Result<Option<PieceType>, ApiError> {
    raw.map(|c| {
        PieceType::from_char(c)
            .map(|(piece_type, _)| piece_type)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid promotion piece: {c}")))
    })
    .transpose()
}

fn success<T: Serialize>(result: T) -> ApiResult {
    Ok(Json(json!({ "success": true, "result": result })))
}

/// The engine blocks on per-game locks, so calls run off the async workers
async fn run_blocking<T, F>(engine: Arc<Engine>, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&Engine) -> Result<T, GameError> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || call(&engine))
        .await
        .map_err(|e| {
            error!("[API] Engine task failed: {}", e);
            ApiError::Worker(e.to_string())
        })?;
    outcome.map_err(|err| {
        if err.is_internal() {
            error!("[API] {}", err);
        } else {
            warn!(code = err.code(), "[API] Request rejected: {}", err);
        }
        ApiError::Game(err)
    })
}

async fn create_game(
    State(state): State<AppState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<CreateGameResponse>, ApiError> {
    if payload.white == payload.black {
        return Err(ApiError::BadRequest(
            "white and black must be different players".to_string(),
        ));
    }
    let board = payload
        .placement
        .as_deref()
        .map(Board::from_placement)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let game_id = GameId::new();
    state.seats.seat(
        game_id,
        PlayerId::new(payload.white),
        PlayerId::new(payload.black),
    );
    let created = run_blocking(state.engine.clone(), move |engine| {
        engine.create_game(game_id, board)
    })
    .await;
    if let Err(err) = created {
        state.seats.unseat(game_id);
        return Err(err);
    }

    info!("[API] Game {} created", game_id);
    Ok(Json(CreateGameResponse {
        success: true,
        game_id,
    }))
}

async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> ApiResult {
    let game_id = parse_game_id(&id)?;
    let viewer = query.viewer.map(PlayerId::new);
    let view = run_blocking(state.engine, move |engine| {
        engine.get_filtered_state(game_id, viewer.as_ref())
    })
    .await?;
    success(view)
}

async fn submit_move(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MoveRequest>,
) -> ApiResult {
    let game_id = parse_game_id(&id)?;
    let from = parse_square(&payload.from)?;
    let to = parse_square(&payload.to)?;
    let promotion = parse_promotion(payload.promotion)?;
    let player = PlayerId::new(payload.player_id);
    let outcome = run_blocking(state.engine, move |engine| {
        engine.submit_move(game_id, &player, from, to, promotion)
    })
    .await?;
    success(outcome)
}

async fn submit_allocation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AllocationRequest>,
) -> ApiResult {
    let game_id = parse_game_id(&id)?;
    let player = PlayerId::new(payload.player_id);
    let amount = payload.amount;
    let outcome = run_blocking(state.engine, move |engine| {
        engine.submit_allocation(game_id, &player, amount)
    })
    .await?;
    success(outcome)
}

async fn execute_retreat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RetreatRequest>,
) -> ApiResult {
    let game_id = parse_game_id(&id)?;
    let destination = parse_square(&payload.destination)?;
    let player = PlayerId::new(payload.player_id);
    let cost = payload.cost;
    let outcome = run_blocking(state.engine, move |engine| {
        engine.execute_retreat(game_id, &player, destination, cost)
    })
    .await?;
    success(outcome)
}

async fn resign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PlayerRequest>,
) -> ApiResult {
    let game_id = parse_game_id(&id)?;
    let player = PlayerId::new(payload.player_id);
    let status = run_blocking(state.engine, move |engine| engine.resign(game_id, &player)).await?;
    success(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelchess::chess_rules::Color;

    #[test]
    fn test_status_mapping_groups_errors() {
        assert_eq!(
            status_for(&GameError::GameNotFound(GameId::new())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&GameError::WrongTurn {
                expected: Color::White
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&GameError::InsufficientBp {
                needed: 3,
                available: 1
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&GameError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_promotion_letters_ignore_case() {
        assert_eq!(parse_promotion(Some('n')).unwrap(), Some(PieceType::Knight));
        assert_eq!(parse_promotion(Some('Q')).unwrap(), Some(PieceType::Queen));
        assert_eq!(parse_promotion(None).unwrap(), None);
        assert!(parse_promotion(Some('x')).is_err());
    }

    #[test]
    fn test_bad_squares_are_rejected() {
        assert!(parse_square("e4").is_ok());
        assert!(parse_square("z9").is_err());
    }
}
