//! Backend API Integration Tests
//!
//! Tests for the Axum HTTP endpoints using Router::oneshot pattern.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use backend::api::{self, AppState};
use duelchess::EngineConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create test router
fn test_router() -> Router {
    let state = AppState::new(EngineConfig::default()).expect("app state");
    api::router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create_game(app: &Router, placement: Option<&str>) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/games",
        Some(json!({"white": "alice", "black": "bob", "placement": placement})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    body["game_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_game_returns_id() {
    let app = test_router();
    let game_id = create_game(&app, None).await;
    assert_eq!(game_id.len(), 36);
}

#[tokio::test]
async fn test_same_player_on_both_sides_is_rejected() {
    let app = test_router();
    let (status, body) = send(
        &app,
        "POST",
        "/games",
        Some(json!({"white": "alice", "black": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_malformed_placement_is_bad_request() {
    let app = test_router();
    let placement = format!("4k3/8/8/8/8/8/8/{}", "9".repeat(29));
    let (status, body) = send(
        &app,
        "POST",
        "/games",
        Some(json!({"white": "alice", "black": "bob", "placement": placement})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_quiet_move_passes_turn() {
    let app = test_router();
    let game_id = create_game(&app, None).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/moves"),
        Some(json!({"player_id": "alice", "from": "e2", "to": "e4"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["triggers_duel"], false);

    let (_, view) = send(&app, "GET", &format!("/games/{game_id}?viewer=bob"), None).await;
    assert_eq!(view["result"]["turn"], "black");
    assert_eq!(view["result"]["your_bp"], 39);
}

#[tokio::test]
async fn test_wrong_turn_is_conflict() {
    let app = test_router();
    let game_id = create_game(&app, None).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/moves"),
        Some(json!({"player_id": "bob", "from": "e7", "to": "e5"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "wrong_turn");
}

#[tokio::test]
async fn test_unknown_game_is_not_found() {
    let app = test_router();
    let (status, body) = send(
        &app,
        "GET",
        "/games/6f1c2a9e-2a51-4c8e-9a43-0d7b1c2e3f40",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "game_not_found");

    let (status, _) = send(&app, "GET", "/games/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duel_allocation_is_hidden_until_resolution() {
    let app = test_router();
    let game_id = create_game(&app, Some("4k3/8/8/3p4/8/3Q4/8/4K3")).await;

    let (_, body) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/moves"),
        Some(json!({"player_id": "alice", "from": "d3", "to": "d5"})),
    )
    .await;
    assert_eq!(body["result"]["triggers_duel"], true);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/allocations"),
        Some(json!({"player_id": "alice", "amount": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, view) = send(&app, "GET", &format!("/games/{game_id}?viewer=bob"), None).await;
    assert_eq!(view["result"]["duel"]["attacker_committed"], true);
    assert!(view["result"]["duel"]["your_allocation"].is_null());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/allocations"),
        Some(json!({"player_id": "bob", "amount": 11})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "allocation_out_of_range");

    let (_, body) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/allocations"),
        Some(json!({"player_id": "bob", "amount": 2})),
    )
    .await;
    assert_eq!(body["result"]["duel_resolved"], true);
    assert_eq!(body["result"]["outcome"]["attacker_allocation"], 6);
}

#[tokio::test]
async fn test_resign_ends_game() {
    let app = test_router();
    let game_id = create_game(&app, None).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/resign"),
        Some(json!({"player_id": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["kind"], "resigned");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/moves"),
        Some(json!({"player_id": "alice", "from": "e2", "to": "e4"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "game_over");
}

#[tokio::test]
async fn test_spectator_sees_no_pool() {
    let app = test_router();
    let game_id = create_game(&app, None).await;
    let (status, view) = send(&app, "GET", &format!("/games/{game_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(view["result"]["your_bp"].is_null());
    assert_eq!(view["result"]["viewer"]["role"], "spectator");
}
