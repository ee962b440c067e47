//! Tests for the REST client: snapshot decoding, error-code mapping, and
//! push URL derivation, against an in-process server with canned responses.

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use noughts::{ClientError, GameApi, GameStatus, Mark, Position, RestClient};
use serde_json::{Value, json};

const GAME_ID: &str = "7f2d3c44-9a1b-4e5f-8c6d-0a1b2c3d4e5f";
const PLAYER_ID: &str = "11111111-2222-4333-8444-555555555555";

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn waiting_body() -> Value {
    json!({
        "game_id": GAME_ID,
        "player_id": PLAYER_ID,
        "board": [[null, null, null], [null, null, null], [null, null, null]],
        "current_turn": "X",
        "status": "waiting",
        "winner": null,
        "player_count": 1
    })
}

fn error_body(code: &str, message: &str) -> Value {
    json!({ "detail": { "code": code, "message": message, "details": {} } })
}

#[tokio::test]
async fn test_create_game_decodes_snapshot() {
    let app = Router::new().route("/api/games", post(|| async { Json(waiting_body()) }));
    let client = RestClient::new(spawn_server(app).await);

    let snapshot = client.create_game().await.unwrap();
    assert_eq!(snapshot.game_id, GAME_ID);
    assert_eq!(snapshot.player_id.as_deref(), Some(PLAYER_ID));
    assert_eq!(snapshot.status, GameStatus::Waiting);
    assert_eq!(snapshot.player_count, 1);
}

#[tokio::test]
async fn test_join_full_game_maps_to_conflict() {
    let app = Router::new().route(
        "/api/games/{id}/join",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(error_body("GAME_RULE_VIOLATION", "Game is full")),
            )
        }),
    );
    let client = RestClient::new(spawn_server(app).await);

    let err = client.join_game(GAME_ID).await.unwrap_err();
    assert_eq!(err, ClientError::Conflict);
}

#[tokio::test]
async fn test_join_unknown_game_maps_to_not_found() {
    let app = Router::new().route(
        "/api/games/{id}/join",
        post(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(error_body("GAME_NOT_FOUND", "Game not found")),
            )
        }),
    );
    let client = RestClient::new(spawn_server(app).await);

    let err = client.join_game(GAME_ID).await.unwrap_err();
    assert_eq!(err, ClientError::NotFound);
}

#[tokio::test]
async fn test_rejected_move_surfaces_server_reason() {
    let app = Router::new().route(
        "/api/games/{id}/move",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(error_body("GAME_RULE_VIOLATION", "Not your turn")),
            )
        }),
    );
    let client = RestClient::new(spawn_server(app).await);

    let err = client
        .submit_move(GAME_ID, PLAYER_ID, Position(0, 0))
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::IllegalMove("Not your turn".to_string()));
}

#[tokio::test]
async fn test_accepted_move_returns_new_state() {
    let app = Router::new().route(
        "/api/games/{id}/move",
        post(|| async {
            Json(json!({
                "game_id": GAME_ID,
                "board": [["X", null, null], [null, null, null], [null, null, null]],
                "current_turn": "O",
                "status": "in_progress",
                "winner": null,
                "player_count": 2
            }))
        }),
    );
    let client = RestClient::new(spawn_server(app).await);

    let snapshot = client
        .submit_move(GAME_ID, PLAYER_ID, Position(0, 0))
        .await
        .unwrap();
    assert_eq!(snapshot.cell(0, 0), Some(Mark::X));
    assert_eq!(snapshot.current_turn, Some(Mark::O));
}

#[tokio::test]
async fn test_unstructured_failure_maps_to_server_error() {
    let app = Router::new().route(
        "/api/games/{id}",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = RestClient::new(spawn_server(app).await);

    let err = client.fetch_state(GAME_ID).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 500, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_malformed_success_body_maps_to_server_error() {
    let app = Router::new().route("/api/games", post(|| async { Json(json!({"nope": true})) }));
    let client = RestClient::new(spawn_server(app).await);

    let err = client.create_game().await.unwrap_err();
    assert!(matches!(err, ClientError::Server { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_server_maps_to_network_error() {
    // Nothing listens on the discard port.
    let client = RestClient::new("http://127.0.0.1:9/api");

    let err = client.fetch_state(GAME_ID).await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)), "got {err:?}");
}

#[test]
fn test_push_url_derivation() {
    let client = RestClient::new("http://localhost:8000/api/");
    assert_eq!(
        client.push_url(GAME_ID),
        format!("ws://localhost:8000/api/games/{GAME_ID}/ws")
    );

    let client = RestClient::new("https://example.com/api");
    assert_eq!(
        client.push_url(GAME_ID),
        format!("wss://example.com/api/games/{GAME_ID}/ws")
    );
}
