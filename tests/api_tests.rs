//! Integration tests for the Bingo Server API
//!
//! These tests verify that the HTTP endpoints work correctly with a real
//! database behind the engine.

use axum_test::TestServer;
use bingo_server::config::GameSettings;
use bingo_server::create_test_app;
use serde_json::{json, Value};

/// Helper to create a test server instance. Lobby and draw delays are kept
/// long so rounds only move when a test says so.
async fn setup() -> TestServer {
    let settings = GameSettings {
        lobby_secs: 3600,
        draw_interval_secs: 3600,
        decoys_enabled: false,
        ..GameSettings::default()
    };
    let (app, _engine) = create_test_app(settings).await;
    TestServer::new(app).unwrap()
}

async fn join(server: &TestServer, user_id: &str, username: &str) -> Value {
    let response = server
        .post("/api/game/join")
        .json(&json!({
            "user_id": user_id,
            "username": username
        }))
        .await;

    response.assert_status_ok();
    response.json()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = setup().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = setup().await;

    let response = server.get("/").await;

    response.assert_status_ok();
    response.assert_text("Bingo Server");
}

// ============================================================================
// Status Tests
// ============================================================================

#[tokio::test]
async fn test_status_starts_idle() {
    let server = setup().await;

    let response = server.get("/api/game/status").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["state"], "IDLE");
    assert_eq!(body["participant_count"], 0);
    assert_eq!(body["pool"], 0);
    assert_eq!(body["called"], json!([]));
}

#[tokio::test]
async fn test_status_does_not_reveal_the_real_participant_count() {
    let server = setup().await;

    join(&server, "u1", "Player One").await;

    let body: Value = server.get("/api/game/status").await.json();
    // Only the total participant count goes out; nothing in the payload
    // distinguishes real players from house-filled seats.
    assert!(body.get("real_count").is_none());
    assert!(body.get("is_decoy").is_none());
    assert_eq!(body["participant_count"], 1);
}

// ============================================================================
// Join Tests
// ============================================================================

#[tokio::test]
async fn test_join_opens_a_lobby_and_deals_a_card() {
    let server = setup().await;

    let body = join(&server, "u1", "Player One").await;

    assert_eq!(body["rejoined"], false);
    assert_eq!(body["state"], "LOBBY");
    assert_eq!(body["pool"], 100);

    // A card is a 5x5 grid of columns with the free cell in the middle.
    let card = body["card"].as_array().unwrap();
    assert_eq!(card.len(), 5);
    assert_eq!(card[2][2], 0);

    let status: Value = server.get("/api/game/status").await.json();
    assert_eq!(status["state"], "LOBBY");
    assert_eq!(status["participant_count"], 1);
}

#[tokio::test]
async fn test_rejoin_returns_the_same_card() {
    let server = setup().await;

    let first = join(&server, "u1", "Player One").await;
    let second = join(&server, "u1", "Player One").await;

    assert_eq!(second["rejoined"], true);
    assert_eq!(second["card"], first["card"]);

    let status: Value = server.get("/api/game/status").await.json();
    assert_eq!(status["pool"], 100);
}

#[tokio::test]
async fn test_join_rejects_empty_user_id() {
    let server = setup().await;

    let response = server
        .post("/api/game/join")
        .json(&json!({ "user_id": "", "username": "Nobody" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_join_rejects_out_of_range_card_number() {
    let server = setup().await;

    let response = server
        .post("/api/game/join")
        .json(&json!({
            "user_id": "u1",
            "username": "Player One",
            "card_number": 0
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_taken_card_number_conflicts() {
    let server = setup().await;

    server
        .post("/api/game/join")
        .json(&json!({
            "user_id": "u1",
            "username": "Player One",
            "card_number": 9
        }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/game/join")
        .json(&json!({
            "user_id": "u2",
            "username": "Player Two",
            "card_number": 9
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("already taken"));
}

// ============================================================================
// Tap / Claim Tests
// ============================================================================

#[tokio::test]
async fn test_tap_outside_a_round_is_rejected() {
    let server = setup().await;

    join(&server, "u1", "Player One").await;

    // Still in LOBBY: there is nothing to tap yet.
    let response = server
        .post("/api/game/tap")
        .json(&json!({ "user_id": "u1", "number": 12 }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_claim_without_a_round_is_rejected() {
    let server = setup().await;

    let response = server
        .post("/api/game/claim")
        .json(&json!({ "user_id": "u1" }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid claim"));
}

// ============================================================================
// Admin Tests
// ============================================================================

#[tokio::test]
async fn test_reset_returns_to_idle() {
    let server = setup().await;

    join(&server, "u1", "Player One").await;

    let response = server
        .post("/api/game/reset")
        .json(&json!({ "by": "test-admin" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["state"], "IDLE");
    assert_eq!(body["participant_count"], 0);
}

#[tokio::test]
async fn test_pause_outside_running_is_rejected() {
    let server = setup().await;

    let response = server.post("/api/game/pause").await;

    response.assert_status_bad_request();
}

// ============================================================================
// Balance Tests
// ============================================================================

#[tokio::test]
async fn test_join_debits_the_starting_balance() {
    let server = setup().await;

    join(&server, "u1", "Player One").await;

    let response = server.get("/api/game/balance/u1").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["balance"], 10000 - 100);
}

#[tokio::test]
async fn test_reset_refunds_the_lobby_stake() {
    let server = setup().await;

    join(&server, "u1", "Player One").await;
    server.post("/api/game/reset").await.assert_status_ok();

    let body: Value = server.get("/api/game/balance/u1").await.json();
    assert_eq!(body["balance"], 10000);
}

#[tokio::test]
async fn test_unknown_balance_is_zero() {
    let server = setup().await;

    let body: Value = server.get("/api/game/balance/ghost").await.json();
    assert_eq!(body["balance"], 0);
}
