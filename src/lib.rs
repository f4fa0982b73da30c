//! Bingo Server Library
//!
//! This module exposes the server components for integration testing.

pub mod api;
pub mod audit;
pub mod balance;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod game;
pub mod notify;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use balance::{BalanceService, SqliteBalanceService};
use config::GameSettings;
use db::store::RoundStore;
use engine::GameEngine;
use notify::{BroadcastNotifier, Notifier};

/// Creates the application router with all endpoints
pub fn create_app(game_state: Arc<api::GameAppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Bingo Server" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api/game", api::game_router().with_state(game_state))
        .layer(cors)
}

/// Wire the engine from a pool and settings. The broadcast notifier is
/// returned separately so callers can subscribe to announcements.
pub fn build_engine(
    pool: db::DbPool,
    settings: GameSettings,
) -> (Arc<GameEngine>, Arc<dyn BalanceService>, Arc<BroadcastNotifier>) {
    let balance: Arc<dyn BalanceService> = Arc::new(SqliteBalanceService::new(
        pool.clone(),
        settings.starting_balance,
    ));
    let notifier = Arc::new(BroadcastNotifier::new());
    let notifier_dyn: Arc<dyn Notifier> = notifier.clone();
    let engine = Arc::new(GameEngine::new(
        RoundStore::new(pool),
        balance.clone(),
        notifier_dyn,
        settings,
    ));
    (engine, balance, notifier)
}

/// Test helper to create an in-memory database and run migrations.
/// A single connection keeps every query on the same in-memory database.
pub async fn create_test_db() -> db::DbPool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Test helper to create a fully configured test app
pub async fn create_test_app(settings: GameSettings) -> (Router, Arc<GameEngine>) {
    let pool = create_test_db().await;
    let (engine, balance, _notifier) = build_engine(pool, settings);
    let game_state = Arc::new(api::GameAppState {
        engine: engine.clone(),
        balance,
    });
    (create_app(game_state), engine)
}
