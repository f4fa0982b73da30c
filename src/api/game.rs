use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::balance::BalanceService;
use crate::engine::{ClaimOutcome, GameEngine, JoinOutcome, RoundStatus, TapOutcome};
use crate::error::{AppError, Result};

pub struct GameAppState {
    pub engine: Arc<GameEngine>,
    pub balance: Arc<dyn BalanceService>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub user_id: String,
    pub username: String,
    /// Target channel for announcements (defaults to 0).
    pub chat_id: Option<i64>,
    pub card_number: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TapRequest {
    pub user_id: String,
    pub number: u8,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ResetRequest {
    pub by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user_id: String,
    pub balance: i64,
}

pub fn router() -> Router<Arc<GameAppState>> {
    Router::new()
        .route("/join", post(join))
        .route("/tap", post(tap))
        .route("/claim", post(claim))
        .route("/status", get(status))
        .route("/reset", post(reset))
        .route("/pause", post(pause))
        .route("/resume", post(resume))
        .route("/balance/:user_id", get(balance))
}

async fn join(
    State(state): State<Arc<GameAppState>>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinOutcome>> {
    if req.user_id.is_empty() {
        return Err(AppError::BadRequest("user_id must not be empty".into()));
    }
    if let Some(n) = req.card_number {
        if n == 0 || n > 100 {
            return Err(AppError::BadRequest(
                "card_number must be between 1 and 100".into(),
            ));
        }
    }
    let outcome = state
        .engine
        .join(
            req.chat_id.unwrap_or(0),
            &req.user_id,
            &req.username,
            req.card_number,
        )
        .await?;
    Ok(Json(outcome))
}

async fn tap(
    State(state): State<Arc<GameAppState>>,
    Json(req): Json<TapRequest>,
) -> Result<Json<TapOutcome>> {
    let outcome = state.engine.tap(&req.user_id, req.number).await?;
    Ok(Json(outcome))
}

async fn claim(
    State(state): State<Arc<GameAppState>>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<ClaimOutcome>> {
    let outcome = state.engine.claim(&req.user_id).await?;
    Ok(Json(outcome))
}

async fn status(State(state): State<Arc<GameAppState>>) -> Json<RoundStatus> {
    Json(state.engine.status().await)
}

async fn reset(
    State(state): State<Arc<GameAppState>>,
    req: Option<Json<ResetRequest>>,
) -> Result<Json<RoundStatus>> {
    let by = req
        .map(|Json(r)| r.by.unwrap_or_default())
        .unwrap_or_default();
    let by = if by.is_empty() { "api" } else { &by };
    state.engine.reset(by).await?;
    Ok(Json(state.engine.status().await))
}

async fn pause(State(state): State<Arc<GameAppState>>) -> Result<Json<RoundStatus>> {
    state.engine.pause().await?;
    Ok(Json(state.engine.status().await))
}

async fn resume(State(state): State<Arc<GameAppState>>) -> Result<Json<RoundStatus>> {
    state.engine.resume().await?;
    Ok(Json(state.engine.status().await))
}

async fn balance(
    State(state): State<Arc<GameAppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceResponse>> {
    let balance = state.balance.balance_of(&user_id).await?;
    Ok(Json(BalanceResponse { user_id, balance }))
}
