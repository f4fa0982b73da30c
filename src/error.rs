//! HTTP-facing error type.
//!
//! Handlers return `Result<_, AppError>`; game errors carry their own HTTP
//! status so the mapping lives in one place.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::game::GameError;

#[derive(Debug)]
pub enum AppError {
    Game(GameError),
    BadRequest(String),
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Game(e) => write!(f, "{}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        AppError::Game(err)
    }
}

fn game_error_status(err: &GameError) -> StatusCode {
    match err {
        GameError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
        GameError::RoundBusy | GameError::CardTaken { .. } | GameError::AlreadyJoined => {
            StatusCode::CONFLICT
        }
        GameError::InvalidClaim { .. }
        | GameError::NotJoined
        | GameError::NumberNotOnCard { .. }
        | GameError::NumberAlreadyCalled { .. }
        | GameError::InvalidStateTransition { .. } => StatusCode::BAD_REQUEST,
        GameError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Game(e) => (game_error_status(e), e.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            game_error_status(&GameError::InsufficientFunds {
                required: 100,
                available: 0
            }),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(game_error_status(&GameError::RoundBusy), StatusCode::CONFLICT);
        assert_eq!(
            game_error_status(&GameError::NotJoined),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            game_error_status(&GameError::Persistence("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
