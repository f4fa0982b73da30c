//! Game-related error types
//!
//! Using typed errors instead of String provides:
//! - Better error handling and matching
//! - Clearer API contracts
//! - Better debugging information

use std::fmt;

/// Errors that can occur during game operations
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    // Join errors
    InsufficientFunds { required: i64, available: i64 },
    RoundBusy,
    CardTaken { card_number: u32 },
    AlreadyJoined,

    // Claim errors
    InvalidClaim { reason: String },
    NotJoined,
    NumberNotOnCard { number: u8 },

    // Round state errors
    NumberAlreadyCalled { number: u8 },
    InvalidStateTransition { from: String, to: String },

    // Storage
    Persistence(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds. Required: {}, Available: {}",
                    required, available
                )
            }
            GameError::RoundBusy => write!(f, "A round is already running. Please wait"),
            GameError::CardTaken { card_number } => {
                write!(f, "Card {} is already taken", card_number)
            }
            GameError::AlreadyJoined => write!(f, "You are already in this round"),

            GameError::InvalidClaim { reason } => write!(f, "Invalid claim: {}", reason),
            GameError::NotJoined => write!(f, "You have not joined the current round"),
            GameError::NumberNotOnCard { number } => {
                write!(f, "Number {} is not on your card", number)
            }

            GameError::NumberAlreadyCalled { number } => {
                write!(f, "Number {} was already called", number)
            }
            GameError::InvalidStateTransition { from, to } => {
                write!(f, "Invalid state transition: {} -> {}", from, to)
            }

            GameError::Persistence(msg) => write!(f, "Persistence error: {}", msg),
        }
    }
}

impl std::error::Error for GameError {}

impl From<sqlx::Error> for GameError {
    fn from(err: sqlx::Error) -> Self {
        GameError::Persistence(err.to_string())
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GameError::InsufficientFunds {
            required: 100,
            available: 40,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds. Required: 100, Available: 40"
        );

        let err = GameError::NumberNotOnCard { number: 42 };
        assert_eq!(err.to_string(), "Number 42 is not on your card");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(GameError::RoundBusy, GameError::RoundBusy);
        assert_ne!(GameError::RoundBusy, GameError::NotJoined);
    }
}
