pub mod card;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod participant;
pub mod round;
pub mod win;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-export commonly used items
pub use card::{call_label, Card};
pub use error::{GameError, GameResult};
pub use ledger::RoundLedger;
pub use participant::{Participant, Roster};
pub use round::{CalledNumbers, GameState, Round};

/// Get current timestamp in milliseconds since UNIX epoch.
/// Returns 0 on system clock error (should never happen in practice).
pub fn current_timestamp_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_else(|e| {
            tracing::error!("System clock error: {}", e);
            0
        })
}
