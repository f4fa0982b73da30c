//! Round announcements.
//!
//! The engine never depends on delivery: every announce call is wrapped in a
//! bounded timeout by the caller, and failures are logged and swallowed. The
//! default implementation fans events out over a tokio broadcast channel so
//! any front end (SSE, chat bridge) can subscribe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::game::constants::BROADCAST_CHANNEL_CAPACITY;
use crate::game::GameState;

/// One announcement, as seen by subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStarted {
        chat_id: i64,
        participant_count: usize,
        pool: i64,
    },
    NumberDrawn {
        chat_id: i64,
        label: String,
        count: usize,
    },
    Winner {
        chat_id: i64,
        username: String,
        prize: i64,
    },
    NoWinner {
        chat_id: i64,
    },
    Resumed {
        chat_id: i64,
        state: String,
        drawn_count: usize,
        last_call: Option<String>,
    },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn announce_round_start(&self, chat_id: i64, participant_count: usize, pool: i64);
    async fn announce_draw(&self, chat_id: i64, label: &str, count: usize);
    async fn announce_winner(&self, chat_id: i64, username: &str, prize: i64);
    async fn announce_no_winner(&self, chat_id: i64);
    /// Catch-up message after a restart; re-announces the last call instead
    /// of re-drawing it.
    async fn announce_resume(
        &self,
        chat_id: i64,
        state: GameState,
        drawn_count: usize,
        last_call: Option<String>,
    );
}

/// Broadcast-channel notifier. Send errors just mean nobody is subscribed.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<GameEvent>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    fn send(&self, event: GameEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("no subscribers for game event");
        }
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn announce_round_start(&self, chat_id: i64, participant_count: usize, pool: i64) {
        tracing::info!(
            "Lobby time is over, starting round: {} participants, pool {}",
            participant_count,
            pool
        );
        self.send(GameEvent::RoundStarted {
            chat_id,
            participant_count,
            pool,
        });
    }

    async fn announce_draw(&self, chat_id: i64, label: &str, count: usize) {
        tracing::info!("Number {} called: {}", count, label);
        self.send(GameEvent::NumberDrawn {
            chat_id,
            label: label.to_string(),
            count,
        });
    }

    async fn announce_winner(&self, chat_id: i64, username: &str, prize: i64) {
        tracing::info!("BINGO! {} wins {}", username, prize);
        self.send(GameEvent::Winner {
            chat_id,
            username: username.to_string(),
            prize,
        });
    }

    async fn announce_no_winner(&self, chat_id: i64) {
        tracing::info!("Game over: all numbers drawn, no winner found");
        self.send(GameEvent::NoWinner { chat_id });
    }

    async fn announce_resume(
        &self,
        chat_id: i64,
        state: GameState,
        drawn_count: usize,
        last_call: Option<String>,
    ) {
        tracing::info!(
            "Round resumed in state {} ({} numbers drawn)",
            state,
            drawn_count
        );
        self.send(GameEvent::Resumed {
            chat_id,
            state: state.as_str().to_string(),
            drawn_count,
            last_call,
        });
    }
}
