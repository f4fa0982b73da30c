//! The game engine: one global round behind one lock.
//!
//! Every public operation takes the write lock, mutates the in-memory round,
//! persists it, and only then announces. The background ticker drives timed
//! transitions (lobby close, draws) through [`GameEngine::tick`], so there is
//! exactly one writer path for each mutation.

mod claim;
mod join;
mod tick;

pub use claim::{ClaimOutcome, TapOutcome};
pub use join::JoinOutcome;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::audit;
use crate::balance::BalanceService;
use crate::config::GameSettings;
use crate::db::models::PayoutRecord;
use crate::db::store::RoundStore;
use crate::game::{call_label, current_timestamp_ms, GameResult, GameState, Round};
use crate::notify::Notifier;

pub struct GameEngine {
    round: RwLock<Round>,
    store: RoundStore,
    balance: Arc<dyn BalanceService>,
    notifier: Arc<dyn Notifier>,
    settings: GameSettings,
}

/// Read-only snapshot of the round, shaped for the status endpoint.
/// Deliberately blind to who is a decoy: only the total participant count
/// goes out.
#[derive(Debug, Clone, Serialize)]
pub struct RoundStatus {
    pub state: String,
    pub chat_id: Option<i64>,
    pub participant_count: usize,
    pub pool: i64,
    pub called: Vec<u8>,
    pub last_call: Option<String>,
    pub lobby_deadline: Option<i64>,
    pub next_draw_at: Option<i64>,
}

impl GameEngine {
    pub fn new(
        store: RoundStore,
        balance: Arc<dyn BalanceService>,
        notifier: Arc<dyn Notifier>,
        settings: GameSettings,
    ) -> Self {
        Self {
            round: RwLock::new(Round::new()),
            store,
            balance,
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub async fn status(&self) -> RoundStatus {
        let round = self.round.read().await;
        RoundStatus {
            state: round.state.as_str().to_string(),
            chat_id: round.chat_id,
            participant_count: round.roster.len(),
            pool: round.ledger.pool(),
            called: round.called.as_slice().to_vec(),
            last_call: round.last_call.map(call_label),
            lobby_deadline: round.lobby_deadline,
            next_draw_at: round.next_draw_at,
        }
    }

    /// Human participant count. Kept off the public status payload so the
    /// decoy disguise holds; tests and admin tooling read it here.
    pub async fn real_participant_count(&self) -> usize {
        self.round.read().await.roster.real_count()
    }

    /// Force the round back to IDLE, refunding human stakes when the round
    /// never ran. Stakes of a round already drawing stay in the pool.
    pub async fn reset(&self, by: &str) -> GameResult<()> {
        let mut round = self.round.write().await;
        let previous_state = round.state;

        let refunds: Vec<String> = if previous_state == GameState::Lobby {
            round
                .roster
                .participants()
                .iter()
                .filter(|p| !p.is_decoy)
                .map(|p| p.user_id.clone())
                .collect()
        } else {
            Vec::new()
        };

        let snapshot = round.clone();
        round.reset_to_idle();
        if let Err(e) = self.store.save(&round).await {
            *round = snapshot;
            return Err(e);
        }
        audit::log_reset(by, previous_state.as_str());

        // Refunds run after the reset is durable, so a retried reset can
        // never refund the same stake twice. A failed credit is logged and
        // skipped, like a failed notification.
        for user_id in refunds {
            match self.balance.credit(&user_id, self.settings.stake).await {
                Ok(()) => {
                    audit::log_refund(&user_id, self.settings.stake, "admin reset during lobby")
                }
                Err(e) => {
                    tracing::error!("failed to refund stake for {} after reset: {}", user_id, e)
                }
            }
        }
        Ok(())
    }

    /// Suspend the draw ticker. The called sequence and pool stay intact.
    pub async fn pause(&self) -> GameResult<()> {
        let mut round = self.round.write().await;
        round.pause()?;
        self.store.save(&round).await?;
        tracing::info!("round paused");
        Ok(())
    }

    /// Re-arm the draw ticker from now.
    pub async fn resume(&self) -> GameResult<()> {
        let mut round = self.round.write().await;
        let next = current_timestamp_ms() + (self.settings.draw_interval_secs as i64) * 1000;
        round.resume(next)?;
        self.store.save(&round).await?;
        tracing::info!("round resumed");
        Ok(())
    }

    /// Restore the persisted round on startup. Pending payouts are settled
    /// first; the last call is re-announced as a catch-up message, never
    /// re-drawn.
    pub async fn resume_from_store(&self) -> GameResult<bool> {
        self.settle_pending_payouts().await?;

        let Some(stored) = self.store.load().await? else {
            tracing::info!("no stored round to restore");
            return Ok(false);
        };

        let chat_id = stored.chat_id.unwrap_or(0);
        let state = stored.state;
        let drawn_count = stored.called.len();
        let last_call = stored.last_call.map(call_label);
        audit::log_resume(state.as_str(), stored.roster.len(), drawn_count);

        {
            let mut round = self.round.write().await;
            *round = stored;
            // A round that was mid-draw re-arms its ticker from now; the
            // persisted absolute deadline may be far in the past.
            if round.state == GameState::Running && round.next_draw_at.is_none() {
                round.next_draw_at = Some(
                    current_timestamp_ms() + (self.settings.draw_interval_secs as i64) * 1000,
                );
            }
        }

        self.announce(
            self.notifier
                .announce_resume(chat_id, state, drawn_count, last_call),
        )
        .await;
        Ok(true)
    }

    /// Pay out and close the round for the participant at `winner_idx`.
    /// Decoy winners are announced but never credited.
    ///
    /// The round end and the pending payout are persisted in one
    /// transaction before any balance moves; a crash before settlement is
    /// repaired by `resume_from_store` without crediting twice.
    pub(crate) async fn resolve_win(&self, round: &mut Round, winner_idx: usize) -> GameResult<i64> {
        let prize = round.ledger.compute_prize(self.settings.commission_rate);
        let winner = round.roster.participants()[winner_idx].clone();
        let chat_id = round.chat_id.unwrap_or(0);
        let pool = round.ledger.pool();

        let snapshot = round.clone();
        round.reset_to_idle();

        let saved = if winner.is_decoy {
            self.store.save(round).await.map(|()| None)
        } else {
            let payout = PayoutRecord::new(&winner.user_id, &winner.username, prize);
            self.store
                .save_with_payout(round, &payout)
                .await
                .map(|()| Some(payout))
        };
        let payout = match saved {
            Ok(payout) => payout,
            Err(e) => {
                *round = snapshot;
                return Err(e);
            }
        };
        if let Some(payout) = payout {
            self.settle_payout(&payout).await;
        }

        audit::log_payout(&winner.user_id, &winner.username, pool, prize, winner.is_decoy);
        self.announce(
            self.notifier
                .announce_winner(chat_id, &winner.username, prize),
        )
        .await;
        Ok(prize)
    }

    /// Credit a pending payout and flip its settled flag. A failure leaves
    /// the payout pending, to be retried on the next restore.
    async fn settle_payout(&self, payout: &PayoutRecord) -> bool {
        if let Err(e) = self.balance.credit(&payout.user_id, payout.amount).await {
            tracing::error!(
                "failed to credit payout {} for {}: {}",
                payout.id,
                payout.user_id,
                e
            );
            return false;
        }
        if let Err(e) = self.store.mark_payout_settled(&payout.id).await {
            tracing::error!("failed to mark payout {} settled: {}", payout.id, e);
        }
        true
    }

    async fn settle_pending_payouts(&self) -> GameResult<()> {
        for payout in self.store.unsettled_payouts().await? {
            tracing::info!(
                "settling pending payout {} for {}",
                payout.id,
                payout.user_id
            );
            if self.settle_payout(&payout).await {
                audit::log_payout_settled(&payout.user_id, payout.amount);
            }
        }
        Ok(())
    }

    /// Run a notifier call under the configured timeout. Delivery failure
    /// never blocks or fails the engine.
    pub(crate) async fn announce<F>(&self, fut: F)
    where
        F: Future<Output = ()>,
    {
        let timeout = Duration::from_millis(self.settings.notify_timeout_ms);
        if tokio::time::timeout(timeout, fut).await.is_err() {
            tracing::warn!("announcement timed out after {:?}", timeout);
        }
    }
}
