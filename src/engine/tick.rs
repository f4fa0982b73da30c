//! Timed transitions: lobby close and number draws.
//!
//! One background task calls [`GameEngine::tick`] on a short interval; the
//! tick compares absolute deadlines against the clock, so a missed or
//! delayed tick never skips work and a restart picks up where it left off.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::GameEngine;
use crate::audit;
use crate::config::ClaimMode;
use crate::game::{call_label, current_timestamp_ms, participant, win, GameResult, GameState};

impl GameEngine {
    /// Advance the round clock: close a due lobby, then draw a due number.
    pub async fn tick(&self) -> GameResult<()> {
        let now = current_timestamp_ms();
        self.close_lobby_if_due(now).await?;
        self.draw_if_due(now).await
    }

    async fn close_lobby_if_due(&self, now: i64) -> GameResult<()> {
        let mut round = self.round.write().await;
        if round.state != GameState::Lobby {
            return Ok(());
        }
        let Some(deadline) = round.lobby_deadline else {
            return Ok(());
        };
        if now < deadline {
            return Ok(());
        }

        let snapshot = round.clone();

        let real = round.roster.real_count();
        if real == 0 {
            // Nobody staked anything; just close the lobby.
            tracing::info!("lobby deadline reached with no participants, cancelling");
            round.reset_to_idle();
            if let Err(e) = self.store.save(&round).await {
                *round = snapshot;
                return Err(e);
            }
            return Ok(());
        }
        if self.settings.decoys_enabled && real < self.settings.min_real_players {
            let mut rng = ChaCha20Rng::from_entropy();
            let count =
                participant::decoy_count(&mut rng, self.settings.decoy_min, self.settings.decoy_max);
            let injected = round.roster.inject_decoys(count);
            // Decoy stakes are house-funded; they fatten the pool but are
            // never debited from a real account.
            for _ in &injected {
                round.ledger.add_stake(self.settings.stake);
            }
            if !injected.is_empty() {
                audit::log_decoys_injected(injected.len(), round.ledger.pool());
            }
        }

        let next_draw_at = now + (self.settings.draw_interval_secs as i64) * 1000;
        if let Err(e) = round.start_running(next_draw_at) {
            *round = snapshot;
            return Err(e);
        }
        if let Err(e) = self.store.save(&round).await {
            *round = snapshot;
            return Err(e);
        }

        let chat_id = round.chat_id.unwrap_or(0);
        let participant_count = round.roster.len();
        let pool = round.ledger.pool();
        self.announce(
            self.notifier
                .announce_round_start(chat_id, participant_count, pool),
        )
        .await;
        Ok(())
    }

    async fn draw_if_due(&self, now: i64) -> GameResult<()> {
        let mut round = self.round.write().await;
        if round.state != GameState::Running {
            return Ok(());
        }
        let Some(due) = round.next_draw_at else {
            return Ok(());
        };
        if now < due {
            return Ok(());
        }

        let remaining = round.called.remaining();
        if remaining.is_empty() {
            let chat_id = round.chat_id.unwrap_or(0);
            audit::log_no_winner(round.called.len(), round.ledger.pool());
            round.reset_to_idle();
            self.store.save(&round).await?;
            self.announce(self.notifier.announce_no_winner(chat_id)).await;
            return Ok(());
        }

        let mut rng = ChaCha20Rng::from_entropy();
        let number = self.pick_number(&round, &remaining, &mut rng);

        // Persist before announcing: the in-memory call is reverted on a
        // failed save so the next tick retries the same draw slot.
        let prev_last_call = round.last_call;
        let prev_next_draw_at = round.next_draw_at;
        round.called.push(number)?;
        round.last_call = Some(number);
        round.next_draw_at = Some(now + (self.settings.draw_interval_secs as i64) * 1000);

        if let Err(e) = self.store.save(&round).await {
            round.called.revert_last();
            round.last_call = prev_last_call;
            round.next_draw_at = prev_next_draw_at;
            return Err(e);
        }

        let chat_id = round.chat_id.unwrap_or(0);
        let count = round.called.len();
        audit::log_draw(number, &call_label(number), count);
        self.announce(
            self.notifier
                .announce_draw(chat_id, &call_label(number), count),
        )
        .await;

        if let Some(winner_idx) = self.find_winner(&round) {
            self.resolve_win(&mut round, winner_idx).await?;
        }
        Ok(())
    }

    /// Pick the next number, applying the win-delay policy when enabled:
    /// a candidate that would complete a real participant's card is
    /// re-rolled, a bounded number of times, while decoys are in the round.
    fn pick_number(
        &self,
        round: &crate::game::Round,
        remaining: &[u8],
        rng: &mut ChaCha20Rng,
    ) -> u8 {
        let mut number = *remaining.choose(rng).unwrap_or(&remaining[0]);
        if self.settings.win_delay_rerolls == 0 || !round.roster.has_decoys() {
            return number;
        }

        let called = round.called.as_set();
        let mut rerolls = 0;
        while rerolls < self.settings.win_delay_rerolls
            && round
                .roster
                .participants()
                .iter()
                .any(|p| !p.is_decoy && win::would_complete(&p.card, &called, number))
        {
            rerolls += 1;
            number = *remaining.choose(rng).unwrap_or(&number);
        }
        if rerolls > 0 {
            audit::log_win_delayed(number, rerolls);
        }
        number
    }

    /// First completed card in join order. Decoys are always auto-evaluated;
    /// humans only in auto mode. In explicit mode a completed human card is
    /// logged so a stalled claim is visible.
    fn find_winner(&self, round: &crate::game::Round) -> Option<usize> {
        let called = round.called.as_set();
        for (idx, p) in round.roster.participants().iter().enumerate() {
            if !win::has_win(&p.card, &called) {
                continue;
            }
            if p.is_decoy || self.settings.claim_mode == ClaimMode::Auto {
                return Some(idx);
            }
            audit::log_unclaimed_win(&p.user_id, &p.username, round.called.len());
        }
        None
    }
}
