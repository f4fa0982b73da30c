//! Join handling: stake debit, card assignment, lobby opening.

use serde::Serialize;

use super::GameEngine;
use crate::audit;
use crate::game::{current_timestamp_ms, Card, GameError, GameResult, GameState, Participant};

#[derive(Debug, Clone, Serialize)]
pub struct JoinOutcome {
    pub card: Card,
    pub card_number: Option<u32>,
    /// True when the identity was already in the round; no stake is charged.
    pub rejoined: bool,
    pub pool: i64,
    pub state: String,
}

impl GameEngine {
    /// Join the current round, opening a lobby when none is open.
    ///
    /// The stake is debited before any round mutation, and a failed persist
    /// rolls the round back and refunds the stake. Joining twice is
    /// idempotent and never charges twice.
    pub async fn join(
        &self,
        chat_id: i64,
        user_id: &str,
        username: &str,
        card_number: Option<u32>,
    ) -> GameResult<JoinOutcome> {
        let mut round = self.round.write().await;

        if let Some(existing) = round.roster.get(user_id) {
            return Ok(JoinOutcome {
                card: existing.card.clone(),
                card_number: existing.card_number,
                rejoined: true,
                pool: round.ledger.pool(),
                state: round.state.as_str().to_string(),
            });
        }

        match round.state {
            GameState::Idle | GameState::Lobby => {}
            GameState::Running if self.settings.allow_join_running => {}
            GameState::Running | GameState::Paused => return Err(GameError::RoundBusy),
        }

        if let Some(n) = card_number {
            if round.roster.card_number_taken(n) {
                return Err(GameError::CardTaken { card_number: n });
            }
        }

        // Debit first: a declined stake must leave the round untouched.
        self.balance.debit(user_id, self.settings.stake).await?;

        let snapshot = round.clone();
        let result = async {
            if round.state == GameState::Idle {
                let deadline =
                    current_timestamp_ms() + (self.settings.lobby_secs as i64) * 1000;
                round.begin_lobby(chat_id, deadline)?;
                tracing::info!("lobby opened, deadline in {}s", self.settings.lobby_secs);
            }

            let card = Card::generate();
            round.roster.register(Participant::human(
                user_id.to_string(),
                username.to_string(),
                card.clone(),
                card_number,
            ))?;
            round.ledger.add_stake(self.settings.stake);

            self.store.save(&round).await?;
            Ok(card)
        }
        .await;

        match result {
            Ok(card) => {
                audit::log_join(user_id, username, self.settings.stake, round.ledger.pool());
                Ok(JoinOutcome {
                    card,
                    card_number,
                    rejoined: false,
                    pool: round.ledger.pool(),
                    state: round.state.as_str().to_string(),
                })
            }
            Err(e) => {
                *round = snapshot;
                if let Err(refund_err) =
                    self.balance.credit(user_id, self.settings.stake).await
                {
                    tracing::error!(
                        "failed to refund stake for {} after join rollback: {}",
                        user_id,
                        refund_err
                    );
                } else {
                    audit::log_refund(user_id, self.settings.stake, "join rollback");
                }
                Err(e)
            }
        }
    }
}
