//! Durable round storage.
//!
//! Every engine mutation is one `save` call; `save` writes the singleton
//! round row and the participant set in a single transaction, so a crash
//! leaves the durable record authoritative. Round ends that owe a prize go
//! through `save_with_payout`, which lands the pending payout in the same
//! transaction.

use sqlx::{Sqlite, SqlitePool, Transaction};

use super::models::{ParticipantRecord, PayoutRecord, RoundRecord};
use crate::game::{GameResult, GameState, Round};

#[derive(Clone)]
pub struct RoundStore {
    pool: SqlitePool,
}

impl RoundStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the persisted round. Returns `None` when no round has ever been
    /// opened (IDLE with no participants counts as absent for resume).
    pub async fn load(&self) -> GameResult<Option<Round>> {
        let record: Option<RoundRecord> =
            sqlx::query_as("SELECT * FROM active_round WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let participants: Vec<ParticipantRecord> =
            sqlx::query_as("SELECT * FROM participants ORDER BY join_seq")
                .fetch_all(&self.pool)
                .await?;

        let round = record.into_round(participants)?;
        if round.state == GameState::Idle && round.roster.is_empty() {
            return Ok(None);
        }
        Ok(Some(round))
    }

    /// Persist the full round state atomically.
    pub async fn save(&self, round: &Round) -> GameResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::write_round(&mut tx, round).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Persist the round state and a pending payout in one transaction: a
    /// payout can never exist without the round end that earned it, and a
    /// round end that owes a prize can never land without its payout row.
    pub async fn save_with_payout(&self, round: &Round, payout: &PayoutRecord) -> GameResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::write_round(&mut tx, round).await?;

        sqlx::query(
            "INSERT INTO payouts (id, user_id, username, amount, settled, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&payout.id)
        .bind(&payout.user_id)
        .bind(&payout.username)
        .bind(payout.amount)
        .bind(payout.settled)
        .bind(&payout.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Payouts written but not yet credited, oldest first.
    pub async fn unsettled_payouts(&self) -> GameResult<Vec<PayoutRecord>> {
        let payouts = sqlx::query_as("SELECT * FROM payouts WHERE settled = 0 ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(payouts)
    }

    pub async fn mark_payout_settled(&self, id: &str) -> GameResult<()> {
        sqlx::query("UPDATE payouts SET settled = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn write_round(tx: &mut Transaction<'_, Sqlite>, round: &Round) -> GameResult<()> {
        let record = RoundRecord::from_round(round)?;
        let participants: Vec<ParticipantRecord> = round
            .roster
            .participants()
            .iter()
            .enumerate()
            .map(|(seq, p)| ParticipantRecord::from_participant(p, seq as i64))
            .collect::<GameResult<_>>()?;

        sqlx::query(
            "UPDATE active_round
             SET state = ?, chat_id = ?, called_numbers = ?, pool = ?,
                 lobby_deadline = ?, next_draw_at = ?, last_call = ?
             WHERE id = 1",
        )
        .bind(&record.state)
        .bind(record.chat_id)
        .bind(&record.called_numbers)
        .bind(record.pool)
        .bind(record.lobby_deadline)
        .bind(record.next_draw_at)
        .bind(record.last_call)
        .execute(&mut **tx)
        .await?;

        // The roster is small and scoped to one round; rewrite it whole.
        sqlx::query("DELETE FROM participants")
            .execute(&mut **tx)
            .await?;

        for p in &participants {
            sqlx::query(
                "INSERT INTO participants
                 (user_id, username, card_layout, card_number, is_decoy, tapped, joined_at, join_seq)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&p.user_id)
            .bind(&p.username)
            .bind(&p.card_layout)
            .bind(p.card_number)
            .bind(p.is_decoy)
            .bind(&p.tapped)
            .bind(&p.joined_at)
            .bind(p.join_seq)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
