//! Balance accounting for stakes and prizes.
//!
//! The engine only sees the trait; the SQLite implementation keeps one row
//! per identity. A debit that would overdraw fails with `InsufficientFunds`
//! and leaves the row untouched.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::BalanceRecord;
use crate::game::{GameError, GameResult};

#[async_trait]
pub trait BalanceService: Send + Sync {
    /// Debit `amount` from the identity, failing without mutation when the
    /// balance does not cover it.
    async fn debit(&self, user_id: &str, amount: i64) -> GameResult<()>;

    /// Credit `amount` to the identity, creating the account if needed.
    async fn credit(&self, user_id: &str, amount: i64) -> GameResult<()>;

    async fn balance_of(&self, user_id: &str) -> GameResult<i64>;
}

pub struct SqliteBalanceService {
    pool: SqlitePool,
    /// Balance seeded for identities seen for the first time.
    starting_balance: i64,
}

impl SqliteBalanceService {
    pub fn new(pool: SqlitePool, starting_balance: i64) -> Self {
        Self {
            pool,
            starting_balance,
        }
    }

    async fn ensure_account(&self, user_id: &str) -> GameResult<()> {
        sqlx::query("INSERT OR IGNORE INTO balances (user_id, balance, updated_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(self.starting_balance)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BalanceService for SqliteBalanceService {
    async fn debit(&self, user_id: &str, amount: i64) -> GameResult<()> {
        self.ensure_account(user_id).await?;

        // Conditional update keeps check and debit atomic.
        let result = sqlx::query(
            "UPDATE balances SET balance = balance - ?, updated_at = ?
             WHERE user_id = ? AND balance >= ?",
        )
        .bind(amount)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let available = self.balance_of(user_id).await?;
            return Err(GameError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        Ok(())
    }

    async fn credit(&self, user_id: &str, amount: i64) -> GameResult<()> {
        self.ensure_account(user_id).await?;

        sqlx::query("UPDATE balances SET balance = balance + ?, updated_at = ? WHERE user_id = ?")
            .bind(amount)
            .bind(Utc::now().to_rfc3339())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn balance_of(&self, user_id: &str) -> GameResult<i64> {
        let record: Option<BalanceRecord> =
            sqlx::query_as("SELECT * FROM balances WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record.map(|r| r.balance).unwrap_or(0))
    }
}
