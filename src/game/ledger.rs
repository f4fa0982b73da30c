use serde::{Deserialize, Serialize};

/// Pool accumulation and commission split for one round.
///
/// The pool only grows while a round is open and is zeroed at round end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundLedger {
    pool: i64,
}

impl RoundLedger {
    pub fn new() -> Self {
        Self { pool: 0 }
    }

    pub fn from_pool(pool: i64) -> Self {
        Self { pool }
    }

    /// Add one stake to the pool. Ignores non-positive amounts so the
    /// `pool >= 0` invariant cannot be broken from outside.
    pub fn add_stake(&mut self, amount: i64) {
        if amount > 0 {
            self.pool += amount;
        }
    }

    pub fn pool(&self) -> i64 {
        self.pool
    }

    /// Winner's prize: the pool minus the commission cut.
    pub fn compute_prize(&self, commission_rate: f64) -> i64 {
        (self.pool as f64 * (1.0 - commission_rate)) as i64
    }

    pub fn reset(&mut self) {
        self.pool = 0;
    }
}
