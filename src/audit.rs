//! Audit logging for money movement and round lifecycle.
//!
//! Everything that changes a balance or ends a round is logged here under
//! the `audit` target so it can be routed to its own sink.

pub fn log_join(user_id: &str, username: &str, stake: i64, pool: i64) {
    tracing::info!(
        target: "audit",
        user_id = %user_id,
        username = %username,
        stake = %stake,
        pool = %pool,
        "participant joined"
    );
}

pub fn log_decoys_injected(count: usize, pool: i64) {
    tracing::info!(
        target: "audit",
        count = %count,
        pool = %pool,
        "decoys injected at lobby close"
    );
}

pub fn log_draw(number: u8, label: &str, drawn_count: usize) {
    tracing::info!(
        target: "audit",
        number = %number,
        label = %label,
        drawn_count = %drawn_count,
        "number drawn"
    );
}

pub fn log_win_delayed(number: u8, rerolls: u32) {
    tracing::info!(
        target: "audit",
        number = %number,
        rerolls = %rerolls,
        "candidate re-rolled by win-delay policy"
    );
}

pub fn log_payout(user_id: &str, username: &str, pool: i64, prize: i64, is_decoy: bool) {
    tracing::info!(
        target: "audit",
        user_id = %user_id,
        username = %username,
        pool = %pool,
        prize = %prize,
        is_decoy = %is_decoy,
        "round won"
    );
}

pub fn log_payout_settled(user_id: &str, amount: i64) {
    tracing::info!(
        target: "audit",
        user_id = %user_id,
        amount = %amount,
        "pending payout settled"
    );
}

pub fn log_unclaimed_win(user_id: &str, username: &str, drawn_count: usize) {
    tracing::warn!(
        target: "audit",
        user_id = %user_id,
        username = %username,
        drawn_count = %drawn_count,
        "card complete but unclaimed"
    );
}

pub fn log_no_winner(drawn_count: usize, pool: i64) {
    tracing::info!(
        target: "audit",
        drawn_count = %drawn_count,
        pool = %pool,
        "round exhausted with no winner"
    );
}

pub fn log_refund(user_id: &str, amount: i64, reason: &str) {
    tracing::info!(
        target: "audit",
        user_id = %user_id,
        amount = %amount,
        reason = %reason,
        "stake refunded"
    );
}

pub fn log_reset(by: &str, previous_state: &str) {
    tracing::warn!(
        target: "audit",
        by = %by,
        previous_state = %previous_state,
        "round force-reset"
    );
}

pub fn log_resume(state: &str, participants: usize, drawn_count: usize) {
    tracing::info!(
        target: "audit",
        state = %state,
        participants = %participants,
        drawn_count = %drawn_count,
        "round restored from storage"
    );
}
