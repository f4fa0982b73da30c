//! Tapping and explicit win claims.

use serde::Serialize;

use super::GameEngine;
use crate::config::ClaimMode;
use crate::game::{win, GameError, GameResult, GameState};

#[derive(Debug, Clone, Serialize)]
pub struct TapOutcome {
    pub number: u8,
    /// Whether the tapped number has actually been called. A premature tap
    /// is stored but never counts toward a claim until the number is drawn.
    pub counted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub prize: i64,
}

impl GameEngine {
    /// Mark a number on the caller's card. Tapping is persisted so a claim
    /// survives a restart.
    pub async fn tap(&self, user_id: &str, number: u8) -> GameResult<TapOutcome> {
        let mut round = self.round.write().await;

        if !matches!(round.state, GameState::Running | GameState::Paused) {
            return Err(GameError::InvalidClaim {
                reason: "no round in progress".to_string(),
            });
        }

        let counted = round.called.contains(number);
        let participant = round.roster.get_mut(user_id).ok_or(GameError::NotJoined)?;
        if !participant.card.contains(number) {
            return Err(GameError::NumberNotOnCard { number });
        }
        let newly_tapped = participant.tapped.insert(number);

        if newly_tapped {
            self.store.save(&round).await?;
        }
        Ok(TapOutcome { number, counted })
    }

    /// Claim a win on the caller's card.
    ///
    /// In auto mode the claim just re-checks the called set; in explicit
    /// mode a cell only counts if it was both called and tapped.
    pub async fn claim(&self, user_id: &str) -> GameResult<ClaimOutcome> {
        let mut round = self.round.write().await;

        if round.state != GameState::Running {
            return Err(GameError::InvalidClaim {
                reason: "no round in progress".to_string(),
            });
        }

        let called = round.called.as_set();
        let (idx, participant) = round
            .roster
            .participants()
            .iter()
            .enumerate()
            .find(|(_, p)| p.user_id == user_id)
            .ok_or(GameError::NotJoined)?;

        let valid = match self.settings.claim_mode {
            ClaimMode::Auto => win::has_win(&participant.card, &called),
            ClaimMode::Explicit => {
                win::has_claimed_win(&participant.card, &called, &participant.tapped)
            }
        };
        if !valid {
            return Err(GameError::InvalidClaim {
                reason: "card does not have a completed line".to_string(),
            });
        }

        let prize = self.resolve_win(&mut round, idx).await?;
        Ok(ClaimOutcome { prize })
    }
}
