use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::game::{
    participant::Participant, round::CalledNumbers, Card, GameError, GameResult, GameState, Round,
    RoundLedger, Roster,
};

/// Raw singleton round row. Field mapping mirrors the in-memory `Round`;
/// the called sequence and card layouts are stored as JSON text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoundRecord {
    pub id: i64,
    pub state: String,
    pub chat_id: Option<i64>,
    pub called_numbers: String,
    pub pool: i64,
    pub lobby_deadline: Option<i64>,
    pub next_draw_at: Option<i64>,
    pub last_call: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParticipantRecord {
    pub user_id: String,
    pub username: String,
    pub card_layout: String,
    pub card_number: Option<i64>,
    pub is_decoy: i64,
    pub tapped: String,
    pub joined_at: String,
    pub join_seq: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BalanceRecord {
    pub user_id: String,
    pub balance: i64,
    pub updated_at: String,
}

/// A prize owed to a winner. Written durably alongside the round end;
/// `settled` flips once the balance credit has landed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PayoutRecord {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub amount: i64,
    pub settled: i64,
    pub created_at: String,
}

impl PayoutRecord {
    pub fn new(user_id: &str, username: &str, amount: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            username: username.to_string(),
            amount,
            settled: 0,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

impl RoundRecord {
    pub fn from_round(round: &Round) -> GameResult<Self> {
        let called_numbers = serde_json::to_string(&round.called)
            .map_err(|e| GameError::Persistence(e.to_string()))?;
        Ok(Self {
            id: 1,
            state: round.state.as_str().to_string(),
            chat_id: round.chat_id,
            called_numbers,
            pool: round.ledger.pool(),
            lobby_deadline: round.lobby_deadline,
            next_draw_at: round.next_draw_at,
            last_call: round.last_call.map(i64::from),
        })
    }

    pub fn into_round(self, participants: Vec<ParticipantRecord>) -> GameResult<Round> {
        let state = GameState::parse(&self.state).ok_or_else(|| {
            GameError::Persistence(format!("unknown game state: {}", self.state))
        })?;
        let called: CalledNumbers = serde_json::from_str(&self.called_numbers)
            .map_err(|e| GameError::Persistence(e.to_string()))?;

        let mut roster_entries = Vec::with_capacity(participants.len());
        for record in participants {
            roster_entries.push(record.into_participant()?);
        }

        Ok(Round {
            state,
            chat_id: self.chat_id,
            called,
            ledger: RoundLedger::from_pool(self.pool),
            roster: Roster::from_participants(roster_entries),
            lobby_deadline: self.lobby_deadline,
            next_draw_at: self.next_draw_at,
            last_call: self.last_call.map(|n| n as u8),
        })
    }
}

impl ParticipantRecord {
    pub fn from_participant(participant: &Participant, join_seq: i64) -> GameResult<Self> {
        let card_layout = serde_json::to_string(&participant.card)
            .map_err(|e| GameError::Persistence(e.to_string()))?;
        let tapped = serde_json::to_string(&participant.tapped)
            .map_err(|e| GameError::Persistence(e.to_string()))?;
        Ok(Self {
            user_id: participant.user_id.clone(),
            username: participant.username.clone(),
            card_layout,
            card_number: participant.card_number.map(i64::from),
            is_decoy: i64::from(participant.is_decoy),
            tapped,
            joined_at: participant.joined_at.clone(),
            join_seq,
        })
    }

    pub fn into_participant(self) -> GameResult<Participant> {
        let card: Card = serde_json::from_str(&self.card_layout)
            .map_err(|e| GameError::Persistence(e.to_string()))?;
        let tapped: BTreeSet<u8> = serde_json::from_str(&self.tapped)
            .map_err(|e| GameError::Persistence(e.to_string()))?;
        Ok(Participant {
            user_id: self.user_id,
            username: self.username,
            card,
            card_number: self.card_number.map(|n| n as u32),
            is_decoy: self.is_decoy != 0,
            tapped,
            joined_at: self.joined_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::round::Round;

    #[test]
    fn test_round_record_round_trip() {
        let mut round = Round::new();
        round.begin_lobby(99, 123_456).unwrap();
        round
            .roster
            .register(Participant::human(
                "u1".to_string(),
                "User One".to_string(),
                Card::generate(),
                Some(3),
            ))
            .unwrap();
        round.ledger.add_stake(100);
        round.start_running(200_000).unwrap();
        round.called.push(7).unwrap();
        round.last_call = Some(7);

        let record = RoundRecord::from_round(&round).unwrap();
        let participant_records: Vec<ParticipantRecord> = round
            .roster
            .participants()
            .iter()
            .enumerate()
            .map(|(i, p)| ParticipantRecord::from_participant(p, i as i64).unwrap())
            .collect();

        let restored = record.into_round(participant_records).unwrap();
        assert_eq!(restored.state, GameState::Running);
        assert_eq!(restored.chat_id, Some(99));
        assert_eq!(restored.called.as_slice(), &[7]);
        assert_eq!(restored.ledger.pool(), 100);
        assert_eq!(restored.last_call, Some(7));
        assert_eq!(restored.roster.len(), 1);
        let p = restored.roster.get("u1").unwrap();
        assert_eq!(p.card_number, Some(3));
        assert_eq!(p.card, round.roster.get("u1").unwrap().card);
    }

    #[test]
    fn test_unknown_state_is_a_persistence_error() {
        let record = RoundRecord {
            id: 1,
            state: "BOGUS".to_string(),
            chat_id: None,
            called_numbers: "[]".to_string(),
            pool: 0,
            lobby_deadline: None,
            next_draw_at: None,
            last_call: None,
        };
        assert!(matches!(
            record.into_round(vec![]),
            Err(GameError::Persistence(_))
        ));
    }
}
