use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::card::Card;
use super::constants::DECOY_NAMES;
use super::error::{GameError, GameResult};

/// One entrant in the current round: a human or an injected decoy.
///
/// Participants live exactly as long as the round; the roster is cleared on
/// every reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub username: String,
    pub card: Card,
    /// Explicit card-choice value, where the variant allows picking one.
    pub card_number: Option<u32>,
    pub is_decoy: bool,
    /// Numbers the participant has explicitly tapped (explicit-claim mode).
    pub tapped: BTreeSet<u8>,
    pub joined_at: String,
}

impl Participant {
    pub fn human(user_id: String, username: String, card: Card, card_number: Option<u32>) -> Self {
        Self {
            user_id,
            username,
            card,
            card_number,
            is_decoy: false,
            tapped: BTreeSet::new(),
            joined_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn decoy(name_idx: usize, card: Card) -> Self {
        // UUID prevents collision across restarts
        let user_id = format!("decoy_{}", Uuid::new_v4());
        let base = DECOY_NAMES[name_idx % DECOY_NAMES.len()];
        Self {
            user_id,
            username: base.to_string(),
            card,
            card_number: None,
            is_decoy: true,
            tapped: BTreeSet::new(),
            joined_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Identity -> card roster for the current round. Vec order is join order,
/// which is also the stable win-resolution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self {
            participants: Vec::new(),
        }
    }

    pub fn from_participants(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    pub fn get_mut(&mut self, user_id: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Count of human (non-decoy) entrants.
    pub fn real_count(&self) -> usize {
        self.participants.iter().filter(|p| !p.is_decoy).count()
    }

    pub fn has_decoys(&self) -> bool {
        self.participants.iter().any(|p| p.is_decoy)
    }

    pub fn card_number_taken(&self, card_number: u32) -> bool {
        self.participants
            .iter()
            .any(|p| p.card_number == Some(card_number))
    }

    /// Register an entrant. At most one participant per identity and per
    /// explicit card-choice value.
    pub fn register(&mut self, participant: Participant) -> GameResult<()> {
        if self.get(&participant.user_id).is_some() {
            return Err(GameError::AlreadyJoined);
        }
        if let Some(n) = participant.card_number {
            if self.card_number_taken(n) {
                return Err(GameError::CardTaken { card_number: n });
            }
        }
        self.participants.push(participant);
        Ok(())
    }

    /// Inject `count` decoys, each with a fresh card. Returns the new decoys
    /// so the caller can add their stakes to the pool.
    pub fn inject_decoys(&mut self, count: usize) -> Vec<Participant> {
        let mut injected = Vec::with_capacity(count);
        let offset = self.participants.iter().filter(|p| p.is_decoy).count();
        for i in 0..count {
            let decoy = Participant::decoy(offset + i, Card::generate());
            self.participants.push(decoy.clone());
            injected.push(decoy);
        }
        injected
    }

    pub fn clear(&mut self) {
        self.participants.clear();
    }
}

/// Pick a decoy count uniformly from an inclusive range.
pub fn decoy_count<R: Rng>(rng: &mut R, min: usize, max: usize) -> usize {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn human(id: &str) -> Participant {
        Participant::human(id.to_string(), format!("user {}", id), Card::generate(), None)
    }

    #[test]
    fn test_register_rejects_duplicate_identity() {
        let mut roster = Roster::new();
        roster.register(human("u1")).unwrap();
        let err = roster.register(human("u1")).unwrap_err();
        assert_eq!(err, GameError::AlreadyJoined);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_register_rejects_taken_card_number() {
        let mut roster = Roster::new();
        let mut first = human("u1");
        first.card_number = Some(7);
        roster.register(first).unwrap();

        let mut second = human("u2");
        second.card_number = Some(7);
        let err = roster.register(second).unwrap_err();
        assert_eq!(err, GameError::CardTaken { card_number: 7 });
    }

    #[test]
    fn test_inject_decoys_counts_and_flags() {
        let mut roster = Roster::new();
        roster.register(human("u1")).unwrap();
        let injected = roster.inject_decoys(3);
        assert_eq!(injected.len(), 3);
        assert_eq!(roster.len(), 4);
        assert_eq!(roster.real_count(), 1);
        assert!(roster.has_decoys());
        assert!(injected.iter().all(|p| p.is_decoy));
        assert!(injected.iter().all(|p| p.user_id.starts_with("decoy_")));
    }

    #[test]
    fn test_join_order_is_preserved() {
        let mut roster = Roster::new();
        roster.register(human("a")).unwrap();
        roster.register(human("b")).unwrap();
        roster.inject_decoys(1);
        let ids: Vec<&str> = roster
            .participants()
            .iter()
            .map(|p| p.user_id.as_str())
            .collect();
        assert_eq!(&ids[..2], &["a", "b"]);
        assert!(ids[2].starts_with("decoy_"));
    }

    #[test]
    fn test_decoy_count_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for _ in 0..100 {
            let n = decoy_count(&mut rng, 2, 5);
            assert!((2..=5).contains(&n));
        }
        assert_eq!(decoy_count(&mut rng, 3, 3), 3);
    }

    #[test]
    fn test_clear_empties_roster() {
        let mut roster = Roster::new();
        roster.register(human("u1")).unwrap();
        roster.inject_decoys(2);
        roster.clear();
        assert!(roster.is_empty());
        assert_eq!(roster.real_count(), 0);
    }
}
