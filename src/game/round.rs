use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::constants::MAX_NUMBER;
use super::error::{GameError, GameResult};
use super::ledger::RoundLedger;
use super::participant::Roster;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameState {
    Idle,    // No round open
    Lobby,   // Collecting joiners until the lobby deadline
    Running, // Drawing numbers
    Paused,  // Draw ticker suspended
}

impl GameState {
    /// Returns the set of states this state can transition to.
    pub fn valid_transitions(&self) -> &[GameState] {
        match self {
            GameState::Idle => &[GameState::Lobby],
            GameState::Lobby => &[GameState::Running, GameState::Idle],
            GameState::Running => &[GameState::Paused, GameState::Idle],
            GameState::Paused => &[GameState::Running, GameState::Idle],
        }
    }

    /// Attempt a transition. Returns an error if the transition is invalid.
    pub fn transition_to(&self, target: GameState) -> GameResult<GameState> {
        if self.valid_transitions().contains(&target) {
            Ok(target)
        } else {
            tracing::error!(
                "Invalid state transition: {:?} -> {:?} (valid: {:?})",
                self,
                target,
                self.valid_transitions()
            );
            Err(GameError::InvalidStateTransition {
                from: format!("{:?}", self),
                to: format!("{:?}", target),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Idle => "IDLE",
            GameState::Lobby => "LOBBY",
            GameState::Running => "RUNNING",
            GameState::Paused => "PAUSED",
        }
    }

    pub fn parse(s: &str) -> Option<GameState> {
        match s {
            "IDLE" => Some(GameState::Idle),
            "LOBBY" => Some(GameState::Lobby),
            "RUNNING" => Some(GameState::Running),
            "PAUSED" => Some(GameState::Paused),
            _ => None,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only ordered sequence of called numbers, duplicate-free and
/// bounded to 1..=75. Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalledNumbers {
    numbers: Vec<u8>,
}

impl CalledNumbers {
    pub fn new() -> Self {
        Self {
            numbers: Vec::new(),
        }
    }

    pub fn push(&mut self, number: u8) -> GameResult<()> {
        if self.numbers.contains(&number) {
            return Err(GameError::NumberAlreadyCalled { number });
        }
        self.numbers.push(number);
        Ok(())
    }

    /// Undo the most recent call. Used when a draw fails to persist.
    pub fn revert_last(&mut self) -> Option<u8> {
        self.numbers.pop()
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }

    pub fn last(&self) -> Option<u8> {
        self.numbers.last().copied()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.numbers
    }

    pub fn as_set(&self) -> HashSet<u8> {
        self.numbers.iter().copied().collect()
    }

    /// Draw pool complement: all numbers not yet called, computed on demand.
    pub fn remaining(&self) -> Vec<u8> {
        (1..=MAX_NUMBER)
            .filter(|n| !self.numbers.contains(n))
            .collect()
    }

    pub fn clear(&mut self) {
        self.numbers.clear();
    }
}

/// The single global round. All mutation goes through the engine, which
/// serializes access behind one lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub state: GameState,
    /// Target channel for announcements.
    pub chat_id: Option<i64>,
    pub called: CalledNumbers,
    pub ledger: RoundLedger,
    pub roster: Roster,
    /// Absolute lobby deadline (unix ms). Absolute so a restart re-arms the
    /// same deadline instead of restarting the countdown.
    pub lobby_deadline: Option<i64>,
    /// Absolute time of the next draw (unix ms).
    pub next_draw_at: Option<i64>,
    /// Most recent call, re-announced as a catch-up message after resume.
    pub last_call: Option<u8>,
}

impl Round {
    pub fn new() -> Self {
        Self {
            state: GameState::Idle,
            chat_id: None,
            called: CalledNumbers::new(),
            ledger: RoundLedger::new(),
            roster: Roster::new(),
            lobby_deadline: None,
            next_draw_at: None,
            last_call: None,
        }
    }

    /// IDLE -> LOBBY on first join.
    pub fn begin_lobby(&mut self, chat_id: i64, deadline_ms: i64) -> GameResult<()> {
        self.state = self.state.transition_to(GameState::Lobby)?;
        self.chat_id = Some(chat_id);
        self.called.clear();
        self.ledger.reset();
        self.lobby_deadline = Some(deadline_ms);
        self.next_draw_at = None;
        self.last_call = None;
        Ok(())
    }

    /// LOBBY -> RUNNING once the lobby deadline is reached.
    pub fn start_running(&mut self, next_draw_at: i64) -> GameResult<()> {
        self.state = self.state.transition_to(GameState::Running)?;
        self.lobby_deadline = None;
        self.next_draw_at = Some(next_draw_at);
        Ok(())
    }

    /// RUNNING -> PAUSED: suspend the draw ticker.
    pub fn pause(&mut self) -> GameResult<()> {
        self.state = self.state.transition_to(GameState::Paused)?;
        self.next_draw_at = None;
        Ok(())
    }

    /// PAUSED -> RUNNING: re-arm the ticker from now.
    pub fn resume(&mut self, next_draw_at: i64) -> GameResult<()> {
        self.state = self.state.transition_to(GameState::Running)?;
        self.next_draw_at = Some(next_draw_at);
        Ok(())
    }

    /// Reset to IDLE from any state, discarding participants, pool and the
    /// called sequence. Used by round end and by admin reset.
    pub fn reset_to_idle(&mut self) {
        self.state = GameState::Idle;
        self.chat_id = None;
        self.called.clear();
        self.ledger.reset();
        self.roster.clear();
        self.lobby_deadline = None;
        self.next_draw_at = None;
        self.last_call = None;
    }
}

impl Default for Round {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        assert!(GameState::Idle.transition_to(GameState::Lobby).is_ok());
        assert!(GameState::Lobby.transition_to(GameState::Running).is_ok());
        assert!(GameState::Lobby.transition_to(GameState::Idle).is_ok());
        assert!(GameState::Running.transition_to(GameState::Paused).is_ok());
        assert!(GameState::Running.transition_to(GameState::Idle).is_ok());
        assert!(GameState::Paused.transition_to(GameState::Running).is_ok());

        assert!(GameState::Idle.transition_to(GameState::Running).is_err());
        assert!(GameState::Lobby.transition_to(GameState::Paused).is_err());
        assert!(GameState::Paused.transition_to(GameState::Lobby).is_err());
    }

    #[test]
    fn test_state_round_trips_through_strings() {
        for state in [
            GameState::Idle,
            GameState::Lobby,
            GameState::Running,
            GameState::Paused,
        ] {
            assert_eq!(GameState::parse(state.as_str()), Some(state));
        }
        assert_eq!(GameState::parse("NOPE"), None);
    }

    #[test]
    fn test_called_numbers_reject_duplicates() {
        let mut called = CalledNumbers::new();
        called.push(7).unwrap();
        let err = called.push(7).unwrap_err();
        assert_eq!(err, GameError::NumberAlreadyCalled { number: 7 });
        assert_eq!(called.len(), 1);
    }

    #[test]
    fn test_remaining_is_complement() {
        let mut called = CalledNumbers::new();
        assert_eq!(called.remaining().len(), 75);
        called.push(1).unwrap();
        called.push(75).unwrap();
        let remaining = called.remaining();
        assert_eq!(remaining.len(), 73);
        assert!(!remaining.contains(&1));
        assert!(!remaining.contains(&75));
    }

    #[test]
    fn test_revert_last_undoes_call() {
        let mut called = CalledNumbers::new();
        called.push(12).unwrap();
        called.push(34).unwrap();
        assert_eq!(called.revert_last(), Some(34));
        assert_eq!(called.last(), Some(12));
        assert!(called.push(34).is_ok());
    }

    #[test]
    fn test_lobby_lifecycle() {
        let mut round = Round::new();
        round.begin_lobby(42, 1000).unwrap();
        assert_eq!(round.state, GameState::Lobby);
        assert_eq!(round.chat_id, Some(42));
        assert_eq!(round.lobby_deadline, Some(1000));

        round.start_running(2000).unwrap();
        assert_eq!(round.state, GameState::Running);
        assert_eq!(round.lobby_deadline, None);
        assert_eq!(round.next_draw_at, Some(2000));

        round.pause().unwrap();
        assert_eq!(round.state, GameState::Paused);
        assert_eq!(round.next_draw_at, None);

        round.resume(3000).unwrap();
        assert_eq!(round.state, GameState::Running);

        round.reset_to_idle();
        assert_eq!(round.state, GameState::Idle);
        assert!(round.called.is_empty());
        assert_eq!(round.ledger.pool(), 0);
        assert!(round.roster.is_empty());
    }

    #[test]
    fn test_cannot_start_running_from_idle() {
        let mut round = Round::new();
        assert!(round.start_running(0).is_err());
        assert_eq!(round.state, GameState::Idle);
    }
}
