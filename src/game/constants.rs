//! Game-related constants and default configuration values
//!
//! Centralizing these values makes it easier to:
//! - Adjust for testing
//! - Support future customization per-channel

/// Card grid dimension (5x5)
pub const BOARD_SIZE: usize = 5;

/// Sentinel value for the free centre cell
pub const FREE_CELL: u8 = 0;

/// Highest drawable number
pub const MAX_NUMBER: u8 = 75;

/// Inclusive number band for each column (B, I, N, G, O)
pub const BANDS: [(u8, u8); 5] = [(1, 15), (16, 30), (31, 45), (46, 60), (61, 75)];

/// Column letters in band order
pub const BAND_LETTERS: [char; 5] = ['B', 'I', 'N', 'G', 'O'];

/// Default lobby countdown before a round starts
pub const DEFAULT_LOBBY_SECS: u64 = 60;

/// Default interval between number draws
pub const DEFAULT_DRAW_INTERVAL_SECS: u64 = 5;

/// Default scheduler resolution for the background ticker
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 500;

/// Default stake debited per join (in smallest currency unit)
pub const DEFAULT_STAKE: i64 = 100;

/// Default commission rate taken from the pool at payout
pub const DEFAULT_COMMISSION_RATE: f64 = 0.10;

/// Default balance created for first-time joiners
pub const DEFAULT_STARTING_BALANCE: i64 = 10000;

/// Real-participant count below which decoys are injected
pub const DEFAULT_MIN_REAL_PLAYERS: usize = 3;

/// Default decoy injection count range (inclusive)
pub const DEFAULT_DECOY_MIN: usize = 2;
pub const DEFAULT_DECOY_MAX: usize = 5;

/// Default bound on announce calls before the engine stops waiting
pub const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 2000;

/// Broadcast channel capacity for game events
pub const BROADCAST_CHANNEL_CAPACITY: usize = 100;

/// Decoy display names to cycle through
pub const DECOY_NAMES: &[&str] = &[
    "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Hank", "Ivy", "Jack", "Karen",
    "Leo",
];
