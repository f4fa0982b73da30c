use std::env;

use crate::game::constants::{
    DEFAULT_COMMISSION_RATE, DEFAULT_DECOY_MAX, DEFAULT_DECOY_MIN, DEFAULT_DRAW_INTERVAL_SECS,
    DEFAULT_LOBBY_SECS, DEFAULT_MIN_REAL_PLAYERS, DEFAULT_NOTIFY_TIMEOUT_MS, DEFAULT_STAKE,
    DEFAULT_STARTING_BALANCE, DEFAULT_TICK_INTERVAL_MS,
};

/// How human wins are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimMode {
    /// Humans are auto-paid the moment their card completes a line.
    Auto,
    /// Humans must tap their numbers and claim explicitly; the engine only
    /// logs completed-but-unclaimed cards.
    Explicit,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub tick_interval_ms: u64,
    pub game: GameSettings,
}

/// Engine tunables. Everything policy-shaped is explicit and toggleable
/// here rather than buried in draw logic.
#[derive(Clone, Debug)]
pub struct GameSettings {
    /// Fixed cost debited per join, smallest currency unit.
    pub stake: i64,
    /// Fraction of the pool withheld at payout.
    pub commission_rate: f64,
    pub lobby_secs: u64,
    pub draw_interval_secs: u64,
    /// Below this many real joiners at the lobby deadline, decoys go in.
    pub min_real_players: usize,
    pub decoys_enabled: bool,
    pub decoy_min: usize,
    pub decoy_max: usize,
    /// Win-delay draw policy: re-roll up to this many times when a candidate
    /// would immediately complete a real participant's card while decoys
    /// exist. 0 disables the policy.
    pub win_delay_rerolls: u32,
    pub claim_mode: ClaimMode,
    pub allow_join_running: bool,
    pub notify_timeout_ms: u64,
    pub starting_balance: i64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            stake: DEFAULT_STAKE,
            commission_rate: DEFAULT_COMMISSION_RATE,
            lobby_secs: DEFAULT_LOBBY_SECS,
            draw_interval_secs: DEFAULT_DRAW_INTERVAL_SECS,
            min_real_players: DEFAULT_MIN_REAL_PLAYERS,
            decoys_enabled: true,
            decoy_min: DEFAULT_DECOY_MIN,
            decoy_max: DEFAULT_DECOY_MAX,
            win_delay_rerolls: 0,
            claim_mode: ClaimMode::Auto,
            allow_join_running: false,
            notify_timeout_ms: DEFAULT_NOTIFY_TIMEOUT_MS,
            starting_balance: DEFAULT_STARTING_BALANCE,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = GameSettings::default();

        let claim_mode = match env::var("BINGO_CLAIM_MODE").as_deref() {
            Ok("claim") | Ok("explicit") => ClaimMode::Explicit,
            Ok("auto") | Err(_) => ClaimMode::Auto,
            Ok(other) => {
                tracing::warn!("Unknown BINGO_CLAIM_MODE '{}', using auto", other);
                ClaimMode::Auto
            }
        };

        let game = GameSettings {
            stake: env_parse("BINGO_STAKE", defaults.stake),
            commission_rate: env_parse("BINGO_COMMISSION_RATE", defaults.commission_rate),
            lobby_secs: env_parse("BINGO_LOBBY_SECS", defaults.lobby_secs),
            draw_interval_secs: env_parse("BINGO_DRAW_INTERVAL_SECS", defaults.draw_interval_secs),
            min_real_players: env_parse("BINGO_MIN_REAL_PLAYERS", defaults.min_real_players),
            decoys_enabled: env_bool("BINGO_DECOYS", defaults.decoys_enabled),
            decoy_min: env_parse("BINGO_DECOY_MIN", defaults.decoy_min),
            decoy_max: env_parse("BINGO_DECOY_MAX", defaults.decoy_max),
            win_delay_rerolls: env_parse("BINGO_WIN_DELAY_REROLLS", defaults.win_delay_rerolls),
            claim_mode,
            allow_join_running: env_bool("BINGO_ALLOW_JOIN_RUNNING", defaults.allow_join_running),
            notify_timeout_ms: env_parse("BINGO_NOTIFY_TIMEOUT_MS", defaults.notify_timeout_ms),
            starting_balance: env_parse("BINGO_STARTING_BALANCE", defaults.starting_balance),
        };

        if game.commission_rate < 0.0 || game.commission_rate >= 1.0 {
            tracing::warn!(
                "BINGO_COMMISSION_RATE {} out of [0, 1), falling back to default",
                game.commission_rate
            );
        }

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:bingo.db".to_string()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            tick_interval_ms: env_parse("BINGO_TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL_MS),
            game: if game.commission_rate < 0.0 || game.commission_rate >= 1.0 {
                GameSettings {
                    commission_rate: defaults.commission_rate,
                    ..game
                }
            } else {
                game
            },
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
