//! Brain Flip - a reaction game where some prompts must be answered in reverse
//!
//! Core modules:
//! - `sim`: Deterministic game core (instruction generation, scoring, session state machine)
//! - `game`: Session driver that ties the round timer to the session lifecycle
//! - `platform`: Browser/native platform abstraction (time, round timer)
//! - `persistence`: End-of-game session reporting and leaderboards
//! - `tuning`: Data-driven game balance

pub mod achievements;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use achievements::Achievement;
pub use game::Game;
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::{ConfigError, Tuning};

/// Game configuration constants
pub mod consts {
    /// Highest level a session can reach
    pub const MAX_LEVEL: u32 = 50;
    /// Round timer cadence (the timer callback fires this often)
    pub const TIMER_INTERVAL_MS: u32 = 100;
    /// Number of recent instruction kinds remembered for repeat avoidance
    pub const KIND_HISTORY_LEN: usize = 4;
    /// Number of recent reaction times kept for the HUD sparkline
    pub const REACTION_HISTORY_LEN: usize = 20;
}

/// Normalize a player answer for comparison (trimmed, uppercase)
#[inline]
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_ascii_uppercase()
}

/// Clamp a requested level into the playable range
#[inline]
pub fn clamp_level(level: u32) -> u32 {
    level.clamp(1, consts::MAX_LEVEL)
}
