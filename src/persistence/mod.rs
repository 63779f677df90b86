//! End-of-game persistence
//!
//! The core hands a `SessionPayload` to a `SessionStore` once a run ends.
//! Reporting is fire-and-forget: failures are logged and never touch the
//! in-memory session.

pub mod store;

pub use store::{MemoryStore, ScoreBook};
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(target_arch = "wasm32")]
pub use store::BrowserStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::achievements::{self, Achievement};
use crate::highscores::LeaderboardEntry;
use crate::sim::{GameMode, GameSession};

/// Errors a store can report
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("session rejected: {0}")]
    Rejected(String),

    #[error("store unavailable")]
    Unavailable,
}

/// Final stats of a run, as submitted to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user_id: String,
    pub username: String,
    pub game_mode: GameMode,
    pub score: u64,
    pub level: u32,
    /// Streak at the moment the game ended
    pub streak: u32,
    pub best_streak: u32,
    pub mistakes: u32,
    pub rounds_played: u32,
    pub reaction_time_avg_ms: Option<f64>,
    pub duration_ms: u64,
    pub started_at_ms: u64,
    pub achievements: Vec<Achievement>,
}

impl SessionPayload {
    /// Snapshot a finished session
    pub fn from_session(session: &GameSession, user_id: &str, username: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: username.to_string(),
            game_mode: session.mode,
            score: session.score,
            level: session.level,
            streak: session.streak,
            best_streak: session.best_streak,
            mistakes: session.mistakes,
            rounds_played: session.rounds_played,
            reaction_time_avg_ms: session.reactions.average_ms(),
            duration_ms: session.elapsed_ms,
            started_at_ms: session.started_at_ms,
            achievements: achievements::evaluate(session),
        }
    }
}

/// Store acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub session_id: String,
    /// Leaderboard rank if the score placed
    pub rank: Option<usize>,
}

/// Persistence collaborator (hosted database, local file, in-memory)
pub trait SessionStore {
    fn submit_session(&mut self, payload: &SessionPayload) -> Result<SubmitReceipt, PersistenceError>;

    fn fetch_leaderboard(
        &self,
        mode: GameMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LeaderboardEntry>, PersistenceError>;
}

/// Submit a payload, logging the outcome. Never fails.
pub fn report_session(store: &mut dyn SessionStore, payload: &SessionPayload) -> Option<SubmitReceipt> {
    match store.submit_session(payload) {
        Ok(receipt) => {
            log::info!(
                "Session {} saved (score {}, rank {:?})",
                receipt.session_id,
                payload.score,
                receipt.rank
            );
            Some(receipt)
        }
        Err(e) => {
            log::warn!("Failed to save session for {}: {}", payload.user_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn submit_session(&mut self, _: &SessionPayload) -> Result<SubmitReceipt, PersistenceError> {
            Err(PersistenceError::Unavailable)
        }

        fn fetch_leaderboard(&self, _: GameMode, _: usize, _: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
            Err(PersistenceError::Unavailable)
        }
    }

    #[test]
    fn test_report_swallows_errors() {
        let payload = SessionPayload::from_session(&GameSession::default(), "u1", "Ada");
        assert!(report_session(&mut BrokenStore, &payload).is_none());
    }

    #[test]
    fn test_payload_json_shape() {
        let mut session = GameSession::default();
        session.score = 1234;
        session.reactions.record(400);
        session.reactions.record(600);
        let payload = SessionPayload::from_session(&session, "u1", "Ada");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["gameMode"], "Classic");
        assert_eq!(json["score"], 1234);
        assert_eq!(json["reactionTimeAvgMs"], 500.0);
        assert_eq!(json["achievements"], serde_json::json!([]));
    }
}
