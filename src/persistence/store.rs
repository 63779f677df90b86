//! Bundled `SessionStore` implementations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{PersistenceError, SessionPayload, SessionStore, SubmitReceipt};
use crate::highscores::{HighScoreEntry, HighScores, LeaderboardEntry};
use crate::sim::GameMode;

/// All boards plus a running session counter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBook {
    pub boards: BTreeMap<GameMode, HighScores>,
    pub sessions_recorded: u64,
}

impl ScoreBook {
    /// Record a payload on its mode's board
    pub fn record(&mut self, payload: &SessionPayload) -> SubmitReceipt {
        self.sessions_recorded += 1;
        let session_id = format!("{}-{:06}", payload.game_mode.as_str(), self.sessions_recorded);

        let rank = self.boards.entry(payload.game_mode).or_default().add_score(HighScoreEntry {
            user_id: payload.user_id.clone(),
            username: payload.username.clone(),
            score: payload.score,
            level: payload.level,
            timestamp: payload.started_at_ms + payload.duration_ms,
        });

        SubmitReceipt { session_id, rank }
    }

    pub fn leaderboard(&self, mode: GameMode, limit: usize, offset: usize) -> Vec<LeaderboardEntry> {
        self.boards
            .get(&mode)
            .map(|board| board.page(limit, offset))
            .unwrap_or_default()
    }
}

fn check_payload(payload: &SessionPayload) -> Result<(), PersistenceError> {
    if payload.user_id.trim().is_empty() {
        return Err(PersistenceError::Rejected("missing user id".to_string()));
    }
    Ok(())
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub book: ScoreBook,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn submit_session(&mut self, payload: &SessionPayload) -> Result<SubmitReceipt, PersistenceError> {
        check_payload(payload)?;
        Ok(self.book.record(payload))
    }

    fn fetch_leaderboard(
        &self,
        mode: GameMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        Ok(self.book.leaderboard(mode, limit, offset))
    }
}

/// JSON file store (native only). Writes go to a temp file first and are
/// renamed over the previous save.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileStore {
    path: std::path::PathBuf,
    book: ScoreBook,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Open a store, starting empty when the file does not exist yet
    pub fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let book = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No score book at {}, starting fresh", path.display());
                ScoreBook::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, book })
    }

    pub fn book(&self) -> &ScoreBook {
        &self.book
    }

    fn write_book(&self, book: &ScoreBook) -> Result<(), PersistenceError> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(book)?)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SessionStore for FileStore {
    fn submit_session(&mut self, payload: &SessionPayload) -> Result<SubmitReceipt, PersistenceError> {
        check_payload(payload)?;
        // The in-memory book only changes once the file write has landed
        let mut book = self.book.clone();
        let receipt = book.record(payload);
        self.write_book(&book)?;
        self.book = book;
        Ok(receipt)
    }

    fn fetch_leaderboard(
        &self,
        mode: GameMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        Ok(self.book.leaderboard(mode, limit, offset))
    }
}

/// Session id that stays unique across page reloads: the run's start time
/// plus a hash of the submitting user
#[allow(dead_code)]
fn browser_session_id(payload: &SessionPayload) -> String {
    let user_hash = payload
        .user_id
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3));
    format!(
        "{}-{}-{:04x}",
        payload.game_mode.as_str(),
        payload.started_at_ms,
        user_hash & 0xffff
    )
}

/// LocalStorage-backed store (WASM only), one board per mode
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct BrowserStore;

#[cfg(target_arch = "wasm32")]
impl SessionStore for BrowserStore {
    fn submit_session(&mut self, payload: &SessionPayload) -> Result<SubmitReceipt, PersistenceError> {
        check_payload(payload)?;
        let mode = payload.game_mode.as_str();
        let mut board = HighScores::load(mode);
        let rank = board.add_score(HighScoreEntry {
            user_id: payload.user_id.clone(),
            username: payload.username.clone(),
            score: payload.score,
            level: payload.level,
            timestamp: payload.started_at_ms + payload.duration_ms,
        });
        if rank.is_some() {
            board.save(mode);
        }
        Ok(SubmitReceipt {
            session_id: browser_session_id(payload),
            rank,
        })
    }

    fn fetch_leaderboard(
        &self,
        mode: GameMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        Ok(HighScores::load(mode.as_str()).page(limit, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameSession;

    fn payload(user: &str, mode: GameMode, score: u64) -> SessionPayload {
        let mut session = GameSession::default();
        session.mode = mode;
        session.score = score;
        SessionPayload::from_session(&session, user, user)
    }

    #[test]
    fn test_memory_store_ranks_per_mode() {
        let mut store = MemoryStore::new();
        let r1 = store.submit_session(&payload("a", GameMode::Classic, 300)).unwrap();
        let r2 = store.submit_session(&payload("b", GameMode::Classic, 900)).unwrap();
        let r3 = store.submit_session(&payload("c", GameMode::Speed, 100)).unwrap();
        assert_eq!(r1.rank, Some(1));
        assert_eq!(r2.rank, Some(1));
        assert_eq!(r3.rank, Some(1));
        assert_ne!(r1.session_id, r2.session_id);

        let board = store.fetch_leaderboard(GameMode::Classic, 10, 0).unwrap();
        let users: Vec<&str> = board.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(users, vec!["b", "a"]);
        assert!(store.fetch_leaderboard(GameMode::Marathon, 10, 0).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_anonymous() {
        let mut store = MemoryStore::new();
        let err = store.submit_session(&payload("  ", GameMode::Classic, 10)).unwrap_err();
        assert!(matches!(err, PersistenceError::Rejected(_)));
        assert_eq!(store.book.sessions_recorded, 0);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("brain_flip_store_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scores.json");
        let _ = std::fs::remove_file(&path);

        {
            let mut store = FileStore::open(&path).unwrap();
            store.submit_session(&payload("a", GameMode::Marathon, 4200)).unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.book().sessions_recorded, 1);
        let board = store.fetch_leaderboard(GameMode::Marathon, 5, 0).unwrap();
        assert_eq!(board[0].score, 4200);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_write_leaves_book_untouched() {
        let dir = std::env::temp_dir().join(format!("brain_flip_blocked_{}", std::process::id()));
        let path = dir.join("scores.json");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let mut store = FileStore::open(&path).unwrap();
        // A directory at the target path makes the final rename fail
        std::fs::create_dir_all(&path).unwrap();

        let result = store.submit_session(&payload("a", GameMode::Classic, 500));
        assert!(matches!(result, Err(PersistenceError::Io(_))));
        assert_eq!(store.book().sessions_recorded, 0);
        assert!(store.fetch_leaderboard(GameMode::Classic, 10, 0).unwrap().is_empty());
        assert!(!path.with_extension("tmp").exists());

        // Once the path is writable again the same run goes through
        std::fs::remove_dir(&path).unwrap();
        let receipt = store.submit_session(&payload("a", GameMode::Classic, 500)).unwrap();
        assert_eq!(receipt.rank, Some(1));
        assert_eq!(store.book().sessions_recorded, 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_browser_session_ids_survive_reloads() {
        let mut first = GameSession::default();
        first.started_at_ms = 1_700_000_000_000;
        let mut second = first.clone();
        second.started_at_ms += 45_000;

        let a = browser_session_id(&SessionPayload::from_session(&first, "u-1", "Ada"));
        let b = browser_session_id(&SessionPayload::from_session(&second, "u-1", "Ada"));
        let c = browser_session_id(&SessionPayload::from_session(&first, "u-2", "Bob"));
        assert!(a.starts_with("classic-1700000000000-"));
        assert_ne!(a, b);
        assert_ne!(a, c);
        // Same run, same id, no matter how many times the page was loaded
        assert_eq!(a, browser_session_id(&SessionPayload::from_session(&first, "u-1", "Ada")));
    }

    #[test]
    fn test_file_store_reports_corruption() {
        let dir = std::env::temp_dir().join(format!("brain_flip_corrupt_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scores.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(PersistenceError::Corrupt(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
