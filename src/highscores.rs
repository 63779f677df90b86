//! High score leaderboard
//!
//! One board per game mode, one best entry per player, persisted to
//! LocalStorage on the web.

use serde::{Deserialize, Serialize};

/// Maximum number of entries kept per board
pub const MAX_HIGH_SCORES: usize = 100;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub user_id: String,
    pub username: String,
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
}

/// Ranked view of an entry, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub score: u64,
    /// 1-indexed
    pub rank: usize,
    pub updated_at: u64,
}

/// High score leaderboard (sorted descending by score)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank `user_id` would reach with `score` (1-indexed). None when the
    /// score misses the board or doesn't beat that user's current entry.
    pub fn potential_rank(&self, user_id: &str, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        if self.entries.iter().any(|e| e.user_id == user_id && e.score >= score) {
            return None;
        }
        // The user's older entry is always below the insertion point
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a score, keeping only the player's best.
    /// Returns the player's rank (1-indexed) or None if the board didn't change.
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let rank = self.potential_rank(&entry.user_id, entry.score)?;
        self.entries.retain(|e| e.user_id != entry.user_id);
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// A ranked page of the board
    pub fn page(&self, limit: usize, offset: usize) -> Vec<LeaderboardEntry> {
        self.entries
            .iter()
            .enumerate()
            .skip(offset)
            .take(limit)
            .map(|(i, e)| LeaderboardEntry {
                user_id: e.user_id.clone(),
                username: e.username.clone(),
                score: e.score,
                rank: i + 1,
                updated_at: e.timestamp,
            })
            .collect()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// LocalStorage key for a mode's board (used only in wasm32)
    #[allow(dead_code)]
    fn storage_key(mode: &str) -> String {
        format!("brain_flip_highscores_{}", mode)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load(mode: &str) -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(&Self::storage_key(mode)) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} {} high scores", scores.entries.len(), mode);
                    return scores;
                }
            }
        }

        log::info!("No {} high scores found, starting fresh", mode);
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self, mode: &str) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(&Self::storage_key(mode), &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }
}

/// Format a timestamp as a relative date string
pub fn format_age(now_ms: u64, timestamp_ms: u64) -> String {
    let diff_mins = now_ms.saturating_sub(timestamp_ms) / 60_000;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    if diff_days >= 1 {
        if diff_days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", diff_days)
        }
    } else if diff_hours >= 1 {
        if diff_hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", diff_hours)
        }
    } else if diff_mins >= 1 {
        if diff_mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", diff_mins)
        }
    } else {
        "Just now".to_string()
    }
}
