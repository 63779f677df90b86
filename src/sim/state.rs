//! Game session state and core types
//!
//! Everything a running game needs lives in `GameSession`; it is mutated only
//! by the transitions in `tick.rs`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::instruction::{Instruction, InstructionKind};
use super::scoring::{CelebrationLevel, Luck, ScoreBreakdown};
use crate::consts::*;
use crate::tuning::Tuning;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No game running
    #[default]
    Idle,
    /// Rounds are being played
    Active,
    /// Run ended (out of lives, rounds or time)
    Ended,
}

/// Game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Classic,
    /// Short rounds against a session clock
    Speed,
    /// Fixed number of rounds with extra lives
    Marathon,
}

/// Rules a mode imposes on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProfile {
    pub lives: u32,
    pub round_time_ms: u32,
    pub max_rounds: Option<u32>,
    pub session_time_limit_ms: Option<u64>,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Classic, GameMode::Speed, GameMode::Marathon];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Speed => "speed",
            GameMode::Marathon => "marathon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "speed" | "blitz" => Some(GameMode::Speed),
            "marathon" => Some(GameMode::Marathon),
            _ => None,
        }
    }

    pub fn profile(&self) -> ModeProfile {
        match self {
            GameMode::Classic => ModeProfile {
                lives: 3,
                round_time_ms: 3000,
                max_rounds: None,
                session_time_limit_ms: None,
            },
            GameMode::Speed => ModeProfile {
                lives: 3,
                round_time_ms: 2000,
                max_rounds: None,
                session_time_limit_ms: Some(60_000),
            },
            GameMode::Marathon => ModeProfile {
                lives: 5,
                round_time_ms: 4000,
                max_rounds: Some(50),
                session_time_limit_ms: None,
            },
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    OutOfLives,
    RoundLimit,
    TimeLimit,
}

/// Result of resolving one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub instruction_id: String,
    pub correct: bool,
    /// The round ran out of time rather than receiving a wrong answer
    pub timed_out: bool,
    /// Present only for correct answers
    pub breakdown: Option<ScoreBreakdown>,
    pub streak: u32,
    pub level: u32,
    pub leveled_up: bool,
    pub lives: u32,
    pub ended: Option<EndReason>,
}

/// Running reaction-time statistics (correct answers only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReactionStats {
    pub total_ms: u64,
    pub count: u32,
    pub fastest_ms: Option<u32>,
    /// Most recent first
    pub recent: VecDeque<u32>,
}

impl ReactionStats {
    pub fn record(&mut self, reaction_ms: u32) {
        self.total_ms += reaction_ms as u64;
        self.count += 1;
        self.fastest_ms = Some(self.fastest_ms.map_or(reaction_ms, |f| f.min(reaction_ms)));
        self.recent.push_front(reaction_ms);
        self.recent.truncate(REACTION_HISTORY_LEN);
    }

    pub fn average_ms(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total_ms as f64 / self.count as f64)
    }
}

/// Complete session state (serializable snapshot)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub phase: GamePhase,
    pub mode: GameMode,
    pub score: u64,
    pub level: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub lives: u32,
    pub mistakes: u32,
    pub rounds_played: u32,
    pub correct_answers: u32,
    /// Time left to answer the pending instruction
    pub time_remaining_ms: u32,
    /// Full time allotted to the current round
    pub round_time_limit_ms: u32,
    pub celebration: CelebrationLevel,
    /// Wall-clock start (ms since epoch, from the platform clock)
    pub started_at_ms: u64,
    /// Active play time accumulated through ticks
    pub elapsed_ms: u64,
    pub reactions: ReactionStats,
    pub jackpots: u32,
    pub pending: Option<Instruction>,
    /// Recent instruction kinds, oldest first
    pub history: VecDeque<InstructionKind>,
    pub last_breakdown: Option<ScoreBreakdown>,
    pub end_reason: Option<EndReason>,
    /// Balance in effect for this session
    #[serde(skip)]
    pub tuning: Tuning,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl GameSession {
    /// Create an idle session
    pub fn new(tuning: Tuning) -> Self {
        Self {
            phase: GamePhase::Idle,
            mode: GameMode::Classic,
            score: 0,
            level: 1,
            streak: 0,
            best_streak: 0,
            lives: 0,
            mistakes: 0,
            rounds_played: 0,
            correct_answers: 0,
            time_remaining_ms: 0,
            round_time_limit_ms: 0,
            celebration: CelebrationLevel::None,
            started_at_ms: 0,
            elapsed_ms: 0,
            reactions: ReactionStats::default(),
            jackpots: 0,
            pending: None,
            history: VecDeque::with_capacity(KIND_HISTORY_LEN),
            last_breakdown: None,
            end_reason: None,
            tuning,
        }
    }

    /// Zero all per-run counters, keeping mode and tuning
    pub fn clear_counters(&mut self) {
        let mode = self.mode;
        let tuning = std::mem::take(&mut self.tuning);
        *self = Self::new(tuning);
        self.mode = mode;
    }

    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Active
    }

    /// Remember an instruction kind for repeat avoidance
    pub fn push_history(&mut self, kind: InstructionKind) {
        self.history.push_back(kind);
        while self.history.len() > KIND_HISTORY_LEN {
            self.history.pop_front();
        }
    }

    /// Time limit for the current level in this mode
    pub fn current_round_limit(&self) -> u32 {
        self.tuning
            .progression
            .round_time_limit(self.mode.profile().round_time_ms, self.level)
    }

    pub fn accuracy(&self) -> f64 {
        if self.rounds_played == 0 {
            0.0
        } else {
            self.correct_answers as f64 / self.rounds_played as f64
        }
    }

    /// Whether any round this session hit the jackpot
    pub fn hit_jackpot(&self) -> bool {
        self.jackpots > 0
    }

    pub(crate) fn note_luck(&mut self, luck: Luck) {
        if luck == Luck::Jackpot {
            self.jackpots += 1;
        }
    }
}
