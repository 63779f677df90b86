//! End-of-game achievements
//!
//! Evaluated once from the final session snapshot and reported alongside the
//! session payload.

use serde::{Deserialize, Serialize};

use crate::sim::GameSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    /// First correct answer
    FirstSteps,
    /// Streak of 10
    HotStreak,
    /// Streak of 25
    Unstoppable,
    /// Reached level 5
    LevelFive,
    /// 10,000 points in one run
    HighRoller,
    /// Landed a jackpot roll
    LuckyBreak,
    /// 10+ rounds without a mistake
    Flawless,
    /// Sub-350ms average over 10+ correct answers
    Lightning,
}

impl Achievement {
    pub const ALL: [Achievement; 8] = [
        Achievement::FirstSteps,
        Achievement::HotStreak,
        Achievement::Unstoppable,
        Achievement::LevelFive,
        Achievement::HighRoller,
        Achievement::LuckyBreak,
        Achievement::Flawless,
        Achievement::Lightning,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstSteps => "First Steps",
            Achievement::HotStreak => "Hot Streak",
            Achievement::Unstoppable => "Unstoppable",
            Achievement::LevelFive => "Level Five",
            Achievement::HighRoller => "High Roller",
            Achievement::LuckyBreak => "Lucky Break",
            Achievement::Flawless => "Flawless",
            Achievement::Lightning => "Lightning Reflexes",
        }
    }

    fn unlocked_by(&self, session: &GameSession) -> bool {
        match self {
            Achievement::FirstSteps => session.correct_answers >= 1,
            Achievement::HotStreak => session.best_streak >= 10,
            Achievement::Unstoppable => session.best_streak >= 25,
            Achievement::LevelFive => session.level >= 5,
            Achievement::HighRoller => session.score >= 10_000,
            Achievement::LuckyBreak => session.hit_jackpot(),
            Achievement::Flawless => session.mistakes == 0 && session.rounds_played >= 10,
            Achievement::Lightning => {
                session.reactions.count >= 10
                    && session.reactions.average_ms().is_some_and(|avg| avg < 350.0)
            }
        }
    }
}

/// Every achievement the session earned
pub fn evaluate(session: &GameSession) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|a| a.unlocked_by(session))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session_earns_nothing() {
        assert!(evaluate(&GameSession::default()).is_empty());
    }

    #[test]
    fn test_streak_and_flawless() {
        let mut session = GameSession::default();
        session.correct_answers = 12;
        session.rounds_played = 12;
        session.best_streak = 12;
        session.level = 3;
        let got = evaluate(&session);
        assert_eq!(
            got,
            vec![Achievement::FirstSteps, Achievement::HotStreak, Achievement::Flawless]
        );
    }

    #[test]
    fn test_lightning_needs_volume() {
        let mut session = GameSession::default();
        for _ in 0..9 {
            session.reactions.record(200);
        }
        assert!(!evaluate(&session).contains(&Achievement::Lightning));
        session.reactions.record(200);
        assert!(evaluate(&session).contains(&Achievement::Lightning));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&Achievement::LuckyBreak).unwrap();
        assert_eq!(json, "\"lucky_break\"");
    }
}
