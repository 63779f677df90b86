//! Score and celebration policy
//!
//! Converts reaction time, streak and a luck roll into a point delta and a
//! celebration tier. The luck roll is supplied by the caller so the policy
//! stays deterministic.

use serde::{Deserialize, Serialize};

use crate::tuning::{ConfigError, check_chance};

/// Qualitative label for how good a round was (presentation only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum CelebrationLevel {
    #[default]
    None,
    Good,
    Great,
    Amazing,
    Legendary,
}

impl CelebrationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CelebrationLevel::None => "none",
            CelebrationLevel::Good => "good",
            CelebrationLevel::Great => "great",
            CelebrationLevel::Amazing => "amazing",
            CelebrationLevel::Legendary => "legendary",
        }
    }
}

/// Which luck bracket a roll landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Luck {
    #[default]
    Normal,
    Lucky,
    Jackpot,
}

/// Reaction time bracket: answers at or under `max_reaction_ms` earn `multiplier`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedTier {
    pub max_reaction_ms: u32,
    pub multiplier: f64,
}

/// Per-round score components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub speed_multiplier: f64,
    /// Flat points added for the running streak
    pub streak_bonus: u32,
    pub lucky_multiplier: f64,
    pub luck: Luck,
    /// Points actually added to the score
    pub total: u64,
    pub celebration: CelebrationLevel,
}

/// Tunable scoring constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub base_points: u32,
    /// Sorted by ascending `max_reaction_ms`; first match wins
    pub speed_tiers: Vec<SpeedTier>,
    pub streak_bonus_per_step: u32,
    /// Streak length after which the bonus stops growing
    pub streak_cap: u32,
    pub lucky_chance: f64,
    pub lucky_multiplier: f64,
    pub jackpot_chance: f64,
    pub jackpot_multiplier: f64,
    /// Minimum total/base ratio for good, great, amazing, legendary
    pub celebration_cutoffs: [f64; 4],
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base_points: 100,
            speed_tiers: vec![
                SpeedTier { max_reaction_ms: 300, multiplier: 3.0 },
                SpeedTier { max_reaction_ms: 500, multiplier: 2.0 },
                SpeedTier { max_reaction_ms: 800, multiplier: 1.5 },
                SpeedTier { max_reaction_ms: 1200, multiplier: 1.2 },
            ],
            streak_bonus_per_step: 10,
            streak_cap: 20,
            lucky_chance: 0.05,
            lucky_multiplier: 2.0,
            jackpot_chance: 0.01,
            jackpot_multiplier: 5.0,
            celebration_cutoffs: [1.5, 2.5, 4.0, 6.0],
        }
    }
}

impl ScoringPolicy {
    pub fn speed_multiplier(&self, reaction_ms: u32) -> f64 {
        self.speed_tiers
            .iter()
            .find(|tier| reaction_ms <= tier.max_reaction_ms)
            .map(|tier| tier.multiplier)
            .unwrap_or(1.0)
    }

    pub fn streak_bonus(&self, streak: u32) -> u32 {
        streak.min(self.streak_cap).saturating_mul(self.streak_bonus_per_step)
    }

    /// Classify a roll in [0, 1)
    pub fn luck_for(&self, roll: f64) -> (Luck, f64) {
        if roll < self.jackpot_chance {
            (Luck::Jackpot, self.jackpot_multiplier)
        } else if roll < self.lucky_chance {
            (Luck::Lucky, self.lucky_multiplier)
        } else {
            (Luck::Normal, 1.0)
        }
    }

    /// Tier for a total relative to the base
    pub fn celebration_for(&self, total: u64) -> CelebrationLevel {
        let ratio = total as f64 / self.base_points.max(1) as f64;
        let [good, great, amazing, legendary] = self.celebration_cutoffs;
        if ratio >= legendary {
            CelebrationLevel::Legendary
        } else if ratio >= amazing {
            CelebrationLevel::Amazing
        } else if ratio >= great {
            CelebrationLevel::Great
        } else if ratio >= good {
            CelebrationLevel::Good
        } else {
            CelebrationLevel::None
        }
    }

    /// Score a correct answer. `streak` is the streak before this answer.
    pub fn score(&self, reaction_ms: u32, streak: u32, luck_roll: f64) -> ScoreBreakdown {
        let base = self.base_points;
        let speed_multiplier = self.speed_multiplier(reaction_ms);
        let streak_bonus = self.streak_bonus(streak);
        let (luck, lucky_multiplier) = self.luck_for(luck_roll);

        let raw = (base as f64 * speed_multiplier + streak_bonus as f64) * lucky_multiplier;
        let total = (raw.round().max(1.0)) as u64;

        ScoreBreakdown {
            base,
            speed_multiplier,
            streak_bonus,
            lucky_multiplier,
            luck,
            total,
            celebration: self.celebration_for(total),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_points == 0 {
            return Err(ConfigError::ZeroBasePoints);
        }
        if self
            .speed_tiers
            .windows(2)
            .any(|w| w[0].max_reaction_ms >= w[1].max_reaction_ms)
        {
            return Err(ConfigError::UnsortedSpeedTiers);
        }
        if self.celebration_cutoffs.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::UnsortedCelebrationCutoffs);
        }
        check_chance("lucky_chance", self.lucky_chance)?;
        check_chance("jackpot_chance", self.jackpot_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_LUCK: f64 = 0.99;

    #[test]
    fn test_speed_brackets() {
        let p = ScoringPolicy::default();
        assert_eq!(p.speed_multiplier(120), 3.0);
        assert_eq!(p.speed_multiplier(300), 3.0);
        assert_eq!(p.speed_multiplier(301), 2.0);
        assert_eq!(p.speed_multiplier(400), 2.0);
        assert_eq!(p.speed_multiplier(5000), 1.0);
    }

    #[test]
    fn test_streak_bonus_caps() {
        let p = ScoringPolicy::default();
        assert_eq!(p.streak_bonus(0), 0);
        assert_eq!(p.streak_bonus(3), 30);
        assert_eq!(p.streak_bonus(500), 200);
    }

    #[test]
    fn test_first_answer_at_400ms_is_good() {
        let p = ScoringPolicy::default();
        let b = p.score(400, 0, NO_LUCK);
        assert_eq!(b.total, 200);
        assert_eq!(b.luck, Luck::Normal);
        assert_eq!(b.celebration, CelebrationLevel::Good);
    }

    #[test]
    fn test_slow_answer_still_scores() {
        let p = ScoringPolicy::default();
        let b = p.score(10_000, 0, NO_LUCK);
        assert_eq!(b.total, 100);
        assert_eq!(b.celebration, CelebrationLevel::None);
    }

    #[test]
    fn test_luck_is_multiplicative() {
        let p = ScoringPolicy::default();
        let plain = p.score(250, 5, NO_LUCK);
        let lucky = p.score(250, 5, 0.03);
        let jackpot = p.score(250, 5, 0.001);
        assert_eq!(lucky.luck, Luck::Lucky);
        assert_eq!(lucky.total, plain.total * 2);
        assert_eq!(jackpot.luck, Luck::Jackpot);
        assert_eq!(jackpot.total, plain.total * 5);
        assert_eq!(jackpot.celebration, CelebrationLevel::Legendary);
    }

    #[test]
    fn test_tiers_escalate() {
        let p = ScoringPolicy::default();
        let tiers: Vec<_> = [100u64, 150, 250, 400, 600]
            .iter()
            .map(|t| p.celebration_for(*t))
            .collect();
        assert_eq!(
            tiers,
            vec![
                CelebrationLevel::None,
                CelebrationLevel::Good,
                CelebrationLevel::Great,
                CelebrationLevel::Amazing,
                CelebrationLevel::Legendary,
            ]
        );
    }

    #[test]
    fn test_validate_rejects_unsorted_tiers() {
        let mut p = ScoringPolicy::default();
        p.speed_tiers.swap(0, 1);
        assert!(matches!(p.validate(), Err(ConfigError::UnsortedSpeedTiers)));

        let mut p = ScoringPolicy::default();
        p.celebration_cutoffs = [2.0, 1.0, 4.0, 6.0];
        assert!(matches!(p.validate(), Err(ConfigError::UnsortedCelebrationCutoffs)));
    }
}
