//! Data-driven game balance
//!
//! Every constant that shapes difficulty or scoring lives here so it can be
//! tweaked from JSON without touching the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::scoring::ScoringPolicy;

/// Errors raised while loading or validating tuning data
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Tuning JSON could not be parsed
    #[error("invalid tuning json: {0}")]
    Parse(#[from] serde_json::Error),

    /// A probability fell outside [0, 1]
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidChance { name: &'static str, value: f64 },

    /// Every always-available instruction kind has zero weight
    #[error("direction and color weights cannot both be zero")]
    NoInstructionKinds,

    /// Level progression needs at least one answer per level
    #[error("answers_per_level must be at least 1")]
    ZeroAnswersPerLevel,

    /// Scoring needs a positive base
    #[error("base_points must be at least 1")]
    ZeroBasePoints,

    /// Speed tier thresholds must be strictly ascending
    #[error("speed tiers must be sorted by ascending reaction time")]
    UnsortedSpeedTiers,

    /// Celebration cutoffs must be strictly ascending
    #[error("celebration cutoffs must be strictly ascending")]
    UnsortedCelebrationCutoffs,
}

/// Instruction generator balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Relative weight of direction prompts
    pub direction_weight: u32,
    /// Relative weight of color prompts
    pub color_weight: u32,
    /// Relative weight of action prompts (once unlocked)
    pub action_weight: u32,
    /// Relative weight of combo prompts (once unlocked)
    pub combo_weight: u32,
    /// First level that can produce action prompts
    pub action_min_level: u32,
    /// First level that can produce combo prompts
    pub combo_min_level: u32,
    /// Reverse chance at level 1
    pub reverse_base_chance: f64,
    /// Added reverse chance per level above 1
    pub reverse_chance_per_level: f64,
    /// Reverse chance ceiling
    pub reverse_max_chance: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            direction_weight: 4,
            color_weight: 3,
            action_weight: 2,
            combo_weight: 2,
            action_min_level: 2,
            combo_min_level: 5,
            reverse_base_chance: 0.2,
            reverse_chance_per_level: 0.03,
            reverse_max_chance: 0.6,
        }
    }
}

impl GeneratorConfig {
    /// Probability that an instruction at `level` is reversed
    pub fn reverse_chance(&self, level: u32) -> f64 {
        let steps = level.saturating_sub(1) as f64;
        (self.reverse_base_chance + self.reverse_chance_per_level * steps)
            .min(self.reverse_max_chance)
            .clamp(0.0, 1.0)
    }
}

/// Level and round-timer progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Correct answers needed per level
    pub answers_per_level: u32,
    /// Round time lost per level
    pub round_time_step_ms: u32,
    /// Round time floor
    pub min_round_ms: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            answers_per_level: 5,
            round_time_step_ms: 100,
            min_round_ms: 800,
        }
    }
}

impl ProgressionConfig {
    /// Level earned after `correct_answers` correct answers
    pub fn level_for(&self, correct_answers: u32) -> u32 {
        crate::clamp_level(1 + correct_answers / self.answers_per_level.max(1))
    }

    /// Time limit for a round at `level`, starting from the mode's base limit
    pub fn round_time_limit(&self, base_ms: u32, level: u32) -> u32 {
        let shrink = level.saturating_sub(1).saturating_mul(self.round_time_step_ms);
        base_ms.saturating_sub(shrink).max(self.min_round_ms)
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub generator: GeneratorConfig,
    pub scoring: ScoringPolicy,
    pub progression: ProgressionConfig,
}

impl Tuning {
    /// Parse and validate tuning JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject tables that would make the game behave inconsistently
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.generator;
        if g.direction_weight == 0 && g.color_weight == 0 {
            return Err(ConfigError::NoInstructionKinds);
        }
        for (name, value) in [
            ("reverse_base_chance", g.reverse_base_chance),
            ("reverse_chance_per_level", g.reverse_chance_per_level),
            ("reverse_max_chance", g.reverse_max_chance),
        ] {
            check_chance(name, value)?;
        }
        if self.progression.answers_per_level == 0 {
            return Err(ConfigError::ZeroAnswersPerLevel);
        }
        self.scoring.validate()
    }
}

pub(crate) fn check_chance(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidChance { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let tuning = Tuning::from_json(r#"{ "progression": { "answers_per_level": 3 } }"#).unwrap();
        assert_eq!(tuning.progression.answers_per_level, 3);
        assert_eq!(tuning.progression.min_round_ms, 800);
        assert_eq!(tuning.generator, GeneratorConfig::default());
    }

    #[test]
    fn test_rejects_bad_chance() {
        let err = Tuning::from_json(r#"{ "generator": { "reverse_max_chance": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChance { name: "reverse_max_chance", .. }));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(Tuning::from_json("not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_reverse_chance_caps() {
        let g = GeneratorConfig::default();
        assert!((g.reverse_chance(1) - 0.2).abs() < 1e-9);
        assert!((g.reverse_chance(2) - 0.23).abs() < 1e-9);
        assert!((g.reverse_chance(50) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_progression() {
        let p = ProgressionConfig::default();
        assert_eq!(p.level_for(0), 1);
        assert_eq!(p.level_for(4), 1);
        assert_eq!(p.level_for(5), 2);
        assert_eq!(p.level_for(100_000), crate::consts::MAX_LEVEL);
        assert_eq!(p.round_time_limit(3000, 1), 3000);
        assert_eq!(p.round_time_limit(3000, 3), 2800);
        assert_eq!(p.round_time_limit(3000, 40), 800);
    }
}
