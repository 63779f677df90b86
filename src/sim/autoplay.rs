//! Idle/demo mode player
//!
//! Answers instructions with a configurable hit rate and reaction time so the
//! game can run unattended.

use rand::Rng;

use super::instruction::Instruction;

/// A simulated player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoPlayer {
    /// Probability of answering correctly
    pub accuracy: f64,
    pub mean_reaction_ms: u32,
    /// Reaction time spread (uniform +/-)
    pub jitter_ms: u32,
}

impl Default for AutoPlayer {
    fn default() -> Self {
        Self {
            accuracy: 0.9,
            mean_reaction_ms: 650,
            jitter_ms: 300,
        }
    }
}

/// What the auto player decided for one instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoAnswer {
    pub answer: String,
    pub reaction_ms: u32,
}

impl AutoPlayer {
    pub fn decide<R: Rng + ?Sized>(&self, instruction: &Instruction, rng: &mut R) -> AutoAnswer {
        let low = self.mean_reaction_ms.saturating_sub(self.jitter_ms).max(1);
        let high = self.mean_reaction_ms.saturating_add(self.jitter_ms).max(low);
        let reaction_ms = rng.random_range(low..=high);

        let wants_correct = rng.random_bool(self.accuracy.clamp(0.0, 1.0));
        let answer = if wants_correct {
            instruction.acceptable_answers.iter().next().cloned()
        } else if instruction.is_reversed {
            // Fall for the reverse rule and answer what is shown
            instruction.display.split(" + ").next().map(str::to_string)
        } else {
            let wrong: Vec<&str> = instruction
                .answer_pool()
                .into_iter()
                .filter(|a| !instruction.accepts(a))
                .collect();
            if wrong.is_empty() {
                None
            } else {
                Some(wrong[rng.random_range(0..wrong.len())].to_string())
            }
        };

        AutoAnswer {
            answer: answer.unwrap_or_else(|| instruction.display.clone()),
            reaction_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::instruction::{Direction, Instruction};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_perfect_player_always_correct() {
        let player = AutoPlayer { accuracy: 1.0, ..Default::default() };
        let inst = Instruction::direction(Direction::Left, true, 3, "DIR-1".into());
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            let decision = player.decide(&inst, &mut rng);
            assert_eq!(decision.answer, "RIGHT");
            assert!((350..=950).contains(&decision.reaction_ms));
        }
    }

    #[test]
    fn test_hopeless_player_always_wrong() {
        let player = AutoPlayer { accuracy: 0.0, mean_reaction_ms: 100, jitter_ms: 500 };
        let inst = Instruction::direction(Direction::Up, false, 1, "DIR-2".into());
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..50 {
            let decision = player.decide(&inst, &mut rng);
            assert!(!inst.accepts(&decision.answer));
            assert!(decision.reaction_ms >= 1);
        }
    }
}
