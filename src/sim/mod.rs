//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Randomness only through an injected, seeded RNG
//! - Time only through explicit tick durations
//! - No timer, storage or platform dependencies

pub mod autoplay;
pub mod instruction;
pub mod scoring;
pub mod state;
pub mod tick;

pub use autoplay::{AutoAnswer, AutoPlayer};
pub use instruction::{Action, Color, Direction, Instruction, InstructionKind, Token, generate_instruction, opposite_of};
pub use scoring::{CelebrationLevel, Luck, ScoreBreakdown, ScoringPolicy, SpeedTier};
pub use state::{EndReason, GameMode, GamePhase, GameSession, ModeProfile, ReactionStats, RoundOutcome};
pub use tick::{reset_game, start_game, submit_answer, tick};
