//! Session transitions
//!
//! `idle → active → (round complete)* → ended`. Every transition outside its
//! valid phase is a silent no-op: the UI may race with resets and that is
//! not an error.

use rand::Rng;

use super::instruction::{Instruction, generate_instruction};
use super::state::{EndReason, GameMode, GamePhase, GameSession, RoundOutcome};

/// Start (or restart) a run in `mode`
pub fn start_game<R: Rng + ?Sized>(session: &mut GameSession, mode: GameMode, rng: &mut R, now_ms: u64) {
    session.mode = mode;
    session.clear_counters();

    session.lives = mode.profile().lives;
    session.started_at_ms = now_ms;
    session.phase = GamePhase::Active;
    next_round(session, rng);

    log::info!(
        "Game started: mode={}, lives={}, round_time={}ms",
        mode.as_str(),
        session.lives,
        session.round_time_limit_ms
    );
}

/// Answer the pending instruction.
///
/// Returns `None` without touching the session when no game is active or no
/// instruction is pending.
pub fn submit_answer<R: Rng + ?Sized>(
    session: &mut GameSession,
    answer: &str,
    reaction_ms: u32,
    rng: &mut R,
) -> Option<RoundOutcome> {
    if !session.is_active() {
        return None;
    }
    let instruction = session.pending.take()?;
    let correct = instruction.accepts(answer);
    Some(resolve_round(session, instruction, correct, false, reaction_ms, rng))
}

/// Advance the round clock by `elapsed_ms`.
///
/// A round that runs out of time resolves as a timeout (counted as a wrong
/// answer) and its outcome is returned. The session clock of timed modes can
/// also end the game here; check `session.phase` after ticking.
pub fn tick<R: Rng + ?Sized>(session: &mut GameSession, elapsed_ms: u32, rng: &mut R) -> Option<RoundOutcome> {
    if elapsed_ms == 0 || !session.is_active() || session.pending.is_none() {
        return None;
    }

    session.elapsed_ms += elapsed_ms as u64;
    session.time_remaining_ms = session.time_remaining_ms.saturating_sub(elapsed_ms);

    if session.time_remaining_ms == 0 {
        let instruction = session.pending.take()?;
        return Some(resolve_round(session, instruction, false, true, 0, rng));
    }

    if let Some(EndReason::TimeLimit) = end_condition(session) {
        end_game(session, EndReason::TimeLimit);
    }
    None
}

/// Drop back to idle from any phase
pub fn reset_game(session: &mut GameSession) {
    let was = session.phase;
    session.clear_counters();
    log::debug!("Game reset from {:?}", was);
}

fn next_round<R: Rng + ?Sized>(session: &mut GameSession, rng: &mut R) {
    let instruction = generate_instruction(
        &session.tuning.generator,
        session.level,
        session.history.make_contiguous(),
        rng,
    );
    session.push_history(instruction.kind);
    session.round_time_limit_ms = session.current_round_limit();
    session.time_remaining_ms = session.round_time_limit_ms;

    log::debug!(
        "Round {}: {} {:?}{} -> {:?}",
        session.rounds_played + 1,
        instruction.id,
        instruction.display,
        if instruction.is_reversed { " (reversed)" } else { "" },
        instruction.acceptable_answers
    );
    session.pending = Some(instruction);
}

fn resolve_round<R: Rng + ?Sized>(
    session: &mut GameSession,
    instruction: Instruction,
    correct: bool,
    timed_out: bool,
    reaction_ms: u32,
    rng: &mut R,
) -> RoundOutcome {
    let previous_level = session.level;

    let breakdown = if correct {
        let luck_roll: f64 = rng.random();
        let breakdown = session.tuning.scoring.score(reaction_ms, session.streak, luck_roll);

        session.score = session.score.saturating_add(breakdown.total);
        session.streak += 1;
        session.best_streak = session.best_streak.max(session.streak);
        session.correct_answers += 1;
        session.reactions.record(reaction_ms);
        session.note_luck(breakdown.luck);
        // Level only ever moves up
        let earned = session.tuning.progression.level_for(session.correct_answers);
        session.level = session.level.max(earned);
        session.celebration = breakdown.celebration;
        Some(breakdown)
    } else {
        session.mistakes += 1;
        session.streak = 0;
        session.lives = session.lives.saturating_sub(1);
        session.celebration = Default::default();
        None
    };
    session.last_breakdown = breakdown;
    session.rounds_played += 1;

    let leveled_up = session.level > previous_level;
    if leveled_up {
        log::info!("Level up: {} -> {}", previous_level, session.level);
    }

    let ended = end_condition(session);
    match ended {
        Some(reason) => end_game(session, reason),
        None => next_round(session, rng),
    }

    RoundOutcome {
        instruction_id: instruction.id,
        correct,
        timed_out,
        breakdown,
        streak: session.streak,
        level: session.level,
        leveled_up,
        lives: session.lives,
        ended,
    }
}

fn end_condition(session: &GameSession) -> Option<EndReason> {
    let profile = session.mode.profile();
    if session.lives == 0 {
        return Some(EndReason::OutOfLives);
    }
    if profile.max_rounds.is_some_and(|max| session.rounds_played >= max) {
        return Some(EndReason::RoundLimit);
    }
    if profile
        .session_time_limit_ms
        .is_some_and(|limit| session.elapsed_ms >= limit)
    {
        return Some(EndReason::TimeLimit);
    }
    None
}

fn end_game(session: &mut GameSession, reason: EndReason) {
    session.phase = GamePhase::Ended;
    session.pending = None;
    session.time_remaining_ms = 0;
    session.end_reason = Some(reason);

    log::info!(
        "Game over ({:?}): score={}, level={}, best_streak={}, rounds={}",
        reason,
        session.score,
        session.level,
        session.best_streak,
        session.rounds_played
    );
}
