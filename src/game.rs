//! Session driver
//!
//! Owns a `GameSession`, the seeded RNG feeding it, and the round timer. The
//! timer lives exactly as long as the session is active. When a run ends the
//! final stats go to the configured store.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::TIMER_INTERVAL_MS;
use crate::persistence::{SessionPayload, SessionStore, SubmitReceipt, report_session};
use crate::platform::{RoundTimer, TimerBackend};
use crate::sim::{self, GameMode, GamePhase, GameSession, Instruction, RoundOutcome};
use crate::tuning::Tuning;

/// Who is playing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub user_id: String,
    pub username: String,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            user_id: "guest".to_string(),
            username: "Guest".to_string(),
        }
    }
}

pub struct Game<B: TimerBackend> {
    session: GameSession,
    rng: Pcg32,
    seed: u64,
    timers: B,
    timer: Option<RoundTimer<B::Handle>>,
    player: Player,
    store: Option<Box<dyn SessionStore>>,
    last_receipt: Option<SubmitReceipt>,
}

impl<B: TimerBackend> Game<B> {
    pub fn new(seed: u64, tuning: Tuning, timers: B) -> Self {
        Self {
            session: GameSession::new(tuning),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            timers,
            timer: None,
            player: Player::default(),
            store: None,
            last_receipt: None,
        }
    }

    /// Report finished runs to `store`
    pub fn with_store(mut self, store: Box<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn set_player(&mut self, player: Player) {
        self.player = player;
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn pending(&self) -> Option<&Instruction> {
        self.session.pending.as_ref()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn store(&self) -> Option<&dyn SessionStore> {
        self.store.as_deref()
    }

    /// Receipt from the most recent successful report
    pub fn last_receipt(&self) -> Option<&SubmitReceipt> {
        self.last_receipt.as_ref()
    }

    pub fn start_game(&mut self, mode: GameMode, now_ms: u64) {
        // Restarting mid-run drops the old timer before a new one is scheduled
        self.timer = None;
        self.last_receipt = None;
        sim::start_game(&mut self.session, mode, &mut self.rng, now_ms);
        self.sync(false);
    }

    pub fn submit_answer(&mut self, answer: &str, reaction_ms: u32) -> Option<RoundOutcome> {
        let was_active = self.session.is_active();
        let outcome = sim::submit_answer(&mut self.session, answer, reaction_ms, &mut self.rng);
        self.sync(was_active);
        outcome
    }

    /// Timer callback entry point
    pub fn tick(&mut self, elapsed_ms: u32) -> Option<RoundOutcome> {
        let was_active = self.session.is_active();
        let outcome = sim::tick(&mut self.session, elapsed_ms, &mut self.rng);
        self.sync(was_active);
        outcome
    }

    pub fn reset_game(&mut self) {
        sim::reset_game(&mut self.session);
        self.sync(false);
    }

    /// Keep the timer in step with the phase and report a run that just ended
    fn sync(&mut self, was_active: bool) {
        if self.session.is_active() {
            if self.timer.is_none() {
                self.timer = Some(RoundTimer::start(&mut self.timers, TIMER_INTERVAL_MS));
            }
            return;
        }

        self.timer = None;
        if was_active && self.session.phase == GamePhase::Ended {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let Some(store) = self.store.as_deref_mut() else {
            return;
        };
        let payload = SessionPayload::from_session(&self.session, &self.player.user_id, &self.player.username);
        self.last_receipt = report_session(store, &payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::LeaderboardEntry;
    use crate::persistence::{MemoryStore, PersistenceError};
    use crate::platform::ManualTimers;

    struct DownStore;

    impl SessionStore for DownStore {
        fn submit_session(&mut self, _: &SessionPayload) -> Result<SubmitReceipt, PersistenceError> {
            Err(PersistenceError::Unavailable)
        }

        fn fetch_leaderboard(&self, _: GameMode, _: usize, _: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
            Err(PersistenceError::Unavailable)
        }
    }

    fn wrong(game: &Game<ManualTimers>) -> &'static str {
        let pending = game.pending().unwrap();
        pending.answer_pool().into_iter().find(|a| !pending.accepts(a)).unwrap()
    }

    fn right(game: &Game<ManualTimers>) -> String {
        game.pending().unwrap().acceptable_answers.iter().next().unwrap().clone()
    }

    fn lose(game: &mut Game<ManualTimers>) {
        while game.session().is_active() {
            let answer = wrong(game);
            game.submit_answer(answer, 300);
        }
    }

    #[test]
    fn test_timer_follows_session() {
        let timers = ManualTimers::new();
        let mut game = Game::new(1, Tuning::default(), timers.clone());
        assert_eq!(timers.active_count(), 0);

        game.start_game(GameMode::Classic, 0);
        assert!(game.timer_running());
        assert_eq!(timers.active_interval(), Some(TIMER_INTERVAL_MS));

        // Still a single schedule after several rounds
        for _ in 0..3 {
            let answer = right(&game);
            game.submit_answer(&answer, 400);
        }
        assert_eq!(timers.active_count(), 1);

        lose(&mut game);
        assert_eq!(game.session().phase, GamePhase::Ended);
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_reset_cancels_timer() {
        let timers = ManualTimers::new();
        let mut game = Game::new(2, Tuning::default(), timers.clone());
        game.start_game(GameMode::Speed, 0);
        assert_eq!(timers.active_count(), 1);
        game.reset_game();
        assert_eq!(timers.active_count(), 0);
        assert_eq!(game.session().phase, GamePhase::Idle);
    }

    #[test]
    fn test_restart_keeps_one_timer() {
        let timers = ManualTimers::new();
        let mut game = Game::new(3, Tuning::default(), timers.clone());
        game.start_game(GameMode::Classic, 0);
        game.start_game(GameMode::Marathon, 10);
        assert_eq!(timers.active_count(), 1);
    }

    #[test]
    fn test_drop_cancels_timer() {
        let timers = ManualTimers::new();
        {
            let mut game = Game::new(4, Tuning::default(), timers.clone());
            game.start_game(GameMode::Classic, 0);
            assert_eq!(timers.active_count(), 1);
        }
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_timeouts_end_game_and_report() {
        let timers = ManualTimers::new();
        let mut game = Game::new(5, Tuning::default(), timers.clone()).with_store(Box::new(MemoryStore::new()));
        game.set_player(Player {
            user_id: "u-42".to_string(),
            username: "Quick".to_string(),
        });
        game.start_game(GameMode::Classic, 1_000);
        let answer = right(&game);
        game.submit_answer(&answer, 250);

        while let Some(interval) = timers.active_interval() {
            game.tick(interval);
        }

        assert_eq!(game.session().phase, GamePhase::Ended);
        assert_eq!(game.session().mistakes, 3);
        let receipt = game.last_receipt().unwrap();
        assert_eq!(receipt.rank, Some(1));

        let board = game.store().unwrap().fetch_leaderboard(GameMode::Classic, 10, 0).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].username, game.player().username);
        assert_eq!(board[0].username, "Quick");
        assert_eq!(board[0].score, game.session().score);
    }

    #[test]
    fn test_store_failure_leaves_session_alone() {
        let mut game = Game::new(6, Tuning::default(), ManualTimers::new()).with_store(Box::new(DownStore));
        game.start_game(GameMode::Classic, 0);
        let answer = right(&game);
        game.submit_answer(&answer, 250);
        let score = game.session().score;
        lose(&mut game);

        assert_eq!(game.session().phase, GamePhase::Ended);
        assert_eq!(game.session().score, score);
        assert!(game.last_receipt().is_none());
    }

    #[test]
    fn test_idle_inputs_are_ignored() {
        let timers = ManualTimers::new();
        let mut game = Game::new(7, Tuning::default(), timers.clone());
        assert!(game.submit_answer("UP", 100).is_none());
        assert!(game.tick(100).is_none());
        assert_eq!(timers.active_count(), 0);
        assert_eq!(game.seed(), 7);
    }
}
