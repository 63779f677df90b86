//! Browser bindings
//!
//! `setInterval` backs the round timer; `BrainFlip` is the handle the page
//! script drives.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::timer::{TimerBackend, TimerHandle};
use crate::game::{Game, Player};
use crate::persistence::BrowserStore;
use crate::settings::Settings;
use crate::sim::GameMode;

/// Interval backend. The JS closure lives as long as the backend so a
/// callback can never outlive it, even when it cancels its own interval.
pub struct IntervalBackend {
    callback: Closure<dyn FnMut()>,
}

impl IntervalBackend {
    pub fn new(on_tick: impl FnMut() + 'static) -> Self {
        Self {
            callback: Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>),
        }
    }
}

impl TimerBackend for IntervalBackend {
    type Handle = IntervalHandle;

    fn schedule(&mut self, interval_ms: u32) -> IntervalHandle {
        let id = web_sys::window().and_then(|w| {
            w.set_interval_with_callback_and_timeout_and_arguments_0(
                self.callback.as_ref().unchecked_ref(),
                interval_ms as i32,
            )
            .ok()
        });
        if id.is_none() {
            log::error!("Failed to schedule round timer");
        }
        IntervalHandle { id }
    }
}

pub struct IntervalHandle {
    id: Option<i32>,
}

impl TimerHandle for IntervalHandle {
    fn cancel(&mut self) {
        if let (Some(id), Some(window)) = (self.id.take(), web_sys::window()) {
            window.clear_interval_with_handle(id);
        }
    }
}

type WebGame = Game<IntervalBackend>;

/// Game handle exported to JS
#[wasm_bindgen]
pub struct BrainFlip {
    game: Rc<RefCell<WebGame>>,
    settings: Settings,
}

#[wasm_bindgen]
impl BrainFlip {
    #[wasm_bindgen(constructor)]
    pub fn new(user_id: String) -> BrainFlip {
        let settings = Settings::load();
        let seed = super::now_ms();

        let game = Rc::new_cyclic(|weak: &Weak<RefCell<WebGame>>| {
            let weak = weak.clone();
            let backend = IntervalBackend::new(move || {
                if let Some(game) = weak.upgrade() {
                    if let Ok(mut game) = game.try_borrow_mut() {
                        game.tick(crate::consts::TIMER_INTERVAL_MS);
                    }
                }
            });
            let mut game = Game::new(seed, settings.tuning.clone(), backend)
                .with_store(Box::new(BrowserStore::default()));
            game.set_player(Player {
                user_id,
                username: settings.username.clone(),
            });
            RefCell::new(game)
        });

        log::info!("Brain Flip ready (seed {})", seed);
        BrainFlip { game, settings }
    }

    /// Start a run; unknown mode names fall back to the player's default
    pub fn start_game(&self, mode: &str) {
        let mode = GameMode::from_str(mode).unwrap_or(self.settings.default_mode);
        self.game.borrow_mut().start_game(mode, super::now_ms());
    }

    /// Returns the round outcome as JSON, or undefined when ignored
    pub fn submit_answer(&self, answer: &str, reaction_ms: u32) -> Option<String> {
        let outcome = self.game.borrow_mut().submit_answer(answer, reaction_ms)?;
        serde_json::to_string(&outcome).ok()
    }

    /// Rename the player; takes effect for the next reported run
    pub fn set_username(&mut self, username: &str) {
        let username = username.trim();
        if username.is_empty() {
            return;
        }
        self.settings.username = username.to_string();
        self.settings.save();
        let mut game = self.game.borrow_mut();
        let user_id = game.player().user_id.clone();
        game.set_player(Player {
            user_id,
            username: self.settings.username.clone(),
        });
    }

    /// Remember the mode preselected on the start screen
    pub fn set_default_mode(&mut self, mode: &str) {
        if let Some(mode) = GameMode::from_str(mode) {
            self.settings.default_mode = mode;
            self.settings.save();
        }
    }

    pub fn default_mode(&self) -> String {
        self.settings.default_mode.as_str().to_string()
    }

    pub fn reset_game(&self) {
        self.game.borrow_mut().reset_game();
    }

    /// Current session snapshot as JSON
    pub fn snapshot(&self) -> String {
        serde_json::to_string(self.game.borrow().session()).unwrap_or_default()
    }

    /// Leaderboard page for `mode` as JSON
    pub fn leaderboard(&self, mode: &str, limit: usize, offset: usize) -> String {
        let mode = GameMode::from_str(mode).unwrap_or_default();
        let game = self.game.borrow();
        let entries = game
            .store()
            .and_then(|store| store.fetch_leaderboard(mode, limit, offset).ok())
            .unwrap_or_default();
        serde_json::to_string(&entries).unwrap_or_default()
    }
}
