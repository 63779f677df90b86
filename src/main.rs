//! Brain Flip entry point
//!
//! Web builds initialize logging and hand control to the page script through
//! `platform::web::BrainFlip`. Native builds run an unattended demo session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Brain Flip starting...");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use brain_flip::game::{Game, Player};
    use brain_flip::highscores::format_age;
    use brain_flip::persistence::MemoryStore;
    use brain_flip::platform::{ManualTimers, now_ms};
    use brain_flip::sim::{AutoPlayer, GameMode};
    use brain_flip::{Achievement, Settings, achievements};

    env_logger::init();
    log::info!("Brain Flip (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(now_ms);
    let settings = Settings::load_from(Path::new("brain_flip.json"));
    let mode = args
        .next()
        .and_then(|s| GameMode::from_str(&s))
        .unwrap_or(settings.default_mode);

    let timers = ManualTimers::new();
    let mut game = Game::new(seed, settings.tuning.clone(), timers.clone())
        .with_store(Box::new(MemoryStore::new()));
    game.set_player(Player {
        user_id: "demo".to_string(),
        username: settings.username.clone(),
    });

    let bot = AutoPlayer::default();
    let mut bot_rng = Pcg32::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15);
    let started = now_ms();
    game.start_game(mode, started);
    println!("Brain Flip demo: mode={}, seed={}", mode.as_str(), seed);

    // Drive the round timer by hand; the bot answers once its reaction delay has elapsed
    let mut decision = game.pending().map(|inst| bot.decide(inst, &mut bot_rng));
    let mut waited = 0u32;
    while let Some(interval) = timers.active_interval() {
        let Some(current) = decision.clone() else {
            break;
        };
        if waited + interval >= current.reaction_ms {
            let shown = game.pending().map(|i| (i.display.clone(), i.is_reversed));
            // Time up to the answer still counts against the round clock
            if let Some(outcome) = game.tick(current.reaction_ms - waited) {
                println!("{:>14}        -> timeout  lives={}", "", outcome.lives);
            } else if let Some(outcome) = game.submit_answer(&current.answer, current.reaction_ms) {
                if let Some((display, reversed)) = shown {
                    println!(
                        "{:>14}{} -> {:<7} {:>4}ms  {}  score={} streak={} lives={}",
                        display,
                        if reversed { " (flip)" } else { "       " },
                        current.answer,
                        current.reaction_ms,
                        if outcome.correct { "ok  " } else { "MISS" },
                        game.session().score,
                        outcome.streak,
                        outcome.lives,
                    );
                }
            }
            waited = 0;
            decision = game.pending().map(|inst| bot.decide(inst, &mut bot_rng));
        } else {
            waited += interval;
            if let Some(outcome) = game.tick(interval) {
                println!("{:>14}        -> timeout  lives={}", "", outcome.lives);
                waited = 0;
                decision = game.pending().map(|inst| bot.decide(inst, &mut bot_rng));
            }
        }
    }

    let session = game.session();
    println!(
        "\nGame over ({:?}): score={} level={} best_streak={} accuracy={:.0}%",
        session.end_reason,
        session.score,
        session.level,
        session.best_streak,
        session.accuracy() * 100.0
    );
    let unlocked: Vec<Achievement> = achievements::evaluate(session);
    if !unlocked.is_empty() {
        let titles: Vec<&str> = unlocked.iter().map(|a| a.title()).collect();
        println!("Achievements: {}", titles.join(", "));
    }

    if let Some(store) = game.store() {
        match store.fetch_leaderboard(mode, 10, 0) {
            Ok(entries) => {
                for entry in entries {
                    println!(
                        "#{:<3} {:<12} {:>8}  {}",
                        entry.rank,
                        entry.username,
                        entry.score,
                        format_age(now_ms(), entry.updated_at)
                    );
                }
            }
            Err(e) => log::warn!("Leaderboard unavailable: {}", e),
        }
    }
}
