//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - The repeating round timer
//! - JS bindings (web only)

pub mod timer;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use timer::{ManualTimers, RoundTimer, TimerBackend, TimerHandle};

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
