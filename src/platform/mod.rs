//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input intents and key mapping
//! - Host clock
//! - Persistence store selection

pub mod input;

pub use input::{InputQueue, Intent, TimedIntent, intent_for_key_down, intent_for_key_up};

/// Host clock in milliseconds (`performance.now()` on the web)
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Wall-clock Unix time in milliseconds, for leaderboard timestamps
#[cfg(target_arch = "wasm32")]
pub fn unix_time_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn unix_time_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Default persistence store for this platform
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> crate::persistence::LocalStore {
    crate::persistence::LocalStore::new()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> crate::persistence::MemoryStore {
    crate::persistence::MemoryStore::new()
}
