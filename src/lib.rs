//! Flappy Combat - side-scrolling flappy bird with weapons
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bird physics, weapons, projectiles, enemies, collisions)
//! - `session`: Game-session driver (fixed timestep, pause, input queue, HUD snapshot)
//! - `platform`: Input intents and browser glue
//! - `persistence`: Key-value gateway (LocalStorage on web, in-memory elsewhere)
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use session::{HudSnapshot, Session};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 12;
    /// Longest frame delta accepted from the host before clamping (seconds).
    /// Anything up to this is simulated in full, so 10 fps still runs in real time.
    pub const MAX_FRAME_DT: f32 = MAX_SUBSTEPS as f32 * SIM_DT;

    /// Reference speeds were authored per frame at this rate
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Playfield defaults (canvas pixels, y grows downward)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Bird defaults
    pub const BIRD_X: f32 = 100.0;
    pub const BIRD_WIDTH: f32 = 40.0;
    pub const BIRD_HEIGHT: f32 = 30.0;
    pub const BIRD_MAX_HEALTH: i32 = 15;
    /// Gravity acceleration (pixels/s², downward)
    pub const BIRD_GRAVITY: f32 = 800.0;
    /// Vertical velocity set by a flap (pixels/s, negative is up)
    pub const BIRD_FLAP_VELOCITY: f32 = -300.0;
    /// Vertical velocity set by a dive (pixels/s)
    pub const BIRD_DIVE_VELOCITY: f32 = 200.0;
    /// Rotation per unit of vertical velocity (radians per pixel/s)
    pub const BIRD_ROTATION_FACTOR: f32 = 0.005;

    /// Combo window (ms since last kill)
    pub const COMBO_TIMEOUT_MS: f64 = 3000.0;

    /// Enemy spawn cadence (ms)
    pub const BASE_SPAWN_RATE_MS: f64 = 3000.0;
    pub const MIN_SPAWN_RATE_MS: f64 = 500.0;
    pub const SPAWN_RATE_DECREASE_MS: f64 = 100.0;
    /// Score step for each spawn rate decrease
    pub const SPAWN_SCORE_STEP: u64 = 100;

    /// Lifetime of explosion markers (ms)
    pub const EXPLOSION_DURATION_MS: f64 = 500.0;
}

/// Convert a per-frame speed from the reference tables into pixels/second
#[inline]
pub fn per_frame_to_per_sec(per_frame: f32) -> f32 {
    per_frame * consts::REFERENCE_FPS
}

/// Bearing from `from` to `to` in radians (atan2 of dy, dx)
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector pointing along `angle`
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
