//! Data-driven game balance
//!
//! Every knob the simulation reads lives here. Missing JSON fields fall back
//! to the defaults below, so a partial override like `{"combo_timeout_ms": 5000}`
//! is valid.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{self, KeyValueStore};
use crate::sim::WeaponKind;

/// Balance constants for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Playfield ===
    pub playfield_width: f32,
    pub playfield_height: f32,

    // === Bird ===
    /// Pixels/s²
    pub bird_gravity: f32,
    /// Pixels/s (negative is up)
    pub bird_flap_velocity: f32,
    pub bird_dive_velocity: f32,
    pub bird_max_health: i32,
    /// Invulnerability after taking contact damage (0 = none)
    pub hit_invincibility_ms: f64,
    /// Touching the ground ends the run
    pub ground_is_fatal: bool,

    // === Scoring ===
    pub combo_timeout_ms: f64,
    /// Multiply kill points by the combo count
    pub combo_scales_score: bool,

    // === Enemy spawning ===
    pub base_spawn_rate_ms: f64,
    pub min_spawn_rate_ms: f64,
    pub spawn_rate_decrease_ms: f64,
    pub spawn_score_step: u64,

    // === Effects ===
    pub explosion_duration_ms: f64,

    /// Weapons available this run (the stone is always added)
    pub loadout: Vec<WeaponKind>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,

            bird_gravity: BIRD_GRAVITY,
            bird_flap_velocity: BIRD_FLAP_VELOCITY,
            bird_dive_velocity: BIRD_DIVE_VELOCITY,
            bird_max_health: BIRD_MAX_HEALTH,
            hit_invincibility_ms: 0.0,
            ground_is_fatal: true,

            combo_timeout_ms: COMBO_TIMEOUT_MS,
            combo_scales_score: false,

            base_spawn_rate_ms: BASE_SPAWN_RATE_MS,
            min_spawn_rate_ms: MIN_SPAWN_RATE_MS,
            spawn_rate_decrease_ms: SPAWN_RATE_DECREASE_MS,
            spawn_score_step: SPAWN_SCORE_STEP,

            explosion_duration_ms: EXPLOSION_DURATION_MS,

            loadout: WeaponKind::ALL.to_vec(),
        }
    }
}

impl Tuning {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "flappy_tuning";

    /// Parse from JSON and clamp out-of-range values
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Self = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Load from the store, falling back to defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match persistence::load_json::<Self, S>(store, Self::STORAGE_KEY) {
            Some(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning.sanitized()
            }
            None => Self::default(),
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> bool {
        persistence::save_json(store, Self::STORAGE_KEY, self)
    }

    /// Replace values the simulation cannot run with
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !(self.playfield_width > 0.0 && self.playfield_height > BIRD_HEIGHT) {
            log::warn!(
                "Invalid playfield {}x{}, using defaults",
                self.playfield_width,
                self.playfield_height
            );
            self.playfield_width = defaults.playfield_width;
            self.playfield_height = defaults.playfield_height;
        }
        if self.bird_max_health <= 0 {
            log::warn!("bird_max_health must be positive, using {}", defaults.bird_max_health);
            self.bird_max_health = defaults.bird_max_health;
        }
        if !(self.min_spawn_rate_ms > 0.0) {
            log::warn!("min_spawn_rate_ms must be positive, using {}", defaults.min_spawn_rate_ms);
            self.min_spawn_rate_ms = defaults.min_spawn_rate_ms;
        }
        // NaN compares false, so it falls through to the floor
        if !(self.base_spawn_rate_ms >= self.min_spawn_rate_ms) {
            self.base_spawn_rate_ms = self.min_spawn_rate_ms;
        }
        if !(self.spawn_rate_decrease_ms >= 0.0) {
            self.spawn_rate_decrease_ms = 0.0;
        }
        self.spawn_score_step = self.spawn_score_step.max(1);
        if !(self.combo_timeout_ms >= 0.0) {
            self.combo_timeout_ms = defaults.combo_timeout_ms;
        }
        if !(self.hit_invincibility_ms >= 0.0) {
            self.hit_invincibility_ms = 0.0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{"combo_timeout_ms": 5000, "loadout": ["laser"]}"#)
            .unwrap();
        assert_eq!(tuning.combo_timeout_ms, 5000.0);
        assert_eq!(tuning.loadout, vec![WeaponKind::Laser]);
        assert_eq!(tuning.base_spawn_rate_ms, 3000.0);
        assert!(!tuning.combo_scales_score);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Tuning::from_json("{").is_err());
        assert!(Tuning::from_json(r#"{"bird_max_health": "lots"}"#).is_err());
    }

    #[test]
    fn test_sanitize_clamps_spawn_rates() {
        let tuning = Tuning::from_json(
            r#"{"min_spawn_rate_ms": -5, "base_spawn_rate_ms": 100, "spawn_score_step": 0}"#,
        )
        .unwrap();
        assert_eq!(tuning.min_spawn_rate_ms, 500.0);
        assert_eq!(tuning.base_spawn_rate_ms, 500.0);
        assert_eq!(tuning.spawn_score_step, 1);
    }

    #[test]
    fn test_sanitize_replaces_nan_timings() {
        let tuning = Tuning {
            min_spawn_rate_ms: f64::NAN,
            base_spawn_rate_ms: f64::NAN,
            spawn_rate_decrease_ms: f64::NAN,
            combo_timeout_ms: f64::NAN,
            hit_invincibility_ms: f64::NAN,
            ..Tuning::default()
        }
        .sanitized();
        assert_eq!(tuning.min_spawn_rate_ms, 500.0);
        assert_eq!(tuning.base_spawn_rate_ms, 500.0);
        assert_eq!(tuning.spawn_rate_decrease_ms, 0.0);
        assert_eq!(tuning.combo_timeout_ms, COMBO_TIMEOUT_MS);
        assert_eq!(tuning.hit_invincibility_ms, 0.0);

        let interval = crate::sim::spawn_interval_ms(1000, &tuning);
        assert!(interval.is_finite());
        assert_eq!(interval, 500.0);
    }

    #[test]
    fn test_load_falls_back_on_corrupt_store() {
        let mut store = MemoryStore::new();
        store.set(Tuning::STORAGE_KEY, "garbage");
        assert_eq!(Tuning::load(&store), Tuning::default());

        let custom = Tuning {
            combo_scales_score: true,
            ..Tuning::default()
        };
        assert!(custom.save(&mut store));
        assert!(Tuning::load(&store).combo_scales_score);
    }
}
