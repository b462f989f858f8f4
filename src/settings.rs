//! Player preferences
//!
//! Persisted separately from scores under `flappy_settings`.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore};
use crate::sim::WeaponKind;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Holding fire keeps shooting auto-fire weapons
    pub auto_fire: bool,
    /// Weapon equipped at the start of a run
    pub starting_weapon: WeaponKind,

    // === Visual Effects ===
    /// Draw kill and missile explosions
    pub explosion_effects: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (no bird tilt, no explosion rings)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_fire: true,
            starting_weapon: WeaponKind::Stone,
            explosion_effects: true,
            show_fps: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "flappy_settings";

    /// Effective explosion drawing (respects reduced_motion)
    pub fn effective_explosions(&self) -> bool {
        self.explosion_effects && !self.reduced_motion
    }

    /// Effective bird tilt (respects reduced_motion)
    pub fn effective_rotation(&self) -> bool {
        !self.reduced_motion
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match persistence::load_json(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> bool {
        let saved = persistence::save_json(store, Self::STORAGE_KEY, self);
        if saved {
            log::info!("Settings saved");
        }
        saved
    }
}
