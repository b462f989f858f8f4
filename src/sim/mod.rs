//! Deterministic simulation module
//!
//! All combat logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod catalog;
pub mod collision;
pub mod combo;
pub mod enemy;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod weapon;

pub use catalog::{Delivery, EnemyKind, EnemySpec, WeaponKind, WeaponSpec};
pub use collision::{Rect, aabb_overlap, area_blast, detonate, resolve};
pub use combo::{Combo, award_points};
pub use enemy::{Enemy, Spawner, spawn_interval_ms};
pub use projectile::{Advance, Projectile, nearest_enemy};
pub use state::{Bird, Explosion, ExplosionKind, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, fire_weapon, select_weapon, tick};
pub use weapon::{AmmoStatus, Armory, FireRejected, Weapon};
