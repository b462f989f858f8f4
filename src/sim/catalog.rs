//! Static weapon and enemy definitions
//!
//! Reference stats were authored as pixels-per-frame at 60 Hz; speeds here are
//! pixels/second so movement scales with the simulation timestep.

use serde::{Deserialize, Serialize};

use crate::per_frame_to_per_sec;

/// Weapon identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    /// Infinite-ammo starter weapon
    #[default]
    Stone,
    Ak47,
    Laser,
    Missile,
    Electric,
    Flame,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 6] = [
        WeaponKind::Stone,
        WeaponKind::Ak47,
        WeaponKind::Laser,
        WeaponKind::Missile,
        WeaponKind::Electric,
        WeaponKind::Flame,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Stone => "stone",
            WeaponKind::Ak47 => "ak47",
            WeaponKind::Laser => "laser",
            WeaponKind::Missile => "missile",
            WeaponKind::Electric => "electric",
            WeaponKind::Flame => "flame",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        WeaponKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
    }

    /// Catalog stat block for this weapon
    pub fn spec(&self) -> WeaponSpec {
        match self {
            WeaponKind::Stone => WeaponSpec {
                kind: *self,
                name: "Stone",
                damage: 1,
                cooldown_ms: 500.0,
                projectile_speed: per_frame_to_per_sec(10.0),
                projectile_size: 5.0,
                max_ammo: None,
                auto_fire: false,
                range: None,
                delivery: Delivery::Projectile { piercing: false },
            },
            WeaponKind::Ak47 => WeaponSpec {
                kind: *self,
                name: "AK-47",
                damage: 3,
                cooldown_ms: 200.0,
                projectile_speed: per_frame_to_per_sec(15.0),
                projectile_size: 5.0,
                max_ammo: Some(100),
                auto_fire: true,
                range: None,
                delivery: Delivery::Projectile { piercing: false },
            },
            WeaponKind::Laser => WeaponSpec {
                kind: *self,
                name: "Laser Beam",
                damage: 5,
                cooldown_ms: 1000.0,
                projectile_speed: per_frame_to_per_sec(20.0),
                projectile_size: 3.0,
                max_ammo: Some(20),
                auto_fire: false,
                range: None,
                delivery: Delivery::Projectile { piercing: true },
            },
            WeaponKind::Missile => WeaponSpec {
                kind: *self,
                name: "Missile Launcher",
                damage: 10,
                cooldown_ms: 2000.0,
                projectile_speed: per_frame_to_per_sec(8.0),
                projectile_size: 8.0,
                max_ammo: Some(5),
                auto_fire: false,
                range: None,
                delivery: Delivery::Homing {
                    explosion_radius: 50.0,
                },
            },
            WeaponKind::Electric => WeaponSpec {
                kind: *self,
                name: "Electric Wings",
                damage: 4,
                cooldown_ms: 3000.0,
                projectile_speed: 0.0,
                projectile_size: 0.0,
                max_ammo: Some(10),
                auto_fire: false,
                range: None,
                delivery: Delivery::Area {
                    radius: 100.0,
                    effect_ms: 500.0,
                },
            },
            WeaponKind::Flame => WeaponSpec {
                kind: *self,
                name: "Flame Thrower",
                damage: 8,
                cooldown_ms: 50.0,
                projectile_speed: per_frame_to_per_sec(12.0),
                projectile_size: 8.0,
                max_ammo: Some(200),
                auto_fire: true,
                range: Some(400.0),
                delivery: Delivery::Stream,
            },
        }
    }
}

/// How a weapon delivers its damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Delivery {
    /// Straight shot; consumed on first hit unless piercing
    Projectile { piercing: bool },
    /// Steers toward the enemy nearest at launch and detonates on arrival
    Homing { explosion_radius: f32 },
    /// Instant one-shot damage to every enemy within `radius` of the bird
    Area { radius: f32, effect_ms: f64 },
    /// Continuous short-range stream while fire is held
    Stream,
}

/// Weapon stat block
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponSpec {
    pub kind: WeaponKind,
    pub name: &'static str,
    pub damage: i32,
    /// Minimum time between shots (ms)
    pub cooldown_ms: f64,
    /// Pixels/second
    pub projectile_speed: f32,
    /// Square projectile edge length (pixels)
    pub projectile_size: f32,
    /// None = infinite ammo
    pub max_ammo: Option<u32>,
    /// Keeps firing while the fire intent is held
    pub auto_fire: bool,
    /// Maximum travel distance (pixels), None = until the playfield edge
    pub range: Option<f32>,
    pub delivery: Delivery,
}

impl WeaponSpec {
    pub fn is_piercing(&self) -> bool {
        matches!(self.delivery, Delivery::Projectile { piercing: true })
    }

    pub fn is_homing(&self) -> bool {
        matches!(self.delivery, Delivery::Homing { .. })
    }

    pub fn is_aoe(&self) -> bool {
        matches!(self.delivery, Delivery::Area { .. })
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self.delivery, Delivery::Stream)
    }

    pub fn explosion_radius(&self) -> Option<f32> {
        match self.delivery {
            Delivery::Homing { explosion_radius } => Some(explosion_radius),
            _ => None,
        }
    }

    pub fn aoe_range(&self) -> Option<f32> {
        match self.delivery {
            Delivery::Area { radius, .. } => Some(radius),
            _ => None,
        }
    }
}

/// Enemy identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Drone,
    Bat,
    Bee,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Drone, EnemyKind::Bat, EnemyKind::Bee];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Drone => "drone",
            EnemyKind::Bat => "bat",
            EnemyKind::Bee => "bee",
        }
    }

    pub fn spec(&self) -> EnemySpec {
        match self {
            EnemyKind::Drone => EnemySpec {
                width: 30.0,
                height: 30.0,
                speed: per_frame_to_per_sec(3.0),
                health: 5,
                damage: 1,
                points: 10,
                color: 0xFF4136,
            },
            EnemyKind::Bat => EnemySpec {
                width: 25.0,
                height: 15.0,
                speed: per_frame_to_per_sec(5.0),
                health: 3,
                damage: 1,
                points: 5,
                color: 0x85144B,
            },
            EnemyKind::Bee => EnemySpec {
                width: 20.0,
                height: 20.0,
                speed: per_frame_to_per_sec(4.0),
                health: 2,
                damage: 1,
                points: 3,
                color: 0xFFDC00,
            },
        }
    }
}

/// Enemy stat block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpec {
    pub width: f32,
    pub height: f32,
    /// Leftward speed (pixels/second)
    pub speed: f32,
    pub health: i32,
    /// Contact damage to the bird
    pub damage: i32,
    pub points: u64,
    /// 0xRRGGBB, cosmetic
    pub color: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stone_is_infinite() {
        for kind in WeaponKind::ALL {
            let spec = kind.spec();
            assert_eq!(spec.kind, kind);
            assert_eq!(spec.max_ammo.is_none(), kind == WeaponKind::Stone);
        }
    }

    #[test]
    fn test_capability_flags() {
        assert!(WeaponKind::Laser.spec().is_piercing());
        assert!(WeaponKind::Missile.spec().is_homing());
        assert_eq!(WeaponKind::Missile.spec().explosion_radius(), Some(50.0));
        assert!(WeaponKind::Electric.spec().is_aoe());
        assert_eq!(WeaponKind::Electric.spec().aoe_range(), Some(100.0));
        assert!(WeaponKind::Flame.spec().is_continuous());
        assert!(!WeaponKind::Stone.spec().is_piercing());
    }

    #[test]
    fn test_weapon_kind_from_str() {
        assert_eq!(WeaponKind::from_str("AK47"), Some(WeaponKind::Ak47));
        assert_eq!(WeaponKind::from_str("bazooka"), None);
    }

    #[test]
    fn test_enemy_speeds_are_per_second() {
        assert_eq!(EnemyKind::Drone.spec().speed, 180.0);
        assert_eq!(EnemyKind::Bat.spec().points, 5);
    }
}
