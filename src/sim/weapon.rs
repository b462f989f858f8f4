//! Weapon runtime state: cooldown clock and ammo counters
//!
//! Each weapon owns its own `last_fired_ms` and ammo. Switching weapons never
//! touches another weapon's state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::{WeaponKind, WeaponSpec};

/// Why a fire request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireRejected {
    /// Finite ammo is exhausted
    OutOfAmmo,
    /// Cooldown has not elapsed since the last shot
    CoolingDown,
    /// Weapon is not part of the loadout
    NotInLoadout,
}

impl fmt::Display for FireRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireRejected::OutOfAmmo => write!(f, "out of ammo"),
            FireRejected::CoolingDown => write!(f, "weapon cooling down"),
            FireRejected::NotInLoadout => write!(f, "weapon not in loadout"),
        }
    }
}

impl std::error::Error for FireRejected {}

/// A weapon with its mutable runtime fields
#[derive(Debug, Clone)]
pub struct Weapon {
    pub spec: WeaponSpec,
    /// Current ammo (None = infinite)
    pub ammo: Option<u32>,
    /// Session clock time of the last shot
    pub last_fired_ms: Option<f64>,
}

impl Weapon {
    pub fn new(spec: WeaponSpec) -> Self {
        Self {
            ammo: spec.max_ammo,
            spec,
            last_fired_ms: None,
        }
    }

    pub fn kind(&self) -> WeaponKind {
        self.spec.kind
    }

    pub fn is_infinite(&self) -> bool {
        self.ammo.is_none()
    }

    /// True once `cooldown_ms` has elapsed since the last shot
    pub fn cooldown_ready(&self, now_ms: f64) -> bool {
        self.last_fired_ms
            .is_none_or(|last| now_ms - last >= self.spec.cooldown_ms)
    }

    /// Cooldown elapsed and ammo available
    pub fn can_fire(&self, now_ms: f64) -> bool {
        self.cooldown_ready(now_ms) && self.ammo.is_none_or(|ammo| ammo > 0)
    }

    /// Record a shot. Only call after `can_fire` returned true.
    pub fn fire(&mut self, now_ms: f64) {
        debug_assert!(self.can_fire(now_ms));
        self.last_fired_ms = Some(now_ms);
        if let Some(ammo) = self.ammo.as_mut() {
            *ammo = ammo.saturating_sub(1);
        }
    }

    /// Check and fire in one step
    pub fn try_fire(&mut self, now_ms: f64) -> Result<(), FireRejected> {
        if self.ammo == Some(0) {
            return Err(FireRejected::OutOfAmmo);
        }
        if !self.cooldown_ready(now_ms) {
            return Err(FireRejected::CoolingDown);
        }
        self.fire(now_ms);
        Ok(())
    }

    /// Refill to max ammo. Cooldown is unaffected.
    pub fn reload(&mut self) {
        self.ammo = self.spec.max_ammo;
    }

    /// Milliseconds until the cooldown allows another shot
    pub fn remaining_cooldown_ms(&self, now_ms: f64) -> f64 {
        match self.last_fired_ms {
            Some(last) => (self.spec.cooldown_ms - (now_ms - last)).max(0.0),
            None => 0.0,
        }
    }
}

/// Ammo line for the HUD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoStatus {
    pub weapon: WeaponKind,
    pub ammo: Option<u32>,
    pub max_ammo: Option<u32>,
}

/// The bird's weapons, one independent runtime state per kind
#[derive(Debug, Clone, Default)]
pub struct Armory {
    weapons: Vec<Weapon>,
}

impl Armory {
    /// Build from a loadout; duplicates are ignored and the stone is always present
    pub fn new(loadout: &[WeaponKind]) -> Self {
        let mut armory = Self::default();
        armory.insert(Weapon::new(WeaponKind::Stone.spec()));
        for kind in loadout {
            if !armory.contains(*kind) {
                armory.insert(Weapon::new(kind.spec()));
            }
        }
        armory
    }

    /// Add or replace the weapon of the same kind
    pub fn insert(&mut self, weapon: Weapon) {
        match self.weapons.iter_mut().find(|w| w.kind() == weapon.kind()) {
            Some(slot) => *slot = weapon,
            None => self.weapons.push(weapon),
        }
    }

    pub fn contains(&self, kind: WeaponKind) -> bool {
        self.weapons.iter().any(|w| w.kind() == kind)
    }

    pub fn get(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.kind() == kind)
    }

    pub fn get_mut(&mut self, kind: WeaponKind) -> Option<&mut Weapon> {
        self.weapons.iter_mut().find(|w| w.kind() == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Weapon> {
        self.weapons.iter()
    }

    /// Refill one weapon; returns false if it is not in the loadout
    pub fn reload(&mut self, kind: WeaponKind) -> bool {
        match self.get_mut(kind) {
            Some(weapon) => {
                weapon.reload();
                true
            }
            None => false,
        }
    }

    pub fn ammo_report(&self) -> Vec<AmmoStatus> {
        self.weapons
            .iter()
            .map(|w| AmmoStatus {
                weapon: w.kind(),
                ammo: w.ammo,
                max_ammo: w.spec.max_ammo,
            })
            .collect()
    }
}
