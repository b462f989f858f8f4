//! Projectile spawning and per-step motion
//!
//! Straight shots fly along +x. Homing shots capture the nearest enemy at
//! launch, re-aim at its center every step and fall back to their last heading
//! if the target disappears.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::{WeaponKind, WeaponSpec};
use super::collision::Rect;
use super::enemy::Enemy;
use crate::{bearing, unit_from_angle};

/// Outcome of advancing a projectile one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Still in flight
    Flying,
    /// Homing projectile reached its target's center (target id)
    Arrived(u32),
    /// Left the playfield or exhausted its range
    Expired,
}

/// A live projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Owning weapon
    pub weapon: WeaponKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels/second
    pub speed: f32,
    /// Unit direction of travel
    pub heading: Vec2,
    pub damage: i32,
    pub piercing: bool,
    pub homing: bool,
    /// Homing target id; cleared when the target is gone
    pub target: Option<u32>,
    pub explosion_radius: Option<f32>,
    /// Max travel distance (pixels)
    pub range: Option<f32>,
    pub traveled: f32,
    /// Enemies already damaged by this projectile
    pub hit_ids: Vec<u32>,
    /// Set when a homing projectile reached its target this step
    #[serde(skip)]
    pub arrived: Option<u32>,
    /// Consumed; removed at the end of collision resolution
    #[serde(skip)]
    pub spent: bool,
}

impl Projectile {
    /// Launch from the origin's right edge, vertically centered
    pub fn spawn(id: u32, spec: &WeaponSpec, origin: &Rect, enemies: &[Enemy]) -> Self {
        let size = Vec2::splat(spec.projectile_size);
        let pos = Vec2::new(
            origin.x + origin.w,
            origin.y + origin.h / 2.0 - size.y / 2.0,
        );
        let homing = spec.is_homing();
        let target = if homing {
            nearest_enemy(pos + size / 2.0, enemies)
        } else {
            None
        };

        Self {
            id,
            weapon: spec.kind,
            pos,
            size,
            speed: spec.projectile_speed,
            heading: Vec2::X,
            damage: spec.damage,
            piercing: spec.is_piercing(),
            homing,
            target,
            explosion_radius: spec.explosion_radius(),
            range: spec.range,
            traveled: 0.0,
            hit_ids: Vec::new(),
            arrived: None,
            spent: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn has_hit(&self, enemy_id: u32) -> bool {
        self.hit_ids.contains(&enemy_id)
    }

    pub fn is_explosive(&self) -> bool {
        self.explosion_radius.is_some()
    }

    /// Move one step of `dt` seconds within a playfield of `bounds`
    pub fn advance(&mut self, enemies: &[Enemy], dt: f32, bounds: Vec2) -> Advance {
        self.arrived = None;

        // Re-aim at the target, or drop it and keep the last heading
        let mut tracked: Option<(u32, Vec2, f32)> = None;
        if let Some(target_id) = self.target {
            match enemies.iter().find(|e| e.id == target_id && e.is_alive()) {
                Some(enemy) => {
                    let target_center = enemy.center();
                    self.heading = unit_from_angle(bearing(self.center(), target_center));
                    tracked = Some((enemy.id, target_center, enemy.size.x / 2.0));
                }
                None => {
                    log::debug!(
                        "Projectile #{} lost target #{}, flying straight",
                        self.id,
                        target_id
                    );
                    self.target = None;
                }
            }
        }

        let step = self.speed * dt;
        self.pos += self.heading * step;
        self.traveled += step;

        if let Some((id, target_center, half_width)) = tracked {
            if self.center().distance(target_center) < half_width {
                self.arrived = Some(id);
                return Advance::Arrived(id);
            }
        }

        if self.range.is_some_and(|range| self.traveled >= range) {
            return Advance::Expired;
        }

        let out_of_bounds = self.pos.x > bounds.x
            || self.pos.x + self.size.x < 0.0
            || self.pos.y > bounds.y
            || self.pos.y + self.size.y < 0.0;
        if out_of_bounds {
            return Advance::Expired;
        }

        Advance::Flying
    }
}

/// Id of the living enemy whose center is closest to `point`
pub fn nearest_enemy(point: Vec2, enemies: &[Enemy]) -> Option<u32> {
    enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.center()
                .distance_squared(point)
                .partial_cmp(&b.center().distance_squared(point))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|e| e.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::EnemyKind;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);
    const DT: f32 = 1.0 / 120.0;

    fn bird_rect() -> Rect {
        Rect::new(100.0, 285.0, 40.0, 30.0)
    }

    #[test]
    fn test_spawn_at_right_edge_centered() {
        let p = Projectile::spawn(1, &WeaponKind::Stone.spec(), &bird_rect(), &[]);
        assert_eq!(p.pos.x, 140.0);
        assert_eq!(p.center().y, 300.0);
        assert!(!p.homing);
        assert_eq!(p.target, None);
    }

    #[test]
    fn test_straight_motion_scales_with_dt() {
        let mut p = Projectile::spawn(1, &WeaponKind::Stone.spec(), &bird_rect(), &[]);
        let start = p.pos.x;
        assert_eq!(p.advance(&[], 0.5, BOUNDS), Advance::Flying);
        // 600 px/s for half a second
        assert!((p.pos.x - start - 300.0).abs() < 1e-3);
        assert_eq!(p.pos.y, 297.5);
    }

    #[test]
    fn test_straight_projectile_expires_past_right_edge() {
        let mut p = Projectile::spawn(1, &WeaponKind::Stone.spec(), &bird_rect(), &[]);
        let mut steps = 0;
        while p.advance(&[], DT, BOUNDS) == Advance::Flying {
            steps += 1;
            assert!(steps < 10_000);
        }
        assert!(p.pos.x > BOUNDS.x);
    }

    #[test]
    fn test_stream_expires_at_range() {
        let mut p = Projectile::spawn(1, &WeaponKind::Flame.spec(), &bird_rect(), &[]);
        let mut result = Advance::Flying;
        while result == Advance::Flying {
            result = p.advance(&[], DT, BOUNDS);
        }
        assert_eq!(result, Advance::Expired);
        assert!(p.traveled >= 400.0);
        assert!(p.traveled < 400.0 + 720.0 * DT + 1e-3);
    }

    #[test]
    fn test_homing_captures_nearest_enemy() {
        let far = Enemy::new(1, EnemyKind::Drone, Vec2::new(700.0, 285.0));
        let near = Enemy::new(2, EnemyKind::Drone, Vec2::new(300.0, 100.0));
        let p = Projectile::spawn(3, &WeaponKind::Missile.spec(), &bird_rect(), &[far, near]);
        assert!(p.homing);
        assert_eq!(p.target, Some(2));
    }

    #[test]
    fn test_homing_without_enemies_flies_straight() {
        let mut p = Projectile::spawn(1, &WeaponKind::Missile.spec(), &bird_rect(), &[]);
        assert_eq!(p.target, None);
        let y = p.pos.y;
        p.advance(&[], DT, BOUNDS);
        assert_eq!(p.pos.y, y);
        assert!(p.pos.x > 140.0);
    }

    #[test]
    fn test_homing_steers_and_arrives() {
        let enemy = Enemy::new(9, EnemyKind::Drone, Vec2::new(300.0, 100.0));
        let enemies = vec![enemy];
        let mut p = Projectile::spawn(1, &WeaponKind::Missile.spec(), &bird_rect(), &enemies);

        p.advance(&enemies, DT, BOUNDS);
        // Target is up and to the right
        assert!(p.heading.x > 0.0 && p.heading.y < 0.0);

        let mut result = Advance::Flying;
        for _ in 0..1000 {
            result = p.advance(&enemies, DT, BOUNDS);
            if result != Advance::Flying {
                break;
            }
        }
        assert_eq!(result, Advance::Arrived(9));
        assert_eq!(p.arrived, Some(9));
    }

    #[test]
    fn test_homing_keeps_heading_when_target_removed() {
        let enemies = vec![Enemy::new(9, EnemyKind::Drone, Vec2::new(300.0, 100.0))];
        let mut p = Projectile::spawn(1, &WeaponKind::Missile.spec(), &bird_rect(), &enemies);
        p.advance(&enemies, DT, BOUNDS);
        let heading = p.heading;

        // Target destroyed elsewhere
        let before = p.pos;
        assert_eq!(p.advance(&[], DT, BOUNDS), Advance::Flying);
        assert_eq!(p.target, None);
        assert_eq!(p.heading, heading);
        let moved = p.pos - before;
        assert!((moved.normalize() - heading).length() < 1e-4);
    }
}
