//! Collision detection and damage resolution
//!
//! Runs once per step after projectiles and enemies have moved:
//! projectile hits (piercing, explosive), kill reaping, then bird contact.
//! Removal is mark-and-compact, so nothing is skipped or visited twice.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combo::award_points;
use super::enemy::Enemy;
use super::state::{Explosion, ExplosionKind, GameEvent, GameState};

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap; rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        aabb_overlap(self, other)
    }
}

#[inline]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Damage every living enemy whose center lies within `radius` of `point`,
/// except `exclude`. Applied once; returns the ids damaged.
pub fn detonate(
    enemies: &mut [Enemy],
    point: Vec2,
    radius: f32,
    damage: i32,
    exclude: Option<u32>,
) -> Vec<u32> {
    let mut damaged = Vec::new();
    for enemy in enemies.iter_mut() {
        if !enemy.is_alive() || Some(enemy.id) == exclude {
            continue;
        }
        if enemy.center().distance(point) <= radius {
            enemy.apply_damage(damage);
            damaged.push(enemy.id);
        }
    }
    damaged
}

/// Instant area effect around `center` (electric wings)
pub fn area_blast(enemies: &mut [Enemy], center: Vec2, radius: f32, damage: i32) -> Vec<u32> {
    detonate(enemies, center, radius, damage, None)
}

/// Projectile vs enemy pass. Spent projectiles are removed at the end.
pub fn resolve_projectile_hits(state: &mut GameState) {
    let GameState {
        projectiles,
        enemies,
        explosions,
        events,
        clock_ms,
        tuning,
        ..
    } = state;
    let now = *clock_ms;

    for projectile in projectiles.iter_mut() {
        if projectile.spent {
            continue;
        }
        let rect = projectile.rect();
        let mut direct_hit: Option<u32> = None;

        for enemy in enemies.iter_mut() {
            if !enemy.is_alive() || projectile.has_hit(enemy.id) {
                continue;
            }
            let reached = projectile.arrived == Some(enemy.id);
            if !reached && !rect.intersects(&enemy.rect()) {
                continue;
            }

            enemy.apply_damage(projectile.damage);
            projectile.hit_ids.push(enemy.id);
            events.push(GameEvent::EnemyHit {
                id: enemy.id,
                damage: projectile.damage,
            });

            if projectile.is_explosive() || !projectile.piercing {
                direct_hit = Some(enemy.id);
                projectile.spent = true;
                break;
            }
        }

        // Homing arrival whose target died earlier in this pass still detonates
        if projectile.arrived.is_some() && !projectile.spent {
            projectile.spent = true;
        }

        if projectile.spent {
            if let Some(radius) = projectile.explosion_radius {
                let point = projectile.center();
                let splashed = detonate(enemies, point, radius, projectile.damage, direct_hit);
                for id in splashed {
                    events.push(GameEvent::EnemyHit {
                        id,
                        damage: projectile.damage,
                    });
                }
                explosions.push(Explosion {
                    center: point,
                    radius,
                    started_ms: now,
                    duration_ms: tuning.explosion_duration_ms,
                    kind: ExplosionKind::Missile,
                });
                events.push(GameEvent::MissileDetonated { pos: point, radius });
            }
        }
    }

    projectiles.retain(|p| !p.spent);
}

/// Remove dead enemies and book score, combo and kill explosions.
/// Returns the number of kills.
pub fn reap_kills(state: &mut GameState) -> u32 {
    let mut dead = Vec::new();
    state.enemies.retain(|enemy| {
        if enemy.is_alive() {
            true
        } else {
            dead.push(enemy.clone());
            false
        }
    });

    let now = state.clock_ms;
    for enemy in &dead {
        let combo = state.combo.on_kill(now, state.tuning.combo_timeout_ms);
        let gained = award_points(
            &mut state.score,
            enemy.points,
            &state.combo,
            state.tuning.combo_scales_score,
        );
        state.kills += 1;
        log::debug!(
            "Killed {} #{} (+{}, combo {})",
            enemy.kind.as_str(),
            enemy.id,
            gained,
            combo
        );

        state.explosions.push(Explosion {
            center: enemy.center(),
            radius: enemy.size.x.max(enemy.size.y) / 2.0,
            started_ms: now,
            duration_ms: state.tuning.explosion_duration_ms,
            kind: ExplosionKind::Kill,
        });
        state.events.push(GameEvent::EnemyKilled {
            id: enemy.id,
            kind: enemy.kind,
            points: gained,
        });
        state.events.push(GameEvent::ComboChanged { combo });
    }

    dead.len() as u32
}

/// Bird vs enemy contact: one-shot damage, enemy removed regardless of health
pub fn resolve_bird_contacts(state: &mut GameState) {
    let now = state.clock_ms;
    let bird_rect = state.bird.rect();
    let invincibility_ms = state.tuning.hit_invincibility_ms;
    let GameState {
        bird,
        enemies,
        events,
        ..
    } = state;

    enemies.retain(|enemy| {
        if !enemy.is_alive() || !bird_rect.intersects(&enemy.rect()) {
            return true;
        }
        if bird.take_damage(enemy.damage, now, invincibility_ms) {
            log::debug!(
                "Bird hit by {} #{} for {} ({} hp left)",
                enemy.kind.as_str(),
                enemy.id,
                enemy.damage,
                bird.health
            );
            events.push(GameEvent::BirdHit {
                damage: enemy.damage,
                health: bird.health,
            });
        }
        false
    });
}

/// Full resolution pass for one step
pub fn resolve(state: &mut GameState) {
    resolve_projectile_hits(state);
    reap_kills(state);
    resolve_bird_contacts(state);
}
