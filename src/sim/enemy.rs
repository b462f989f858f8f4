//! Enemy entities and the score-scaled spawn timer

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::EnemyKind;
use super::collision::Rect;
use super::state::EntityIds;
use crate::tuning::Tuning;

/// A live enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Leftward speed (pixels/s)
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    /// Contact damage to the bird
    pub damage: i32,
    pub points: u64,
    pub color: u32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2) -> Self {
        let spec = kind.spec();
        Self {
            id,
            kind,
            pos,
            size: Vec2::new(spec.width, spec.height),
            speed: spec.speed,
            health: spec.health,
            max_health: spec.health,
            damage: spec.damage,
            points: spec.points,
            color: spec.color,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtract damage. Returns true if this hit killed the enemy.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        let was_alive = self.is_alive();
        self.health -= damage;
        was_alive && !self.is_alive()
    }

    /// Move left. Returns false once the right edge has left the playfield.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.pos.x -= self.speed * dt;
        self.pos.x + self.size.x >= 0.0
    }
}

/// Spawn interval for a score: linear decrease per score step, clamped at the floor
pub fn spawn_interval_ms(score: u64, tuning: &Tuning) -> f64 {
    let step = tuning.spawn_score_step.max(1);
    let steps = (score / step) as f64;
    (tuning.base_spawn_rate_ms - steps * tuning.spawn_rate_decrease_ms).max(tuning.min_spawn_rate_ms)
}

/// Enemy spawn timer
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    /// Session time of the last spawn (None = spawn immediately)
    pub last_spawn_ms: Option<f64>,
}

impl Spawner {
    pub fn is_due(&self, now_ms: f64, score: u64, tuning: &Tuning) -> bool {
        self.last_spawn_ms
            .is_none_or(|last| now_ms - last >= spawn_interval_ms(score, tuning))
    }

    /// Spawn one enemy at the right edge if the interval has elapsed
    pub fn maybe_spawn<R: Rng + ?Sized>(
        &mut self,
        now_ms: f64,
        score: u64,
        tuning: &Tuning,
        rng: &mut R,
        ids: &mut EntityIds,
    ) -> Option<Enemy> {
        if !self.is_due(now_ms, score, tuning) {
            return None;
        }
        self.last_spawn_ms = Some(now_ms);

        let kind = EnemyKind::ALL[rng.random_range(0..EnemyKind::ALL.len())];
        let max_y = (tuning.playfield_height - kind.spec().height).max(0.0);
        let y = if max_y > 0.0 {
            rng.random_range(0.0..=max_y)
        } else {
            0.0
        };

        let enemy = Enemy::new(ids.allocate(), kind, Vec2::new(tuning.playfield_width, y));
        log::debug!(
            "Spawned {} #{} at y={:.0} (interval {}ms)",
            kind.as_str(),
            enemy.id,
            y,
            spawn_interval_ms(score, tuning)
        );
        Some(enemy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_reference_spawn_intervals() {
        let tuning = Tuning::default();
        assert_eq!(spawn_interval_ms(0, &tuning), 3000.0);
        assert_eq!(spawn_interval_ms(99, &tuning), 3000.0);
        assert_eq!(spawn_interval_ms(100, &tuning), 2900.0);
        assert_eq!(spawn_interval_ms(1550, &tuning), 1500.0);
        assert_eq!(spawn_interval_ms(2500, &tuning), 500.0);
        assert_eq!(spawn_interval_ms(1_000_000, &tuning), 500.0);
    }

    #[test]
    fn test_spawner_cadence() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ids = EntityIds::default();
        let mut spawner = Spawner::default();

        let first = spawner.maybe_spawn(0.0, 0, &tuning, &mut rng, &mut ids);
        assert!(first.is_some());
        assert!(spawner.maybe_spawn(2999.0, 0, &tuning, &mut rng, &mut ids).is_none());
        assert!(spawner.maybe_spawn(3000.0, 0, &tuning, &mut rng, &mut ids).is_some());
        // Higher score shortens the wait
        assert!(spawner.maybe_spawn(3500.0, 2500, &tuning, &mut rng, &mut ids).is_some());
    }

    #[test]
    fn test_spawn_position_within_playfield() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let mut ids = EntityIds::default();
        for i in 0..200 {
            let mut spawner = Spawner::default();
            let enemy = spawner
                .maybe_spawn(i as f64, 0, &tuning, &mut rng, &mut ids)
                .unwrap();
            assert_eq!(enemy.pos.x, tuning.playfield_width);
            assert!(enemy.pos.y >= 0.0);
            assert!(enemy.pos.y + enemy.size.y <= tuning.playfield_height);
            assert_eq!(enemy.health, enemy.max_health);
        }
    }

    #[test]
    fn test_enemy_retires_past_left_edge() {
        let mut enemy = Enemy::new(1, EnemyKind::Bee, Vec2::new(5.0, 100.0));
        // 240 px/s * 0.1 s = 24 px
        assert!(enemy.advance(0.1));
        assert!((enemy.pos.x + 19.0).abs() < 1e-3);
        assert!(!enemy.advance(0.1));
    }

    #[test]
    fn test_apply_damage_reports_kill_once() {
        let mut enemy = Enemy::new(1, EnemyKind::Bat, Vec2::ZERO);
        assert!(!enemy.apply_damage(2));
        assert!(enemy.apply_damage(2));
        assert!(!enemy.apply_damage(2));
        assert!(!enemy.is_alive());
    }

    proptest! {
        #[test]
        fn prop_spawn_interval_monotonic_with_floor(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let tuning = Tuning::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let at_lo = spawn_interval_ms(lo, &tuning);
            let at_hi = spawn_interval_ms(hi, &tuning);
            prop_assert!(at_hi <= at_lo);
            prop_assert!(at_hi >= tuning.min_spawn_rate_ms);
        }
    }
}
