//! Game state and core simulation types
//!
//! `GameState` is the explicit session context: everything the per-step update
//! mutates lives here, nothing in process-wide statics.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::{EnemyKind, WeaponKind};
use super::collision::Rect;
use super::combo::Combo;
use super::enemy::{Enemy, Spawner};
use super::projectile::Projectile;
use super::weapon::Armory;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Bird hovering, waiting for the first flap or shot
    Ready,
    /// Active gameplay
    Playing,
    /// Game is paused (session clock frozen)
    Paused,
    /// Run ended
    GameOver,
}

/// The player's bird
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bird {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity (pixels/s, positive is down)
    pub vel_y: f32,
    pub health: i32,
    pub max_health: i32,
    /// Externally granted invincibility (power-ups)
    pub invincible: bool,
    /// Post-hit invincibility window end (session ms)
    pub invincible_until_ms: Option<f64>,
    /// Radians, derived from vertical velocity, clamped to ±45°
    pub rotation: f32,
    /// Active weapon
    pub weapon: WeaponKind,
}

impl Bird {
    pub fn new(y: f32, max_health: i32) -> Self {
        Self {
            pos: Vec2::new(BIRD_X, y),
            size: Vec2::new(BIRD_WIDTH, BIRD_HEIGHT),
            vel_y: 0.0,
            health: max_health,
            max_health,
            invincible: false,
            invincible_until_ms: None,
            rotation: 0.0,
            weapon: WeaponKind::Stone,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn flap(&mut self, velocity: f32) {
        self.vel_y = velocity;
    }

    pub fn dive(&mut self, velocity: f32) {
        self.vel_y = velocity;
    }

    /// Integrate gravity and clamp to the playfield.
    /// Returns true if the bird touched the ground this step.
    pub fn update(&mut self, dt: f32, gravity: f32, floor: f32) -> bool {
        use std::f32::consts::FRAC_PI_4;

        self.vel_y += gravity * dt;
        self.pos.y += self.vel_y * dt;
        self.rotation = (self.vel_y * BIRD_ROTATION_FACTOR).clamp(-FRAC_PI_4, FRAC_PI_4);

        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.vel_y = 0.0;
        } else if self.pos.y + self.size.y > floor {
            self.pos.y = floor - self.size.y;
            self.vel_y = 0.0;
            return true;
        }
        false
    }

    pub fn is_invulnerable(&self, now_ms: f64) -> bool {
        self.invincible || self.invincible_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Apply contact damage unless invulnerable. Returns true if health changed.
    pub fn take_damage(&mut self, amount: i32, now_ms: f64, invincibility_ms: f64) -> bool {
        if self.is_invulnerable(now_ms) {
            return false;
        }
        self.health -= amount;
        if invincibility_ms > 0.0 {
            self.invincible_until_ms = Some(now_ms + invincibility_ms);
        }
        true
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// What produced an explosion marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionKind {
    /// Enemy destroyed
    Kill,
    /// Missile detonation
    Missile,
    /// Electric wings discharge
    Electric,
}

/// Transient visual marker. Any area damage it stands for was applied once at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    pub started_ms: f64,
    pub duration_ms: f64,
    pub kind: ExplosionKind,
}

impl Explosion {
    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.started_ms >= self.duration_ms
    }

    /// 0 at creation, 1 at expiry
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }
}

/// Typed events emitted during a step, drained by the host once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    WeaponFired { weapon: WeaponKind },
    OutOfAmmo { weapon: WeaponKind },
    WeaponSelected { weapon: WeaponKind },
    Reloaded { weapon: WeaponKind },
    EnemySpawned { id: u32, kind: EnemyKind },
    EnemyHit { id: u32, damage: i32 },
    EnemyKilled { id: u32, kind: EnemyKind, points: u64 },
    EnemyEscaped { id: u32 },
    MissileDetonated { pos: Vec2, radius: f32 },
    BirdHit { damage: i32, health: i32 },
    ComboChanged { combo: u32 },
    GameOver { score: u64 },
}

/// Monotonic entity id source
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Complete game-session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Spawn RNG (enemy type and lane)
    pub rng: Pcg32,
    /// Balance constants for this run
    pub tuning: Tuning,
    /// Current phase
    pub phase: GamePhase,
    /// Session clock in ms; only advances while playing
    pub clock_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Score
    pub score: u64,
    /// Enemies destroyed this run
    pub kills: u32,
    /// Kill streak
    pub combo: Combo,
    /// Player bird
    pub bird: Bird,
    /// Per-weapon cooldown and ammo
    pub armory: Armory,
    /// Live projectiles (ascending id)
    pub projectiles: Vec<Projectile>,
    /// Live enemies (ascending id)
    pub enemies: Vec<Enemy>,
    /// Visual markers
    pub explosions: Vec<Explosion>,
    /// Enemy spawn timer
    pub spawner: Spawner,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    pub(super) ids: EntityIds,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let bird = Bird::new(
            (tuning.playfield_height - BIRD_HEIGHT) / 2.0,
            tuning.bird_max_health,
        );
        let armory = Armory::new(&tuning.loadout);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Ready,
            clock_ms: 0.0,
            time_ticks: 0,
            score: 0,
            kills: 0,
            combo: Combo::default(),
            bird,
            armory,
            projectiles: Vec::new(),
            enemies: Vec::new(),
            explosions: Vec::new(),
            spawner: Spawner::default(),
            events: Vec::new(),
            ids: EntityIds::default(),
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.allocate()
    }

    /// Playfield extent (width, height)
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.tuning.playfield_width, self.tuning.playfield_height)
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.projectiles.sort_by_key(|p| p.id);
        self.enemies.sort_by_key(|e| e.id);
    }
}
