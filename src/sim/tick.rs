//! Fixed timestep simulation tick
//!
//! One call advances the session by `dt` seconds in a fixed order:
//! input, bird physics, firing, spawning, movement, collision resolution,
//! combo decay, effect expiry, terminal check.

use super::catalog::{Delivery, WeaponKind};
use super::collision::{self, area_blast};
use super::projectile::{Advance, Projectile};
use super::state::{Explosion, ExplosionKind, GameEvent, GamePhase, GameState};
use super::weapon::FireRejected;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap (space / up / tap)
    pub flap: bool,
    /// Dive (down)
    pub dive: bool,
    /// Fire pressed this step
    pub fire: bool,
    /// Fire is being held (drives auto-fire weapons)
    pub fire_held: bool,
    /// Switch the active weapon
    pub select_weapon: Option<WeaponKind>,
    /// Refill the active weapon
    pub reload: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - autopilot flies and shoots
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused at {:.0}ms", state.clock_ms);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed at {:.0}ms", state.clock_ms);
            }
            _ => {}
        }
    }

    // Don't tick if paused or game over
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        _ => {}
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    if state.phase == GamePhase::Ready {
        if !(input.flap || input.fire) {
            return;
        }
        state.phase = GamePhase::Playing;
        log::info!("Run started (seed {})", state.seed);
    }

    state.clock_ms += f64::from(dt) * 1000.0;
    state.time_ticks += 1;

    // Loadout management
    if let Some(kind) = input.select_weapon {
        select_weapon(state, kind);
    }
    if input.reload {
        let kind = state.bird.weapon;
        if state.armory.reload(kind) {
            state.events.push(GameEvent::Reloaded { weapon: kind });
        }
    }

    // Bird physics
    if input.flap {
        state.bird.flap(state.tuning.bird_flap_velocity);
    } else if input.dive {
        state.bird.dive(state.tuning.bird_dive_velocity);
    }
    let grounded = state
        .bird
        .update(dt, state.tuning.bird_gravity, state.tuning.playfield_height);

    // Firing
    let auto_fire = state
        .armory
        .get(state.bird.weapon)
        .is_some_and(|w| w.spec.auto_fire);
    if input.fire || (input.fire_held && auto_fire) {
        match fire_weapon(state) {
            Ok(()) | Err(FireRejected::CoolingDown) => {}
            Err(FireRejected::OutOfAmmo) => {
                // Only report on a fresh press, not every held step
                if input.fire {
                    state.events.push(GameEvent::OutOfAmmo {
                        weapon: state.bird.weapon,
                    });
                }
            }
            Err(err) => log::warn!("Cannot fire {}: {}", state.bird.weapon.as_str(), err),
        }
    }

    spawn_enemies(state);
    advance_entities(state, dt);

    collision::resolve(state);

    if state.combo.decay(state.clock_ms, state.tuning.combo_timeout_ms) {
        state.events.push(GameEvent::ComboChanged { combo: 0 });
    }

    let now = state.clock_ms;
    state.explosions.retain(|e| !e.is_expired(now));

    if state.bird.is_dead() || (grounded && state.tuning.ground_is_fatal) {
        end_run(state);
    }

    state.normalize_order();
}

/// Fire the active weapon at the current session time.
///
/// Area weapons resolve their damage immediately; everything else spawns a
/// projectile from the bird's right edge.
pub fn fire_weapon(state: &mut GameState) -> Result<(), FireRejected> {
    let now = state.clock_ms;
    let kind = state.bird.weapon;
    let weapon = state
        .armory
        .get_mut(kind)
        .ok_or(FireRejected::NotInLoadout)?;
    weapon.try_fire(now)?;
    let spec = weapon.spec.clone();

    match spec.delivery {
        Delivery::Area { radius, effect_ms } => {
            let center = state.bird.center();
            let hit = area_blast(&mut state.enemies, center, radius, spec.damage);
            log::debug!("{} discharge hit {} enemies", spec.name, hit.len());
            for id in hit {
                state.events.push(GameEvent::EnemyHit {
                    id,
                    damage: spec.damage,
                });
            }
            state.explosions.push(Explosion {
                center,
                radius,
                started_ms: now,
                duration_ms: effect_ms,
                kind: ExplosionKind::Electric,
            });
        }
        _ => {
            let id = state.next_entity_id();
            let projectile = Projectile::spawn(id, &spec, &state.bird.rect(), &state.enemies);
            if let Some(target) = projectile.target {
                log::debug!("{} #{} locked on enemy #{}", spec.name, id, target);
            }
            state.projectiles.push(projectile);
        }
    }

    state.events.push(GameEvent::WeaponFired { weapon: kind });
    Ok(())
}

/// Switch the active weapon; ignored for weapons outside the loadout
pub fn select_weapon(state: &mut GameState, kind: WeaponKind) -> bool {
    if !state.armory.contains(kind) {
        log::debug!("{} is not in the loadout", kind.as_str());
        return false;
    }
    if state.bird.weapon != kind {
        state.bird.weapon = kind;
        state.events.push(GameEvent::WeaponSelected { weapon: kind });
    }
    true
}

fn spawn_enemies(state: &mut GameState) {
    let GameState {
        spawner,
        rng,
        tuning,
        ids,
        enemies,
        events,
        clock_ms,
        score,
        ..
    } = state;

    if let Some(enemy) = spawner.maybe_spawn(*clock_ms, *score, tuning, rng, ids) {
        events.push(GameEvent::EnemySpawned {
            id: enemy.id,
            kind: enemy.kind,
        });
        enemies.push(enemy);
    }
}

fn advance_entities(state: &mut GameState, dt: f32) {
    let bounds = state.bounds();
    let GameState {
        projectiles,
        enemies,
        events,
        ..
    } = state;

    projectiles.retain_mut(|p| p.advance(enemies.as_slice(), dt, bounds) != Advance::Expired);

    enemies.retain_mut(|enemy| {
        let on_field = enemy.advance(dt);
        if !on_field {
            events.push(GameEvent::EnemyEscaped { id: enemy.id });
        }
        on_field
    });
}

fn end_run(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.events.push(GameEvent::GameOver { score: state.score });
    log::info!(
        "Game over: score {}, {} kills, {:.1}s",
        state.score,
        state.kills,
        state.clock_ms / 1000.0
    );
}

/// Demo pilot: hold the lane of the closest incoming enemy and keep shooting
fn autopilot(state: &GameState, input: &mut TickInput) {
    let bird = &state.bird;
    let bird_center = bird.center();

    let target_y = state
        .enemies
        .iter()
        .filter(|e| e.pos.x + e.size.x > bird.pos.x)
        .min_by(|a, b| {
            a.pos
                .x
                .partial_cmp(&b.pos.x)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|e| e.center().y)
        .unwrap_or(state.tuning.playfield_height / 2.0);

    let near_floor = bird.pos.y + bird.size.y > state.tuning.playfield_height - 60.0;
    let below_target = bird_center.y > target_y + 10.0;
    if state.phase == GamePhase::Ready || near_floor || (below_target && bird.vel_y >= 0.0) {
        input.flap = true;
    }

    input.fire = true;
    input.fire_held = true;
    if state
        .armory
        .get(bird.weapon)
        .is_some_and(|w| w.ammo == Some(0))
    {
        input.reload = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::catalog::EnemyKind;
    use crate::sim::enemy::Enemy;
    use crate::tuning::Tuning;
    use glam::Vec2;

    /// Playing state with no spawns and no gravity
    fn quiet_state() -> GameState {
        let tuning = Tuning {
            bird_gravity: 0.0,
            base_spawn_rate_ms: 1e12,
            min_spawn_rate_ms: 1e12,
            ..Tuning::default()
        };
        let mut state = GameState::new(12345, tuning);
        state.spawner.last_spawn_ms = Some(0.0);
        state.phase = GamePhase::Playing;
        state
    }

    fn fired(state: &GameState) -> usize {
        state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::WeaponFired { .. }))
            .count()
    }

    fn run(state: &mut GameState, input: &TickInput, steps: usize) {
        for _ in 0..steps {
            tick(state, input, SIM_DT);
        }
    }

    #[test]
    fn test_tick_ready_to_playing() {
        let mut state = GameState::new(12345, Tuning::default());
        assert_eq!(state.phase, GamePhase::Ready);

        // Tick without input - should stay Ready with a frozen clock
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.clock_ms, 0.0);

        let input = TickInput {
            flap: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.clock_ms > 0.0);
        assert!(state.bird.vel_y < 0.0);
    }

    #[test]
    fn test_tick_pause_freezes_clock() {
        let mut state = quiet_state();
        tick(&mut state, &TickInput::default(), SIM_DT);
        let clock = state.clock_ms;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        run(&mut state, &TickInput::default(), 500);
        assert_eq!(state.clock_ms, clock);

        // Unpause
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.clock_ms > clock);
    }

    #[test]
    fn test_pause_does_not_elapse_cooldown() {
        let mut state = quiet_state();
        let shoot = TickInput {
            fire: true,
            ..Default::default()
        };
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &shoot, SIM_DT);
        assert_eq!(fired(&state), 1);

        tick(&mut state, &pause, SIM_DT);
        // Two wall-clock seconds pass while paused
        run(&mut state, &TickInput::default(), 240);
        tick(&mut state, &pause, SIM_DT);

        tick(&mut state, &shoot, SIM_DT);
        assert_eq!(fired(&state), 1);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = quiet_state();
        let shoot = TickInput {
            fire: true,
            ..Default::default()
        };
        // One second of mashing fire with the 500ms stone
        run(&mut state, &shoot, 120);
        assert_eq!(fired(&state), 2);
    }

    #[test]
    fn test_auto_fire_only_for_auto_weapons() {
        let held = TickInput {
            fire_held: true,
            ..Default::default()
        };

        let mut state = quiet_state();
        run(&mut state, &held, 120);
        assert_eq!(fired(&state), 0);

        let mut state = quiet_state();
        assert!(select_weapon(&mut state, WeaponKind::Ak47));
        run(&mut state, &held, 120);
        // 200ms cooldown over one second
        assert_eq!(fired(&state), 5);
        assert_eq!(
            state.armory.get(WeaponKind::Ak47).unwrap().ammo,
            Some(95)
        );
    }

    #[test]
    fn test_out_of_ammo_is_silent_noop() {
        let mut state = quiet_state();
        select_weapon(&mut state, WeaponKind::Missile);
        state.armory.get_mut(WeaponKind::Missile).unwrap().ammo = Some(0);

        let shoot = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &shoot, SIM_DT);
        assert!(state.projectiles.is_empty());
        assert!(state
            .events
            .contains(&GameEvent::OutOfAmmo { weapon: WeaponKind::Missile }));

        let reload = TickInput {
            reload: true,
            ..Default::default()
        };
        tick(&mut state, &reload, SIM_DT);
        assert_eq!(state.armory.get(WeaponKind::Missile).unwrap().ammo, Some(5));
        tick(&mut state, &shoot, SIM_DT);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_select_weapon_outside_loadout() {
        let tuning = Tuning {
            loadout: vec![WeaponKind::Stone, WeaponKind::Laser],
            ..Tuning::default()
        };
        let mut state = GameState::new(1, tuning);
        assert!(!select_weapon(&mut state, WeaponKind::Missile));
        assert_eq!(state.bird.weapon, WeaponKind::Stone);
        assert!(select_weapon(&mut state, WeaponKind::Laser));
        assert_eq!(state.bird.weapon, WeaponKind::Laser);
    }

    #[test]
    fn test_electric_discharge_hits_nearby_enemies_once() {
        let mut state = quiet_state();
        let near = state.next_entity_id();
        state
            .enemies
            .push(Enemy::new(near, EnemyKind::Drone, Vec2::new(100.0, 200.0)));
        let far = state.next_entity_id();
        state
            .enemies
            .push(Enemy::new(far, EnemyKind::Drone, Vec2::new(600.0, 285.0)));

        let input = TickInput {
            select_weapon: Some(WeaponKind::Electric),
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.enemies[0].health, 1);
        assert_eq!(state.enemies[1].health, 5);
        assert!(state
            .explosions
            .iter()
            .any(|e| e.kind == ExplosionKind::Electric));

        // The visual lingers but deals no further damage
        run(&mut state, &TickInput::default(), 30);
        assert_eq!(state.enemies[0].health, 1);
    }

    #[test]
    fn test_missile_flies_straight_after_target_killed_elsewhere() {
        let mut state = quiet_state();
        let target = state.next_entity_id();
        state
            .enemies
            .push(Enemy::new(target, EnemyKind::Drone, Vec2::new(600.0, 100.0)));

        let input = TickInput {
            select_weapon: Some(WeaponKind::Missile),
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].target, Some(target));
        run(&mut state, &TickInput::default(), 10);

        // Destroyed by another weapon before impact
        state.enemies[0].health = 0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].target, None);

        let heading = state.projectiles[0].heading;
        let before = state.projectiles[0].pos;
        tick(&mut state, &TickInput::default(), SIM_DT);
        let missile = &state.projectiles[0];
        assert_eq!(missile.heading, heading);
        assert!(((missile.pos - before).normalize() - heading).length() < 1e-4);
    }

    #[test]
    fn test_contact_death_ends_run() {
        let mut state = quiet_state();
        state.bird.health = 1;
        let id = state.next_entity_id();
        let pos = state.bird.pos;
        state.enemies.push(Enemy::new(id, EnemyKind::Bat, pos));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver { score: 0 }));

        let clock = state.clock_ms;
        run(&mut state, &TickInput::default(), 10);
        assert_eq!(state.clock_ms, clock);
    }

    #[test]
    fn test_ground_contact_ends_run() {
        let mut state = GameState::new(3, Tuning::default());
        state.phase = GamePhase::Playing;
        state.bird.pos.y = state.tuning.playfield_height - state.bird.size.y;
        state.bird.dive(200.0);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_enemies_escape_without_score() {
        let mut state = quiet_state();
        let id = state.next_entity_id();
        state
            .enemies
            .push(Enemy::new(id, EnemyKind::Bat, Vec2::new(-20.0, 50.0)));
        // Bat is 25 wide at 300 px/s; gone within a few steps
        run(&mut state, &TickInput::default(), 10);
        assert!(state.enemies.is_empty());
        assert!(state.events.contains(&GameEvent::EnemyEscaped { id }));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999, Tuning::default());
        let mut state2 = GameState::new(99999, Tuning::default());
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..3000 {
            tick(&mut state1, &input, SIM_DT);
            tick(&mut state2, &input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.kills, state2.kills);
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        for (a, b) in state1.enemies.iter().zip(&state2.enemies) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.pos, b.pos);
        }
        assert_eq!(state1.bird.pos, state2.bird.pos);
    }

    #[test]
    fn test_idle_mode_scores() {
        let mut state = GameState::new(7, Tuning::default());
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        // Sixty simulated seconds
        run(&mut state, &input, 7200);
        assert!(state.time_ticks > 0);
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::EnemySpawned { .. })));
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::WeaponFired { .. })));
    }
}
