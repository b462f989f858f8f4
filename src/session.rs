//! Game-session driver
//!
//! Owns the `GameState`, the persistence store and the input queue, and turns
//! variable host frame times into fixed simulation steps. The host calls
//! `update` once per animation frame, then reads `snapshot` / `state` to draw.

use serde::Serialize;

use crate::consts::*;
use crate::highscores::{HighScores, RunRecord};
use crate::persistence::KeyValueStore;
use crate::platform::{InputQueue, Intent, unix_time_ms};
use crate::settings::Settings;
use crate::sim::{
    AmmoStatus, GameEvent, GamePhase, GameState, TickInput, WeaponKind, select_weapon, tick,
};
use crate::tuning::Tuning;

/// Identifies one start/stop cycle of the frame loop. Frame callbacks that
/// carry an outdated token are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopToken(u64);

/// Per-frame values for the HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub high_score: u64,
    pub health: i32,
    pub max_health: i32,
    pub combo: u32,
    pub kills: u32,
    pub weapon: WeaponKind,
    pub ammo: Vec<AmmoStatus>,
    pub phase: GamePhase,
}

pub struct Session<S: KeyValueStore> {
    state: GameState,
    store: S,
    tuning: Tuning,
    settings: Settings,
    high_scores: HighScores,
    input: InputQueue,
    /// Input folded from the queue but not yet consumed by a step
    frame_input: TickInput,
    accumulator: f32,
    running: bool,
    generation: u64,
    recorded: bool,
    last_record: Option<RunRecord>,
    /// Events produced by the most recent update
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore> Session<S> {
    /// New session with tuning, settings and scores loaded from `store`
    pub fn new(seed: u64, store: S) -> Self {
        let tuning = Tuning::load(&store);
        Self::with_tuning(seed, store, tuning)
    }

    pub fn with_tuning(seed: u64, store: S, tuning: Tuning) -> Self {
        let settings = Settings::load(&store);
        let high_scores = HighScores::load(&store);
        let mut session = Self {
            state: GameState::new(seed, tuning.clone()),
            store,
            tuning,
            settings,
            high_scores,
            input: InputQueue::new(),
            frame_input: TickInput::default(),
            accumulator: 0.0,
            running: false,
            generation: 0,
            recorded: false,
            last_record: None,
            events: Vec::new(),
        };
        session.equip_starting_weapon();
        log::info!("Session created with seed {}", seed);
        session
    }

    fn equip_starting_weapon(&mut self) {
        let weapon = self.settings.starting_weapon;
        if !select_weapon(&mut self.state, weapon) {
            log::warn!("Starting weapon {} not in loadout", weapon.as_str());
        }
        // Selection before the run starts is not gameplay
        self.state.events.clear();
    }

    /// Begin (or resume driving) the frame loop
    pub fn start(&mut self) -> LoopToken {
        self.generation += 1;
        self.running = true;
        self.accumulator = 0.0;
        LoopToken(self.generation)
    }

    /// Stop the frame loop; pending callbacks become no-ops
    pub fn stop(&mut self) {
        self.generation += 1;
        self.running = false;
        self.accumulator = 0.0;
        log::info!("Session loop stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_current(&self, token: LoopToken) -> bool {
        self.running && token.0 == self.generation
    }

    /// Freeze the session clock (tab hidden, window blur, menu)
    pub fn pause(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.state.phase = GamePhase::Paused;
        self.discard_pause_toggles();
        self.accumulator = 0.0;
        log::info!("Paused at {:.0}ms", self.state.clock_ms);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }
        self.state.phase = GamePhase::Playing;
        self.discard_pause_toggles();
        self.accumulator = 0.0;
        log::info!("Resumed at {:.0}ms", self.state.clock_ms);
        true
    }

    // An explicit pause or resume supersedes toggles queued before it
    fn discard_pause_toggles(&mut self) {
        self.frame_input.pause = false;
        self.input.discard(Intent::Pause);
    }

    /// Fresh run with a new seed; scores and settings are kept
    pub fn restart(&mut self, seed: u64) {
        self.state = GameState::new(seed, self.tuning.clone());
        self.input.clear();
        self.frame_input = TickInput::default();
        self.accumulator = 0.0;
        self.recorded = false;
        self.last_record = None;
        self.events.clear();
        self.equip_starting_weapon();
        log::info!("Game restarted with seed: {}", seed);
    }

    /// Queue an intent; it applies at the next update, never mid-frame
    pub fn push_intent(&mut self, intent: Intent, at_ms: f64) {
        self.input.push(intent, at_ms);
    }

    /// Advance by one host frame. Returns false if `token` is stale.
    pub fn update(&mut self, token: LoopToken, frame_dt: f32) -> bool {
        if !self.is_current(token) {
            return false;
        }

        let mut input = self.input.take_frame_input();
        if !self.settings.auto_fire {
            input.fire_held = false;
        }
        merge_input(&mut self.frame_input, input);

        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.frame_input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            clear_one_shots(&mut self.frame_input);
        }
        if substeps == MAX_SUBSTEPS {
            // Drop time we could not simulate instead of banking it
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        if self.state.phase == GamePhase::Paused {
            self.accumulator = 0.0;
        }

        self.events = self.state.drain_events();

        if self.state.phase == GamePhase::GameOver && !self.recorded {
            self.finish_run();
        }
        true
    }

    fn finish_run(&mut self) {
        self.recorded = true;
        let record = self.high_scores.record(
            &mut self.store,
            self.state.score,
            self.state.kills,
            unix_time_ms(),
        );
        if !record.persisted {
            log::warn!("Final score {} kept in memory only", self.state.score);
        }
        if let Some(rank) = record.rank {
            log::info!("Score {} ranked #{}", self.state.score, rank);
        }
        self.last_record = Some(record);
    }

    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.state.score,
            high_score: self.high_scores.best.max(self.state.score),
            health: self.state.bird.health,
            max_health: self.state.bird.max_health,
            combo: self.state.combo.count,
            kills: self.state.kills,
            weapon: self.state.bird.weapon,
            ammo: self.state.armory.ammo_report(),
            phase: self.state.phase,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Events from the most recent update
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace settings and persist them (failure is logged, not fatal)
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(&mut self.store);
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn last_record(&self) -> Option<RunRecord> {
        self.last_record
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Accumulate a newly folded frame input into one not yet consumed
fn merge_input(into: &mut TickInput, new: TickInput) {
    into.flap |= new.flap;
    into.dive |= new.dive;
    into.fire |= new.fire;
    into.reload |= new.reload;
    into.pause ^= new.pause;
    if new.select_weapon.is_some() {
        into.select_weapon = new.select_weapon;
    }
    into.fire_held = new.fire_held;
    into.idle_mode = new.idle_mode;
}

fn clear_one_shots(input: &mut TickInput) {
    input.flap = false;
    input.dive = false;
    input.fire = false;
    input.reload = false;
    input.pause = false;
    input.select_weapon = None;
}
