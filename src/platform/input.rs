//! Device-independent input intents
//!
//! Browser handlers push intents as events arrive; the session folds them
//! into one `TickInput` at the start of the next frame. Nothing is applied
//! mid-frame.

use crate::sim::{TickInput, WeaponKind};

/// A player intention, decoupled from the device that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Flap,
    Dive,
    FirePressed,
    FireReleased,
    SelectWeapon(WeaponKind),
    Reload,
    Pause,
    ToggleIdle,
}

/// Intent stamped with its arrival time (host ms)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedIntent {
    pub at_ms: f64,
    pub intent: Intent,
}

/// Pending intents plus the held-fire and idle flags that persist across frames
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pending: Vec<TimedIntent>,
    fire_held: bool,
    idle_mode: bool,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intent: Intent, at_ms: f64) {
        self.pending.push(TimedIntent { at_ms, intent });
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop queued occurrences of `intent`
    pub fn discard(&mut self, intent: Intent) {
        self.pending.retain(|timed| timed.intent != intent);
    }

    /// Drop everything queued (restart, teardown)
    pub fn clear(&mut self) {
        self.pending.clear();
        self.fire_held = false;
    }

    /// Fold queued intents, in arrival order, into the next frame's input
    pub fn take_frame_input(&mut self) -> TickInput {
        let mut pending = std::mem::take(&mut self.pending);
        pending.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));

        let mut input = TickInput::default();
        for TimedIntent { intent, .. } in pending {
            match intent {
                Intent::Flap => input.flap = true,
                Intent::Dive => input.dive = true,
                Intent::FirePressed => {
                    input.fire = true;
                    self.fire_held = true;
                }
                Intent::FireReleased => self.fire_held = false,
                // Last selection wins
                Intent::SelectWeapon(kind) => input.select_weapon = Some(kind),
                Intent::Reload => input.reload = true,
                // Two toggles in one frame cancel out
                Intent::Pause => input.pause = !input.pause,
                Intent::ToggleIdle => {
                    self.idle_mode = !self.idle_mode;
                    log::info!("Idle mode: {}", self.idle_mode);
                }
            }
        }
        input.fire_held = self.fire_held;
        input.idle_mode = self.idle_mode;
        input
    }
}

/// Keydown mapping (`KeyboardEvent.key` values)
pub fn intent_for_key_down(key: &str) -> Option<Intent> {
    match key {
        " " | "ArrowUp" | "w" | "W" => Some(Intent::Flap),
        "ArrowDown" | "s" | "S" => Some(Intent::Dive),
        "f" | "F" | "Enter" => Some(Intent::FirePressed),
        "r" | "R" => Some(Intent::Reload),
        "Escape" | "p" | "P" => Some(Intent::Pause),
        "i" | "I" => Some(Intent::ToggleIdle),
        _ => {
            let slot: usize = key.parse().ok()?;
            let kind = WeaponKind::ALL.get(slot.checked_sub(1)?)?;
            Some(Intent::SelectWeapon(*kind))
        }
    }
}

/// Keyup mapping; only fire cares about release
pub fn intent_for_key_up(key: &str) -> Option<Intent> {
    match key {
        "f" | "F" | "Enter" => Some(Intent::FireReleased),
        _ => None,
    }
}
