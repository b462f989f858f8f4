//! Kill-streak combo counter

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    /// Consecutive kills without a gap longer than the timeout
    pub count: u32,
    /// Session time of the most recent kill
    pub last_kill_ms: Option<f64>,
}

impl Combo {
    /// Register a kill at `now_ms`; returns the new count. A kill landing
    /// after the window has lapsed starts a fresh streak.
    pub fn on_kill(&mut self, now_ms: f64, timeout_ms: f64) -> u32 {
        self.decay(now_ms, timeout_ms);
        self.count += 1;
        self.last_kill_ms = Some(now_ms);
        self.count
    }

    /// Drop the streak once more than `timeout_ms` has passed since the last kill.
    /// Returns true if the combo was reset.
    pub fn decay(&mut self, now_ms: f64, timeout_ms: f64) -> bool {
        if self.count == 0 {
            return false;
        }
        match self.last_kill_ms {
            Some(last) if now_ms - last > timeout_ms => {
                self.count = 0;
                true
            }
            _ => false,
        }
    }

    /// Score multiplier when combos scale score (never below 1)
    pub fn multiplier(&self) -> u64 {
        u64::from(self.count.max(1))
    }

}

/// Add a kill's points to the score; returns the points awarded
pub fn award_points(score: &mut u64, points: u64, combo: &Combo, scales_with_combo: bool) -> u64 {
    let gained = if scales_with_combo {
        points.saturating_mul(combo.multiplier())
    } else {
        points
    };
    *score = score.saturating_add(gained);
    gained
}
