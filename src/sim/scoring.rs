//! Scoring and combo tracking
//!
//! Two independent mechanisms feed the score:
//! - the combo counter, extended by destructions inside the combo window and
//!   paid out as a flat bonus;
//! - the score multiplier, raised only by combo special bricks and reset to 1
//!   once its own expiry passes.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Base points for a brick by its starting hit points
pub fn base_points(max_hp: u8, tuning: &Tuning) -> u32 {
    let tier = max_hp.clamp(1, 3) as usize - 1;
    tuning.brick_points[tier]
}

/// Combo counter and score multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    /// Consecutive destructions inside the combo window
    pub count: u32,
    pub last_hit_ms: Option<f64>,
    /// Combo label stays visible until this time
    pub display_until: f64,
    pub multiplier: f32,
    pub multiplier_until: f64,
    pub last_combo_brick_ms: Option<f64>,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            last_hit_ms: None,
            display_until: 0.0,
            multiplier: 1.0,
            multiplier_until: 0.0,
            last_combo_brick_ms: None,
        }
    }
}

impl ComboState {
    /// Register a destruction at `now` and return the points it awards
    pub fn register_destruction(&mut self, now: f64, base: u32, tuning: &Tuning) -> u64 {
        self.decay(now);

        let mut points = (base as f32 * self.multiplier).round() as u64;
        let chained = self
            .last_hit_ms
            .is_some_and(|last| now - last < tuning.combo_window_ms);
        if chained {
            self.count += 1;
            points += self.count as u64 * tuning.combo_bonus_per_step as u64;
            self.display_until = now + tuning.combo_display_ms;
        } else {
            self.count = 1;
        }
        self.last_hit_ms = Some(now);
        points
    }

    /// A combo brick was destroyed: raise the multiplier and refresh its expiry
    pub fn trigger_combo_brick(&mut self, now: f64, tuning: &Tuning) {
        self.decay(now);

        let chained = self
            .last_combo_brick_ms
            .is_some_and(|last| now - last < tuning.combo_brick_window_ms);
        let raised = if chained {
            self.multiplier + tuning.combo_brick_increment
        } else {
            self.multiplier.max(1.0 + tuning.combo_brick_increment)
        };
        self.multiplier = raised.min(tuning.combo_brick_cap);
        self.multiplier_until = now + tuning.multiplier_duration_ms;
        self.last_combo_brick_ms = Some(now);
    }

    /// Reset the multiplier to exactly 1 once its expiry has passed
    pub fn decay(&mut self, now: f64) {
        if self.multiplier != 1.0 && now >= self.multiplier_until {
            log::debug!("Score multiplier x{} expired", self.multiplier);
            self.multiplier = 1.0;
        }
    }

    pub fn display_label(&self, now: f64) -> Option<String> {
        (self.count >= 2 && now < self.display_until).then(|| format!("COMBO x{}", self.count))
    }
}
