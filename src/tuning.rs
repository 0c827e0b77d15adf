//! Data-driven game balance
//!
//! Every hand-tuned constant that shapes difficulty lives here so balance can
//! change without touching collision or scoring code. Durations are in
//! milliseconds of simulation clock, speeds in px per 1/60 s frame.

use serde::{Deserialize, Serialize};

/// Errors from loading or validating a tuning table
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tuning value `{field}` is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

/// Balance table for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Ball speed ===
    pub ball_base_speed: f32,
    pub ball_speed_per_level: f32,
    /// Added once per `bricks_per_speed_step` bricks destroyed this level
    pub ball_speed_per_step: f32,
    pub bricks_per_speed_step: u32,
    pub ball_max_speed: f32,

    // === Lifecycle ===
    pub starting_lives: u8,
    pub level_complete_delay_ms: f64,
    /// Upper clamp on a single `advance` step (seconds)
    pub max_dt: f32,

    // === Scoring ===
    /// Base points indexed by `max_hp - 1`
    pub brick_points: [u32; 3],
    pub combo_window_ms: f64,
    pub combo_bonus_per_step: u32,
    pub combo_display_ms: f64,
    pub combo_brick_window_ms: f64,
    pub combo_brick_increment: f32,
    pub combo_brick_cap: f32,
    pub multiplier_duration_ms: f64,

    // === Power-ups ===
    pub power_up_chance: f32,
    pub power_up_fall_speed: f32,
    pub phase_ms: f64,
    pub slow_ms: f64,
    pub slow_factor: f32,
    pub powersurge_ms: f64,
    pub powersurge_factor: f32,
    pub widen_ms: f64,
    pub widen_factor: f32,
    pub gravity_field_ms: f64,
    pub gravity_field_factor: f32,
    /// Horizontal pull applied to falling power-ups (px per frame)
    pub gravity_field_pull: f32,
    pub boost_ms: f64,
    pub boost_factor: f32,
    pub magnet_ms: f64,
    pub plasma_pierce: u32,
    /// Angle between a split ball and its parent (radians)
    pub split_angle: f32,

    // === Special bricks ===
    /// Explosion half extents as multiples of the brick's own size
    pub explosion_reach: f32,
    pub freeze_ms: f64,
    pub freeze_factor: f32,

    // === Tactical abilities ===
    pub shockwave_cooldown_ms: f64,
    pub timeslow_cooldown_ms: f64,
    pub timeslow_ms: f64,
    pub timeslow_factor: f32,
    pub targetlock_cooldown_ms: f64,
    pub targetlock_ms: f64,

    // === Ultimate ===
    pub meter_per_brick: f32,
    pub meter_per_charge: f32,
    pub overload_fraction: f32,
    pub black_hole_ms: f64,
    /// Brick drift toward the black hole (px per second)
    pub black_hole_pull: f32,
    pub black_hole_radius: f32,
    pub beam_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_base_speed: 4.0,
            ball_speed_per_level: 0.3,
            ball_speed_per_step: 0.15,
            bricks_per_speed_step: 10,
            ball_max_speed: 8.0,

            starting_lives: 3,
            level_complete_delay_ms: 1600.0,
            max_dt: 0.05,

            brick_points: [10, 25, 40],
            combo_window_ms: 2000.0,
            combo_bonus_per_step: 5,
            combo_display_ms: 1200.0,
            combo_brick_window_ms: 5000.0,
            combo_brick_increment: 0.5,
            combo_brick_cap: 3.0,
            multiplier_duration_ms: 8000.0,

            power_up_chance: 0.10,
            power_up_fall_speed: 2.0,
            phase_ms: 8000.0,
            slow_ms: 8000.0,
            slow_factor: 0.55,
            powersurge_ms: 7000.0,
            powersurge_factor: 1.35,
            widen_ms: 10000.0,
            widen_factor: 1.5,
            gravity_field_ms: 10000.0,
            gravity_field_factor: 1.3,
            gravity_field_pull: 3.0,
            boost_ms: 8000.0,
            boost_factor: 1.8,
            magnet_ms: 12000.0,
            plasma_pierce: 5,
            split_angle: 0.5,

            explosion_reach: 1.5,
            freeze_ms: 3000.0,
            freeze_factor: 0.6,

            shockwave_cooldown_ms: 10000.0,
            timeslow_cooldown_ms: 20000.0,
            timeslow_ms: 5000.0,
            timeslow_factor: 0.5,
            targetlock_cooldown_ms: 15000.0,
            targetlock_ms: 6000.0,

            meter_per_brick: 2.0,
            meter_per_charge: 25.0,
            overload_fraction: 0.3,
            black_hole_ms: 3000.0,
            black_hole_pull: 90.0,
            black_hole_radius: 200.0,
            beam_ms: 2500.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning table over the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Target ball speed for a level, rising with bricks destroyed and capped
    pub fn target_ball_speed(&self, level: u32, bricks_destroyed: u32) -> f32 {
        let steps = bricks_destroyed / self.bricks_per_speed_step.max(1);
        let speed = self.ball_base_speed
            + level.saturating_sub(1) as f32 * self.ball_speed_per_level
            + steps as f32 * self.ball_speed_per_step;
        speed.min(self.ball_max_speed)
    }

    /// Check every value is usable by the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        fn out_of_range(field: &'static str, reason: impl Into<String>) -> TuningError {
            TuningError::OutOfRange {
                field,
                reason: reason.into(),
            }
        }

        if !(self.ball_base_speed > 0.0) {
            return Err(out_of_range("ball_base_speed", "must be positive"));
        }
        if !(self.ball_max_speed >= self.ball_base_speed) {
            return Err(out_of_range(
                "ball_max_speed",
                "must be at least ball_base_speed",
            ));
        }
        if self.ball_speed_per_level < 0.0 || self.ball_speed_per_step < 0.0 {
            return Err(out_of_range(
                "ball_speed_per_level",
                "speed increments cannot be negative",
            ));
        }
        if self.starting_lives == 0 {
            return Err(out_of_range("starting_lives", "must be at least 1"));
        }
        if !(self.max_dt > 0.0 && self.max_dt <= 0.25) {
            return Err(out_of_range("max_dt", "must be in (0, 0.25]"));
        }
        if !(0.0..=1.0).contains(&self.power_up_chance) {
            return Err(out_of_range("power_up_chance", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.overload_fraction) {
            return Err(out_of_range("overload_fraction", "must be in [0, 1]"));
        }
        if self.combo_brick_cap < 1.0 {
            return Err(out_of_range("combo_brick_cap", "must be at least 1"));
        }

        let durations = [
            ("level_complete_delay_ms", self.level_complete_delay_ms),
            ("combo_window_ms", self.combo_window_ms),
            ("combo_brick_window_ms", self.combo_brick_window_ms),
            ("multiplier_duration_ms", self.multiplier_duration_ms),
            ("phase_ms", self.phase_ms),
            ("slow_ms", self.slow_ms),
            ("powersurge_ms", self.powersurge_ms),
            ("widen_ms", self.widen_ms),
            ("gravity_field_ms", self.gravity_field_ms),
            ("boost_ms", self.boost_ms),
            ("magnet_ms", self.magnet_ms),
            ("freeze_ms", self.freeze_ms),
            ("timeslow_ms", self.timeslow_ms),
            ("targetlock_ms", self.targetlock_ms),
            ("black_hole_ms", self.black_hole_ms),
            ("beam_ms", self.beam_ms),
        ];
        for (field, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return Err(out_of_range(field, "duration must be positive"));
            }
        }

        let factors = [
            ("slow_factor", self.slow_factor),
            ("powersurge_factor", self.powersurge_factor),
            ("widen_factor", self.widen_factor),
            ("gravity_field_factor", self.gravity_field_factor),
            ("boost_factor", self.boost_factor),
            ("freeze_factor", self.freeze_factor),
            ("timeslow_factor", self.timeslow_factor),
        ];
        for (field, value) in factors {
            if !(value.is_finite() && value > 0.0) {
                return Err(out_of_range(field, "factor must be positive"));
            }
        }

        let magnitudes = [
            ("gravity_field_pull", self.gravity_field_pull),
            ("split_angle", self.split_angle),
            ("explosion_reach", self.explosion_reach),
            ("meter_per_brick", self.meter_per_brick),
            ("meter_per_charge", self.meter_per_charge),
            ("black_hole_pull", self.black_hole_pull),
            ("black_hole_radius", self.black_hole_radius),
        ];
        for (field, value) in magnitudes {
            if !(value.is_finite() && value >= 0.0) {
                return Err(out_of_range(field, "must be finite and non-negative"));
            }
        }

        Ok(())
    }
}
