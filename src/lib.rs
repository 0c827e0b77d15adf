//! Portal Breaker - a breakout arcade simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integration, collisions, abilities, scoring, levels)
//! - `tuning`: Data-driven game balance
//! - `session`: Adapter-side owner of a run (leaderboard submission, best score)
//! - `leaderboard`: Score records and the local high score table
//! - `persistence`: Key-value storage backends
//! - `web`: Browser bindings (wasm32 only)

pub mod leaderboard;
pub mod persistence;
pub mod session;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use leaderboard::{HighScores, LeaderboardError, LeaderboardSink, ScoreRecord};
pub use persistence::{KeyValueStore, MemoryStore, StorageError};
pub use session::Session;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Logical playfield dimensions (adapter scales to device pixels)
    pub const PLAYFIELD_WIDTH: f32 = 720.0;
    pub const PLAYFIELD_HEIGHT: f32 = 960.0;

    /// Velocities are expressed per 1/60 s frame; integration scales by this
    pub const FRAME_RATE_SCALE: f32 = 60.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 7.0;
    pub const TRAIL_LENGTH: usize = 12;
    /// Launch direction jitter around straight up (radians, total spread)
    pub const LAUNCH_SPREAD: f32 = 0.6;
    /// Balls below `height + DRAIN_MARGIN` are drained
    pub const DRAIN_MARGIN: f32 = 20.0;

    /// Paddle defaults
    pub const PADDLE_BASE_WIDTH: f32 = 160.0;
    pub const PADDLE_HEIGHT: f32 = 14.0;
    /// Paddle top edge sits this far above the bottom of the playfield
    pub const PADDLE_BOTTOM_OFFSET: f32 = 36.0;
    /// Extra vertical reach of the paddle band below its bottom edge
    pub const PADDLE_BAND_SLACK: f32 = 4.0;
    /// Base paddle slide speed (px per frame)
    pub const PADDLE_SLIDE_SPEED: f32 = 14.0;

    /// Brick grid
    pub const BRICK_COLS: u32 = 11;
    pub const BRICK_BASE_ROWS: u32 = 5;
    pub const BRICK_MAX_ROWS: u32 = 8;
    pub const BRICK_HEIGHT: f32 = 18.0;
    pub const BRICK_PAD: f32 = 4.0;
    pub const BRICK_SIDE_MARGIN: f32 = 20.0;
    pub const BRICK_TOP_OFFSET: f32 = 100.0;
    /// Horizontal wobble amplitude applied to a brick's collision x-bound
    pub const WOBBLE_AMPLITUDE: f32 = 2.0;

    /// Falling power-up collection reach below its center
    pub const POWER_UP_REACH: f32 = 10.0;
    /// Half width of the laser column centered on the paddle
    pub const LASER_HALF_WIDTH: f32 = 12.0;
}

/// Clamp an externally supplied coordinate into `[lo, hi]`, rejecting NaN/inf
#[inline]
pub fn sanitize_coord(value: f32, lo: f32, hi: f32) -> Option<f32> {
    value.is_finite().then(|| value.clamp(lo, hi))
}
