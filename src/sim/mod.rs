//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Simulation clock advanced only by `advance`
//! - Stable iteration order (by brick/ball index)
//! - No rendering, storage or network dependencies

pub mod abilities;
pub mod autopilot;
pub mod collision;
pub mod destruction;
pub mod input;
pub mod level;
pub mod physics;
pub mod powerups;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use abilities::{activate_ultimate, cycle_ultimate, use_tactical};
pub use autopilot::autopilot_inputs;
pub use collision::Rect;
pub use input::{InputEvent, handle_input};
pub use level::{LayoutPattern, build_level};
pub use scoring::ComboState;
pub use snapshot::Snapshot;
pub use state::{
    ActiveEffects, ActiveUltimate, Ball, Brick, BrickSpecial, EffectKind, GameEvent, GameState,
    GameStatus, Paddle, PowerUp, PowerUpKind, TacticalKind, ULTIMATE_METER_MAX, UltimateKind,
};
pub use tick::advance;
