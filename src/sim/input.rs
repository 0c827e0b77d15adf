//! Discrete input handlers
//!
//! Inputs mutate the state synchronously; their results show up in the next
//! `advance` and the next snapshot. Nothing is processed during the
//! level-complete celebration.

use serde::{Deserialize, Serialize};

use super::abilities::{activate_ultimate, cycle_ultimate, use_tactical};
use super::state::{GameState, GameStatus, TacticalKind};

/// Input commands from the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer/touch x in playfield coordinates
    PointerMove { x: f32 },
    /// Start/restart when idle or game over, release a caught ball while running
    PrimaryAction,
    TogglePause,
    Tactical(TacticalKind),
    ActivateUltimate,
    CycleUltimate,
}

impl InputEvent {
    /// Keyboard binding (DOM `KeyboardEvent.key` names)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Enter" => Some(InputEvent::PrimaryAction),
            "p" | "P" | "Escape" => Some(InputEvent::TogglePause),
            "1" => Some(InputEvent::Tactical(TacticalKind::Shockwave)),
            "2" => Some(InputEvent::Tactical(TacticalKind::TimeSlow)),
            "3" => Some(InputEvent::Tactical(TacticalKind::TargetLock)),
            "q" | "Q" => Some(InputEvent::ActivateUltimate),
            "e" | "E" => Some(InputEvent::CycleUltimate),
            _ => None,
        }
    }
}

/// Apply one input event. Invalid inputs are ignored.
pub fn handle_input(state: &mut GameState, event: InputEvent) {
    if state.status == GameStatus::LevelComplete {
        return;
    }

    match event {
        InputEvent::PointerMove { x } => {
            if let Some(x) = crate::sanitize_coord(x, 0.0, state.field_width) {
                state.paddle.set_target(x);
            }
        }
        InputEvent::PrimaryAction => match state.status {
            GameStatus::Idle | GameStatus::GameOver => state.start_new_game(),
            GameStatus::Running => {
                state.release_caught_ball();
            }
            GameStatus::Paused | GameStatus::LevelComplete => {}
        },
        InputEvent::TogglePause => match state.status {
            GameStatus::Running => {
                state.status = GameStatus::Paused;
                log::debug!("Paused");
            }
            GameStatus::Paused => {
                state.status = GameStatus::Running;
                log::debug!("Resumed");
            }
            _ => {}
        },
        InputEvent::Tactical(kind) => {
            use_tactical(state, kind);
        }
        InputEvent::ActivateUltimate => {
            activate_ultimate(state);
        }
        InputEvent::CycleUltimate => cycle_ultimate(state),
    }
}
