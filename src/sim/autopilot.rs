//! Demo mode steering
//!
//! Produces the inputs a simple player would send: follow the most dangerous
//! ball, grab power-ups when nothing is coming down, release caught balls,
//! and restart after game over. Reads state only.

use super::input::InputEvent;
use super::state::{GameState, GameStatus};

/// Below this fraction of the playfield height a descending ball is a threat
const DANGER_LINE: f32 = 0.55;

pub fn autopilot_inputs(state: &GameState) -> Vec<InputEvent> {
    match state.status {
        GameStatus::Idle | GameStatus::GameOver => return vec![InputEvent::PrimaryAction],
        GameStatus::Running => {}
        GameStatus::Paused | GameStatus::LevelComplete => return Vec::new(),
    }

    let mut inputs = Vec::new();
    if state.caught_ball.is_some() {
        inputs.push(InputEvent::PrimaryAction);
    }

    // Lowest ball on its way down
    let threat = state
        .balls
        .iter()
        .filter(|b| !b.is_caught() && b.vel.y > 0.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let danger_y = state.field_height * DANGER_LINE;
    let target = match threat {
        Some(ball) if ball.pos.y > danger_y || state.power_ups.is_empty() => {
            // Aim slightly off-center so rebounds vary
            let wobble = (state.clock_ms as f32 * 0.002).sin() * state.paddle.width * 0.2;
            Some(ball.pos.x + wobble)
        }
        _ => state
            .power_ups
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|p| p.pos.x)
            .or_else(|| state.balls.first().map(|b| b.pos.x)),
    };

    if let Some(x) = target {
        inputs.push(InputEvent::PointerMove { x });
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::handle_input;
    use crate::sim::state::Ball;
    use crate::sim::tick::advance;
    use glam::Vec2;

    #[test]
    fn test_starts_idle_game() {
        let state = GameState::new(1);
        assert_eq!(autopilot_inputs(&state), vec![InputEvent::PrimaryAction]);
    }

    #[test]
    fn test_tracks_lowest_descending_ball() {
        let mut state = GameState::new(1);
        handle_input(&mut state, InputEvent::PrimaryAction);
        state.balls = vec![
            Ball::new(50, Vec2::new(100.0, 800.0), Vec2::new(1.0, 3.0)),
            Ball::new(51, Vec2::new(600.0, 850.0), Vec2::new(1.0, -3.0)),
            Ball::new(52, Vec2::new(300.0, 500.0), Vec2::new(1.0, 3.0)),
        ];
        let inputs = autopilot_inputs(&state);
        let Some(InputEvent::PointerMove { x }) = inputs.last().copied() else {
            panic!("expected a pointer move");
        };
        assert!((x - 100.0).abs() <= state.paddle.width * 0.2 + 1e-3);
    }

    #[test]
    fn test_demo_survives_a_while() {
        let mut state = GameState::new(21);
        let mut best = 0;
        for _ in 0..1800 {
            for input in autopilot_inputs(&state) {
                handle_input(&mut state, input);
            }
            advance(&mut state, 1.0 / 60.0);
            best = best.max(state.score);
        }
        assert!(best > 0);
    }
}
