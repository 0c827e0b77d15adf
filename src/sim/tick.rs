//! Frame-driven simulation tick
//!
//! `advance` is the only per-frame mutating entry point. It clamps `dt`,
//! runs one frame of gameplay when running, counts down the level-complete
//! delay, and returns a snapshot carrying the events of the frame.

use super::abilities::update_ultimate;
use super::physics::step_balls;
use super::powerups::{ball_time_scale, expire_effects, update_power_ups};
use super::snapshot::Snapshot;
use super::state::{GameEvent, GameState, GameStatus};

/// Advance the game by `dt` seconds and return a snapshot of the result
pub fn advance(state: &mut GameState, dt: f32) -> Snapshot {
    let dt = clamp_dt(dt, state.tuning.max_dt);

    match state.status {
        GameStatus::Running => run_frame(state, dt),
        GameStatus::LevelComplete => {
            state.clock_ms += dt as f64 * 1000.0;
            if state.clock_ms >= state.level_complete_until {
                start_next_level(state);
            }
        }
        GameStatus::Idle | GameStatus::Paused | GameStatus::GameOver => {}
    }

    let events = state.drain_events();
    Snapshot::capture(state, events)
}

/// Non-finite or negative becomes 0, long frames are cut to `max_dt`
fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, max_dt)
    } else {
        0.0
    }
}

fn run_frame(state: &mut GameState, dt: f32) {
    state.clock_ms += dt as f64 * 1000.0;
    let now = state.clock_ms;

    // Reverts land on the exact tick their expiry is reached
    expire_effects(state);

    state.ball_speed = state.target_speed();
    state.paddle.move_toward_target(dt, state.field_width);
    for brick in &mut state.bricks {
        brick.advance_wobble(dt);
    }

    let time_scale = ball_time_scale(state);
    step_balls(state, dt, time_scale);
    update_power_ups(state, dt);
    update_ultimate(state, dt);
    state.combo.decay(now);

    if state.all_bricks_cleared() {
        complete_level(state);
    } else if state.balls.is_empty() {
        lose_life(state);
    }
}

fn complete_level(state: &mut GameState) {
    state.status = GameStatus::LevelComplete;
    state.level_complete_until = state.clock_ms + state.tuning.level_complete_delay_ms;
    log::info!("Level {} complete, score {}", state.level, state.score);
    state.emit(GameEvent::LevelComplete { level: state.level });
}

fn start_next_level(state: &mut GameState) {
    state.level += 1;
    state.load_level();
    state.spawn_launched_ball();
    state.power_ups.clear();
    state.ultimate.active = None;
    state.status = GameStatus::Running;
    log::info!("Level {} started ({} bricks)", state.level, state.bricks.len());
    state.emit(GameEvent::LevelStarted { level: state.level });
}

fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);

    if state.lives == 0 {
        state.status = GameStatus::GameOver;
        if !state.score_submitted {
            state.score_submitted = true;
            log::info!("Game over at level {} with score {}", state.level, state.score);
            state.emit(GameEvent::GameOver {
                score: state.score,
                level: state.level,
            });
        }
        return;
    }

    log::debug!("Life lost, {} left", state.lives);
    state.spawn_launched_ball();
    state.emit(GameEvent::LifeLost {
        lives_left: state.lives,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::destruction::{Strike, resolve_strikes};
    use crate::sim::input::{InputEvent, handle_input};
    use crate::sim::state::{ActiveUltimate, Ball, EffectKind, PowerUp, PowerUpKind};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn running(seed: u64, tuning: Tuning) -> GameState {
        let mut state = GameState::with_tuning(seed, tuning);
        handle_input(&mut state, InputEvent::PrimaryAction);
        state.drain_events();
        state
    }

    fn no_drops() -> Tuning {
        Tuning {
            power_up_chance: 0.0,
            ..Tuning::default()
        }
    }

    /// Pin the only ball to the paddle so it can neither hit bricks nor drain
    fn park_ball(state: &mut GameState) {
        let ball = &mut state.balls[0];
        ball.vel = Vec2::ZERO;
        ball.caught_offset = Some(0.5);
        state.caught_ball = Some(state.balls[0].id);
    }

    #[test]
    fn test_idle_and_paused_are_frozen() {
        let mut state = GameState::new(3);
        let pos = state.balls[0].pos;
        advance(&mut state, DT);
        assert_eq!(state.clock_ms, 0.0);
        assert_eq!(state.balls[0].pos, pos);

        handle_input(&mut state, InputEvent::PrimaryAction);
        let now = state.clock_ms;
        state.effects.activate(EffectKind::Widen, now + 100.0);
        handle_input(&mut state, InputEvent::TogglePause);
        let pos = state.balls[0].pos;
        for _ in 0..600 {
            advance(&mut state, DT);
        }
        assert_eq!(state.clock_ms, now);
        assert_eq!(state.balls[0].pos, pos);
        assert!(state.effects.is_active(EffectKind::Widen, state.clock_ms));
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = running(3, no_drops());
        advance(&mut state, 1.0);
        assert!((state.clock_ms - 50.0).abs() < 1e-6);
        advance(&mut state, f32::NAN);
        advance(&mut state, -1.0);
        assert!((state.clock_ms - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_spaced_destruction_completes_level() {
        let mut state = running(8, no_drops());
        park_ball(&mut state);
        assert_eq!(state.bricks.len(), 55);

        let mut entered = Vec::new();
        for index in 0..55 {
            state.clock_ms += 2500.0;
            resolve_strikes(&mut state, [Strike::Damage(index)]);
            let snap = advance(&mut state, DT);
            entered.extend(
                snap.events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::LevelComplete { .. }))
                    .map(|_| index),
            );
            if index < 54 {
                assert_eq!(snap.status, GameStatus::Running);
            }
        }
        assert_eq!(entered, vec![54]);
        assert_eq!(state.status, GameStatus::LevelComplete);
        assert_eq!(state.score, 550);
        assert_eq!(state.combo.multiplier, 1.0);

        let mut started = false;
        for _ in 0..40 {
            let snap = advance(&mut state, 0.05);
            started |= snap.events.contains(&GameEvent::LevelStarted { level: 2 });
        }
        assert!(started);
        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.level, 2);
        assert_eq!(state.bricks_destroyed, 0);
        assert!(!state.bricks.is_empty());
        assert!(state.bricks.iter().all(|b| b.alive));
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.caught_ball, None);
    }

    #[test]
    fn test_next_level_clears_drops_and_ultimate() {
        let mut state = running(8, no_drops());
        park_ball(&mut state);
        let all: Vec<Strike> = (0..state.bricks.len()).map(Strike::Destroy).collect();
        resolve_strikes(&mut state, all);
        advance(&mut state, DT);
        assert_eq!(state.status, GameStatus::LevelComplete);

        let now = state.clock_ms;
        state.power_ups.push(PowerUp {
            id: 700,
            kind: PowerUpKind::Nuke,
            pos: Vec2::new(200.0, 300.0),
            vy: 2.0,
        });
        state.ultimate.active = Some(ActiveUltimate::Beam {
            y: 120.0,
            started_at: now,
            ends_at: now + 60_000.0,
        });

        for _ in 0..40 {
            advance(&mut state, 0.05);
        }
        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.level, 2);
        assert!(state.power_ups.is_empty());
        assert!(state.ultimate.active.is_none());
    }

    #[test]
    fn test_wobble_advances_for_live_bricks_only() {
        let mut state = running(8, no_drops());
        park_ball(&mut state);
        for brick in &mut state.bricks {
            brick.wobble = 0.0;
            brick.wobble_speed = 1.5;
        }
        resolve_strikes(&mut state, [Strike::Destroy(0)]);

        advance(&mut state, 0.05);
        assert_eq!(state.bricks[0].wobble, 0.0);
        assert!(state.bricks[1..].iter().all(|b| (b.wobble - 0.075).abs() < 1e-6));
    }

    #[test]
    fn test_level_complete_ignores_input_until_next_level() {
        let mut state = running(8, no_drops());
        park_ball(&mut state);
        let all: Vec<Strike> = (0..state.bricks.len()).map(Strike::Destroy).collect();
        resolve_strikes(&mut state, all);
        advance(&mut state, DT);
        assert_eq!(state.status, GameStatus::LevelComplete);

        handle_input(&mut state, InputEvent::TogglePause);
        advance(&mut state, 0.05);
        assert_eq!(state.status, GameStatus::LevelComplete);
    }

    #[test]
    fn test_last_drain_ends_game_once() {
        let mut state = running(4, no_drops());
        state.lives = 1;
        state.balls = vec![Ball::new(999, Vec2::new(50.0, 985.0), Vec2::new(0.0, 4.0))];

        let mut game_overs = 0;
        for _ in 0..10 {
            let snap = advance(&mut state, DT);
            game_overs += snap
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                .count();
        }
        assert_eq!(state.lives, 0);
        assert_eq!(state.status, GameStatus::GameOver);
        assert!(state.score_submitted);
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_life_loss_respawns_and_keeps_combo() {
        let mut state = running(4, no_drops());
        state.combo.count = 4;
        state.balls = vec![Ball::new(999, Vec2::new(50.0, 985.0), Vec2::new(0.0, 4.0))];

        let snap = advance(&mut state, DT);
        assert!(snap.events.contains(&GameEvent::LifeLost { lives_left: 2 }));
        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.balls.len(), 1);
        assert!(state.balls[0].vel.y < 0.0);
        assert_eq!(state.paddle.center(), PLAYFIELD_WIDTH / 2.0);
        assert_eq!(state.combo.count, 4);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut state = running(4, no_drops());
        state.lives = 1;
        state.balls.clear();
        advance(&mut state, DT);
        assert_eq!(state.status, GameStatus::GameOver);

        handle_input(&mut state, InputEvent::PrimaryAction);
        assert_eq!(state.status, GameStatus::Running);
        assert!(!state.score_submitted);
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut state = running(seed, Tuning::default());
            let mut x = 100.0;
            for i in 0..900 {
                if i % 30 == 0 {
                    x = (x + 173.0) % PLAYFIELD_WIDTH;
                    handle_input(&mut state, InputEvent::PointerMove { x });
                }
                advance(&mut state, DT);
            }
            (state.score, state.lives, state.balls.iter().map(|b| b.pos).collect::<Vec<_>>())
        };
        assert_eq!(run(77), run(77));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn ball_speed_matches_target_after_every_tick(
            seed in any::<u64>(),
            frames in prop::collection::vec((0.0f32..0.08, 0.0f32..720.0), 1..240),
        ) {
            let mut state = running(seed, Tuning::default());
            for (dt, x) in frames {
                handle_input(&mut state, InputEvent::PointerMove { x });
                advance(&mut state, dt);
                if state.status != GameStatus::Running {
                    continue;
                }
                for ball in state.balls.iter().filter(|b| !b.is_caught()) {
                    prop_assert!(ball.is_finite());
                    prop_assert!((ball.speed() - state.ball_speed).abs() < 1e-3);
                }
                prop_assert!(state.ball_speed <= state.tuning.ball_max_speed);
            }
        }

        #[test]
        fn destroyed_bricks_stay_destroyed(seed in any::<u64>(), ticks in 60usize..400) {
            let mut state = running(seed, Tuning::default());
            let mut dead = std::collections::HashSet::new();
            for _ in 0..ticks {
                let level = state.level;
                advance(&mut state, DT);
                if state.level != level {
                    dead.clear();
                }
                for brick in &state.bricks {
                    if dead.contains(&brick.id) {
                        prop_assert!(!brick.alive);
                    }
                    if !brick.alive {
                        dead.insert(brick.id);
                    }
                }
            }
        }
    }
}
