//! Per-tick ball integration and collision resolution
//!
//! Order per free ball: integrate, trail, side walls, ceiling, paddle,
//! bricks (first overlap only), speed renormalization, drain. Caught balls
//! just ride on the paddle.

use glam::Vec2;

use super::collision::{
    bounce_axis, bounce_off_ceiling, bounce_off_side_walls, circle_rect_overlap,
    paddle_bounce_angle, reflect_velocity, renormalize, velocity_at_angle,
};
use super::destruction::{Strike, resolve_strikes};
use super::state::{Ball, EffectKind, GameEvent, GameState};
use crate::consts::*;

/// What happened to a ball during its step
enum BallOutcome {
    Live,
    Drained,
    /// Non-finite or directionless; must be replaced
    Degenerate,
}

/// Advance every ball by `dt` seconds, with integration scaled by `time_scale`
pub fn step_balls(state: &mut GameState, dt: f32, time_scale: f32) {
    let frames = dt * FRAME_RATE_SCALE * time_scale;
    let balls = std::mem::take(&mut state.balls);
    let mut kept = Vec::with_capacity(balls.len());

    for mut ball in balls {
        if ball.is_caught() {
            ball.follow_paddle(&state.paddle);
            kept.push(ball);
            continue;
        }

        match step_ball(state, &mut ball, frames) {
            BallOutcome::Live => kept.push(ball),
            BallOutcome::Drained => {
                log::debug!("Ball {} drained", ball.id);
            }
            BallOutcome::Degenerate => {
                log::warn!("Ball {} has non-finite state, relaunching from paddle", ball.id);
                let pos = Vec2::new(state.paddle.center(), state.paddle.y - BALL_RADIUS - 2.0);
                let replacement = state.launch_ball_from(pos);
                kept.push(replacement);
                state.emit(GameEvent::BallRecovered);
            }
        }
    }

    // Anything spawned while the list was detached
    kept.append(&mut state.balls);
    state.balls = kept;
}

fn step_ball(state: &mut GameState, ball: &mut Ball, frames: f32) -> BallOutcome {
    if !ball.is_finite() {
        return BallOutcome::Degenerate;
    }
    let r = BALL_RADIUS;

    ball.pos += ball.vel * frames;
    ball.record_trail();

    bounce_off_side_walls(&mut ball.pos, &mut ball.vel, r, state.field_width);
    bounce_off_ceiling(&mut ball.pos, &mut ball.vel, r);

    if hits_paddle(state, ball) {
        let now = state.clock_ms;
        let hit = state.paddle.hit_position(ball.pos.x);
        if state.effects.is_active(EffectKind::MagnetCatch, now) && state.caught_ball.is_none() {
            ball.vel = Vec2::ZERO;
            ball.caught_offset = Some(hit);
            ball.follow_paddle(&state.paddle);
            state.caught_ball = Some(ball.id);
            state.emit(GameEvent::BallCaught);
            return BallOutcome::Live;
        }
        ball.vel = velocity_at_angle(paddle_bounce_angle(hit), ball.vel.length());
        ball.pos.y = state.paddle.y - r;
    }

    collide_bricks(state, ball);

    match renormalize(ball.vel, state.ball_speed) {
        Some(vel) if ball.pos.is_finite() => ball.vel = vel,
        _ => return BallOutcome::Degenerate,
    }

    if ball.pos.y > state.field_height + DRAIN_MARGIN {
        if !state.shield {
            return BallOutcome::Drained;
        }
        state.shield = false;
        ball.pos.y = state.paddle.y - r;
        ball.vel.y = -ball.vel.y.abs();
        log::debug!("Shield absorbed a drain");
        state.emit(GameEvent::ShieldConsumed);
    }

    BallOutcome::Live
}

/// Moving down, bottom edge inside the paddle band, center over the paddle
fn hits_paddle(state: &GameState, ball: &Ball) -> bool {
    let paddle = &state.paddle;
    let bottom = ball.pos.y + BALL_RADIUS;
    ball.vel.y > 0.0
        && bottom >= paddle.y
        && bottom <= paddle.y + paddle.height + PADDLE_BAND_SLACK
        && paddle.spans(ball.pos.x)
}

/// Resolve the first live brick the ball overlaps. A brick the ball is
/// already passing through is skipped until the overlap ends.
fn collide_bricks(state: &mut GameState, ball: &mut Ball) {
    if let Some(id) = ball.inside_brick {
        let still_inside = state.bricks.iter().any(|b| {
            b.id == id
                && b.alive
                && circle_rect_overlap(ball.pos, BALL_RADIUS, &b.collision_rect())
        });
        if !still_inside {
            ball.inside_brick = None;
        }
    }

    let Some((index, id, rect)) = state
        .bricks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.alive && ball.inside_brick != Some(b.id))
        .map(|(i, b)| (i, b.id, b.collision_rect()))
        .find(|(_, _, rect)| circle_rect_overlap(ball.pos, BALL_RADIUS, rect))
    else {
        return;
    };

    if state.effects.is_active(EffectKind::Phase, state.clock_ms) {
        ball.inside_brick = Some(id);
    } else if ball.pierce_left > 0 {
        ball.pierce_left -= 1;
        ball.inside_brick = Some(id);
    } else {
        let axis = bounce_axis(ball.pos, BALL_RADIUS, &rect);
        ball.vel = reflect_velocity(ball.vel, axis.normal());
    }

    resolve_strikes(state, [Strike::Damage(index)]);
}
