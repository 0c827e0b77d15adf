//! Power-up drops, collection and timed effects
//!
//! Timed effects are stored in `ActiveEffects` keyed by `EffectKind`.
//! Paddle width and slide speed are always derived from the active set, so
//! they snap back to their base values on the exact tick an effect expires.

use glam::Vec2;
use rand::Rng;

use super::destruction::destroy_where;
use super::state::{Ball, EffectKind, GameEvent, GameState, PowerUp, PowerUpKind};
use crate::consts::*;

/// Roll the drop chance for a destroyed brick and spawn a power-up at `pos`
pub fn roll_drop(state: &mut GameState, pos: Vec2) {
    if state.tuning.power_up_chance <= 0.0 {
        return;
    }
    if state.rng.random::<f32>() >= state.tuning.power_up_chance {
        return;
    }
    let kind = pick_kind(state);
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp {
        id,
        kind,
        pos,
        vy: state.tuning.power_up_fall_speed,
    });
    state.emit(GameEvent::PowerUpSpawned(kind));
}

/// Weighted pick over every power-up kind
fn pick_kind(state: &mut GameState) -> PowerUpKind {
    let total: u32 = PowerUpKind::ALL.iter().map(|k| k.drop_weight()).sum();
    let mut roll = state.rng.random_range(0..total);
    for kind in PowerUpKind::ALL {
        let weight = kind.drop_weight();
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    PowerUpKind::Split
}

/// Move falling power-ups, collect those touching the paddle, drop the rest
/// once they leave the playfield
pub fn update_power_ups(state: &mut GameState, dt: f32) {
    let now = state.clock_ms;
    let frames = dt * FRAME_RATE_SCALE;
    let gravity_field = state.effects.is_active(EffectKind::GravityField, now);
    let pull = state.tuning.gravity_field_pull * frames;
    let paddle = state.paddle.clone();
    let drain_y = state.field_height + DRAIN_MARGIN;

    let mut collected: Vec<PowerUpKind> = Vec::new();
    state.power_ups.retain_mut(|pu| {
        pu.pos.y += pu.vy * frames;
        if gravity_field {
            let dx = paddle.center() - pu.pos.x;
            pu.pos.x += dx.clamp(-pull, pull);
        }

        let reached = pu.pos.y + POWER_UP_REACH >= paddle.y && pu.pos.y <= paddle.y + paddle.height;
        if reached && paddle.spans(pu.pos.x) {
            collected.push(pu.kind);
            false
        } else {
            pu.pos.y <= drain_y
        }
    });

    for kind in collected {
        apply_power_up(state, kind);
    }
}

/// Apply a collected power-up
pub fn apply_power_up(state: &mut GameState, kind: PowerUpKind) {
    let now = state.clock_ms;
    log::debug!("Power-up collected: {}", kind.label());
    state.emit(GameEvent::PowerUpCollected(kind));

    if let Some(effect) = kind.effect() {
        let until = now + effect.duration_ms(&state.tuning);
        state.effects.activate(effect, until);
        refresh_paddle_modifiers(state);
        return;
    }

    match kind {
        PowerUpKind::Plasma => {
            let charges = state.tuning.plasma_pierce;
            for ball in &mut state.balls {
                ball.pierce_left = charges;
            }
        }
        PowerUpKind::Split => split_ball(state),
        PowerUpKind::Nuke => {
            let centers = state.bricks.iter().filter(|b| b.alive).map(|b| b.center().y);
            let (min_y, max_y) = centers.fold((f32::MAX, f32::MIN), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            });
            if min_y <= max_y {
                let line = (min_y + max_y) / 2.0;
                let destroyed = destroy_where(state, |b| b.center().y >= line);
                log::debug!("Nuke destroyed {} bricks", destroyed);
            }
        }
        PowerUpKind::Laser => {
            let center = state.paddle.center();
            let (lo, hi) = (center - LASER_HALF_WIDTH, center + LASER_HALF_WIDTH);
            let destroyed = destroy_where(state, |b| b.x < hi && b.x + b.w > lo);
            log::debug!("Laser destroyed {} bricks", destroyed);
        }
        PowerUpKind::Shield => state.shield = true,
        // Timed kinds returned above
        _ => {}
    }
}

/// Spawn two extra balls fanned out from an existing free ball
fn split_ball(state: &mut GameState) {
    let source = state
        .balls
        .iter()
        .find(|b| !b.is_caught())
        .map(|b| (b.pos, b.vel, b.pierce_left, b.trail.clone()));

    let Some((pos, vel, pierce_left, trail)) = source else {
        // Nothing in flight: launch two fresh balls from the paddle instead
        for _ in 0..2 {
            let pos = Vec2::new(state.paddle.center(), state.paddle.y - BALL_RADIUS - 2.0);
            let ball = state.launch_ball_from(pos);
            state.balls.push(ball);
        }
        return;
    };

    let angle = state.tuning.split_angle;
    for offset in [angle, -angle] {
        let (sin, cos) = offset.sin_cos();
        let new_vel = Vec2::new(vel.x * cos - vel.y * sin, vel.x * sin + vel.y * cos);
        let id = state.next_entity_id();
        let mut ball = Ball::new(id, pos, new_vel);
        ball.pierce_left = pierce_left;
        ball.trail = trail.clone();
        state.balls.push(ball);
    }
}

/// Remove expired effects and revert whatever they changed
pub fn expire_effects(state: &mut GameState) {
    let expired = state.effects.expire(state.clock_ms);
    if expired.is_empty() {
        return;
    }

    for kind in &expired {
        match kind {
            EffectKind::TargetLock => {
                for brick in &mut state.bricks {
                    brick.highlighted = false;
                }
            }
            EffectKind::MagnetCatch => {
                state.release_caught_ball();
            }
            _ => {}
        }
        log::debug!("Effect expired: {}", kind.label());
        state.emit(GameEvent::EffectExpired(*kind));
    }
    refresh_paddle_modifiers(state);
}

/// Derive paddle width and slide speed from the active effects
pub fn refresh_paddle_modifiers(state: &mut GameState) {
    let now = state.clock_ms;
    let tuning = &state.tuning;

    let mut width_factor: f32 = 1.0;
    if state.effects.is_active(EffectKind::Widen, now) {
        width_factor = width_factor.max(tuning.widen_factor);
    }
    if state.effects.is_active(EffectKind::GravityField, now) {
        width_factor = width_factor.max(tuning.gravity_field_factor);
    }
    let speed_mult = if state.effects.is_active(EffectKind::Boost, now) {
        tuning.boost_factor
    } else {
        1.0
    };

    let width = state.paddle.base_width * width_factor;
    state.paddle.set_width(width, state.field_width);
    state.paddle.speed_mult = speed_mult;
}

/// Combined time-scale applied to ball integration this tick
pub fn ball_time_scale(state: &GameState) -> f32 {
    let now = state.clock_ms;
    let tuning = &state.tuning;
    [
        (EffectKind::Slow, tuning.slow_factor),
        (EffectKind::PowerSurge, tuning.powersurge_factor),
        (EffectKind::TimeSlow, tuning.timeslow_factor),
        (EffectKind::Freeze, tuning.freeze_factor),
    ]
    .into_iter()
    .filter(|&(kind, _)| state.effects.is_active(kind, now))
    .map(|(_, factor)| factor)
    .product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::destruction::tests::{grid_brick, quiet_state};
    use crate::sim::state::BrickSpecial;

    #[test]
    fn test_widen_reverts_exactly_on_expiry() {
        let mut state = quiet_state(vec![]);
        let base = state.paddle.base_width;
        apply_power_up(&mut state, PowerUpKind::Widen);
        assert_eq!(state.paddle.width, base * state.tuning.widen_factor);

        let end = state.effects.expires_at(EffectKind::Widen).expect("active");
        state.clock_ms = end - 1.0;
        expire_effects(&mut state);
        assert_eq!(state.paddle.width, base * state.tuning.widen_factor);

        state.clock_ms = end;
        expire_effects(&mut state);
        assert_eq!(state.paddle.width, base);
        assert!(state.events.contains(&GameEvent::EffectExpired(EffectKind::Widen)));
    }

    #[test]
    fn test_magnet_expiry_releases_held_ball() {
        let mut state = quiet_state(vec![]);
        let mut ball = Ball::new(900, Vec2::new(360.0, 900.0), Vec2::ZERO);
        ball.caught_offset = Some(0.25);
        state.balls = vec![ball];
        state.caught_ball = Some(900);
        apply_power_up(&mut state, PowerUpKind::MagnetCatch);

        let end = state.effects.expires_at(EffectKind::MagnetCatch).expect("active");
        state.clock_ms = end - 1.0;
        expire_effects(&mut state);
        assert_eq!(state.caught_ball, Some(900));
        assert!(state.balls[0].is_caught());

        state.clock_ms = end;
        expire_effects(&mut state);
        assert_eq!(state.caught_ball, None);
        let ball = &state.balls[0];
        assert!(!ball.is_caught());
        assert!(ball.vel.y < 0.0);
        assert!((ball.speed() - state.ball_speed).abs() < 1e-4);
        assert!(state.events.contains(&GameEvent::BallReleased));
        assert!(state.events.contains(&GameEvent::EffectExpired(EffectKind::MagnetCatch)));
    }

    #[test]
    fn test_overlapping_width_effects() {
        let mut state = quiet_state(vec![]);
        let base = state.paddle.base_width;
        apply_power_up(&mut state, PowerUpKind::Widen);
        state.clock_ms += 5000.0;
        apply_power_up(&mut state, PowerUpKind::GravityField);
        // Widen is larger and still running
        assert_eq!(state.paddle.width, base * 1.5);

        state.clock_ms = state.effects.expires_at(EffectKind::Widen).expect("widen");
        expire_effects(&mut state);
        assert_eq!(state.paddle.width, base * 1.3);

        state.clock_ms = state.effects.expires_at(EffectKind::GravityField).expect("field");
        expire_effects(&mut state);
        assert_eq!(state.paddle.width, base);
    }

    #[test]
    fn test_boost_reverts_speed() {
        let mut state = quiet_state(vec![]);
        apply_power_up(&mut state, PowerUpKind::Boost);
        assert_eq!(state.paddle.speed_mult, state.tuning.boost_factor);
        state.clock_ms += state.tuning.boost_ms;
        expire_effects(&mut state);
        assert_eq!(state.paddle.speed_mult, 1.0);
    }

    #[test]
    fn test_reactivation_refreshes_not_stacks() {
        let mut state = quiet_state(vec![]);
        apply_power_up(&mut state, PowerUpKind::Phase);
        state.clock_ms += 3000.0;
        apply_power_up(&mut state, PowerUpKind::Phase);
        assert_eq!(state.effects.len(), 1);
        assert_eq!(
            state.effects.expires_at(EffectKind::Phase),
            Some(state.clock_ms + state.tuning.phase_ms)
        );
    }

    #[test]
    fn test_time_scale_combines() {
        let mut state = quiet_state(vec![]);
        assert_eq!(ball_time_scale(&state), 1.0);
        apply_power_up(&mut state, PowerUpKind::Slow);
        assert!((ball_time_scale(&state) - 0.55).abs() < 1e-6);
        let now = state.clock_ms;
        state.effects.activate(EffectKind::Freeze, now + 100.0);
        assert!((ball_time_scale(&state) - 0.55 * 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_split_spawns_two_balls_same_speed() {
        let mut state = quiet_state(vec![]);
        state.balls[0].vel = Vec2::new(0.0, -4.0);
        state.balls[0].pierce_left = 2;
        apply_power_up(&mut state, PowerUpKind::Split);
        assert_eq!(state.balls.len(), 3);
        for ball in &state.balls {
            assert!((ball.speed() - 4.0).abs() < 1e-4);
            assert_eq!(ball.pierce_left, 2);
        }
        assert!(state.balls[1].vel.x * state.balls[2].vel.x < 0.0);
    }

    #[test]
    fn test_plasma_grants_pierce() {
        let mut state = quiet_state(vec![]);
        apply_power_up(&mut state, PowerUpKind::Plasma);
        assert!(state.balls.iter().all(|b| b.pierce_left == state.tuning.plasma_pierce));
    }

    #[test]
    fn test_shield_is_not_timed() {
        let mut state = quiet_state(vec![]);
        apply_power_up(&mut state, PowerUpKind::Shield);
        assert!(state.shield);
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_nuke_clears_lower_half() {
        let bricks = (0..4)
            .map(|row| grid_brick(row + 1, row, 0, 3, BrickSpecial::Normal))
            .collect();
        let mut state = quiet_state(bricks);
        apply_power_up(&mut state, PowerUpKind::Nuke);
        let alive: Vec<u32> = state.bricks.iter().filter(|b| b.alive).map(|b| b.row).collect();
        assert_eq!(alive, vec![0, 1]);
    }

    #[test]
    fn test_laser_clears_paddle_column() {
        let bricks = (0..11)
            .map(|col| grid_brick(col + 1, 0, col, 2, BrickSpecial::Normal))
            .chain((0..11).map(|col| grid_brick(col + 20, 1, col, 2, BrickSpecial::Normal)))
            .collect();
        let mut state = quiet_state(bricks);
        apply_power_up(&mut state, PowerUpKind::Laser);
        let dead: Vec<(u32, u32)> = state
            .bricks
            .iter()
            .filter(|b| !b.alive)
            .map(|b| (b.row, b.col))
            .collect();
        // Paddle is centered at x = 360, the middle column
        assert_eq!(dead, vec![(0, 5), (1, 5)]);
    }

    #[test]
    fn test_falling_power_up_collected_by_paddle() {
        let mut state = quiet_state(vec![]);
        let x = state.paddle.center();
        let y = state.paddle.y - 20.0;
        state.power_ups.push(PowerUp {
            id: 900,
            kind: PowerUpKind::Shield,
            pos: Vec2::new(x, y),
            vy: 2.0,
        });
        for _ in 0..10 {
            update_power_ups(&mut state, 1.0 / 60.0);
        }
        assert!(state.power_ups.is_empty());
        assert!(state.shield);
    }

    #[test]
    fn test_missed_power_up_leaves_playfield() {
        let mut state = quiet_state(vec![]);
        let y = state.paddle.y - 20.0;
        state.power_ups.push(PowerUp {
            id: 900,
            kind: PowerUpKind::Shield,
            pos: Vec2::new(10.0, y),
            vy: 2.0,
        });
        for _ in 0..200 {
            update_power_ups(&mut state, 1.0 / 60.0);
        }
        assert!(state.power_ups.is_empty());
        assert!(!state.shield);
    }

    #[test]
    fn test_gravity_field_pulls_drops() {
        let mut state = quiet_state(vec![]);
        apply_power_up(&mut state, PowerUpKind::GravityField);
        let y = state.paddle.y - 200.0;
        state.power_ups.push(PowerUp {
            id: 900,
            kind: PowerUpKind::Plasma,
            pos: Vec2::new(100.0, y),
            vy: 2.0,
        });
        for _ in 0..120 {
            update_power_ups(&mut state, 1.0 / 60.0);
        }
        assert!(state.power_ups.is_empty(), "pulled into the paddle and collected");
    }

    #[test]
    fn test_drop_roll_respects_chance() {
        let mut state = quiet_state(vec![]);
        for _ in 0..100 {
            roll_drop(&mut state, Vec2::new(100.0, 100.0));
        }
        assert!(state.power_ups.is_empty());

        state.tuning.power_up_chance = 1.0;
        for _ in 0..100 {
            roll_drop(&mut state, Vec2::new(100.0, 100.0));
        }
        assert_eq!(state.power_ups.len(), 100);
    }
}
