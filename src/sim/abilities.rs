//! Tactical abilities and the ultimate
//!
//! Every entry point here is an input handler or a per-tick update; invalid
//! invocations (cooldown running, meter not full, game not running) are
//! silent no-ops and report `false`.

use glam::Vec2;
use rand::seq::SliceRandom;

use super::destruction::{Strike, destroy_where, resolve_strikes};
use super::state::{
    ActiveUltimate, EffectKind, GameEvent, GameState, GameStatus, TacticalKind, UltimateKind,
};

/// Fire a tactical ability if the game is running and its cooldown is over
pub fn use_tactical(state: &mut GameState, kind: TacticalKind) -> bool {
    let now = state.clock_ms;
    if state.status != GameStatus::Running || !state.cooldowns.is_ready(kind, now) {
        return false;
    }

    match kind {
        TacticalKind::Shockwave => {
            // Bottom-most surviving row
            if let Some(row) = state.bricks.iter().filter(|b| b.alive).map(|b| b.row).max() {
                let destroyed = destroy_where(state, |b| b.row == row);
                log::debug!("Shockwave cleared row {} ({} bricks)", row, destroyed);
            }
        }
        TacticalKind::TimeSlow => {
            let until = now + state.tuning.timeslow_ms;
            state.effects.activate(EffectKind::TimeSlow, until);
        }
        TacticalKind::TargetLock => {
            for brick in state.bricks.iter_mut().filter(|b| b.alive) {
                brick.highlighted = brick.hp == 1;
            }
            let until = now + state.tuning.targetlock_ms;
            state.effects.activate(EffectKind::TargetLock, until);
        }
    }

    let ready_at = now + kind.cooldown_ms(&state.tuning);
    state.cooldowns.arm(kind, ready_at);
    log::debug!("Tactical used: {}", kind.label());
    state.emit(GameEvent::TacticalUsed(kind));
    true
}

/// Select the next ultimate variant
pub fn cycle_ultimate(state: &mut GameState) {
    state.ultimate.selected = state.ultimate.selected.next();
    log::debug!("Ultimate selected: {}", state.ultimate.selected.label());
}

/// Activate the selected ultimate. Requires a full meter and no ultimate in
/// progress; always empties the meter on success.
pub fn activate_ultimate(state: &mut GameState) -> bool {
    if state.status != GameStatus::Running
        || !state.ultimate.is_full()
        || state.ultimate.active.is_some()
    {
        return false;
    }

    let now = state.clock_ms;
    let kind = state.ultimate.selected;
    state.ultimate.meter = 0.0;

    match kind {
        UltimateKind::Overload => {
            let mut live: Vec<usize> = state
                .bricks
                .iter()
                .enumerate()
                .filter(|(_, b)| b.alive)
                .map(|(i, _)| i)
                .collect();
            let count = (live.len() as f32 * state.tuning.overload_fraction).ceil() as usize;
            live.shuffle(&mut state.rng);
            live.truncate(count);
            let destroyed = resolve_strikes(state, live.into_iter().map(Strike::Destroy));
            log::debug!("Overload destroyed {} bricks", destroyed);
        }
        UltimateKind::BlackHole => {
            let center = Vec2::new(state.field_width / 2.0, formation_center_y(state));
            state.ultimate.active = Some(ActiveUltimate::BlackHole {
                center,
                ends_at: now + state.tuning.black_hole_ms,
            });
        }
        UltimateKind::Beam => {
            state.ultimate.active = Some(ActiveUltimate::Beam {
                y: 0.0,
                started_at: now,
                ends_at: now + state.tuning.beam_ms,
            });
        }
    }

    log::info!("Ultimate activated: {}", kind.label());
    state.emit(GameEvent::UltimateActivated(kind));
    true
}

/// Vertical middle of the live formation
fn formation_center_y(state: &GameState) -> f32 {
    let (lo, hi) = state
        .bricks
        .iter()
        .filter(|b| b.alive)
        .map(|b| b.center().y)
        .fold((f32::MAX, f32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if lo <= hi {
        (lo + hi) / 2.0
    } else {
        state.field_height / 3.0
    }
}

/// Advance a timed ultimate
pub fn update_ultimate(state: &mut GameState, dt: f32) {
    let Some(active) = state.ultimate.active.clone() else {
        return;
    };
    let now = state.clock_ms;

    match active {
        ActiveUltimate::BlackHole { center, ends_at } => {
            if now >= ends_at {
                let radius = state.tuning.black_hole_radius;
                let destroyed = destroy_where(state, |b| b.center().distance(center) <= radius);
                log::debug!("Black hole collapsed, {} bricks destroyed", destroyed);
                finish(state, UltimateKind::BlackHole);
                return;
            }
            let step = state.tuning.black_hole_pull * dt;
            for brick in state.bricks.iter_mut().filter(|b| b.alive) {
                let offset = center - brick.center();
                let distance = offset.length();
                if distance <= f32::EPSILON {
                    continue;
                }
                let shift = offset / distance * step.min(distance);
                brick.x += shift.x;
                brick.y += shift.y;
            }
        }
        ActiveUltimate::Beam {
            started_at,
            ends_at,
            ..
        } => {
            let span = (ends_at - started_at).max(1.0);
            let progress = ((now - started_at) / span).clamp(0.0, 1.0) as f32;
            let y = progress * state.field_height;
            if let Some(ActiveUltimate::Beam { y: beam_y, .. }) = state.ultimate.active.as_mut() {
                *beam_y = y;
            }
            destroy_where(state, |b| b.center().y <= y);
            if now >= ends_at {
                finish(state, UltimateKind::Beam);
            }
        }
    }
}

fn finish(state: &mut GameState, kind: UltimateKind) {
    state.ultimate.active = None;
    state.emit(GameEvent::UltimateFinished(kind));
}
