//! Brick damage and destruction
//!
//! Every way a brick can lose hit points (ball hits, explosions, abilities,
//! ultimates) goes through one worklist so special-brick cascades run in
//! bounded stack depth regardless of how many explosives are chained.

use std::collections::VecDeque;

use super::powerups::roll_drop;
use super::scoring::base_points;
use super::state::{Brick, BrickSpecial, EffectKind, GameEvent, GameState};

/// A pending hit on the brick at an index into `GameState::bricks`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strike {
    /// Remove one hit point
    Damage(usize),
    /// Destroy outright regardless of hit points
    Destroy(usize),
}

/// Apply strikes and every cascade they trigger. Returns bricks destroyed.
pub fn resolve_strikes(state: &mut GameState, strikes: impl IntoIterator<Item = Strike>) -> u32 {
    let mut queue: VecDeque<Strike> = strikes.into_iter().collect();
    let mut destroyed = 0;

    while let Some(strike) = queue.pop_front() {
        let (index, lethal) = match strike {
            Strike::Damage(i) => (i, false),
            Strike::Destroy(i) => (i, true),
        };
        let Some(brick) = state.bricks.get_mut(index) else {
            continue;
        };
        if !brick.alive {
            continue;
        }

        brick.hp = if lethal { 0 } else { brick.hp.saturating_sub(1) };
        if brick.hp > 0 {
            continue;
        }
        brick.alive = false;
        brick.highlighted = false;
        destroyed += 1;

        let brick = brick.clone();
        on_destroyed(state, index, &brick, &mut queue);
    }

    destroyed
}

/// Destroy every live brick matching `pred`. Returns bricks destroyed.
pub fn destroy_where(state: &mut GameState, pred: impl Fn(&Brick) -> bool) -> u32 {
    let targets: Vec<Strike> = state
        .bricks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.alive && pred(b))
        .map(|(i, _)| Strike::Destroy(i))
        .collect();
    resolve_strikes(state, targets)
}

fn on_destroyed(state: &mut GameState, index: usize, brick: &Brick, queue: &mut VecDeque<Strike>) {
    let now = state.clock_ms;
    state.bricks_destroyed += 1;

    let base = base_points(brick.max_hp, &state.tuning);
    let points = state.combo.register_destruction(now, base, &state.tuning);
    state.score += points;
    state.ultimate.charge(state.tuning.meter_per_brick);
    state.emit(GameEvent::BrickDestroyed {
        brick_id: brick.id,
        points,
        special: brick.special,
    });

    match brick.special {
        BrickSpecial::Normal => {}
        BrickSpecial::Explosive => {
            let reach_x = brick.w * state.tuning.explosion_reach;
            let reach_y = brick.h * state.tuning.explosion_reach;
            let center = brick.center();
            queue.extend(
                state
                    .bricks
                    .iter()
                    .enumerate()
                    .filter(|&(i, b)| {
                        i != index
                            && b.alive
                            && (b.center().x - center.x).abs() <= reach_x
                            && (b.center().y - center.y).abs() <= reach_y
                    })
                    .map(|(i, _)| Strike::Damage(i)),
            );
        }
        BrickSpecial::Charge => {
            state.ultimate.charge(state.tuning.meter_per_charge);
        }
        BrickSpecial::Freeze => {
            let until = now + state.tuning.freeze_ms;
            state.effects.activate(EffectKind::Freeze, until);
        }
        BrickSpecial::Combo => {
            state.combo.trigger_combo_brick(now, &state.tuning);
        }
    }

    let drop_at = glam::Vec2::new(brick.x + brick.w / 2.0, brick.y + brick.h);
    roll_drop(state, drop_at);
}
