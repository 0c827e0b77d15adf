//! Read-only view of the simulation for rendering/UI adapters

use glam::Vec2;
use serde::Serialize;

use super::collision::Rect;
use super::state::{
    ActiveUltimate, Ball, Brick, EffectKind, GameEvent, GameState, GameStatus, PowerUpKind,
    TacticalKind, UltimateKind,
};

#[derive(Debug, Clone, Serialize)]
pub struct PowerUpView {
    pub id: u32,
    pub kind: PowerUpKind,
    pub label: &'static str,
    pub pos: Vec2,
}

/// Active timed effect with time left
#[derive(Debug, Clone, Serialize)]
pub struct EffectView {
    pub kind: EffectKind,
    pub label: &'static str,
    pub remaining_secs: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CooldownView {
    pub kind: TacticalKind,
    pub label: &'static str,
    pub remaining_secs: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UltimateView {
    pub selected: UltimateKind,
    pub label: &'static str,
    pub meter: f32,
    pub ready: bool,
    pub active: Option<UltimateKind>,
    /// Current beam sweep line
    pub beam_y: Option<f32>,
    pub black_hole: Option<Vec2>,
}

/// Everything an adapter needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub status: GameStatus,
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    pub clock_ms: f64,
    pub ball_speed: f32,
    pub paddle: Rect,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub power_ups: Vec<PowerUpView>,
    pub effects: Vec<EffectView>,
    pub shield: bool,
    pub combo: u32,
    pub combo_label: Option<String>,
    pub multiplier: f32,
    pub ultimate: UltimateView,
    pub cooldowns: Vec<CooldownView>,
    /// Events since the previous snapshot
    pub events: Vec<GameEvent>,
}

impl Snapshot {
    pub fn capture(state: &GameState, events: Vec<GameEvent>) -> Self {
        let now = state.clock_ms;

        let effects = state
            .effects
            .iter()
            .filter(|&(kind, _)| state.effects.is_active(kind, now))
            .map(|(kind, _)| EffectView {
                kind,
                label: kind.label(),
                remaining_secs: (state.effects.remaining_ms(kind, now) / 1000.0) as f32,
            })
            .collect();

        let cooldowns = TacticalKind::ALL
            .into_iter()
            .map(|kind| CooldownView {
                kind,
                label: kind.label(),
                remaining_secs: (state.cooldowns.remaining_ms(kind, now) / 1000.0) as f32,
            })
            .collect();

        let active = state.ultimate.active.as_ref();
        let ultimate = UltimateView {
            selected: state.ultimate.selected,
            label: state.ultimate.selected.label(),
            meter: state.ultimate.meter,
            ready: state.ultimate.is_full() && active.is_none(),
            active: active.map(ActiveUltimate::kind),
            beam_y: match active {
                Some(ActiveUltimate::Beam { y, .. }) => Some(*y),
                _ => None,
            },
            black_hole: match active {
                Some(ActiveUltimate::BlackHole { center, .. }) => Some(*center),
                _ => None,
            },
        };

        Self {
            status: state.status,
            score: state.score,
            lives: state.lives,
            level: state.level,
            clock_ms: now,
            ball_speed: state.ball_speed,
            paddle: state.paddle.rect(),
            balls: state.balls.clone(),
            bricks: state.bricks.clone(),
            power_ups: state
                .power_ups
                .iter()
                .map(|p| PowerUpView {
                    id: p.id,
                    kind: p.kind,
                    label: p.kind.label(),
                    pos: p.pos,
                })
                .collect(),
            effects,
            shield: state.shield,
            combo: state.combo.count,
            combo_label: state.combo.display_label(now),
            multiplier: state.combo.multiplier,
            ultimate,
            cooldowns,
            events,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reports_effects_and_cooldowns() {
        let mut state = GameState::new(5);
        state.clock_ms = 1000.0;
        state.effects.activate(EffectKind::Slow, 3500.0);
        state.cooldowns.arm(TacticalKind::TimeSlow, 21_000.0);

        let snap = Snapshot::capture(&state, Vec::new());
        assert_eq!(snap.effects.len(), 1);
        assert_eq!(snap.effects[0].label, "TIME DILATION");
        assert!((snap.effects[0].remaining_secs - 2.5).abs() < 1e-6);
        assert_eq!(snap.cooldowns[1].remaining_secs, 20.0);
        assert_eq!(snap.cooldowns[0].remaining_secs, 0.0);
        assert_eq!(snap.paddle, Rect::new(280.0, 924.0, 160.0, 14.0));
        assert_eq!(snap.bricks.len(), 55);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let state = GameState::new(5);
        let snap = Snapshot::capture(&state, vec![GameEvent::GameStarted]);
        let json = serde_json::to_string(&snap).expect("serialize");
        assert!(json.contains("\"status\":\"Idle\""));
        assert!(json.contains("GameStarted"));
    }
}
