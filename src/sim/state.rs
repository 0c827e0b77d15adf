//! Game state and core simulation types
//!
//! The entity & effect store. Everything the simulation mutates lives in
//! `GameState`; adapters only ever read a `Snapshot` of it.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, paddle_bounce_angle, velocity_at_angle};
use super::level::build_level;
use super::scoring::ComboState;
use crate::consts::*;
use crate::tuning::Tuning;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting for the first start input
    Idle,
    /// Active gameplay
    Running,
    /// Frozen by the player
    Paused,
    /// Out of lives; restart re-enters `Running`
    GameOver,
    /// Every brick destroyed; next level starts after a fixed delay
    LevelComplete,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    /// Velocity in px per 1/60 s frame
    pub vel: Vec2,
    /// Bricks this ball may still pass through without bouncing
    pub pierce_left: u32,
    /// Relative paddle position (0..1) while held by a magnet catch
    pub caught_offset: Option<f32>,
    /// Brick currently being passed through (phase or pierce); struck once per pass
    #[serde(default)]
    pub inside_brick: Option<u32>,
    /// Recent positions for rendering (newest first)
    pub trail: Vec<Vec2>,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            pos,
            vel,
            pierce_left: 0,
            caught_offset: None,
            inside_brick: None,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Record current position to trail (call each tick while moving)
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        self.trail.truncate(TRAIL_LENGTH);
    }

    pub fn is_caught(&self) -> bool {
        self.caught_offset.is_some()
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Pin a caught ball to its spot on top of the paddle
    pub fn follow_paddle(&mut self, paddle: &Paddle) {
        if let Some(offset) = self.caught_offset {
            self.pos = Vec2::new(
                paddle.left() + offset * paddle.width,
                paddle.y - BALL_RADIUS,
            );
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub base_width: f32,
    pub height: f32,
    /// Desired center x from pointer input
    pub target_x: f32,
    /// Slide speed multiplier (boost)
    pub speed_mult: f32,
}

impl Paddle {
    pub fn new(field_width: f32, field_height: f32) -> Self {
        let width = PADDLE_BASE_WIDTH.min(field_width);
        Self {
            x: field_width / 2.0 - width / 2.0,
            y: field_height - PADDLE_BOTTOM_OFFSET,
            width,
            base_width: width,
            height: PADDLE_HEIGHT,
            target_x: field_width / 2.0,
            speed_mult: 1.0,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether `x` lies within the paddle's horizontal span
    pub fn spans(&self, x: f32) -> bool {
        x >= self.left() && x <= self.right()
    }

    /// Relative hit position in [0, 1] (0 = left edge)
    pub fn hit_position(&self, x: f32) -> f32 {
        ((x - self.x) / self.width).clamp(0.0, 1.0)
    }

    /// Set the desired center, already clamped to the playfield by the caller
    pub fn set_target(&mut self, center_x: f32) {
        self.target_x = center_x;
    }

    /// Slide toward the target center at the (boosted) slide speed
    pub fn move_toward_target(&mut self, dt: f32, field_width: f32) {
        let half = self.width / 2.0;
        let target = self.target_x.clamp(half, (field_width - half).max(half));
        let delta = target - self.center();

        let max_delta = PADDLE_SLIDE_SPEED * self.speed_mult * dt * FRAME_RATE_SCALE;
        let clamped = delta.clamp(-max_delta, max_delta);

        self.x = (self.x + clamped).clamp(0.0, (field_width - self.width).max(0.0));
    }

    /// Change width around the current center, staying inside the playfield
    pub fn set_width(&mut self, width: f32, field_width: f32) {
        let center = self.center();
        self.width = width.min(field_width);
        self.x = (center - self.width / 2.0).clamp(0.0, (field_width - self.width).max(0.0));
    }

    pub fn recenter(&mut self, field_width: f32) {
        self.x = field_width / 2.0 - self.width / 2.0;
        self.target_x = field_width / 2.0;
    }
}

/// Destruction-time behaviour of a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrickSpecial {
    #[default]
    Normal,
    /// Damages every brick within its blast box
    Explosive,
    /// Feeds the ultimate meter
    Charge,
    /// Slows every ball for a while
    Freeze,
    /// Raises the score multiplier
    Combo,
}

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub row: u32,
    pub col: u32,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub hp: u8,
    pub max_hp: u8,
    /// Never returns to true once cleared
    pub alive: bool,
    pub special: BrickSpecial,
    /// Cosmetic texture variant
    pub pattern: u8,
    /// Cosmetic seed
    pub seed: u32,
    /// Wobble phase (radians)
    pub wobble: f32,
    pub wobble_speed: f32,
    /// Marked by target lock
    pub highlighted: bool,
}

impl Brick {
    /// Left bound used for collision (shifted by wobble)
    pub fn collision_x(&self) -> f32 {
        self.x + self.wobble.sin() * WOBBLE_AMPLITUDE
    }

    pub fn collision_rect(&self) -> Rect {
        Rect::new(self.collision_x(), self.y, self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn advance_wobble(&mut self, dt: f32) {
        if self.alive {
            self.wobble += self.wobble_speed * dt;
        }
    }
}

/// Falling collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    // Ball modifiers
    Plasma,
    Phase,
    Slow,
    PowerSurge,
    Split,
    // Paddle modifiers
    Widen,
    GravityField,
    Boost,
    MagnetCatch,
    // Instant
    Nuke,
    Laser,
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 12] = [
        PowerUpKind::Plasma,
        PowerUpKind::Phase,
        PowerUpKind::Slow,
        PowerUpKind::PowerSurge,
        PowerUpKind::Split,
        PowerUpKind::Widen,
        PowerUpKind::GravityField,
        PowerUpKind::Boost,
        PowerUpKind::MagnetCatch,
        PowerUpKind::Nuke,
        PowerUpKind::Laser,
        PowerUpKind::Shield,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Plasma => "PLASMA ORB",
            PowerUpKind::Phase => "PHASE ORB",
            PowerUpKind::Slow => "TIME DILATION",
            PowerUpKind::PowerSurge => "POWER SURGE",
            PowerUpKind::Split => "ORBIT SPLIT",
            PowerUpKind::Widen => "WIDEN GATE",
            PowerUpKind::GravityField => "GRAVITY FIELD",
            PowerUpKind::Boost => "BOOST",
            PowerUpKind::MagnetCatch => "MAGNET CATCH",
            PowerUpKind::Nuke => "NUKE",
            PowerUpKind::Laser => "LASER",
            PowerUpKind::Shield => "SHIELD",
        }
    }

    /// Relative drop weight (instant wipes are rare)
    pub fn drop_weight(&self) -> u32 {
        match self {
            PowerUpKind::Nuke => 2,
            PowerUpKind::Laser | PowerUpKind::Shield => 5,
            PowerUpKind::PowerSurge | PowerUpKind::GravityField => 7,
            _ => 10,
        }
    }

    /// Timed effect granted on collection, if any
    pub fn effect(&self) -> Option<EffectKind> {
        match self {
            PowerUpKind::Phase => Some(EffectKind::Phase),
            PowerUpKind::Slow => Some(EffectKind::Slow),
            PowerUpKind::PowerSurge => Some(EffectKind::PowerSurge),
            PowerUpKind::Widen => Some(EffectKind::Widen),
            PowerUpKind::GravityField => Some(EffectKind::GravityField),
            PowerUpKind::Boost => Some(EffectKind::Boost),
            PowerUpKind::MagnetCatch => Some(EffectKind::MagnetCatch),
            PowerUpKind::Plasma
            | PowerUpKind::Split
            | PowerUpKind::Nuke
            | PowerUpKind::Laser
            | PowerUpKind::Shield => None,
        }
    }
}

/// A falling power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    /// Fall speed in px per frame
    pub vy: f32,
}

/// Timed effects tracked in `ActiveEffects`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    Phase,
    Slow,
    PowerSurge,
    Widen,
    GravityField,
    Boost,
    MagnetCatch,
    TimeSlow,
    Freeze,
    TargetLock,
}

impl EffectKind {
    pub fn label(&self) -> &'static str {
        match self {
            EffectKind::Phase => "PHASE ORB",
            EffectKind::Slow => "TIME DILATION",
            EffectKind::PowerSurge => "POWER SURGE",
            EffectKind::Widen => "WIDEN GATE",
            EffectKind::GravityField => "GRAVITY FIELD",
            EffectKind::Boost => "BOOST",
            EffectKind::MagnetCatch => "MAGNET CATCH",
            EffectKind::TimeSlow => "TIMESLOW",
            EffectKind::Freeze => "FREEZE",
            EffectKind::TargetLock => "TARGET LOCK",
        }
    }

    pub fn duration_ms(&self, tuning: &Tuning) -> f64 {
        match self {
            EffectKind::Phase => tuning.phase_ms,
            EffectKind::Slow => tuning.slow_ms,
            EffectKind::PowerSurge => tuning.powersurge_ms,
            EffectKind::Widen => tuning.widen_ms,
            EffectKind::GravityField => tuning.gravity_field_ms,
            EffectKind::Boost => tuning.boost_ms,
            EffectKind::MagnetCatch => tuning.magnet_ms,
            EffectKind::TimeSlow => tuning.timeslow_ms,
            EffectKind::Freeze => tuning.freeze_ms,
            EffectKind::TargetLock => tuning.targetlock_ms,
        }
    }
}

/// Effect kind -> expiry timestamp (ms). At most one entry per kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    expiries: BTreeMap<EffectKind, f64>,
}

impl ActiveEffects {
    /// Start or refresh an effect; reactivation overwrites the expiry
    pub fn activate(&mut self, kind: EffectKind, expires_at: f64) {
        self.expiries.insert(kind, expires_at);
    }

    pub fn is_active(&self, kind: EffectKind, now: f64) -> bool {
        self.expiries.get(&kind).is_some_and(|&end| now < end)
    }

    pub fn expires_at(&self, kind: EffectKind) -> Option<f64> {
        self.expiries.get(&kind).copied()
    }

    pub fn remaining_ms(&self, kind: EffectKind, now: f64) -> f64 {
        self.expiries
            .get(&kind)
            .map(|&end| (end - now).max(0.0))
            .unwrap_or(0.0)
    }

    /// Drop every effect with `now >= expiry`, returning what expired
    pub fn expire(&mut self, now: f64) -> Vec<EffectKind> {
        let expired: Vec<EffectKind> = self
            .expiries
            .iter()
            .filter(|&(_, &end)| now >= end)
            .map(|(&kind, _)| kind)
            .collect();
        for kind in &expired {
            self.expiries.remove(kind);
        }
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectKind, f64)> + '_ {
        self.expiries.iter().map(|(&k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }
}

/// Cooldown-gated instant abilities, bound to keys 1-3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TacticalKind {
    Shockwave,
    TimeSlow,
    TargetLock,
}

impl TacticalKind {
    pub const ALL: [TacticalKind; 3] = [
        TacticalKind::Shockwave,
        TacticalKind::TimeSlow,
        TacticalKind::TargetLock,
    ];

    pub fn from_key(key: u8) -> Option<Self> {
        match key {
            1 => Some(TacticalKind::Shockwave),
            2 => Some(TacticalKind::TimeSlow),
            3 => Some(TacticalKind::TargetLock),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            TacticalKind::Shockwave => 0,
            TacticalKind::TimeSlow => 1,
            TacticalKind::TargetLock => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TacticalKind::Shockwave => "SHOCKWAVE",
            TacticalKind::TimeSlow => "TIMESLOW",
            TacticalKind::TargetLock => "TARGET LOCK",
        }
    }

    pub fn cooldown_ms(&self, tuning: &Tuning) -> f64 {
        match self {
            TacticalKind::Shockwave => tuning.shockwave_cooldown_ms,
            TacticalKind::TimeSlow => tuning.timeslow_cooldown_ms,
            TacticalKind::TargetLock => tuning.targetlock_cooldown_ms,
        }
    }
}

/// Per-ability cooldown expiry timestamps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TacticalCooldowns {
    ready_at: [f64; 3],
}

impl TacticalCooldowns {
    pub fn is_ready(&self, kind: TacticalKind, now: f64) -> bool {
        now >= self.ready_at[kind.index()]
    }

    pub fn arm(&mut self, kind: TacticalKind, ready_at: f64) {
        self.ready_at[kind.index()] = ready_at;
    }

    pub fn ready_at(&self, kind: TacticalKind) -> f64 {
        self.ready_at[kind.index()]
    }

    pub fn remaining_ms(&self, kind: TacticalKind, now: f64) -> f64 {
        (self.ready_at[kind.index()] - now).max(0.0)
    }
}

/// Player-selected ultimate variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UltimateKind {
    /// Instantly destroys a fraction of the remaining bricks
    #[default]
    Overload,
    /// Pulls bricks together, then detonates them
    BlackHole,
    /// Sweeps the playfield, destroying bricks it passes
    Beam,
}

impl UltimateKind {
    pub fn next(&self) -> Self {
        match self {
            UltimateKind::Overload => UltimateKind::BlackHole,
            UltimateKind::BlackHole => UltimateKind::Beam,
            UltimateKind::Beam => UltimateKind::Overload,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UltimateKind::Overload => "OVERLOAD",
            UltimateKind::BlackHole => "BLACK HOLE",
            UltimateKind::Beam => "PORTAL BEAM",
        }
    }
}

/// A timed ultimate in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActiveUltimate {
    BlackHole { center: Vec2, ends_at: f64 },
    Beam { y: f32, started_at: f64, ends_at: f64 },
}

impl ActiveUltimate {
    pub fn kind(&self) -> UltimateKind {
        match self {
            ActiveUltimate::BlackHole { .. } => UltimateKind::BlackHole,
            ActiveUltimate::Beam { .. } => UltimateKind::Beam,
        }
    }

    pub fn ends_at(&self) -> f64 {
        match self {
            ActiveUltimate::BlackHole { ends_at, .. } | ActiveUltimate::Beam { ends_at, .. } => {
                *ends_at
            }
        }
    }
}

pub const ULTIMATE_METER_MAX: f32 = 100.0;

/// Ultimate meter and selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UltimateState {
    pub selected: UltimateKind,
    /// In [0, 100]
    pub meter: f32,
    pub active: Option<ActiveUltimate>,
}

impl UltimateState {
    pub fn charge(&mut self, amount: f32) {
        self.meter = (self.meter + amount.max(0.0)).min(ULTIMATE_METER_MAX);
    }

    pub fn is_full(&self) -> bool {
        self.meter >= ULTIMATE_METER_MAX
    }
}

/// Things that happened during a tick or input, for adapters (sound, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted,
    BrickDestroyed {
        brick_id: u32,
        points: u64,
        special: BrickSpecial,
    },
    PowerUpSpawned(PowerUpKind),
    PowerUpCollected(PowerUpKind),
    EffectExpired(EffectKind),
    ShieldConsumed,
    BallCaught,
    BallReleased,
    /// A ball with non-finite state was replaced
    BallRecovered,
    LifeLost {
        lives_left: u8,
    },
    LevelComplete {
        level: u32,
    },
    LevelStarted {
        level: u32,
    },
    GameOver {
        score: u64,
        level: u32,
    },
    TacticalUsed(TacticalKind),
    UltimateActivated(UltimateKind),
    UltimateFinished(UltimateKind),
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub field_width: f32,
    pub field_height: f32,
    pub status: GameStatus,
    /// Simulation clock (ms); frozen unless running or between levels
    pub clock_ms: f64,
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    /// Bricks destroyed this level (drives speed scaling)
    pub bricks_destroyed: u32,
    /// Target speed applied on the most recent tick
    pub ball_speed: f32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub power_ups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    /// One-shot drain absorption (not timed)
    pub shield: bool,
    pub cooldowns: TacticalCooldowns,
    pub ultimate: UltimateState,
    pub combo: ComboState,
    /// Ball currently held by a magnet catch
    pub caught_ball: Option<u32>,
    /// When the level-complete celebration ends
    pub level_complete_until: f64,
    /// Set the instant game over is entered; guards the score submission
    pub score_submitted: bool,
    /// Events accumulated since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create an idle game with default tuning and playfield
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self::with_playfield(seed, tuning, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT)
    }

    pub fn with_playfield(seed: u64, tuning: Tuning, field_width: f32, field_height: f32) -> Self {
        let lives = tuning.starting_lives;
        let ball_speed = tuning.target_ball_speed(1, 0);
        let mut state = Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            field_width,
            field_height,
            status: GameStatus::Idle,
            clock_ms: 0.0,
            score: 0,
            lives,
            level: 1,
            bricks_destroyed: 0,
            ball_speed,
            paddle: Paddle::new(field_width, field_height),
            balls: Vec::new(),
            bricks: Vec::new(),
            power_ups: Vec::new(),
            effects: ActiveEffects::default(),
            shield: false,
            cooldowns: TacticalCooldowns::default(),
            ultimate: UltimateState::default(),
            combo: ComboState::default(),
            caught_ball: None,
            level_complete_until: 0.0,
            score_submitted: false,
            events: Vec::new(),
            next_id: 1,
        };

        state.load_level();
        state.spawn_launched_ball();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn target_speed(&self) -> f32 {
        self.tuning.target_ball_speed(self.level, self.bricks_destroyed)
    }

    pub fn live_brick_count(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    pub fn all_bricks_cleared(&self) -> bool {
        self.bricks.iter().all(|b| !b.alive)
    }

    /// Replace the brick array with a freshly generated layout for `level`
    pub fn load_level(&mut self) {
        let mut bricks = build_level(self.level, self.field_width, self.seed);
        for brick in &mut bricks {
            brick.id = self.next_entity_id();
        }
        self.bricks = bricks;
        self.bricks_destroyed = 0;
        self.ball_speed = self.target_speed();
    }

    /// Reset score, lives, level and every effect, then start running
    pub fn start_new_game(&mut self) {
        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.level = 1;
        self.effects.clear();
        self.shield = false;
        self.cooldowns = TacticalCooldowns::default();
        self.ultimate = UltimateState {
            selected: self.ultimate.selected,
            ..UltimateState::default()
        };
        self.combo = ComboState::default();
        self.power_ups.clear();
        self.score_submitted = false;
        self.paddle = Paddle::new(self.field_width, self.field_height);
        self.load_level();
        self.spawn_launched_ball();
        self.status = GameStatus::Running;
        log::info!("New game started (seed {})", self.seed);
        self.emit(GameEvent::GameStarted);
    }

    /// Replace all balls with one freshly launched from the centered paddle
    pub fn spawn_launched_ball(&mut self) {
        self.balls.clear();
        self.caught_ball = None;
        self.paddle.recenter(self.field_width);
        let pos = Vec2::new(self.paddle.center(), self.paddle.y - BALL_RADIUS - 2.0);
        let ball = self.launch_ball_from(pos);
        self.balls.push(ball);
    }

    /// A new ball heading roughly straight up at the current ball speed
    pub fn launch_ball_from(&mut self, pos: Vec2) -> Ball {
        let jitter = (self.rng.random::<f32>() - 0.5) * LAUNCH_SPREAD;
        let angle = -std::f32::consts::FRAC_PI_2 + jitter;
        let id = self.next_entity_id();
        Ball::new(id, pos, velocity_at_angle(angle, self.ball_speed))
    }

    /// Fire the caught ball using the paddle rebound angle at its resting spot
    pub fn release_caught_ball(&mut self) -> bool {
        let Some(id) = self.caught_ball.take() else {
            return false;
        };
        let speed = self.ball_speed;
        let Some(ball) = self.balls.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        ball.follow_paddle(&self.paddle);
        let offset = ball.caught_offset.take().unwrap_or(0.5);
        ball.vel = velocity_at_angle(paddle_bounce_angle(offset), speed);
        self.emit(GameEvent::BallReleased);
        true
    }
}
