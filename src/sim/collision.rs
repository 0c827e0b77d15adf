//! Collision detection and response for axis-aligned geometry
//!
//! Pure functions only: circle vs rectangle overlap, minimum-penetration
//! bounce axis, paddle rebound angle, wall reflection and speed
//! renormalization. The per-tick orchestration lives in `physics`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (x, y is the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// Which velocity component a bounce flips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BounceAxis {
    /// Hit a left/right face: flip vx
    Horizontal,
    /// Hit a top/bottom face: flip vy
    Vertical,
}

impl BounceAxis {
    /// Surface normal used for reflection
    pub fn normal(&self) -> Vec2 {
        match self {
            BounceAxis::Horizontal => Vec2::X,
            BounceAxis::Vertical => Vec2::Y,
        }
    }
}

/// Ball bounding box vs rectangle overlap (strict, touching is not a hit)
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    center.x + radius > rect.x
        && center.x - radius < rect.right()
        && center.y + radius > rect.y
        && center.y - radius < rect.bottom()
}

/// Penetration depths of the ball's bounding box into each face of `rect`
/// as (left, right, top, bottom)
pub fn penetration_depths(center: Vec2, radius: f32, rect: &Rect) -> [f32; 4] {
    [
        center.x + radius - rect.x,
        rect.right() - (center.x - radius),
        center.y + radius - rect.y,
        rect.bottom() - (center.y - radius),
    ]
}

/// Axis of least penetration; ties between horizontal and vertical favor
/// the horizontal faces
pub fn bounce_axis(center: Vec2, radius: f32, rect: &Rect) -> BounceAxis {
    let [left, right, top, bottom] = penetration_depths(center, radius, rect);
    let min = left.min(right).min(top).min(bottom);
    if min == left || min == right {
        BounceAxis::Horizontal
    } else {
        BounceAxis::Vertical
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Rebound angle for a paddle hit at relative position `hit_pos` in [0, 1]
///
/// The center sends the ball almost straight up, the edges send it out at
/// shallow angles (left edge toward the right, since y points down).
#[inline]
pub fn paddle_bounce_angle(hit_pos: f32) -> f32 {
    -std::f32::consts::PI * (0.15 + hit_pos.clamp(0.0, 1.0) * 0.70)
}

#[inline]
pub fn velocity_at_angle(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()) * speed
}

/// Rewrite the magnitude of `velocity` to `speed`, keeping its direction
///
/// Returns `None` when the direction is undefined (zero or non-finite).
pub fn renormalize(velocity: Vec2, speed: f32) -> Option<Vec2> {
    if !velocity.is_finite() || !speed.is_finite() {
        return None;
    }
    let magnitude = velocity.length();
    if magnitude <= f32::EPSILON {
        return None;
    }
    Some(velocity / magnitude * speed)
}

/// Side walls: reflect x away from the wall and clamp inside. Returns true on hit.
pub fn bounce_off_side_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32, width: f32) -> bool {
    if pos.x - radius < 0.0 {
        pos.x = radius;
        vel.x = vel.x.abs();
        true
    } else if pos.x + radius > width {
        pos.x = width - radius;
        vel.x = -vel.x.abs();
        true
    } else {
        false
    }
}

/// Ceiling: reflect y downward and clamp. Returns true on hit.
pub fn bounce_off_ceiling(pos: &mut Vec2, vel: &mut Vec2, radius: f32) -> bool {
    if pos.y - radius < 0.0 {
        pos.y = radius;
        vel.y = vel.y.abs();
        true
    } else {
        false
    }
}
