//! Per-entity motion rules.
//!
//! The rule is picked when an entity spawns and stored on it; each frame
//! `Motion::advance` moves the entity's body one step.

use core::f32::consts::TAU;

use glam::Vec2;

use crate::entities::{Body, Enemy};
use crate::pool::{EntityPool, Handle};

/// Perpendicular axis used by a spiral whose base direction is zero.
const DEFAULT_SPIRAL_AXIS: Vec2 = Vec2::X;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HomingStyle {
    /// Each axis moves toward the target by at most `speed`.
    Clamped,
    /// Move `speed` along the true direction; snap when within one step.
    #[default]
    Normalized,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// `pos += dir * speed`.  `dir` is used as given, never renormalised.
    Linear { dir: Vec2, speed: f32 },
    /// Chase `target`; re-acquire the nearest target when it goes stale.
    Homing {
        target: Option<Handle>,
        speed: f32,
        style: HomingStyle,
    },
    /// `anchor` travels linearly; the body sits `sin(angle) * amplitude`
    /// off it along the perpendicular axis.
    Spiral {
        anchor: Vec2,
        dir: Vec2,
        speed: f32,
        angle: f32,
        angle_step: f32,
        amplitude: f32,
    },
    /// Linear with `vel.y` growing by `gravity` every frame.
    Parabolic { vel: Vec2, gravity: f32 },
}

impl Default for Motion {
    fn default() -> Self {
        Motion::Linear {
            dir: Vec2::ZERO,
            speed: 0.0,
        }
    }
}

/// Where homing entities look up their targets.
pub trait TargetSource {
    /// Centre of `target`, or `None` when the handle no longer resolves.
    fn locate(&self, target: Handle) -> Option<Vec2>;
    /// Closest live target to `from`.
    fn nearest(&self, from: Vec2) -> Option<Handle>;
}

/// For entities that never home.
pub struct NoTargets;

impl TargetSource for NoTargets {
    fn locate(&self, _target: Handle) -> Option<Vec2> {
        None
    }

    fn nearest(&self, _from: Vec2) -> Option<Handle> {
        None
    }
}

impl<const N: usize> TargetSource for EntityPool<Enemy, N> {
    fn locate(&self, target: Handle) -> Option<Vec2> {
        self.get(target).map(|e| e.body.center())
    }

    fn nearest(&self, from: Vec2) -> Option<Handle> {
        self.iter()
            .map(|(h, e)| (h, e.body.center().distance_squared(from)))
            .fold(None, |best: Option<(Handle, f32)>, (h, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((h, d)),
            })
            .map(|(h, _)| h)
    }
}

pub fn spiral_axis(dir: Vec2) -> Vec2 {
    let n = dir.normalize_or_zero();
    if n == Vec2::ZERO {
        DEFAULT_SPIRAL_AXIS
    } else {
        n.perp()
    }
}

impl Motion {
    pub fn linear(dir: Vec2, speed: f32) -> Self {
        Motion::Linear { dir, speed }
    }

    pub fn homing(target: Option<Handle>, speed: f32, style: HomingStyle) -> Self {
        Motion::Homing { target, speed, style }
    }

    /// Spiral starting at `start` with zero offset.
    pub fn spiral(start: Vec2, dir: Vec2, speed: f32, angle_step: f32, amplitude: f32) -> Self {
        Motion::Spiral {
            anchor: start,
            dir,
            speed,
            angle: 0.0,
            angle_step,
            amplitude,
        }
    }

    pub fn parabolic(vel: Vec2, gravity: f32) -> Self {
        Motion::Parabolic { vel, gravity }
    }

    /// Current homing target, if this is a homing motion.
    pub fn target(&self) -> Option<Handle> {
        match self {
            Motion::Homing { target, .. } => *target,
            _ => None,
        }
    }

    /// Signed perpendicular distance between a spiral's body position and
    /// its anchor.
    pub fn spiral_offset(&self, pos: Vec2) -> Option<f32> {
        match self {
            Motion::Spiral { anchor, dir, .. } => Some((pos - *anchor).dot(spiral_axis(*dir))),
            _ => None,
        }
    }

    /// Move `body` one frame.
    pub fn advance(&mut self, body: &mut Body, targets: &dyn TargetSource) {
        match self {
            Motion::Linear { dir, speed } => {
                body.pos += *dir * *speed;
            }
            Motion::Homing { target, speed, style } => {
                step_homing(body, target, *speed, *style, targets);
            }
            Motion::Spiral {
                anchor,
                dir,
                speed,
                angle,
                angle_step,
                amplitude,
            } => {
                *anchor += *dir * *speed;
                *angle = (*angle + *angle_step).rem_euclid(TAU);
                body.pos = *anchor + spiral_axis(*dir) * (angle.sin() * *amplitude);
            }
            Motion::Parabolic { vel, gravity } => {
                body.pos += *vel;
                vel.y += *gravity;
            }
        }
    }
}

fn step_homing(
    body: &mut Body,
    target: &mut Option<Handle>,
    speed: f32,
    style: HomingStyle,
    targets: &dyn TargetSource,
) {
    let center = body.center();
    let mut aim = target.and_then(|h| targets.locate(h));
    if aim.is_none() {
        *target = targets.nearest(center);
        aim = target.and_then(|h| targets.locate(h));
    }

    let Some(aim) = aim else {
        // Nothing to chase: fly straight up.
        body.pos.y -= speed;
        return;
    };

    let delta = aim - center;
    let step = match style {
        HomingStyle::Clamped => delta.clamp(Vec2::splat(-speed), Vec2::splat(speed)),
        HomingStyle::Normalized => {
            if delta.length_squared() <= speed * speed {
                delta
            } else {
                delta.normalize() * speed
            }
        }
    };
    body.pos += step;
}
