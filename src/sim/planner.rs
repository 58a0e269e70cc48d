//! Throw planning
//!
//! Projectile math that keeps a cascade consistent: hand separation from
//! the throw range, launch vector from a target distance/height, and the
//! per-hand throw interval from flight time and dwell ratio.
//!
//! All quantities here are physical (meters, seconds, degrees) except the
//! hand positions in [`ThrowPlan`], which are pixels.

use serde::{Deserialize, Serialize};

use super::environment::Environment;
use crate::consts::MAX_BALLS;
use crate::error::{JuggleError, Result};
use crate::settings::{JugglingSettings, ThrowMode};

/// Everything the controller needs to run a pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrowPlan {
    /// Launch speed (m/s)
    pub velocity: f32,
    /// Launch angle above horizontal (degrees)
    pub angle_deg: f32,
    /// Time between consecutive throws from one hand (s)
    pub interval: f32,
    /// Hand separation (px)
    pub range_px: f32,
    pub left_hand_x: f32,
    pub right_hand_x: f32,
}

/// Horizontal distance covered by a throw landing at launch height (m)
pub fn throw_range(gravity: f32, velocity: f32, angle_deg: f32) -> f32 {
    velocity * velocity * (2.0 * angle_deg).to_radians().sin() / gravity
}

/// Launch `(velocity, angle_deg)` that lands `distance` away after peaking at `max_height`
pub fn throw_vector_from_distance_height(gravity: f32, distance: f32, max_height: f32) -> (f32, f32) {
    let angle = (4.0 * max_height / distance).atan();
    let cos = angle.cos();
    let velocity = (gravity * distance * distance / (2.0 * cos * cos * 4.0 * max_height)).sqrt();
    (velocity, angle.to_degrees())
}

/// Time between throws from the same hand (s)
///
/// Flight time is `2v/g`; a hand is idle for `ball_count/2 - dwell_ratio`
/// beats of it. Zero or negative beats cannot be juggled.
pub fn throw_interval(gravity: f32, velocity: f32, ball_count: u32, dwell_ratio: f32) -> Result<f32> {
    let flight_time = 2.0 * velocity / gravity;
    let beats = ball_count as f32 / 2.0 - dwell_ratio;
    if beats <= 0.0 {
        return Err(JuggleError::DegenerateInterval {
            ball_count,
            dwell_ratio,
        });
    }
    Ok(flight_time / beats)
}

pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(JuggleError::InvalidParameter { name, value })
    }
}

/// Build the throw plan for the environment's current ball count
pub fn plan(env: &Environment, settings: &JugglingSettings) -> Result<ThrowPlan> {
    require_positive("gravity", env.gravity)?;
    require_positive("scaling_factor", env.scaling_factor)?;
    if env.ball_count() > MAX_BALLS {
        return Err(JuggleError::InvalidParameter {
            name: "ball_count",
            value: env.ball_count() as f32,
        });
    }
    if !(0.0..1.0).contains(&settings.dwell_ratio) {
        return Err(JuggleError::InvalidParameter {
            name: "dwell_ratio",
            value: settings.dwell_ratio,
        });
    }

    let (velocity, angle_deg, range_m) = match env.throw_mode {
        ThrowMode::VelocityAngle => {
            require_positive("velocity", settings.velocity)?;
            if !(settings.angle_deg > 0.0 && settings.angle_deg < 90.0) {
                return Err(JuggleError::InvalidParameter {
                    name: "angle_deg",
                    value: settings.angle_deg,
                });
            }
            let range = throw_range(env.gravity, settings.velocity, settings.angle_deg);
            (settings.velocity, settings.angle_deg, range)
        }
        ThrowMode::DistanceHeight => {
            require_positive("hand_distance", settings.hand_distance)?;
            require_positive("max_height", settings.max_height)?;
            let (velocity, angle) = throw_vector_from_distance_height(
                env.gravity,
                settings.hand_distance,
                settings.max_height,
            );
            (velocity, angle, settings.hand_distance)
        }
    };

    let interval = throw_interval(env.gravity, velocity, env.ball_count(), settings.dwell_ratio)?;
    let range_px = range_m * env.scaling_factor;
    let (left_hand_x, right_hand_x) = env.symmetric_hands(range_px);

    Ok(ThrowPlan {
        velocity,
        angle_deg,
        interval,
        range_px,
        left_hand_x,
        right_hand_x,
    })
}
