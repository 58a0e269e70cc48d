//! Ball kinematics
//!
//! Screen coordinates: y grows downward, so an upward throw has negative
//! vertical velocity. A ball at rest sits on the floor line in one hand.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::environment::{Environment, Hand};
use super::planner::{require_positive, throw_vector_from_distance_height};
use crate::error::Result;

/// Where a ball currently is, from a hand's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupancy {
    Airborne,
    Held(Hand),
}

/// A juggling ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub name: String,
    pub color: [u8; 3],
    /// Radius (m)
    pub radius: f32,
    /// Where the ball was created and where `reset` puts it back (px)
    pub rest_pos: Vec2,
    pub pos: Vec2,
    /// Velocity (px/s)
    pub vel: Vec2,
    /// Vertical velocity before the last update, for apex detection
    pub prev_vel_y: f32,
    airborne: bool,
}

impl Ball {
    /// Create a ball resting at `rest_pos`
    pub fn new(id: u32, name: impl Into<String>, rest_pos: Vec2, radius: f32, color: [u8; 3]) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            radius,
            rest_pos,
            pos: rest_pos,
            vel: Vec2::ZERO,
            prev_vel_y: 0.0,
            airborne: false,
        }
    }

    #[inline]
    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    /// Advance one step under gravity; landing on the floor is a dead catch
    pub fn update(&mut self, env: &Environment, dt: f32) {
        self.prev_vel_y = self.vel.y;

        self.vel.y += env.scaled_gravity() * dt;
        self.pos += self.vel * dt;

        if self.pos.y >= env.floor_y {
            self.pos.y = env.floor_y;
            self.vel = Vec2::ZERO;
            self.airborne = false;
        } else {
            self.airborne = true;
        }
    }

    /// Throw toward the opposite side of the screen.
    ///
    /// `velocity` is in m/s, `angle_deg` above horizontal. Returns false
    /// (and leaves the ball untouched) if it is already in flight.
    pub fn throw(&mut self, env: &Environment, velocity: f32, angle_deg: f32) -> bool {
        if self.airborne {
            log::debug!("Ignoring throw of ball {}: already airborne", self.name);
            return false;
        }

        let speed = velocity * env.scaling_factor;
        let angle = angle_deg.to_radians();
        let dir_x = match env.side_of(self.pos.x) {
            Hand::Right => -1.0,
            Hand::Left => 1.0,
        };

        self.vel = Vec2::new(dir_x * speed * angle.cos(), -speed * angle.sin());
        self.airborne = true;
        true
    }

    /// Throw so the ball lands `distance` m away after peaking `max_height` m up.
    ///
    /// Both targets must be positive; the ball is untouched on error.
    pub fn throw_to_target(&mut self, env: &Environment, distance: f32, max_height: f32) -> Result<bool> {
        require_positive("distance", distance)?;
        require_positive("max_height", max_height)?;
        let (velocity, angle) = throw_vector_from_distance_height(env.gravity, distance, max_height);
        Ok(self.throw(env, velocity, angle))
    }

    pub fn occupancy(&self, env: &Environment) -> Occupancy {
        if self.airborne {
            Occupancy::Airborne
        } else {
            Occupancy::Held(env.side_of(self.pos.x))
        }
    }

    /// `None` while airborne, otherwise whether the ball rests on `hand`'s side
    pub fn is_in_hand(&self, env: &Environment, hand: Hand) -> Option<bool> {
        match self.occupancy(env) {
            Occupancy::Airborne => None,
            Occupancy::Held(held) => Some(held == hand),
        }
    }

    /// Same as [`Ball::is_in_hand`] with a "left"/"right" label
    pub fn is_in_hand_named(&self, env: &Environment, label: &str) -> Result<Option<bool>> {
        let hand = label.parse::<Hand>()?;
        Ok(self.is_in_hand(env, hand))
    }

    /// True on the step where vertical velocity turns from upward to non-upward
    #[inline]
    pub fn detect_apex(&self) -> bool {
        self.prev_vel_y < 0.0 && self.vel.y >= 0.0
    }

    pub fn reset(&mut self) {
        self.pos = self.rest_pos;
        self.vel = Vec2::ZERO;
        self.prev_vel_y = 0.0;
        self.airborne = false;
    }
}
