//! Shared simulation environment
//!
//! Screen geometry, gravity, scale and the per-run mutable fields
//! (ball count, hand positions). Written only by the controller between
//! ticks; balls read it through a shared reference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JuggleError;
use crate::settings::{JugglingSettings, ThrowMode};

/// One of the two fixed hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn opposite(self) -> Self {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hand {
    type Err = JuggleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Hand::Left),
            "right" => Ok(Hand::Right),
            _ => Err(JuggleError::InvalidHand(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// Surface width (px)
    pub width: f32,
    /// Surface height (px)
    pub height: f32,
    /// Gravity (m/s²)
    pub gravity: f32,
    /// Catch line (px, y grows downward)
    pub floor_y: f32,
    pub ceiling_y: f32,
    /// Pixels per meter
    pub scaling_factor: f32,
    /// Hand x positions (px), unset until a plan places them
    pub left_hand_x: Option<f32>,
    pub right_hand_x: Option<f32>,
    pub throw_mode: ThrowMode,
    ball_count: u32,
}

impl Environment {
    pub fn new(settings: &JugglingSettings) -> Self {
        Self {
            width: settings.screen_width as f32,
            height: settings.screen_height as f32,
            gravity: settings.gravity,
            floor_y: settings.floor_y(),
            ceiling_y: settings.ceiling_y,
            scaling_factor: settings.scaling_factor,
            left_hand_x: None,
            right_hand_x: None,
            throw_mode: settings.throw_mode,
            ball_count: settings.ball_count.max(1),
        }
    }

    /// Gravity in pixels/s²
    #[inline]
    pub fn scaled_gravity(&self) -> f32 {
        self.gravity * self.scaling_factor
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    pub fn ball_count(&self) -> u32 {
        self.ball_count
    }

    /// Set the ball count, never below 1. The plan and ball set must be rebuilt afterwards.
    pub fn set_ball_count(&mut self, count: u32) {
        self.ball_count = count.max(1);
    }

    /// Left and right hand x positions `range_px` apart, centered on the screen
    pub fn symmetric_hands(&self, range_px: f32) -> (f32, f32) {
        let center = self.center_x();
        (center - range_px / 2.0, center + range_px / 2.0)
    }

    pub fn place_hands(&mut self, range_px: f32) {
        let (left, right) = self.symmetric_hands(range_px);
        self.left_hand_x = Some(left);
        self.right_hand_x = Some(right);
    }

    pub fn hand_x(&self, hand: Hand) -> Option<f32> {
        match hand {
            Hand::Left => self.left_hand_x,
            Hand::Right => self.right_hand_x,
        }
    }

    /// Which hand's half of the screen an x position falls in
    #[inline]
    pub fn side_of(&self, x: f32) -> Hand {
        if x > self.center_x() { Hand::Right } else { Hand::Left }
    }
}
