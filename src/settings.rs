//! Simulation settings
//!
//! Immutable configuration handed to [`crate::sim::Juggler::configure`].
//! Loaded from JSON; any field left out falls back to the stock value.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{JuggleError, Result};

/// Ball color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Palette {
    #[default]
    Default,
    Pastel,
}

impl Palette {
    pub fn as_str(&self) -> &'static str {
        match self {
            Palette::Default => "Default",
            Palette::Pastel => "Pastel",
        }
    }

    /// RGB colors, cycled by ball index
    pub fn colors(&self) -> &'static [[u8; 3]] {
        match self {
            Palette::Default => &[
                [255, 0, 0],   // Red
                [0, 0, 255],   // Blue
                [0, 255, 0],   // Green
                [255, 255, 0], // Yellow
                [255, 0, 255], // Magenta
            ],
            Palette::Pastel => &[
                [135, 206, 250], // Light Sky Blue
                [255, 182, 193], // Light Pink
                [144, 238, 144], // Light Green
                [255, 250, 205], // Lemon Chiffon
                [221, 160, 221], // Plum
            ],
        }
    }

    pub fn color(&self, index: usize) -> [u8; 3] {
        let colors = self.colors();
        colors[index % colors.len()]
    }
}

impl FromStr for Palette {
    type Err = JuggleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "default" | "bright" => Ok(Palette::Default),
            "pastel" => Ok(Palette::Pastel),
            _ => Err(JuggleError::UnknownOption {
                kind: "palette",
                value: s.to_string(),
            }),
        }
    }
}

/// How throws are parameterized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThrowMode {
    /// Launch speed (m/s) and angle (degrees); hands are placed at the throw range
    #[default]
    VelocityAngle,
    /// Hand separation (m) and peak height (m); launch vector is solved for
    DistanceHeight,
}

/// What decides when the next ball leaves a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TriggerStrategy {
    /// Each hand throws on its own periodic timer
    #[default]
    Timed,
    /// A ball reaching its apex launches the next ball in order
    ApexChained,
}

impl TriggerStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerStrategy::Timed => "Timed",
            TriggerStrategy::ApexChained => "ApexChained",
        }
    }
}

impl FromStr for TriggerStrategy {
    type Err = JuggleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "timed" | "timer" => Ok(TriggerStrategy::Timed),
            "apex" | "apexchained" | "apex_chained" | "apex-chained" => {
                Ok(TriggerStrategy::ApexChained)
            }
            _ => Err(JuggleError::UnknownOption {
                kind: "strategy",
                value: s.to_string(),
            }),
        }
    }
}

/// Juggling simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JugglingSettings {
    // === Screen ===
    /// Surface width in pixels
    pub screen_width: u32,
    /// Surface height in pixels
    pub screen_height: u32,
    /// Floor (catch) line as a fraction of screen height
    pub floor_ratio: f32,
    /// Ceiling line in pixels
    pub ceiling_y: f32,

    // === Physics ===
    /// Gravity (m/s²)
    pub gravity: f32,
    /// Pixels per meter
    pub scaling_factor: f32,

    // === Pattern ===
    pub throw_mode: ThrowMode,
    /// Launch speed in m/s (VelocityAngle mode)
    pub velocity: f32,
    /// Launch angle in degrees above horizontal (VelocityAngle mode)
    pub angle_deg: f32,
    /// Distance between hands in meters (DistanceHeight mode)
    pub hand_distance: f32,
    /// Peak height of each throw in meters (DistanceHeight mode)
    pub max_height: f32,
    /// Fraction of a cycle each hand holds a ball, in [0, 1)
    pub dwell_ratio: f32,
    pub strategy: TriggerStrategy,

    // === Balls ===
    pub ball_count: u32,
    /// Ball radius in meters
    pub ball_radius: f32,
    pub palette: Palette,

    // === Cosmetic ===
    pub show_catch_line: bool,
    pub show_hand_markers: bool,
}

impl Default for JugglingSettings {
    fn default() -> Self {
        Self {
            screen_width: 800,
            screen_height: 600,
            floor_ratio: 0.75,
            ceiling_y: 0.0,

            gravity: 9.81,
            scaling_factor: 200.0,

            throw_mode: ThrowMode::VelocityAngle,
            velocity: 5.0,
            angle_deg: 75.0,
            hand_distance: 0.4,
            max_height: 2.0,
            dwell_ratio: 0.3,
            strategy: TriggerStrategy::Timed,

            ball_count: 4,
            ball_radius: 0.06,
            palette: Palette::Default,

            show_catch_line: false,
            show_hand_markers: true,
        }
    }
}

impl JugglingSettings {
    /// Floor line in pixels
    pub fn floor_y(&self) -> f32 {
        self.screen_height as f32 * self.floor_ratio
    }

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let settings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
