//! Crate-wide error type

use thiserror::Error;

/// Errors surfaced by configuration, planning and hand lookups
#[derive(Debug, Error)]
pub enum JuggleError {
    /// Hand label other than "left" or "right"
    #[error("unknown hand `{0}` (expected \"left\" or \"right\")")]
    InvalidHand(String),

    /// Too few balls for the requested dwell ratio: `ball_count / 2 - dwell_ratio <= 0`
    #[error(
        "pattern with {ball_count} ball(s) and dwell ratio {dwell_ratio} leaves no beats between throws"
    )]
    DegenerateInterval { ball_count: u32, dwell_ratio: f32 },

    /// Unrecognized name for a settings option (palette, strategy)
    #[error("unknown {kind} `{value}`")]
    UnknownOption { kind: &'static str, value: String },

    /// A physical parameter outside its valid range
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("failed to parse settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

impl JuggleError {
    /// True for errors that mean the requested pattern cannot be planned
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            JuggleError::DegenerateInterval { .. } | JuggleError::InvalidParameter { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, JuggleError>;
