//! Juggle Sim - real-time toss-juggling simulation
//!
//! Core modules:
//! - `sim`: Ball kinematics, throw planning and the juggling controller
//! - `settings`: Serializable simulation settings
//! - `error`: Crate error type
//!
//! Drawing, windowing and input belong to the host. It calls
//! [`sim::Juggler::tick`] once per frame and draws the returned sprites.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{JuggleError, Result};
pub use settings::{JugglingSettings, Palette, ThrowMode, TriggerStrategy};

/// Simulation constants
pub mod consts {
    /// Longest single integration step (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Frame times above this are capped so a stall cannot tunnel a ball through the floor
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame
    pub const MAX_SUBSTEPS: u32 = 16;
    /// Largest pattern the planner accepts
    pub const MAX_BALLS: u32 = 100;
}
