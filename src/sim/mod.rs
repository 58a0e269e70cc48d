//! Juggling simulation
//!
//! Single-threaded and frame driven: the controller owns all state and
//! mutates it only inside `tick` and the host event handlers.
//! No rendering or platform dependencies.

pub mod ball;
pub mod controller;
pub mod environment;
pub mod planner;

pub use ball::{Ball, Occupancy};
pub use controller::{BallSprite, HandTimers, JuggleEvent, Juggler};
pub use environment::{Environment, Hand};
pub use planner::{ThrowPlan, plan, throw_interval, throw_range, throw_vector_from_distance_height};
