//! Headless core of a toy N-body solar system: pairwise gravity, adaptive
//! time stepping and a 2D camera. Drawing and input belong to the caller.

pub mod camera;
pub mod config;
pub mod constants;
mod error;
pub mod event_loop;
pub mod parameters;
pub mod presets;
pub mod session;
pub mod sim;
pub mod time_controller;

pub use camera::{Camera, PanDirection, ZoomDirection};
pub use config::{BodyConfig, ScenarioConfig, SessionConfig};
pub use error::{Result, SimError};
pub use event_loop::{LoopStats, run_headless};
pub use presets::Preset;
pub use session::{RenderedBody, Session, TickReport};
pub use sim::{Body, BodyRef, DegeneratePolicy, ElapsedTime, Integrator, StepReport};
pub use time_controller::{PlayState, TickPlan, TimeController};
