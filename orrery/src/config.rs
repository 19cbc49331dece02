//! Session configuration and scenario files.
//!
//! A scenario is a YAML document with an optional `session` block and a list of
//! `bodies`. Bodies are given either by absolute position and velocity or by
//! orbital elements relative to an earlier body:
//!
//! ```yaml
//! session:
//!   dt: 0.0005
//!   scale: 150.0
//!   degenerate_policy: fail
//!
//! bodies:
//!   - name: sun
//!     mass: 333000.0
//!     radius: 0.075
//!   - name: earth
//!     mass: 1.0
//!     radius: 0.01
//!     orbit: { parent: sun, semi_major_axis: 1.0, eccentricity: 0.0167 }
//!   - name: rogue
//!     mass: 10.0
//!     position: [3.0, 0.0]
//!     velocity: [-0.5, -0.2]
//! ```

use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use serde::Deserialize;

use crate::{
    Body,
    constants::{
        DEFAULT_DT, DEFAULT_RUN_TIME_MS, DEFAULT_SCALE, DISPLAY_INTERVAL_MS, G,
        MAX_STEPS_PER_TICK, MIN_PICK_RADIUS, PAN_AMOUNT, SPEED_FACTOR, ZOOM_FACTOR,
    },
    error::{Result, SimError, ensure_positive},
    parameters::{AbsoluteCoords, RelativeCoords, RelativeOrAbsolute, StandardParams, convert_params},
    sim::DegeneratePolicy,
};

/// Everything a session needs besides its bodies. Missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// In AU^3 per earth mass per year^2
    pub gravitational_constant: f64,
    /// Simulated years per integrator call
    pub dt: f64,
    pub run_time_ms: f64,
    pub display_interval_ms: f64,
    pub max_steps_per_tick: u32,
    /// Initial camera position, in AU
    pub camera: [f64; 2],
    /// Display units per AU
    pub scale: f64,
    pub zoom_factor: f64,
    pub speed_factor: f64,
    /// Display units per pan
    pub pan_amount: f64,
    /// Minimum hit radius for picking bodies, in display units
    pub pick_radius: f64,
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: G,
            dt: DEFAULT_DT,
            run_time_ms: DEFAULT_RUN_TIME_MS,
            display_interval_ms: DISPLAY_INTERVAL_MS,
            max_steps_per_tick: MAX_STEPS_PER_TICK,
            camera: [0.0, 0.0],
            scale: DEFAULT_SCALE,
            zoom_factor: ZOOM_FACTOR,
            speed_factor: SPEED_FACTOR,
            pan_amount: PAN_AMOUNT,
            pick_radius: MIN_PICK_RADIUS,
            degenerate_policy: DegeneratePolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Checks the fields no other component validates on its own.
    pub fn validate(&self) -> Result<()> {
        ensure_positive(self.speed_factor, SimError::InvalidFactor)?;
        ensure_positive(self.pan_amount, SimError::InvalidFactor)?;
        if !(self.pick_radius.is_finite() && self.pick_radius >= 0.0) {
            return Err(SimError::NonFinite("pick radius"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// In earth masses
    pub mass: f64,
    /// Display radius, in AU
    #[serde(default)]
    pub radius: f64,
    /// In AU
    #[serde(default)]
    pub position: Option<[f64; 2]>,
    /// In AU per year
    #[serde(default)]
    pub velocity: Option<[f64; 2]>,
    #[serde(default)]
    pub orbit: Option<RelativeCoords>,
}

impl BodyConfig {
    fn into_params(self, idx: usize) -> Result<StandardParams> {
        let coordinates = match (self.orbit, self.position, self.velocity) {
            (Some(orbit), None, None) => RelativeOrAbsolute::Relative(orbit),
            (Some(_), _, _) => {
                return Err(SimError::InvalidOrbit(
                    "a body takes either an orbit or a position and velocity",
                ));
            }
            (None, pos, vel) => RelativeOrAbsolute::Absolute(AbsoluteCoords {
                pos: pos.unwrap_or_default(),
                vel: vel.unwrap_or_default(),
            }),
        };
        Ok(StandardParams {
            name: self.name.unwrap_or_else(|| format!("body_{idx}")),
            coordinates,
            mass: self.mass,
            radius: self.radius,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub session: SessionConfig,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let scenario = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(scenario)
    }

    /// Resolves the body list with the scenario's own gravitational constant.
    pub fn build_bodies(&self) -> Result<Vec<Body>> {
        let params = self
            .bodies
            .iter()
            .cloned()
            .enumerate()
            .map(|(idx, body)| body.into_params(idx))
            .collect::<Result<Vec<_>>>()?;
        convert_params(params, self.session.gravitational_constant)
    }
}
