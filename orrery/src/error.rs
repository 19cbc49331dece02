use std::fmt::Display;

use crate::BodyRef;

pub type Result<T, E = SimError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Two bodies share a position while gravity is evaluated.
    DegenerateGeometry { first: BodyRef, second: BodyRef },
    InvalidMass(f64),
    InvalidRadius(f64),
    NonFinite(&'static str),
    InvalidTimestep(f64),
    InvalidScale(f64),
    InvalidFactor(f64),
    InvalidGravitationalConstant(f64),
    InvalidInterval(f64),
    InvalidStepCap,
    UnknownParent(String),
    InvalidOrbit(&'static str),
}

impl Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::DegenerateGeometry { first, second } => write!(
                f,
                "degenerate configuration: bodies {} and {} occupy the same position",
                first.index(),
                second.index()
            ),
            SimError::InvalidMass(m) => write!(f, "mass must be positive and finite, got {m}"),
            SimError::InvalidRadius(r) => {
                write!(f, "radius must be non-negative and finite, got {r}")
            }
            SimError::NonFinite(what) => write!(f, "{what} must be finite"),
            SimError::InvalidTimestep(dt) => {
                write!(f, "timestep must be positive and finite, got {dt}")
            }
            SimError::InvalidScale(s) => write!(f, "scale must be positive and finite, got {s}"),
            SimError::InvalidFactor(x) => {
                write!(f, "factor must be positive and finite, got {x}")
            }
            SimError::InvalidGravitationalConstant(g) => {
                write!(f, "gravitational constant must be positive and finite, got {g}")
            }
            SimError::InvalidInterval(ms) => {
                write!(f, "interval must be positive and at most one hour, got {ms} ms")
            }
            SimError::InvalidStepCap => write!(f, "max steps per tick must be at least 1"),
            SimError::UnknownParent(name) => write!(f, "parent body {name:?} not found"),
            SimError::InvalidOrbit(what) => write!(f, "invalid orbit: {what}"),
        }
    }
}

impl std::error::Error for SimError {}

/// Fails with `err(value)` unless `value` is finite and strictly positive.
pub(crate) fn ensure_positive(value: f64, err: fn(f64) -> SimError) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(err(value))
    }
}
