//! Conserved quantities of a body collection, used to watch integration drift.

use cgmath::{EuclideanSpace, InnerSpace, Point2, Vector2, Zero};

use crate::sim::Body;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    /// z component of the total angular momentum about the origin
    pub angular_momentum: f64,
    pub momentum: Vector2<f64>,
    pub center_of_mass: Point2<f64>,
}

impl Diagnostics {
    pub fn measure(bodies: &[Body], g: f64) -> Self {
        Self {
            kinetic_energy: kinetic_energy(bodies),
            potential_energy: potential_energy(bodies, g),
            angular_momentum: angular_momentum(bodies),
            momentum: momentum(bodies),
            center_of_mass: center_of_mass(bodies),
        }
    }

    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy + self.potential_energy
    }

    /// Relative change of total energy against an earlier measurement.
    pub fn energy_drift(&self, initial: &Diagnostics) -> f64 {
        let e0 = initial.total_energy();
        if e0.abs() > 1e-20 {
            (self.total_energy() - e0).abs() / e0.abs()
        } else {
            0.0
        }
    }
}

pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies
        .iter()
        .map(|b| 0.5 * b.mass * b.vel.magnitude2())
        .sum()
}

/// Coincident pairs are left out.
pub fn potential_energy(bodies: &[Body], g: f64) -> f64 {
    let mut total = 0.0;
    for (i, first) in bodies.iter().enumerate() {
        for second in &bodies[i + 1..] {
            let dist = (second.pos - first.pos).magnitude();
            if dist > 0.0 {
                total -= g * first.mass * second.mass / dist;
            }
        }
    }
    total
}

pub fn angular_momentum(bodies: &[Body]) -> f64 {
    bodies
        .iter()
        .map(|b| b.mass * (b.pos.x * b.vel.y - b.pos.y * b.vel.x))
        .sum()
}

pub fn momentum(bodies: &[Body]) -> Vector2<f64> {
    bodies
        .iter()
        .fold(Vector2::zero(), |acc, b| acc + b.vel * b.mass)
}

pub fn center_of_mass(bodies: &[Body]) -> Point2<f64> {
    let total_mass: f64 = bodies.iter().map(|b| b.mass).sum();
    if total_mass <= 0.0 {
        return Point2::origin();
    }
    let weighted = bodies
        .iter()
        .fold(Vector2::zero(), |acc, b| acc + b.pos.to_vec() * b.mass);
    Point2::from_vec(weighted / total_mass)
}
