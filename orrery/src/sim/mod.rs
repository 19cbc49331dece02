use std::fmt::Display;

use cgmath::{InnerSpace, Point2, Vector2, Zero};
use serde::Deserialize;

use crate::error::{Result, SimError, ensure_positive};

pub mod diagnostics;
mod direct;

/// Index of a body in a session's collection. Does not own or borrow the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyRef(usize);

impl BodyRef {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// Returned when two bodies sit on the same point and the force between them is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coincident;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    /// Position, in AU
    pub pos: Point2<f64>,
    /// Velocity, in AU per year
    pub vel: Vector2<f64>,
    /// Mass, in earth masses
    pub mass: f64,
    /// Display radius, in AU
    pub radius: f64,
}

impl Body {
    pub fn new(mass: f64, pos: Point2<f64>, vel: Vector2<f64>, radius: f64) -> Result<Self> {
        let body = Self {
            name: String::new(),
            pos,
            vel,
            mass,
            radius,
        };
        body.validate()?;
        Ok(body)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive(self.mass, SimError::InvalidMass)?;
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return Err(SimError::InvalidRadius(self.radius));
        }
        if !(self.pos.x.is_finite() && self.pos.y.is_finite()) {
            return Err(SimError::NonFinite("position"));
        }
        if !(self.vel.x.is_finite() && self.vel.y.is_finite()) {
            return Err(SimError::NonFinite("velocity"));
        }
        Ok(())
    }

    /// Moves the body along its current velocity.
    #[inline]
    pub fn step(&mut self, dt: f64) {
        self.pos += self.vel * dt;
    }

    /// Gravitational acceleration of this body towards `other`.
    #[inline]
    pub fn acc_towards(&self, other: &Body, g: f64) -> Result<Vector2<f64>, Coincident> {
        let rel = other.pos - self.pos;
        let mag_sq = rel.magnitude2();
        if mag_sq == 0.0 {
            return Err(Coincident);
        }
        Ok(rel * (g * other.mass / (mag_sq * mag_sq.sqrt())))
    }

    /// Force exerted on this body by `other`, in earth masses AU per year squared.
    pub fn force_from(&self, other: &Body, g: f64) -> Result<Vector2<f64>, Coincident> {
        Ok(self.acc_towards(other, g)? * self.mass)
    }

    /// Kicks the velocity by the pull of `other` over `dt`. Leaves the body untouched on failure.
    pub fn apply_gravity_from(&mut self, other: &Body, g: f64, dt: f64) -> Result<(), Coincident> {
        let acc = self.acc_towards(other, g)?;
        self.vel += acc * dt;
        Ok(())
    }
}

/// What a step does with a pair of coincident bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Abort the step without moving anything.
    Fail,
    /// Leave the pair out of this step and report it.
    #[default]
    SkipPair,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepReport {
    pub skipped: Vec<(BodyRef, BodyRef)>,
}

impl StepReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Pairwise semi-implicit Euler integrator.
///
/// The acceleration buffer is reused between steps so a step does not allocate.
pub struct Integrator {
    gravitational_constant: f64,
    policy: DegeneratePolicy,
    out_buffer: Vec<Vector2<f64>>,
}

impl Integrator {
    pub fn new(gravitational_constant: f64, policy: DegeneratePolicy) -> Result<Self> {
        ensure_positive(
            gravitational_constant,
            SimError::InvalidGravitationalConstant,
        )?;
        Ok(Self {
            gravitational_constant,
            policy,
            out_buffer: Vec::new(),
        })
    }

    pub fn gravitational_constant(&self) -> f64 {
        self.gravitational_constant
    }

    pub fn policy(&self) -> DegeneratePolicy {
        self.policy
    }

    /// Advances every body by `dt`. All velocities are kicked from the
    /// positions at the start of the step before anything drifts.
    pub fn exec_iter(&mut self, bodies: &mut [Body], dt: f64) -> Result<StepReport> {
        let mut report = StepReport::default();
        if bodies.is_empty() {
            return Ok(report);
        }

        self.out_buffer.clear();
        self.out_buffer.resize(bodies.len(), Vector2::zero());

        direct::iter(
            bodies,
            &mut self.out_buffer,
            self.gravitational_constant,
            self.policy,
            &mut report.skipped,
        )?;
        direct::add_rec(bodies, &self.out_buffer, dt);

        Ok(report)
    }
}

const SEC_PER_HOUR: f64 = 60.0 * 60.0;
const SEC_PER_DAY: f64 = SEC_PER_HOUR * 24.0;
const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ElapsedTime {
    pub years: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub steps: u64,
}

impl Display for ElapsedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}Y {}D {:0>2}:{:0>2}:{:0>2} ({} steps)",
            self.years, self.days, self.hours, self.minutes, self.seconds, self.steps
        )
    }
}

/// Breaks simulated years down to the nearest whole second.
pub fn compute_elapsed_time(sim_years: f64, steps: u64) -> ElapsedTime {
    let sim_years = sim_years.max(0.0);
    let mut years = sim_years.floor();
    let mut time_s = ((sim_years - years) * DAYS_PER_YEAR * SEC_PER_DAY).round();
    if time_s >= DAYS_PER_YEAR * SEC_PER_DAY {
        years += 1.0;
        time_s = 0.0;
    }

    let days = (time_s / SEC_PER_DAY).floor();
    time_s -= days * SEC_PER_DAY;
    let hours = (time_s / SEC_PER_HOUR).floor();
    time_s -= hours * SEC_PER_HOUR;
    let minutes = (time_s / 60.0).floor();
    let seconds = time_s - minutes * 60.0;

    ElapsedTime {
        years: years as u64,
        days: days as u64,
        hours: hours as u64,
        minutes: minutes as u64,
        seconds: seconds as u64,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{InnerSpace, Point2, Vector2};

    use super::*;
    use crate::constants::G;

    fn body(mass: f64, x: f64, y: f64) -> Body {
        Body::new(mass, Point2::new(x, y), Vector2::new(0.0, 0.0), 0.01).unwrap()
    }

    #[test]
    fn rejects_invalid_bodies() {
        let origin = Point2::new(0.0, 0.0);
        let still = Vector2::new(0.0, 0.0);
        assert_eq!(
            Body::new(0.0, origin, still, 1.0),
            Err(SimError::InvalidMass(0.0))
        );
        assert_eq!(
            Body::new(-1.0, origin, still, 1.0),
            Err(SimError::InvalidMass(-1.0))
        );
        assert_eq!(
            Body::new(1.0, origin, still, -0.5),
            Err(SimError::InvalidRadius(-0.5))
        );
        assert_eq!(
            Body::new(1.0, Point2::new(f64::NAN, 0.0), still, 0.0),
            Err(SimError::NonFinite("position"))
        );
        assert!(Body::new(1.0, origin, still, 0.0).is_ok());
    }

    #[test]
    fn newton_third_law() {
        let a = body(333000.0, 0.3, -0.2);
        let b = body(1.0, 1.1, 0.7);

        let on_a = a.force_from(&b, G).unwrap();
        let on_b = b.force_from(&a, G).unwrap();

        assert_relative_eq!(on_a.magnitude(), on_b.magnitude(), max_relative = 1e-12);
        assert_relative_eq!(on_a.x, -on_b.x, max_relative = 1e-12);
        assert_relative_eq!(on_a.y, -on_b.y, max_relative = 1e-12);
    }

    #[test]
    fn acceleration_points_towards_other_and_follows_inverse_square() {
        let a = body(1.0, 0.0, 0.0);
        let near = body(10.0, 1.0, 0.0);
        let far = body(10.0, 2.0, 0.0);

        let acc_near = a.acc_towards(&near, G).unwrap();
        let acc_far = a.acc_towards(&far, G).unwrap();

        assert!(acc_near.x > 0.0);
        assert_eq!(acc_near.y, 0.0);
        assert_relative_eq!(acc_near.x, G * 10.0, max_relative = 1e-12);
        assert_relative_eq!(acc_near.x / acc_far.x, 4.0, max_relative = 1e-12);
    }

    #[test]
    fn coincident_bodies_are_rejected_without_mutation() {
        let mut a = body(1.0, 0.5, 0.5);
        let b = body(2.0, 0.5, 0.5);
        let before = a.clone();

        assert_eq!(a.apply_gravity_from(&b, G, 0.01), Err(Coincident));
        assert_eq!(a, before);
    }

    #[test]
    fn step_moves_along_velocity() {
        let mut a = Body::new(1.0, Point2::new(1.0, 2.0), Vector2::new(0.5, -1.0), 0.0).unwrap();
        a.step(0.1);
        assert_relative_eq!(a.pos.x, 1.05);
        assert_relative_eq!(a.pos.y, 1.9);
    }

    #[test]
    fn fail_policy_leaves_bodies_untouched() {
        let mut bodies = vec![body(1.0, 0.0, 0.0), body(1.0, 1.0, 0.0), body(1.0, 1.0, 0.0)];
        let before = bodies.clone();
        let mut integrator = Integrator::new(G, DegeneratePolicy::Fail).unwrap();

        let err = integrator.exec_iter(&mut bodies, 0.01).unwrap_err();

        assert_eq!(
            err,
            SimError::DegenerateGeometry {
                first: BodyRef::new(1),
                second: BodyRef::new(2)
            }
        );
        assert_eq!(bodies, before);
    }

    #[test]
    fn skip_policy_reports_pair_and_integrates_the_rest() {
        let mut bodies = vec![body(1.0, 0.0, 0.0), body(1.0, 1.0, 0.0), body(1.0, 1.0, 0.0)];
        let mut integrator = Integrator::new(G, DegeneratePolicy::SkipPair).unwrap();

        let report = integrator.exec_iter(&mut bodies, 0.01).unwrap();

        assert_eq!(report.skipped, vec![(BodyRef::new(1), BodyRef::new(2))]);
        assert!(bodies[0].vel.x > 0.0);
        assert!(bodies[1].vel.x < 0.0);
        assert_eq!(bodies[1].vel, bodies[2].vel);
    }

    #[test]
    fn empty_collection_is_a_no_op() {
        let mut integrator = Integrator::new(G, DegeneratePolicy::Fail).unwrap();
        let report = integrator.exec_iter(&mut [], 0.01).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn rejects_non_positive_gravitational_constant() {
        assert!(Integrator::new(0.0, DegeneratePolicy::Fail).is_err());
        assert!(Integrator::new(f64::INFINITY, DegeneratePolicy::Fail).is_err());
    }

    #[test]
    fn elapsed_time_breaks_down_years() {
        let t = compute_elapsed_time(2.5, 2500);
        assert_eq!(t.years, 2);
        assert_eq!(t.days, 182);
        assert_eq!(t.hours, 15);
        assert_eq!(t.steps, 2500);
        assert_eq!(t.to_string(), "2Y 182D 15:00:00 (2500 steps)");
    }

    #[test]
    fn elapsed_time_carries_rounded_seconds() {
        let year_s = DAYS_PER_YEAR * SEC_PER_DAY;
        let t = compute_elapsed_time(59.6 / year_s, 1);
        assert_eq!(t.to_string(), "0Y 0D 00:01:00 (1 steps)");

        let t = compute_elapsed_time((3600.0 - 0.4) / year_s, 1);
        assert_eq!((t.hours, t.minutes, t.seconds), (1, 0, 0));

        let t = compute_elapsed_time((3600.0 + 59.4) / year_s, 1);
        assert_eq!((t.hours, t.minutes, t.seconds), (1, 0, 59));

        let t = compute_elapsed_time(1.0 - 0.2 / year_s, 1);
        assert_eq!((t.years, t.days, t.seconds), (1, 0, 0));
    }

    #[test]
    fn gravity_kick_uses_pull_towards_other() {
        let mut a = body(1.0, 0.0, 0.0);
        let b = body(4.0, 2.0, 0.0);
        a.vel = Vector2::new(0.5, 1.0);

        a.apply_gravity_from(&b, G, 0.1).unwrap();

        // |acc| = G * 4 / 2^2 along +x
        assert_relative_eq!(a.vel.x, 0.5 + G * 0.1, max_relative = 1e-12);
        assert_relative_eq!(a.vel.y, 1.0);
        assert_eq!(a.pos, Point2::new(0.0, 0.0));
    }

    #[test]
    fn integrator_matches_pairwise_kicks() {
        let mut bodies = vec![body(3.0, 0.0, 0.0), body(1.0, 1.0, 0.0), body(2.0, 0.0, 2.0)];
        let mut expected = bodies.clone();
        for i in 0..expected.len() {
            for j in 0..bodies.len() {
                if i != j {
                    expected[i].apply_gravity_from(&bodies[j], G, 0.01).unwrap();
                }
            }
            expected[i].step(0.01);
        }

        Integrator::new(G, DegeneratePolicy::Fail)
            .unwrap()
            .exec_iter(&mut bodies, 0.01)
            .unwrap();

        for (got, want) in bodies.iter().zip(&expected) {
            assert_relative_eq!(got.vel.x, want.vel.x, max_relative = 1e-12);
            assert_relative_eq!(got.vel.y, want.vel.y, max_relative = 1e-12);
            assert_relative_eq!(got.pos.x, want.pos.x, max_relative = 1e-12);
            assert_relative_eq!(got.pos.y, want.pos.y, max_relative = 1e-12);
        }
    }
}
