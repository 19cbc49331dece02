use std::collections::HashMap;

use cgmath::{Angle, Deg, Point2, Rad, Vector2, Zero};
use serde::Deserialize;

use crate::{
    error::{Result, SimError},
    sim::Body,
};

struct ConvertedOrbitalParams {
    name: String,
    index: usize,
    parent_index: Option<usize>,
    pos: Point2<f64>,
    vel: Vector2<f64>,
    radius: f64,
    mass: f64,
    children_mass: f64,
    children_relative_momentum: Vector2<f64>,
    children: Vec<usize>,
}

impl TryFrom<ConvertedOrbitalParams> for Body {
    type Error = SimError;

    fn try_from(value: ConvertedOrbitalParams) -> Result<Self> {
        Ok(Body::new(value.mass, value.pos, value.vel, value.radius)?.named(value.name))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbsoluteCoords {
    /// In AU
    pub pos: [f64; 2],
    /// In AU per year
    pub vel: [f64; 2],
}

/// Keplerian elements in the plane, relative to a named parent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelativeCoords {
    pub parent: String,
    // In AU
    pub semi_major_axis: f64,
    // [0, 1)
    #[serde(default)]
    pub eccentricity: f64,
    // In degrees
    #[serde(default)]
    pub arg_periapsis: f64,
    // In degrees
    #[serde(default)]
    pub true_an: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelativeOrAbsolute {
    Absolute(AbsoluteCoords),
    Relative(RelativeCoords),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandardParams {
    pub name: String,
    pub coordinates: RelativeOrAbsolute,
    pub mass: f64,
    pub radius: f64,
}

fn compute_from_orbital_params(
    parent: &ConvertedOrbitalParams,
    coords: &RelativeCoords,
    mass: f64,
    g: f64,
) -> Result<AbsoluteCoords> {
    if !(coords.semi_major_axis.is_finite() && coords.semi_major_axis > 0.0) {
        return Err(SimError::InvalidOrbit("semi-major axis must be positive"));
    }
    if !(0.0..1.0).contains(&coords.eccentricity) {
        return Err(SimError::InvalidOrbit("eccentricity must be in [0, 1)"));
    }

    let mu = g * (parent.mass + mass);
    let true_anom: Rad<f64> = Deg(coords.true_an).into();
    let arg_per: Rad<f64> = Deg(coords.arg_periapsis).into();
    let ecc = coords.eccentricity;

    let p = coords.semi_major_axis * (1.0 - ecc * ecc);
    let radius = p / (1.0 + ecc * true_anom.cos());
    let angular_momentum = (mu * p).sqrt();

    let real_angle = arg_per + true_anom;
    let radial = Vector2::new(real_angle.cos(), real_angle.sin());
    let tangential = Vector2::new(-real_angle.sin(), real_angle.cos());

    let rel_pos = radial * radius;
    let rel_vel = radial * (mu / angular_momentum * ecc * true_anom.sin())
        + tangential * (angular_momentum / radius);

    log::trace!(
        "orbit around {}: r = {radius} AU, |v| = {} AU/yr",
        coords.parent,
        (rel_vel.x * rel_vel.x + rel_vel.y * rel_vel.y).sqrt()
    );

    Ok(AbsoluteCoords {
        pos: [parent.pos.x + rel_pos.x, parent.pos.y + rel_pos.y],
        vel: [parent.vel.x + rel_vel.x, parent.vel.y + rel_vel.y],
    })
}

fn apply_vdiff_rec(objects: &mut [ConvertedOrbitalParams], idx: usize, v_diff: Vector2<f64>) {
    objects[idx].vel -= v_diff;
    for child in objects[idx].children.clone() {
        apply_vdiff_rec(objects, child, v_diff);
    }
}

/// Resolves orbital elements into absolute bodies, in input order.
///
/// Parents must appear before their children. Every subsystem is shifted so its
/// barycenter, rather than the parent alone, follows the requested orbit.
pub fn convert_params(items: impl IntoIterator<Item = StandardParams>, g: f64) -> Result<Vec<Body>> {
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut converted: Vec<ConvertedOrbitalParams> = Vec::new();

    for (idx, item) in items.into_iter().enumerate() {
        let (absolute_coords, parent_idx) = match item.coordinates {
            RelativeOrAbsolute::Absolute(x) => (x, None),
            RelativeOrAbsolute::Relative(r) => {
                let parent_idx = *by_name
                    .get(&r.parent)
                    .ok_or_else(|| SimError::UnknownParent(r.parent.clone()))?;
                (
                    compute_from_orbital_params(&converted[parent_idx], &r, item.mass, g)?,
                    Some(parent_idx),
                )
            }
        };

        by_name.insert(item.name.clone(), idx);
        converted.push(ConvertedOrbitalParams {
            name: item.name,
            index: idx,
            parent_index: parent_idx,
            pos: absolute_coords.pos.into(),
            vel: absolute_coords.vel.into(),
            radius: item.radius,
            mass: item.mass,
            children_mass: 0.0,
            children_relative_momentum: Vector2::zero(),
            children: Vec::new(),
        });
    }

    // Walk the parent tree from the leaves up. For each node, the children's
    // momentum relative to it is spread over the whole subsystem and removed,
    // which leaves the subsystem barycenter on the node's own requested orbit.
    // Input order is already a topological order, so reverse order visits
    // children before parents.
    for i in (0..converted.len()).rev() {
        let v_diff = converted[i].children_relative_momentum
            / (converted[i].mass + converted[i].children_mass);
        apply_vdiff_rec(&mut converted, i, v_diff);

        let obj = &converted[i];
        if let Some(parent_idx) = obj.parent_index {
            let parent_vel = converted[parent_idx].vel;
            let own_relative_momentum = (obj.vel - parent_vel) * (obj.mass + obj.children_mass)
                + obj.children_relative_momentum;
            let subsystem_mass = obj.mass + obj.children_mass;
            let index = obj.index;

            let parent = &mut converted[parent_idx];
            parent.children_mass += subsystem_mass;
            parent.children_relative_momentum += own_relative_momentum;
            parent.children.push(index);
        }
    }

    converted.into_iter().map(Body::try_from).collect()
}
