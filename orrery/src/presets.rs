use cgmath::{Point2, Vector2};

use crate::{
    Body,
    constants::SUN_MASS,
    error::Result,
    parameters::{
        AbsoluteCoords, RelativeCoords, RelativeOrAbsolute, StandardParams, convert_params,
    },
};

/// Built-in scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Sun, earth and a small body just outside earth's orbit
    Classic,
    /// Sun and earth on a circular orbit
    TwoBody,
    /// Sun, the four inner planets and the moon
    InnerPlanets,
    /// Inner planets plus a random asteroid belt
    Belt,
}

impl Preset {
    pub fn bodies(self, g: f64) -> Result<Vec<Body>> {
        match self {
            Preset::Classic => classic(),
            Preset::TwoBody => two_body_circular(g, 1.0),
            Preset::InnerPlanets => convert_params(inner_planets_params(), g),
            Preset::Belt => {
                let mut params = inner_planets_params();
                params.append(&mut asteroid_belt(200));
                convert_params(params, g)
            }
        }
    }
}

pub fn classic() -> Result<Vec<Body>> {
    let tau = std::f64::consts::TAU;
    Ok(vec![
        Body::new(SUN_MASS, Point2::new(0.0, 0.0), Vector2::new(0.0, 0.0), 0.075)?.named("sun"),
        Body::new(1.0, Point2::new(1.0, 0.0), Vector2::new(0.0, -tau), 0.01)?.named("earth"),
        Body::new(
            0.01,
            Point2::new(1.002, 0.0),
            Vector2::new(0.0, -tau - 0.2),
            0.005,
        )?
        .named("moonlet"),
    ])
}

/// A planet of one earth mass on a circular orbit of `radius` AU around a resting sun.
pub fn two_body_circular(g: f64, radius: f64) -> Result<Vec<Body>> {
    let speed = (g * SUN_MASS / radius).sqrt();
    Ok(vec![
        Body::new(SUN_MASS, Point2::new(0.0, 0.0), Vector2::new(0.0, 0.0), 0.075)?.named("sun"),
        Body::new(1.0, Point2::new(radius, 0.0), Vector2::new(0.0, speed), 0.01)?.named("earth"),
    ])
}

#[allow(clippy::excessive_precision)] // Copy-pasted from online sources
pub fn inner_planets_params() -> Vec<StandardParams> {
    let orbit = |parent: &str, a: f64, e: f64, arg_periapsis: f64, true_an: f64| {
        RelativeOrAbsolute::Relative(RelativeCoords {
            parent: parent.to_owned(),
            semi_major_axis: a,
            eccentricity: e,
            arg_periapsis,
            true_an,
        })
    };

    vec![
        StandardParams {
            name: "sun".to_owned(),
            coordinates: RelativeOrAbsolute::Absolute(AbsoluteCoords {
                pos: [0.0, 0.0],
                vel: [0.0, 0.0],
            }),
            mass: SUN_MASS,
            radius: 0.075,
        },
        StandardParams {
            name: "mercury".to_owned(),
            coordinates: orbit("sun", 0.387098, 0.205630, 77.45779628, 174.796),
            mass: 0.0553,
            radius: 0.006,
        },
        StandardParams {
            name: "venus".to_owned(),
            coordinates: orbit("sun", 0.723332, 0.006772, 131.60246718, 50.115),
            mass: 0.815,
            radius: 0.009,
        },
        StandardParams {
            name: "earth".to_owned(),
            coordinates: orbit("sun", 1.000001018, 1.639588231990315E-02, 102.93768193, 345.0278),
            mass: 1.0,
            radius: 0.01,
        },
        StandardParams {
            name: "moon".to_owned(),
            coordinates: orbit("earth", 2.55077e-3, 3.179523012872624E-02, 318.15, 64.54),
            mass: 0.0123,
            radius: 0.003,
        },
        StandardParams {
            name: "mars".to_owned(),
            coordinates: orbit("sun", 1.523679, 0.0935, 336.04084, 19.373),
            mass: 0.107,
            radius: 0.007,
        },
    ]
}

pub fn asteroid_belt(n_asteroids: usize) -> Vec<StandardParams> {
    let mut objs = Vec::with_capacity(n_asteroids);
    for i in 0..n_asteroids {
        objs.push(StandardParams {
            name: format!("asteroid_{i}"),
            coordinates: RelativeOrAbsolute::Relative(RelativeCoords {
                parent: "sun".to_owned(),
                semi_major_axis: 2.7 + rand::random_range(-1.0..1.0) * 0.5,
                eccentricity: rand::random_range(0.0..0.15),
                arg_periapsis: rand::random_range(0.0..360.0),
                true_an: rand::random_range(0.0..360.0),
            }),
            mass: rand::random_range(1e-10..1e-6),
            radius: rand::random_range(0.001..0.003),
        });
    }
    objs
}
