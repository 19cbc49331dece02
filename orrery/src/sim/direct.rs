use cgmath::Vector2;

use crate::{
    error::{Result, SimError},
    sim::{Body, BodyRef, DegeneratePolicy},
};

pub fn add_rec(bodies: &mut [Body], acc: &[Vector2<f64>], dt: f64) {
    for (body, acc) in bodies.iter_mut().zip(acc.iter()) {
        // Kick with the acceleration from the start of the step,
        // then drift along the updated velocity.
        body.vel += *acc * dt;
        body.step(dt);
    }
}

/// Accumulates pairwise accelerations into `out_buffer`, visiting each
/// unordered pair once in index order.
pub fn iter(
    bodies: &[Body],
    out_buffer: &mut [Vector2<f64>],
    g: f64,
    policy: DegeneratePolicy,
    skipped: &mut Vec<(BodyRef, BodyRef)>,
) -> Result<()> {
    debug_assert_eq!(bodies.len(), out_buffer.len());
    for (i, first) in bodies.iter().enumerate() {
        for (j, second) in bodies.iter().enumerate().skip(i + 1) {
            match (first.acc_towards(second, g), second.acc_towards(first, g)) {
                (Ok(on_first), Ok(on_second)) => {
                    out_buffer[i] += on_first;
                    out_buffer[j] += on_second;
                }
                _ => {
                    let pair = (BodyRef::new(i), BodyRef::new(j));
                    match policy {
                        DegeneratePolicy::Fail => {
                            return Err(SimError::DegenerateGeometry {
                                first: pair.0,
                                second: pair.1,
                            });
                        }
                        DegeneratePolicy::SkipPair => skipped.push(pair),
                    }
                }
            }
        }
    }
    Ok(())
}
