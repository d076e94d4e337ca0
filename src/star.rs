//! Precomputed five-point star outlines at discrete rotations.
//!
//! Stars spin around their vertical axis, so a rotated star is the flat outline with its x
//! coordinates foreshortened by `cos(angle)`. The table covers a full turn in 2-degree steps.

use crate::foundation::core::Point;
use std::f64::consts::PI;
use std::sync::LazyLock;

/// Number of discrete rotations in the table (2 degrees apart).
pub const STAR_ROTATIONS: usize = 180;
/// Outline vertices per star: the apex plus five outer/inner pairs.
pub const STAR_VERTICES: usize = 11;
/// Diameter of the outer points before per-particle scaling.
pub const STAR_SIZE: f64 = 40.0;

const SPIKES: usize = 5;

/// One star outline centered on the origin.
pub type StarOutline = [Point; STAR_VERTICES];

static STAR_TABLE: LazyLock<Vec<StarOutline>> = LazyLock::new(build_table);

/// Process-wide star table, built on first access.
pub fn star_table() -> &'static [StarOutline] {
    &STAR_TABLE
}

/// Outline for a rotation in degrees; any value is wrapped into `[0, 360)`.
pub fn star_at_rotation(rotation_deg: f64) -> &'static StarOutline {
    let r = if rotation_deg.is_finite() {
        rotation_deg.rem_euclid(360.0)
    } else {
        0.0
    };
    let idx = ((r / 2.0).floor() as usize).min(STAR_ROTATIONS - 1);
    &STAR_TABLE[idx]
}

fn flat_outline() -> [[f64; 3]; STAR_VERTICES] {
    let outer = STAR_SIZE / 2.0;
    let inner = outer / 2.0;
    let step = PI / SPIKES as f64;

    let mut out = [[0.0; 3]; STAR_VERTICES];
    out[0] = [0.0, -outer, 0.0];
    let mut rot = PI / 2.0 * 3.0;
    for i in 0..SPIKES {
        out[1 + 2 * i] = [rot.cos() * outer, rot.sin() * outer, 0.0];
        rot += step;
        out[2 + 2 * i] = [rot.cos() * inner, rot.sin() * inner, 0.0];
        rot += step;
    }
    out
}

fn rotate_y(v: [f64; 3], angle: f64) -> Point {
    // Rotation about the y axis; the z component is dropped by the projection.
    let (sin, cos) = angle.sin_cos();
    Point::new(cos * v[0] + sin * v[2], v[1])
}

fn build_table() -> Vec<StarOutline> {
    let flat = flat_outline();
    (0..STAR_ROTATIONS)
        .map(|s| {
            let angle = PI * 2.0 / STAR_ROTATIONS as f64 * s as f64;
            let mut outline = [Point::ZERO; STAR_VERTICES];
            for (dst, v) in outline.iter_mut().zip(flat.iter()) {
                *dst = rotate_y(*v, angle);
            }
            outline
        })
        .collect()
}
