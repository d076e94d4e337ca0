//! Particle state and the per-tick integrator.
//!
//! A [`Particle`] is created once per burst member by [`Particle::initialize`] and advanced by
//! [`Particle::step`], which integrates one tick and returns the shape to draw for it.

use crate::color::{Rgb, hsla_to_rgba};
use crate::foundation::core::{Point, Vec2};
use crate::options::{BurstConfig, Magnet, StarSpec};
use crate::star::star_at_rotation;
use crate::surface::draw::{DrawCommand, StrokeStyle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f64::consts::PI;
use std::sync::Arc;

/// Burst gravity is scaled by this factor when copied onto a particle.
pub const GRAVITY_SCALE: f64 = 3.0;

const OVAL_SCALAR: f64 = 0.6;
const MAGNET_MIN_DISTANCE: f64 = 0.1;
const WOBBLE_RADIUS: f64 = 10.0;

/// Particle silhouette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Square,
    Circle,
    Star,
}

/// Spin state of a star particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarState {
    pub scale: f64,
    /// Degrees added per tick, already doubled.
    pub spin: f64,
    /// Current rotation in degrees, always in `[0, 360)`.
    pub rotation: f64,
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl StarState {
    fn launch(spec: &StarSpec, rng: &mut impl Rng) -> Self {
        Self {
            scale: spec.scale,
            spin: spec.velocity * (0.8 + 0.4 * rng.random::<f64>()) * 2.0,
            rotation: (rng.random::<f64>() * 180.0).floor(),
            hue: spec.hue,
            saturation: spec.saturation,
            lightness: spec.lightness,
        }
    }

    fn advance(&mut self) {
        let r = (self.rotation + self.spin).rem_euclid(360.0);
        // rem_euclid can round tiny negative inputs up to exactly 360.
        self.rotation = if r.is_finite() && r < 360.0 { r } else { 0.0 };
    }
}

/// Result of integrating one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// What to draw for this tick.
    pub draw: DrawCommand,
    /// `false` once the particle has used its tick budget.
    pub alive: bool,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pos: Point,
    velocity: f64,
    angle_2d: f64,
    velocity_vec: Vec2,
    wobble: f64,
    wobble_speed: f64,
    tilt_angle: f64,
    tilt_sin: f64,
    tilt_cos: f64,
    jitter: f64,
    color: Rgb,
    shape: Shape,
    tick: u32,
    total_ticks: u32,
    decay: f64,
    gravity: f64,
    drift: f64,
    scalar: f64,
    star: Option<StarState>,
    magnet: Option<Arc<Magnet>>,
}

impl Particle {
    /// Create a particle at `origin` with randomized launch parameters.
    ///
    /// A burst carrying a star descriptor turns every particle into a star; a `Star` shape on its
    /// own spins with the default descriptor.
    pub fn initialize(
        config: &BurstConfig,
        origin: Point,
        color: Rgb,
        shape: Shape,
        rng: &mut impl Rng,
    ) -> Self {
        let star_spec = match (config.stars, shape) {
            (Some(spec), _) => Some(spec),
            (None, Shape::Star) => Some(StarSpec::default()),
            (None, _) => None,
        };
        let star = star_spec.map(|spec| StarState::launch(&spec, rng));

        let velocity = config.start_velocity * 0.5 + rng.random::<f64>() * config.start_velocity;
        let angle_2d = -config.angle + (0.5 * config.spread - rng.random::<f64>() * config.spread);

        Self {
            pos: origin,
            velocity,
            angle_2d,
            velocity_vec: Vec2::new(velocity * angle_2d.cos(), velocity * angle_2d.sin()),
            wobble: rng.random::<f64>() * 10.0,
            wobble_speed: (rng.random::<f64>() * 0.1 + 0.05).min(0.11),
            tilt_angle: (rng.random::<f64>() * 0.5 + 0.25) * PI,
            tilt_sin: 0.0,
            tilt_cos: 0.0,
            jitter: rng.random::<f64>() + 2.0,
            color,
            shape,
            tick: 0,
            total_ticks: config.ticks,
            decay: config.decay,
            gravity: config.gravity * GRAVITY_SCALE,
            drift: config.drift,
            scalar: config.scalar,
            star,
            magnet: config.magnet.clone(),
        }
    }

    /// Integrate one tick and produce its draw command.
    pub fn step(&mut self, rng: &mut impl Rng) -> Step {
        match self.star.as_mut() {
            Some(star) => star.advance(),
            None => {
                self.tilt_angle += 0.1;
                (self.tilt_sin, self.tilt_cos) = self.tilt_angle.sin_cos();
            }
        }

        match self.magnet.as_deref() {
            Some(m) => {
                let to_target = m.target - self.pos;
                let unit = to_target / to_target.hypot().max(MAGNET_MIN_DISTANCE);
                self.velocity_vec += unit * m.strength - self.velocity_vec * m.drag;
                self.velocity_vec.y += self.gravity;
                self.pos += self.velocity_vec;
            }
            None => {
                self.pos.x += self.angle_2d.cos() * self.velocity + self.drift;
                self.pos.y += self.angle_2d.sin() * self.velocity + self.gravity;
            }
        }

        self.wobble += self.wobble_speed;
        self.velocity *= self.decay;
        self.jitter = rng.random::<f64>() + 2.0;

        let progress = f64::from(self.tick) / f64::from(self.total_ticks.max(1));
        let alpha = (1.0 - progress) as f32;
        let draw = self.draw_command(alpha);

        self.tick = self.tick.saturating_add(1);
        Step {
            draw,
            alive: self.tick < self.total_ticks,
        }
    }

    fn draw_command(&self, alpha: f32) -> DrawCommand {
        let wobble_pos = self.pos
            + Vec2::new(self.wobble.cos(), self.wobble.sin()) * (WOBBLE_RADIUS * self.scalar);
        let tilt = Vec2::new(self.tilt_cos, self.tilt_sin) * self.jitter;
        let p1 = self.pos + tilt;
        let p2 = wobble_pos + tilt;

        if let Some(star) = &self.star {
            let outline = star_at_rotation(star.rotation);
            let points = outline
                .iter()
                .map(|v| Point::new(v.x * star.scale, v.y * star.scale) + self.pos.to_vec2())
                .collect();
            let shade = |k: f64| {
                hsla_to_rgba(
                    star.hue,
                    star.saturation,
                    star.lightness * (k - star.rotation / 500.0),
                    alpha,
                )
            };
            return DrawCommand::Polygon {
                points,
                fill: shade(1.1),
                stroke: Some(StrokeStyle {
                    color: shade(0.9),
                    width: (star.scale * 3.0).ceil(),
                }),
            };
        }

        let fill = self.color.with_alpha(alpha);
        match self.shape {
            Shape::Circle => DrawCommand::Ellipse {
                center: self.pos,
                radii: Vec2::new(
                    (p2.x - p1.x).abs() * OVAL_SCALAR,
                    (p2.y - p1.y).abs() * OVAL_SCALAR,
                ),
                rotation: PI / 10.0 * self.wobble,
                fill,
            },
            Shape::Square | Shape::Star => {
                let floor = |x: f64, y: f64| Point::new(x.floor(), y.floor());
                let points: SmallVec<_> = [
                    floor(self.pos.x, self.pos.y),
                    floor(wobble_pos.x, p1.y),
                    floor(p2.x, p2.y),
                    floor(p1.x, wobble_pos.y),
                ]
                .into_iter()
                .collect();
                DrawCommand::Polygon {
                    points,
                    fill,
                    stroke: None,
                }
            }
        }
    }

    pub fn position(&self) -> Point {
        self.pos
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Velocity vector integrated under magnet influence.
    pub fn velocity_vec(&self) -> Vec2 {
        self.velocity_vec
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn total_ticks(&self) -> u32 {
        self.total_ticks
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn star(&self) -> Option<&StarState> {
        self.star.as_ref()
    }

    pub fn is_alive(&self) -> bool {
        self.tick < self.total_ticks
    }
}

#[cfg(test)]
#[path = "../tests/unit/physics.rs"]
mod tests;
