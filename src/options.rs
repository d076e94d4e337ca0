//! User-facing burst options and their normalized per-`fire` snapshot.
//!
//! [`BurstOptions`] mirrors the loosely typed option bag callers hand to `fire`: every field is
//! optional and values of the wrong type fall back to the documented default instead of failing.
//! [`BurstConfig::resolve`] turns it into the immutable snapshot a burst is built from.

use crate::color::{Rgb, hex_to_rgb};
use crate::foundation::core::{Point, Rect, SurfaceSize};
use crate::foundation::error::ConfettiResult;
use crate::physics::Shape;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Default palette used when no (valid) colors are supplied.
pub const DEFAULT_COLORS: [&str; 7] = [
    "#26ccff", "#a25afd", "#ff5e7e", "#88ff5a", "#fcff42", "#ffa62d", "#ff36ff",
];

pub(crate) const DEFAULT_PARTICLE_COUNT: u32 = 50;
pub(crate) const DEFAULT_ANGLE_DEG: f64 = 90.0;
pub(crate) const DEFAULT_SPREAD_DEG: f64 = 45.0;
pub(crate) const DEFAULT_START_VELOCITY: f64 = 45.0;
pub(crate) const DEFAULT_DECAY: f64 = 0.9;
pub(crate) const DEFAULT_GRAVITY: f64 = 1.0;
pub(crate) const DEFAULT_DRIFT: f64 = 0.0;
pub(crate) const DEFAULT_TICKS: u32 = 200;
pub(crate) const DEFAULT_SCALAR: f64 = 1.0;
pub(crate) const DEFAULT_Z_INDEX: i32 = 100;

/// Fractional origin within the surface (`0.5, 0.5` is the center).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginOptions {
    /// Horizontal fraction of the surface width.
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    /// Vertical fraction of the surface height.
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
}

/// Absolute launch rectangle; particles start at random integer offsets inside it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginRectOptions {
    /// Left edge.
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    /// Top edge.
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    /// Width of the jitter range.
    #[serde(default, deserialize_with = "lenient_number")]
    pub width: Option<f64>,
    /// Height of the jitter range.
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
}

/// Star descriptor; when present every particle of the burst is drawn as a spinning star.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StarOptions {
    /// Outline scale factor.
    #[serde(default, deserialize_with = "lenient_number")]
    pub scale: Option<f64>,
    /// Spin speed; rotation advances by twice this many degrees per tick.
    #[serde(default, deserialize_with = "lenient_number")]
    pub velocity: Option<f64>,
    /// Hue in degrees.
    #[serde(default, deserialize_with = "lenient_number")]
    pub hue: Option<f64>,
    /// Saturation in percent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub saturation: Option<f64>,
    /// Lightness in percent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub lightness: Option<f64>,
}

/// A point given as `{ "x": .., "y": .. }`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointOptions {
    /// Horizontal coordinate.
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    /// Vertical coordinate.
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
}

/// Magnet descriptor pulling particles toward a surface-space point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnetOptions {
    /// Attraction target; a magnet without a complete target is ignored.
    #[serde(default, deserialize_with = "lenient")]
    pub target_point: Option<PointOptions>,
    /// Target x given inline, used when `target_point` is absent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    /// Target y given inline, used when `target_point` is absent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    /// Pull applied along the unit vector to the target each tick.
    #[serde(default, deserialize_with = "lenient_number")]
    pub strength: Option<f64>,
    /// Fraction of the current velocity removed each tick.
    #[serde(default, deserialize_with = "lenient_number")]
    pub drag: Option<f64>,
}

/// Options for a single `fire` call. Unset or malformed fields take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurstOptions {
    /// Number of particles (default 50; negative values mean none, fractions are floored).
    #[serde(default, deserialize_with = "lenient_number")]
    pub particle_count: Option<f64>,
    /// Launch direction in degrees, 90 is straight up (default 90).
    #[serde(default, deserialize_with = "lenient_number")]
    pub angle: Option<f64>,
    /// Spread around `angle` in degrees (default 45).
    #[serde(default, deserialize_with = "lenient_number")]
    pub spread: Option<f64>,
    /// Mean launch speed (default 45).
    #[serde(default, deserialize_with = "lenient_number")]
    pub start_velocity: Option<f64>,
    /// Per-tick velocity multiplier (default 0.9).
    #[serde(default, deserialize_with = "lenient_number")]
    pub decay: Option<f64>,
    /// Downward pull (default 1).
    #[serde(default, deserialize_with = "lenient_number")]
    pub gravity: Option<f64>,
    /// Horizontal drift per tick (default 0).
    #[serde(default, deserialize_with = "lenient_number")]
    pub drift: Option<f64>,
    /// Lifetime in ticks (default 200).
    #[serde(default, deserialize_with = "lenient_number")]
    pub ticks: Option<f64>,
    /// Fractional origin (default center).
    #[serde(default, deserialize_with = "lenient")]
    pub origin: Option<OriginOptions>,
    /// Absolute launch rectangle; overrides `origin`.
    #[serde(default, deserialize_with = "lenient")]
    pub origin_rect: Option<OriginRectOptions>,
    /// Hex colors (default seven-color palette).
    #[serde(default, deserialize_with = "lenient")]
    pub colors: Option<Vec<String>>,
    /// Shapes to pick from at random (default square and circle).
    #[serde(default, deserialize_with = "lenient_shapes")]
    pub shapes: Option<Vec<Shape>>,
    /// Size multiplier (default 1).
    #[serde(default, deserialize_with = "lenient_number")]
    pub scalar: Option<f64>,
    /// Stacking order of a library-created surface (default 100).
    #[serde(default, deserialize_with = "lenient_number")]
    pub z_index: Option<f64>,
    /// Skip the animation when the user prefers reduced motion (default false).
    #[serde(default, deserialize_with = "lenient_flag")]
    pub disable_for_reduced_motion: Option<bool>,
    /// Star descriptor.
    #[serde(default, deserialize_with = "lenient")]
    pub stars: Option<StarOptions>,
    /// Magnet descriptor.
    #[serde(default, deserialize_with = "lenient")]
    pub magnet: Option<MagnetOptions>,
}

impl BurstOptions {
    /// Parse options from a JSON document.
    pub fn from_json_str(s: &str) -> ConfettiResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse options from an already decoded JSON value.
    pub fn from_json_value(v: Value) -> ConfettiResult<Self> {
        Ok(serde_json::from_value(v)?)
    }

    pub fn particle_count(mut self, n: u32) -> Self {
        self.particle_count = Some(f64::from(n));
        self
    }

    pub fn angle(mut self, degrees: f64) -> Self {
        self.angle = Some(degrees);
        self
    }

    pub fn spread(mut self, degrees: f64) -> Self {
        self.spread = Some(degrees);
        self
    }

    pub fn start_velocity(mut self, v: f64) -> Self {
        self.start_velocity = Some(v);
        self
    }

    pub fn decay(mut self, decay: f64) -> Self {
        self.decay = Some(decay);
        self
    }

    pub fn gravity(mut self, gravity: f64) -> Self {
        self.gravity = Some(gravity);
        self
    }

    pub fn drift(mut self, drift: f64) -> Self {
        self.drift = Some(drift);
        self
    }

    pub fn ticks(mut self, ticks: u32) -> Self {
        self.ticks = Some(f64::from(ticks));
        self
    }

    pub fn origin(mut self, x: f64, y: f64) -> Self {
        self.origin = Some(OriginOptions {
            x: Some(x),
            y: Some(y),
        });
        self
    }

    pub fn origin_rect(mut self, rect: Rect) -> Self {
        self.origin_rect = Some(OriginRectOptions {
            x: Some(rect.x0),
            y: Some(rect.y0),
            width: Some(rect.width()),
            height: Some(rect.height()),
        });
        self
    }

    pub fn colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    pub fn shapes(mut self, shapes: impl IntoIterator<Item = Shape>) -> Self {
        self.shapes = Some(shapes.into_iter().collect());
        self
    }

    pub fn scalar(mut self, scalar: f64) -> Self {
        self.scalar = Some(scalar);
        self
    }

    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = Some(f64::from(z));
        self
    }

    pub fn disable_for_reduced_motion(mut self, disable: bool) -> Self {
        self.disable_for_reduced_motion = Some(disable);
        self
    }

    pub fn stars(mut self, stars: StarOptions) -> Self {
        self.stars = Some(stars);
        self
    }

    pub fn magnet(mut self, target: Point, strength: f64, drag: f64) -> Self {
        self.magnet = Some(MagnetOptions {
            target_point: Some(PointOptions {
                x: Some(target.x),
                y: Some(target.y),
            }),
            strength: Some(strength),
            drag: Some(drag),
            ..MagnetOptions::default()
        });
        self
    }
}

/// Resolved star descriptor (defaults applied).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarSpec {
    /// Outline scale factor.
    pub scale: f64,
    /// Spin speed.
    pub velocity: f64,
    /// Hue in degrees.
    pub hue: f64,
    /// Saturation in percent.
    pub saturation: f64,
    /// Lightness in percent.
    pub lightness: f64,
}

impl Default for StarSpec {
    fn default() -> Self {
        Self {
            scale: 1.0,
            velocity: 1.0,
            hue: 49.0,
            saturation: 100.0,
            lightness: 61.0,
        }
    }
}

/// Resolved magnet, shared by every particle of a burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Magnet {
    /// Surface-space attraction target.
    pub target: Point,
    /// Pull per tick.
    pub strength: f64,
    /// Velocity damping per tick.
    pub drag: f64,
}

/// Where particles of a burst start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Origin {
    /// Fractions of the surface size.
    Fraction { x: f64, y: f64 },
    /// Absolute rectangle with integer jitter inside `[0, width) x [0, height)`.
    Rect { x: f64, y: f64, width: f64, height: f64 },
}

/// Immutable, fully defaulted snapshot of one `fire` call.
///
/// Angles are stored in radians.
#[derive(Clone, Debug, PartialEq)]
pub struct BurstConfig {
    pub particle_count: u32,
    pub angle: f64,
    pub spread: f64,
    pub start_velocity: f64,
    pub decay: f64,
    pub gravity: f64,
    pub drift: f64,
    pub ticks: u32,
    pub origin: Origin,
    pub colors: Vec<Rgb>,
    pub shapes: Vec<Shape>,
    pub scalar: f64,
    pub z_index: i32,
    pub disable_for_reduced_motion: bool,
    pub stars: Option<StarSpec>,
    pub magnet: Option<Arc<Magnet>>,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self::resolve(&BurstOptions::default())
    }
}

impl BurstConfig {
    /// Fill defaults, convert degrees to radians, parse colors.
    pub fn resolve(opts: &BurstOptions) -> Self {
        let particle_count = match finite(opts.particle_count) {
            Some(n) if n < 0.0 => 0,
            Some(n) => n.floor().min(f64::from(u32::MAX)) as u32,
            None => DEFAULT_PARTICLE_COUNT,
        };
        let ticks = match finite(opts.ticks) {
            Some(t) => t.ceil().clamp(1.0, f64::from(u32::MAX)) as u32,
            None => DEFAULT_TICKS,
        };

        let origin = match opts.origin_rect {
            Some(r) => Origin::Rect {
                x: finite(r.x).unwrap_or(0.0),
                y: finite(r.y).unwrap_or(0.0),
                width: finite(r.width).unwrap_or(0.0).max(0.0),
                height: finite(r.height).unwrap_or(0.0).max(0.0),
            },
            None => {
                let o = opts.origin.unwrap_or_default();
                Origin::Fraction {
                    x: finite(o.x).unwrap_or(0.5),
                    y: finite(o.y).unwrap_or(0.5),
                }
            }
        };

        let mut colors: Vec<Rgb> = opts
            .colors
            .iter()
            .flatten()
            .filter_map(|c| hex_to_rgb(c))
            .collect();
        if colors.is_empty() {
            colors = default_colors();
        }

        let mut shapes = opts.shapes.clone().unwrap_or_default();
        if shapes.is_empty() {
            shapes = vec![Shape::Square, Shape::Circle];
        }

        let stars = opts.stars.map(|s| {
            let d = StarSpec::default();
            StarSpec {
                scale: finite(s.scale).unwrap_or(d.scale),
                velocity: finite(s.velocity).unwrap_or(d.velocity),
                hue: finite(s.hue).unwrap_or(d.hue),
                saturation: finite(s.saturation).unwrap_or(d.saturation),
                lightness: finite(s.lightness).unwrap_or(d.lightness),
            }
        });

        let magnet = opts.magnet.and_then(|m| {
            let (x, y) = match m.target_point {
                Some(t) => (t.x, t.y),
                None => (m.x, m.y),
            };
            Some(Arc::new(Magnet {
                target: Point::new(finite(x)?, finite(y)?),
                strength: finite(m.strength).unwrap_or(1.0),
                drag: finite(m.drag).unwrap_or(0.05),
            }))
        });

        Self {
            particle_count,
            angle: finite(opts.angle).unwrap_or(DEFAULT_ANGLE_DEG).to_radians(),
            spread: finite(opts.spread).unwrap_or(DEFAULT_SPREAD_DEG).to_radians(),
            start_velocity: finite(opts.start_velocity).unwrap_or(DEFAULT_START_VELOCITY),
            decay: finite(opts.decay).unwrap_or(DEFAULT_DECAY),
            gravity: finite(opts.gravity).unwrap_or(DEFAULT_GRAVITY),
            drift: finite(opts.drift).unwrap_or(DEFAULT_DRIFT),
            ticks,
            origin,
            colors,
            shapes,
            scalar: finite(opts.scalar).unwrap_or(DEFAULT_SCALAR),
            z_index: finite(opts.z_index)
                .map(|z| z.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
                .unwrap_or(DEFAULT_Z_INDEX),
            disable_for_reduced_motion: opts.disable_for_reduced_motion.unwrap_or(false),
            stars,
            magnet,
        }
    }

    /// Launch point of one particle on a surface of `size`.
    pub fn launch_point(&self, size: SurfaceSize, rng: &mut impl Rng) -> Point {
        match self.origin {
            Origin::Fraction { x, y } => Point::new(
                f64::from(size.width) * x,
                f64::from(size.height) * y,
            ),
            Origin::Rect {
                x,
                y,
                width,
                height,
            } => Point::new(x + random_int(rng, width), y + random_int(rng, height)),
        }
    }
}

/// Uniform integer in `[0, max)`, or 0 when the range is empty.
fn random_int(rng: &mut impl Rng, max: f64) -> f64 {
    (rng.random::<f64>() * max).floor()
}

pub(crate) fn default_colors() -> Vec<Rgb> {
    DEFAULT_COLORS.iter().filter_map(|c| hex_to_rgb(c)).collect()
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|n| n.is_finite())
}

fn number_from_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(number_from_value(&v).filter(|n| n.is_finite()))
}

fn lenient_flag<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::Bool(b) => Some(b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    })
}

fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(d)?;
    Ok(serde_json::from_value(v).ok())
}

fn lenient_shapes<'de, D>(d: D) -> Result<Option<Vec<Shape>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(d)? else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|v| serde_json::from_value::<Shape>(v).ok())
            .collect(),
    ))
}

#[cfg(test)]
#[path = "../tests/unit/options.rs"]
mod tests;
