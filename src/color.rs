//! Color parsing for burst palettes and HSL shading for star particles.

use crate::foundation::math::alpha_to_u8;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

/// Opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Attach a straight alpha in `[0, 1]`.
    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

/// 8-bit RGB color with straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `[0, 1]`.
    pub a: f32,
}

impl Rgba {
    /// Alpha as an 8-bit channel.
    pub fn alpha_u8(self) -> u8 {
        alpha_to_u8(self.a)
    }
}

/// Parse a hex color such as `#26ccff`, `26CCFF` or `f00`.
///
/// Non-hex characters are ignored, and three-digit shorthand is expanded. Returns `None` when fewer
/// than three hex digits remain.
pub fn hex_to_rgb(s: &str) -> Option<Rgb> {
    let digits: Vec<u8> = s
        .bytes()
        .filter(u8::is_ascii_hexdigit)
        .map(|b| b.to_ascii_lowercase())
        .collect();

    let expanded: [u8; 6] = if digits.len() < 6 {
        if digits.len() < 3 {
            return None;
        }
        [
            digits[0], digits[0], digits[1], digits[1], digits[2], digits[2],
        ]
    } else {
        [
            digits[0], digits[1], digits[2], digits[3], digits[4], digits[5],
        ]
    };

    fn nibble(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            _ => c - b'a' + 10,
        }
    }
    let byte = |i: usize| (nibble(expanded[i]) << 4) | nibble(expanded[i + 1]);

    Some(Rgb::new(byte(0), byte(2), byte(4)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct HslKey(u64, u64, u64);

static HSL_MEMO: LazyLock<Mutex<HashMap<HslKey, Rgb>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Convert HSL (hue in degrees, saturation and lightness in percent) to RGB.
///
/// Results are memoized process-wide; star shading asks for the same few hundred shades every
/// frame.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let key = HslKey(h.to_bits(), s.to_bits(), l.to_bits());
    if let Ok(memo) = HSL_MEMO.lock()
        && let Some(rgb) = memo.get(&key)
    {
        return *rgb;
    }

    let rgb = hsl_to_rgb_uncached(h, s, l);
    if let Ok(mut memo) = HSL_MEMO.lock() {
        memo.insert(key, rgb);
    }
    rgb
}

/// [`hsl_to_rgb`] plus a straight alpha.
pub fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f32) -> Rgba {
    hsl_to_rgb(h, s, l).with_alpha(a)
}

fn hsl_to_rgb_uncached(h: f64, s: f64, l: f64) -> Rgb {
    let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
    let s = finite_or_zero(s).clamp(0.0, 100.0) / 100.0;
    let l = finite_or_zero(l).clamp(0.0, 100.0) / 100.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    fn to_u8(v: f64) -> u8 {
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    }
    Rgb::new(to_u8(r + m), to_u8(g + m), to_u8(b + m))
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
#[path = "../tests/unit/color.rs"]
mod tests;
