use crate::foundation::core::{FrameIndex, Rgba8Premul};
use crate::foundation::error::{ConfettiError, ConfettiResult};
use crate::foundation::math::mul_div255_u16;
use std::sync::{Arc, Mutex};

/// A snapshot of a raster surface, row-major RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_pixels(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    /// Convert to straight alpha, as PNG encoders expect.
    pub fn to_straight(&self) -> FrameRGBA {
        if !self.premultiplied {
            return self.clone();
        }
        let mut data = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            let p = Rgba8Premul {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            };
            data.extend_from_slice(&p.to_straight_rgba());
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }

    /// Composite onto an opaque background color, yielding an opaque straight-alpha frame.
    pub fn flatten_onto(&self, bg_rgba: [u8; 4]) -> ConfettiResult<FrameRGBA> {
        let mut data = vec![0u8; self.data.len()];
        flatten_to_opaque_rgba8(&mut data, &self.data, self.premultiplied, bg_rgba)?;
        Ok(FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        })
    }
}

/// Receives every presented frame of a surface.
pub trait FrameSink: Send {
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ConfettiResult<()>;

    /// Called when the surface is dropped.
    fn end(&mut self) -> ConfettiResult<()> {
        Ok(())
    }
}

/// Shared frame buffer a [`CollectSink`] appends to.
pub type CollectedFrames = Arc<Mutex<Vec<(FrameIndex, FrameRGBA)>>>;

/// Keeps presented frames in memory, optionally only the latest one.
#[derive(Clone, Debug, Default)]
pub struct CollectSink {
    frames: CollectedFrames,
    keep_last_only: bool,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_only() -> Self {
        Self {
            frames: CollectedFrames::default(),
            keep_last_only: true,
        }
    }

    pub fn frames(&self) -> CollectedFrames {
        Arc::clone(&self.frames)
    }
}

impl FrameSink for CollectSink {
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ConfettiResult<()> {
        let mut frames = self
            .frames
            .lock()
            .map_err(|_| ConfettiError::render("collected frame buffer is poisoned"))?;
        if self.keep_last_only {
            frames.clear();
        }
        frames.push((idx, frame.clone()));
        Ok(())
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> ConfettiResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ConfettiError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        let inv = 255u16 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(s[c])
            } else {
                mul_div255_u16(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}
