use crate::foundation::error::{ConfettiError, ConfettiResult};
use crate::foundation::math::mul_div255_u8;

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> ConfettiResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ConfettiError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Pixel-aligned span of a clear request, already clipped to the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelSpan {
    pub(crate) x0: usize,
    pub(crate) y0: usize,
    pub(crate) x1: usize,
    pub(crate) y1: usize,
}

impl PixelSpan {
    /// Cover every pixel touched by `[x0, x1) x [y0, y1)`, clipped to `width` x `height`.
    pub(crate) fn covering(
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        width: usize,
        height: usize,
    ) -> Option<Self> {
        fn clip(v: f64, max: usize) -> usize {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v as usize).min(max)
            }
        }
        let span = Self {
            x0: clip(x0.min(x1).floor(), width),
            y0: clip(y0.min(y1).floor(), height),
            x1: clip(x0.max(x1).ceil(), width),
            y1: clip(y0.max(y1).ceil(), height),
        };
        (span.x0 < span.x1 && span.y0 < span.y1).then_some(span)
    }

    pub(crate) fn is_full(self, width: usize, height: usize) -> bool {
        self.x0 == 0 && self.y0 == 0 && self.x1 == width && self.y1 == height
    }
}

pub(crate) fn clear_span(data: &mut [u8], width: usize, span: PixelSpan) {
    for y in span.y0..span.y1 {
        let row = y * width * 4;
        data[row + span.x0 * 4..row + span.x1 * 4].fill(0);
    }
}
