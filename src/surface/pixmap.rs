//! Raster surface backed by `vello_cpu`.
//!
//! Draws are queued on a render context and rasterized lazily: `clear` and `present` first commit
//! pending geometry onto the retained pixmap, so a partial clear never erases shapes drawn after
//! it.

use super::composite::{PixelSpan, clear_span, over_in_place};
use super::draw::{DrawCommand, DrawingSurface};
use super::sink::{FrameRGBA, FrameSink};
use crate::color::Rgba;
use crate::foundation::core::{BezPath, FrameIndex, Point, Rect, SurfaceSize};
use crate::foundation::error::{ConfettiError, ConfettiResult};
use kurbo::Shape as _;

const ELLIPSE_TOLERANCE: f64 = 0.1;

pub struct PixmapSurface {
    size: SurfaceSize,
    buf_width: u16,
    buf_height: u16,
    base: vello_cpu::Pixmap,
    scratch: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
    bounds: Rect,
    sink: Option<Box<dyn FrameSink>>,
    next_frame: FrameIndex,
}

impl PixmapSurface {
    pub fn new(size: SurfaceSize) -> ConfettiResult<Self> {
        let (buf_width, buf_height) = buffer_dims(size)?;
        Ok(Self {
            size,
            buf_width,
            buf_height,
            base: vello_cpu::Pixmap::new(buf_width, buf_height),
            scratch: vello_cpu::Pixmap::new(buf_width, buf_height),
            ctx: None,
            bounds: size.to_rect(),
            sink: None,
            next_frame: FrameIndex(0),
        })
    }

    /// Surface with no measured size yet; it gets real dimensions on the first `set_size`.
    pub fn empty() -> Self {
        Self {
            size: SurfaceSize::default(),
            buf_width: 1,
            buf_height: 1,
            base: vello_cpu::Pixmap::new(1, 1),
            scratch: vello_cpu::Pixmap::new(1, 1),
            ctx: None,
            bounds: Rect::ZERO,
            sink: None,
            next_frame: FrameIndex(0),
        }
    }

    /// Forward every presented frame to `sink`.
    pub fn with_sink(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Layout rectangle reported by [`DrawingSurface::bounds`].
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Number of frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.next_frame.0
    }

    /// Snapshot of the current contents, premultiplied.
    pub fn frame(&mut self) -> FrameRGBA {
        self.commit();
        let (width, height) = if self.size.is_unmeasured() {
            (0, 0)
        } else {
            (u32::from(self.buf_width), u32::from(self.buf_height))
        };
        let data = if width == 0 {
            Vec::new()
        } else {
            self.base.data_as_u8_slice().to_vec()
        };
        FrameRGBA {
            width,
            height,
            data,
            premultiplied: true,
        }
    }

    fn commit(&mut self) {
        let Some(mut ctx) = self.ctx.take() else {
            return;
        };
        clear_pixmap(&mut self.scratch);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.scratch);
        if let Err(e) = over_in_place(
            self.base.data_as_u8_slice_mut(),
            self.scratch.data_as_u8_slice(),
        ) {
            tracing::warn!(error = %e, "dropping uncomposited particle layer");
        }
    }

    fn context(&mut self) -> &mut vello_cpu::RenderContext {
        let (w, h) = (self.buf_width, self.buf_height);
        self.ctx
            .get_or_insert_with(|| vello_cpu::RenderContext::new(w, h))
    }
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("size", &self.size)
            .field("bounds", &self.bounds)
            .field("has_sink", &self.sink.is_some())
            .field("next_frame", &self.next_frame)
            .finish()
    }
}

impl DrawingSurface for PixmapSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn set_size(&mut self, size: SurfaceSize) {
        let Ok((w, h)) = buffer_dims(size) else {
            tracing::warn!(?size, "surface size out of range; keeping previous buffer");
            return;
        };
        self.size = size;
        self.buf_width = w;
        self.buf_height = h;
        self.base = vello_cpu::Pixmap::new(w, h);
        self.scratch = vello_cpu::Pixmap::new(w, h);
        self.ctx = None;
    }

    fn clear(&mut self, rect: Rect) {
        self.commit();
        let width = usize::from(self.buf_width);
        let height = usize::from(self.buf_height);
        let Some(span) = PixelSpan::covering(rect.x0, rect.y0, rect.x1, rect.y1, width, height)
        else {
            return;
        };
        if span.is_full(width, height) {
            clear_pixmap(&mut self.base);
        } else {
            clear_span(self.base.data_as_u8_slice_mut(), width, span);
        }
    }

    fn draw(&mut self, cmd: &DrawCommand) {
        match cmd {
            DrawCommand::Polygon {
                points,
                fill,
                stroke,
            } => {
                let path = polygon_to_cpu(points);
                let ctx = self.context();
                ctx.set_paint(color_to_cpu(*fill));
                ctx.fill_path(&path);
                if let Some(stroke) = stroke {
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke.width));
                    ctx.set_paint(color_to_cpu(stroke.color));
                    ctx.stroke_path(&path);
                }
            }
            DrawCommand::Ellipse {
                center,
                radii,
                rotation,
                fill,
            } => {
                let ellipse = kurbo::Ellipse::new(*center, *radii, *rotation);
                let path = bezpath_to_cpu(&ellipse.to_path(ELLIPSE_TOLERANCE));
                let ctx = self.context();
                ctx.set_paint(color_to_cpu(*fill));
                ctx.fill_path(&path);
            }
        }
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn present(&mut self) {
        self.commit();
        let idx = self.next_frame;
        self.next_frame = FrameIndex(idx.0 + 1);
        if self.sink.is_none() {
            return;
        }
        let frame = self.frame();
        if let Some(sink) = self.sink.as_mut()
            && let Err(e) = sink.push_frame(idx, &frame)
        {
            tracing::warn!(error = %e, frame = idx.0, "frame sink failed; detaching it");
            self.sink = None;
        }
    }
}

impl Drop for PixmapSurface {
    fn drop(&mut self) {
        if let Some(mut sink) = self.sink.take()
            && let Err(e) = sink.end()
        {
            tracing::warn!(error = %e, "frame sink failed to finish");
        }
    }
}

fn buffer_dims(size: SurfaceSize) -> ConfettiResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| ConfettiError::validation("surface width must fit in u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| ConfettiError::validation("surface height must fit in u16"))?;
    Ok((w.max(1), h.max(1)))
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn color_to_cpu(c: Rgba) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.alpha_u8())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn polygon_to_cpu(points: &[Point]) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    let mut it = points.iter();
    if let Some(first) = it.next() {
        out.move_to(point_to_cpu(*first));
        for p in it {
            out.line_to(point_to_cpu(*p));
        }
        out.close_path();
    }
    out
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/surface/pixmap.rs"]
mod tests;
