use super::*;
use crate::color::Rgb;
use crate::foundation::core::Vec2;
use crate::surface::draw::StrokeStyle;
use crate::surface::sink::CollectSink;
use smallvec::smallvec;

fn red_square(x0: f64, y0: f64, side: f64) -> DrawCommand {
    DrawCommand::Polygon {
        points: smallvec![
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
        ],
        fill: Rgb::new(255, 0, 0).with_alpha(1.0),
        stroke: None,
    }
}

#[test]
fn rejects_sizes_beyond_u16() {
    assert!(PixmapSurface::new(SurfaceSize::new(70_000, 10)).is_err());
    assert!(PixmapSurface::new(SurfaceSize::new(10, 70_000)).is_err());
}

#[test]
fn polygon_fill_reaches_the_pixmap_on_present() {
    let mut s = PixmapSurface::new(SurfaceSize::new(16, 16)).unwrap();
    s.draw(&red_square(4.0, 4.0, 8.0));
    s.present();
    let f = s.frame();
    assert_eq!(f.width, 16);
    assert!(f.premultiplied);
    assert_eq!(f.pixel(8, 8), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(s.frames_presented(), 1);
}

#[test]
fn ellipse_fill_covers_its_center() {
    let mut s = PixmapSurface::new(SurfaceSize::new(20, 20)).unwrap();
    s.draw(&DrawCommand::Ellipse {
        center: Point::new(10.0, 10.0),
        radii: Vec2::new(6.0, 3.0),
        rotation: 0.3,
        fill: Rgb::new(0, 0, 255).with_alpha(1.0),
    });
    let f = s.frame();
    assert_eq!(f.pixel(10, 10), Some([0, 0, 255, 255]));
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn stroked_polygon_paints_outline() {
    let mut s = PixmapSurface::new(SurfaceSize::new(20, 20)).unwrap();
    let DrawCommand::Polygon { points, .. } = red_square(5.0, 5.0, 10.0) else {
        unreachable!()
    };
    s.draw(&DrawCommand::Polygon {
        points,
        fill: Rgb::new(0, 0, 0).with_alpha(0.0),
        stroke: Some(StrokeStyle {
            color: Rgb::new(0, 255, 0).with_alpha(1.0),
            width: 2.0,
        }),
    });
    let f = s.frame();
    assert_eq!(f.pixel(5, 10).map(|p| p[1]), Some(255));
    assert_eq!(f.pixel(10, 10), Some([0, 0, 0, 0]));
}

#[test]
fn partial_clear_keeps_later_draws() {
    let mut s = PixmapSurface::new(SurfaceSize::new(16, 16)).unwrap();
    s.draw(&red_square(0.0, 0.0, 16.0));
    s.clear(Rect::new(0.0, 0.0, 8.0, 16.0));
    s.draw(&red_square(0.0, 0.0, 4.0));
    let f = s.frame();
    assert_eq!(f.pixel(2, 2), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(6, 10), Some([0, 0, 0, 0]));
    assert_eq!(f.pixel(12, 10), Some([255, 0, 0, 255]));
}

#[test]
fn full_clear_erases_everything() {
    let mut s = PixmapSurface::new(SurfaceSize::new(8, 8)).unwrap();
    s.draw(&red_square(0.0, 0.0, 8.0));
    s.clear(s.size().to_rect());
    assert_eq!(s.frame().painted_pixels(), 0);
}

#[test]
fn set_size_reallocates_buffers() {
    let mut s = PixmapSurface::new(SurfaceSize::new(4, 4)).unwrap();
    s.draw(&red_square(0.0, 0.0, 4.0));
    s.set_size(SurfaceSize::new(10, 6));
    let f = s.frame();
    assert_eq!((f.width, f.height), (10, 6));
    assert_eq!(f.painted_pixels(), 0);
}

#[test]
fn unmeasured_surface_yields_empty_frame() {
    let mut s = PixmapSurface::new(SurfaceSize::default()).unwrap();
    s.draw(&red_square(0.0, 0.0, 4.0));
    s.present();
    let f = s.frame();
    assert_eq!((f.width, f.height), (0, 0));
    assert!(f.data.is_empty());
}

#[test]
fn present_forwards_frames_to_sink() {
    let sink = CollectSink::new();
    let frames = sink.frames();
    let mut s = PixmapSurface::new(SurfaceSize::new(8, 8))
        .unwrap()
        .with_sink(Box::new(sink));
    s.present();
    s.draw(&red_square(0.0, 0.0, 8.0));
    s.present();
    let frames = frames.lock().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].0, FrameIndex(0));
    assert_eq!(frames[0].1.painted_pixels(), 0);
    assert_eq!(frames[1].1.painted_pixels(), 64);
}

struct FailingSink;

impl FrameSink for FailingSink {
    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> ConfettiResult<()> {
        Err(ConfettiError::render("disk full"))
    }
}

#[test]
fn failing_sink_is_detached_after_first_error() {
    let mut s = PixmapSurface::new(SurfaceSize::new(4, 4))
        .unwrap()
        .with_sink(Box::new(FailingSink));
    s.present();
    assert!(s.sink.is_none());
    s.present();
    assert_eq!(s.frames_presented(), 2);
}

#[test]
fn empty_surface_is_unmeasured_until_sized() {
    let mut s = PixmapSurface::empty();
    assert!(s.size().is_unmeasured());
    assert_eq!(s.bounds(), Rect::ZERO);
    s.set_size(SurfaceSize::new(3, 2));
    assert_eq!(s.frame().data.len(), 3 * 2 * 4);
}
