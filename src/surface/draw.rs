use crate::color::Rgba;
use crate::foundation::core::{Point, Rect, SurfaceSize, Vec2};
use crate::star::STAR_VERTICES;
use smallvec::SmallVec;

/// Outline stroke for filled polygons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Rgba,
    /// Line width in pixels.
    pub width: f64,
}

/// One shape emitted by a particle for the current tick.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Closed polygon, optionally outlined.
    Polygon {
        points: SmallVec<[Point; STAR_VERTICES]>,
        fill: Rgba,
        stroke: Option<StrokeStyle>,
    },
    /// Filled ellipse rotated by `rotation` radians around its center.
    Ellipse {
        center: Point,
        radii: Vec2,
        rotation: f64,
        fill: Rgba,
    },
}

impl DrawCommand {
    /// Fill color of the command.
    pub fn fill(&self) -> Rgba {
        match self {
            Self::Polygon { fill, .. } | Self::Ellipse { fill, .. } => *fill,
        }
    }
}

/// A 2D raster target particles are rendered onto.
///
/// Surfaces are `Send` so they can be handed to an offload worker.
pub trait DrawingSurface: Send {
    /// Current backing-store size.
    fn size(&self) -> SurfaceSize;
    /// Resize the backing store; contents may be discarded.
    fn set_size(&mut self, size: SurfaceSize);
    /// Erase `rect` to transparent.
    fn clear(&mut self, rect: Rect);
    /// Draw one command. Surfaces that are no longer displayed ignore draws.
    fn draw(&mut self, cmd: &DrawCommand);
    /// Layout rectangle of the surface as displayed by its container.
    fn bounds(&self) -> Rect;
    /// Called once per animation tick after all draws.
    fn present(&mut self) {}
}

/// Container-assigned identity of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u64);

/// A surface plus the identity its container knows it by.
pub struct SurfaceHandle {
    pub id: SurfaceId,
    pub surface: Box<dyn DrawingSurface>,
}

impl SurfaceHandle {
    pub fn new(id: SurfaceId, surface: Box<dyn DrawingSurface>) -> Self {
        Self { id, surface }
    }
}

impl std::fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("id", &self.id)
            .field("size", &self.surface.size())
            .finish()
    }
}

/// The host document a cannon creates and attaches its surfaces in.
pub trait Container {
    /// Create a full-viewport overlay surface stacked at `z_index`.
    fn create_surface(&mut self, z_index: i32) -> SurfaceHandle;
    /// Make a created surface visible.
    fn attach(&mut self, id: SurfaceId);
    /// Remove a surface from display.
    fn detach(&mut self, id: SurfaceId);
    /// Size of the visible viewport.
    fn viewport_size(&self) -> SurfaceSize;
    /// Layout rectangle of a surface, if the container still knows it.
    fn bounds_of(&self, id: SurfaceId) -> Option<Rect>;
    /// Whether the user asked for reduced motion.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
    /// Start forwarding viewport resizes to the cannon's `on_resize`.
    fn observe_resize(&mut self) {}
    /// Stop forwarding viewport resizes.
    fn unobserve_resize(&mut self) {}
}
