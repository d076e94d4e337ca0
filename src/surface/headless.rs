use super::draw::{Container, SurfaceHandle, SurfaceId};
use super::pixmap::PixmapSurface;
use super::sink::FrameSink;
use crate::foundation::core::{Rect, SurfaceSize};
use std::collections::{BTreeMap, BTreeSet};

type SinkFactory = Box<dyn FnMut(SurfaceId) -> Box<dyn FrameSink>>;

/// A container without a display: surfaces are [`PixmapSurface`]s and the viewport is fixed
/// unless the host changes it.
pub struct HeadlessContainer {
    viewport: SurfaceSize,
    reduced_motion: bool,
    next_id: u64,
    z_indices: BTreeMap<SurfaceId, i32>,
    attached: BTreeSet<SurfaceId>,
    placed: BTreeMap<SurfaceId, Rect>,
    observing: bool,
    sink_factory: Option<SinkFactory>,
}

impl HeadlessContainer {
    pub fn new(viewport: SurfaceSize) -> Self {
        Self {
            viewport,
            reduced_motion: false,
            next_id: 1,
            z_indices: BTreeMap::new(),
            attached: BTreeSet::new(),
            placed: BTreeMap::new(),
            observing: false,
            sink_factory: None,
        }
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Attach a frame sink to every surface this container creates.
    pub fn with_frame_sink<F>(mut self, factory: F) -> Self
    where
        F: FnMut(SurfaceId) -> Box<dyn FrameSink> + 'static,
    {
        self.sink_factory = Some(Box::new(factory));
        self
    }

    /// Change the viewport; the host is expected to call `Cannon::on_resize` afterwards.
    pub fn set_viewport(&mut self, viewport: SurfaceSize) {
        self.viewport = viewport;
    }

    /// Record the layout rectangle of a surface the caller created, such as one passed to
    /// `Cannon::with_surface`.
    pub fn place(&mut self, id: SurfaceId, bounds: Rect) {
        self.placed.insert(id, bounds);
    }

    pub fn is_attached(&self, id: SurfaceId) -> bool {
        self.attached.contains(&id)
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Number of surfaces created over the container's lifetime.
    pub fn created_count(&self) -> usize {
        self.z_indices.len()
    }

    pub fn z_index_of(&self, id: SurfaceId) -> Option<i32> {
        self.z_indices.get(&id).copied()
    }

    pub fn is_observing_resize(&self) -> bool {
        self.observing
    }
}

impl std::fmt::Debug for HeadlessContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessContainer")
            .field("viewport", &self.viewport)
            .field("reduced_motion", &self.reduced_motion)
            .field("attached", &self.attached)
            .field("observing", &self.observing)
            .finish_non_exhaustive()
    }
}

impl Container for HeadlessContainer {
    fn create_surface(&mut self, z_index: i32) -> SurfaceHandle {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.z_indices.insert(id, z_index);

        let mut surface = PixmapSurface::empty().with_bounds(self.viewport.to_rect());
        if let Some(factory) = self.sink_factory.as_mut() {
            surface = surface.with_sink(factory(id));
        }
        tracing::trace!(id = id.0, z_index, "created headless surface");
        SurfaceHandle::new(id, Box::new(surface))
    }

    fn attach(&mut self, id: SurfaceId) {
        self.attached.insert(id);
    }

    fn detach(&mut self, id: SurfaceId) {
        self.attached.remove(&id);
    }

    fn viewport_size(&self) -> SurfaceSize {
        self.viewport
    }

    fn bounds_of(&self, id: SurfaceId) -> Option<Rect> {
        if let Some(bounds) = self.placed.get(&id) {
            return Some(*bounds);
        }
        self.attached
            .contains(&id)
            .then(|| self.viewport.to_rect())
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn observe_resize(&mut self) {
        self.observing = true;
    }

    fn unobserve_resize(&mut self) {
        self.observing = false;
    }
}
