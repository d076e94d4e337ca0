use super::draw::{DrawCommand, DrawingSurface};
use crate::foundation::core::{Rect, SurfaceSize};
use std::sync::{Arc, Mutex, MutexGuard};

/// One call observed by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
    Resize(SurfaceSize),
    Clear(Rect),
    Draw(DrawCommand),
    Present,
}

#[derive(Debug, Default)]
struct RecordingState {
    events: Vec<SurfaceEvent>,
    detached: bool,
    bounds: Option<Rect>,
}

/// Inspection handle onto a [`RecordingSurface`], usable after the surface was moved away.
#[derive(Clone, Debug, Default)]
pub struct RecordingLog(Arc<Mutex<RecordingState>>);

impl RecordingLog {
    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.lock().events.clone()
    }

    pub fn draw_count(&self) -> usize {
        self.count(|e| matches!(e, SurfaceEvent::Draw(_)))
    }

    pub fn present_count(&self) -> usize {
        self.count(|e| matches!(e, SurfaceEvent::Present))
    }

    pub fn clear_count(&self) -> usize {
        self.count(|e| matches!(e, SurfaceEvent::Clear(_)))
    }

    /// Draws issued between consecutive presents, one entry per frame.
    pub fn draws_per_frame(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut n = 0;
        for e in &self.lock().events {
            match e {
                SurfaceEvent::Draw(_) => n += 1,
                SurfaceEvent::Present => {
                    out.push(n);
                    n = 0;
                }
                _ => {}
            }
        }
        out
    }

    /// Simulate the host removing the surface from display: later draws are dropped.
    pub fn detach(&self) {
        self.lock().detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.lock().detached
    }

    /// Override the layout rectangle reported by the surface.
    pub fn set_bounds(&self, bounds: Rect) {
        self.lock().bounds = Some(bounds);
    }

    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    fn count(&self, f: impl Fn(&SurfaceEvent) -> bool) -> usize {
        self.lock().events.iter().filter(|e| f(e)).count()
    }
}

/// A surface that records every call instead of rasterizing.
#[derive(Debug)]
pub struct RecordingSurface {
    size: SurfaceSize,
    log: RecordingLog,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            log: RecordingLog::default(),
        }
    }

    pub fn log(&self) -> RecordingLog {
        self.log.clone()
    }

    fn push(&self, event: SurfaceEvent) {
        self.log.lock().events.push(event);
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn set_size(&mut self, size: SurfaceSize) {
        self.size = size;
        self.push(SurfaceEvent::Resize(size));
    }

    fn clear(&mut self, rect: Rect) {
        self.push(SurfaceEvent::Clear(rect));
    }

    fn draw(&mut self, cmd: &DrawCommand) {
        let mut state = self.log.lock();
        if !state.detached {
            state.events.push(SurfaceEvent::Draw(cmd.clone()));
        }
    }

    fn bounds(&self) -> Rect {
        self.log.lock().bounds.unwrap_or_else(|| self.size.to_rect())
    }

    fn present(&mut self) {
        self.push(SurfaceEvent::Present);
    }
}
