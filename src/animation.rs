//! The per-surface animation loop.
//!
//! A loop owns its surface and every live particle drawn on it. Ticks are released by the
//! owner's [`FrameScheduler`]; each tick clears the surface, integrates and draws all particles,
//! drops the dead ones and presents the frame.

use crate::completion::CompletionSignal;
use crate::foundation::core::SurfaceSize;
use crate::physics::Particle;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::surface::draw::DrawingSurface;
use rand::Rng;

/// Generation tag of a loop; frames released for an older loop are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopId(pub u64);

/// What a loop hands back once it stops.
///
/// The completion signal is left unsettled so the owner can release its own resources first.
pub struct Finished {
    pub surface: Box<dyn DrawingSurface>,
    pub completion: CompletionSignal,
}

pub struct AnimationLoop {
    id: LoopId,
    surface: Box<dyn DrawingSurface>,
    particles: Vec<Particle>,
    size: Option<SurfaceSize>,
    frame: Option<FrameHandle>,
    completion: CompletionSignal,
}

impl AnimationLoop {
    /// Take ownership of `surface` and schedule the first tick.
    ///
    /// An unmeasured `size` is resolved lazily on the first tick.
    pub fn start(
        id: LoopId,
        surface: Box<dyn DrawingSurface>,
        particles: Vec<Particle>,
        size: SurfaceSize,
        scheduler: &mut FrameScheduler<LoopId>,
    ) -> Self {
        let mut anim = Self {
            id,
            surface,
            particles,
            size: (!size.is_unmeasured()).then_some(size),
            frame: None,
            completion: CompletionSignal::new(),
        };
        anim.schedule_next(scheduler);
        tracing::debug!(loop_id = id.0, particles = anim.particles.len(), "animation started");
        anim
    }

    pub fn id(&self) -> LoopId {
        self.id
    }

    pub fn completion(&self) -> CompletionSignal {
        self.completion.clone()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Size used for clearing, if known.
    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    pub fn surface(&self) -> &dyn DrawingSurface {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> &mut dyn DrawingSurface {
        self.surface.as_mut()
    }

    pub fn is_scheduled(&self) -> bool {
        self.frame.is_some()
    }

    /// Run one frame. Returns `true` while particles remain.
    ///
    /// `fixed_size` forces the surface size when it differs from the tracked one. Otherwise, when
    /// the size is unknown, `resize` is run against the surface and its new size is read back.
    pub fn tick<R>(
        &mut self,
        fixed_size: Option<SurfaceSize>,
        resize: R,
        rng: &mut impl Rng,
    ) -> bool
    where
        R: FnOnce(&mut dyn DrawingSurface),
    {
        self.frame = None;

        if let Some(fixed) = fixed_size
            && self.size != Some(fixed)
        {
            self.surface.set_size(fixed);
            self.size = Some(fixed);
        }
        if self.size.is_none() {
            resize(self.surface.as_mut());
            let measured = self.surface.size();
            self.size = (!measured.is_unmeasured()).then_some(measured);
        }

        self.surface
            .clear(self.size.unwrap_or_default().to_rect());

        let surface = &mut self.surface;
        self.particles.retain_mut(|p| {
            let step = p.step(&mut *rng);
            surface.draw(&step.draw);
            step.alive
        });
        self.surface.present();

        !self.particles.is_empty()
    }

    pub fn schedule_next(&mut self, scheduler: &mut FrameScheduler<LoopId>) {
        if let Some(stale) = self.frame.take() {
            scheduler.cancel(stale);
        }
        self.frame = Some(scheduler.schedule(self.id));
    }

    /// Forget the tracked size; it is measured again on the next tick.
    pub fn invalidate_size(&mut self) {
        self.size = None;
    }

    /// Merge particles of a later burst into this loop.
    pub fn add_particles(&mut self, particles: Vec<Particle>) -> CompletionSignal {
        self.particles.extend(particles);
        tracing::debug!(
            loop_id = self.id.0,
            particles = self.particles.len(),
            "burst merged into running animation"
        );
        self.completion.clone()
    }

    /// Stop before the particles expire.
    pub fn cancel(mut self, scheduler: &mut FrameScheduler<LoopId>) -> Finished {
        if let Some(frame) = self.frame.take() {
            scheduler.cancel(frame);
        }
        self.particles.clear();
        self.finish()
    }

    /// Clear the surface one last time and release it.
    pub fn finish(mut self) -> Finished {
        let rect = self
            .size
            .unwrap_or_else(|| self.surface.size())
            .to_rect();
        self.surface.clear(rect);
        self.surface.present();
        tracing::debug!(loop_id = self.id.0, "animation finished");
        Finished {
            surface: self.surface,
            completion: self.completion,
        }
    }
}

impl std::fmt::Debug for AnimationLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationLoop")
            .field("id", &self.id)
            .field("particles", &self.particles.len())
            .field("size", &self.size)
            .field("frame", &self.frame)
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/unit/animation.rs"]
mod tests;
