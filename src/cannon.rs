//! The burst orchestrator.
//!
//! A [`Cannon`] turns `fire` calls into particles on one surface: either a surface it creates in
//! its [`Container`] on demand (library-owned) or one the caller supplied. Bursts fired while an
//! animation is running merge into it. With `use_worker` set, bursts run on a secondary thread
//! instead, and the surface is moved there on first use.
//!
//! The host drives everything by calling [`Cannon::advance`] once per display frame.

use crate::animation::{AnimationLoop, Finished, LoopId};
use crate::completion::CompletionSignal;
use crate::foundation::core::{Rect, SurfaceSize};
use crate::offload::{ContextSpawner, OffloadProxy, ThreadSpawner};
use crate::options::{BurstConfig, BurstOptions};
use crate::physics::Particle;
use crate::scheduler::{FrameScheduler, FrameTiming};
use crate::surface::draw::{Container, DrawingSurface, SurfaceHandle, SurfaceId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Cannon-wide settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CannonOpts {
    /// Size the surface to its container on first use and follow container resizes.
    pub resize: bool,
    /// Run bursts on a secondary thread when one can be started.
    pub use_worker: bool,
    /// Skip every burst when the container prefers reduced motion.
    pub disable_for_reduced_motion: bool,
    pub timing: FrameTiming,
}

impl CannonOpts {
    /// Settings of the ready-made full-viewport cannon: resizing and off-thread bursts enabled.
    pub fn global() -> Self {
        Self {
            resize: true,
            use_worker: true,
            ..Self::default()
        }
    }
}

/// How a surface is sized to its container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resizer {
    /// Match the viewport; used for library-owned overlay surfaces.
    Window,
    /// Match the surface's own layout rectangle; used for caller-supplied surfaces.
    Element,
}

impl Resizer {
    pub fn apply(self, surface: &mut dyn DrawingSurface, viewport: SurfaceSize) {
        let size = match self {
            Self::Window => viewport,
            Self::Element => SurfaceSize::from_rect(surface.bounds()),
        };
        surface.set_size(size);
    }
}

enum Offload {
    Off,
    Unspawned,
    Active(OffloadProxy),
}

pub struct Cannon<C: Container> {
    container: C,
    opts: CannonOpts,
    library_owned: bool,
    resizer: Resizer,
    prefers_less_motion: bool,
    initialized: bool,
    observing: bool,
    surface_id: Option<SurfaceId>,
    idle_surface: Option<Box<dyn DrawingSurface>>,
    /// Layout rectangle of the surface when it was moved to the worker.
    handed_bounds: Option<Rect>,
    last_size: SurfaceSize,
    forced_size: Option<SurfaceSize>,
    animation: Option<AnimationLoop>,
    scheduler: FrameScheduler<LoopId>,
    next_loop: u64,
    rng: StdRng,
    offload: Offload,
    spawner: Box<dyn ContextSpawner>,
}

impl<C: Container> Cannon<C> {
    /// A cannon that creates its own overlay surface in `container` whenever a burst needs one.
    pub fn new(container: C, opts: CannonOpts) -> Self {
        Self::build(container, None, opts)
    }

    /// A cannon that draws on a caller-supplied surface.
    pub fn with_surface(container: C, surface: SurfaceHandle, opts: CannonOpts) -> Self {
        Self::build(container, Some(surface), opts)
    }

    fn build(container: C, surface: Option<SurfaceHandle>, opts: CannonOpts) -> Self {
        let library_owned = surface.is_none();
        let prefers_less_motion = container.prefers_reduced_motion();
        let (surface_id, idle_surface) = match surface {
            Some(h) => (Some(h.id), Some(h.surface)),
            None => (None, None),
        };
        Self {
            container,
            opts,
            library_owned,
            resizer: if library_owned {
                Resizer::Window
            } else {
                Resizer::Element
            },
            prefers_less_motion,
            initialized: false,
            observing: false,
            surface_id,
            idle_surface,
            handed_bounds: None,
            last_size: SurfaceSize::default(),
            forced_size: None,
            animation: None,
            scheduler: FrameScheduler::new(opts.timing),
            next_loop: 1,
            rng: StdRng::from_os_rng(),
            offload: if opts.use_worker {
                Offload::Unspawned
            } else {
                Offload::Off
            },
            spawner: Box::new(ThreadSpawner),
        }
    }

    /// Start delegated bursts with `spawner` instead of an OS thread.
    pub fn with_spawner(mut self, spawner: impl ContextSpawner + 'static) -> Self {
        self.spawner = Box::new(spawner);
        self
    }

    /// Seed the particle generator, for repeatable runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn opts(&self) -> CannonOpts {
        self.opts
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    /// Identity of the surface currently in use, if any.
    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface_id
    }

    /// The surface, while it is on this thread.
    pub fn surface(&self) -> Option<&dyn DrawingSurface> {
        match &self.animation {
            Some(anim) => Some(anim.surface()),
            None => self.idle_surface.as_deref(),
        }
    }

    pub fn surface_mut(&mut self) -> Option<&mut dyn DrawingSurface> {
        match &mut self.animation {
            Some(anim) => Some(anim.surface_mut()),
            None => match &mut self.idle_surface {
                Some(s) => Some(s.as_mut()),
                None => None,
            },
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
            || matches!(&self.offload, Offload::Active(p) if p.is_outstanding())
    }

    /// Particles currently animating on this thread.
    pub fn live_particles(&self) -> usize {
        self.animation
            .as_ref()
            .map_or(0, AnimationLoop::particle_count)
    }

    /// Whether bursts are currently sent to a secondary thread.
    pub fn is_delegating(&self) -> bool {
        matches!(self.offload, Offload::Active(_))
    }

    /// Earliest time the next call to `advance` has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    /// Size every tick forces onto the surface.
    pub(crate) fn set_forced_size(&mut self, size: Option<SurfaceSize>) {
        self.forced_size = size;
    }

    /// Launch a burst. The returned signal settles once the animation it joined completes.
    #[tracing::instrument(skip(self, options))]
    pub fn fire(&mut self, options: &BurstOptions) -> CompletionSignal {
        let disable_for_reduced_motion = self.opts.disable_for_reduced_motion
            || options.disable_for_reduced_motion.unwrap_or(false);
        if disable_for_reduced_motion && self.prefers_less_motion {
            tracing::debug!("reduced motion preferred; burst skipped");
            return CompletionSignal::settled();
        }

        if self.library_owned && self.surface_id.is_none() {
            let z_index = BurstConfig::resolve(options).z_index;
            let handle = self.container.create_surface(z_index);
            self.container.attach(handle.id);
            self.surface_id = Some(handle.id);
            self.idle_surface = Some(handle.surface);
        }

        // Launch points are computed from the size, so an unmeasured surface is sized first.
        let first_use = self.opts.resize && !self.initialized;
        let viewport = self.container.viewport_size();
        let resizer = self.resizer;
        if let Some(surface) = self.surface_mut()
            && (first_use || surface.size().is_unmeasured())
        {
            resizer.apply(surface, viewport);
        }

        if let Some(surface) = self.surface() {
            self.last_size = surface.size();
        }
        let size = self.last_size;
        self.initialized = true;

        if self.opts.resize && !self.observing {
            self.container.observe_resize();
            self.observing = true;
        }

        if let Some(signal) = self.fire_delegated(options, size) {
            return signal;
        }
        self.fire_local(options, size)
    }

    fn fire_delegated(
        &mut self,
        options: &BurstOptions,
        size: SurfaceSize,
    ) -> Option<CompletionSignal> {
        if matches!(self.offload, Offload::Unspawned) {
            self.offload = match self.spawner.spawn() {
                Ok(channel) => {
                    tracing::debug!("offload worker started");
                    Offload::Active(OffloadProxy::new(channel))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not start offload worker; running bursts locally");
                    Offload::Off
                }
            };
        }
        let Offload::Active(proxy) = &mut self.offload else {
            return None;
        };

        // A surface still on this thread has not been handed to the worker yet.
        if let Some(surface) = self.idle_surface.take() {
            let bounds = surface.bounds();
            if let Some(surface) = proxy.init(surface, size) {
                self.idle_surface = Some(surface);
                self.offload = Offload::Off;
                return None;
            }
            self.handed_bounds = Some(bounds);
        }

        let signal = proxy.send(options.clone());
        if signal.is_settled() {
            self.complete(None);
        }
        Some(signal)
    }

    fn fire_local(&mut self, options: &BurstOptions, size: SurfaceSize) -> CompletionSignal {
        let config = BurstConfig::resolve(options);
        let particles = build_particles(&config, size, &mut self.rng);

        if let Some(anim) = self.animation.as_mut() {
            return anim.add_particles(particles);
        }

        let Some(surface) = self.idle_surface.take() else {
            tracing::warn!("no surface available; burst skipped");
            return CompletionSignal::settled();
        };
        let id = LoopId(self.next_loop);
        self.next_loop += 1;
        let anim = AnimationLoop::start(id, surface, particles, size, &mut self.scheduler);
        let signal = anim.completion();
        self.animation = Some(anim);
        signal
    }

    /// Stop every running burst now and settle their signals.
    pub fn reset(&mut self) {
        if let Offload::Active(proxy) = &mut self.offload
            && proxy.reset_all() > 0
        {
            self.complete(None);
        }
        if let Some(anim) = self.animation.take() {
            tracing::debug!(loop_id = anim.id().0, "animation reset");
            let finished = anim.cancel(&mut self.scheduler);
            self.finish(finished);
        }
    }

    /// Tell the cannon its container was resized.
    pub fn on_resize(&mut self) {
        if let Offload::Active(proxy) = &mut self.offload {
            let size = match self.resizer {
                Resizer::Window => Some(self.container.viewport_size()),
                Resizer::Element => self
                    .surface_id
                    .and_then(|id| self.container.bounds_of(id))
                    .or(self.handed_bounds)
                    .map(SurfaceSize::from_rect),
            };
            if let Some(size) = size {
                proxy.resize_notify(size);
            }
            return;
        }
        if let Some(anim) = self.animation.as_mut() {
            anim.invalidate_size();
        }
    }

    /// Host frame pump: collect worker completions and run due animation ticks.
    pub fn advance(&mut self, now_ms: u64) {
        if let Offload::Active(proxy) = &mut self.offload
            && proxy.poll() > 0
        {
            self.complete(None);
        }

        for id in self.scheduler.advance(now_ms) {
            let viewport = self.container.viewport_size();
            let resizer = self.resizer;
            let forced = self.forced_size;
            let Some(anim) = self.animation.as_mut().filter(|a| a.id() == id) else {
                tracing::trace!(loop_id = id.0, "stale frame dropped");
                continue;
            };
            let alive = anim.tick(forced, |s| resizer.apply(s, viewport), &mut self.rng);
            if alive {
                anim.schedule_next(&mut self.scheduler);
            } else if let Some(anim) = self.animation.take() {
                let finished = anim.finish();
                self.finish(finished);
            }
        }
    }

    fn finish(&mut self, finished: Finished) {
        let Finished {
            surface,
            completion,
        } = finished;
        self.complete(Some(surface));
        completion.settle();
    }

    /// Release per-burst resources once the current animation is over.
    fn complete(&mut self, surface: Option<Box<dyn DrawingSurface>>) {
        if self.observing {
            self.container.unobserve_resize();
            self.observing = false;
        }
        if self.library_owned {
            if let Some(id) = self.surface_id.take() {
                self.container.detach(id);
            }
            self.initialized = false;
            self.idle_surface = None;
            self.handed_bounds = None;
        } else if surface.is_some() {
            self.idle_surface = surface;
        }
    }
}

impl<C: Container> std::fmt::Debug for Cannon<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cannon")
            .field("opts", &self.opts)
            .field("library_owned", &self.library_owned)
            .field("initialized", &self.initialized)
            .field("surface_id", &self.surface_id)
            .field("animation", &self.animation)
            .field("delegating", &self.is_delegating())
            .finish_non_exhaustive()
    }
}

/// Expand a burst into particles; colors cycle from the end of the palette.
fn build_particles(config: &BurstConfig, size: SurfaceSize, rng: &mut impl Rng) -> Vec<Particle> {
    let n = config.particle_count as usize;
    let mut particles = Vec::with_capacity(n);
    for i in (0..n).rev() {
        let origin = config.launch_point(size, rng);
        let color = config.colors[i % config.colors.len()];
        let shape = config.shapes[rng.random_range(0..config.shapes.len())];
        particles.push(Particle::initialize(config, origin, color, shape, rng));
    }
    particles
}

#[cfg(test)]
#[path = "../tests/unit/cannon.rs"]
mod tests;
