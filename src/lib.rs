//! Confetti particle bursts for 2D raster surfaces.
//!
//! A [`Cannon`] fires bursts of particles onto a [`DrawingSurface`]:
//!
//! - Describe a burst with [`BurstOptions`] (builder methods or camelCase JSON)
//! - Call [`Cannon::fire`] and keep the returned [`CompletionSignal`]
//! - Pump [`Cannon::advance`] once per display frame until the signal settles
//!
//! [`PixmapSurface`] rasterizes on the CPU; with [`CannonOpts::use_worker`] bursts animate on a
//! secondary thread.
#![forbid(unsafe_code)]

mod foundation;

pub mod animation;
pub mod cannon;
pub mod color;
pub mod completion;
pub mod offload;
pub mod options;
pub mod physics;
pub mod scheduler;
pub mod star;
pub mod surface;

pub use crate::foundation::core::{
    BezPath, FrameIndex, Point, Rect, Rgba8Premul, SurfaceSize, Vec2,
};
pub use crate::foundation::error::{ConfettiError, ConfettiResult};

pub use crate::cannon::{Cannon, CannonOpts, Resizer};
pub use crate::completion::CompletionSignal;
pub use crate::offload::{ContextSpawner, NoSpawner, OffloadError, ThreadSpawner, WorkerChannel};
pub use crate::options::{BurstConfig, BurstOptions, StarOptions};
pub use crate::physics::{Particle, Shape};
pub use crate::scheduler::{FRAME_INTERVAL_MS, FrameScheduler, FrameTiming};
pub use crate::surface::draw::{
    Container, DrawCommand, DrawingSurface, StrokeStyle, SurfaceHandle, SurfaceId,
};
pub use crate::surface::headless::HeadlessContainer;
pub use crate::surface::pixmap::PixmapSurface;
pub use crate::surface::record::{RecordingLog, RecordingSurface, SurfaceEvent};
pub use crate::surface::sink::{CollectSink, FrameRGBA, FrameSink};
