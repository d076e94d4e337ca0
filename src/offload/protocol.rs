use crate::foundation::core::SurfaceSize;
use crate::options::BurstOptions;
use crate::surface::draw::DrawingSurface;

/// Ties a `Completed` reply to the `Fire` that asked for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CorrelationId(pub u64);

/// Primary to worker.
pub enum ToWorker {
    /// Hand the surface to the worker, replacing any earlier one.
    Init {
        surface: Box<dyn DrawingSurface>,
        size: SurfaceSize,
    },
    /// Fire a burst; with a `callback` the worker answers once the animation completes.
    Fire {
        options: BurstOptions,
        callback: Option<CorrelationId>,
    },
    Reset,
    Resize(SurfaceSize),
}

impl ToWorker {
    /// The surface carried by an `Init`, if any.
    pub(crate) fn into_surface(self) -> Option<Box<dyn DrawingSurface>> {
        match self {
            Self::Init { surface, .. } => Some(surface),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Fire { .. } => "fire",
            Self::Reset => "reset",
            Self::Resize(_) => "resize",
        }
    }
}

impl std::fmt::Debug for ToWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init { surface, size } => f
                .debug_struct("Init")
                .field("surface_size", &surface.size())
                .field("size", size)
                .finish(),
            Self::Fire { options, callback } => f
                .debug_struct("Fire")
                .field("options", options)
                .field("callback", callback)
                .finish(),
            Self::Reset => f.write_str("Reset"),
            Self::Resize(size) => f.debug_tuple("Resize").field(size).finish(),
        }
    }
}

/// Worker to primary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FromWorker {
    Completed { callback: CorrelationId },
}
