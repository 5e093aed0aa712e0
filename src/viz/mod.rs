//! The contract every visualization implements, plus the pieces that help
//! implementations honour it.

pub mod camera;
pub mod deferred;
pub mod registry;
pub mod resources;
pub mod surface;

pub use camera::PerspectiveCamera;
pub use deferred::{Completer, Deferred};
pub use registry::{Descriptor, Factory, Registry};
pub use resources::ResourceBin;
pub use surface::{Surface, SurfaceLease, SurfaceSlot};

use crate::audio::AudioFrame;
use crate::error::VizError;

/// Drawing-buffer dimensions in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Whether an instance has finished initializing.
#[derive(Debug, Clone)]
pub enum Readiness {
    Ready,
    Pending,
    Failed(VizError),
}

/// Lifecycle of one rendering module.
///
/// The render loop builds an instance through its registry factory, calls
/// [`initialize`](Self::initialize) once, then polls
/// [`poll_ready`](Self::poll_ready) every frame until it reports `Ready`.
/// Only then does it call [`on_resize`](Self::on_resize) and
/// [`draw`](Self::draw). [`dispose`](Self::dispose) is called exactly once,
/// whether or not the instance ever became ready.
pub trait Visualization {
    /// Allocates resources. May kick off asynchronous loads whose outcome is
    /// reported through `poll_ready`.
    fn initialize(&mut self) -> Result<(), VizError>;

    fn poll_ready(&mut self) -> Readiness {
        Readiness::Ready
    }

    /// Adapts projection, render targets and layout to `viewport`. Idempotent.
    fn on_resize(&mut self, viewport: Viewport);

    /// Per-frame update and draw. Must keep animating when `frame.has_audio` is false.
    fn draw(&mut self, frame: &AudioFrame) -> Result<(), VizError>;

    /// Releases everything acquired since construction.
    fn dispose(&mut self);
}
