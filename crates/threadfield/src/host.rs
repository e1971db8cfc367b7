//! Contract between the renderer and whatever owns the surface it draws into.
//!
//! A [`Host`] stands in for the container: it reports its size and pixel
//! ratio, builds the GPU surface, schedules frame callbacks and toggles the
//! resize/pointer event sources. The window host in [`crate::window`] is the
//! production implementation; tests drive [`crate::Threads`] with a recording
//! host instead.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use winit::dpi::{LogicalSize, PhysicalSize};

use crate::runtime::RenderState;

/// Identifies one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Reasons `attach` can fail. Context and shader failures are final for the instance.
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("failed to acquire a GPU context: {0}")]
    ContextAcquisition(String),
    #[error("thread shader failed to compile:\n{diagnostics}")]
    ShaderCompile { diagnostics: String },
    #[error("renderer instance was already attached; construct a new one")]
    NotFresh,
}

impl AttachError {
    pub fn context(err: impl std::fmt::Display) -> Self {
        Self::ContextAcquisition(err.to_string())
    }
}

/// Per-frame draw failures reported by a [`RenderSurface`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("surface lost or outdated")]
    Lost,
    #[error("timed out acquiring the next surface texture")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("surface error: {0}")]
    Other(String),
}

/// GPU resources for one mounted instance: device, compiled program,
/// full-screen geometry and uniform storage.
pub trait RenderSurface {
    /// Reallocates the backing store. Zero-sized requests are ignored.
    fn resize(&mut self, size: PhysicalSize<u32>);

    /// Uploads every uniform in `state`, then issues one full-screen draw.
    fn draw(&mut self, state: &RenderState) -> Result<(), DrawError>;

    /// Releases the device and everything created from it.
    fn release(self);
}

/// The environment a renderer instance is mounted into.
pub trait Host {
    type Surface: RenderSurface;

    /// Container size in logical pixels.
    fn container_size(&self) -> LogicalSize<f64>;

    /// Physical pixels per logical pixel.
    fn device_pixel_ratio(&self) -> f64;

    /// Acquires a GPU context and compiles the kernel for a backing store of `size`.
    fn create_surface(&mut self, size: PhysicalSize<u32>) -> Result<Self::Surface, AttachError>;

    /// Asks for a callback on the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Asks for a callback once `delay` has passed, without waiting on a present.
    fn request_frame_after(&mut self, delay: Duration) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Starts or stops delivering container resize events.
    fn observe_resize(&mut self, active: bool);

    /// Starts or stops delivering pointer move/leave events.
    fn listen_pointer(&mut self, active: bool);

    /// Removes the render surface from the container.
    fn detach_surface(&mut self);
}

/// Shared flag that host callbacks consult before touching an instance.
///
/// Set while the instance is mounted and cleared on detach, so a frame or
/// resize callback that was already queued when the instance went away turns
/// into a no-op.
#[derive(Debug, Clone, Default)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn set(&self, alive: bool) {
        self.0.set(alive);
    }
}
