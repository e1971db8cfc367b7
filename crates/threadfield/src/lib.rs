//! Animated thread field renderer.
//!
//! A stack of soft, glowing lines drifts across the target, bent by gradient
//! noise and tinted from a cycling five-stop palette. The crate splits the
//! work into a pure kernel and the host-facing machinery around it:
//!
//! ```text
//!   Host (winit window, or your own)
//!          │ frame / resize / pointer callbacks
//!          ▼
//!   Threads<H> ──▶ RenderLoop ──▶ RenderState ──▶ RenderSurface::draw
//!      │   ▲            ▲                              │
//!      │   │            ├── ResizeCoordinator          ├─▶ GpuSurface (GLSL kernel)
//!      │   │            └── PointerSmoother            └─▶ CpuFrame   (kernel::composite)
//!      └───┴── Liveness
//! ```
//!
//! `kernel` holds the per-pixel math as plain Rust; the fragment shader in
//! `compile` is its GPU twin. `Threads` owns every piece of mutable state for
//! one mounted instance and only ever moves forward through
//! attach → running → detached.

mod compile;
mod export;
mod gpu;
mod host;
pub mod kernel;
mod lifecycle;
mod pointer;
mod resize;
mod runtime;
mod types;
mod window;

pub use compile::{fragment_source, validate_fragment_source};
pub use export::{export_png, render_still};
pub use gpu::GpuSurface;
pub use host::{AttachError, DrawError, FrameHandle, Host, Liveness, RenderSurface};
pub use lifecycle::{FrameOutcome, Threads, EMPTY_TARGET_INTERVAL, RETRY_FRAME_INTERVAL};
pub use pointer::{PointerSmoother, POINTER_REST, POINTER_SMOOTHING};
pub use resize::{
    backing_size, resolution_for, AppliedResize, ResizeCoordinator, DEFAULT_MAX_PIXEL_RATIO,
    DEFAULT_RESIZE_DEBOUNCE,
};
pub use runtime::{FrameClock, RenderLoop, RenderState, Resolution, TimeSample};
pub use types::{GpuPowerPreference, ThreadsOptions, WindowConfig};
pub use window::{run_window, WindowHost};

pub use winit::dpi;
