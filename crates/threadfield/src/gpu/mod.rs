//! wgpu plumbing for the thread kernel.
//!
//! - `context` owns instance/adapter/device/surface wiring and reconfigures the
//!   swapchain on resize.
//! - `pipeline` compiles the GLSL kernel into a render pipeline with one
//!   uniform bind group.
//! - `uniforms` mirrors the std140 `ThreadParams` block.
//! - `state` glues them into [`GpuSurface`], the production [`crate::RenderSurface`].

mod context;
mod pipeline;
mod state;
mod uniforms;

pub use state::GpuSurface;
