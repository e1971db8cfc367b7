use bytemuck::{Pod, Zeroable};

use crate::runtime::RenderState;

/// std140 mirror of the `ThreadParams` block in the fragment shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct ThreadUniforms {
    /// `(width, height, aspect, 0)`.
    pub resolution: [f32; 4],
    pub mouse: [f32; 2],
    pub time: f32,
    pub amplitude: f32,
    pub distance_skew: f32,
    pub line_count: i32,
    pub _padding: [f32; 2],
}

impl ThreadUniforms {
    pub fn from_state(state: &RenderState) -> Self {
        let resolution = state.resolution;
        Self {
            resolution: [resolution.width, resolution.height, resolution.aspect, 0.0],
            mouse: state.mouse,
            time: state.time_seconds,
            amplitude: state.amplitude,
            distance_skew: state.distance_skew,
            line_count: i32::try_from(state.line_count).unwrap_or(i32::MAX),
            _padding: [0.0; 2],
        }
    }

    pub fn upload(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::bytes_of(self));
    }
}
