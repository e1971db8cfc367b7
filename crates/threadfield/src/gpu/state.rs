use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use winit::dpi::PhysicalSize;

use crate::host::{AttachError, DrawError, RenderSurface};
use crate::runtime::RenderState;
use crate::types::GpuPowerPreference;

use super::context::GpuContext;
use super::pipeline::ThreadPipeline;
use super::uniforms::ThreadUniforms;

/// wgpu-backed [`RenderSurface`]: one full-screen triangle per frame.
pub struct GpuSurface {
    context: GpuContext,
    pipeline: ThreadPipeline,
}

impl GpuSurface {
    /// Acquires a device for `target` and builds the kernel pipeline.
    pub fn new<T>(
        target: T,
        size: PhysicalSize<u32>,
        power: GpuPowerPreference,
    ) -> Result<Self, AttachError>
    where
        T: HasDisplayHandle + HasWindowHandle + Send + Sync + 'static,
    {
        let context = GpuContext::new(target, size, power)?;
        let pipeline = ThreadPipeline::new(&context.device, context.config.format)?;
        Ok(Self { context, pipeline })
    }
}

impl RenderSurface for GpuSurface {
    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.context.resize(size);
    }

    fn draw(&mut self, state: &RenderState) -> Result<(), DrawError> {
        if !state.resolution.is_drawable() {
            return Ok(());
        }
        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                return Err(DrawError::Lost);
            }
            Err(wgpu::SurfaceError::Timeout) => return Err(DrawError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(DrawError::OutOfMemory),
            Err(err) => return Err(DrawError::Other(err.to_string())),
        };

        ThreadUniforms::from_state(state)
            .upload(&self.context.queue, &self.pipeline.uniform_buffer);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("thread frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("thread pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline.pipeline);
            pass.set_bind_group(0, &self.pipeline.uniform_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release(self) {
        let Self { context, pipeline } = self;
        drop(pipeline);
        context.device.destroy();
        debug!("GPU surface released");
    }
}
