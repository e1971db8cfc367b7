//! Desktop host: a winit window whose client area is the container.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use tracing::{debug, info, trace};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuSurface;
use crate::host::{AttachError, FrameHandle, Host};
use crate::lifecycle::Threads;
use crate::types::{GpuPowerPreference, ThreadsOptions, WindowConfig};

/// [`Host`] backed by a winit window.
///
/// Frame requests map onto `request_redraw`; the event loop turns the
/// resulting `RedrawRequested` into the pending frame callback. Deferred
/// requests only record a wake-up time, which `AboutToWait` turns into
/// `ControlFlow::WaitUntil`.
pub struct WindowHost {
    window: Arc<Window>,
    power: GpuPowerPreference,
    next_frame: u64,
    pending: Option<FrameHandle>,
    wake_at: Option<Instant>,
    resize_observed: bool,
    pointer_listening: bool,
}

impl WindowHost {
    pub fn new(window: Arc<Window>, power: GpuPowerPreference) -> Self {
        Self {
            window,
            power,
            next_frame: 0,
            pending: None,
            wake_at: None,
            resize_observed: false,
            pointer_listening: false,
        }
    }

    /// The frame callback a `RedrawRequested` should deliver, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// When a deferred frame becomes due.
    pub fn wake_at(&self) -> Option<Instant> {
        self.wake_at
    }

    pub fn observes_resize(&self) -> bool {
        self.resize_observed
    }

    pub fn listens_pointer(&self) -> bool {
        self.pointer_listening
    }

    fn logical(&self, size: PhysicalSize<u32>) -> LogicalSize<f64> {
        size.to_logical(self.window.scale_factor())
    }
}

impl Host for WindowHost {
    type Surface = GpuSurface;

    fn container_size(&self) -> LogicalSize<f64> {
        self.logical(self.window.inner_size())
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn create_surface(&mut self, size: PhysicalSize<u32>) -> Result<GpuSurface, AttachError> {
        GpuSurface::new(self.window.clone(), size, self.power)
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle(self.next_frame);
        self.pending = Some(handle);
        self.wake_at = None;
        self.window.request_redraw();
        handle
    }

    fn request_frame_after(&mut self, delay: Duration) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle(self.next_frame);
        self.pending = Some(handle);
        self.wake_at = Some(Instant::now() + delay);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.wake_at = None;
        }
    }

    fn observe_resize(&mut self, active: bool) {
        self.resize_observed = active;
    }

    fn listen_pointer(&mut self, active: bool) {
        self.pointer_listening = active;
    }

    fn detach_surface(&mut self) {
        self.window.set_visible(false);
    }
}

/// Opens a window and animates the thread field in it until it is closed.
pub fn run_window(config: WindowConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(LogicalSize::new(config.size.0, config.size.1))
        .with_transparent(true)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let options = swapchain_options(&config.threads, window.scale_factor());
    let mut threads = Threads::new(options);
    threads
        .attach(WindowHost::new(window.clone(), config.power))
        .map_err(|err| anyhow!("failed to start thread renderer: {err}"))?;
    info!(title = %config.title, "window opened");

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    threads.detach();
                    elwt.exit();
                }
                WindowEvent::Resized(size) => {
                    if threads.host().is_some_and(WindowHost::observes_resize) {
                        let container = size.to_logical(window.scale_factor());
                        threads.resize(container, Instant::now());
                    }
                }
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    if threads.host().is_some_and(WindowHost::observes_resize) {
                        let container = window.inner_size().to_logical(scale_factor);
                        threads.resize(container, Instant::now());
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    if threads.host().is_some_and(WindowHost::listens_pointer) {
                        threads.pointer_moved(position.to_logical(window.scale_factor()));
                    }
                }
                WindowEvent::CursorLeft { .. } => {
                    if threads.host().is_some_and(WindowHost::listens_pointer) {
                        threads.pointer_left();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let Some(handle) = threads.host().and_then(WindowHost::pending_frame) else {
                        trace!("redraw without a pending frame");
                        return;
                    };
                    let now = Instant::now();
                    if threads
                        .host()
                        .and_then(WindowHost::wake_at)
                        .is_some_and(|due| due > now)
                    {
                        trace!("redraw before the deferred frame is due");
                        return;
                    }
                    let outcome = threads.frame(handle, now);
                    trace!(?outcome, "frame");
                    if threads.is_terminated() {
                        elwt.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                let now = Instant::now();
                match threads.host().and_then(WindowHost::wake_at) {
                    Some(due) if due <= now => {
                        window.request_redraw();
                        elwt.set_control_flow(ControlFlow::Wait);
                    }
                    Some(due) => {
                        let ms = due.saturating_duration_since(now).as_millis();
                        trace!(deadline_ms = ms, "waiting for deferred frame");
                        elwt.set_control_flow(ControlFlow::WaitUntil(due));
                    }
                    None => elwt.set_control_flow(ControlFlow::Wait),
                }
            }
            Event::LoopExiting => threads.detach(),
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

/// Options for a window-backed instance.
///
/// A native swapchain presents at its configured extent, so the backing store
/// has to cover the window's physical size; the pixel ratio cap is lifted.
fn swapchain_options(options: &ThreadsOptions, scale_factor: f64) -> ThreadsOptions {
    if scale_factor > options.max_pixel_ratio {
        debug!(
            scale_factor,
            cap = options.max_pixel_ratio,
            "pixel ratio cap lifted to match the window's physical size"
        );
    }
    ThreadsOptions {
        max_pixel_ratio: f64::INFINITY,
        ..options.clone()
    }
}
