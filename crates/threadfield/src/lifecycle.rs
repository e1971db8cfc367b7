//! Mount/unmount state machine for a renderer instance.
//!
//! ```text
//!   Uninitialized ──attach──▶ Running ──detach──▶ Unmounted
//!         │                                          ▲
//!         └──────────── attach fails ────────────────┘
//! ```
//!
//! Transitions only go forward. Everything the host feeds in (frames, resizes,
//! pointer events) is checked against the liveness flag first, so callbacks
//! that race a teardown are dropped instead of touching released resources.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};
use winit::dpi::{LogicalPosition, LogicalSize};

use crate::host::{AttachError, DrawError, FrameHandle, Host, Liveness, RenderSurface};
use crate::pointer::PointerSmoother;
use crate::resize::{backing_size, resolution_for, ResizeCoordinator};
use crate::runtime::{RenderLoop, RenderState};
use crate::types::ThreadsOptions;

/// Retry delay after the surface rejected a frame.
pub const RETRY_FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Poll interval while the backing store has no area.
pub const EMPTY_TARGET_INTERVAL: Duration = Duration::from_millis(100);

/// What happened to a frame callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Uniforms were uploaded and the draw call was issued.
    Drawn,
    /// The backing store has no area; nothing was drawn but the loop continues.
    EmptyTarget,
    /// The callback was stale or arrived after teardown.
    Ignored,
    /// The surface rejected the frame.
    Dropped(DrawError),
}

enum Phase<H: Host> {
    Uninitialized,
    Running(Box<Mounted<H>>),
    Unmounted,
}

struct Mounted<H: Host> {
    host: H,
    surface: H::Surface,
    render_loop: RenderLoop,
    resize: ResizeCoordinator,
    pointer: PointerSmoother,
    container: LogicalSize<f64>,
    pending_frame: Option<FrameHandle>,
}

impl<H: Host> Mounted<H> {
    fn teardown(self, liveness: &Liveness) {
        let Mounted {
            mut host,
            surface,
            pointer,
            pending_frame,
            render_loop,
            ..
        } = self;
        liveness.set(false);
        if let Some(handle) = pending_frame {
            host.cancel_frame(handle);
        }
        host.observe_resize(false);
        if pointer.enabled() {
            host.listen_pointer(false);
        }
        surface.release();
        host.detach_surface();
        info!(frames = render_loop.frames(), "thread renderer detached");
    }
}

/// One animated thread field bound to at most one host for its whole life.
pub struct Threads<H: Host> {
    options: ThreadsOptions,
    phase: Phase<H>,
    liveness: Liveness,
}

impl<H: Host> Threads<H> {
    pub fn new(options: ThreadsOptions) -> Self {
        Self {
            options,
            phase: Phase::Uninitialized,
            liveness: Liveness::new(),
        }
    }

    pub fn options(&self) -> &ThreadsOptions {
        &self.options
    }

    /// Mounts the renderer: builds GPU resources for the container, starts the
    /// resize/pointer event sources and schedules the first frame.
    ///
    /// A failed attach is final; the instance moves straight to unmounted.
    pub fn attach(&mut self, mut host: H) -> Result<(), AttachError> {
        if !matches!(self.phase, Phase::Uninitialized) {
            return Err(AttachError::NotFresh);
        }

        let container = host.container_size();
        let pixel_ratio = host.device_pixel_ratio();
        let size = backing_size(container, pixel_ratio, self.options.max_pixel_ratio);
        let surface = match host.create_surface(size) {
            Ok(surface) => surface,
            Err(err) => {
                error!(error = %err, "failed to attach thread renderer");
                self.phase = Phase::Unmounted;
                return Err(err);
            }
        };

        let mut state = RenderState::new(
            self.options.amplitude,
            self.options.distance_skew,
            self.options.clamped_line_count(),
        );
        state.resolution = resolution_for(size);
        let pointer = PointerSmoother::new(self.options.enable_pointer_interaction);

        host.observe_resize(true);
        if pointer.enabled() {
            host.listen_pointer(true);
        }
        self.liveness.set(true);
        let first_frame = host.request_frame();

        info!(
            width = size.width,
            height = size.height,
            pixel_ratio,
            lines = state.line_count,
            amplitude = state.amplitude,
            distance_skew = state.distance_skew,
            pointer = pointer.enabled(),
            "thread renderer attached"
        );

        self.phase = Phase::Running(Box::new(Mounted {
            host,
            surface,
            render_loop: RenderLoop::new(state),
            resize: ResizeCoordinator::new(
                self.options.resize_debounce,
                self.options.max_pixel_ratio,
                size,
            ),
            pointer,
            container,
            pending_frame: Some(first_frame),
        }));
        Ok(())
    }

    /// Tears the instance down. Safe to call repeatedly and before `attach`.
    pub fn detach(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Unmounted) {
            Phase::Running(mounted) => mounted.teardown(&self.liveness),
            other => self.phase = other,
        }
    }

    /// Runs the frame callback identified by `handle`.
    pub fn frame(&mut self, handle: FrameHandle, now: Instant) -> FrameOutcome {
        if !self.liveness.is_alive() {
            trace!(?handle, "frame callback after teardown ignored");
            return FrameOutcome::Ignored;
        }
        let Phase::Running(mounted) = &mut self.phase else {
            return FrameOutcome::Ignored;
        };
        if mounted.pending_frame != Some(handle) {
            trace!(?handle, pending = ?mounted.pending_frame, "stale frame callback ignored");
            return FrameOutcome::Ignored;
        }
        mounted.pending_frame = None;

        if let Some(applied) = mounted.resize.tick(now) {
            mounted.surface.resize(applied.size);
            mounted.render_loop.set_resolution(applied.resolution);
            debug!(
                width = applied.size.width,
                height = applied.size.height,
                debounce_ms = applied.settled_after.as_millis() as u64,
                "applied container resize"
            );
        }

        let mouse = mounted.pointer.step();
        let state = *mounted.render_loop.advance(now, mouse);
        let outcome = if state.resolution.is_drawable() {
            match mounted.surface.draw(&state) {
                Ok(()) => FrameOutcome::Drawn,
                Err(DrawError::Lost) => {
                    mounted.surface.resize(mounted.resize.applied());
                    FrameOutcome::Dropped(DrawError::Lost)
                }
                Err(DrawError::Timeout) => {
                    debug!("surface timeout; retrying next frame");
                    FrameOutcome::Dropped(DrawError::Timeout)
                }
                Err(err) => {
                    warn!(error = %err, "frame dropped");
                    FrameOutcome::Dropped(err)
                }
            }
        } else {
            FrameOutcome::EmptyTarget
        };

        if outcome == FrameOutcome::Dropped(DrawError::OutOfMemory) {
            error!("surface out of memory; detaching thread renderer");
            self.detach();
            return outcome;
        }

        // Nothing was presented, so vsync will not pace the next request.
        let retry = match &outcome {
            FrameOutcome::Drawn => None,
            FrameOutcome::EmptyTarget => Some(EMPTY_TARGET_INTERVAL),
            _ => Some(RETRY_FRAME_INTERVAL),
        };
        let next = match retry {
            None => mounted.host.request_frame(),
            Some(interval) => {
                let delay = mounted
                    .resize
                    .time_until_apply(now)
                    .map_or(interval, |left| left.min(interval));
                trace!(delay_ms = delay.as_millis() as u64, "deferring next frame");
                mounted.host.request_frame_after(delay)
            }
        };
        mounted.pending_frame = Some(next);
        outcome
    }

    /// The container changed size. Applied on a later frame once resizing settles.
    pub fn resize(&mut self, container: LogicalSize<f64>, now: Instant) {
        if !self.liveness.is_alive() {
            trace!("resize after teardown ignored");
            return;
        }
        if let Phase::Running(mounted) = &mut self.phase {
            mounted.container = container;
            let pixel_ratio = mounted.host.device_pixel_ratio();
            mounted.resize.observe(container, pixel_ratio, now);
        }
    }

    /// Pointer moved to `position`, relative to the container's top-left corner.
    pub fn pointer_moved(&mut self, position: LogicalPosition<f64>) {
        if !self.liveness.is_alive() {
            return;
        }
        if let Phase::Running(mounted) = &mut self.phase {
            mounted.pointer.move_to(position, mounted.container);
        }
    }

    pub fn pointer_left(&mut self) {
        if !self.liveness.is_alive() {
            return;
        }
        if let Phase::Running(mounted) = &mut self.phase {
            mounted.pointer.leave();
        }
    }

    /// Handle of the frame callback the host should fire next.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        match &self.phase {
            Phase::Running(mounted) => mounted.pending_frame,
            _ => None,
        }
    }

    /// Time left before a parked resize is applied.
    pub fn resize_deadline(&self, now: Instant) -> Option<Duration> {
        match &self.phase {
            Phase::Running(mounted) => mounted.resize.time_until_apply(now),
            _ => None,
        }
    }

    /// Uniforms of the most recent frame.
    pub fn render_state(&self) -> Option<&RenderState> {
        match &self.phase {
            Phase::Running(mounted) => Some(mounted.render_loop.state()),
            _ => None,
        }
    }

    pub fn host(&self) -> Option<&H> {
        match &self.phase {
            Phase::Running(mounted) => Some(&mounted.host),
            _ => None,
        }
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Unmounted)
    }
}

impl<H: Host> Drop for Threads<H> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use winit::dpi::PhysicalSize;

    use super::*;
    use crate::runtime::Resolution;

    #[derive(Default)]
    struct Journal {
        draws: Vec<RenderState>,
        surface_resizes: Vec<PhysicalSize<u32>>,
        created: Vec<PhysicalSize<u32>>,
        requested: Vec<FrameHandle>,
        deferred: Vec<(FrameHandle, Duration)>,
        cancelled: Vec<FrameHandle>,
        resize_observed: bool,
        pointer_listening: bool,
        pointer_toggles: u32,
        released: u32,
        detached: u32,
        fail_next_draw: Option<DrawError>,
    }

    struct RecordingSurface {
        journal: Rc<RefCell<Journal>>,
    }

    impl RenderSurface for RecordingSurface {
        fn resize(&mut self, size: PhysicalSize<u32>) {
            self.journal.borrow_mut().surface_resizes.push(size);
        }

        fn draw(&mut self, state: &RenderState) -> Result<(), DrawError> {
            let mut journal = self.journal.borrow_mut();
            if let Some(err) = journal.fail_next_draw.take() {
                return Err(err);
            }
            journal.draws.push(*state);
            Ok(())
        }

        fn release(self) {
            self.journal.borrow_mut().released += 1;
        }
    }

    struct RecordingHost {
        journal: Rc<RefCell<Journal>>,
        container: LogicalSize<f64>,
        pixel_ratio: f64,
        fail_with: Option<fn() -> AttachError>,
        next_frame: u64,
    }

    impl RecordingHost {
        fn new(width: f64, height: f64) -> (Self, Rc<RefCell<Journal>>) {
            let journal = Rc::new(RefCell::new(Journal::default()));
            let host = Self {
                journal: journal.clone(),
                container: LogicalSize::new(width, height),
                pixel_ratio: 1.0,
                fail_with: None,
                next_frame: 0,
            };
            (host, journal)
        }
    }

    impl Host for RecordingHost {
        type Surface = RecordingSurface;

        fn container_size(&self) -> LogicalSize<f64> {
            self.container
        }

        fn device_pixel_ratio(&self) -> f64 {
            self.pixel_ratio
        }

        fn create_surface(
            &mut self,
            size: PhysicalSize<u32>,
        ) -> Result<Self::Surface, AttachError> {
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            self.journal.borrow_mut().created.push(size);
            Ok(RecordingSurface {
                journal: self.journal.clone(),
            })
        }

        fn request_frame(&mut self) -> FrameHandle {
            self.next_frame += 1;
            let handle = FrameHandle(self.next_frame);
            self.journal.borrow_mut().requested.push(handle);
            handle
        }

        fn request_frame_after(&mut self, delay: Duration) -> FrameHandle {
            self.next_frame += 1;
            let handle = FrameHandle(self.next_frame);
            self.journal.borrow_mut().deferred.push((handle, delay));
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.journal.borrow_mut().cancelled.push(handle);
        }

        fn observe_resize(&mut self, active: bool) {
            self.journal.borrow_mut().resize_observed = active;
        }

        fn listen_pointer(&mut self, active: bool) {
            let mut journal = self.journal.borrow_mut();
            journal.pointer_listening = active;
            journal.pointer_toggles += 1;
        }

        fn detach_surface(&mut self) {
            self.journal.borrow_mut().detached += 1;
        }
    }

    fn run_frame(threads: &mut Threads<RecordingHost>, now: Instant) -> FrameOutcome {
        let handle = threads.pending_frame().expect("frame scheduled");
        threads.frame(handle, now)
    }

    #[test]
    fn five_frames_draw_five_times_with_rising_time() {
        let (host, journal) = RecordingHost::new(1024.0, 768.0);
        let mut threads = Threads::new(ThreadsOptions {
            amplitude: 3.5,
            distance_skew: 0.3,
            enable_pointer_interaction: true,
            ..ThreadsOptions::default()
        });
        threads.attach(host).expect("attach");

        let start = Instant::now();
        for ms in [0_u64, 16, 32, 48, 64] {
            let outcome = run_frame(&mut threads, start + Duration::from_millis(ms));
            assert_eq!(outcome, FrameOutcome::Drawn);
        }

        let journal = journal.borrow();
        assert_eq!(journal.draws.len(), 5);
        for pair in journal.draws.windows(2) {
            assert!(pair[1].time_seconds > pair[0].time_seconds);
        }
        let expected = Resolution::new(1024.0, 768.0);
        assert!(journal.draws.iter().all(|state| state.resolution == expected));
        assert!(journal
            .draws
            .iter()
            .all(|state| state.amplitude == 3.5 && state.distance_skew == 0.3));
        assert!(journal.pointer_listening);
        assert!(journal.resize_observed);
    }

    #[test]
    fn burst_resize_updates_resolution_once() {
        let (mut host, journal) = RecordingHost::new(800.0, 600.0);
        host.pixel_ratio = 1.25;
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");

        let start = Instant::now();
        run_frame(&mut threads, start);
        let sizes = [(1000.0, 750.0), (1200.0, 900.0), (1600.0, 1200.0)];
        for (step, (width, height)) in sizes.into_iter().enumerate() {
            let at = start + Duration::from_millis(5 + 16 * step as u64);
            threads.resize(LogicalSize::new(width, height), at);
            run_frame(&mut threads, at + Duration::from_millis(1));
        }
        for step in 0..12 {
            run_frame(&mut threads, start + Duration::from_millis(60 + 16 * step));
        }

        let journal = journal.borrow();
        assert_eq!(journal.surface_resizes, vec![PhysicalSize::new(2000, 1500)]);
        let resolutions: Vec<Resolution> = journal.draws.iter().map(|s| s.resolution).collect();
        let changes = resolutions
            .windows(2)
            .filter(|pair| pair[0] != pair[1])
            .count();
        assert_eq!(changes, 1);
        assert_eq!(resolutions[0], Resolution::new(1000.0, 750.0));
        let last = resolutions.last().copied().expect("frames drawn");
        assert_eq!(last.width, 1600.0 * 1.25);
        assert_eq!(last.height, 1200.0 * 1.25);
        assert!((last.aspect - 1600.0 / 1200.0).abs() < 1e-6);
    }

    #[test]
    fn pointer_disabled_keeps_mouse_centred() {
        let (host, journal) = RecordingHost::new(640.0, 480.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");

        let start = Instant::now();
        for frame in 0..10_u64 {
            threads.pointer_moved(LogicalPosition::new(frame as f64 * 60.0, 12.0));
            run_frame(&mut threads, start + Duration::from_millis(frame * 16));
        }

        let journal = journal.borrow();
        assert_eq!(journal.pointer_toggles, 0);
        assert!(journal.draws.iter().all(|state| state.mouse == [0.5, 0.5]));
    }

    #[test]
    fn pointer_enabled_eases_toward_the_cursor() {
        let (host, journal) = RecordingHost::new(640.0, 480.0);
        let mut threads = Threads::new(ThreadsOptions {
            enable_pointer_interaction: true,
            ..ThreadsOptions::default()
        });
        threads.attach(host).expect("attach");

        let start = Instant::now();
        threads.pointer_moved(LogicalPosition::new(640.0, 0.0));
        for frame in 0..20_u64 {
            run_frame(&mut threads, start + Duration::from_millis(frame * 16));
        }
        threads.pointer_left();
        run_frame(&mut threads, start + Duration::from_millis(400));

        let journal = journal.borrow();
        let first = journal.draws[0].mouse;
        let settled = journal.draws[19].mouse;
        assert!(first[0] > 0.5 && first[1] > 0.5);
        assert!(settled[0] > first[0] && settled[1] > first[1]);
        let after_leave = journal.draws[20].mouse;
        assert!(after_leave[0] < settled[0]);
    }

    #[test]
    fn detach_is_idempotent_and_releases_once() {
        let (host, journal) = RecordingHost::new(320.0, 240.0);
        let mut threads = Threads::new(ThreadsOptions {
            enable_pointer_interaction: true,
            ..ThreadsOptions::default()
        });
        threads.attach(host).expect("attach");
        let pending = threads.pending_frame().expect("first frame scheduled");

        threads.detach();
        threads.detach();

        let journal = journal.borrow();
        assert_eq!(journal.released, 1);
        assert_eq!(journal.detached, 1);
        assert_eq!(journal.cancelled, vec![pending]);
        assert!(!journal.resize_observed);
        assert!(!journal.pointer_listening);
        assert!(threads.is_terminated());
        assert!(!threads.liveness().is_alive());
    }

    #[test]
    fn detach_before_attach_is_a_no_op() {
        let (host, journal) = RecordingHost::new(320.0, 240.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.detach();
        assert!(!threads.is_terminated());
        threads.attach(host).expect("attach after early detach");
        assert!(threads.is_running());
        assert_eq!(journal.borrow().created.len(), 1);
    }

    #[test]
    fn callbacks_after_teardown_are_ignored() {
        let (host, journal) = RecordingHost::new(320.0, 240.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        let liveness = threads.liveness();
        let handle = threads.pending_frame().expect("frame scheduled");
        threads.detach();

        assert!(!liveness.is_alive());
        let now = Instant::now();
        assert_eq!(threads.frame(handle, now), FrameOutcome::Ignored);
        threads.resize(LogicalSize::new(1000.0, 1000.0), now);
        threads.pointer_moved(LogicalPosition::new(1.0, 1.0));

        let journal = journal.borrow();
        assert!(journal.draws.is_empty());
        assert!(journal.surface_resizes.is_empty());
    }

    #[test]
    fn stale_frame_handles_are_ignored() {
        let (host, journal) = RecordingHost::new(320.0, 240.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        let first = threads.pending_frame().expect("frame scheduled");
        let now = Instant::now();
        assert_eq!(threads.frame(first, now), FrameOutcome::Drawn);
        assert_eq!(threads.frame(first, now), FrameOutcome::Ignored);
        assert_eq!(journal.borrow().draws.len(), 1);
    }

    #[test]
    fn failed_attach_is_final() {
        let (mut host, journal) = RecordingHost::new(320.0, 240.0);
        host.fail_with = Some(|| AttachError::ShaderCompile {
            diagnostics: "syntax error".into(),
        });
        let mut threads = Threads::new(ThreadsOptions::default());
        let err = threads.attach(host).expect_err("shader failure");
        assert!(matches!(err, AttachError::ShaderCompile { .. }));
        assert!(threads.is_terminated());
        assert!(threads.pending_frame().is_none());
        assert!(journal.borrow().requested.is_empty());
        assert!(!journal.borrow().resize_observed);

        let (retry, _) = RecordingHost::new(320.0, 240.0);
        assert!(matches!(threads.attach(retry), Err(AttachError::NotFresh)));
    }

    #[test]
    fn context_failure_leaves_nothing_behind() {
        let (mut host, journal) = RecordingHost::new(320.0, 240.0);
        host.fail_with = Some(|| AttachError::context("no adapter"));
        let mut threads = Threads::new(ThreadsOptions::default());
        assert!(matches!(
            threads.attach(host),
            Err(AttachError::ContextAcquisition(_))
        ));
        threads.detach();
        assert_eq!(journal.borrow().released, 0);
        assert_eq!(journal.borrow().detached, 0);
    }

    #[test]
    fn second_attach_is_rejected() {
        let (host, _) = RecordingHost::new(320.0, 240.0);
        let (other, other_journal) = RecordingHost::new(320.0, 240.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        assert!(matches!(threads.attach(other), Err(AttachError::NotFresh)));
        assert!(other_journal.borrow().created.is_empty());
    }

    #[test]
    fn empty_container_skips_draws_but_keeps_running() {
        let (host, journal) = RecordingHost::new(0.0, 0.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        let now = Instant::now();
        assert_eq!(run_frame(&mut threads, now), FrameOutcome::EmptyTarget);
        assert!(threads.pending_frame().is_some());

        threads.resize(LogicalSize::new(200.0, 100.0), now);
        assert_eq!(
            run_frame(&mut threads, now + Duration::from_millis(150)),
            FrameOutcome::Drawn
        );
        let journal = journal.borrow();
        assert_eq!(journal.draws.len(), 1);
        assert_eq!(journal.draws[0].resolution, Resolution::new(200.0, 100.0));
    }

    #[test]
    fn empty_frames_are_paced_instead_of_redrawn_immediately() {
        let (host, journal) = RecordingHost::new(0.0, 0.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        let now = Instant::now();
        for _ in 0..1000 {
            assert_eq!(run_frame(&mut threads, now), FrameOutcome::EmptyTarget);
        }

        let journal = journal.borrow();
        // Only the frame scheduled by attach asked for an immediate redraw.
        assert_eq!(journal.requested.len(), 1);
        assert_eq!(journal.deferred.len(), 1000);
        assert!(journal
            .deferred
            .iter()
            .all(|&(_, delay)| delay == EMPTY_TARGET_INTERVAL));
        assert_eq!(
            threads.pending_frame(),
            journal.deferred.last().map(|&(handle, _)| handle)
        );
    }

    #[test]
    fn empty_frame_waits_for_a_parked_resize() {
        let (host, journal) = RecordingHost::new(0.0, 0.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        let start = Instant::now();
        threads.resize(LogicalSize::new(200.0, 100.0), start);

        let at = start + Duration::from_millis(40);
        assert_eq!(run_frame(&mut threads, at), FrameOutcome::EmptyTarget);
        let remaining = threads.resize_deadline(at).expect("resize parked");
        assert_eq!(remaining, Duration::from_millis(60));
        assert_eq!(
            journal.borrow().deferred.last().map(|&(_, delay)| delay),
            Some(remaining)
        );

        assert_eq!(
            run_frame(&mut threads, at + remaining),
            FrameOutcome::Drawn
        );
        assert!(threads.resize_deadline(at + remaining).is_none());
        let state = threads.render_state().expect("running");
        assert_eq!(state.resolution, Resolution::new(200.0, 100.0));
        assert_eq!(journal.borrow().requested.len(), 2);
    }

    #[test]
    fn dropped_frames_retry_after_a_frame_interval() {
        let (host, journal) = RecordingHost::new(300.0, 200.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        let now = Instant::now();
        for err in [DrawError::Timeout, DrawError::Lost, DrawError::Other("busy".into())] {
            journal.borrow_mut().fail_next_draw = Some(err.clone());
            assert_eq!(run_frame(&mut threads, now), FrameOutcome::Dropped(err));
        }

        let journal = journal.borrow();
        assert_eq!(journal.requested.len(), 1);
        assert_eq!(
            journal.deferred.iter().map(|&(_, delay)| delay).collect::<Vec<_>>(),
            vec![RETRY_FRAME_INTERVAL; 3]
        );
    }

    #[test]
    fn drawn_frames_request_the_next_refresh() {
        let (host, journal) = RecordingHost::new(300.0, 200.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        let start = Instant::now();
        for ms in [0_u64, 16, 33] {
            run_frame(&mut threads, start + Duration::from_millis(ms));
        }
        let journal = journal.borrow();
        assert_eq!(journal.requested.len(), 4);
        assert!(journal.deferred.is_empty());
        let state = threads.render_state().expect("running");
        assert!((state.time_seconds - 0.033).abs() < 1e-4);
    }

    #[test]
    fn lost_surface_is_reconfigured() {
        let (host, journal) = RecordingHost::new(300.0, 200.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        journal.borrow_mut().fail_next_draw = Some(DrawError::Lost);
        let now = Instant::now();
        assert_eq!(
            run_frame(&mut threads, now),
            FrameOutcome::Dropped(DrawError::Lost)
        );
        assert_eq!(
            journal.borrow().surface_resizes,
            vec![PhysicalSize::new(300, 200)]
        );
        assert_eq!(
            run_frame(&mut threads, now + Duration::from_millis(16)),
            FrameOutcome::Drawn
        );
    }

    #[test]
    fn out_of_memory_detaches() {
        let (host, journal) = RecordingHost::new(300.0, 200.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        journal.borrow_mut().fail_next_draw = Some(DrawError::OutOfMemory);
        run_frame(&mut threads, Instant::now());
        assert!(threads.is_terminated());
        assert_eq!(journal.borrow().released, 1);
    }

    #[test]
    fn dropping_a_running_instance_detaches_it() {
        let (host, journal) = RecordingHost::new(300.0, 200.0);
        let mut threads = Threads::new(ThreadsOptions::default());
        threads.attach(host).expect("attach");
        drop(threads);
        assert_eq!(journal.borrow().released, 1);
        assert_eq!(journal.borrow().detached, 1);
    }
}
