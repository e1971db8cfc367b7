use std::time::{Duration, Instant};

use tracing::debug;

use crate::kernel::DEFAULT_LINE_COUNT;

/// Size of the render target as seen by the kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub width: f32,
    pub height: f32,
    /// `width / height`, or zero while the target is empty.
    pub aspect: f32,
}

impl Resolution {
    pub fn new(width: f32, height: f32) -> Self {
        let aspect = if height > 0.0 { width / height } else { 0.0 };
        Self {
            width,
            height,
            aspect,
        }
    }

    /// A zero-area target is never drawn.
    pub fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Every uniform the kernel reads for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub time_seconds: f32,
    pub resolution: Resolution,
    pub amplitude: f32,
    pub distance_skew: f32,
    /// Smoothed pointer in `[0, 1]^2`, bottom-left origin.
    pub mouse: [f32; 2],
    pub line_count: u32,
}

impl RenderState {
    pub fn new(amplitude: f32, distance_skew: f32, line_count: u32) -> Self {
        Self {
            time_seconds: 0.0,
            resolution: Resolution::default(),
            amplitude,
            distance_skew,
            mouse: [0.5, 0.5],
            line_count,
        }
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(1.0, 0.0, DEFAULT_LINE_COUNT)
    }
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Seconds since the first frame.
    pub seconds: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    pub frame_index: u64,
}

/// Monotonic animation clock. The origin is the first sampled instant, so a
/// paused or backgrounded loop picks up at wall-clock time instead of replaying
/// the frames it missed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    origin: Option<Instant>,
    last: Option<Instant>,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, now: Instant) -> TimeSample {
        let origin = *self.origin.get_or_insert(now);
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        let sample = TimeSample {
            seconds: now.saturating_duration_since(origin).as_secs_f32(),
            delta: delta.as_secs_f32(),
            frame_index: self.frame,
        };
        self.frame = self.frame.saturating_add(1);
        sample
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }
}

/// Owns the per-frame uniform state and advances it once per display frame.
#[derive(Debug)]
pub struct RenderLoop {
    state: RenderState,
    clock: FrameClock,
    last_stats: Option<Instant>,
    frames_since_stats: u32,
}

impl RenderLoop {
    pub fn new(state: RenderState) -> Self {
        Self {
            state,
            clock: FrameClock::new(),
            last_stats: None,
            frames_since_stats: 0,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.state.resolution = resolution;
    }

    /// Stamps the frame's time and pointer; returns the state to upload.
    pub fn advance(&mut self, now: Instant, mouse: [f32; 2]) -> &RenderState {
        let sample = self.clock.sample(now);
        self.state.time_seconds = sample.seconds;
        self.state.mouse = mouse;
        self.record_stats(now);
        &self.state
    }

    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }

    fn record_stats(&mut self, now: Instant) {
        self.frames_since_stats += 1;
        let last = *self.last_stats.get_or_insert(now);
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_stats as f32 / elapsed.as_secs_f32();
            self.frames_since_stats = 0;
            self.last_stats = Some(now);
            debug!(
                fps = fps.round(),
                frame_count = self.clock.frames(),
                time = self.state.time_seconds,
                width = self.state.resolution.width,
                height = self.state.resolution.height,
                "render stats"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_zero_and_follows_wall_time() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        let first = clock.sample(start);
        assert_eq!(first.seconds, 0.0);
        assert_eq!(first.frame_index, 0);

        let later = clock.sample(start + Duration::from_millis(250));
        assert!((later.seconds - 0.25).abs() < 1e-4);
        assert!((later.delta - 0.25).abs() < 1e-4);
        assert_eq!(later.frame_index, 1);
    }

    #[test]
    fn clock_skips_ahead_after_a_pause() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.sample(start);
        clock.sample(start + Duration::from_millis(16));
        // Loop paused for ten seconds; the next frame lands at wall-clock time.
        let resumed = clock.sample(start + Duration::from_secs(10));
        assert!((resumed.seconds - 10.0).abs() < 1e-3);
        assert_eq!(resumed.frame_index, 2);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.sample(start + Duration::from_millis(50));
        let earlier = clock.sample(start);
        assert_eq!(earlier.seconds, 0.0);
        assert_eq!(earlier.delta, 0.0);
    }

    #[test]
    fn render_loop_keeps_static_uniforms() {
        let mut render_loop = RenderLoop::new(RenderState::new(3.5, 0.3, 12));
        render_loop.set_resolution(Resolution::new(640.0, 480.0));
        let start = Instant::now();
        let state = *render_loop.advance(start + Duration::from_millis(40), [0.2, 0.7]);
        assert_eq!(state.amplitude, 3.5);
        assert_eq!(state.distance_skew, 0.3);
        assert_eq!(state.line_count, 12);
        assert_eq!(state.mouse, [0.2, 0.7]);
        assert!((state.resolution.aspect - 640.0 / 480.0).abs() < 1e-6);
        assert_eq!(render_loop.frames(), 1);
    }

    #[test]
    fn empty_resolution_is_not_drawable() {
        assert!(!Resolution::new(0.0, 480.0).is_drawable());
        assert!(!Resolution::new(640.0, 0.0).is_drawable());
        assert_eq!(Resolution::new(640.0, 0.0).aspect, 0.0);
        assert!(Resolution::new(1.0, 1.0).is_drawable());
    }
}
