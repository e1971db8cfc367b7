use std::time::Duration;

use crate::kernel::{DEFAULT_LINE_COUNT, MAX_LINE_COUNT};
use crate::resize::{DEFAULT_MAX_PIXEL_RATIO, DEFAULT_RESIZE_DEBOUNCE};

/// Construction-time parameters for a renderer instance.
///
/// None of these can change while an instance is mounted; build a new
/// [`crate::Threads`] to pick up different values.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadsOptions {
    /// Vertical wander of the threads; `0` draws straight lines.
    pub amplitude: f32,
    /// How far apart the threads fan out vertically.
    pub distance_skew: f32,
    /// Let the pointer bend the field.
    pub enable_pointer_interaction: bool,
    /// Number of threads; clamped to `1..=MAX_LINE_COUNT`.
    pub line_count: u32,
    /// Device pixel ratio ceiling for the backing store.
    pub max_pixel_ratio: f64,
    /// Quiet period before a container resize reaches the GPU.
    pub resize_debounce: Duration,
}

impl ThreadsOptions {
    pub(crate) fn clamped_line_count(&self) -> u32 {
        self.line_count.clamp(1, MAX_LINE_COUNT)
    }
}

impl Default for ThreadsOptions {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            distance_skew: 0.0,
            enable_pointer_interaction: false,
            line_count: DEFAULT_LINE_COUNT,
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
            resize_debounce: DEFAULT_RESIZE_DEBOUNCE,
        }
    }
}

/// GPU adapter preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    /// Prefer integrated GPUs; a background effect rarely needs more.
    #[default]
    Low,
    High,
}

/// Settings for the desktop window host.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    /// Inner size in logical pixels.
    pub size: (u32, u32),
    pub title: String,
    pub power: GpuPowerPreference,
    pub threads: ThreadsOptions,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: (1280, 720),
            title: "threadpaper".into(),
            power: GpuPowerPreference::default(),
            threads: ThreadsOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_contract() {
        let options = ThreadsOptions::default();
        assert_eq!(options.amplitude, 1.0);
        assert_eq!(options.distance_skew, 0.0);
        assert!(!options.enable_pointer_interaction);
        assert_eq!(options.line_count, 40);
        assert_eq!(options.resize_debounce, Duration::from_millis(100));
    }

    #[test]
    fn line_count_is_clamped() {
        let options = ThreadsOptions {
            line_count: 0,
            ..ThreadsOptions::default()
        };
        assert_eq!(options.clamped_line_count(), 1);
        let options = ThreadsOptions {
            line_count: 10_000,
            ..ThreadsOptions::default()
        };
        assert_eq!(options.clamped_line_count(), MAX_LINE_COUNT);
    }
}
