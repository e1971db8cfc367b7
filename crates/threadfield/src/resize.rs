//! Debounced container resize handling.
//!
//! Drag-resizing a window emits a burst of size changes. Reconfiguring the
//! swapchain for each one is wasted work, so sizes are parked here and only
//! the last one is applied once the container has been quiet for the debounce
//! window.

use std::time::{Duration, Instant};

use winit::dpi::{LogicalSize, PhysicalSize};

use crate::runtime::Resolution;

/// Default quiet period before a pending resize is applied.
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);
/// Default cap on the device pixel ratio used for the backing store.
pub const DEFAULT_MAX_PIXEL_RATIO: f64 = 1.5;

/// Backing store size for a container, with the pixel ratio capped at `max_pixel_ratio`.
pub fn backing_size(
    container: LogicalSize<f64>,
    pixel_ratio: f64,
    max_pixel_ratio: f64,
) -> PhysicalSize<u32> {
    let ratio = effective_pixel_ratio(pixel_ratio, max_pixel_ratio);
    let scale = |value: f64| {
        if value.is_finite() && value > 0.0 {
            (value * ratio).round().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    };
    PhysicalSize::new(scale(container.width), scale(container.height))
}

fn effective_pixel_ratio(pixel_ratio: f64, max_pixel_ratio: f64) -> f64 {
    let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
        pixel_ratio
    } else {
        1.0
    };
    ratio.min(max_pixel_ratio)
}

/// Resolution uniform for a backing store.
pub fn resolution_for(size: PhysicalSize<u32>) -> Resolution {
    Resolution::new(size.width as f32, size.height as f32)
}

/// A resize that survived the debounce window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedResize {
    pub size: PhysicalSize<u32>,
    pub resolution: Resolution,
    /// Time between the last observed event and the moment it was applied.
    pub settled_after: Duration,
}

#[derive(Debug, Clone, Copy)]
struct PendingResize {
    size: PhysicalSize<u32>,
    observed_at: Instant,
}

#[derive(Debug)]
pub struct ResizeCoordinator {
    debounce: Duration,
    max_pixel_ratio: f64,
    pending: Option<PendingResize>,
    applied: PhysicalSize<u32>,
}

impl ResizeCoordinator {
    pub fn new(debounce: Duration, max_pixel_ratio: f64, initial: PhysicalSize<u32>) -> Self {
        Self {
            debounce,
            max_pixel_ratio,
            pending: None,
            applied: initial,
        }
    }

    pub fn applied(&self) -> PhysicalSize<u32> {
        self.applied
    }

    pub fn backing_size(&self, container: LogicalSize<f64>, pixel_ratio: f64) -> PhysicalSize<u32> {
        backing_size(container, pixel_ratio, self.max_pixel_ratio)
    }

    /// Records a container size change. Later calls replace earlier pending ones.
    pub fn observe(&mut self, container: LogicalSize<f64>, pixel_ratio: f64, now: Instant) {
        let size = self.backing_size(container, pixel_ratio);
        if self.pending.is_none() && size == self.applied {
            return;
        }
        self.pending = Some(PendingResize {
            size,
            observed_at: now,
        });
    }

    /// Applies the pending size once the container has been quiet long enough.
    pub fn tick(&mut self, now: Instant) -> Option<AppliedResize> {
        let pending = self.pending?;
        let elapsed = now.saturating_duration_since(pending.observed_at);
        if elapsed < self.debounce {
            return None;
        }
        self.pending = None;
        if pending.size == self.applied {
            // Resized away and back again inside the window.
            return None;
        }
        self.applied = pending.size;
        Some(AppliedResize {
            size: pending.size,
            resolution: resolution_for(pending.size),
            settled_after: elapsed,
        })
    }

    /// How long until the pending resize is applied, if one is pending.
    pub fn time_until_apply(&self, now: Instant) -> Option<Duration> {
        let pending = self.pending?;
        let elapsed = now.saturating_duration_since(pending.observed_at);
        Some(self.debounce.saturating_sub(elapsed))
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
