use winit::dpi::{LogicalPosition, LogicalSize};

/// Fraction of the remaining distance covered on each frame.
pub const POINTER_SMOOTHING: f32 = 0.05;
/// Where the pointer rests when interaction is off or the pointer leaves.
pub const POINTER_REST: [f32; 2] = [0.5, 0.5];

/// Exponentially smoothed pointer feeding the mouse uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSmoother {
    enabled: bool,
    current: [f32; 2],
    target: [f32; 2],
}

impl PointerSmoother {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            current: POINTER_REST,
            target: POINTER_REST,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Points the target at `position`, relative to a container of `container` size.
    ///
    /// The result is normalised into `[0, 1]^2` and flipped so `y = 0` is the
    /// bottom edge, matching the kernel's coordinate system.
    pub fn move_to(&mut self, position: LogicalPosition<f64>, container: LogicalSize<f64>) {
        if !self.enabled || container.width <= 0.0 || container.height <= 0.0 {
            return;
        }
        let x = (position.x / container.width).clamp(0.0, 1.0) as f32;
        let y = (1.0 - position.y / container.height).clamp(0.0, 1.0) as f32;
        if x.is_finite() && y.is_finite() {
            self.target = [x, y];
        }
    }

    /// The pointer left the container; drift back to the centre.
    pub fn leave(&mut self) {
        self.target = POINTER_REST;
    }

    /// Advances one frame and returns the value for the mouse uniform.
    pub fn step(&mut self) -> [f32; 2] {
        if !self.enabled {
            self.current = POINTER_REST;
            return self.current;
        }
        for axis in 0..2 {
            self.current[axis] += POINTER_SMOOTHING * (self.target[axis] - self.current[axis]);
        }
        self.current
    }

    pub fn current(&self) -> [f32; 2] {
        self.current
    }

    pub fn target(&self) -> [f32; 2] {
        self.target
    }
}
