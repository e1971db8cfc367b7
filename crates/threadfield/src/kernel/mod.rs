//! Pure per-pixel math for the thread field.
//!
//! Everything in here is a plain function of its arguments: no GPU handles, no
//! clocks, no host state. The GLSL kernel in [`crate::compile`] mirrors these
//! functions line for line, so the properties checked by the unit tests below
//! (continuity, palette wrap, right-edge fade) hold for both.
//!
//! - `noise` is the cell-hash gradient noise.
//! - `line` evaluates one thread's coverage at one pixel.
//! - `palette` maps a cycle position onto the five-stop palette.
//! - `compositor` sums every thread into a pixel and renders whole frames on
//!   the CPU.

pub mod compositor;
pub mod line;
pub mod noise;
pub mod palette;

pub use compositor::{composite, CpuFrame, MAX_CPU_PIXELS};
pub use line::{coverage, line_width, pixel_size, LineInputs};
pub use noise::noise;
pub use palette::{color, cycle_position, PALETTE};

/// Number of threads drawn when the caller does not pick one.
pub const DEFAULT_LINE_COUNT: u32 = 40;
/// Upper bound accepted for the line count; matches the shader loop guard.
pub const MAX_LINE_COUNT: u32 = 128;
/// Stroke width of the first thread, in pixels.
pub const LINE_WIDTH: f32 = 7.0;
/// Blur added to each thread's edges once it has faded in, in pixels.
pub const LINE_BLUR: f32 = 10.0;

/// Hermite interpolation with GLSL semantics.
///
/// Reversed edges (`edge0 > edge1`) are handled the same way GPUs do, and a
/// zero-width span degenerates into a step instead of dividing by zero.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Quintic fade `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn smootherstep(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
pub(crate) fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// GLSL `fract`: always in `[0, 1)` for finite input, including negatives.
#[inline]
pub(crate) fn fract(x: f32) -> f32 {
    let f = x - x.floor();
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_matches_glsl_endpoints() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn reversed_smoothstep_mirrors_forward_one() {
        for step in 0..=20 {
            let x = step as f32 / 20.0;
            let reversed = smoothstep(1.0, 0.0, x);
            let forward = 1.0 - smoothstep(0.0, 1.0, x);
            assert!((reversed - forward).abs() < 1e-6, "x = {x}");
        }
    }

    #[test]
    fn zero_width_smoothstep_is_a_step() {
        assert_eq!(smoothstep(0.3, 0.3, 0.2), 0.0);
        assert_eq!(smoothstep(0.3, 0.3, 0.3), 1.0);
    }

    #[test]
    fn fract_wraps_negative_values() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert_eq!(fract(3.0), 0.0);
        assert!(fract(-1e-9) < 1.0);
    }
}
