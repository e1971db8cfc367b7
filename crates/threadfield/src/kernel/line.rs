//! Coverage of a single thread at a single pixel.

use super::{mix, noise, smoothstep, LINE_BLUR, LINE_WIDTH};

/// Uniform-derived inputs shared by every thread at one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineInputs {
    /// Smoothed pointer position in `[0, 1]^2`, bottom-left origin.
    pub mouse: [f32; 2],
    /// Animation time in seconds.
    pub time: f32,
    pub amplitude: f32,
    pub distance_skew: f32,
    /// Size of one pixel in normalised units, see [`pixel_size`].
    pub pixel_size: f32,
}

/// One pixel expressed in normalised units of the larger surface dimension.
pub fn pixel_size(width: f32, height: f32) -> f32 {
    1.0 / width.max(height).max(1.0)
}

/// Stroke width for the thread at fraction `p` of the stack; later threads are thinner.
pub fn line_width(p: f32, pixel_size: f32) -> f32 {
    (LINE_WIDTH * pixel_size * (1.0 - p)).max(0.0)
}

/// Coverage in `[0, 1]` of the thread at fraction `p` for the pixel at `st`.
///
/// `st` is the pixel position normalised to `[0, 1]^2` with a bottom-left
/// origin. The thread enters from the left as a flat band, starts to wander
/// once `x` passes its split point, and fades out completely at the right edge.
pub fn coverage(st: [f32; 2], stroke_width: f32, p: f32, inputs: &LineInputs) -> f32 {
    let blur = blur_width(st[0], p, inputs.pixel_size);
    coverage_with_blur(st, stroke_width, p, inputs, blur)
}

pub(crate) fn blur_width(x: f32, p: f32, pixel_size: f32) -> f32 {
    let split_point = split_point(p);
    (LINE_BLUR * pixel_size * smoothstep(split_point, split_point + 0.05, x) * p).max(0.0)
}

fn split_point(p: f32) -> f32 {
    0.1 + p * 0.4
}

pub(crate) fn coverage_with_blur(
    st: [f32; 2],
    stroke_width: f32,
    p: f32,
    inputs: &LineInputs,
    blur: f32,
) -> f32 {
    let [x, y_pixel] = st;
    let split_point = split_point(p);

    let amplitude = smoothstep(split_point, 0.7, x)
        * 0.5
        * inputs.amplitude
        * (1.0 + (inputs.mouse[1] - 0.5) * 0.2);

    let time_scaled = inputs.time / 10.0 + (inputs.mouse[0] - 0.5);
    let wander = mix(
        noise([time_scaled * 2.5, (x + p) * 2.5]),
        noise([time_scaled * 3.5, (x + time_scaled) * 3.5]) / 1.5,
        x * 0.3,
    );

    let centre = 0.5 + (p - 0.5) * inputs.distance_skew + wander * 0.5 * amplitude;
    let reach = (stroke_width.max(0.0) * 0.5 + blur.max(0.0)).max(f32::EPSILON);

    let upper = 1.0 - smoothstep(centre, centre + reach, y_pixel);
    let lower = 1.0 - smoothstep(centre - reach, centre, y_pixel);
    let taper = 1.0 - smoothstep(0.0, 1.0, x.clamp(0.0, 1.0).powf(0.3));

    ((upper - lower) * taper).clamp(0.0, 1.0)
}
