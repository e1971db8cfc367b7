//! Five-stop colour cycle.

use super::fract;

/// Palette stops in linear RGB, visited in order and wrapping back to the first.
pub const PALETTE: [[f32; 3]; 5] = [
    [0.486, 0.227, 0.929],
    [0.231, 0.510, 0.965],
    [0.024, 0.714, 0.831],
    [0.063, 0.725, 0.506],
    [0.925, 0.282, 0.600],
];

/// How fast the whole field drifts through the palette, in cycles per second.
pub const CYCLE_DRIFT: f32 = 0.05;
/// Palette offset between the first and last thread.
pub const CYCLE_LINE_SPREAD: f32 = 0.2;

/// Colour at cycle position `t`. Any finite `t` is wrapped into `[0, 1)`.
pub fn color(t: f32) -> [f32; 3] {
    let segments = PALETTE.len();
    let scaled = fract(t) * segments as f32;
    let index = (scaled.floor() as usize).min(segments - 1);
    let blend = scaled - index as f32;
    let from = PALETTE[index];
    let to = PALETTE[(index + 1) % segments];
    [
        from[0] + (to[0] - from[0]) * blend,
        from[1] + (to[1] - from[1]) * blend,
        from[2] + (to[2] - from[2]) * blend,
    ]
}

/// Cycle position for the thread at fraction `p`, seen at horizontal position `x`.
pub fn cycle_position(x: f32, time: f32, p: f32) -> f32 {
    fract(x + time * CYCLE_DRIFT + p * CYCLE_LINE_SPREAD)
}
