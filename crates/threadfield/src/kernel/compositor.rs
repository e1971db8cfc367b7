//! Sums every thread into a pixel, and a CPU reference renderer built on it.
//!
//! The GPU runs [`composite`] once per fragment. [`CpuFrame`] loops the same
//! function over every pixel, which costs `width * height * line_count`
//! coverage evaluations per frame, so it enforces a pixel budget.

use tracing::warn;

use super::line::{coverage, line_width, pixel_size, LineInputs};
use super::palette::{color, cycle_position};
use crate::runtime::RenderState;

/// Largest frame the CPU renderer evaluates at full size (a 1080p frame).
pub const MAX_CPU_PIXELS: u64 = 1920 * 1080;

/// Premultiplied RGBA for the pixel at `frag_coord` (bottom-left origin, pixel units).
pub fn composite(frag_coord: [f32; 2], state: &RenderState) -> [f32; 4] {
    let resolution = state.resolution;
    if !resolution.is_drawable() {
        return [0.0; 4];
    }
    let st = [
        frag_coord[0] / resolution.width,
        frag_coord[1] / resolution.height,
    ];
    let pixel = pixel_size(resolution.width, resolution.height);
    let inputs = LineInputs {
        mouse: state.mouse,
        time: state.time_seconds,
        amplitude: state.amplitude,
        distance_skew: state.distance_skew,
        pixel_size: pixel,
    };

    let count = state.line_count.max(1);
    let mut alpha = 0.0_f32;
    let mut rgb = [0.0_f32; 3];
    for line in 0..count {
        let p = line as f32 / count as f32;
        let value = coverage(st, line_width(p, pixel), p, &inputs);
        if value <= 0.0 {
            continue;
        }
        let tint = color(cycle_position(st[0], state.time_seconds, p));
        alpha += value;
        for (channel, component) in rgb.iter_mut().zip(tint) {
            *channel += component * value;
        }
    }

    [
        rgb[0].clamp(0.0, 1.0),
        rgb[1].clamp(0.0, 1.0),
        rgb[2].clamp(0.0, 1.0),
        alpha.clamp(0.0, 1.0),
    ]
}

/// RGBA8 frame rendered on the CPU, stored top row first.
#[derive(Debug, Clone)]
pub struct CpuFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CpuFrame {
    /// Allocates a frame of at most [`MAX_CPU_PIXELS`] pixels.
    ///
    /// Larger requests are scaled down uniformly so the aspect ratio survives.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = fit_budget(width.max(1), height.max(1), MAX_CPU_PIXELS);
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Evaluates the kernel for every pixel. The state's resolution is ignored in
    /// favour of the frame's own size so a downscaled frame still shows the full field.
    pub fn render(&mut self, state: &RenderState) {
        let mut local = *state;
        local.resolution = crate::runtime::Resolution::new(self.width as f32, self.height as f32);
        let row_bytes = self.width as usize * 4;
        for (row, line) in self.pixels.chunks_exact_mut(row_bytes).enumerate() {
            // Storage is top-down, the kernel is bottom-up.
            let frag_y = (self.height as usize - 1 - row) as f32 + 0.5;
            for (column, texel) in line.chunks_exact_mut(4).enumerate() {
                let rgba = composite([column as f32 + 0.5, frag_y], &local);
                for (byte, value) in texel.iter_mut().zip(rgba) {
                    *byte = (value * 255.0).round() as u8;
                }
            }
        }
    }

    /// Premultiplied RGBA of the pixel at `(x, y)` (top-left origin).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut texel = [0; 4];
        texel.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(texel)
    }
}

fn fit_budget(width: u32, height: u32, budget: u64) -> (u32, u32) {
    let area = u64::from(width) * u64::from(height);
    if area <= budget {
        return (width, height);
    }
    let scale = (budget as f64 / area as f64).sqrt();
    let scaled = (
        ((f64::from(width) * scale).floor() as u32).max(1),
        ((f64::from(height) * scale).floor() as u32).max(1),
    );
    warn!(
        requested_width = width,
        requested_height = height,
        width = scaled.0,
        height = scaled.1,
        "CPU frame exceeds pixel budget; rendering at reduced size"
    );
    scaled
}
