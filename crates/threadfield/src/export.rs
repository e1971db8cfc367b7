//! Still frames rendered on the CPU and written as PNG.

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;
use tracing::info;
use winit::dpi::PhysicalSize;

use crate::kernel::CpuFrame;
use crate::resize::resolution_for;
use crate::runtime::RenderState;
use crate::types::ThreadsOptions;

/// Renders the field at `time_seconds` with the pointer at `mouse`.
///
/// The result uses straight alpha. Frames above the CPU pixel budget come
/// back smaller, with the same aspect ratio.
pub fn render_still(
    options: &ThreadsOptions,
    size: PhysicalSize<u32>,
    time_seconds: f32,
    mouse: [f32; 2],
) -> RgbaImage {
    let mut state = RenderState::new(
        options.amplitude,
        options.distance_skew,
        options.clamped_line_count(),
    );
    state.time_seconds = time_seconds;
    state.mouse = mouse;
    state.resolution = resolution_for(size);

    let mut frame = CpuFrame::new(size.width, size.height);
    frame.render(&state);

    let mut image = RgbaImage::new(frame.width(), frame.height());
    image.copy_from_slice(frame.pixels());
    for pixel in image.pixels_mut() {
        unpremultiply(&mut pixel.0);
    }
    image
}

/// Renders a still and saves it as PNG at `path`.
pub fn export_png(
    path: &Path,
    options: &ThreadsOptions,
    size: PhysicalSize<u32>,
    time_seconds: f32,
    mouse: [f32; 2],
) -> Result<()> {
    let image = render_still(options, size, time_seconds, mouse);
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write still frame to {}", path.display()))?;
    info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        time = time_seconds,
        "still frame exported"
    );
    Ok(())
}

fn unpremultiply(texel: &mut [u8; 4]) {
    let alpha = texel[3];
    if alpha == 0 {
        *texel = [0; 4];
        return;
    }
    for channel in &mut texel[..3] {
        let straight = u32::from(*channel) * 255 / u32::from(alpha);
        *channel = straight.min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ThreadsOptions {
        ThreadsOptions {
            amplitude: 2.0,
            distance_skew: 0.3,
            line_count: 12,
            ..ThreadsOptions::default()
        }
    }

    #[test]
    fn still_has_requested_size() {
        let image = render_still(&options(), PhysicalSize::new(96, 64), 1.5, [0.5, 0.5]);
        assert_eq!(image.dimensions(), (96, 64));
    }

    #[test]
    fn still_draws_something_and_fades_out_on_the_right() {
        let image = render_still(&options(), PhysicalSize::new(160, 90), 0.0, [0.5, 0.5]);
        assert!(image.pixels().any(|pixel| pixel.0[3] > 0));
        for y in 0..image.height() {
            assert_eq!(image.get_pixel(image.width() - 1, y).0[3], 0);
        }
    }

    #[test]
    fn unpremultiply_restores_straight_colour() {
        let mut texel = [64, 32, 0, 128];
        unpremultiply(&mut texel);
        assert_eq!(texel, [127, 63, 0, 128]);

        let mut clear = [3, 3, 3, 0];
        unpremultiply(&mut clear);
        assert_eq!(clear, [0; 4]);
    }

    #[test]
    fn png_lands_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("still.png");
        export_png(&path, &options(), PhysicalSize::new(48, 32), 2.0, [0.5, 0.5])
            .expect("export");
        let decoded = image::open(&path).expect("decode png");
        assert_eq!((decoded.width(), decoded.height()), (48, 32));
    }
}
