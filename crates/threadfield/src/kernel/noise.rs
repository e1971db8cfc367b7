//! Cell-hash 2D gradient noise.
//!
//! The hash is a small polynomial over the lattice coordinates instead of a
//! permutation table, so every sample is independent and the same code runs
//! per fragment on the GPU. The constants come from a public-domain gradient
//! noise formulation and define the look of the threads; they are kept as-is.

use super::{fract, smootherstep};

/// Lattice coordinates are folded into `[0, 71)` before hashing so the squared
/// products stay within f32's usable range.
pub const HASH_FOLD: f32 = 71.0;
/// Offset added to the folded lattice coordinates.
pub const HASH_OFFSET: [f32; 2] = [26.0, 161.0];
/// Divisor producing the x component of each corner gradient.
pub const HASH_DIVISOR_X: f32 = 951.135664;
/// Divisor producing the y component of each corner gradient.
pub const HASH_DIVISOR_Y: f32 = 642.949883;
/// Bias that recentres the hashed values around zero.
pub const GRADIENT_BIAS: f32 = 0.49999;

const OUTPUT_SCALE: f32 = std::f32::consts::SQRT_2;

/// Samples the noise field at `p`. Output lies in `[-1, 1]`.
pub fn noise(p: [f32; 2]) -> f32 {
    let cell = [p[0].floor(), p[1].floor()];
    // Offsets from the four corners, laid out like the shader's `Pf_Pfmin1`.
    let fx = p[0] - cell[0];
    let fy = p[1] - cell[1];
    let fx1 = p[0] - (cell[0] + 1.0);
    let fy1 = p[1] - (cell[1] + 1.0);

    let mut lattice = [cell[0], cell[1], cell[0] + 1.0, cell[1] + 1.0];
    for (index, value) in lattice.iter_mut().enumerate() {
        *value -= (*value * (1.0 / HASH_FOLD)).floor() * HASH_FOLD;
        *value += HASH_OFFSET[index % 2];
        *value *= *value;
    }
    let [x0, y0, x1, y1] = lattice;
    // Corner order: (0,0), (1,0), (0,1), (1,1).
    let hashed = [x0 * y0, x1 * y0, x0 * y1, x1 * y1];
    let offset_x = [fx, fx1, fx, fx1];
    let offset_y = [fy, fy, fy1, fy1];

    let mut gradients = [0.0_f32; 4];
    for corner in 0..4 {
        let grad_x = fract(hashed[corner] * (1.0 / HASH_DIVISOR_X)) - GRADIENT_BIAS;
        let grad_y = fract(hashed[corner] * (1.0 / HASH_DIVISOR_Y)) - GRADIENT_BIAS;
        let length_sq = (grad_x * grad_x + grad_y * grad_y).max(f32::MIN_POSITIVE);
        gradients[corner] = (grad_x * offset_x[corner] + grad_y * offset_y[corner])
            / length_sq.sqrt()
            * OUTPUT_SCALE;
    }

    let blend_x = smootherstep(fx);
    let blend_y = smootherstep(fy);
    let weights = [
        (1.0 - blend_x) * (1.0 - blend_y),
        blend_x * (1.0 - blend_y),
        (1.0 - blend_x) * blend_y,
        blend_x * blend_y,
    ];

    gradients
        .iter()
        .zip(weights.iter())
        .map(|(gradient, weight)| gradient * weight)
        .sum()
}
