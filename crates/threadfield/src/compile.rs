//! GLSL sources for the thread field and their compilation.
//!
//! The fragment stage is the GPU twin of [`crate::kernel::composite`]. Its
//! numeric constants are spliced in from the kernel module as `#define`s so
//! the two paths cannot drift apart.

use std::borrow::Cow;
use std::fmt::Write as _;

use wgpu::naga::front::glsl::{Frontend, Options};
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::ShaderStage;

use crate::host::AttachError;
use crate::kernel::noise::{
    GRADIENT_BIAS, HASH_DIVISOR_X, HASH_DIVISOR_Y, HASH_FOLD, HASH_OFFSET,
};
use crate::kernel::palette::{CYCLE_DRIFT, CYCLE_LINE_SPREAD};
use crate::kernel::{LINE_BLUR, LINE_WIDTH, MAX_LINE_COUNT, PALETTE};

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("threadfield vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Validates and compiles the thread kernel fragment shader.
///
/// Parse and validation failures surface as [`AttachError::ShaderCompile`]
/// before the device sees the source; anything the driver still rejects is
/// caught through a validation error scope.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, AttachError> {
    let source = fragment_source();
    validate_fragment_source(&source)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("threadfield fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(AttachError::ShaderCompile {
            diagnostics: err.to_string(),
        });
    }
    Ok(module)
}

/// Runs a fragment shader through the GLSL front-end and the IR validator.
pub fn validate_fragment_source(source: &str) -> Result<(), AttachError> {
    let module = Frontend::default()
        .parse(&Options::from(ShaderStage::Fragment), source)
        .map_err(|errors| AttachError::ShaderCompile {
            diagnostics: errors
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        })?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|err| AttachError::ShaderCompile {
            diagnostics: err.to_string(),
        })?;
    Ok(())
}

/// Complete fragment shader source: version line, kernel constants, body.
pub fn fragment_source() -> String {
    let mut source = String::from("#version 450\n");
    let mut define = |name: &str, value: String| {
        // Writing into a String cannot fail.
        let _ = writeln!(source, "#define {name} {value}");
    };
    define("HASH_FOLD", float(HASH_FOLD));
    define(
        "HASH_OFFSET",
        format!(
            "vec4({x}, {y}, {x}, {y})",
            x = float(HASH_OFFSET[0]),
            y = float(HASH_OFFSET[1])
        ),
    );
    define("HASH_DIVISOR_X", float(HASH_DIVISOR_X));
    define("HASH_DIVISOR_Y", float(HASH_DIVISOR_Y));
    define("GRADIENT_BIAS", float(GRADIENT_BIAS));
    define("NOISE_SCALE", float(std::f32::consts::SQRT_2));
    define("LENGTH_FLOOR", format!("{:e}", f32::MIN_POSITIVE));
    define("LINE_WIDTH", float(LINE_WIDTH));
    define("LINE_BLUR", float(LINE_BLUR));
    define("MAX_LINE_COUNT", MAX_LINE_COUNT.to_string());
    define("CYCLE_DRIFT", float(CYCLE_DRIFT));
    define("CYCLE_LINE_SPREAD", float(CYCLE_LINE_SPREAD));
    for (index, stop) in PALETTE.iter().enumerate() {
        define(
            &format!("PALETTE_{index}"),
            format!(
                "vec3({}, {}, {})",
                float(stop[0]),
                float(stop[1]),
                float(stop[2])
            ),
        );
    }
    source.push_str(FRAGMENT_BODY);
    source
}

// `{:?}` on f32 is the shortest round-tripping form and always keeps a
// decimal point, which GLSL needs to type the literal as float.
fn float(value: f32) -> String {
    format!("{value:?}")
}

const FRAGMENT_BODY: &str = r"
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform ThreadParams {
    vec4 resolution;
    vec2 mouse;
    float time;
    float amplitude;
    float distance_skew;
    int line_count;
    vec2 padding;
} ubo;

float fade(float t) {
    return t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
}

float noise(vec2 p) {
    vec2 cell = floor(p);
    vec4 lattice = vec4(cell, cell + 1.0);
    vec2 f0 = p - cell;
    vec2 f1 = p - (cell + 1.0);

    lattice = lattice - floor(lattice * (1.0 / HASH_FOLD)) * HASH_FOLD;
    lattice += HASH_OFFSET;
    lattice *= lattice;
    vec4 hashed = lattice.xzxz * lattice.yyww;

    vec4 grad_x = fract(hashed * (1.0 / HASH_DIVISOR_X)) - GRADIENT_BIAS;
    vec4 grad_y = fract(hashed * (1.0 / HASH_DIVISOR_Y)) - GRADIENT_BIAS;
    vec4 offset_x = vec4(f0.x, f1.x, f0.x, f1.x);
    vec4 offset_y = vec4(f0.y, f0.y, f1.y, f1.y);
    vec4 length_sq = max(grad_x * grad_x + grad_y * grad_y, vec4(LENGTH_FLOOR));
    vec4 gradients = (grad_x * offset_x + grad_y * offset_y) / sqrt(length_sq) * NOISE_SCALE;

    float bx = fade(f0.x);
    float by = fade(f0.y);
    vec4 weights = vec4(
        (1.0 - bx) * (1.0 - by),
        bx * (1.0 - by),
        (1.0 - bx) * by,
        bx * by
    );
    return dot(gradients, weights);
}

float coverage(vec2 st, float width, float p, float pixel) {
    float split_point = 0.1 + p * 0.4;
    float blur = max(LINE_BLUR * pixel * smoothstep(split_point, split_point + 0.05, st.x) * p, 0.0);

    float amplitude = smoothstep(split_point, 0.7, st.x)
        * 0.5
        * ubo.amplitude
        * (1.0 + (ubo.mouse.y - 0.5) * 0.2);

    float time_scaled = ubo.time / 10.0 + (ubo.mouse.x - 0.5);
    float wander = mix(
        noise(vec2(time_scaled * 2.5, (st.x + p) * 2.5)),
        noise(vec2(time_scaled * 3.5, (st.x + time_scaled) * 3.5)) / 1.5,
        st.x * 0.3
    );

    float centre = 0.5 + (p - 0.5) * ubo.distance_skew + wander * 0.5 * amplitude;
    float reach = max(max(width, 0.0) * 0.5 + blur, 1.1920929e-7);

    float upper = 1.0 - smoothstep(centre, centre + reach, st.y);
    float lower = 1.0 - smoothstep(centre - reach, centre, st.y);
    float taper = 1.0 - smoothstep(0.0, 1.0, pow(clamp(st.x, 0.0, 1.0), 0.3));

    return clamp((upper - lower) * taper, 0.0, 1.0);
}

vec3 palette_stop(int index) {
    if (index == 0) {
        return PALETTE_0;
    }
    if (index == 1) {
        return PALETTE_1;
    }
    if (index == 2) {
        return PALETTE_2;
    }
    if (index == 3) {
        return PALETTE_3;
    }
    return PALETTE_4;
}

vec3 palette(float t) {
    float scaled = fract(t) * 5.0;
    int index = min(int(floor(scaled)), 4);
    float blend = scaled - float(index);
    return mix(palette_stop(index), palette_stop((index + 1) % 5), blend);
}

void main() {
    vec2 res = ubo.resolution.xy;
    if (res.x <= 0.0 || res.y <= 0.0) {
        outColor = vec4(0.0);
        return;
    }
    // Framebuffer origin is top-left; the kernel works bottom-left.
    vec2 frag_coord = vec2(gl_FragCoord.x, res.y - gl_FragCoord.y);
    vec2 st = frag_coord / res;
    float pixel = 1.0 / max(max(res.x, res.y), 1.0);

    int count = clamp(ubo.line_count, 1, MAX_LINE_COUNT);
    float alpha = 0.0;
    vec3 rgb = vec3(0.0);
    for (int i = 0; i < count; i++) {
        float p = float(i) / float(count);
        float width = max(LINE_WIDTH * pixel * (1.0 - p), 0.0);
        float value = coverage(st, width, p, pixel);
        if (value <= 0.0) {
            continue;
        }
        vec3 tint = palette(fract(st.x + ubo.time * CYCLE_DRIFT + p * CYCLE_LINE_SPREAD));
        alpha += value;
        rgb += tint * value;
    }

    outColor = vec4(clamp(rgb, 0.0, 1.0), clamp(alpha, 0.0, 1.0));
}
";

/// Full-screen triangle; no vertex buffers.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
