// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! # Iridescent reveal material
//!
//! The card faces are drawn with a material that
//! - wipes the face in from the top edge as the reveal progresses,
//! - draws a thin glow band right at the wipe edge,
//! - tints grazing angles with the card gradient (fresnel), slowly hue shifting.
//!
//! `IRIDESCENT_SHADER` is the WGSL module used on the gpu. `shade_fragment`
//! runs the same math on the cpu; it backs the headless backend and keeps
//! the shader math under test.
//!
//! uv follows the mesh convention: v = 1 is the top edge of the card.

use crate::color::Rgba;
use glam::{Mat4, Vec2, Vec3};

pub const IRIDESCENT_SHADER: &str = r#"
struct Uniforms {
    model_view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    gradient_from: vec3<f32>,
    time: f32,
    gradient_to: vec3<f32>,
    reveal_progress: f32,
}

@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var card_texture: texture_2d<f32>;
@group(0) @binding(2) var card_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) view_dir: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let view_pos = u.model_view * vec4<f32>(input.position, 1.0);
    out.uv = input.uv;
    out.normal = normalize((u.normal_matrix * vec4<f32>(input.normal, 0.0)).xyz);
    out.view_dir = normalize(-view_pos.xyz);
    out.clip_position = u.projection * view_pos;
    return out;
}

fn hue_shift(color: vec3<f32>, shift: f32) -> vec3<f32> {
    let angle = shift * 6.28318;
    let s = sin(angle);
    let c = cos(angle);
    let d = dot(color, vec3<f32>(0.299, 0.587, 0.114));
    let r = color.r - d;
    let g = color.g - d;
    let b = color.b - d;
    let result = vec3<f32>(d) + vec3<f32>(
        c * r + s * (0.0 - g * 0.328 + b * 1.25),
        c * g + s * (r * 0.0 - b * 0.203),
        c * b + s * (r * -1.25 + g * 1.05),
    );
    return clamp(result, vec3<f32>(0.0), vec3<f32>(1.0));
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    // sampled before the discard, texture rows run top down
    let tex = textureSample(card_texture, card_sampler, vec2<f32>(input.uv.x, 1.0 - input.uv.y));

    let reveal_line = 1.0 - input.uv.y;
    if (reveal_line > u.reveal_progress) {
        discard;
    }

    let edge = u.reveal_progress - reveal_line;
    let scan_glow = smoothstep(0.0, 0.05, edge) * (1.0 - smoothstep(0.0, 0.02, edge));

    let fresnel = pow(1.0 - max(dot(input.normal, input.view_dir), 0.0), 3.0);

    var iri = mix(u.gradient_from, u.gradient_to, vec3<f32>(fresnel + sin(u.time * 0.5) * 0.3));
    iri = hue_shift(iri, fresnel * 0.3 + u.time * 0.05);

    var color = tex.rgb + iri * fresnel * 0.4;
    let glow = mix(u.gradient_from, u.gradient_to, vec3<f32>(0.5));
    color = color + glow * scan_glow * 2.0;

    return vec4<f32>(color, tex.a);
}
"#;

pub const VS_ENTRY: &str = "vs_main";
pub const FS_ENTRY: &str = "fs_main";

/// Uniform block, laid out to match `Uniforms` in the WGSL source.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct IridescentUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub gradient_from: [f32; 3],
    pub time: f32,
    pub gradient_to: [f32; 3],
    pub reveal_progress: f32,
}

pub struct MaterialParams {
    pub gradient_from: Rgba,
    pub gradient_to: Rgba,
    pub reveal_progress: f32,
}

impl MaterialParams {
    /// params from the css colors of a card gradient
    pub fn from_gradient(from: &str, to: &str) -> Self {
        Self {
            gradient_from: Rgba::from_css(from),
            gradient_to: Rgba::from_css(to),
            reveal_progress: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IridescentMaterial {
    uniforms: IridescentUniforms,
    pub transparent: bool,
}

/// Build a material instance. Each face owns its own instance.
pub fn iridescent_material(params: MaterialParams) -> IridescentMaterial {
    let identity = Mat4::IDENTITY.to_cols_array_2d();
    IridescentMaterial {
        uniforms: IridescentUniforms {
            model_view: identity,
            projection: identity,
            normal_matrix: identity,
            gradient_from: params.gradient_from.to_rgb_f32(),
            time: 0.0,
            gradient_to: params.gradient_to.to_rgb_f32(),
            reveal_progress: params.reveal_progress.clamp(0.0, 1.0),
        },
        transparent: true,
    }
}

impl IridescentMaterial {
    pub fn set_time(&mut self, t: f32) {
        self.uniforms.time = t;
    }

    pub fn set_reveal_progress(&mut self, p: f32) {
        self.uniforms.reveal_progress = p.clamp(0.0, 1.0);
    }

    pub fn reveal_progress(&self) -> f32 {
        self.uniforms.reveal_progress
    }

    pub fn set_transforms(&mut self, model_view: Mat4, projection: Mat4) {
        self.uniforms.model_view = model_view.to_cols_array_2d();
        self.uniforms.projection = projection.to_cols_array_2d();
        self.uniforms.normal_matrix = model_view.inverse().transpose().to_cols_array_2d();
    }

    pub fn uniforms(&self) -> &IridescentUniforms {
        &self.uniforms
    }

    /// bytes for the uniform buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.uniforms)
    }

    pub fn shade(&self, uv: Vec2, normal: Vec3, view_dir: Vec3, tex: [f32; 4]) -> Option<[f32; 4]> {
        shade_fragment(&self.uniforms, uv, normal, view_dir, tex)
    }
}

fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn hue_shift(color: Vec3, shift: f32) -> Vec3 {
    let angle = shift * 6.28318;
    let (s, c) = angle.sin_cos();
    let d = color.dot(Vec3::new(0.299, 0.587, 0.114));
    let (r, g, b) = (color.x - d, color.y - d, color.z - d);
    let result = Vec3::splat(d)
        + Vec3::new(
            c * r + s * (0.0 - g * 0.328 + b * 1.25),
            c * g + s * (r * 0.0 - b * 0.203),
            c * b + s * (r * -1.25 + g * 1.05),
        );
    result.clamp(Vec3::ZERO, Vec3::ONE)
}

/// The fragment stage on the cpu. None means the fragment is discarded.
pub fn shade_fragment(
    u: &IridescentUniforms,
    uv: Vec2,
    normal: Vec3,
    view_dir: Vec3,
    tex: [f32; 4],
) -> Option<[f32; 4]> {
    let reveal_line = 1.0 - uv.y;
    if reveal_line > u.reveal_progress {
        return None;
    }
    let edge = u.reveal_progress - reveal_line;
    let scan_glow = smoothstep(0.0, 0.05, edge) * (1.0 - smoothstep(0.0, 0.02, edge));

    let fresnel = (1.0 - normal.dot(view_dir).max(0.0)).powf(3.0);

    let from = Vec3::from(u.gradient_from);
    let to = Vec3::from(u.gradient_to);
    let iri = from.lerp(to, fresnel + (u.time * 0.5).sin() * 0.3);
    let iri = hue_shift(iri, fresnel * 0.3 + u.time * 0.05);

    let glow = from.lerp(to, 0.5);
    let color = Vec3::new(tex[0], tex[1], tex[2]) + iri * fresnel * 0.4 + glow * scan_glow * 2.0;
    Some([color.x, color.y, color.z, tex[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat(progress: f32) -> IridescentMaterial {
        let mut p = MaterialParams::from_gradient("hsl(261,85%,50%)", "hsl(199,95%,60%)");
        p.reveal_progress = progress;
        iridescent_material(p)
    }

    #[test]
    fn uniform_block_size() {
        // 3 mat4 + 2 x (vec3 + f32)
        assert_eq!(std::mem::size_of::<IridescentUniforms>(), 3 * 64 + 2 * 16);
        assert_eq!(mat(0.0).as_bytes().len(), 224);
    }

    #[test]
    fn wipe_runs_top_down() {
        let m = mat(0.3);
        let n = Vec3::Z;
        let tex = [0.1, 0.2, 0.3, 1.0];
        // top rows visible, bottom rows discarded
        assert!(m.shade(Vec2::new(0.5, 0.9), n, n, tex).is_some());
        assert!(m.shade(Vec2::new(0.5, 0.2), n, n, tex).is_none());
        assert!(mat(0.0).shade(Vec2::new(0.5, 0.99), n, n, tex).is_none());
        assert!(mat(1.0).shade(Vec2::new(0.5, 0.0), n, n, tex).is_some());
    }

    #[test]
    fn head_on_view_keeps_texture() {
        let m = mat(1.0);
        // facing the camera: fresnel 0; far from the wipe edge: no glow
        let out = m
            .shade(Vec2::new(0.5, 0.5), Vec3::Z, Vec3::Z, [0.1, 0.2, 0.3, 0.7])
            .unwrap();
        for (a, b) in out.iter().zip([0.1, 0.2, 0.3, 0.7]) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn grazing_angle_adds_tint() {
        let m = mat(1.0);
        let out = m
            .shade(Vec2::new(0.5, 0.5), Vec3::Z, Vec3::X, [0.0, 0.0, 0.0, 1.0])
            .unwrap();
        assert!(out[0] + out[1] + out[2] > 0.0);
    }

    #[test]
    fn glow_band_near_edge() {
        let m = mat(0.5);
        let n = Vec3::Z;
        // edge distance 0.01 sits inside the band
        let at_edge = m.shade(Vec2::new(0.5, 0.51), n, n, [0.0; 4]).unwrap();
        let inside = m.shade(Vec2::new(0.5, 0.9), n, n, [0.0; 4]).unwrap();
        assert!(at_edge[0] + at_edge[1] + at_edge[2] > 0.0);
        assert_eq!(inside[..3], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn hue_shift_identity_and_gray() {
        let c = Vec3::new(0.2, 0.5, 0.7);
        assert!(hue_shift(c, 0.0).abs_diff_eq(c, 1e-6));
        let g = Vec3::splat(0.4);
        assert!(hue_shift(g, 0.37).abs_diff_eq(g, 1e-6));
    }

    #[test]
    fn progress_is_clamped() {
        let mut m = mat(2.0);
        assert_eq!(m.reveal_progress(), 1.0);
        m.set_reveal_progress(-1.0);
        assert_eq!(m.reveal_progress(), 0.0);
    }

    #[test]
    fn wgsl_has_entry_points() {
        assert!(IRIDESCENT_SHADER.contains(&format!("fn {}(", VS_ENTRY)));
        assert!(IRIDESCENT_SHADER.contains(&format!("fn {}(", FS_ENTRY)));
        assert!(IRIDESCENT_SHADER.contains("discard"));
    }
}
