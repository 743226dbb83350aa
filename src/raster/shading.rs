//! Fragment shading: lighting, texture lookup, gamma encoding.
//!
//! The lighting model is Blinn-Phong with a single camera-space point light.
//! Vertex-rate modes (Flat, Gouraud) evaluate [`lit_color`] in the transform
//! stage and only decode here; the per-pixel modes (Phong, FlatPhong)
//! evaluate it per fragment from the interpolated attributes.

use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::state::{LightingTerms, RenderState, ShadingMode};
use crate::texture::Texture;

use super::{Rgba, VertexAttributes};

/// Specular exponent shared by all materials.
pub const SHININESS: f32 = 32.0;

const AMBIENT_STRENGTH: f32 = 0.2;

/// Blinn-Phong lighting in camera space.
///
/// The eye sits at the origin, so the view vector is just the negated
/// fragment position. Each term is gated by the state's lighting bitmask.
pub fn lit_color(base: Vec4, normal: Vec3, position: Vec3, state: &RenderState) -> Vec4 {
    let mut out = Vec4::new(0.0, 0.0, 0.0, 0.0);

    if state.lighting.contains(LightingTerms::AMBIENT) {
        out = out + base * AMBIENT_STRENGTH;
    }

    let n = normal.normalize();
    let l = (state.light.position - position).normalize();

    if state.lighting.contains(LightingTerms::DIFFUSE) {
        out = out + base * n.dot(l).max(0.0);
    }

    if state.lighting.contains(LightingTerms::SPECULAR) {
        let v = (-position).normalize();
        let h = (l + v).normalize();
        out = out + state.light.color * n.dot(h).max(0.0).powf(SHININESS);
    }

    out.w = base.w;
    out
}

/// Linear-to-sRGB-ish encoding with a flat 2.2 exponent, clamped to [0,1].
pub fn gamma_encode(c: Vec4) -> Vec4 {
    let encode = |v: f32| v.clamp(0.0, 1.0).powf(1.0 / 2.2);
    Vec4::new(encode(c.x), encode(c.y), encode(c.z), c.w.clamp(0.0, 1.0))
}

/// Compute the final color for one fragment.
///
/// `attrs` are the screen-interpolated, ww-premultiplied attributes at the
/// pixel; `delta_tex` is the texel-per-pixel derivative estimate used for
/// mip selection. When a texture is bound and texturing is enabled, the
/// attribute color carries UVs and the sample replaces the lighting base.
pub fn shade_fragment(
    attrs: &VertexAttributes,
    state: &RenderState,
    texture: Option<&Texture>,
    delta_tex: f32,
) -> Rgba {
    let ww = attrs.ww;
    let corrected = attrs.color / ww;

    let sampled = match (state.texturing, texture) {
        (true, Some(tex)) => Some(tex.sample(corrected.x, corrected.y, state.filter, delta_tex)),
        _ => None,
    };

    let color = match state.shading {
        // Raw color, no lighting and no gamma.
        ShadingMode::None => sampled.unwrap_or(corrected),
        // Provoking-vertex lighting was already evaluated upstream.
        ShadingMode::Flat => gamma_encode(sampled.unwrap_or(attrs.flat_color)),
        ShadingMode::Gouraud => gamma_encode(sampled.unwrap_or(corrected)),
        ShadingMode::Phong => {
            let normal = (attrs.normal / ww).xyz();
            let position = (attrs.position_ccs / ww).xyz();
            let base = sampled.unwrap_or(corrected);
            gamma_encode(lit_color(base, normal, position, state))
        }
        ShadingMode::FlatPhong => {
            let normal = attrs.flat_normal.xyz();
            let position = (attrs.position_ccs / ww).xyz();
            let base = sampled.unwrap_or(attrs.flat_color);
            gamma_encode(lit_color(base, normal, position, state))
        }
    };

    Rgba::from(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Light;
    use approx::assert_relative_eq;

    fn state_with(terms: LightingTerms) -> RenderState {
        RenderState {
            lighting: terms,
            light: Light {
                position: Vec3::new(0.0, 0.0, 5.0),
                color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            },
            ..RenderState::default()
        }
    }

    #[test]
    fn ambient_only_scales_base() {
        let state = state_with(LightingTerms::AMBIENT);
        let c = lit_color(
            Vec4::new(1.0, 0.5, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::ZERO,
            &state,
        );
        assert_relative_eq!(c.x, 0.2);
        assert_relative_eq!(c.y, 0.1);
        assert_relative_eq!(c.z, 0.0);
        assert_relative_eq!(c.w, 1.0);
    }

    #[test]
    fn diffuse_follows_cosine() {
        let state = state_with(LightingTerms::DIFFUSE);
        // Light straight along the normal: full diffuse.
        let head_on = lit_color(
            Vec4::new(1.0, 1.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -5.0),
            &state,
        );
        assert_relative_eq!(head_on.x, 1.0, epsilon = 1e-6);

        // Light behind the surface: clamped to zero.
        let behind = lit_color(
            Vec4::new(1.0, 1.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, -5.0),
            &state,
        );
        assert_relative_eq!(behind.x, 0.0);
    }

    #[test]
    fn specular_peaks_at_mirror_angle() {
        let state = state_with(LightingTerms::SPECULAR);
        // Fragment on the -z axis facing the eye, light co-located with the
        // view direction: the half vector equals the normal.
        let c = lit_color(
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -5.0),
            &state,
        );
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn gamma_brightens_midtones() {
        let c = gamma_encode(Vec4::new(0.5, 0.5, 0.5, 1.0));
        assert_relative_eq!(c.x, 0.5f32.powf(1.0 / 2.2));
        assert!(c.x > 0.5);
    }

    #[test]
    fn gamma_clamps_out_of_range() {
        let c = gamma_encode(Vec4::new(2.0, -1.0, 1.0, 1.0));
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 0.0);
        assert_relative_eq!(c.z, 1.0);
    }

    #[test]
    fn shading_none_skips_lighting_and_gamma() {
        let state = RenderState {
            shading: ShadingMode::None,
            ..RenderState::default()
        };
        let attrs = VertexAttributes {
            position_ccs: Vec4::ZERO,
            normal: Vec4::ZERO,
            // Premultiplied by ww = 0.5.
            color: Vec4::new(0.25, 0.1, 0.05, 0.5),
            ww: 0.5,
            flat_color: Vec4::ZERO,
            flat_normal: Vec4::ZERO,
        };
        let c = shade_fragment(&attrs, &state, None, 0.0);
        // Perspective division restores the raw color.
        assert_relative_eq!(c.r, 0.5);
        assert_relative_eq!(c.g, 0.2);
        assert_relative_eq!(c.b, 0.1);
    }

    #[test]
    fn flat_uses_provoking_color_not_interpolated() {
        let state = RenderState {
            shading: ShadingMode::Flat,
            ..RenderState::default()
        };
        let attrs = VertexAttributes {
            position_ccs: Vec4::ZERO,
            normal: Vec4::ZERO,
            color: Vec4::new(0.9, 0.9, 0.9, 1.0),
            ww: 1.0,
            flat_color: Vec4::new(0.5, 0.0, 0.0, 1.0),
            flat_normal: Vec4::ZERO,
        };
        let c = shade_fragment(&attrs, &state, None, 0.0);
        assert_relative_eq!(c.r, 0.5f32.powf(1.0 / 2.2));
        assert_relative_eq!(c.g, 0.0);
    }
}
