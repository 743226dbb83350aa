//! The software rasterizer: transform stage, edge walking, scanline fill.
//!
//! Per frame, [`transform::transform_mesh`] turns the mesh into a list of
//! surviving [`Triangle`]s with fully populated vertex attributes, and
//! [`fill::rasterize_triangle`] walks each one into the [`FrameBuffer`].

pub mod edge;
pub mod fill;
pub mod framebuffer;
pub mod shading;
pub mod transform;

pub use framebuffer::{FrameBuffer, Rgba};

use crate::math::vec4::Vec4;

/// Per-vertex bundle carried through culling, edge walking, and shading.
///
/// Every field except the `flat_*` copies is premultiplied by `ww = 1/w`
/// before interpolation and divided back out at consumption, which makes the
/// screen-linear interpolation perspective-correct. The flat copies come
/// from the provoking vertex and are never interpolated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexAttributes {
    /// Camera-space position, scaled by `ww`.
    pub position_ccs: Vec4,
    /// Camera-space normal, scaled by `ww`.
    pub normal: Vec4,
    /// Base color, or a UV pair in the xy channels, scaled by `ww`.
    pub color: Vec4,
    /// Reciprocal clip-space w.
    pub ww: f32,
    /// Provoking-vertex color, unscaled.
    pub flat_color: Vec4,
    /// Provoking-vertex normal, unscaled.
    pub flat_normal: Vec4,
}

impl VertexAttributes {
    /// Interpolate between two attribute bundles.
    ///
    /// `value` in `[min, max]` picks the blend: at `min` the result is
    /// `far`, at `max` it is `near`. A degenerate range yields `far`.
    /// Flat fields are carried from `near` untouched.
    pub fn interpolate(near: &Self, far: &Self, min: f32, max: f32, value: f32) -> Self {
        let range = max - min;
        let alpha = if range.abs() < f32::EPSILON {
            0.0
        } else {
            (value - min) / range
        };

        Self {
            position_ccs: near.position_ccs * alpha + far.position_ccs * (1.0 - alpha),
            normal: near.normal * alpha + far.normal * (1.0 - alpha),
            color: near.color * alpha + far.color * (1.0 - alpha),
            ww: near.ww * alpha + far.ww * (1.0 - alpha),
            flat_color: near.flat_color,
            flat_normal: near.flat_normal,
        }
    }
}

/// A surviving, front-facing triangle ready for scanline fill.
///
/// Created fresh each frame by the transform stage and discarded at the end
/// of the frame.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    /// Clip-space vertices (post-MVP, pre-divide; w retained).
    pub clip: [Vec4; 3],
    /// Normalized-device vertices (post-divide).
    pub ndc: [Vec4; 3],
    /// Viewport-mapped pixel-space vertices.
    pub screen: [Vec4; 3],
    /// Camera-space vertex normals.
    pub normals: [Vec4; 3],
    /// Cross product of two clip-space edges.
    pub face_normal: Vec4,
    /// Interpolation attributes, one per vertex.
    pub attrs: [VertexAttributes; 3],
}

impl Triangle {
    /// Build a triangle directly from pixel-space vertices with a uniform
    /// color and no perspective (ww = 1). Used by tests and benchmarks to
    /// exercise the fill engine without the transform stage.
    pub fn from_screen(screen: [Vec4; 3], color: Vec4) -> Self {
        let forward = Vec4::direction(0.0, 0.0, 1.0);
        let attrs = screen.map(|_| VertexAttributes {
            position_ccs: Vec4::point(0.0, 0.0, -1.0),
            normal: forward,
            color,
            ww: 1.0,
            flat_color: color,
            flat_normal: forward,
        });
        Self {
            clip: screen,
            ndc: screen,
            screen,
            normals: [forward; 3],
            face_normal: forward,
            attrs,
        }
    }
}
