//! Render-state flags consumed by the software pipeline.

use std::fmt;
use std::ops::BitOr;

use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;

/// How fragment colors are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Interpolated base color, no lighting, no gamma.
    None,
    /// Lighting evaluated once at the provoking vertex; never interpolated.
    Flat,
    /// Lighting evaluated per vertex, interpolated across the triangle.
    Gouraud,
    /// Lighting evaluated per pixel with the interpolated vertex normal.
    #[default]
    Phong,
    /// Per-pixel lighting with the triangle's face normal.
    FlatPhong,
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadingMode::None => write!(f, "None"),
            ShadingMode::Flat => write!(f, "Flat"),
            ShadingMode::Gouraud => write!(f, "Gouraud"),
            ShadingMode::Phong => write!(f, "Phong"),
            ShadingMode::FlatPhong => write!(f, "FlatPhong"),
        }
    }
}

/// Which winding counts as front-facing for the cull test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Winding {
    Clockwise,
    #[default]
    CounterClockwise,
}

/// Solid fill vs. boundary-only rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    Solid,
    /// Plot only the per-row edge boundary points (silhouette).
    Boundary,
}

/// Texture minification/magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Bilinear,
    Trilinear,
}

/// Bitmask of lighting terms to accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingTerms(u8);

impl LightingTerms {
    pub const NONE: Self = Self(0);
    pub const AMBIENT: Self = Self(1);
    pub const DIFFUSE: Self = Self(1 << 1);
    pub const SPECULAR: Self = Self(1 << 2);
    pub const ALL: Self = Self(0b111);

    pub fn contains(self, term: Self) -> bool {
        self.0 & term.0 != 0
    }
}

impl Default for LightingTerms {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for LightingTerms {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The single point light, positioned in camera space.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec4,
}

impl Default for Light {
    fn default() -> Self {
        // Slightly above and behind the eye.
        Self {
            position: Vec3::new(0.0, 2.0, 2.0),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// All switches the caller can flip between frames.
#[derive(Debug, Clone, Copy)]
pub struct RenderState {
    pub shading: ShadingMode,
    pub lighting: LightingTerms,
    pub culling: bool,
    pub front_face: Winding,
    pub fill: FillMode,
    /// Sample the mesh's UVs from the bound texture instead of the base color.
    pub texturing: bool,
    pub filter: TextureFilter,
    /// Color triangle corners red/green/blue instead of the object color.
    pub debug_vertex_colors: bool,
    pub object_color: Vec4,
    pub light: Light,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            shading: ShadingMode::default(),
            lighting: LightingTerms::default(),
            culling: true,
            front_face: Winding::default(),
            fill: FillMode::default(),
            texturing: false,
            filter: TextureFilter::default(),
            debug_vertex_colors: false,
            object_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            light: Light::default(),
        }
    }
}
