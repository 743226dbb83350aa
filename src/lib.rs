//! A CPU reimplementation of the fixed-function 3D pipeline.
//!
//! This crate transforms, culls, shades, and scanline-fills triangle meshes
//! entirely on the CPU, writing into an in-memory RGBA color buffer with a
//! float depth buffer. The finished frame can be read back or uploaded
//! wholesale as a screen-sized texture by whatever display layer the caller
//! uses.
//!
//! # Quick Start
//!
//! ```ignore
//! use close2gl::prelude::*;
//!
//! let mut scene = SoftwareScene::new(800, 600);
//! let mesh = Mesh::from_obj("cow.obj")?;
//! scene.render(&mesh, None, view, projection);
//! let pixels = scene.framebuffer().as_bytes();
//! ```

pub mod math;
pub mod mesh;
pub mod raster;
pub mod scene;
pub mod state;
pub mod texture;

// Re-export commonly needed types at crate root for convenience
pub use mesh::{LoadError, Mesh};
pub use scene::SoftwareScene;
pub use state::{FillMode, LightingTerms, RenderState, ShadingMode, TextureFilter, Winding};
pub use texture::Texture;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use close2gl::prelude::*;
/// ```
pub mod prelude {
    // Scene
    pub use crate::scene::SoftwareScene;

    // Assets
    pub use crate::mesh::Mesh;
    pub use crate::texture::Texture;

    // Render state
    pub use crate::state::{
        FillMode, Light, LightingTerms, RenderState, ShadingMode, TextureFilter, Winding,
    };

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Rasterizer output
    pub use crate::raster::{FrameBuffer, Rgba};
}
