//! High-level frame driver: owns the framebuffer and render state and runs
//! the full transform + fill pipeline over a mesh.

use crate::math::mat4::Mat4;
use crate::mesh::Mesh;
use crate::raster::fill::rasterize_triangle;
use crate::raster::transform::transform_mesh;
use crate::raster::FrameBuffer;
use crate::state::RenderState;
use crate::texture::Texture;

/// A CPU-rendered scene targeting an in-memory framebuffer.
///
/// The caller supplies view and projection matrices per frame; the scene
/// holds everything that persists between frames. After [`render`] the
/// color buffer can be read back (or uploaded as a texture) through the
/// framebuffer accessors.
///
/// [`render`]: SoftwareScene::render
pub struct SoftwareScene {
    framebuffer: FrameBuffer,
    state: RenderState,
    model_matrix: Mat4,
}

impl SoftwareScene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            framebuffer: FrameBuffer::new(width, height),
            state: RenderState::default(),
            model_matrix: Mat4::identity(),
        }
    }

    /// Resize the render target, discarding its contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer.resize(width, height);
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn set_model_matrix(&mut self, model: Mat4) {
        self.model_matrix = model;
    }

    /// Clear the framebuffer for the next frame.
    pub fn new_frame(&mut self) {
        self.framebuffer.clear();
    }

    /// Render one mesh for this frame.
    ///
    /// Clears the target, runs the geometry stage, and fills every
    /// surviving triangle. Texturing silently falls back to the base color
    /// when no texture is bound or the mesh carries no UVs.
    pub fn render(
        &mut self,
        mesh: &Mesh,
        texture: Option<&Texture>,
        view: Mat4,
        projection: Mat4,
    ) -> usize {
        self.new_frame();

        let mut state = self.state;
        state.texturing &= texture.is_some() && mesh.has_texcoords();

        let viewport = Mat4::viewport(
            0.0,
            0.0,
            self.framebuffer.width() as f32,
            self.framebuffer.height() as f32,
        );
        let triangles = transform_mesh(
            mesh,
            self.model_matrix,
            view,
            projection,
            viewport,
            &state,
        );
        for triangle in &triangles {
            rasterize_triangle(triangle, &state, texture, &mut self.framebuffer);
        }
        triangles.len()
    }
}
