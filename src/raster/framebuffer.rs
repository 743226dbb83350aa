//! CPU-owned color and depth buffers.
//!
//! Two parallel dense arrays sized `width * height`: RGBA f32 color and f32
//! depth, cleared to black and +infinity each frame. Rows are stored
//! bottom-up (`height - y - 1`) so the finished buffer can be uploaded
//! directly as a GL-convention texture.

use crate::math::vec4::Vec4;

/// An RGBA color with f32 channels, laid out for direct texture upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Vec4> for Rgba {
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

/// The rasterizer's color + depth target.
pub struct FrameBuffer {
    color: Vec<Rgba>,
    depth: Vec<f32>,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color: vec![Rgba::BLACK; size],
            depth: vec![f32::INFINITY; size],
            width,
            height,
        }
    }

    /// Reallocate both buffers for a new viewport size.
    ///
    /// Must be called before the next render when the window size changes;
    /// the previous contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width * height) as usize;
        self.color = vec![Rgba::BLACK; size];
        self.depth = vec![f32::INFINITY; size];
        self.width = width;
        self.height = height;
    }

    /// Reset color to black and depth to +infinity for a new frame.
    pub fn clear(&mut self) {
        self.color.fill(Rgba::BLACK);
        self.depth.fill(f32::INFINITY);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth-tested pixel write.
    ///
    /// Out-of-bounds coordinates are silently skipped. The row index is
    /// flipped for the bottom-up storage order, and the write lands only
    /// when `z` is strictly less than the stored depth (nearer wins; ties
    /// keep the earlier write).
    #[inline]
    pub fn change_buffer(&mut self, x: i32, y: i32, z: f32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let index = ((self.height as i32 - y - 1) * self.width as i32 + x) as usize;
        if z < self.depth[index] {
            self.depth[index] = z;
            self.color[index] = color;
        }
    }

    /// Color at logical pixel coordinates (row 0 = top), or `None` outside.
    pub fn color_at(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index_of(x, y).map(|i| self.color[i])
    }

    /// Depth at logical pixel coordinates (row 0 = top), or `None` outside.
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        self.index_of(x, y).map(|i| self.depth[i])
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(((self.height as i32 - y - 1) * self.width as i32 + x) as usize)
    }

    /// The color buffer in storage order (bottom row first).
    pub fn color_data(&self) -> &[Rgba] {
        &self.color
    }

    /// The color buffer as raw bytes, for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(
                self.color.as_ptr() as *const u8,
                self.color.len() * std::mem::size_of::<Rgba>(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_depth_tested() {
        let mut fb = FrameBuffer::new(4, 4);
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let blue = Rgba::new(0.0, 0.0, 1.0, 1.0);

        fb.change_buffer(1, 1, 0.8, red);
        assert_eq!(fb.color_at(1, 1), Some(red));

        // A nearer write replaces, a farther one does not.
        fb.change_buffer(1, 1, 0.2, blue);
        assert_eq!(fb.color_at(1, 1), Some(blue));
        fb.change_buffer(1, 1, 0.5, red);
        assert_eq!(fb.color_at(1, 1), Some(blue));
        assert_eq!(fb.depth_at(1, 1), Some(0.2));
    }

    #[test]
    fn equal_depth_keeps_first_write() {
        let mut fb = FrameBuffer::new(2, 2);
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let blue = Rgba::new(0.0, 0.0, 1.0, 1.0);
        fb.change_buffer(0, 0, 0.5, red);
        fb.change_buffer(0, 0, 0.5, blue);
        assert_eq!(fb.color_at(0, 0), Some(red));
    }

    #[test]
    fn out_of_bounds_writes_are_skipped() {
        let mut fb = FrameBuffer::new(2, 2);
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        // None of these may touch the buffer (no wrapping to other rows).
        fb.change_buffer(-1, 0, 0.0, red);
        fb.change_buffer(0, -1, 0.0, red);
        fb.change_buffer(2, 0, 0.0, red);
        fb.change_buffer(0, 2, 0.0, red);
        for pixel in fb.color_data() {
            assert_eq!(*pixel, Rgba::BLACK);
        }
    }

    #[test]
    fn rows_are_stored_inverted() {
        let mut fb = FrameBuffer::new(2, 2);
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        // Logical top-left lands in the last stored row.
        fb.change_buffer(0, 0, 0.5, red);
        assert_eq!(fb.color_data()[2], red);
        assert_eq!(fb.color_at(0, 0), Some(red));
    }

    #[test]
    fn resize_round_trip_resets_depth() {
        let mut fb = FrameBuffer::new(8, 8);
        fb.change_buffer(3, 3, 0.1, Rgba::new(1.0, 1.0, 1.0, 1.0));

        fb.resize(16, 16);
        assert_eq!(fb.width(), 16);
        assert_eq!(fb.color_data().len(), 256);

        fb.resize(8, 8);
        assert_eq!(fb.width(), 8);
        assert_eq!(fb.color_data().len(), 64);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(fb.depth_at(x, y), Some(f32::INFINITY));
            }
        }
    }
}
