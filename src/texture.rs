//! Mip-mapped RGBA8 textures and filtered sampling.
//!
//! The mip chain is built once when the texture is created: each level is a
//! 2x2 box-filtered copy of the previous one, down to 1x1. Sampling returns
//! colors as linear `Vec4` in `[0,1]` and supports nearest, bilinear, and
//! trilinear filtering.

use std::path::Path;

use crate::math::vec4::Vec4;
use crate::state::TextureFilter;

/// One level of a mip chain: an RGBA8 image.
pub struct MipLevel {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl MipLevel {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Texel at integer coordinates as a normalized color.
    fn texel(&self, x: u32, y: u32) -> Vec4 {
        let i = ((y * self.width + x) * 4) as usize;
        Vec4::new(
            self.data[i] as f32 / 255.0,
            self.data[i + 1] as f32 / 255.0,
            self.data[i + 2] as f32 / 255.0,
            self.data[i + 3] as f32 / 255.0,
        )
    }
}

/// An RGBA8 texture with its precomputed mip chain.
///
/// `level(0)` is the source image; `mip_count()` is the number of reduced
/// levels below it.
pub struct Texture {
    levels: Vec<MipLevel>,
}

impl Texture {
    /// Build a texture (and its mip chain) from raw RGBA8 data.
    ///
    /// `data` must hold `width * height * 4` bytes.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);

        let mut levels = vec![MipLevel {
            width,
            height,
            data,
        }];
        while levels[levels.len() - 1].width > 1 || levels[levels.len() - 1].height > 1 {
            let next = downsample(&levels[levels.len() - 1]);
            levels.push(next);
        }

        Self { levels }
    }

    /// Load a texture from an image file (PNG, JPG, etc.).
    ///
    /// The image is flipped vertically on load so that v=0 addresses the
    /// bottom row, matching the OBJ texture-coordinate convention.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.flipv().to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba8(width, height, img.into_raw()))
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    /// Number of reduced mip levels (excluding the source image).
    pub fn mip_count(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn level(&self, level: usize) -> &MipLevel {
        &self.levels[level]
    }

    /// Sample the texture at `(u, v)` with the given filter.
    ///
    /// `delta_tex` is the texel-to-pixel derivative estimate: how many base
    /// level texels one screen pixel step covers. It selects the mip level
    /// for minification; values <= 1 sample the base level.
    pub fn sample(&self, u: f32, v: f32, filter: TextureFilter, delta_tex: f32) -> Vec4 {
        match filter {
            TextureFilter::Nearest => {
                self.sample_nearest(self.level_for(delta_tex).round() as usize, u, v)
            }
            TextureFilter::Bilinear => {
                self.sample_bilinear(self.level_for(delta_tex).round() as usize, u, v)
            }
            TextureFilter::Trilinear => {
                let lod = self.level_for(delta_tex);
                let lower = lod.floor() as usize;
                let upper = (lower + 1).min(self.levels.len() - 1);
                let t = lod.fract();
                let a = self.sample_bilinear(lower, u, v);
                let b = self.sample_bilinear(upper, u, v);
                a * (1.0 - t) + b * t
            }
        }
    }

    /// Fractional level of detail for a texel-to-pixel ratio.
    fn level_for(&self, delta_tex: f32) -> f32 {
        let lod = delta_tex.max(1.0).log2();
        lod.min((self.levels.len() - 1) as f32)
    }

    /// Point lookup in one level, with repeat wrapping.
    fn sample_nearest(&self, level: usize, u: f32, v: f32) -> Vec4 {
        let level = &self.levels[level];
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);
        let x = ((u * level.width as f32) as u32).min(level.width - 1);
        let y = ((v * level.height as f32) as u32).min(level.height - 1);
        level.texel(x, y)
    }

    /// 4-tap lookup in one level, weights from the texel-space fraction.
    fn sample_bilinear(&self, level: usize, u: f32, v: f32) -> Vec4 {
        let level = &self.levels[level];
        let x = u.rem_euclid(1.0) * level.width as f32 - 0.5;
        let y = v.rem_euclid(1.0) * level.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let wrap = |c: f32, size: u32| -> u32 {
            (c as i64).rem_euclid(size as i64) as u32
        };
        let x0i = wrap(x0, level.width);
        let x1i = wrap(x0 + 1.0, level.width);
        let y0i = wrap(y0, level.height);
        let y1i = wrap(y0 + 1.0, level.height);

        let c00 = level.texel(x0i, y0i);
        let c10 = level.texel(x1i, y0i);
        let c01 = level.texel(x0i, y1i);
        let c11 = level.texel(x1i, y1i);

        let top = c00 * (1.0 - fx) + c10 * fx;
        let bottom = c01 * (1.0 - fx) + c11 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Box-filter a level down to half its linear size (minimum 1 texel).
fn downsample(level: &MipLevel) -> MipLevel {
    let width = (level.width / 2).max(1);
    let height = (level.height / 2).max(1);
    let mut data = Vec::with_capacity((width * height * 4) as usize);

    for y in 0..height {
        for x in 0..width {
            let x0 = (2 * x).min(level.width - 1);
            let x1 = (2 * x + 1).min(level.width - 1);
            let y0 = (2 * y).min(level.height - 1);
            let y1 = (2 * y + 1).min(level.height - 1);
            for channel in 0..4 {
                let sum = fetch(level, x0, y0, channel)
                    + fetch(level, x1, y0, channel)
                    + fetch(level, x0, y1, channel)
                    + fetch(level, x1, y1, channel);
                data.push(((sum + 2) / 4) as u8);
            }
        }
    }

    MipLevel {
        width,
        height,
        data,
    }
}

fn fetch(level: &MipLevel, x: u32, y: u32, channel: usize) -> u32 {
    level.data[((y * level.width + x) * 4) as usize + channel] as u32
}
