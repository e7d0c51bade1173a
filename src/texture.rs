//! Texture maps sampled by the pixel shader.
//!
//! Texels are stored top row first as packed `0xAARRGGBB`. Texture
//! coordinates follow the OBJ convention (v = 0 at the bottom), so sampling
//! flips v.

use std::path::Path;

use log::info;
use thiserror::Error;

use crate::colors::unpack_color;
use crate::math::Vec3;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture '{path}'")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture of {width}x{height} needs {expected} texels, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A 2D RGBA texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    data: Vec<u32>,
    width: u32,
    height: u32,
}

impl Texture {
    /// Load a texture from an image file (PNG, JPG, etc.).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| TextureError::Load {
                path: path.display().to_string(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();

        let data = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                u32::from_be_bytes([a, r, g, b])
            })
            .collect();

        info!("loaded texture '{}' ({width}x{height})", path.display());
        Self::from_pixels(width, height, data)
    }

    /// Wraps packed ARGB texels laid out row-major, top row first.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u32>) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize;
        if expected == 0 || data.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// A 1×1 texture of one color.
    pub fn solid(color: u32) -> Self {
        Self {
            data: vec![color],
            width: 1,
            height: 1,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-neighbour lookup.
    ///
    /// `u` and `v` are clamped to `[0, 1]`; the texel is
    /// `(floor(u * (w - 1)), floor((1 - v) * (h - 1)))`.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };

        let col = (u * (self.width - 1) as f32) as usize;
        let row = ((1.0 - v) * (self.height - 1) as f32) as usize;

        self.data[row * self.width as usize + col]
    }

    /// Sampled texel as linear `[0, 1]` RGB.
    #[inline]
    pub fn sample_color(&self, u: f32, v: f32) -> Vec3 {
        unpack_color(self.sample(u, v))
    }

    /// Single-channel intensity in `[0, 1]` (the red channel).
    #[inline]
    pub fn sample_intensity(&self, u: f32, v: f32) -> f32 {
        self.sample_color(u, v).x
    }

    /// Tangent-free normal map lookup: channels in `[0, 255]` decode to
    /// `[-1, 1]`. The result is not normalized.
    #[inline]
    pub fn sample_normal(&self, u: f32, v: f32) -> Vec3 {
        self.sample_color(u, v) * 2.0 - Vec3::ONE
    }
}

/// The three optional maps used by the shader. Shared read-only between
/// workers while a frame renders and replaced wholesale on scene reload.
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    pub diffuse: Option<Texture>,
    pub specular: Option<Texture>,
    pub normal: Option<Texture>,
}

impl TextureSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads whichever maps have a path.
    pub fn load(
        diffuse: Option<&Path>,
        specular: Option<&Path>,
        normal: Option<&Path>,
    ) -> Result<Self, TextureError> {
        Ok(Self {
            diffuse: diffuse.map(Texture::from_file).transpose()?,
            specular: specular.map(Texture::from_file).transpose()?,
            normal: normal.map(Texture::from_file).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.diffuse.is_none() && self.specular.is_none() && self.normal.is_none()
    }
}
