//! Pixel shaders for triangle rasterization.
//!
//! Like a GPU pipeline, the fixed-function part (span walking, barycentric
//! weights, depth test) lives in the rasterizer and the per-pixel color
//! computation lives behind [`PixelShader`].
//!
//! # Barycentric Coordinates
//!
//! `shade` receives screen-space weights `[λ₀, λ₁, λ₂]` summing to 1. Eye
//! positions and normals are blended with them directly. Texture coordinates
//! are not linear in screen space under perspective, so they are blended with
//! [`perspective_correct`] weights instead.

use std::sync::Arc;

use serde::Deserialize;

use crate::colors::pack_color;
use crate::light::LightSource;
use crate::math::{Mat4, Vec3};
use crate::texture::TextureSet;

const WEIGHT_EPSILON: f32 = 1e-8;

/// Per-pixel color computation.
pub trait PixelShader {
    /// Color of the fragment at screen-space barycentric weights `lambda`.
    fn shade(&self, lambda: [f32; 3]) -> u32;
}

/// Constant color.
pub struct FlatShader {
    color: u32,
}

impl FlatShader {
    pub fn new(color: u32) -> Self {
        Self { color }
    }
}

impl PixelShader for FlatShader {
    #[inline]
    fn shade(&self, _lambda: [f32; 3]) -> u32 {
        self.color
    }
}

/// Phong reflection coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.5,
            shininess: 32.0,
        }
    }
}

/// Re-weights screen-space barycentrics by inverse eye depth.
///
/// `w'ᵢ = (λᵢ / dᵢ) / Σ(λⱼ / dⱼ)`. Falls back to `lambda` when a depth is not
/// positive or the sum vanishes.
#[inline]
pub fn perspective_correct(lambda: [f32; 3], eye_depths: [f32; 3]) -> [f32; 3] {
    if eye_depths.iter().any(|d| d.is_nan() || *d <= 0.0) {
        return lambda;
    }
    let w = [
        lambda[0] / eye_depths[0],
        lambda[1] / eye_depths[1],
        lambda[2] / eye_depths[2],
    ];
    let sum = w[0] + w[1] + w[2];
    if sum.is_nan() || sum.abs() <= WEIGHT_EPSILON {
        return lambda;
    }
    [w[0] / sum, w[1] / sum, w[2] / sum]
}

/// Everything the Phong shader reads that is constant for a frame.
#[derive(Debug, Clone)]
pub struct ShadingUniforms {
    /// The light, already moved into view space.
    pub light: LightSource,
    pub material: Material,
    /// Maps normal-map texels into view space.
    pub normal_matrix: Mat4,
    pub textures: Arc<TextureSet>,
    pub texturing: bool,
}

/// Per-pixel Phong lighting in view space with optional diffuse, specular
/// and normal maps.
pub struct PhongShader<'a> {
    uniforms: &'a ShadingUniforms,
    eye: [Vec3; 3],
    normals: [Vec3; 3],
    uvs: [Vec3; 3],
    eye_depths: [f32; 3],
}

impl<'a> PhongShader<'a> {
    pub fn new(
        uniforms: &'a ShadingUniforms,
        eye: [Vec3; 3],
        normals: [Vec3; 3],
        uvs: [Vec3; 3],
    ) -> Self {
        Self {
            uniforms,
            eye,
            normals,
            uvs,
            // The camera looks down -Z.
            eye_depths: eye.map(|p| -p.z),
        }
    }
}

impl PixelShader for PhongShader<'_> {
    fn shade(&self, lambda: [f32; 3]) -> u32 {
        let u = self.uniforms;
        let material = &u.material;
        let light_color = u.light.color;

        let fragment = Vec3::blend(self.eye, lambda);
        let mut normal = Vec3::blend(self.normals, lambda).normalize_or_zero();

        let mut albedo = Vec3::ONE;
        let mut specular_strength = material.specular;

        if u.texturing {
            let uv = Vec3::blend(self.uvs, perspective_correct(lambda, self.eye_depths));
            let textures = &u.textures;

            if let Some(map) = &textures.diffuse {
                albedo = map.sample_color(uv.x, uv.y);
            }
            if let Some(map) = &textures.specular {
                specular_strength *= map.sample_intensity(uv.x, uv.y);
            }
            if let Some(map) = &textures.normal {
                normal = u
                    .normal_matrix
                    .transform_direction(map.sample_normal(uv.x, uv.y))
                    .normalize_or_zero();
            }
        }

        let to_light = (u.light.position - fragment).normalize_or_zero();
        let to_eye = (-fragment).normalize_or_zero();
        let reflected = (-to_light).reflect(normal);

        let diffuse = normal.dot(to_light).max(0.0);
        let specular = to_eye.dot(reflected).max(0.0).powf(material.shininess);

        let lit = (light_color * material.ambient
            + light_color * (material.diffuse * diffuse)
            + light_color * (specular_strength * specular))
            .hadamard(albedo);

        pack_color(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{rgb, unpack_color};
    use crate::texture::Texture;
    use approx::assert_relative_eq;

    const THIRD: f32 = 1.0 / 3.0;

    fn uniforms(light_z: f32, material: Material, textures: TextureSet) -> ShadingUniforms {
        ShadingUniforms {
            light: LightSource::new(Vec3::new(0.0, 0.0, light_z), Vec3::ONE),
            material,
            normal_matrix: Mat4::identity(),
            textures: Arc::new(textures),
            texturing: true,
        }
    }

    /// A triangle facing the camera at eye depth 2.
    fn facing_triangle(u: &ShadingUniforms) -> PhongShader<'_> {
        let eye = [
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        ];
        let normal = Vec3::new(0.0, 0.0, 1.0);
        PhongShader::new(u, eye, [normal; 3], [Vec3::new(0.5, 0.5, 0.0); 3])
    }

    #[test]
    fn perspective_weights_favour_nearer_vertices() {
        let corrected = perspective_correct([THIRD; 3], [1.0, 2.0, 4.0]);
        assert_relative_eq!(corrected[0], 4.0 / 7.0, epsilon = 1e-6);
        assert_relative_eq!(corrected[1], 2.0 / 7.0, epsilon = 1e-6);
        assert_relative_eq!(corrected[2], 1.0 / 7.0, epsilon = 1e-6);

        let uvs = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let affine = Vec3::blend(uvs, [THIRD; 3]);
        let correct = Vec3::blend(uvs, corrected);

        assert_relative_eq!(correct.x, 2.0 / 7.0, epsilon = 1e-6);
        assert_relative_eq!(correct.y, 1.0 / 7.0, epsilon = 1e-6);
        assert!((correct.x - affine.x).abs() > 0.04);
    }

    #[test]
    fn perspective_weights_fall_back_on_bad_depths() {
        let lambda = [0.2, 0.3, 0.5];
        assert_eq!(perspective_correct(lambda, [1.0, 0.0, 1.0]), lambda);
        assert_eq!(perspective_correct(lambda, [1.0, f32::NAN, 1.0]), lambda);
    }

    #[test]
    fn lit_face_gets_ambient_plus_diffuse() {
        let material = Material {
            ambient: 0.2,
            diffuse: 0.3,
            specular: 0.0,
            shininess: 8.0,
        };
        let u = uniforms(0.0, material, TextureSet::empty());

        let color = unpack_color(facing_triangle(&u).shade([0.0, 0.0, 1.0]));

        // Light at the eye, shading the apex (0, 1, -2).
        let to_light = Vec3::new(0.0, -1.0, 2.0).normalize();
        let expected = 0.2 + 0.3 * to_light.z;
        assert_relative_eq!(color.x, expected, epsilon = 1.0 / 255.0);
        assert_relative_eq!(color.y, color.x);
    }

    #[test]
    fn light_behind_face_leaves_ambient_only() {
        let material = Material {
            ambient: 0.4,
            ..Material::default()
        };
        let u = uniforms(-10.0, material, TextureSet::empty());

        let color = unpack_color(facing_triangle(&u).shade([THIRD; 3]));
        assert_relative_eq!(color.z, 0.4, epsilon = 1.0 / 255.0);
    }

    #[test]
    fn diffuse_map_modulates_light() {
        let material = Material {
            ambient: 1.0,
            diffuse: 0.0,
            specular: 0.0,
            shininess: 1.0,
        };
        let textures = TextureSet {
            diffuse: Some(Texture::solid(rgb(255, 0, 0))),
            ..TextureSet::default()
        };
        let u = uniforms(0.0, material, textures);

        assert_eq!(facing_triangle(&u).shade([THIRD; 3]), rgb(255, 0, 0));
    }

    #[test]
    fn black_specular_map_removes_highlight() {
        let material = Material {
            ambient: 0.0,
            diffuse: 0.0,
            specular: 1.0,
            shininess: 1.0,
        };
        let plain = uniforms(0.0, material, TextureSet::empty());
        let masked = uniforms(
            0.0,
            material,
            TextureSet {
                specular: Some(Texture::solid(rgb(0, 0, 0))),
                ..TextureSet::default()
            },
        );

        assert_ne!(facing_triangle(&plain).shade([THIRD; 3]), rgb(0, 0, 0));
        assert_eq!(facing_triangle(&masked).shade([THIRD; 3]), rgb(0, 0, 0));
    }

    #[test]
    fn highlight_takes_the_diffuse_texel_color() {
        let material = Material {
            ambient: 0.0,
            diffuse: 0.0,
            specular: 1.0,
            shininess: 1.0,
        };
        let textures = TextureSet {
            diffuse: Some(Texture::solid(rgb(255, 0, 0))),
            ..TextureSet::default()
        };
        let u = uniforms(0.0, material, textures);

        let color = unpack_color(facing_triangle(&u).shade([THIRD; 3]));
        assert!(color.x > 0.5, "highlight too dim: {color:?}");
        assert_eq!(color.y, 0.0);
        assert_eq!(color.z, 0.0);
    }

    #[test]
    fn filled_triangle_samples_texture_with_corrected_uvs() {
        use crate::render::framebuffer::FrameBuffer;
        use crate::render::rasterizer::fill_triangle;

        // Texel (col, row) encodes its own position.
        let texel = |col: u32, row: u32| rgb((col * 30) as u8, (row * 30) as u8, 0);
        let data = (0..8).flat_map(|row| (0..8).map(move |col| texel(col, row))).collect();
        let textures = TextureSet {
            diffuse: Some(Texture::from_pixels(8, 8, data).unwrap()),
            ..TextureSet::default()
        };
        let material = Material {
            ambient: 1.0,
            diffuse: 0.0,
            specular: 0.0,
            shininess: 1.0,
        };
        let u = uniforms(0.0, material, textures);

        let eye = [
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -2.0),
            Vec3::new(0.0, 1.0, -4.0),
        ];
        let uvs = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let shader = PhongShader::new(&u, eye, [Vec3::new(0.0, 0.0, 1.0); 3], uvs);

        let screen = [
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::new(64.0, 0.0, 0.5),
            Vec3::new(0.0, 64.0, 0.5),
        ];
        let buffer = FrameBuffer::new(64, 64, rgb(0, 0, 0));
        fill_triangle(screen, &buffer, &shader);

        // Screen weights at (21, 21) are [22, 21, 21] / 64. Affine UVs land on
        // texel (2, 4); depth-corrected UVs (0.278, 0.139) land on (1, 6).
        assert_eq!(buffer.get_pixel(21, 21), Some(texel(1, 6)));
        assert_ne!(texel(1, 6), texel(2, 4));
    }
}
