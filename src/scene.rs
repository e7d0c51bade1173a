//! Everything one frame is rendered from.

use std::sync::Arc;

use crate::camera::Camera;
use crate::light::LightSource;
use crate::math::Vec3;
use crate::mesh::Mesh;
use crate::texture::TextureSet;
use crate::transform::Transform;

/// A single mesh lit by a single point light, seen through one camera.
///
/// Mesh and textures sit behind `Arc` so the raster workers can share them
/// read-only during a frame. Reloading replaces them wholesale between
/// frames.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub mesh: Arc<Mesh>,
    pub light: LightSource,
    pub textures: Arc<TextureSet>,
    /// Object → world transform of the mesh.
    pub model: Transform,
}

impl Scene {
    /// Default framing: camera at `(0, 0, 2.5)` looking at the origin,
    /// default light, no textures.
    pub fn new(mesh: Mesh) -> Self {
        Self {
            camera: Camera::looking_at(Vec3::new(0.0, 0.0, 2.5), Vec3::ZERO),
            mesh: Arc::new(mesh),
            light: LightSource::default(),
            textures: Arc::new(TextureSet::empty()),
            model: Transform::new(),
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_light(mut self, light: LightSource) -> Self {
        self.light = light;
        self
    }

    pub fn with_textures(mut self, textures: TextureSet) -> Self {
        self.textures = Arc::new(textures);
        self
    }

    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.mesh = Arc::new(mesh);
    }

    pub fn set_textures(&mut self, textures: TextureSet) {
        self.textures = Arc::new(textures);
    }
}
