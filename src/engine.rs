//! Interactive host around the renderer.
//!
//! The [`Engine`] owns a [`Renderer`] and a [`Scene`], turns per-frame
//! [`InputState`] into camera and model motion, and re-renders when
//! something changed.

use log::info;
use thiserror::Error;

use crate::camera::CameraController;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::input::InputState;
use crate::math::Vec3;
use crate::mesh::{LoadError, Mesh};
use crate::render::{FrameStats, Renderer};
use crate::scene::Scene;
use crate::texture::{TextureError, TextureSet};

/// Model rotation speed for the arrow keys, in degrees per second.
pub const MODEL_TURN_RATE: f32 = 90.0;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Builds the scene described by `config`: the configured OBJ file or the
/// unit cube, its texture maps, the light and the initial camera.
pub fn load_scene(config: &RenderConfig) -> Result<Scene, EngineError> {
    let mesh = match &config.assets.obj {
        Some(path) => Mesh::from_obj(path)?,
        None => Mesh::unit_cube(),
    };
    let textures = TextureSet::load(
        config.assets.diffuse.as_deref(),
        config.assets.specular.as_deref(),
        config.assets.normal.as_deref(),
    )?;

    info!(
        "scene '{}': {} triangles, textures {}",
        mesh.name(),
        mesh.triangle_count(),
        if textures.is_empty() { "none" } else { "loaded" }
    );

    Ok(Scene::new(mesh)
        .with_camera(config.camera())
        .with_light(config.light())
        .with_textures(textures))
}

pub struct Engine {
    renderer: Renderer,
    scene: Scene,
    controller: CameraController,
    /// Model yaw and pitch in degrees.
    model_yaw: f32,
    model_pitch: f32,
    dirty: bool,
}

impl Engine {
    pub fn new(config: &RenderConfig) -> Result<Self, EngineError> {
        Ok(Self {
            renderer: Renderer::from_config(config)?,
            scene: load_scene(config)?,
            controller: CameraController::default(),
            model_yaw: 0.0,
            model_pitch: 0.0,
            dirty: true,
        })
    }

    /// Replaces mesh and textures; camera, light and model rotation stay.
    pub fn reload_scene(&mut self, config: &RenderConfig) -> Result<(), EngineError> {
        let fresh = load_scene(config)?;
        self.scene.mesh = fresh.mesh;
        self.scene.textures = fresh.textures;
        self.dirty = true;
        Ok(())
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        self.dirty = true;
        &mut self.scene
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.renderer.resize(width, height)?;
        self.dirty = true;
        Ok(())
    }

    /// Applies one frame of input. Returns `true` if the next frame differs.
    ///
    /// # Input Mapping
    /// - W/A/S/D, mouse, wheel: camera (see [`CameraController`])
    /// - Up/Down: tilt the model around X
    /// - Left/Right: turn the model around Y
    pub fn update(&mut self, input: &InputState, delta_seconds: f32) -> bool {
        if self.controller.update(&mut self.scene.camera, input, delta_seconds) {
            self.dirty = true;
        }

        let step = MODEL_TURN_RATE * delta_seconds;
        let mut turned = false;
        if input.turn_up {
            self.model_pitch -= step;
            turned = true;
        }
        if input.turn_down {
            self.model_pitch += step;
            turned = true;
        }
        if input.turn_left {
            self.model_yaw += step;
            turned = true;
        }
        if input.turn_right {
            self.model_yaw -= step;
            turned = true;
        }
        if turned {
            self.scene.model.set_rotation(Vec3::new(
                self.model_pitch.to_radians(),
                self.model_yaw.to_radians(),
                0.0,
            ));
            self.dirty = true;
        }

        self.dirty
    }

    /// Renders a frame unconditionally.
    pub fn render(&mut self) -> FrameStats {
        self.dirty = false;
        self.renderer.render(&self.scene)
    }

    /// Renders only if input or a resize changed something since the last
    /// frame.
    pub fn render_if_needed(&mut self) -> Option<FrameStats> {
        self.dirty.then(|| self.render())
    }
}
