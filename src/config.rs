//! Renderer configuration loaded from TOML.
//!
//! Every key is optional; missing keys fall back to [`RenderConfig::default`].
//!
//! ```toml
//! width = 800
//! height = 600
//! threads = 4
//! clear_color = 0xFF1E1E1E
//! cull_mode = "back"          # or "none"
//! render_mode = "filled"      # "wireframe", "filled_wireframe"
//!
//! [material]
//! shininess = 16.0
//!
//! [reject]
//! reject_offscreen = false
//!
//! [light]
//! position = [1.0, 1.0, 2.0]
//! color = [1.0, 0.9, 0.8]
//!
//! [camera]
//! position = [0.0, 0.0, 2.5]
//! target = [0.0, 0.0, 0.0]
//! fov = 45.0
//!
//! [assets]
//! obj = "models/head.obj"
//! diffuse = "models/head_diffuse.png"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::camera::{Camera, MAX_FOV, MIN_FOV};
use crate::colors;
use crate::light::LightSource;
use crate::math::Vec3;
use crate::render::{CullMode, Material, RejectPolicy, RenderMode, RenderSettings};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        let light = LightSource::default();
        Self {
            position: light.position.to_array(),
            color: light.color.to_array(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 2.5],
            target: [0.0, 0.0, 0.0],
            fov: crate::camera::DEFAULT_FOV,
        }
    }
}

/// Files to load into the scene. Paths are used as given.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub obj: Option<PathBuf>,
    pub diffuse: Option<PathBuf>,
    pub specular: Option<PathBuf>,
    pub normal: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Worker threads; hardware concurrency when absent.
    pub threads: Option<usize>,
    pub clear_color: u32,
    pub wireframe_color: u32,
    pub texturing: bool,
    pub cull_mode: CullMode,
    pub render_mode: RenderMode,
    pub material: Material,
    pub reject: RejectPolicy,
    pub light: LightConfig,
    pub camera: CameraConfig,
    pub assets: AssetPaths,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let settings = RenderSettings::default();
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            threads: None,
            clear_color: settings.clear_color,
            wireframe_color: colors::WIREFRAME,
            texturing: settings.texturing,
            cull_mode: settings.cull_mode,
            render_mode: settings.render_mode,
            material: settings.material,
            reject: settings.reject,
            light: LightConfig::default(),
            camera: CameraConfig::default(),
            assets: AssetPaths::default(),
        }
    }
}

impl RenderConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be at least 1".to_string()));
        }
        let (min, max) = (self.reject.depth_min, self.reject.depth_max);
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ConfigError::Invalid(format!(
                "reject.depth_min ({min}) exceeds reject.depth_max ({max})"
            )));
        }
        if !(MIN_FOV..=MAX_FOV).contains(&self.camera.fov) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov must be within [{MIN_FOV}, {MAX_FOV}], got {}",
                self.camera.fov
            )));
        }
        Ok(())
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            clear_color: self.clear_color,
            material: self.material,
            texturing: self.texturing,
            cull_mode: self.cull_mode,
            reject: self.reject,
            render_mode: self.render_mode,
            wireframe_color: self.wireframe_color,
        }
    }

    pub fn light(&self) -> LightSource {
        LightSource::new(
            Vec3::from_array(self.light.position),
            Vec3::from_array(self.light.color),
        )
    }

    pub fn camera(&self) -> Camera {
        let mut camera = Camera::looking_at(
            Vec3::from_array(self.camera.position),
            Vec3::from_array(self.camera.target),
        );
        camera.set_fov(self.camera.fov);
        camera
    }
}
