//! A multithreaded CPU rasterizer.
//!
//! Each frame runs as a fixed sequence of parallel stages on a persistent
//! worker pool: vertex transform, normal transform and a scanline fill with
//! per-pixel Phong shading into a lock-free, depth-tested frame buffer.
//! SDL2 is used only to show the result (feature `window`).
//!
//! # Quick Start
//!
//! ```no_run
//! use rasterline::prelude::*;
//!
//! let mut renderer = Renderer::new(800, 600, RenderSettings::default(), None)?;
//! let scene = Scene::new(Mesh::unit_cube());
//! let stats = renderer.render(&scene);
//! let pixels = renderer.front_buffer().pixels();
//! # Ok::<(), rasterline::RenderError>(())
//! ```

pub mod camera;
pub mod colors;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod light;
pub mod math;
pub mod mesh;
pub mod parallel;
pub mod projection;
pub mod render;
pub mod scene;
pub mod texture;
pub mod transform;
#[cfg(feature = "window")]
pub mod window;

pub use config::{ConfigError, RenderConfig};
pub use engine::{Engine, EngineError};
pub use error::RenderError;
pub use mesh::{LoadError, Mesh};
pub use render::{FrameBuffer, FrameStats, RenderSettings, Renderer};
pub use scene::Scene;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::camera::{Camera, CameraController};
    pub use crate::config::RenderConfig;
    pub use crate::engine::Engine;
    pub use crate::input::InputState;
    pub use crate::light::LightSource;
    pub use crate::math::{Mat4, Vec2, Vec3, Vec4};
    pub use crate::mesh::Mesh;
    pub use crate::projection::Projection;
    pub use crate::render::{
        CullMode, FrameBuffer, FrameStats, Material, RenderMode, RenderSettings, Renderer,
    };
    pub use crate::scene::Scene;
    pub use crate::texture::{Texture, TextureSet};
    pub use crate::transform::Transform;

    #[cfg(feature = "window")]
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::rasterizer::{fill_triangle, FlatShader};
    pub use crate::render::FrameBuffer;
}
