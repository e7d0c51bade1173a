//! Frame orchestrator.
//!
//! [`Renderer::render`] runs one frame as a fixed sequence of parallel
//! stages, each closed by a barrier:
//!
//! ```text
//!   Idle ─► TransformingVertices ─► TransformingNormals ─► Rasterizing ─► Presenting ─► Idle
//!              dispatch+barrier        dispatch+barrier      dispatch+barrier   swap + callback
//! ```
//!
//! The orchestrator thread only blocks inside the barriers. Workers never
//! see two stages at once.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, trace};

use super::framebuffer::FrameBuffer;
use super::rasterizer::{
    rasterize_triangle, CullMode, Material, PhongShader, RasterState, RejectPolicy, RenderMode,
    ScreenTriangle, ShadingUniforms, TriangleOutcome,
};
use super::stages::{self, FrameGeometry, FrameMatrices};
use crate::colors;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::math::Mat4;
use crate::parallel::ParallelExecutionContext;
use crate::projection::Projection;
use crate::scene::Scene;

/// Where the orchestrator currently is within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameStage {
    #[default]
    Idle,
    TransformingVertices,
    TransformingNormals,
    Rasterizing,
    Presenting,
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameStage::Idle => write!(f, "Idle"),
            FrameStage::TransformingVertices => write!(f, "TransformingVertices"),
            FrameStage::TransformingNormals => write!(f, "TransformingNormals"),
            FrameStage::Rasterizing => write!(f, "Rasterizing"),
            FrameStage::Presenting => write!(f, "Presenting"),
        }
    }
}

/// Per-renderer pipeline switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub clear_color: u32,
    pub material: Material,
    /// Sample the scene's texture maps.
    pub texturing: bool,
    pub cull_mode: CullMode,
    pub reject: RejectPolicy,
    pub render_mode: RenderMode,
    pub wireframe_color: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: colors::BACKGROUND,
            material: Material::default(),
            texturing: true,
            cull_mode: CullMode::Back,
            reject: RejectPolicy::default(),
            render_mode: RenderMode::Filled,
            wireframe_color: colors::WIREFRAME,
        }
    }
}

impl RenderSettings {
    fn raster_state(&self) -> RasterState {
        RasterState {
            cull: self.cull_mode,
            reject: self.reject,
            mode: self.render_mode,
            wireframe_color: self.wireframe_color,
        }
    }
}

/// Triangle accounting for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub triangles: usize,
    pub culled: usize,
    pub degenerate: usize,
    pub rejected: usize,
    pub drawn: usize,
    /// Pixels written, fills and outlines together.
    pub fragments: u64,
}

impl FrameStats {
    fn record(&mut self, outcome: TriangleOutcome) {
        self.triangles += 1;
        match outcome {
            TriangleOutcome::Culled => self.culled += 1,
            TriangleOutcome::Degenerate => self.degenerate += 1,
            TriangleOutcome::Rejected => self.rejected += 1,
            TriangleOutcome::Drawn { fragments } => {
                self.drawn += 1;
                self.fragments += fragments as u64;
            }
        }
    }
}

type FrameReadyCallback = Box<dyn FnMut() + Send>;

/// Owns the worker pool and the double-buffered output.
pub struct Renderer {
    width: u32,
    height: u32,
    settings: RenderSettings,
    context: ParallelExecutionContext,
    front: Arc<FrameBuffer>,
    back: Arc<FrameBuffer>,
    stage: FrameStage,
    frame: u64,
    frame_ready: Option<FrameReadyCallback>,
}

impl Renderer {
    /// Creates a renderer with `workers` threads, or one per hardware thread
    /// when `None`.
    pub fn new(
        width: u32,
        height: u32,
        settings: RenderSettings,
        workers: Option<usize>,
    ) -> Result<Self, RenderError> {
        check_resolution(width, height)?;

        let context = match workers {
            Some(n) => ParallelExecutionContext::new(n)?,
            None => ParallelExecutionContext::with_available_parallelism()?,
        };
        info!(
            "renderer {width}x{height} with {} worker(s)",
            context.worker_count()
        );

        Ok(Self {
            width,
            height,
            front: Arc::new(FrameBuffer::new(width, height, settings.clear_color)),
            back: Arc::new(FrameBuffer::new(width, height, settings.clear_color)),
            settings,
            context,
            stage: FrameStage::Idle,
            frame: 0,
            frame_ready: None,
        })
    }

    pub fn from_config(config: &RenderConfig) -> Result<Self, RenderError> {
        Self::new(
            config.width,
            config.height,
            config.render_settings(),
            config.threads,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn worker_count(&self) -> usize {
        self.context.worker_count()
    }

    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// The most recently completed frame.
    pub fn front_buffer(&self) -> &FrameBuffer {
        &self.front
    }

    /// Called once per completed frame, right after the buffer swap.
    pub fn set_frame_ready_callback(&mut self, callback: impl FnMut() + Send + 'static) {
        self.frame_ready = Some(Box::new(callback));
    }

    /// Reallocates both buffers for a new output size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        check_resolution(width, height)?;
        self.width = width;
        self.height = height;
        self.front = Arc::new(FrameBuffer::new(width, height, self.settings.clear_color));
        self.back = Arc::new(FrameBuffer::new(width, height, self.settings.clear_color));
        debug!("resized to {width}x{height}");
        Ok(())
    }

    /// Exchanges the front and back buffers.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Renders one frame of `scene` into the back buffer, swaps, and fires
    /// the frame-ready callback.
    pub fn render(&mut self, scene: &Scene) -> FrameStats {
        self.frame += 1;
        let mesh = &scene.mesh;

        self.back.clear(self.settings.clear_color);

        let view = scene.camera.view_matrix();
        let projection = Projection::for_viewport(scene.camera.fov(), self.width, self.height);
        let matrices = FrameMatrices::new(
            scene.model.to_matrix(),
            view,
            projection.matrix(),
            Mat4::viewport(self.width as f32, self.height as f32),
        );

        self.enter(FrameStage::TransformingVertices);
        let (screen, eye) = stages::transform_vertices(&self.context, mesh, matrices);

        self.enter(FrameStage::TransformingNormals);
        let normals = stages::transform_normals(&self.context, mesh, matrices.normal_matrix);

        self.enter(FrameStage::Rasterizing);
        let geometry = Arc::new(FrameGeometry {
            mesh: Arc::clone(mesh),
            screen,
            eye,
            normals,
        });
        let uniforms = Arc::new(ShadingUniforms {
            light: scene.light.in_view_space(&view),
            material: self.settings.material,
            normal_matrix: matrices.normal_matrix,
            textures: Arc::clone(&scene.textures),
            texturing: self.settings.texturing,
        });
        let state = self.settings.raster_state();
        let buffer = Arc::clone(&self.back);

        let outcomes = self.context.map_ranges(mesh.triangle_count(), move |i| {
            let triangle = ScreenTriangle::gather(&geometry, &geometry.mesh.triangles()[i]);
            let shader = PhongShader::new(&uniforms, triangle.eye, triangle.normals, triangle.uvs);
            rasterize_triangle(triangle.screen, &buffer, &shader, &state)
        });

        let mut stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };
        for outcome in outcomes {
            stats.record(outcome);
        }

        self.enter(FrameStage::Presenting);
        self.swap();
        if let Some(callback) = self.frame_ready.as_mut() {
            callback();
        }

        self.enter(FrameStage::Idle);
        debug!("{stats:?}");
        stats
    }

    fn enter(&mut self, stage: FrameStage) {
        trace!("frame {}: {} -> {}", self.frame, self.stage, stage);
        self.stage = stage;
    }
}

fn check_resolution(width: u32, height: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(RenderError::InvalidResolution { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn zero_resolution_is_rejected() {
        assert!(matches!(
            Renderer::new(0, 10, RenderSettings::default(), Some(1)),
            Err(RenderError::InvalidResolution { width: 0, height: 10 })
        ));
    }

    #[test]
    fn render_swaps_and_notifies_once_per_frame() {
        let mut renderer = Renderer::new(32, 32, RenderSettings::default(), Some(2)).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        renderer.set_frame_ready_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let scene = Scene::new(Mesh::unit_cube());
        let first = renderer.render(&scene);
        let second = renderer.render(&scene);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!((first.frame, second.frame), (1, 2));
        assert_eq!(renderer.stage(), FrameStage::Idle);
        assert_eq!(first.triangles, 12);
        assert_eq!(first.drawn + first.culled + first.rejected + first.degenerate, 12);
        assert!(first.fragments > 0);
    }

    #[test]
    fn swap_exchanges_buffers() {
        let mut renderer = Renderer::new(4, 4, RenderSettings::default(), Some(1)).unwrap();
        renderer.back.clear(colors::WHITE);
        renderer.swap();
        assert_eq!(renderer.front_buffer().get_pixel(0, 0), Some(colors::WHITE));
    }
}
