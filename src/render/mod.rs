//! The render pipeline: frame buffer, transform stages, rasterizer and the
//! orchestrator that sequences them.

pub mod framebuffer;
pub mod rasterizer;
pub mod renderer;
pub mod stages;

pub use framebuffer::{FrameBuffer, FAR_DEPTH};
pub use rasterizer::{CullMode, Material, RasterState, RejectPolicy, RenderMode, TriangleOutcome};
pub use renderer::{FrameStage, FrameStats, RenderSettings, Renderer};
pub use stages::{FrameGeometry, FrameMatrices};
