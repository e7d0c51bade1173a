//! Triangle setup, fill and shading.
//!
//! [`rasterize_triangle`] is the per-triangle entry point used by the raster
//! stage:
//!
//! 1. **Cull**: drop back faces by the sign of the screen-space area.
//! 2. **Reject**: drop the whole triangle if any vertex leaves the accepted
//!    depth range or the screen (see [`RejectPolicy`]). There is no clipping.
//! 3. **Fill**: [`fill_triangle`] walks scanlines and hands each pixel to a
//!    [`PixelShader`].
//! 4. **Outline**: optionally draw the edges with [`draw_line`].

mod line;
mod scanline;
mod shader;

pub use line::{draw_line, LINE_DEPTH_BIAS};
pub use scanline::{barycentric, fill_triangle, signed_area};
pub use shader::{perspective_correct, FlatShader, Material, PhongShader, PixelShader, ShadingUniforms};

use serde::Deserialize;

use super::framebuffer::FrameBuffer;
use super::stages::FrameGeometry;
use crate::colors;
use crate::math::Vec3;
use crate::mesh::Triangle;

/// Which faces are discarded before filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CullMode {
    /// Draw both windings.
    None,
    /// Discard triangles that are clockwise as seen from the camera.
    #[default]
    Back,
}

/// Whole-triangle acceptance thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RejectPolicy {
    /// Smallest accepted screen depth.
    pub depth_min: f32,
    /// Largest accepted screen depth.
    pub depth_max: f32,
    /// Reject triangles with any vertex outside the buffer.
    pub reject_offscreen: bool,
}

impl Default for RejectPolicy {
    fn default() -> Self {
        Self {
            depth_min: 0.0,
            depth_max: 1.0,
            reject_offscreen: true,
        }
    }
}

impl RejectPolicy {
    /// Whether the screen-space triangle must be discarded as a whole.
    ///
    /// Non-finite coordinates are always rejected.
    pub fn rejects(&self, screen: &[Vec3; 3], width: u32, height: u32) -> bool {
        let depth = self.depth_min..=self.depth_max;
        let xs = 0.0..width as f32;
        let ys = 0.0..height as f32;

        screen.iter().any(|v| {
            !v.is_finite()
                || !depth.contains(&v.z)
                || (self.reject_offscreen && !(xs.contains(&v.x) && ys.contains(&v.y)))
        })
    }
}

/// What gets drawn for each visible triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Filled,
    Wireframe,
    FilledWireframe,
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderMode::Filled => write!(f, "Filled"),
            RenderMode::Wireframe => write!(f, "Wireframe"),
            RenderMode::FilledWireframe => write!(f, "FilledWireframe"),
        }
    }
}

/// Fixed-function state for the raster stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterState {
    pub cull: CullMode,
    pub reject: RejectPolicy,
    pub mode: RenderMode,
    pub wireframe_color: u32,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            cull: CullMode::default(),
            reject: RejectPolicy::default(),
            mode: RenderMode::default(),
            wireframe_color: colors::WIREFRAME,
        }
    }
}

/// What happened to one submitted triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleOutcome {
    /// Back face under [`CullMode::Back`].
    Culled,
    /// Zero screen-space area.
    Degenerate,
    /// Failed the [`RejectPolicy`].
    Rejected,
    /// Reached the fill stage; `fragments` counts pixels that were written.
    Drawn { fragments: u32 },
}

/// One triangle's per-vertex data gathered from the frame geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    pub screen: [Vec3; 3],
    pub eye: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub uvs: [Vec3; 3],
}

impl ScreenTriangle {
    pub fn gather(geometry: &FrameGeometry, triangle: &Triangle) -> Self {
        let texcoords = geometry.mesh.texcoords();
        Self {
            screen: triangle.vertices.map(|i| geometry.screen[i as usize]),
            eye: triangle.vertices.map(|i| geometry.eye[i as usize]),
            normals: triangle.normals.map(|i| geometry.normals[i as usize]),
            uvs: triangle.texcoords.map(|i| texcoords[i as usize]),
        }
    }
}

/// Culls, rejects, fills and outlines one screen-space triangle.
pub fn rasterize_triangle<S: PixelShader + ?Sized>(
    screen: [Vec3; 3],
    buffer: &FrameBuffer,
    shader: &S,
    state: &RasterState,
) -> TriangleOutcome {
    let [a, b, c] = screen;
    let area = signed_area(a, b, c);

    if area == 0.0 {
        return TriangleOutcome::Degenerate;
    }
    if state.cull == CullMode::Back && area > 0.0 {
        return TriangleOutcome::Culled;
    }
    if state.reject.rejects(&screen, buffer.width(), buffer.height()) {
        return TriangleOutcome::Rejected;
    }

    let mut fragments = 0;
    if state.mode != RenderMode::Wireframe {
        fragments += fill_triangle(screen, buffer, shader);
    }
    if state.mode != RenderMode::Filled {
        for (from, to) in [(a, b), (b, c), (c, a)] {
            fragments += draw_line(buffer, from, to, state.wireframe_color);
        }
    }
    TriangleOutcome::Drawn { fragments }
}
