//! Depth-tested Bresenham lines for the wireframe overlay.

use crate::math::Vec3;
use crate::render::framebuffer::FrameBuffer;

/// Pulls edges slightly toward the camera so they win against their own face.
pub const LINE_DEPTH_BIAS: f32 = 1e-4;

/// Endpoints further than this from the origin (in pixels) are not drawn.
const GUARD_BAND: f32 = 16_384.0;

/// Draws a line from `a` to `b` (pixel `x`, `y`, depth `z`) and returns the
/// number of pixels written.
///
/// Bresenham's algorithm steps along the major axis and tracks an integer
/// error term to decide when to also step along the minor axis. Depth is
/// interpolated linearly in screen space.
pub fn draw_line(buffer: &FrameBuffer, a: Vec3, b: Vec3, color: u32) -> u32 {
    let in_band = |v: Vec3| v.is_finite() && v.x.abs() <= GUARD_BAND && v.y.abs() <= GUARD_BAND;
    if !in_band(a) || !in_band(b) {
        return 0;
    }

    let (x0, y0) = (a.x.floor() as i32, a.y.floor() as i32);
    let (x1, y1) = (b.x.floor() as i32, b.y.floor() as i32);
    let (z0, z1) = (a.z - LINE_DEPTH_BIAS, b.z - LINE_DEPTH_BIAS);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let steps = dx.max(dy);

    let x_step = if x0 < x1 { 1 } else { -1 };
    let y_step = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;
    let (mut x, mut y) = (x0, y0);
    let mut written = 0;

    for step in 0..=steps {
        let t = if steps == 0 { 0.0 } else { step as f32 / steps as f32 };
        if buffer.set_pixel_with_depth(x, y, z0 + t * (z1 - z0), color) {
            written += 1;
        }

        // A positive error favours x, a negative one favours y; both can
        // fire for a diagonal step.
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += x_step;
        }
        if e2 < dx {
            err += dx;
            y += y_step;
        }
    }
    written
}
