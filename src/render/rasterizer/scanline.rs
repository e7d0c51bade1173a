//! Scanline triangle fill.
//!
//! # Algorithm Overview
//!
//! Vertices are snapped to integer pixels and sorted by Y. The triangle is
//! walked one row at a time from the top vertex down to (not including) the
//! bottom one. Every row intersects the long edge `v0 → v2` and one of the
//! two short edges, depending on which half of the triangle it is in:
//!
//! ```text
//!          v0
//!          /\            alpha = i / total_height       (long edge)
//!         /  \           beta  = i' / segment_height    (active short edge)
//!    A ─ /────\ ─ B      first half:  v0 → v1
//!       /   ___\ v1      second half: v1 → v2
//!      / __/
//!     /_/
//!   v2
//! ```
//!
//! Each pixel of the span `[left, right)` gets cross-product barycentric
//! weights relative to the original (unsorted) vertex order, so the caller's
//! per-vertex attributes stay in step without being shuffled.
//!
//! # References
//!
//! - Sokolov, "tinyrenderer", lesson 2
//! - Abrash, Michael, "Graphics Programming Black Book"

use super::shader::PixelShader;
use crate::math::{Vec2, Vec3};
use crate::render::framebuffer::FrameBuffer;

/// Below this |area| a pixel's barycentric weights are considered unstable.
const BARYCENTRIC_EPSILON: f32 = 1e-2;

/// Twice the signed area of the screen triangle `abc`.
///
/// With screen Y pointing down, a triangle that is counter-clockwise in world
/// space (front-facing) has a negative area here.
#[inline]
pub fn signed_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let (a, b, c) = (Vec2::new(a.x, a.y), Vec2::new(b.x, b.y), Vec2::new(c.x, c.y));
    (b - a).cross(c - a)
}

/// Barycentric weights of `p` with respect to `pts`, or `None` if the
/// triangle is too thin to resolve.
#[inline]
pub fn barycentric(pts: [Vec2; 3], p: Vec2) -> Option<[f32; 3]> {
    let [a, b, c] = pts;
    let u = Vec3::new(c.x - a.x, b.x - a.x, a.x - p.x)
        .cross(Vec3::new(c.y - a.y, b.y - a.y, a.y - p.y));

    if u.z.abs() < BARYCENTRIC_EPSILON {
        return None;
    }
    Some([1.0 - (u.x + u.y) / u.z, u.y / u.z, u.x / u.z])
}

/// Fills the screen triangle with depth testing and returns the number of
/// fragments that reached the buffer.
///
/// `screen` holds pixel `x`, `y` and depth `z`. Rows and spans are clipped to
/// the buffer, so vertices may lie arbitrarily far off screen. A triangle
/// whose snapped vertices share one row draws nothing.
pub fn fill_triangle<S: PixelShader + ?Sized>(
    screen: [Vec3; 3],
    buffer: &FrameBuffer,
    shader: &S,
) -> u32 {
    // Edge walking happens in f64: any finite f32 coordinate fits and the
    // differences below cannot overflow.
    let snapped = screen.map(|v| (v.x.floor() as f64, v.y.floor() as f64));
    let pts = snapped.map(|(x, y)| Vec2::new(x as f32, y as f32));
    let depths = screen.map(|v| v.z);

    let [mut t0, mut t1, mut t2] = snapped;
    if t0.1 == t1.1 && t0.1 == t2.1 {
        return 0;
    }

    // Sort by Y (ascending: top to bottom in screen space).
    if t0.1 > t1.1 {
        std::mem::swap(&mut t0, &mut t1);
    }
    if t0.1 > t2.1 {
        std::mem::swap(&mut t0, &mut t2);
    }
    if t1.1 > t2.1 {
        std::mem::swap(&mut t1, &mut t2);
    }

    let (x0, y0) = t0;
    let (x1, y1) = t1;
    let (x2, y2) = t2;

    let total_height = y2 - y0;
    let width = buffer.width() as f64;
    let height = buffer.height() as f64;
    let first_y = y0.clamp(0.0, height) as i32;
    let last_y = y2.clamp(0.0, height) as i32;

    let mut written = 0;
    for y in first_y..last_y {
        let i = y as f64 - y0;
        let second_half = i > y1 - y0 || y1 == y0;
        let segment_height = if second_half { y2 - y1 } else { y1 - y0 };
        let alpha = i / total_height;
        let beta = (i - if second_half { y1 - y0 } else { 0.0 }) / segment_height;

        let a = x0 + (x2 - x0) * alpha;
        let b = if second_half {
            x1 + (x2 - x1) * beta
        } else {
            x0 + (x1 - x0) * beta
        };
        let (left, right) = if a > b { (b, a) } else { (a, b) };
        let left = left.clamp(0.0, width) as i32;
        let right = right.clamp(0.0, width) as i32;

        for x in left..right {
            let Some(lambda) = barycentric(pts, Vec2::new(x as f32, y as f32)) else {
                continue;
            };
            let depth = lambda[0] * depths[0] + lambda[1] * depths[1] + lambda[2] * depths[2];

            if !buffer.depth_passes(x, y, depth) {
                continue;
            }
            if buffer.set_pixel_with_depth(x, y, depth, shader.shade(lambda)) {
                written += 1;
            }
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{rgb, BLACK};
    use crate::render::framebuffer::FAR_DEPTH;
    use crate::render::rasterizer::FlatShader;
    use approx::assert_relative_eq;

    fn covered(buffer: &FrameBuffer) -> usize {
        buffer.depths().iter().filter(|&&d| d < FAR_DEPTH).count()
    }

    #[test]
    fn barycentric_at_vertices_selects_that_vertex() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        for (i, p) in pts.iter().enumerate() {
            let lambda = barycentric(pts, *p).unwrap();
            for (j, w) in lambda.iter().enumerate() {
                assert_relative_eq!(*w, if i == j { 1.0 } else { 0.0 }, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn barycentric_rejects_collinear_points() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0)];
        assert!(barycentric(pts, Vec2::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn front_facing_triangles_have_negative_area() {
        // Counter-clockwise with Y up becomes clockwise once Y points down.
        let a = Vec3::new(0.0, 10.0, 0.5);
        let b = Vec3::new(10.0, 10.0, 0.5);
        let c = Vec3::new(0.0, 0.0, 0.5);
        assert!(signed_area(a, b, c) < 0.0);
        assert!(signed_area(a, c, b) > 0.0);
    }

    #[test]
    fn fill_covers_roughly_half_the_square() {
        let buffer = FrameBuffer::new(20, 20, BLACK);
        let tri = [
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::new(20.0, 0.0, 0.5),
            Vec3::new(0.0, 20.0, 0.5),
        ];

        let written = fill_triangle(tri, &buffer, &FlatShader::new(rgb(0, 255, 0)));

        assert_eq!(written as usize, covered(&buffer));
        assert!((180..=220).contains(&written), "{written} fragments");
        assert_eq!(buffer.get_pixel(1, 1), Some(rgb(0, 255, 0)));
        assert_eq!(buffer.get_pixel(18, 18), Some(BLACK));
    }

    #[test]
    fn flat_row_triangle_draws_nothing() {
        let buffer = FrameBuffer::new(10, 10, BLACK);
        let tri = [
            Vec3::new(1.0, 4.2, 0.5),
            Vec3::new(8.0, 4.9, 0.5),
            Vec3::new(5.0, 4.5, 0.5),
        ];
        assert_eq!(fill_triangle(tri, &buffer, &FlatShader::new(rgb(1, 1, 1))), 0);
        assert_eq!(covered(&buffer), 0);
    }

    #[test]
    fn partially_visible_triangle_is_clipped_to_buffer() {
        let buffer = FrameBuffer::new(8, 8, BLACK);
        let tri = [
            Vec3::new(-20.0, -20.0, 0.5),
            Vec3::new(40.0, -20.0, 0.5),
            Vec3::new(-20.0, 40.0, 0.5),
        ];
        assert_eq!(fill_triangle(tri, &buffer, &FlatShader::new(rgb(1, 1, 1))), 64);
    }

    #[test]
    fn depth_is_interpolated_across_the_span() {
        let buffer = FrameBuffer::new(11, 11, BLACK);
        let tri = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 1.0),
            Vec3::new(0.0, 10.0, 0.0),
        ];
        fill_triangle(tri, &buffer, &FlatShader::new(rgb(1, 1, 1)));
        assert_relative_eq!(buffer.depth_at(5, 0).unwrap(), 0.5, epsilon = 1e-5);
    }

    #[test]
    fn vertices_billions_of_pixels_away_are_clipped() {
        let buffer = FrameBuffer::new(16, 16, BLACK);
        let tri = [
            Vec3::new(-3.0e9, 0.0, 0.5),
            Vec3::new(0.0, 15.0, 0.5),
            Vec3::new(3.0e9, 0.0, 0.5),
        ];

        let written = fill_triangle(tri, &buffer, &FlatShader::new(rgb(0, 0, 255)));

        assert_eq!(written, 16 * 15);
        assert_eq!(buffer.get_pixel(8, 7), Some(rgb(0, 0, 255)));
        assert_eq!(buffer.get_pixel(8, 15), Some(BLACK));
    }
}
