//! Vertex and normal transform stages.
//!
//! Both stages read the shared, immutable [`Mesh`] and produce fresh
//! per-frame arrays; the mesh itself is never written. Each is a parallel map
//! over an index range on the renderer's [`ParallelExecutionContext`].

use std::sync::Arc;

use log::warn;

use crate::math::{Mat4, Vec3, Vec4};
use crate::mesh::Mesh;
use crate::parallel::ParallelExecutionContext;

/// Matrices of one frame, composed once on the orchestrator thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    /// `view · model`: object → eye space.
    pub model_view: Mat4,
    /// `viewport · projection · view · model`: object → screen space before
    /// the perspective divide.
    pub full: Mat4,
    /// Inverse-transpose of `model_view`.
    pub normal_matrix: Mat4,
}

impl FrameMatrices {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4, viewport: Mat4) -> Self {
        let model_view = view * model;
        Self {
            model_view,
            full: viewport * projection * model_view,
            normal_matrix: normal_matrix(&model_view),
        }
    }
}

/// Inverse-transpose of `model_view`, or identity if it is singular.
pub fn normal_matrix(model_view: &Mat4) -> Mat4 {
    match model_view.inverse() {
        Some(inverse) => inverse.transpose(),
        None => {
            warn!("model-view matrix is singular; normals left untransformed");
            Mat4::identity()
        }
    }
}

/// Screen-space (`x`, `y` in pixels, `z` depth) and eye-space position of one
/// vertex.
#[inline]
pub fn transform_vertex(matrices: &FrameMatrices, position: Vec4) -> (Vec3, Vec3) {
    let screen = (matrices.full * position).perspective_divide().to_vec3();
    let eye = (matrices.model_view * position).to_vec3();
    (screen, eye)
}

#[inline]
pub fn transform_normal(normal_matrix: &Mat4, normal: Vec3) -> Vec3 {
    normal_matrix.transform_direction(normal).normalize_or_zero()
}

/// Per-frame working copy of the mesh, indexed like the mesh arrays.
#[derive(Debug)]
pub struct FrameGeometry {
    pub mesh: Arc<Mesh>,
    pub screen: Vec<Vec3>,
    pub eye: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

/// Vertex stage: returns `(screen, eye)` arrays in vertex order.
pub fn transform_vertices(
    context: &ParallelExecutionContext,
    mesh: &Arc<Mesh>,
    matrices: FrameMatrices,
) -> (Vec<Vec3>, Vec<Vec3>) {
    let source = Arc::clone(mesh);
    context
        .map_ranges(mesh.vertex_count(), move |i| {
            transform_vertex(&matrices, source.vertices()[i])
        })
        .into_iter()
        .unzip()
}

/// Normal stage: view-space unit normals in normal order.
pub fn transform_normals(
    context: &ParallelExecutionContext,
    mesh: &Arc<Mesh>,
    normal_matrix: Mat4,
) -> Vec<Vec3> {
    let source = Arc::clone(mesh);
    context.map_ranges(mesh.normals().len(), move |i| {
        transform_normal(&normal_matrix, source.normals()[i])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Projection;
    use approx::assert_relative_eq;

    fn matrices_for(width: u32, height: u32, eye_z: f32) -> FrameMatrices {
        FrameMatrices::new(
            Mat4::identity(),
            Mat4::look_at_rh(Vec3::new(0.0, 0.0, eye_z), Vec3::ZERO, Vec3::UP),
            Projection::for_viewport(45.0, width, height).matrix(),
            Mat4::viewport(width as f32, height as f32),
        )
    }

    #[test]
    fn origin_lands_in_screen_centre() {
        let m = matrices_for(100, 50, 2.5);
        let (screen, eye) = transform_vertex(&m, Vec4::point(0.0, 0.0, 0.0));

        assert_relative_eq!(screen.x, 50.0, epsilon = 1e-3);
        assert_relative_eq!(screen.y, 25.0, epsilon = 1e-3);
        assert!(screen.z > 0.0 && screen.z < 1.0);
        assert_relative_eq!(eye.z, -2.5, epsilon = 1e-5);
    }

    #[test]
    fn upward_points_move_up_the_screen() {
        let m = matrices_for(100, 100, 2.5);
        let (above, _) = transform_vertex(&m, Vec4::point(0.0, 0.5, 0.0));
        assert!(above.y < 50.0);
    }

    #[test]
    fn normals_survive_non_uniform_scale() {
        // A plane tilted 45° and squashed in Y; the inverse-transpose keeps
        // its normal perpendicular to the surface.
        let model = Mat4::scaling(1.0, 0.5, 1.0);
        let normal_matrix = normal_matrix(&model);
        let n = transform_normal(&normal_matrix, Vec3::new(0.0, 1.0, 1.0).normalize());
        let tangent = model.transform_direction(Vec3::new(0.0, 1.0, -1.0));

        assert_relative_eq!(n.dot(tangent), 0.0, epsilon = 1e-5);
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn singular_model_view_falls_back_to_identity() {
        assert_eq!(normal_matrix(&Mat4::scaling(1.0, 0.0, 1.0)), Mat4::identity());
    }

    #[test]
    fn parallel_stages_match_serial_transform() {
        let context = ParallelExecutionContext::new(3).unwrap();
        let mesh = Arc::new(Mesh::uv_sphere(12, 6));
        let m = matrices_for(64, 64, 3.0);

        let (screen, eye) = transform_vertices(&context, &mesh, m);
        let normals = transform_normals(&context, &mesh, m.normal_matrix);

        assert_eq!(screen.len(), mesh.vertex_count());
        for (i, v) in mesh.vertices().iter().enumerate() {
            assert_eq!((screen[i], eye[i]), transform_vertex(&m, *v));
        }
        for (i, n) in mesh.normals().iter().enumerate() {
            assert_eq!(normals[i], transform_normal(&m.normal_matrix, *n));
        }
    }
}
