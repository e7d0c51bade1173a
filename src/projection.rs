//! Perspective projection parameters.
//!
//! The [`Projection`] struct is the single source of truth for the frame's
//! projection: vertical FOV, aspect ratio and the fixed near/far planes.

use crate::math::Mat4;

/// Near plane distance; maps to depth 0.
pub const NEAR_PLANE: f32 = 0.1;
/// Far plane distance; maps to depth 1.
pub const FAR_PLANE: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    fov_y: f32,
    /// Aspect ratio (width / height).
    aspect_ratio: f32,
    z_near: f32,
    z_far: f32,
}

impl Projection {
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Width divided by height
    /// * `z_near` - Near plane distance (must be > 0)
    /// * `z_far` - Far plane distance (must be > z_near)
    pub fn new(fov_y: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y,
            aspect_ratio,
            z_near,
            z_far,
        }
    }

    /// Projection for a `width`×`height` target with the standard planes.
    pub fn for_viewport(fov_y_degrees: f32, width: u32, height: u32) -> Self {
        Self::new(
            fov_y_degrees.to_radians(),
            width as f32 / height.max(1) as f32,
            NEAR_PLANE,
            FAR_PLANE,
        )
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Right-handed projection with depth mapped to `[0, 1]`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.z_near, self.z_far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn for_viewport_uses_standard_planes() {
        let projection = Projection::for_viewport(45.0, 200, 100);
        assert_relative_eq!(projection.aspect_ratio(), 2.0);
        assert_relative_eq!(projection.z_near(), NEAR_PLANE);
        assert_relative_eq!(projection.z_far(), FAR_PLANE);
        assert_relative_eq!(projection.fov_y(), 45f32.to_radians());
    }

    #[test]
    fn near_plane_maps_to_zero_depth() {
        let m = Projection::for_viewport(60.0, 4, 3).matrix();
        let clip = m * Vec4::point(0.0, 0.0, -NEAR_PLANE);
        assert_relative_eq!(clip.perspective_divide().z, 0.0, epsilon = 1e-5);
    }
}
