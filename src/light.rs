//! Point light for the Phong shader.

use crate::math::{Mat4, Vec3};

/// A point light with a linear color.
///
/// The persistent light lives in world space. The renderer derives a
/// view-space copy once per frame with [`in_view_space`](Self::in_view_space)
/// and never writes back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub position: Vec3,
    /// Channels in `[0, 1]`.
    pub color: Vec3,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.0, 1.0, 2.0),
            color: Vec3::ONE,
        }
    }
}

impl LightSource {
    /// Creates a light; color channels are clamped to `[0, 1]`.
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            color: color.clamp(0.0, 1.0),
        }
    }

    /// Returns a copy with the position moved into the space of `view`.
    pub fn in_view_space(&self, view: &Mat4) -> Self {
        Self {
            position: view.transform_point(self.position),
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn color_is_clamped_to_unit_range() {
        let light = LightSource::new(Vec3::ZERO, Vec3::new(2.0, 0.5, -1.0));
        assert_eq!(light.color, Vec3::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn view_space_copy_leaves_original_untouched() {
        let light = LightSource::new(Vec3::new(0.0, 1.0, 0.0), Vec3::ONE);
        let view = Mat4::translation(0.0, 0.0, -3.0);

        let moved = light.in_view_space(&view);

        assert_relative_eq!(moved.position.z, -3.0);
        assert_relative_eq!(moved.position.y, 1.0);
        assert_eq!(light.position, Vec3::new(0.0, 1.0, 0.0));
    }
}
