//! First-person camera
//!
//! # Coordinate System
//!
//! Uses a **right-handed** coordinate system:
//! - X: positive right
//! - Y: positive up
//! - Z: positive toward the viewer (the camera looks down -Z by default)
//!
//! # Orientation
//!
//! Orientation is stored as yaw/pitch in **degrees**; the front/right/up basis
//! is recomputed whenever they change.
//!
//! - **Yaw**: rotation around Y. -90° looks down -Z.
//! - **Pitch**: rotation around the camera's right axis, positive = look up,
//!   clamped to ±89° by the mouse handler.

use crate::input::InputState;
use crate::math::{Mat4, Vec3};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
/// World units per second.
pub const DEFAULT_SPEED: f32 = 1.0;
/// Degrees per pixel of mouse travel.
pub const DEFAULT_SENSITIVITY: f32 = 0.25;
pub const DEFAULT_FOV: f32 = 45.0;
pub const MIN_FOV: f32 = 1.0;
pub const MAX_FOV: f32 = 89.0;
const PITCH_LIMIT: f32 = 89.0;

/// Movement directions understood by [`Camera::process_keyboard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person camera with an orthonormal basis derived from yaw and pitch.
///
/// The renderer only reads [`view_matrix`](Self::view_matrix) and
/// [`fov`](Self::fov); all mutation goes through the `process_*` handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,

    yaw: f32,
    pitch: f32,

    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    /// Creates a camera at `position` looking down -Z.
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::UP, DEFAULT_YAW, DEFAULT_PITCH)
    }

    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::FORWARD,
            up: world_up,
            right: Vec3::RIGHT,
            world_up,
            yaw,
            pitch,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            fov: DEFAULT_FOV,
        };
        camera.update_vectors();
        camera
    }

    /// Creates a camera at `position` looking toward `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let direction = (target - position).normalize_or_zero();
        if direction == Vec3::ZERO {
            return Self::new(position);
        }
        let pitch = direction.y.clamp(-1.0, 1.0).asin().to_degrees();
        let yaw = direction.z.atan2(direction.x).to_degrees();
        Self::with_orientation(position, Vec3::UP, yaw, pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT))
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Sets the vertical field of view, clamped to `[MIN_FOV, MAX_FOV]`.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(MIN_FOV, MAX_FOV);
    }

    /// World → eye space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.world_up)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_seconds: f32) {
        let velocity = self.movement_speed * delta_seconds;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Mouse look. Offsets are in pixels; positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Zoom: scrolling up narrows the field of view.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.set_fov(self.fov - y_offset);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.front = front.normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

// =============================================================================
// Camera Controller
// =============================================================================

/// Maps polled input onto a [`Camera`].
#[derive(Debug, Clone)]
pub struct CameraController {
    /// Whether mouse look clamps pitch to ±89°.
    pub constrain_pitch: bool,
    /// Field-of-view change in degrees per wheel notch.
    pub zoom_step: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            constrain_pitch: true,
            zoom_step: 1.0,
        }
    }
}

impl CameraController {
    /// Updates the camera based on input state.
    ///
    /// # Input Mapping
    /// - W/S: Move forward/backward
    /// - A/D: Strafe left/right
    /// - Mouse: Look around
    /// - Wheel: Zoom (field of view)
    ///
    /// Returns `true` if the camera changed.
    pub fn update(&self, camera: &mut Camera, input: &InputState, delta_seconds: f32) -> bool {
        let before = camera.clone();

        if input.forward {
            camera.process_keyboard(CameraMovement::Forward, delta_seconds);
        }
        if input.back {
            camera.process_keyboard(CameraMovement::Backward, delta_seconds);
        }
        if input.left {
            camera.process_keyboard(CameraMovement::Left, delta_seconds);
        }
        if input.right {
            camera.process_keyboard(CameraMovement::Right, delta_seconds);
        }

        let (dx, dy) = input.mouse_delta;
        if dx != 0 || dy != 0 {
            // Screen Y grows downward; moving the mouse up looks up.
            camera.process_mouse_movement(dx as f32, -dy as f32, self.constrain_pitch);
        }

        if input.wheel != 0 {
            camera.process_mouse_scroll(input.wheel as f32 * self.zoom_step);
        }

        *camera != before
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn camera_starts_looking_down_negative_z() {
        let camera = Camera::new(Vec3::ZERO);
        assert_relative_eq!(camera.front().z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.front().x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.right().x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.up().y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn looking_at_origin_from_positive_z() {
        let camera = Camera::looking_at(Vec3::new(0.0, 0.0, 2.5), Vec3::ZERO);
        assert_relative_eq!(camera.yaw(), -90.0, epsilon = 1e-4);
        assert_relative_eq!(camera.pitch(), 0.0, epsilon = 1e-4);
        let origin = camera.view_matrix().transform_point(Vec3::ZERO);
        assert_relative_eq!(origin.z, -2.5, epsilon = 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_movement(0.0, 10_000.0, true);
        assert_relative_eq!(camera.pitch(), 89.0);
    }

    #[test]
    fn fov_is_clamped_between_one_and_eighty_nine() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_scroll(500.0);
        assert_relative_eq!(camera.fov(), MIN_FOV);
        camera.process_mouse_scroll(-500.0);
        assert_relative_eq!(camera.fov(), MAX_FOV);
    }

    #[test]
    fn move_forward_follows_front() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_keyboard(CameraMovement::Forward, 2.0);
        assert_relative_eq!(camera.position().z, -2.0, epsilon = 1e-5);
    }

    #[test]
    fn controller_reports_changes() {
        let controller = CameraController::default();
        let mut camera = Camera::new(Vec3::ZERO);

        assert!(!controller.update(&mut camera, &InputState::default(), 0.1));

        let input = InputState {
            right: true,
            ..InputState::default()
        };
        assert!(controller.update(&mut camera, &input, 0.5));
        assert_relative_eq!(camera.position().x, 0.5, epsilon = 1e-5);
    }
}
