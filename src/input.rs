//! Platform-independent snapshot of user input for one frame.

/// Held keys and accumulated pointer motion since the previous frame.
///
/// Filled by the window layer, consumed by the camera controller and the
/// model rotation in [`crate::engine::Engine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,

    /// Arrow keys: rotate the model.
    pub turn_up: bool,
    pub turn_down: bool,
    pub turn_left: bool,
    pub turn_right: bool,

    /// Relative mouse motion in pixels (x right, y down).
    pub mouse_delta: (i32, i32),
    /// Wheel notches, positive away from the user.
    pub wheel: i32,
}

impl InputState {
    /// Clears the per-frame accumulators while keeping held keys.
    pub fn end_frame(&mut self) {
        self.mouse_delta = (0, 0);
        self.wheel = 0;
    }
}
