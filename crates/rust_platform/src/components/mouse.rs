//! Mouse capability

use super::PalComponent;
use crate::error::PalResult;
use crate::foundation::math::{Vec2, Vector2i};
use crate::input::MouseButtonFlags;

/// Global mouse state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseState {
    /// Cursor position on the virtual desktop
    pub position: Vector2i,
    /// Pressed buttons
    pub buttons: MouseButtonFlags,
    /// Accumulated scroll since startup
    pub scroll: Vec2,
}

/// Global cursor position and button state
pub trait MouseComponent: PalComponent {
    /// Cursor position on the virtual desktop
    fn get_position(&self) -> PalResult<Vector2i>;

    /// Warp the cursor
    fn set_position(&self, position: Vector2i) -> PalResult<()>;

    /// Position, buttons and accumulated scroll
    fn get_mouse_state(&self) -> PalResult<MouseState>;
}
