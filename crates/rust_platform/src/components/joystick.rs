//! Joystick capability

use super::PalComponent;
use crate::error::PalResult;
use crate::foundation::handle::JoystickHandle;

/// Joysticks and gamepads, addressed by slot index
pub trait JoystickComponent: PalComponent {
    /// Number of joystick slots the backend polls
    fn get_slot_count(&self) -> usize;

    /// True if a device sits in slot `index`
    fn is_connected(&self, index: usize) -> PalResult<bool>;

    /// Open the device in slot `index`
    fn open(&self, index: usize) -> PalResult<JoystickHandle>;

    /// Close a joystick; closing twice is a no-op
    fn close(&self, handle: JoystickHandle) -> PalResult<()>;

    /// Device name
    fn get_name(&self, handle: JoystickHandle) -> PalResult<String>;

    /// Number of axes
    fn get_axis_count(&self, handle: JoystickHandle) -> PalResult<usize>;

    /// Axis value in `-1.0..=1.0`
    fn get_axis(&self, handle: JoystickHandle, axis: usize) -> PalResult<f32>;

    /// Number of buttons
    fn get_button_count(&self, handle: JoystickHandle) -> PalResult<usize>;

    /// True while the button is held
    fn get_button(&self, handle: JoystickHandle, button: usize) -> PalResult<bool>;
}
