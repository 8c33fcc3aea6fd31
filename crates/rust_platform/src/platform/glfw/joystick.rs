use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::GlfwShared;
use crate::components::{InitContext, JoystickComponent, PalComponents};
use crate::error::{PalError, PalResult};
use crate::events::{EventQueue, PlatformEvent};
use crate::foundation::handle::{HandleMap, JoystickHandle, JoystickKind};
use crate::foundation::logging::pal_log;
use crate::platform::{delegate_component, ComponentCore};

/// GLFW polls `GLFW_JOYSTICK_1` through `GLFW_JOYSTICK_LAST`
const JOYSTICK_SLOTS: usize = 16;

struct DeviceState {
    name: String,
    axes: Vec<f32>,
    buttons: Vec<bool>,
}

/// Joysticks polled through GLFW
pub struct GlfwJoystickComponent {
    core: ComponentCore,
    shared: Rc<GlfwShared>,
    opened: RefCell<HandleMap<JoystickKind, usize>>,
    /// Bit per slot, set while a device is present
    present: Cell<u16>,
}

impl GlfwJoystickComponent {
    pub(crate) fn new(shared: Rc<GlfwShared>) -> Self {
        Self {
            core: ComponentCore::new("GlfwJoystickComponent", PalComponents::JOYSTICK, "pal::joystick"),
            shared,
            opened: RefCell::new(HandleMap::new()),
            present: Cell::new(0),
        }
    }

    fn prepare(&self, _context: &InitContext<'_>) -> PalResult<()> {
        self.present.set(self.scan());
        Ok(())
    }

    fn release_all(&self) {
        self.opened.borrow_mut().drain();
    }

    fn check_slot(index: usize) -> PalResult<glfw::JoystickId> {
        i32::try_from(index)
            .ok()
            .filter(|_| index < JOYSTICK_SLOTS)
            .and_then(glfw::JoystickId::from_i32)
            .ok_or_else(|| {
                PalError::Precondition(format!(
                    "joystick slot {index} is out of range 0..{JOYSTICK_SLOTS}"
                ))
            })
    }

    fn read(&self, index: usize) -> Option<DeviceState> {
        let id = Self::check_slot(index).ok()?;
        let joystick = self.shared.glfw().get_joystick(id);
        if !joystick.is_present() {
            return None;
        }
        Some(DeviceState {
            name: joystick
                .get_name()
                .unwrap_or_else(|| format!("Joystick {index}")),
            axes: joystick.get_axes(),
            buttons: joystick.get_buttons().into_iter().map(|b| b != 0).collect(),
        })
    }

    fn scan(&self) -> u16 {
        (0..JOYSTICK_SLOTS)
            .filter(|&slot| self.read(slot).is_some())
            .fold(0, |bits, slot| bits | (1 << slot))
    }

    fn device(&self, handle: JoystickHandle) -> PalResult<DeviceState> {
        let slot = *self.opened.borrow().lookup(handle)?;
        self.read(slot).ok_or_else(|| PalError::invalid_handle(handle))
    }

    fn handle_for(&self, slot: usize) -> Option<JoystickHandle> {
        self.opened
            .borrow()
            .iter()
            .find(|(_, &opened)| opened == slot)
            .map(|(handle, _)| handle)
    }

    /// Compare present devices with the last poll and queue connection events
    pub(crate) fn poll_connections(&self, queue: &EventQueue) {
        let now = self.scan();
        let changed = now ^ self.present.replace(now);
        for slot in (0..JOYSTICK_SLOTS).filter(|slot| changed & (1 << slot) != 0) {
            let connected = now & (1 << slot) != 0;
            pal_log!(
                self.core.logger(),
                Info,
                "joystick slot {slot} {}",
                if connected { "connected" } else { "disconnected" }
            );
            queue.push(PlatformEvent::JoystickConnection {
                index: slot,
                joystick: self.handle_for(slot),
                connected,
            });
        }
    }
}

delegate_component!(GlfwJoystickComponent);

impl JoystickComponent for GlfwJoystickComponent {
    fn get_slot_count(&self) -> usize {
        JOYSTICK_SLOTS
    }

    fn is_connected(&self, index: usize) -> PalResult<bool> {
        Self::check_slot(index)?;
        Ok(self.read(index).is_some())
    }

    fn open(&self, index: usize) -> PalResult<JoystickHandle> {
        Self::check_slot(index)?;
        let device = self
            .read(index)
            .ok_or_else(|| PalError::Precondition(format!("no joystick in slot {index}")))?;
        let handle = self.opened.borrow_mut().insert(index);
        pal_log!(self.core.logger(), Info, "opened {} in slot {index}", device.name);
        Ok(handle)
    }

    fn close(&self, handle: JoystickHandle) -> PalResult<()> {
        self.opened.borrow_mut().remove(handle);
        Ok(())
    }

    fn get_name(&self, handle: JoystickHandle) -> PalResult<String> {
        Ok(self.device(handle)?.name)
    }

    fn get_axis_count(&self, handle: JoystickHandle) -> PalResult<usize> {
        Ok(self.device(handle)?.axes.len())
    }

    fn get_axis(&self, handle: JoystickHandle, axis: usize) -> PalResult<f32> {
        let device = self.device(handle)?;
        device.axes.get(axis).copied().ok_or_else(|| {
            PalError::Precondition(format!("axis {axis} out of range 0..{}", device.axes.len()))
        })
    }

    fn get_button_count(&self, handle: JoystickHandle) -> PalResult<usize> {
        Ok(self.device(handle)?.buttons.len())
    }

    fn get_button(&self, handle: JoystickHandle, button: usize) -> PalResult<bool> {
        let device = self.device(handle)?;
        device.buttons.get(button).copied().ok_or_else(|| {
            PalError::Precondition(format!(
                "button {button} out of range 0..{}",
                device.buttons.len()
            ))
        })
    }
}
