use std::cell::RefCell;
use std::rc::Rc;

use super::host::{HeadlessHost, JoystickDevice, NativeId, NativeKind, JOYSTICK_SLOTS};
use super::simulated_failure;
use crate::components::{InitContext, JoystickComponent, PalComponents};
use crate::error::{PalError, PalResult};
use crate::foundation::handle::{HandleMap, JoystickHandle, JoystickKind};
use crate::foundation::logging::pal_log;
use crate::platform::{delegate_component, ComponentCore};

struct JoystickRecord {
    slot: usize,
    native: NativeId,
}

/// Joystick slots of the headless host
pub struct HeadlessJoystickComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
    opened: RefCell<HandleMap<JoystickKind, JoystickRecord>>,
}

impl HeadlessJoystickComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>) -> Self {
        Self {
            core: ComponentCore::new(
                "HeadlessJoystickComponent",
                PalComponents::JOYSTICK,
                "pal::joystick",
            ),
            host,
            opened: RefCell::new(HandleMap::new()),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {
        let logger = self.core.logger();
        for (_, record) in self.opened.borrow_mut().drain() {
            self.host.ledger().release_logged(record.native, &logger);
        }
    }

    fn check_slot(index: usize) -> PalResult<()> {
        if index >= JOYSTICK_SLOTS {
            return Err(PalError::Precondition(format!(
                "joystick slot {index} is out of range 0..{JOYSTICK_SLOTS}"
            )));
        }
        Ok(())
    }

    /// The device behind `handle`; an unplugged device makes the handle
    /// invalid
    fn device(&self, handle: JoystickHandle) -> PalResult<JoystickDevice> {
        let slot = self.opened.borrow().lookup(handle)?.slot;
        self.host
            .joystick(slot)
            .ok_or_else(|| PalError::invalid_handle(handle))
    }

    /// An open handle for `slot`, if any
    pub(crate) fn handle_for(&self, slot: usize) -> Option<JoystickHandle> {
        self.opened
            .borrow()
            .iter()
            .find(|(_, record)| record.slot == slot)
            .map(|(handle, _)| handle)
    }
}

delegate_component!(HeadlessJoystickComponent);

impl JoystickComponent for HeadlessJoystickComponent {
    fn get_slot_count(&self) -> usize {
        JOYSTICK_SLOTS
    }

    fn is_connected(&self, index: usize) -> PalResult<bool> {
        Self::check_slot(index)?;
        Ok(self.host.joystick(index).is_some())
    }

    fn open(&self, index: usize) -> PalResult<JoystickHandle> {
        Self::check_slot(index)?;
        let device = self
            .host
            .joystick(index)
            .ok_or_else(|| PalError::Precondition(format!("no joystick in slot {index}")))?;
        let native = self.host.ledger().allocate(NativeKind::Joystick);
        let handle = self.opened.borrow_mut().insert(JoystickRecord { slot: index, native });
        pal_log!(self.core.logger(), Info, "opened {} in slot {index}", device.config.name);
        Ok(handle)
    }

    fn close(&self, handle: JoystickHandle) -> PalResult<()> {
        if let Some(record) = self.opened.borrow_mut().remove(handle) {
            self.host.ledger().release(record.native)?;
        }
        Ok(())
    }

    fn get_name(&self, handle: JoystickHandle) -> PalResult<String> {
        Ok(self.device(handle)?.config.name)
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
