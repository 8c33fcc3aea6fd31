//! Mouse and keyboard over the host's simulated input state

use std::rc::Rc;

use super::host::HeadlessHost;
use super::simulated_failure;
use crate::components::{InitContext, KeyboardComponent, MouseComponent, MouseState, PalComponents};
use crate::error::PalResult;
use crate::foundation::logging::pal_log;
use crate::foundation::math::Vector2i;
use crate::input::{Key, KeyModifiers, Scancode};
use crate::platform::{delegate_component, ComponentCore};

/// Global mouse state of the headless host
pub struct HeadlessMouseComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
}

impl HeadlessMouseComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessMouseComponent", PalComponents::MOUSE, "pal::mouse"),
            host,
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {}
}

delegate_component!(HeadlessMouseComponent);

impl MouseComponent for HeadlessMouseComponent {
    fn get_position(&self) -> PalResult<Vector2i> {
        Ok(self.host.input.borrow().cursor)
    }

    fn set_position(&self, position: Vector2i) -> PalResult<()> {
        self.host.input.borrow_mut().cursor = position;
        Ok(())
    }

    fn get_mouse_state(&self) -> PalResult<MouseState> {
        let input = self.host.input.borrow();
        Ok(MouseState {
            position: input.cursor,
            buttons: input.buttons,
            scroll: input.scroll,
        })
    }
}

/// Keyboard state of the headless host. Every layout maps like US QWERTY.
pub struct HeadlessKeyboardComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
}

impl HeadlessKeyboardComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessKeyboardComponent", PalComponents::KEYBOARD, "pal::keyboard"),
            host,
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)?;
        let layout = &self.host.options().keyboard_layout;
        if layout != "us" {
            pal_log!(self.core.logger(), Warn, "layout {layout} is simulated with the US mapping");
        }
        Ok(())
    }

    fn release_all(&self) {}
}

delegate_component!(HeadlessKeyboardComponent);

impl KeyboardComponent for HeadlessKeyboardComponent {
    fn supports_layouts(&self) -> bool {
        true
    }

    fn get_active_keyboard_layout(&self) -> PalResult<String> {
        Ok(self.host.options().keyboard_layout.clone())
    }

    fn get_scancode_from_key(&self, key: Key) -> PalResult<Scancode> {
        Ok(key.us_scancode())
    }

    fn get_key_from_scancode(&self, scancode: Scancode) -> PalResult<Key> {
        Ok(Key::from_us_scancode(scancode))
    }

    fn get_keyboard_state(&self) -> PalResult<Vec<Scancode>> {
        Ok(self.host.input.borrow().pressed.iter().copied().collect())
    }

    fn get_key_modifiers(&self) -> PalResult<KeyModifiers> {
        Ok(self.host.input.borrow().modifiers)
    }
}
