//! Mouse and keyboard, read through the focused GLFW window
//!
//! GLFW only reports input relative to its own windows, so both components
//! need at least one open window.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::keys::{to_glfw_button, to_glfw_key};
use super::window::GlfwWindowComponent;
use crate::components::{InitContext, KeyboardComponent, MouseComponent, MouseState, PalComponents};
use crate::error::{PalError, PalResult};
use crate::events::{EventQueue, PlatformEvent, PlatformEventType, SubscriptionId};
use crate::foundation::math::{Vec2, Vector2i};
use crate::input::{Key, KeyModifiers, MouseButton, MouseButtonFlags, Scancode};
use crate::platform::{delegate_component, ComponentCore};

const BUTTONS: [MouseButton; 5] = [
    MouseButton::Left,
    MouseButton::Right,
    MouseButton::Middle,
    MouseButton::Button4,
    MouseButton::Button5,
];

fn no_window() -> PalError {
    PalError::Precondition("GLFW reports input only while a window is open".to_string())
}

/// Cursor position and buttons of the focused window, on the virtual desktop
pub struct GlfwMouseComponent {
    core: ComponentCore,
    windows: Rc<GlfwWindowComponent>,
    scroll: Rc<Cell<Vec2>>,
    subscription: RefCell<Option<(Rc<EventQueue>, SubscriptionId)>>,
}

impl GlfwMouseComponent {
    pub(crate) fn new(windows: Rc<GlfwWindowComponent>) -> Self {
        Self {
            core: ComponentCore::new("GlfwMouseComponent", PalComponents::MOUSE, "pal::mouse"),
            windows,
            scroll: Rc::new(Cell::new(Vec2::zeros())),
            subscription: RefCell::new(None),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        let scroll = Rc::clone(&self.scroll);
        let id = context.events.subscribe_to(&[PlatformEventType::Scroll], move |event| {
            if let PlatformEvent::Scroll { delta, .. } = event {
                scroll.set(scroll.get() + delta);
            }
        });
        *self.subscription.borrow_mut() = Some((Rc::clone(&context.events), id));
        Ok(())
    }

    fn release_all(&self) {
        if let Some((queue, id)) = self.subscription.borrow_mut().take() {
            queue.unsubscribe(id);
        }
        self.scroll.set(Vec2::zeros());
    }
}

delegate_component!(GlfwMouseComponent);

impl MouseComponent for GlfwMouseComponent {
    fn get_position(&self) -> PalResult<Vector2i> {
        self.windows
            .with_any_native(|window| {
                let (wx, wy) = window.get_pos();
                let (cx, cy) = window.get_cursor_pos();
                Vector2i::new(wx + cx.round() as i32, wy + cy.round() as i32)
            })
            .ok_or_else(no_window)
    }

    fn set_position(&self, position: Vector2i) -> PalResult<()> {
        self.windows
            .with_any_native(|window| {
                let (wx, wy) = window.get_pos();
                window.set_cursor_pos(f64::from(position.x - wx), f64::from(position.y - wy));
            })
            .ok_or_else(no_window)
    }

    fn get_mouse_state(&self) -> PalResult<MouseState> {
        let buttons = self
            .windows
            .with_any_native(|window| {
                BUTTONS
                    .iter()
                    .filter(|&&button| window.get_mouse_button(to_glfw_button(button)) == glfw::Action::Press)
                    .fold(MouseButtonFlags::empty(), |flags, button| flags | button.flag())
            })
            .ok_or_else(no_window)?;
        Ok(MouseState {
            position: self.get_position()?,
            buttons,
            scroll: self.scroll.get(),
        })
    }
}

/// Keyboard state of the focused window. GLFW exposes no layout, so keys
/// map to scancodes as on US QWERTY.
pub struct GlfwKeyboardComponent {
    core: ComponentCore,
    windows: Rc<GlfwWindowComponent>,
}

impl GlfwKeyboardComponent {
    pub(crate) fn new(windows: Rc<GlfwWindowComponent>) -> Self {
        Self {
            core: ComponentCore::new("GlfwKeyboardComponent", PalComponents::KEYBOARD, "pal::keyboard"),
            windows,
        }
    }

    fn prepare(&self, _context: &InitContext<'_>) -> PalResult<()> {
        Ok(())
    }

    fn release_all(&self) {}

    fn pressed_keys(&self) -> PalResult<Vec<Key>> {
        self.windows
            .with_any_native(|window| {
                Key::ALL
                    .iter()
                    .copied()
                    .filter(|&key| {
                        to_glfw_key(key).is_some_and(|native| window.get_key(native) == glfw::Action::Press)
                    })
                    .collect()
            })
            .ok_or_else(no_window)
    }
}

delegate_component!(GlfwKeyboardComponent);

impl KeyboardComponent for GlfwKeyboardComponent {
    fn supports_layouts(&self) -> bool {
        false
    }

    fn get_active_keyboard_layout(&self) -> PalResult<String> {
        Err(PalError::Unsupported(PalComponents::KEYBOARD))
    }

    fn get_scancode_from_key(&self, key: Key) -> PalResult<Scancode> {
        Ok(key.us_scancode())
    }

    fn get_key_from_scancode(&self, scancode: Scancode) -> PalResult<Key> {
        Ok(Key::from_us_scancode(scancode))
    }

    fn get_keyboard_state(&self) -> PalResult<Vec<Scancode>> {
        Ok(self.pressed_keys()?.into_iter().map(Key::us_scancode).collect())
    }

    fn get_key_modifiers(&self) -> PalResult<KeyModifiers> {
        Ok(self
            .pressed_keys()?
            .into_iter()
            .fold(KeyModifiers::empty(), |mods, key| mods | key.modifier()))
    }
}
