//! GLFW backend
//!
//! Native windows, monitors, input devices and OpenGL/Vulkan presentation
//! through GLFW. Surfaces, dialogs and shell services have no GLFW
//! counterpart and are reported as unsupported.
//!
//! GLFW must be driven from the thread that initialized it. The backend keeps
//! one `glfw::Glfw` per factory, shared by every component it builds.

use std::cell::{OnceCell, RefCell, RefMut};
use std::rc::Rc;

use crate::components::{
    ClipboardComponent, CursorComponent, DisplayComponent, IconComponent, JoystickComponent,
    KeyboardComponent, MouseComponent, OpenGLComponent, VulkanComponent, WindowComponent,
};
use crate::error::{PalError, PalResult};
use crate::foundation::logging::{pal_log, Logger};

use super::PlatformFactory;

mod clipboard;
mod cursor;
mod display;
mod icon;
mod input;
mod joystick;
mod keys;
mod opengl;
mod vulkan;
mod window;

pub use clipboard::GlfwClipboardComponent;
pub use cursor::GlfwCursorComponent;
pub use display::GlfwDisplayComponent;
pub use icon::GlfwIconComponent;
pub use input::{GlfwKeyboardComponent, GlfwMouseComponent};
pub use joystick::GlfwJoystickComponent;
pub use opengl::GlfwOpenGLComponent;
pub use vulkan::GlfwVulkanComponent;
pub use window::GlfwWindowComponent;

pub(crate) const BACKEND: &str = "glfw";

/// The GLFW library handle shared by one factory's components
pub(crate) struct GlfwShared {
    glfw: RefCell<glfw::Glfw>,
}

impl GlfwShared {
    fn new() -> PalResult<Rc<Self>> {
        let glfw = glfw::init(glfw::log_errors)
            .map_err(|error| PalError::native(BACKEND, format!("GLFW initialization failed: {error:?}")))?;
        Ok(Rc::new(Self {
            glfw: RefCell::new(glfw),
        }))
    }

    pub fn glfw(&self) -> RefMut<'_, glfw::Glfw> {
        self.glfw.borrow_mut()
    }
}

/// Builds GLFW components. Components that depend on each other share
/// instances, like the headless backend.
pub struct GlfwFactory {
    shared: Rc<GlfwShared>,
    window: OnceCell<Rc<GlfwWindowComponent>>,
    display: OnceCell<Rc<GlfwDisplayComponent>>,
    cursor: OnceCell<Rc<GlfwCursorComponent>>,
    icon: OnceCell<Rc<GlfwIconComponent>>,
    joystick: OnceCell<Rc<GlfwJoystickComponent>>,
}

impl GlfwFactory {
    /// Initialize GLFW on the calling thread
    pub fn new() -> PalResult<Self> {
        let shared = GlfwShared::new()?;
        pal_log!(
            Logger::global().with_category("pal::glfw"),
            Info,
            "GLFW {} initialized",
            glfw::get_version_string()
        );
        Ok(Self {
            shared,
            window: OnceCell::new(),
            display: OnceCell::new(),
            cursor: OnceCell::new(),
            icon: OnceCell::new(),
            joystick: OnceCell::new(),
        })
    }

    fn shared(&self) -> Rc<GlfwShared> {
        Rc::clone(&self.shared)
    }

    fn windows(&self) -> Rc<GlfwWindowComponent> {
        Rc::clone(self.window.get_or_init(|| {
            Rc::new(GlfwWindowComponent::new(
                self.shared(),
                self.displays(),
                self.icons(),
                self.cursors(),
                self.joysticks(),
            ))
        }))
    }

    fn displays(&self) -> Rc<GlfwDisplayComponent> {
        Rc::clone(
            self.display
                .get_or_init(|| Rc::new(GlfwDisplayComponent::new(self.shared()))),
        )
    }

    fn cursors(&self) -> Rc<GlfwCursorComponent> {
        Rc::clone(self.cursor.get_or_init(|| Rc::new(GlfwCursorComponent::new())))
    }

    fn icons(&self) -> Rc<GlfwIconComponent> {
        Rc::clone(self.icon.get_or_init(|| Rc::new(GlfwIconComponent::new())))
    }

    fn joysticks(&self) -> Rc<GlfwJoystickComponent> {
        Rc::clone(
            self.joystick
                .get_or_init(|| Rc::new(GlfwJoystickComponent::new(self.shared()))),
        )
    }
}

impl PlatformFactory for GlfwFactory {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn create_window(&self) -> PalResult<Rc<dyn WindowComponent>> {
        Ok(self.windows())
    }

    fn create_opengl(&self) -> PalResult<Rc<dyn OpenGLComponent>> {
        Ok(Rc::new(GlfwOpenGLComponent::new(self.shared(), self.windows())))
    }

    fn create_display(&self) -> PalResult<Rc<dyn DisplayComponent>> {
        Ok(self.displays())
    }

    fn create_mouse(&self) -> PalResult<Rc<dyn MouseComponent>> {
        Ok(Rc::new(GlfwMouseComponent::new(self.windows())))
    }

    fn create_keyboard(&self) -> PalResult<Rc<dyn KeyboardComponent>> {
        Ok(Rc::new(GlfwKeyboardComponent::new(self.windows())))
    }

    fn create_cursor(&self) -> PalResult<Rc<dyn CursorComponent>> {
        Ok(self.cursors())
    }

    fn create_icon(&self) -> PalResult<Rc<dyn IconComponent>> {
        Ok(self.icons())
    }

    fn create_clipboard(&self) -> PalResult<Rc<dyn ClipboardComponent>> {
        Ok(Rc::new(GlfwClipboardComponent::new(self.windows())))
    }

    fn create_joystick(&self) -> PalResult<Rc<dyn JoystickComponent>> {
        Ok(self.joysticks())
    }

    fn create_vulkan(&self) -> PalResult<Rc<dyn VulkanComponent>> {
        Ok(Rc::new(GlfwVulkanComponent::new(self.shared(), self.windows())))
    }
}
