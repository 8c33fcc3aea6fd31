//! Headless backend
//!
//! Implements every capability against a simulated platform
//! ([`HeadlessHost`]). Useful for servers without a display and as the
//! instrumented test double of the toolkit: native messages are posted
//! through a [`HeadlessSender`] and every simulated native resource is
//! booked in a [`NativeLedger`].
//!
//! Components of one factory share state, so an OpenGL context created by
//! the OpenGL component can be checked by the window component's
//! `swap_buffers`.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::components::{
    ClipboardComponent, CursorComponent, DialogComponent, DisplayComponent, IconComponent,
    JoystickComponent, KeyboardComponent, MouseComponent, OpenGLComponent, PalComponents,
    ShellComponent, SurfaceComponent, VulkanComponent, WindowComponent,
};
use crate::core::config::HeadlessOptions;
use crate::error::{PalError, PalResult};

use super::PlatformFactory;

mod clipboard;
mod cursor;
mod dialog;
mod display;
pub mod host;
mod icon;
mod input;
mod joystick;
mod opengl;
mod shell;
mod surface;
mod vulkan;
mod window;

pub use clipboard::HeadlessClipboardComponent;
pub use cursor::HeadlessCursorComponent;
pub use dialog::HeadlessDialogComponent;
pub use display::HeadlessDisplayComponent;
pub use host::{
    DialogAnswer, HeadlessHost, HeadlessMessage, HeadlessSender, NativeId, NativeKind,
    NativeLedger,
};
pub use icon::HeadlessIconComponent;
pub use input::{HeadlessKeyboardComponent, HeadlessMouseComponent};
pub use joystick::HeadlessJoystickComponent;
pub use opengl::HeadlessOpenGLComponent;
pub use shell::HeadlessShellComponent;
pub use surface::HeadlessSurfaceComponent;
pub use vulkan::HeadlessVulkanComponent;
pub use window::HeadlessWindowComponent;

/// Builds headless components sharing one [`HeadlessHost`]
///
/// Components are created once and handed out again on later requests, so
/// components that depend on each other see the same instances.
pub struct HeadlessFactory {
    host: Rc<HeadlessHost>,
    window: OnceCell<Rc<HeadlessWindowComponent>>,
    display: OnceCell<Rc<HeadlessDisplayComponent>>,
    cursor: OnceCell<Rc<HeadlessCursorComponent>>,
    icon: OnceCell<Rc<HeadlessIconComponent>>,
    joystick: OnceCell<Rc<HeadlessJoystickComponent>>,
}

impl HeadlessFactory {
    /// A factory over a new host built from `options`
    pub fn new(options: HeadlessOptions) -> PalResult<Self> {
        Ok(Self::with_host(HeadlessHost::new(options)?))
    }

    /// A factory over an existing host
    pub fn with_host(host: Rc<HeadlessHost>) -> Self {
        Self {
            host,
            window: OnceCell::new(),
            display: OnceCell::new(),
            cursor: OnceCell::new(),
            icon: OnceCell::new(),
            joystick: OnceCell::new(),
        }
    }

    /// The simulated platform
    pub fn host(&self) -> Rc<HeadlessHost> {
        Rc::clone(&self.host)
    }

    fn check(&self, component: PalComponents) -> PalResult<()> {
        if self.host.options().unsupported.intersects(component) {
            return Err(PalError::Unsupported(component));
        }
        Ok(())
    }

    fn windows(&self) -> Rc<HeadlessWindowComponent> {
        Rc::clone(self.window.get_or_init(|| {
            Rc::new(HeadlessWindowComponent::new(
                self.host(),
                self.displays(),
                self.icons(),
                self.cursors(),
                self.joysticks(),
            ))
        }))
    }

    fn displays(&self) -> Rc<HeadlessDisplayComponent> {
        Rc::clone(
            self.display
                .get_or_init(|| Rc::new(HeadlessDisplayComponent::new(self.host()))),
        )
    }

    fn cursors(&self) -> Rc<HeadlessCursorComponent> {
        Rc::clone(
            self.cursor
                .get_or_init(|| Rc::new(HeadlessCursorComponent::new(self.host()))),
        )
    }

    fn icons(&self) -> Rc<HeadlessIconComponent> {
        Rc::clone(
            self.icon
                .get_or_init(|| Rc::new(HeadlessIconComponent::new(self.host()))),
        )
    }

    fn joysticks(&self) -> Rc<HeadlessJoystickComponent> {
        Rc::clone(
            self.joystick
                .get_or_init(|| Rc::new(HeadlessJoystickComponent::new(self.host()))),
        )
    }
}

impl PlatformFactory for HeadlessFactory {
    fn backend_name(&self) -> &'static str {
        host::BACKEND
    }

    fn create_window(&self) -> PalResult<Rc<dyn WindowComponent>> {
        self.check(PalComponents::WINDOW)?;
        Ok(self.windows())
    }

    fn create_surface(&self) -> PalResult<Rc<dyn SurfaceComponent>> {
        self.check(PalComponents::SURFACE)?;
        Ok(Rc::new(HeadlessSurfaceComponent::new(self.host(), self.displays())))
    }

    fn create_opengl(&self) -> PalResult<Rc<dyn OpenGLComponent>> {
        self.check(PalComponents::OPENGL)?;
        Ok(Rc::new(HeadlessOpenGLComponent::new(self.host(), self.windows())))
    }

    fn create_display(&self) -> PalResult<Rc<dyn DisplayComponent>> {
        self.check(PalComponents::DISPLAY)?;
        Ok(self.displays())
    }

    fn create_shell(&self) -> PalResult<Rc<dyn ShellComponent>> {
        self.check(PalComponents::SHELL)?;
        Ok(Rc::new(HeadlessShellComponent::new(self.host())))
    }

    fn create_mouse(&self) -> PalResult<Rc<dyn MouseComponent>> {
        self.check(PalComponents::MOUSE)?;
        Ok(Rc::new(HeadlessMouseComponent::new(self.host())))
    }

    fn create_keyboard(&self) -> PalResult<Rc<dyn KeyboardComponent>> {
        self.check(PalComponents::KEYBOARD)?;
        Ok(Rc::new(HeadlessKeyboardComponent::new(self.host())))
    }

    fn create_cursor(&self) -> PalResult<Rc<dyn CursorComponent>> {
        self.check(PalComponents::CURSOR)?;
        Ok(self.cursors())
    }

    fn create_icon(&self) -> PalResult<Rc<dyn IconComponent>> {
        self.check(PalComponents::ICON)?;
        Ok(self.icons())
    }

    fn create_clipboard(&self) -> PalResult<Rc<dyn ClipboardComponent>> {
        self.check(PalComponents::CLIPBOARD)?;
        Ok(Rc::new(HeadlessClipboardComponent::new(self.host())))
    }

    fn create_joystick(&self) -> PalResult<Rc<dyn JoystickComponent>> {
        self.check(PalComponents::JOYSTICK)?;
        Ok(self.joysticks())
    }

    fn create_dialog(&self) -> PalResult<Rc<dyn DialogComponent>> {
        self.check(PalComponents::DIALOG)?;
        Ok(Rc::new(HeadlessDialogComponent::new(self.host(), self.windows())))
    }

    fn create_vulkan(&self) -> PalResult<Rc<dyn VulkanComponent>> {
        self.check(PalComponents::VULKAN)?;
        Ok(Rc::new(HeadlessVulkanComponent::new(self.host(), self.windows())))
    }
}

/// Fails with a native error when `options.failing` names `component`
pub(crate) fn simulated_failure(host: &HeadlessHost, component: PalComponents) -> PalResult<()> {
    if host.options().failing.intersects(component) {
        return Err(PalError::Native {
            backend: host::BACKEND,
            code: Some(i64::from(component.bits())),
            message: format!("simulated initialization failure of {component}"),
        });
    }
    Ok(())
}
