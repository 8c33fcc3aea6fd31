//! Backend construction
//!
//! A [`PlatformFactory`] builds the components of one backend family. This
//! module is the only place that branches on the build configuration to
//! pick a backend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::components::{
    ClipboardComponent, CursorComponent, DialogComponent, DisplayComponent, IconComponent,
    InitContext, JoystickComponent, KeyboardComponent, LoggerSlot, MouseComponent,
    OpenGLComponent, PalComponents, ShellComponent, SurfaceComponent, VulkanComponent,
    WindowComponent,
};
use crate::core::config::{BackendPreference, ToolkitOptions};
use crate::error::{PalError, PalResult};
use crate::events::EventQueue;
use crate::foundation::logging::{pal_log, Logger};

#[cfg(feature = "glfw")]
pub mod glfw;
pub mod headless;

/// Builds the components of one backend
///
/// Every method defaults to `Unsupported`. Any other error aborts toolkit
/// initialization.
pub trait PlatformFactory {
    /// Backend name, for diagnostics
    fn backend_name(&self) -> &'static str;

    /// Build the window component
    fn create_window(&self) -> PalResult<Rc<dyn WindowComponent>> {
        Err(PalError::Unsupported(PalComponents::WINDOW))
    }

    /// Build the surface component
    fn create_surface(&self) -> PalResult<Rc<dyn SurfaceComponent>> {
        Err(PalError::Unsupported(PalComponents::SURFACE))
    }

    /// Build the OpenGL component
    fn create_opengl(&self) -> PalResult<Rc<dyn OpenGLComponent>> {
        Err(PalError::Unsupported(PalComponents::OPENGL))
    }

    /// Build the display component
    fn create_display(&self) -> PalResult<Rc<dyn DisplayComponent>> {
        Err(PalError::Unsupported(PalComponents::DISPLAY))
    }

    /// Build the shell component
    fn create_shell(&self) -> PalResult<Rc<dyn ShellComponent>> {
        Err(PalError::Unsupported(PalComponents::SHELL))
    }

    /// Build the mouse component
    fn create_mouse(&self) -> PalResult<Rc<dyn MouseComponent>> {
        Err(PalError::Unsupported(PalComponents::MOUSE))
    }

    /// Build the keyboard component
    fn create_keyboard(&self) -> PalResult<Rc<dyn KeyboardComponent>> {
        Err(PalError::Unsupported(PalComponents::KEYBOARD))
    }

    /// Build the cursor component
    fn create_cursor(&self) -> PalResult<Rc<dyn CursorComponent>> {
        Err(PalError::Unsupported(PalComponents::CURSOR))
    }

    /// Build the icon component
    fn create_icon(&self) -> PalResult<Rc<dyn IconComponent>> {
        Err(PalError::Unsupported(PalComponents::ICON))
    }

    /// Build the clipboard component
    fn create_clipboard(&self) -> PalResult<Rc<dyn ClipboardComponent>> {
        Err(PalError::Unsupported(PalComponents::CLIPBOARD))
    }

    /// Build the joystick component
    fn create_joystick(&self) -> PalResult<Rc<dyn JoystickComponent>> {
        Err(PalError::Unsupported(PalComponents::JOYSTICK))
    }

    /// Build the dialog component
    fn create_dialog(&self) -> PalResult<Rc<dyn DialogComponent>> {
        Err(PalError::Unsupported(PalComponents::DIALOG))
    }

    /// Build the Vulkan component
    fn create_vulkan(&self) -> PalResult<Rc<dyn VulkanComponent>> {
        Err(PalError::Unsupported(PalComponents::VULKAN))
    }
}

/// The factory for `options.backend`
pub fn default_factory(options: &ToolkitOptions) -> PalResult<Box<dyn PlatformFactory>> {
    match options.backend {
        BackendPreference::Headless => headless_factory(options),
        BackendPreference::Glfw => glfw_factory(),
        BackendPreference::Auto => {
            if cfg!(feature = "glfw") {
                glfw_factory()
            } else {
                headless_factory(options)
            }
        }
    }
}

fn headless_factory(options: &ToolkitOptions) -> PalResult<Box<dyn PlatformFactory>> {
    Ok(Box::new(headless::HeadlessFactory::new(options.headless.clone())?))
}

#[cfg(feature = "glfw")]
fn glfw_factory() -> PalResult<Box<dyn PlatformFactory>> {
    Ok(Box::new(glfw::GlfwFactory::new()?))
}

#[cfg(not(feature = "glfw"))]
fn glfw_factory() -> PalResult<Box<dyn PlatformFactory>> {
    Err(crate::config::ConfigError::Invalid(
        "the GLFW backend was requested but rust_platform was built without the `glfw` feature"
            .to_string(),
    )
    .into())
}

/// State every backend component carries: identity, logger and the event
/// queue it received at initialization
pub(crate) struct ComponentCore {
    name: &'static str,
    provides: PalComponents,
    category: &'static str,
    logger: LoggerSlot,
    events: RefCell<Option<Rc<EventQueue>>>,
    initialized: Cell<bool>,
}

impl ComponentCore {
    pub fn new(name: &'static str, provides: PalComponents, category: &'static str) -> Self {
        Self {
            name,
            provides,
            category,
            logger: LoggerSlot::default(),
            events: RefCell::new(None),
            initialized: Cell::new(false),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn provides(&self) -> PalComponents {
        self.provides
    }

    pub fn set_logger(&self, logger: Logger) {
        self.logger.set(logger, self.category);
    }

    pub fn logger(&self) -> Logger {
        self.logger.get()
    }

    /// Record the event queue and mark the component ready
    pub fn initialize(&self, context: &InitContext<'_>) {
        *self.events.borrow_mut() = Some(Rc::clone(&context.events));
        self.initialized.set(true);
        pal_log!(self.logger(), Debug, "{} initialized for {}", self.name, context.requested);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// The toolkit's event queue; fails before `initialize`
    pub fn events(&self) -> PalResult<Rc<EventQueue>> {
        self.events.borrow().clone().ok_or(PalError::NotInitialized)
    }

    /// Forget the event queue
    pub fn shutdown(&self) {
        self.events.borrow_mut().take();
        self.initialized.set(false);
    }
}

/// Implements [`PalComponent`](crate::components::PalComponent) by
/// delegating to a `core: ComponentCore` field. The component provides
/// `fn prepare(&self, &InitContext) -> PalResult<()>` and
/// `fn release_all(&self)`.
macro_rules! delegate_component {
    ($component:ty) => {
        impl $crate::components::PalComponent for $component {
            fn name(&self) -> &str {
                self.core.name()
            }

            fn provides(&self) -> $crate::components::PalComponents {
                self.core.provides()
            }

            fn set_logger(&self, logger: $crate::foundation::logging::Logger) {
                self.core.set_logger(logger);
            }

            fn initialize(
                &self,
                context: &$crate::components::InitContext<'_>,
            ) -> $crate::error::PalResult<()> {
                self.prepare(context)?;
                self.core.initialize(context);
                Ok(())
            }

            fn shutdown(&self) {
                self.release_all();
                self.core.shutdown();
            }
        }
    };
}

pub(crate) use delegate_component;

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyFactory;

    impl PlatformFactory for EmptyFactory {
        fn backend_name(&self) -> &'static str {
            "empty"
        }
    }

    #[test]
    fn test_factory_defaults_to_unsupported() {
        let factory = EmptyFactory;
        assert!(matches!(
            factory.create_dialog().err(),
            Some(PalError::Unsupported(PalComponents::DIALOG))
        ));
        assert!(factory.create_window().err().is_some_and(|e| e.is_unsupported()));
    }

    #[test]
    fn test_explicit_headless_selection() {
        let options = ToolkitOptions::new("test").with_backend(BackendPreference::Headless);
        let factory = default_factory(&options).unwrap();
        assert_eq!(factory.backend_name(), "headless");
    }

    #[cfg(not(feature = "glfw"))]
    #[test]
    fn test_glfw_without_feature_is_a_config_error() {
        let options = ToolkitOptions::new("test").with_backend(BackendPreference::Glfw);
        assert!(matches!(default_factory(&options).err(), Some(PalError::Config(_))));
    }
}
