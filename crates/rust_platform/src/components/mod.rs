//! Capability interfaces
//!
//! Each platform capability is a trait extending [`PalComponent`]. A backend
//! implements any subset of them; the [`Toolkit`](crate::toolkit::Toolkit)
//! resolves one instance per capability at initialization time.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::core::config::ToolkitOptions;
use crate::error::PalResult;
use crate::events::EventQueue;
use crate::foundation::logging::Logger;

pub mod clipboard;
pub mod cursor;
pub mod dialog;
pub mod display;
pub mod icon;
pub mod joystick;
pub mod keyboard;
pub mod mouse;
pub mod opengl;
pub mod shell;
pub mod surface;
pub mod vulkan;
pub mod window;

pub use clipboard::{ClipboardComponent, ClipboardFormat};
pub use cursor::{CursorComponent, SystemCursorType};
pub use dialog::{DialogComponent, FileFilter, MessageBoxButton, MessageBoxType};
pub use display::{DisplayComponent, DisplayDescriptor, VideoMode};
pub use icon::IconComponent;
pub use joystick::JoystickComponent;
pub use keyboard::KeyboardComponent;
pub use mouse::{MouseComponent, MouseState};
pub use opengl::{BindingsContext, OpenGLComponent};
pub use shell::{BatteryStatus, ShellComponent, ThemeInfo};
pub use surface::{SurfaceComponent, SurfaceType};
pub use vulkan::VulkanComponent;
pub use window::{
    GraphicsApiHints, OpenGLGraphicsApiHints, VulkanGraphicsApiHints, WindowBorderStyle,
    WindowComponent, WindowMode,
};

bitflags! {
    /// Set of platform capabilities
    ///
    /// Bit values are stable and only identify capabilities. The toolkit
    /// constructs capabilities in its own order, window and display first,
    /// and shuts them down in reverse.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PalComponents: u32 {
        /// Window creation and the native event pump
        const WINDOW = 1 << 0;
        /// Non-window drawing surfaces
        const SURFACE = 1 << 1;
        /// OpenGL context creation
        const OPENGL = 1 << 2;
        /// Display enumeration
        const DISPLAY = 1 << 3;
        /// Desktop shell integration
        const SHELL = 1 << 4;
        /// Mouse state
        const MOUSE = 1 << 5;
        /// Keyboard state and layouts
        const KEYBOARD = 1 << 6;
        /// Mouse cursor images
        const CURSOR = 1 << 7;
        /// Window icons
        const ICON = 1 << 8;
        /// System clipboard
        const CLIPBOARD = 1 << 9;
        /// Joysticks and gamepads
        const JOYSTICK = 1 << 10;
        /// Message boxes and file dialogs
        const DIALOG = 1 << 11;
        /// Vulkan instance extensions and window surfaces
        const VULKAN = 1 << 12;
    }
}

impl PalComponents {
    /// Every single-capability flag, in bit order
    pub fn each() -> impl Iterator<Item = Self> {
        Self::all().iter()
    }
}

impl fmt::Display for PalComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// What a component receives when it is initialized
pub struct InitContext<'a> {
    /// The capability the component was constructed for
    pub requested: PalComponents,
    /// The options passed to `Toolkit::init`
    pub options: &'a ToolkitOptions,
    /// The toolkit's event queue
    pub events: Rc<EventQueue>,
}

/// Base contract of every capability implementation
///
/// All operations take `&self`: a handler running inside
/// [`WindowComponent::process_events`] may call back into any component.
pub trait PalComponent {
    /// Backend-qualified component name, for diagnostics
    fn name(&self) -> &str;

    /// The capabilities this component implements
    fn provides(&self) -> PalComponents;

    /// Assign the diagnostic sink. Called before `initialize`.
    fn set_logger(&self, logger: Logger);

    /// Prepare backend state. `PalError::Unsupported` means the backend
    /// cannot offer the capability at all and is not fatal to the toolkit.
    fn initialize(&self, context: &InitContext<'_>) -> PalResult<()>;

    /// Release every handle this component issued
    fn shutdown(&self) {}
}

/// Logger slot shared by component implementations
#[derive(Debug, Default)]
pub(crate) struct LoggerSlot(std::cell::RefCell<Logger>);

impl LoggerSlot {
    pub fn set(&self, logger: Logger, category: &'static str) {
        *self.0.borrow_mut() = logger.with_category(category);
    }

    pub fn get(&self) -> Logger {
        self.0.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_flag_names() {
        assert_eq!(PalComponents::DIALOG.to_string(), "DIALOG");
        assert_eq!(
            (PalComponents::WINDOW | PalComponents::VULKAN).to_string(),
            "WINDOW | VULKAN"
        );
        assert_eq!(PalComponents::empty().to_string(), "(none)");
    }

    #[test]
    fn test_each_yields_single_flags_in_order() {
        let flags: Vec<_> = PalComponents::each().collect();
        assert_eq!(flags.len(), 13);
        assert_eq!(flags[0], PalComponents::WINDOW);
        assert_eq!(flags[12], PalComponents::VULKAN);
        assert!(flags.iter().all(|flag| flag.bits().count_ones() == 1));
    }

    #[test]
    fn test_flags_roundtrip_through_toml_text() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            flags: PalComponents,
        }
        let text = toml::to_string(&Holder {
            flags: PalComponents::DIALOG | PalComponents::SHELL,
        })
        .unwrap();
        let back: Holder = toml::from_str(&text).unwrap();
        assert_eq!(back.flags, PalComponents::DIALOG | PalComponents::SHELL);
    }
}
