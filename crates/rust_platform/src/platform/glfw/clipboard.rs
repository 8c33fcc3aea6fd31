use std::rc::Rc;

use super::window::GlfwWindowComponent;
use crate::components::{ClipboardComponent, ClipboardFormat, InitContext, PalComponents};
use crate::error::{PalError, PalResult};
use crate::events::PlatformEvent;
use crate::platform::{delegate_component, ComponentCore};

/// Text clipboard. GLFW reaches the clipboard through a window.
pub struct GlfwClipboardComponent {
    core: ComponentCore,
    windows: Rc<GlfwWindowComponent>,
}

impl GlfwClipboardComponent {
    pub(crate) fn new(windows: Rc<GlfwWindowComponent>) -> Self {
        Self {
            core: ComponentCore::new("GlfwClipboardComponent", PalComponents::CLIPBOARD, "pal::clipboard"),
            windows,
        }
    }

    fn prepare(&self, _context: &InitContext<'_>) -> PalResult<()> {
        Ok(())
    }

    fn release_all(&self) {}
}

fn no_window() -> PalError {
    PalError::Precondition("the GLFW clipboard needs an open window".to_string())
}

delegate_component!(GlfwClipboardComponent);

impl ClipboardComponent for GlfwClipboardComponent {
    fn get_supported_formats(&self) -> Vec<ClipboardFormat> {
        vec![ClipboardFormat::Text]
    }

    fn get_clipboard_format(&self) -> PalResult<ClipboardFormat> {
        Ok(match self.get_clipboard_text()? {
            Some(_) => ClipboardFormat::Text,
            None => ClipboardFormat::None,
        })
    }

    fn set_clipboard_text(&self, text: &str) -> PalResult<()> {
        self.windows
            .with_any_native(|window| window.set_clipboard_string(text))
            .ok_or_else(no_window)?;
        self.core.events()?.push(PlatformEvent::ClipboardUpdate {
            format: ClipboardFormat::Text,
        });
        Ok(())
    }

    fn get_clipboard_text(&self) -> PalResult<Option<String>> {
        self.windows
            .with_any_native(|window| window.get_clipboard_string())
            .ok_or_else(no_window)
    }
}
