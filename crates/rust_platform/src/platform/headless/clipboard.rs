use std::rc::Rc;

use super::host::HeadlessHost;
use super::simulated_failure;
use crate::components::{ClipboardComponent, ClipboardFormat, InitContext, PalComponents};
use crate::error::PalResult;
use crate::events::PlatformEvent;
use crate::platform::{delegate_component, ComponentCore};

/// Text clipboard of the headless host
pub struct HeadlessClipboardComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
}

impl HeadlessClipboardComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessClipboardComponent", PalComponents::CLIPBOARD, "pal::clipboard"),
            host,
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {}
}

delegate_component!(HeadlessClipboardComponent);

impl ClipboardComponent for HeadlessClipboardComponent {
    fn get_supported_formats(&self) -> Vec<ClipboardFormat> {
        vec![ClipboardFormat::Text]
    }

    fn get_clipboard_format(&self) -> PalResult<ClipboardFormat> {
        Ok(match *self.host.clipboard.borrow() {
            Some(_) => ClipboardFormat::Text,
            None => ClipboardFormat::None,
        })
    }

    fn set_clipboard_text(&self, text: &str) -> PalResult<()> {
        *self.host.clipboard.borrow_mut() = Some(text.to_string());
        self.host.notify(PlatformEvent::ClipboardUpdate {
            format: ClipboardFormat::Text,
        });
        Ok(())
    }

    fn get_clipboard_text(&self) -> PalResult<Option<String>> {
        Ok(self.host.clipboard.borrow().clone())
    }
}
