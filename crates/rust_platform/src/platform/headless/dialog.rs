use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::host::{DialogAnswer, HeadlessHost};
use super::simulated_failure;
use super::window::HeadlessWindowComponent;
use crate::components::{
    DialogComponent, FileFilter, InitContext, MessageBoxButton, MessageBoxType, PalComponents,
    WindowComponent,
};
use crate::error::{PalError, PalResult};
use crate::foundation::handle::WindowHandle;
use crate::foundation::logging::pal_log;
use crate::platform::{delegate_component, ComponentCore};

/// Dialogs answered from a script queued on the host. Without a scripted
/// answer every dialog is dismissed.
pub struct HeadlessDialogComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
    windows: Rc<HeadlessWindowComponent>,
}

impl HeadlessDialogComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>, windows: Rc<HeadlessWindowComponent>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessDialogComponent", PalComponents::DIALOG, "pal::dialog"),
            host,
            windows,
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {}

    fn check_parent(&self, parent: Option<WindowHandle>) -> PalResult<()> {
        match parent {
            Some(window) if self.windows.is_window_destroyed(window) => {
                Err(PalError::invalid_handle(window))
            }
            _ => Ok(()),
        }
    }

    /// Next scripted file answer, keeping only paths the filters accept
    fn next_paths(&self, title: &str, filters: &[FileFilter]) -> PalResult<Option<Vec<PathBuf>>> {
        let paths = match self.host.next_dialog_answer() {
            Some(DialogAnswer::Paths(paths)) => paths,
            Some(other) => {
                return Err(PalError::Precondition(format!(
                    "file dialog {title:?} got scripted answer {other:?}"
                )))
            }
            None => None,
        };
        Ok(paths
            .map(|paths| {
                paths
                    .into_iter()
                    .filter(|path| filters.is_empty() || filters.iter().any(|f| f.matches(path)))
                    .collect::<Vec<_>>()
            })
            .filter(|paths| !paths.is_empty()))
    }
}

delegate_component!(HeadlessDialogComponent);

impl DialogComponent for HeadlessDialogComponent {
    fn show_message_box(
        &self,
        parent: Option<WindowHandle>,
        title: &str,
        content: &str,
        kind: MessageBoxType,
    ) -> PalResult<MessageBoxButton> {
        self.check_parent(parent)?;
        pal_log!(self.core.logger(), Info, "message box {title:?}: {content}");
        match self.host.next_dialog_answer() {
            None => Ok(MessageBoxButton::None),
            Some(DialogAnswer::Button(button))
                if button == MessageBoxButton::None || kind.buttons().contains(&button) =>
            {
                Ok(button)
            }
            Some(other) => Err(PalError::Precondition(format!(
                "{kind:?} message box cannot answer {other:?}"
            ))),
        }
    }

    fn show_open_dialog(
        &self,
        parent: Option<WindowHandle>,
        title: &str,
        _directory: Option<&Path>,
        filters: &[FileFilter],
        allow_multiple: bool,
    ) -> PalResult<Option<Vec<PathBuf>>> {
        self.check_parent(parent)?;
        let mut paths = self.next_paths(title, filters)?;
        if !allow_multiple {
            if let Some(paths) = paths.as_mut() {
                paths.truncate(1);
            }
        }
        Ok(paths)
    }

    fn show_save_dialog(
        &self,
        parent: Option<WindowHandle>,
        title: &str,
        _directory: Option<&Path>,
        filters: &[FileFilter],
    ) -> PalResult<Option<PathBuf>> {
        self.check_parent(parent)?;
        Ok(self
            .next_paths(title, filters)?
            .and_then(|paths| paths.into_iter().next()))
    }
}
