//! Dialog capability

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::PalComponent;
use crate::error::PalResult;
use crate::foundation::handle::WindowHandle;

/// Message box flavor, selects icon and buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageBoxType {
    /// Information, OK button
    Information,
    /// Warning, OK button
    Warning,
    /// Error, OK button
    Error,
    /// Question, Yes and No buttons
    Question,
}

impl MessageBoxType {
    /// Buttons the box offers
    pub fn buttons(self) -> &'static [MessageBoxButton] {
        match self {
            Self::Question => &[MessageBoxButton::Yes, MessageBoxButton::No],
            _ => &[MessageBoxButton::Ok],
        }
    }
}

/// Button the user chose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageBoxButton {
    /// OK
    Ok,
    /// Yes
    Yes,
    /// No
    No,
    /// Dismissed without choosing
    None,
}

/// Named set of file extensions for file dialogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    /// Label shown to the user
    pub name: String,
    /// Extensions without the dot
    pub extensions: Vec<String>,
}

impl FileFilter {
    /// A filter named `name` accepting `extensions`
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(ToString::to_string).collect(),
        }
    }

    /// True if `path` has one of the filter's extensions
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Modal system dialogs
pub trait DialogComponent: PalComponent {
    /// Show a message box and wait for the answer
    fn show_message_box(
        &self,
        parent: Option<WindowHandle>,
        title: &str,
        content: &str,
        kind: MessageBoxType,
    ) -> PalResult<MessageBoxButton>;

    /// Ask for one or more existing files. `None` when cancelled.
    fn show_open_dialog(
        &self,
        parent: Option<WindowHandle>,
        title: &str,
        directory: Option<&Path>,
        filters: &[FileFilter],
        allow_multiple: bool,
    ) -> PalResult<Option<Vec<PathBuf>>>;

    /// Ask for a file to save to. `None` when cancelled.
    fn show_save_dialog(
        &self,
        parent: Option<WindowHandle>,
        title: &str,
        directory: Option<&Path>,
        filters: &[FileFilter],
    ) -> PalResult<Option<PathBuf>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_extension_case_insensitively() {
        let images = FileFilter {
            name: "Images".into(),
            extensions: vec!["png".into(), "jpg".into()],
        };
        assert!(images.matches(Path::new("shot.PNG")));
        assert!(!images.matches(Path::new("notes.txt")));
        assert!(!images.matches(Path::new("README")));
    }
}
