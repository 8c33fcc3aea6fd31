//! Clipboard capability

use serde::{Deserialize, Serialize};

use super::PalComponent;
use crate::error::PalResult;

/// Kind of data on the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipboardFormat {
    /// Clipboard is empty or holds nothing the backend understands
    None,
    /// Plain text
    Text,
    /// An image
    Bitmap,
    /// A list of files
    Files,
    /// Audio data
    Audio,
}

/// System clipboard access
pub trait ClipboardComponent: PalComponent {
    /// Formats this backend can read and write
    fn get_supported_formats(&self) -> Vec<ClipboardFormat>;

    /// Format of the current contents
    fn get_clipboard_format(&self) -> PalResult<ClipboardFormat>;

    /// Replace the contents with text
    fn set_clipboard_text(&self, text: &str) -> PalResult<()>;

    /// Current contents as text, `None` unless the format is text
    fn get_clipboard_text(&self) -> PalResult<Option<String>>;
}
