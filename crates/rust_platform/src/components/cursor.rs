//! Cursor capability

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::PalComponent;
use crate::error::{PalError, PalResult};
use crate::foundation::handle::CursorHandle;
use crate::foundation::math::Vector2i;

/// Cursors provided by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemCursorType {
    /// Normal arrow
    Default,
    /// Busy
    Loading,
    /// Text insertion beam
    TextBeam,
    /// Precision crosshair
    Crosshair,
    /// Link hand
    Hand,
    /// Horizontal resize
    ResizeEw,
    /// Vertical resize
    ResizeNs,
    /// Diagonal resize, top-left to bottom-right
    ResizeNwse,
    /// Diagonal resize, top-right to bottom-left
    ResizeNesw,
    /// Move in any direction
    ResizeAll,
    /// Action not allowed
    Forbidden,
}

/// Cursor images
pub trait CursorComponent: PalComponent {
    /// A system cursor
    fn create_standard(&self, kind: SystemCursorType) -> PalResult<CursorHandle>;

    /// A cursor from tightly packed RGBA8 pixels
    fn create_from_pixels(
        &self,
        width: u32,
        height: u32,
        rgba: &[u8],
        hotspot: Vector2i,
    ) -> PalResult<CursorHandle>;

    /// A cursor from an image file
    fn create_from_file(&self, path: &Path, hotspot: Vector2i) -> PalResult<CursorHandle> {
        let image = image::open(path)?.into_rgba8();
        self.create_from_pixels(image.width(), image.height(), image.as_raw(), hotspot)
    }

    /// Destroy a cursor; destroying twice is a no-op
    fn destroy(&self, handle: CursorHandle) -> PalResult<()>;

    /// True for cursors made by `create_standard`
    fn is_system_cursor(&self, handle: CursorHandle) -> PalResult<bool>;

    /// Image size; system cursors report the backend's nominal size
    fn get_size(&self, handle: CursorHandle) -> PalResult<Vector2i>;
}

/// Validate an RGBA8 image buffer against its dimensions
pub(crate) fn check_rgba(width: u32, height: u32, rgba: &[u8]) -> PalResult<()> {
    if width == 0 || height == 0 {
        return Err(PalError::Precondition(format!(
            "image size {width}x{height} is empty"
        )));
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(PalError::Precondition(format!(
            "expected {expected} bytes of RGBA data for {width}x{height}, got {}",
            rgba.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rgba() {
        assert!(check_rgba(2, 2, &[0; 16]).is_ok());
        assert!(matches!(check_rgba(2, 2, &[0; 15]), Err(PalError::Precondition(_))));
        assert!(check_rgba(0, 4, &[]).is_err());
    }
}
