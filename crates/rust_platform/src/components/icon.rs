//! Icon capability

use std::path::Path;

use super::PalComponent;
use crate::error::PalResult;
use crate::foundation::handle::IconHandle;
use crate::foundation::math::Vector2i;

/// Window icon images
pub trait IconComponent: PalComponent {
    /// An icon from tightly packed RGBA8 pixels
    fn create_from_pixels(&self, width: u32, height: u32, rgba: &[u8]) -> PalResult<IconHandle>;

    /// An icon from an image file
    fn create_from_file(&self, path: &Path) -> PalResult<IconHandle> {
        let image = image::open(path)?.into_rgba8();
        self.create_from_pixels(image.width(), image.height(), image.as_raw())
    }

    /// Destroy an icon; destroying twice is a no-op
    fn destroy(&self, handle: IconHandle) -> PalResult<()>;

    /// Image size in pixels
    fn get_size(&self, handle: IconHandle) -> PalResult<Vector2i>;
}
