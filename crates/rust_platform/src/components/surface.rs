//! Surface capability: drawing targets that are not top-level windows

use serde::{Deserialize, Serialize};

use super::PalComponent;
use crate::error::PalResult;
use crate::foundation::handle::{DisplayHandle, SurfaceHandle};
use crate::foundation::math::Vector2i;

/// What a surface is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    /// Embedded control inside a host window
    Control,
    /// Overlay covering a display
    Overlay,
}

/// Surface creation and queries
pub trait SurfaceComponent: PalComponent {
    /// Create a surface
    fn create(&self, kind: SurfaceType) -> PalResult<SurfaceHandle>;

    /// Destroy a surface; destroying twice is a no-op
    fn destroy(&self, handle: SurfaceHandle) -> PalResult<()>;

    /// The kind the surface was created with
    fn get_kind(&self, handle: SurfaceHandle) -> PalResult<SurfaceType>;

    /// Display the surface is shown on, if any
    fn get_display(&self, handle: SurfaceHandle) -> PalResult<Option<DisplayHandle>>;

    /// Move the surface to a display
    fn set_display(&self, handle: SurfaceHandle, display: DisplayHandle) -> PalResult<()>;

    /// Size of the drawable area in pixels
    fn get_client_size(&self, handle: SurfaceHandle) -> PalResult<Vector2i>;
}
