//! Display capability
//!
//! Displays are observed, never controlled. Every query reads the live
//! configuration; nothing is cached between calls.

use serde::{Deserialize, Serialize};

use super::PalComponent;
use crate::error::PalResult;
use crate::foundation::handle::DisplayHandle;
use crate::foundation::math::{Box2i, Vec2, Vector2i};

/// Dots per inch at a scale factor of 1.0
pub const BASE_DPI: f32 = 96.0;

/// A display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoMode {
    /// Horizontal resolution in pixels
    pub width: i32,
    /// Vertical resolution in pixels
    pub height: i32,
    /// Refresh rate in Hz
    pub refresh_rate: u32,
    /// Bits per pixel
    pub bits_per_pixel: u32,
}

impl VideoMode {
    /// Resolution as a vector
    pub fn resolution(&self) -> Vector2i {
        Vector2i::new(self.width, self.height)
    }
}

/// Snapshot of one display's configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayDescriptor {
    /// Native display name
    pub name: String,
    /// True for the primary display
    pub is_primary: bool,
    /// Current video mode
    pub video_mode: VideoMode,
    /// Modes the display supports
    pub supported_modes: Vec<VideoMode>,
    /// Top-left corner on the virtual desktop
    pub virtual_position: Vector2i,
    /// Area not covered by task bars and docks, in virtual desktop
    /// coordinates
    pub work_area: Box2i,
    /// Content scale factors
    pub scale: Vec2,
}

impl DisplayDescriptor {
    /// Bounds on the virtual desktop
    pub fn bounds(&self) -> Box2i {
        Box2i::from_position_size(self.virtual_position, self.video_mode.resolution())
    }

    /// Dots per inch derived from the scale factors
    pub fn dpi(&self) -> Vec2 {
        self.scale * BASE_DPI
    }
}

/// Display enumeration and queries
pub trait DisplayComponent: PalComponent {
    /// Number of connected displays
    fn get_display_count(&self) -> PalResult<usize>;

    /// Open the display at `index`. Indices are stable for the session but
    /// not across hot-plug.
    fn create(&self, index: usize) -> PalResult<DisplayHandle>;

    /// Open the primary display
    fn create_primary(&self) -> PalResult<DisplayHandle>;

    /// Release a display handle. Destroying a released handle is a no-op.
    fn destroy(&self, handle: DisplayHandle) -> PalResult<()>;

    /// Native display name
    fn get_name(&self, handle: DisplayHandle) -> PalResult<String>;

    /// True for the primary display
    fn is_primary(&self, handle: DisplayHandle) -> PalResult<bool>;

    /// Current video mode
    fn get_video_mode(&self, handle: DisplayHandle) -> PalResult<VideoMode>;

    /// Every mode the display supports
    fn get_supported_video_modes(&self, handle: DisplayHandle) -> PalResult<Vec<VideoMode>>;

    /// Top-left corner on the virtual desktop
    fn get_virtual_position(&self, handle: DisplayHandle) -> PalResult<Vector2i>;

    /// Current resolution
    fn get_resolution(&self, handle: DisplayHandle) -> PalResult<Vector2i> {
        Ok(self.get_video_mode(handle)?.resolution())
    }

    /// Usable area, excluding task bars and docks
    fn get_work_area(&self, handle: DisplayHandle) -> PalResult<Box2i>;

    /// Current refresh rate in Hz
    fn get_refresh_rate(&self, handle: DisplayHandle) -> PalResult<u32> {
        Ok(self.get_video_mode(handle)?.refresh_rate)
    }

    /// Content scale factors
    fn get_display_scale(&self, handle: DisplayHandle) -> PalResult<Vec2>;

    /// All of the above in one snapshot
    fn describe(&self, handle: DisplayHandle) -> PalResult<DisplayDescriptor> {
        Ok(DisplayDescriptor {
            name: self.get_name(handle)?,
            is_primary: self.is_primary(handle)?,
            video_mode: self.get_video_mode(handle)?,
            supported_modes: self.get_supported_video_modes(handle)?,
            virtual_position: self.get_virtual_position(handle)?,
            work_area: self.get_work_area(handle)?,
            scale: self.get_display_scale(handle)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_descriptor_bounds_and_dpi() {
        let mode = VideoMode {
            width: 2560,
            height: 1440,
            refresh_rate: 144,
            bits_per_pixel: 32,
        };
        let descriptor = DisplayDescriptor {
            name: "DP-1".into(),
            is_primary: false,
            video_mode: mode,
            supported_modes: vec![mode],
            virtual_position: Vector2i::new(1920, 0),
            work_area: Box2i::new(Vector2i::new(1920, 0), Vector2i::new(4480, 1400)),
            scale: Vec2::new(1.5, 1.5),
        };

        assert_eq!(descriptor.bounds().max, Vector2i::new(4480, 1440));
        assert!(descriptor.bounds().contains_box(&descriptor.work_area));
        assert_relative_eq!(descriptor.dpi().x, 144.0);
    }
}
