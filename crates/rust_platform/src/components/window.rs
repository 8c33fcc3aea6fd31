//! Window capability

use serde::{Deserialize, Serialize};

use super::PalComponent;
use crate::error::PalResult;
use crate::foundation::handle::{CursorHandle, IconHandle, WindowHandle};
use crate::foundation::math::Vector2i;

/// Requirements for windows that will host an OpenGL context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGLGraphicsApiHints {
    /// Requested context version (major, minor)
    pub version: (u8, u8),
    /// Request a core profile context
    pub core_profile: bool,
    /// Request a forward-compatible context
    pub forward_compatible: bool,
    /// Request a debug context
    pub debug: bool,
    /// Bits per color channel (red, green, blue, alpha)
    pub color_bits: (u8, u8, u8, u8),
    /// Depth buffer bits
    pub depth_bits: u8,
    /// Stencil buffer bits
    pub stencil_bits: u8,
    /// Multisample count, 0 disables multisampling
    pub samples: u8,
    /// Request an sRGB capable framebuffer
    pub srgb_framebuffer: bool,
    /// Request double buffering
    pub double_buffer: bool,
}

impl Default for OpenGLGraphicsApiHints {
    fn default() -> Self {
        Self {
            version: (3, 3),
            core_profile: true,
            forward_compatible: false,
            debug: false,
            color_bits: (8, 8, 8, 8),
            depth_bits: 24,
            stencil_bits: 8,
            samples: 0,
            srgb_framebuffer: false,
            double_buffer: true,
        }
    }
}

/// Requirements for windows that will present through Vulkan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulkanGraphicsApiHints {}

/// Which graphics API a new window must be able to present with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphicsApiHints {
    /// The window will get an OpenGL context
    OpenGL(OpenGLGraphicsApiHints),
    /// The window will get a Vulkan surface
    Vulkan(VulkanGraphicsApiHints),
}

impl GraphicsApiHints {
    /// OpenGL hints, if these are OpenGL hints
    pub fn as_opengl(&self) -> Option<&OpenGLGraphicsApiHints> {
        match self {
            Self::OpenGL(hints) => Some(hints),
            Self::Vulkan(_) => None,
        }
    }

    /// True for Vulkan hints
    pub fn is_vulkan(&self) -> bool {
        matches!(self, Self::Vulkan(_))
    }
}

impl Default for GraphicsApiHints {
    fn default() -> Self {
        Self::OpenGL(OpenGLGraphicsApiHints::default())
    }
}

/// Window visibility and sizing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowMode {
    /// Not shown
    Hidden,
    /// Shown at its client size
    Normal,
    /// Iconified
    Minimized,
    /// Fills the work area of its display
    Maximized,
    /// Borderless, covering its display at the display's current video mode
    WindowedFullscreen,
    /// Owns its display
    ExclusiveFullscreen,
}

/// Window decoration style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowBorderStyle {
    /// No decorations
    Borderless,
    /// Decorated, user cannot resize
    FixedBorder,
    /// Decorated and resizable
    ResizableBorder,
    /// Decorated with a small title bar
    ToolBox,
}

/// Window creation, properties and the native event pump
pub trait WindowComponent: PalComponent {
    /// Create a hidden window able to present with the hinted API
    fn create(&self, hints: GraphicsApiHints) -> PalResult<WindowHandle>;

    /// Destroy a window. Destroying a destroyed window is a no-op.
    fn destroy(&self, handle: WindowHandle) -> PalResult<()>;

    /// True once a destroy of `handle` has completed
    fn is_window_destroyed(&self, handle: WindowHandle) -> bool;

    /// Translate pending native notifications into platform events and
    /// dispatch them. With `blocking` set, first wait for at least one
    /// native notification.
    fn process_events(&self, blocking: bool) -> PalResult<()>;

    /// Window title
    fn get_title(&self, handle: WindowHandle) -> PalResult<String>;

    /// Set the window title
    fn set_title(&self, handle: WindowHandle, title: &str) -> PalResult<()>;

    /// Client area size in screen coordinates
    fn get_client_size(&self, handle: WindowHandle) -> PalResult<Vector2i>;

    /// Resize the client area. The effective size is clamped to the
    /// window's min/max client size.
    fn set_client_size(&self, handle: WindowHandle, size: Vector2i) -> PalResult<()>;

    /// Minimum client size per axis, `None` for unbounded
    fn get_min_client_size(&self, handle: WindowHandle) -> PalResult<(Option<i32>, Option<i32>)>;

    /// Maximum client size per axis, `None` for unbounded
    fn get_max_client_size(&self, handle: WindowHandle) -> PalResult<(Option<i32>, Option<i32>)>;

    /// Set the minimum client size. A minimum above the maximum on either
    /// axis is a precondition error. The current size is re-clamped.
    fn set_min_client_size(
        &self,
        handle: WindowHandle,
        width: Option<i32>,
        height: Option<i32>,
    ) -> PalResult<()>;

    /// Set the maximum client size, see `set_min_client_size`
    fn set_max_client_size(
        &self,
        handle: WindowHandle,
        width: Option<i32>,
        height: Option<i32>,
    ) -> PalResult<()>;

    /// Position of the client area on the virtual desktop
    fn get_position(&self, handle: WindowHandle) -> PalResult<Vector2i>;

    /// Move the client area
    fn set_position(&self, handle: WindowHandle, position: Vector2i) -> PalResult<()>;

    /// Framebuffer size in pixels
    fn get_framebuffer_size(&self, handle: WindowHandle) -> PalResult<Vector2i>;

    /// Current decoration style
    fn get_border_style(&self, handle: WindowHandle) -> PalResult<WindowBorderStyle>;

    /// Change the decoration style
    fn set_border_style(&self, handle: WindowHandle, style: WindowBorderStyle) -> PalResult<()>;

    /// Current mode
    fn get_mode(&self, handle: WindowHandle) -> PalResult<WindowMode>;

    /// Change the mode. Setting the current mode is a no-op.
    fn set_mode(&self, handle: WindowHandle, mode: WindowMode) -> PalResult<()>;

    /// Set the window icon
    fn set_icon(&self, handle: WindowHandle, icon: IconHandle) -> PalResult<()>;

    /// Set the cursor shown over the window, `None` for the default arrow
    fn set_cursor(&self, handle: WindowHandle, cursor: Option<CursorHandle>) -> PalResult<()>;

    /// Bring the window to the front and give it input focus
    fn focus_window(&self, handle: WindowHandle) -> PalResult<()>;

    /// The hints the window was created with
    fn get_graphics_api_hints(&self, handle: WindowHandle) -> PalResult<GraphicsApiHints>;

    /// Present the window's OpenGL framebuffer. The window's context must
    /// be current on the calling thread.
    fn swap_buffers(&self, handle: WindowHandle) -> PalResult<()>;
}

/// Clamp `size` into the optional per-axis `min`/`max` bounds
pub(crate) fn clamp_client_size(
    size: Vector2i,
    min: (Option<i32>, Option<i32>),
    max: (Option<i32>, Option<i32>),
) -> Vector2i {
    let axis = |value: i32, lo: Option<i32>, hi: Option<i32>| {
        let value = lo.map_or(value, |lo| value.max(lo));
        hi.map_or(value, |hi| value.min(hi))
    };
    Vector2i::new(axis(size.x, min.0, max.0), axis(size.y, min.1, max.1))
}

/// Check that `min` does not exceed `max` on either axis
pub(crate) fn check_size_limits(
    min: (Option<i32>, Option<i32>),
    max: (Option<i32>, Option<i32>),
) -> PalResult<()> {
    let crossed = |lo: Option<i32>, hi: Option<i32>| matches!((lo, hi), (Some(lo), Some(hi)) if lo > hi);
    if crossed(min.0, max.0) || crossed(min.1, max.1) {
        return Err(crate::error::PalError::Precondition(format!(
            "minimum client size {min:?} exceeds maximum {max:?}"
        )));
    }
    let negative = |v: Option<i32>| v.is_some_and(|v| v < 0);
    if negative(min.0) || negative(min.1) || negative(max.0) || negative(max.1) {
        return Err(crate::error::PalError::Precondition(
            "client size limits must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_client_size() {
        let min = (Some(100), Some(100));
        let max = (Some(1000), Some(1000));
        assert_eq!(clamp_client_size(Vector2i::new(50, 50), min, max), Vector2i::new(100, 100));
        assert_eq!(
            clamp_client_size(Vector2i::new(2000, 2000), min, max),
            Vector2i::new(1000, 1000)
        );
        assert_eq!(
            clamp_client_size(Vector2i::new(2000, 20), (None, Some(30)), (Some(500), None)),
            Vector2i::new(500, 30)
        );
    }

    #[test]
    fn test_crossed_limits_are_rejected() {
        assert!(check_size_limits((Some(10), None), (Some(20), None)).is_ok());
        assert!(check_size_limits((None, Some(30)), (None, Some(20))).is_err());
        assert!(check_size_limits((Some(-1), None), (None, None)).is_err());
    }

    #[test]
    fn test_hint_helpers() {
        let gl = GraphicsApiHints::default();
        assert_eq!(gl.as_opengl().map(|h| h.version), Some((3, 3)));
        assert!(GraphicsApiHints::Vulkan(VulkanGraphicsApiHints::default()).is_vulkan());
    }
}
