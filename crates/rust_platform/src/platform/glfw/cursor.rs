use std::cell::RefCell;

use super::icon::pixel_image;
use crate::components::cursor::check_rgba;
use crate::components::{CursorComponent, InitContext, PalComponents, SystemCursorType};
use crate::error::{PalError, PalResult};
use crate::foundation::handle::{CursorHandle, CursorKind, HandleMap};
use crate::foundation::logging::pal_log;
use crate::foundation::math::Vector2i;
use crate::platform::{delegate_component, ComponentCore};

const SYSTEM_CURSOR_SIZE: i32 = 32;

enum CursorSource {
    Standard(SystemCursorType, glfw::StandardCursor),
    Pixels {
        image: glfw::PixelImage,
        hotspot: (u32, u32),
    },
}

/// Cursor descriptions. A `glfw::Cursor` is owned by the window it is set on,
/// so each window gets its own native cursor built from the description.
pub struct GlfwCursorComponent {
    core: ComponentCore,
    cursors: RefCell<HandleMap<CursorKind, CursorSource>>,
}

impl GlfwCursorComponent {
    pub(crate) fn new() -> Self {
        Self {
            core: ComponentCore::new("GlfwCursorComponent", PalComponents::CURSOR, "pal::cursor"),
            cursors: RefCell::new(HandleMap::new()),
        }
    }

    fn prepare(&self, _context: &InitContext<'_>) -> PalResult<()> {
        Ok(())
    }

    fn release_all(&self) {
        self.cursors.borrow_mut().drain();
    }

    /// Build a native cursor for one window
    pub(crate) fn build(&self, handle: CursorHandle) -> PalResult<glfw::Cursor> {
        let cursors = self.cursors.borrow();
        Ok(match cursors.lookup(handle)? {
            CursorSource::Standard(_, shape) => glfw::Cursor::standard(*shape),
            CursorSource::Pixels { image, hotspot } => glfw::Cursor::create(
                glfw::PixelImage {
                    width: image.width,
                    height: image.height,
                    pixels: image.pixels.clone(),
                },
                hotspot.0,
                hotspot.1,
            ),
        })
    }

    fn standard_shape(kind: SystemCursorType) -> Option<glfw::StandardCursor> {
        match kind {
            SystemCursorType::Default => Some(glfw::StandardCursor::Arrow),
            SystemCursorType::TextBeam => Some(glfw::StandardCursor::IBeam),
            SystemCursorType::Crosshair => Some(glfw::StandardCursor::Crosshair),
            SystemCursorType::Hand => Some(glfw::StandardCursor::Hand),
            SystemCursorType::ResizeEw => Some(glfw::StandardCursor::HResize),
            SystemCursorType::ResizeNs => Some(glfw::StandardCursor::VResize),
            _ => None,
        }
    }
}

delegate_component!(GlfwCursorComponent);

impl CursorComponent for GlfwCursorComponent {
    fn create_standard(&self, kind: SystemCursorType) -> PalResult<CursorHandle> {
        let shape = Self::standard_shape(kind).unwrap_or_else(|| {
            pal_log!(self.core.logger(), Debug, "GLFW has no {kind:?} cursor, using the arrow");
            glfw::StandardCursor::Arrow
        });
        Ok(self.cursors.borrow_mut().insert(CursorSource::Standard(kind, shape)))
    }

    fn create_from_pixels(
        &self,
        width: u32,
        height: u32,
        rgba: &[u8],
        hotspot: Vector2i,
    ) -> PalResult<CursorHandle> {
        check_rgba(width, height, rgba)?;
        let hotspot = match (u32::try_from(hotspot.x), u32::try_from(hotspot.y)) {
            (Ok(x), Ok(y)) if x < width && y < height => (x, y),
            _ => {
                return Err(PalError::Precondition(format!(
                    "hotspot ({}, {}) lies outside the {width}x{height} image",
                    hotspot.x, hotspot.y
                )))
            }
        };
        Ok(self.cursors.borrow_mut().insert(CursorSource::Pixels {
            image: pixel_image(width, height, rgba),
            hotspot,
        }))
    }

    fn destroy(&self, handle: CursorHandle) -> PalResult<()> {
        self.cursors.borrow_mut().remove(handle);
        Ok(())
    }

    fn is_system_cursor(&self, handle: CursorHandle) -> PalResult<bool> {
        Ok(matches!(
            self.cursors.borrow().lookup(handle)?,
            CursorSource::Standard(..)
        ))
    }

    fn get_size(&self, handle: CursorHandle) -> PalResult<Vector2i> {
        Ok(match self.cursors.borrow().lookup(handle)? {
            CursorSource::Standard(..) => Vector2i::new(SYSTEM_CURSOR_SIZE, SYSTEM_CURSOR_SIZE),
            CursorSource::Pixels { image, .. } => Vector2i::new(
                i32::try_from(image.width).unwrap_or(i32::MAX),
                i32::try_from(image.height).unwrap_or(i32::MAX),
            ),
        })
    }
}
