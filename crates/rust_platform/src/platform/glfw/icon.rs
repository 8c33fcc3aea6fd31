use std::cell::RefCell;

use crate::components::cursor::check_rgba;
use crate::components::{IconComponent, InitContext, PalComponents};
use crate::error::PalResult;
use crate::foundation::handle::{HandleMap, IconHandle, IconKind};
use crate::foundation::logging::pal_log;
use crate::foundation::math::Vector2i;
use crate::platform::{delegate_component, ComponentCore};

/// Pack RGBA bytes the way GLFW reads them back out of a `PixelImage`
pub(crate) fn pixel_image(width: u32, height: u32, rgba: &[u8]) -> glfw::PixelImage {
    glfw::PixelImage {
        width,
        height,
        pixels: rgba
            .chunks_exact(4)
            .map(|p| u32::from_ne_bytes([p[0], p[1], p[2], p[3]]))
            .collect(),
    }
}

/// Window icons kept as pixel data until a window uses them
pub struct GlfwIconComponent {
    core: ComponentCore,
    icons: RefCell<HandleMap<IconKind, glfw::PixelImage>>,
}

impl GlfwIconComponent {
    pub(crate) fn new() -> Self {
        Self {
            core: ComponentCore::new("GlfwIconComponent", PalComponents::ICON, "pal::icon"),
            icons: RefCell::new(HandleMap::new()),
        }
    }

    fn prepare(&self, _context: &InitContext<'_>) -> PalResult<()> {
        Ok(())
    }

    fn release_all(&self) {
        self.icons.borrow_mut().drain();
    }

    /// A copy of the icon's pixels for `glfw::Window::set_icon_from_pixels`
    pub(crate) fn image(&self, handle: IconHandle) -> PalResult<glfw::PixelImage> {
        let icons = self.icons.borrow();
        let image = icons.lookup(handle)?;
        Ok(glfw::PixelImage {
            width: image.width,
            height: image.height,
            pixels: image.pixels.clone(),
        })
    }
}

delegate_component!(GlfwIconComponent);

impl IconComponent for GlfwIconComponent {
    fn create_from_pixels(&self, width: u32, height: u32, rgba: &[u8]) -> PalResult<IconHandle> {
        check_rgba(width, height, rgba)?;
        let handle = self.icons.borrow_mut().insert(pixel_image(width, height, rgba));
        pal_log!(self.core.logger(), Debug, "created {width}x{height} icon {handle:?}");
        Ok(handle)
    }

    fn destroy(&self, handle: IconHandle) -> PalResult<()> {
        self.icons.borrow_mut().remove(handle);
        Ok(())
    }

    fn get_size(&self, handle: IconHandle) -> PalResult<Vector2i> {
        let icons = self.icons.borrow();
        let image = icons.lookup(handle)?;
        Ok(Vector2i::new(
            i32::try_from(image.width).unwrap_or(i32::MAX),
            i32::try_from(image.height).unwrap_or(i32::MAX),
        ))
    }
}
