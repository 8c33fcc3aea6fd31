use std::rc::Rc;

use ash::vk;

use super::window::GlfwWindowComponent;
use super::{GlfwShared, BACKEND};
use crate::components::vulkan::require_instance;
use crate::components::{InitContext, PalComponents, VulkanComponent};
use crate::error::{PalError, PalResult};
use crate::foundation::handle::WindowHandle;
use crate::foundation::logging::pal_log;
use crate::platform::{delegate_component, ComponentCore};

/// Vulkan presentation through GLFW's loader
pub struct GlfwVulkanComponent {
    core: ComponentCore,
    shared: Rc<GlfwShared>,
    windows: Rc<GlfwWindowComponent>,
}

impl GlfwVulkanComponent {
    pub(crate) fn new(shared: Rc<GlfwShared>, windows: Rc<GlfwWindowComponent>) -> Self {
        Self {
            core: ComponentCore::new("GlfwVulkanComponent", PalComponents::VULKAN, "pal::vulkan"),
            shared,
            windows,
        }
    }

    fn prepare(&self, _context: &InitContext<'_>) -> PalResult<()> {
        if !self.shared.glfw().vulkan_supported() {
            pal_log!(self.core.logger(), Info, "no Vulkan loader found");
            return Err(PalError::Unsupported(PalComponents::VULKAN));
        }
        Ok(())
    }

    fn release_all(&self) {}
}

delegate_component!(GlfwVulkanComponent);

impl VulkanComponent for GlfwVulkanComponent {
    fn get_required_instance_extensions(&self) -> PalResult<Vec<String>> {
        self.shared
            .glfw()
            .get_required_instance_extensions()
            .ok_or_else(|| PalError::native(BACKEND, "GLFW reported no Vulkan instance extensions"))
    }

    fn get_physical_device_presentation_support(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        queue_family: u32,
    ) -> PalResult<bool> {
        require_instance(instance)?;
        if physical_device == vk::PhysicalDevice::null() {
            return Err(PalError::Precondition("physical device handle is null".to_string()));
        }
        Ok(self
            .shared
            .glfw()
            .get_physical_device_presentation_support_raw(instance, physical_device, queue_family))
    }

    fn create_window_surface(
        &self,
        instance: vk::Instance,
        window: WindowHandle,
        allocator: Option<&vk::AllocationCallbacks>,
    ) -> PalResult<vk::SurfaceKHR> {
        require_instance(instance)?;
        if !self.windows.hints(window)?.is_vulkan() {
            return Err(PalError::Precondition(format!(
                "{window:?} was not created with Vulkan hints"
            )));
        }
        let allocator = allocator.map_or(std::ptr::null(), std::ptr::from_ref);
        let mut surface = vk::SurfaceKHR::null();
        let result = self
            .windows
            .with_native(window, |native| native.create_window_surface(instance, allocator, &mut surface))?;
        if result != vk::Result::SUCCESS {
            return Err(PalError::Vulkan(result));
        }
        pal_log!(self.core.logger(), Debug, "created surface for {window:?}");
        Ok(surface)
    }
}
