//! Vulkan capability
//!
//! The platform layer never calls Vulkan itself beyond surface creation; it
//! reports what an instance needs and wraps window surfaces.

use ash::vk;

use super::PalComponent;
use crate::error::PalResult;
use crate::foundation::handle::WindowHandle;
use crate::foundation::marshal::AnsiStringArray;

/// Vulkan instance requirements and window surfaces
pub trait VulkanComponent: PalComponent {
    /// Instance extensions that must be enabled for surface creation
    fn get_required_instance_extensions(&self) -> PalResult<Vec<String>>;

    /// The required extensions marshaled for `vk::InstanceCreateInfo`
    fn get_required_instance_extensions_ffi(&self) -> PalResult<AnsiStringArray> {
        AnsiStringArray::new(&self.get_required_instance_extensions()?)
    }

    /// Whether `queue_family` of `physical_device` can present to this
    /// platform's windows
    fn get_physical_device_presentation_support(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        queue_family: u32,
    ) -> PalResult<bool>;

    /// Create a surface for a window created with Vulkan hints. The caller
    /// owns the surface and destroys it through Vulkan.
    fn create_window_surface(
        &self,
        instance: vk::Instance,
        window: WindowHandle,
        allocator: Option<&vk::AllocationCallbacks>,
    ) -> PalResult<vk::SurfaceKHR>;
}

/// Precondition check shared by backends
pub(crate) fn require_instance(instance: vk::Instance) -> PalResult<()> {
    if instance == vk::Instance::null() {
        return Err(crate::error::PalError::Precondition(
            "Vulkan instance handle is null".to_string(),
        ));
    }
    Ok(())
}
