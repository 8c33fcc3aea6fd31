use std::cell::RefCell;
use std::rc::Rc;

use ash::vk::{self, Handle};

use super::host::{HeadlessHost, NativeId, NativeKind};
use super::simulated_failure;
use super::window::HeadlessWindowComponent;
use crate::components::vulkan::require_instance;
use crate::components::{InitContext, PalComponents, VulkanComponent};
use crate::error::{PalError, PalResult};
use crate::foundation::handle::WindowHandle;
use crate::foundation::logging::pal_log;
use crate::platform::{delegate_component, ComponentCore};

/// Extensions a headless Vulkan instance needs for window surfaces
const REQUIRED_EXTENSIONS: [&str; 2] = ["VK_KHR_surface", "VK_EXT_headless_surface"];

/// Synthetic Vulkan surfaces for headless windows
pub struct HeadlessVulkanComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
    windows: Rc<HeadlessWindowComponent>,
    surfaces: RefCell<Vec<NativeId>>,
}

impl HeadlessVulkanComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>, windows: Rc<HeadlessWindowComponent>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessVulkanComponent", PalComponents::VULKAN, "pal::vulkan"),
            host,
            windows,
            surfaces: RefCell::new(Vec::new()),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {
        let logger = self.core.logger();
        for native in self.surfaces.borrow_mut().drain(..) {
            self.host.ledger().release_logged(native, &logger);
        }
    }
}

delegate_component!(HeadlessVulkanComponent);

impl VulkanComponent for HeadlessVulkanComponent {
    fn get_required_instance_extensions(&self) -> PalResult<Vec<String>> {
        Ok(REQUIRED_EXTENSIONS.iter().map(ToString::to_string).collect())
    }

    fn get_physical_device_presentation_support(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        _queue_family: u32,
    ) -> PalResult<bool> {
        require_instance(instance)?;
        if physical_device == vk::PhysicalDevice::null() {
            return Err(PalError::Precondition("physical device handle is null".to_string()));
        }
        Ok(true)
    }

    fn create_window_surface(
        &self,
        instance: vk::Instance,
        window: WindowHandle,
        _allocator: Option<&vk::AllocationCallbacks>,
    ) -> PalResult<vk::SurfaceKHR> {
        require_instance(instance)?;
        let (_, hints) = self.windows.native_window(window)?;
        if !hints.is_vulkan() {
            return Err(PalError::Precondition(format!(
                "{window:?} was not created with Vulkan hints"
            )));
        }
        let native = self.host.ledger().allocate(NativeKind::VulkanSurface);
        self.surfaces.borrow_mut().push(native);
        pal_log!(self.core.logger(), Debug, "created surface {} for {window:?}", native.0);
        Ok(vk::SurfaceKHR::from_raw(native.0))
    }
}
