/// Window surface and the queries made against it

use ash::vk;
use lumen_engine::lumen::device::SwapchainSupport;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_err, engine_error};
use raw_window_handle::{DisplayHandle, WindowHandle};

use crate::vulkan_format::{capabilities_from_vk, present_mode_from_vk, surface_format_from_vk};

pub(crate) struct VulkanSurface {
    pub(crate) loader: ash::khr::surface::Instance,
    pub(crate) surface: vk::SurfaceKHR,
}

impl VulkanSurface {
    pub(crate) fn new(
        entry: &ash::Entry,
        instance: &ash::Instance,
        display_handle: DisplayHandle<'_>,
        window_handle: WindowHandle<'_>,
    ) -> Result<Self> {
        let surface = unsafe {
            ash_window::create_surface(
                entry,
                instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
        }
        .map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to create surface: {:?}", e);
            Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
        })?;

        Ok(Self {
            loader: ash::khr::surface::Instance::new(entry, instance),
            surface,
        })
    }

    /// Capabilities, formats and present modes offered to `physical_device`
    pub(crate) fn query_support(&self, physical_device: vk::PhysicalDevice) -> Result<SwapchainSupport> {
        unsafe {
            let capabilities = self
                .loader
                .get_physical_device_surface_capabilities(physical_device, self.surface)
                .map_err(|e| engine_err!("lumen::vulkan", "Failed to query surface capabilities: {:?}", e))?;
            let formats = self
                .loader
                .get_physical_device_surface_formats(physical_device, self.surface)
                .map_err(|e| engine_err!("lumen::vulkan", "Failed to query surface formats: {:?}", e))?;
            let present_modes = self
                .loader
                .get_physical_device_surface_present_modes(physical_device, self.surface)
                .map_err(|e| engine_err!("lumen::vulkan", "Failed to query present modes: {:?}", e))?;

            Ok(SwapchainSupport {
                capabilities: capabilities_from_vk(&capabilities),
                formats: formats.iter().map(surface_format_from_vk).collect(),
                present_modes: present_modes
                    .into_iter()
                    .filter_map(present_mode_from_vk)
                    .collect(),
            })
        }
    }

    pub(crate) fn supports_present(&self, physical_device: vk::PhysicalDevice, family: u32) -> Result<bool> {
        unsafe {
            self.loader
                .get_physical_device_surface_support(physical_device, family, self.surface)
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to query present support: {:?}", e))
    }

    pub(crate) fn destroy(&self) {
        unsafe { self.loader.destroy_surface(self.surface, None) };
    }
}
