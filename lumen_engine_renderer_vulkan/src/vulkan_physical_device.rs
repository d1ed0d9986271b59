/// Physical device enumeration and selection
///
/// Adapters are described into an `AdapterInfo` one at a time, in
/// enumeration order, until the engine's first-fit selector accepts one.
/// An adapter that cannot be queried is rejected, not fatal.

use ash::vk;
use lumen_engine::lumen::device::{
    max_usable_sample_count, select_first_suitable, AdapterInfo, DeviceRequirements,
    QueueFamilyInfo, SwapchainSupport,
};
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_err, engine_error, engine_info};

use crate::vulkan_format::{adapter_features_from_vk, adapter_type_from_vk, sample_counts_from_vk};
use crate::vulkan_surface::VulkanSurface;

/// Adapter chosen for the device stage
pub(crate) struct SelectedAdapter {
    pub(crate) physical_device: vk::PhysicalDevice,
    pub(crate) info: AdapterInfo,
}

/// Snapshot one adapter against `surface`
///
/// Surface capabilities are only queried when some queue family can present.
pub(crate) fn describe_adapter(
    instance: &ash::Instance,
    surface: &VulkanSurface,
    physical_device: vk::PhysicalDevice,
) -> Result<AdapterInfo> {
    unsafe {
        let properties = instance.get_physical_device_properties(physical_device);
        let features = instance.get_physical_device_features(physical_device);

        let name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "Unknown".to_string());

        let extensions = instance
            .enumerate_device_extension_properties(physical_device)
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to enumerate device extensions: {:?}", e))?
            .iter()
            .filter_map(|ext| ext.extension_name_as_c_str().ok())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();

        let families = instance.get_physical_device_queue_family_properties(physical_device);
        let mut queue_families = Vec::with_capacity(families.len());
        for (index, family) in families.iter().enumerate() {
            queue_families.push(QueueFamilyInfo {
                queue_count: family.queue_count,
                supports_graphics: family.queue_flags.contains(vk::QueueFlags::GRAPHICS),
                supports_present: surface.supports_present(physical_device, index as u32)?,
            });
        }

        let swapchain_support = if queue_families.iter().any(|family| family.supports_present) {
            surface.query_support(physical_device)?
        } else {
            SwapchainSupport::default()
        };

        let limits = &properties.limits;
        let max_sample_count = max_usable_sample_count(
            sample_counts_from_vk(limits.framebuffer_color_sample_counts),
            sample_counts_from_vk(limits.framebuffer_depth_sample_counts),
        );

        Ok(AdapterInfo {
            name,
            adapter_type: adapter_type_from_vk(properties.device_type),
            features: adapter_features_from_vk(&features),
            extensions,
            queue_families,
            swapchain_support,
            max_sample_count,
        })
    }
}

/// Enumerate adapters and pick the first suitable one
pub(crate) fn pick_physical_device(
    instance: &ash::Instance,
    surface: &VulkanSurface,
    requirements: &DeviceRequirements,
) -> Result<SelectedAdapter> {
    let devices = unsafe { instance.enumerate_physical_devices() }.map_err(|e| {
        engine_error!("lumen::vulkan", "Failed to enumerate physical devices: {:?}", e);
        Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
    })?;

    let candidates = devices
        .iter()
        .map(|&device| describe_adapter(instance, surface, device));
    let (index, info) = select_first_suitable(candidates, requirements)?;
    engine_info!(
        "lumen::vulkan",
        "Using {} ({:?}, max {:?} samples)",
        info.name,
        info.adapter_type,
        info.max_sample_count
    );

    Ok(SelectedAdapter {
        physical_device: devices[index],
        info,
    })
}
