/// Transient framebuffer attachments: the multisampled colour target and the depth buffer
///
/// Both are sized to the swapchain and rebuilt with it.

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::{AllocationError, MemoryLocation};
use lumen_engine::lumen::device::Extent2D;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_debug, engine_error};

use crate::vulkan_device::VulkanDevice;

/// Depth formats in order of preference
pub(crate) const DEPTH_FORMAT_CANDIDATES: [vk::Format; 3] = [
    vk::Format::D32_SFLOAT,
    vk::Format::D32_SFLOAT_S8_UINT,
    vk::Format::D24_UNORM_S8_UINT,
];

/// First candidate whose `tiling` supports every bit of `features`
pub(crate) fn choose_supported_format<F>(
    candidates: &[vk::Format],
    tiling: vk::ImageTiling,
    features: vk::FormatFeatureFlags,
    properties_of: F,
) -> Option<vk::Format>
where
    F: Fn(vk::Format) -> vk::FormatProperties,
{
    candidates.iter().copied().find(|&format| {
        let properties = properties_of(format);
        match tiling {
            vk::ImageTiling::LINEAR => properties.linear_tiling_features.contains(features),
            vk::ImageTiling::OPTIMAL => properties.optimal_tiling_features.contains(features),
            _ => false,
        }
    })
}

/// Depth format the adapter can use as an optimally tiled attachment
pub(crate) fn find_depth_format(instance: &ash::Instance, physical_device: vk::PhysicalDevice) -> Result<vk::Format> {
    choose_supported_format(
        &DEPTH_FORMAT_CANDIDATES,
        vk::ImageTiling::OPTIMAL,
        vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
        |format| unsafe { instance.get_physical_device_format_properties(physical_device, format) },
    )
    .ok_or_else(|| {
        engine_error!("lumen::vulkan", "No supported depth format among {:?}", DEPTH_FORMAT_CANDIDATES);
        Error::InitializationFailed("no supported depth attachment format".to_string())
    })
}

/// Out-of-memory allocations become `Error::OutOfMemory`, anything else a swapchain error
pub(crate) fn map_allocation_error(error: AllocationError, name: &str) -> Error {
    match error {
        AllocationError::OutOfMemory => {
            engine_error!("lumen::vulkan", "Out of GPU memory for {} attachment", name);
            Error::OutOfMemory
        }
        other => {
            engine_error!("lumen::vulkan", "Failed to allocate {} attachment: {:?}", name, other);
            Error::SwapchainCreation(format!("Failed to allocate {} attachment: {:?}", name, other))
        }
    }
}

/// Image, its memory and a view over it
pub(crate) struct AttachmentImage {
    pub(crate) image: vk::Image,
    pub(crate) view: vk::ImageView,
    allocation: Option<Allocation>,
}

impl AttachmentImage {
    /// Create a device-local single-mip attachment of `extent`
    ///
    /// A failure at any step releases what was already created.
    pub(crate) fn new(
        device: &VulkanDevice,
        name: &'static str,
        extent: Extent2D,
        format: vk::Format,
        samples: vk::SampleCountFlags,
        usage: vk::ImageUsageFlags,
        aspect_mask: vk::ImageAspectFlags,
    ) -> Result<Self> {
        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(samples)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = unsafe { device.device.create_image(&image_info, None) }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to create {} image: {:?}", name, e);
            Error::SwapchainCreation(format!("Failed to create {} image: {:?}", name, e))
        })?;

        let mut attachment = Self {
            image,
            view: vk::ImageView::null(),
            allocation: None,
        };
        if let Err(e) = attachment.bind_and_view(device, name, format, aspect_mask) {
            attachment.destroy(device);
            return Err(e);
        }

        engine_debug!(
            "lumen::vulkan",
            "Created {} attachment {}x{} ({:?}, {:?})",
            name,
            extent.width,
            extent.height,
            format,
            samples
        );
        Ok(attachment)
    }

    fn bind_and_view(
        &mut self,
        device: &VulkanDevice,
        name: &'static str,
        format: vk::Format,
        aspect_mask: vk::ImageAspectFlags,
    ) -> Result<()> {
        let requirements = unsafe { device.device.get_image_memory_requirements(self.image) };
        let allocation = device
            .allocator()?
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location: MemoryLocation::GpuOnly,
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|e| map_allocation_error(e, name))?;

        let memory = unsafe { allocation.memory() };
        let offset = allocation.offset();
        self.allocation = Some(allocation);

        unsafe { device.device.bind_image_memory(self.image, memory, offset) }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to bind {} image memory: {:?}", name, e);
            Error::SwapchainCreation(format!("Failed to bind {} image memory: {:?}", name, e))
        })?;

        let view_info = vk::ImageViewCreateInfo::default()
            .image(self.image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        self.view = unsafe { device.device.create_image_view(&view_info, None) }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to create {} image view: {:?}", name, e);
            Error::SwapchainCreation(format!("Failed to create {} image view: {:?}", name, e))
        })?;
        Ok(())
    }

    pub(crate) fn destroy(&mut self, device: &VulkanDevice) {
        unsafe {
            if self.view != vk::ImageView::null() {
                device.device.destroy_image_view(self.view, None);
                self.view = vk::ImageView::null();
            }

            if let Some(allocation) = self.allocation.take() {
                if let Ok(mut allocator) = device.allocator() {
                    allocator.free(allocation).ok();
                }
            }

            if self.image != vk::Image::null() {
                device.device.destroy_image(self.image, None);
                self.image = vk::Image::null();
            }
        }
    }
}

#[cfg(test)]
#[path = "vulkan_attachment_tests.rs"]
mod tests;
