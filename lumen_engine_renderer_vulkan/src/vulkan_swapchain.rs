/// Swapchain, its images and image views

use ash::vk;
use lumen_engine::lumen::device::{Extent2D, PresentMode, SurfaceFormat};
use lumen_engine::lumen::frame::{AcquireOutcome, PresentOutcome};
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_debug, engine_err, engine_error, engine_trace};

use crate::vulkan_device::VulkanDevice;
use crate::vulkan_format::{extent_to_vk, pixel_format_to_vk, present_mode_to_vk, surface_format_to_vk};
use crate::vulkan_surface::VulkanSurface;

pub(crate) struct VulkanSwapchain {
    pub(crate) swapchain: vk::SwapchainKHR,
    pub(crate) images: Vec<vk::Image>,
    pub(crate) image_views: Vec<vk::ImageView>,
    pub(crate) surface_format: SurfaceFormat,
    pub(crate) present_mode: PresentMode,
    pub(crate) extent: Extent2D,
}

impl VulkanSwapchain {
    /// Create a swapchain sized for a window of `framebuffer_size`
    ///
    /// `old_swapchain` may be null; when set it is handed to the driver for
    /// resource reuse and must be destroyed by the caller afterwards.
    pub(crate) fn new(
        device: &VulkanDevice,
        surface: &VulkanSurface,
        framebuffer_size: Extent2D,
        old_swapchain: vk::SwapchainKHR,
    ) -> Result<Self> {
        let support = surface.query_support(device.physical_device)?;
        let surface_format = support.choose_surface_format().ok_or_else(|| {
            engine_error!("lumen::vulkan", "Surface reports no formats");
            Error::SwapchainCreation("surface reports no formats".to_string())
        })?;
        let present_mode = support.choose_present_mode();
        let extent = support.choose_extent(framebuffer_size);
        let image_count = support.image_count();

        let families = device.queue_families.unique();
        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface.surface)
            .min_image_count(image_count)
            .image_format(pixel_format_to_vk(surface_format.format))
            .image_color_space(surface_format_to_vk(surface_format).color_space)
            .image_extent(extent_to_vk(extent))
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode_to_vk(present_mode))
            .clipped(true)
            .old_swapchain(old_swapchain);

        create_info = if device.queue_families.is_split() {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&families)
        } else {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        };

        // The engine snapshot carries no transform; use the surface's own
        let capabilities = unsafe {
            surface
                .loader
                .get_physical_device_surface_capabilities(device.physical_device, surface.surface)
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to get surface capabilities: {:?}", e))?;
        create_info = create_info.pre_transform(capabilities.current_transform);

        let swapchain = unsafe { device.swapchain_loader.create_swapchain(&create_info, None) }
            .map_err(|e| {
                engine_error!("lumen::vulkan", "Failed to create swapchain: {:?}", e);
                Error::SwapchainCreation(format!("Failed to create swapchain: {:?}", e))
            })?;

        let images = match unsafe { device.swapchain_loader.get_swapchain_images(swapchain) } {
            Ok(images) => images,
            Err(e) => {
                unsafe { device.swapchain_loader.destroy_swapchain(swapchain, None) };
                engine_error!("lumen::vulkan", "Failed to get swapchain images: {:?}", e);
                return Err(Error::SwapchainCreation(format!("Failed to get swapchain images: {:?}", e)));
            }
        };

        let mut result = Self {
            swapchain,
            images,
            image_views: Vec::new(),
            surface_format,
            present_mode,
            extent,
        };

        let format = pixel_format_to_vk(surface_format.format);
        for index in 0..result.images.len() {
            let image = result.images[index];
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .components(vk::ComponentMapping::default())
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            match unsafe { device.device.create_image_view(&view_info, None) } {
                Ok(view) => result.image_views.push(view),
                Err(e) => {
                    result.destroy(device);
                    engine_error!("lumen::vulkan", "Failed to create swapchain image views: {:?}", e);
                    return Err(Error::SwapchainCreation(format!(
                        "Failed to create swapchain image views: {:?}",
                        e
                    )));
                }
            }
        }

        engine_debug!(
            "lumen::vulkan",
            "Swapchain {}x{} ({} images, {:?}, {:?})",
            extent.width,
            extent.height,
            result.images.len(),
            surface_format.format,
            present_mode
        );
        Ok(result)
    }

    pub(crate) fn image_count(&self) -> usize {
        self.images.len()
    }

    pub(crate) fn acquire_next_image(
        &self,
        device: &VulkanDevice,
        image_available: vk::Semaphore,
    ) -> Result<AcquireOutcome> {
        let result = unsafe {
            device.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                image_available,
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, suboptimal)) => Ok(AcquireOutcome::Acquired { image_index, suboptimal }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                engine_trace!("lumen::vulkan", "Swapchain out of date during acquire");
                Ok(AcquireOutcome::OutOfDate)
            }
            Err(e) => {
                engine_error!("lumen::vulkan", "Failed to acquire next swapchain image: {:?}", e);
                Err(Error::Presentation(format!("Failed to acquire next swapchain image: {:?}", e)))
            }
        }
    }

    pub(crate) fn present(
        &self,
        device: &VulkanDevice,
        render_finished: vk::Semaphore,
        image_index: u32,
    ) -> Result<PresentOutcome> {
        let wait_semaphores = [render_finished];
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { device.swapchain_loader.queue_present(device.present_queue, &present_info) } {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) => Ok(PresentOutcome::Stale),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                engine_trace!("lumen::vulkan", "Swapchain out of date during present");
                Ok(PresentOutcome::Stale)
            }
            Err(e) => {
                engine_error!("lumen::vulkan", "Failed to present swapchain image: {:?}", e);
                Err(Error::Presentation(format!("Failed to present swapchain image: {:?}", e)))
            }
        }
    }

    /// Destroy image views then the swapchain
    pub(crate) fn destroy(&mut self, device: &VulkanDevice) {
        unsafe {
            for view in self.image_views.drain(..) {
                device.device.destroy_image_view(view, None);
            }
            if self.swapchain != vk::SwapchainKHR::null() {
                device.swapchain_loader.destroy_swapchain(self.swapchain, None);
                self.swapchain = vk::SwapchainKHR::null();
            }
        }
        self.images.clear();
    }
}
