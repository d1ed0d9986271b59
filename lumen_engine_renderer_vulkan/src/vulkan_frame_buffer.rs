/// Framebuffers and the attachments they share across swapchain images
///
/// The multisampled colour target (when multisampled) and the depth buffer
/// are created once per swapchain and referenced by every framebuffer.

use ash::vk;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_debug, engine_error};

use crate::vulkan_attachment::AttachmentImage;
use crate::vulkan_device::VulkanDevice;
use crate::vulkan_format::extent_to_vk;
use crate::vulkan_render_pass::AttachmentLayout;
use crate::vulkan_swapchain::VulkanSwapchain;

pub(crate) fn framebuffer_error(result: vk::Result) -> Error {
    engine_error!("lumen::vulkan", "Failed to create framebuffer: {:?}", result);
    Error::SwapchainCreation(format!("Failed to create framebuffer: {:?}", result))
}

pub(crate) struct VulkanFrameBuffers {
    color: Option<AttachmentImage>,
    depth: Option<AttachmentImage>,
    framebuffers: Vec<vk::Framebuffer>,
}

impl VulkanFrameBuffers {
    /// Attachments sized to `swapchain`, then one framebuffer per swapchain image
    ///
    /// A failure releases everything created so far.
    pub(crate) fn new(
        device: &VulkanDevice,
        render_pass: vk::RenderPass,
        swapchain: &VulkanSwapchain,
        layout: &AttachmentLayout,
    ) -> Result<Self> {
        let mut frame_buffers = Self {
            color: None,
            depth: None,
            framebuffers: Vec::with_capacity(swapchain.image_views.len()),
        };
        if let Err(e) = frame_buffers.build(device, render_pass, swapchain, layout) {
            frame_buffers.destroy(device);
            return Err(e);
        }

        engine_debug!(
            "lumen::vulkan",
            "Created {} framebuffers ({:?}, depth {:?})",
            frame_buffers.framebuffers.len(),
            layout.samples,
            layout.depth_format
        );
        Ok(frame_buffers)
    }

    fn build(
        &mut self,
        device: &VulkanDevice,
        render_pass: vk::RenderPass,
        swapchain: &VulkanSwapchain,
        layout: &AttachmentLayout,
    ) -> Result<()> {
        if layout.is_multisampled() {
            self.color = Some(AttachmentImage::new(
                device,
                "msaa colour",
                swapchain.extent,
                layout.color_format,
                layout.samples,
                vk::ImageUsageFlags::TRANSIENT_ATTACHMENT | vk::ImageUsageFlags::COLOR_ATTACHMENT,
                vk::ImageAspectFlags::COLOR,
            )?);
        }
        let depth = self.depth.insert(AttachmentImage::new(
            device,
            "depth",
            swapchain.extent,
            layout.depth_format,
            layout.samples,
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            vk::ImageAspectFlags::DEPTH,
        )?);
        let depth_view = depth.view;
        let color_view = self
            .color
            .as_ref()
            .map_or(vk::ImageView::null(), |color| color.view);

        let extent = extent_to_vk(swapchain.extent);
        for &swapchain_view in &swapchain.image_views {
            let attachments = layout.framebuffer_views(color_view, depth_view, swapchain_view);
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass)
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);

            let framebuffer = unsafe { device.device.create_framebuffer(&create_info, None) }
                .map_err(framebuffer_error)?;
            self.framebuffers.push(framebuffer);
        }
        Ok(())
    }

    /// Framebuffer for swapchain image `image_index`
    pub(crate) fn get(&self, image_index: u32) -> Option<vk::Framebuffer> {
        self.framebuffers.get(image_index as usize).copied()
    }

    pub(crate) fn destroy(&mut self, device: &VulkanDevice) {
        for framebuffer in self.framebuffers.drain(..) {
            unsafe { device.device.destroy_framebuffer(framebuffer, None) };
        }
        if let Some(mut depth) = self.depth.take() {
            depth.destroy(device);
        }
        if let Some(mut color) = self.color.take() {
            color.destroy(device);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_frame_buffer_tests.rs"]
mod tests;
