/// Single-subpass render pass: colour, depth and (when multisampled) a resolve target
///
/// Multisampled layout: 0 = MSAA colour, 1 = depth, 2 = swapchain image
/// the colour is resolved into. Single-sampled layout renders straight
/// into the swapchain image: 0 = swapchain colour, 1 = depth.

use ash::vk;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::engine_error;

/// Formats and sample count shared by the render pass, pipeline and framebuffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AttachmentLayout {
    /// Swapchain image format
    pub(crate) color_format: vk::Format,
    pub(crate) depth_format: vk::Format,
    pub(crate) samples: vk::SampleCountFlags,
}

impl AttachmentLayout {
    pub(crate) fn is_multisampled(&self) -> bool {
        self.samples != vk::SampleCountFlags::TYPE_1
    }

    pub(crate) fn descriptions(&self) -> Vec<vk::AttachmentDescription> {
        let depth = vk::AttachmentDescription::default()
            .format(self.depth_format)
            .samples(self.samples)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

        if !self.is_multisampled() {
            let color = vk::AttachmentDescription::default()
                .format(self.color_format)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::STORE)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);
            return vec![color, depth];
        }

        // Multisampled colour is only read by the resolve
        let color = vk::AttachmentDescription::default()
            .format(self.color_format)
            .samples(self.samples)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        let resolve = vk::AttachmentDescription::default()
            .format(self.color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::DONT_CARE)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);
        vec![color, depth, resolve]
    }

    /// Framebuffer views in attachment order
    ///
    /// `color_view` is only used when multisampled.
    pub(crate) fn framebuffer_views(
        &self,
        color_view: vk::ImageView,
        depth_view: vk::ImageView,
        swapchain_view: vk::ImageView,
    ) -> Vec<vk::ImageView> {
        if self.is_multisampled() {
            vec![color_view, depth_view, swapchain_view]
        } else {
            vec![swapchain_view, depth_view]
        }
    }

    /// Clear values for the colour and depth attachments
    pub(crate) fn clear_values(&self, clear_color: [f32; 4]) -> [vk::ClearValue; 2] {
        [
            vk::ClearValue {
                color: vk::ClearColorValue { float32: clear_color },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue { depth: 1.0, stencil: 0 },
            },
        ]
    }
}

/// Create the render pass for `layout`
///
/// The external dependency makes the first colour and depth writes wait for
/// the previous frame's use of the attachments and the image-available
/// semaphore.
pub(crate) fn create_render_pass(device: &ash::Device, layout: &AttachmentLayout) -> Result<vk::RenderPass> {
    let attachments = layout.descriptions();

    let color_refs = [vk::AttachmentReference {
        attachment: 0,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];
    let depth_ref = vk::AttachmentReference {
        attachment: 1,
        layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
    };
    let resolve_refs = [vk::AttachmentReference {
        attachment: 2,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];

    let mut subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs)
        .depth_stencil_attachment(&depth_ref);
    if layout.is_multisampled() {
        subpass = subpass.resolve_attachments(&resolve_refs);
    }

    let dependency = vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
        )
        .src_access_mask(vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE)
        .dst_stage_mask(
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
        )
        .dst_access_mask(
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        );

    let subpasses = [subpass];
    let dependencies = [dependency];
    let create_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    unsafe { device.create_render_pass(&create_info, None) }.map_err(render_pass_error)
}

pub(crate) fn render_pass_error(result: vk::Result) -> Error {
    engine_error!("lumen::vulkan", "Failed to create render pass: {:?}", result);
    Error::PipelineCreation(format!("Failed to create render pass: {:?}", result))
}

#[cfg(test)]
#[path = "vulkan_render_pass_tests.rs"]
mod tests;
