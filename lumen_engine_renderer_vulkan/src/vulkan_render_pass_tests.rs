//! Unit tests for the render pass attachment layout (no GPU required)

use crate::vulkan_render_pass::*;
use ash::vk;
use lumen_engine::lumen::Error;

fn layout(samples: vk::SampleCountFlags) -> AttachmentLayout {
    AttachmentLayout {
        color_format: vk::Format::B8G8R8A8_SRGB,
        depth_format: vk::Format::D32_SFLOAT,
        samples,
    }
}

fn view(raw: u64) -> vk::ImageView {
    use ash::vk::Handle;
    vk::ImageView::from_raw(raw)
}

// ============================================================================
// MULTISAMPLED
// ============================================================================

#[test]
fn test_multisampled_layout_resolves_into_swapchain_image() {
    let descriptions = layout(vk::SampleCountFlags::TYPE_8).descriptions();
    assert_eq!(descriptions.len(), 3);

    let (color, depth, resolve) = (&descriptions[0], &descriptions[1], &descriptions[2]);
    assert_eq!(color.samples, vk::SampleCountFlags::TYPE_8);
    assert_eq!(color.load_op, vk::AttachmentLoadOp::CLEAR);
    assert_eq!(color.final_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    assert_eq!(depth.format, vk::Format::D32_SFLOAT);
    assert_eq!(depth.samples, vk::SampleCountFlags::TYPE_8);
    assert_eq!(depth.final_layout, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

    assert_eq!(resolve.format, vk::Format::B8G8R8A8_SRGB);
    assert_eq!(resolve.samples, vk::SampleCountFlags::TYPE_1);
    assert_eq!(resolve.store_op, vk::AttachmentStoreOp::STORE);
    assert_eq!(resolve.final_layout, vk::ImageLayout::PRESENT_SRC_KHR);
}

#[test]
fn test_multisampled_framebuffer_views_order() {
    let views = layout(vk::SampleCountFlags::TYPE_4).framebuffer_views(view(1), view(2), view(3));
    assert_eq!(views, vec![view(1), view(2), view(3)]);
}

// ============================================================================
// SINGLE-SAMPLED
// ============================================================================

#[test]
fn test_single_sampled_layout_has_no_resolve() {
    let single = layout(vk::SampleCountFlags::TYPE_1);
    assert!(!single.is_multisampled());

    let descriptions = single.descriptions();
    assert_eq!(descriptions.len(), 2);
    assert_eq!(descriptions[0].samples, vk::SampleCountFlags::TYPE_1);
    assert_eq!(descriptions[0].store_op, vk::AttachmentStoreOp::STORE);
    assert_eq!(descriptions[0].final_layout, vk::ImageLayout::PRESENT_SRC_KHR);
    assert_eq!(descriptions[1].format, vk::Format::D32_SFLOAT);
}

#[test]
fn test_single_sampled_framebuffer_skips_color_target() {
    let views = layout(vk::SampleCountFlags::TYPE_1).framebuffer_views(view(1), view(2), view(3));
    assert_eq!(views, vec![view(3), view(2)]);
}

// ============================================================================
// CLEAR VALUES
// ============================================================================

#[test]
fn test_clear_values_color_then_far_depth() {
    let values = layout(vk::SampleCountFlags::TYPE_4).clear_values([0.1, 0.2, 0.3, 1.0]);
    unsafe {
        assert_eq!(values[0].color.float32, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(values[1].depth_stencil.depth, 1.0);
        assert_eq!(values[1].depth_stencil.stencil, 0);
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_render_pass_failure_is_pipeline_creation() {
    match render_pass_error(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY) {
        Error::PipelineCreation(msg) => assert!(msg.contains("ERROR_OUT_OF_DEVICE_MEMORY")),
        other => panic!("unexpected error {}", other),
    }
}
