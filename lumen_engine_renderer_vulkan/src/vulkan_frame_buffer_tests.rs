//! Unit tests for framebuffer error mapping (no GPU required)

use crate::vulkan_frame_buffer::*;
use ash::vk;
use lumen_engine::lumen::Error;

#[test]
fn test_framebuffer_failure_is_swapchain_creation() {
    match framebuffer_error(vk::Result::ERROR_OUT_OF_HOST_MEMORY) {
        Error::SwapchainCreation(msg) => {
            assert_eq!(msg, "Failed to create framebuffer: ERROR_OUT_OF_HOST_MEMORY");
        }
        other => panic!("unexpected error {}", other),
    }
}

#[test]
fn test_framebuffer_failure_is_not_bring_up_initialization() {
    let err = framebuffer_error(vk::Result::ERROR_INITIALIZATION_FAILED);
    assert!(!matches!(err, Error::InitializationFailed(_)));
}
