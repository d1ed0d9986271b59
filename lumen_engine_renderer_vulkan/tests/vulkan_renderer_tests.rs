//! Integration tests for VulkanRenderer
//!
//! These tests bring up a real device on a hidden window. All of them
//! require a GPU and are marked with #[ignore]; the ones that render also
//! need the demo shaders compiled to SPIR-V (see lumen_demo/shaders).
//!
//! Run with: cargo test --test vulkan_renderer_tests -- --ignored

use lumen_engine::lumen::config::{RendererConfig, ShaderPaths};
use lumen_engine::lumen::device::Extent2D;
use lumen_engine::lumen::frame::{
    BringUpStage, FrameBackend, FrameOutcome, FrameScheduler, WindowSurface,
};
use lumen_engine::lumen::device::AdapterFeatures;
use lumen_engine::lumen::{Error, Result};
use lumen_engine_renderer_vulkan::VulkanRenderer;
use std::path::PathBuf;
use winit::event_loop::EventLoop;
use winit::window::Window;

/// Helper to create a test window for Vulkan
#[allow(deprecated)]
fn create_test_window() -> (Window, EventLoop<()>) {
    let event_loop = EventLoop::new().unwrap();
    let window_attrs = Window::default_attributes()
        .with_title("Lumen Vulkan Test")
        .with_inner_size(winit::dpi::PhysicalSize::new(800, 600))
        .with_visible(false); // Hidden window for tests
    let window = event_loop.create_window(window_attrs).unwrap();
    (window, event_loop)
}

fn window_size(window: &Window) -> Extent2D {
    let size = window.inner_size();
    Extent2D::new(size.width, size.height)
}

/// Any adapter type, demo shaders, validation off unless the layer exists
fn test_config() -> RendererConfig {
    let mut config = RendererConfig::default();
    config.device_requirements.adapter_type = None;
    config.device_requirements.features = AdapterFeatures::empty();
    config.enable_validation = false;
    config.shaders = ShaderPaths::new(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../lumen_demo/shaders"),
        "triangle",
    );
    config
}

struct FixedWindow(Extent2D);

impl WindowSurface for FixedWindow {
    fn framebuffer_size(&self) -> Extent2D {
        self.0
    }

    fn pump_events(&mut self) {}
}

// ============================================================================
// BRING-UP
// ============================================================================

#[test]
#[ignore] // Requires GPU and compiled shaders
fn test_vulkan_bring_up_records_every_stage() {
    let (window, _event_loop) = create_test_window();
    let renderer = VulkanRenderer::new(&window, window_size(&window), test_config()).unwrap();

    let expected: Vec<BringUpStage> = BringUpStage::ALL
        .iter()
        .copied()
        .filter(|stage| *stage != BringUpStage::DebugMessenger)
        .collect();
    assert_eq!(renderer.bring_up_stages(), expected.as_slice());
    assert!(renderer.swapchain_image_count() >= 2);
    assert!(renderer.present_mode().is_some());
    assert!(!renderer.swapchain_extent().is_degenerate());
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_missing_shaders_fail_with_shader_module_load() {
    let (window, _event_loop) = create_test_window();
    let mut config = test_config();
    config.shaders = ShaderPaths::new("/nonexistent/lumen/shaders", "triangle");

    let result = VulkanRenderer::new(&window, window_size(&window), config);
    assert!(matches!(result, Err(Error::ShaderModuleLoad(_))));
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_impossible_extension_rejects_every_adapter() {
    let (window, _event_loop) = create_test_window();
    let mut config = test_config();
    config
        .required_device_extensions
        .push("VK_LUMEN_does_not_exist".to_string());

    let result = VulkanRenderer::new(&window, window_size(&window), config);
    assert!(matches!(result, Err(Error::NoSuitableDevice(_))));
}

#[test]
#[ignore] // Requires GPU and compiled shaders
fn test_vulkan_multisampling_uses_adapter_maximum() {
    let (window, _event_loop) = create_test_window();
    let renderer = VulkanRenderer::new(&window, window_size(&window), test_config()).unwrap();
    assert_eq!(renderer.sample_count(), renderer.adapter_info().max_sample_count.bits());
}

#[test]
#[ignore] // Requires GPU and compiled shaders
fn test_vulkan_single_sampled_renders_and_rebuilds() {
    let (window, _event_loop) = create_test_window();
    let mut config = test_config();
    config.multisampling = false;

    let renderer = VulkanRenderer::new(&window, window_size(&window), config).unwrap();
    assert_eq!(renderer.sample_count(), 1);

    let mut scheduler = FrameScheduler::new(renderer);
    scheduler.draw_frame(0.016).unwrap();
    let mut surface = FixedWindow(window_size(&window));
    scheduler.recreate_swapchain(&mut surface).unwrap();
    scheduler.draw_frame(0.016).unwrap();
    scheduler.shutdown().unwrap();
}

// ============================================================================
// FRAME LOOP
// ============================================================================

#[test]
#[ignore] // Requires GPU and compiled shaders
fn test_vulkan_frames_alternate_slots() {
    let (window, _event_loop) = create_test_window();
    let renderer = VulkanRenderer::new(&window, window_size(&window), test_config()).unwrap();
    let mut scheduler = FrameScheduler::new(renderer);

    for n in 1..=6 {
        let outcome = scheduler.draw_frame(0.016).unwrap();
        assert!(matches!(outcome, FrameOutcome::Presented | FrameOutcome::PresentedStale));
        if outcome == FrameOutcome::PresentedStale {
            break;
        }
        assert_eq!(scheduler.current_frame(), n % 2);
    }

    scheduler.shutdown().unwrap();
    assert!(scheduler.backend().bring_up_stages().is_empty());
}

#[test]
#[ignore] // Requires GPU and compiled shaders
fn test_vulkan_draw_callback_receives_command_buffer() {
    let (window, _event_loop) = create_test_window();
    let renderer = VulkanRenderer::new(&window, window_size(&window), test_config()).unwrap();
    let mut scheduler = FrameScheduler::new(renderer);

    scheduler.add_draw_callback(
        |device: &ash::Device, command_buffer: ash::vk::CommandBuffer, _dt: f64| -> Result<()> {
            unsafe { device.cmd_draw(command_buffer, 3, 1, 0, 0) };
            Ok(())
        },
    );

    scheduler.draw_frame(0.016).unwrap();
    scheduler.draw_frame(0.016).unwrap();
    scheduler.shutdown().unwrap();
}

#[test]
#[ignore] // Requires GPU and compiled shaders
fn test_vulkan_rebuild_swapchain() {
    let (window, _event_loop) = create_test_window();
    let renderer = VulkanRenderer::new(&window, window_size(&window), test_config()).unwrap();
    let mut scheduler = FrameScheduler::new(renderer);
    scheduler.draw_frame(0.016).unwrap();

    let mut surface = FixedWindow(window_size(&window));
    let extent = scheduler.recreate_swapchain(&mut surface).unwrap();

    assert_eq!(scheduler.backend().swapchain_extent(), extent);
    assert_eq!(scheduler.stats().swapchain_recreations, 1);
    scheduler.draw_frame(0.016).unwrap();
    scheduler.shutdown().unwrap();
}

#[test]
#[ignore] // Requires GPU and compiled shaders
fn test_vulkan_drop_without_shutdown() {
    let (window, _event_loop) = create_test_window();
    let renderer = VulkanRenderer::new(&window, window_size(&window), test_config()).unwrap();
    let mut scheduler = FrameScheduler::new(renderer);
    scheduler.draw_frame(0.016).unwrap();
    drop(scheduler);
}
