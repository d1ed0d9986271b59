/*!
# Lumen Engine - Vulkan Renderer Backend

Vulkan implementation of the Lumen frame backend, built on `ash`.

`VulkanRenderer::new` runs the whole bring-up chain for a window (instance,
optional debug messenger, surface, adapter selection, logical device,
swapchain, render pass, pipeline, framebuffers, command buffers and sync
objects). The renderer implements `FrameBackend`, so it is driven by the
engine's `FrameScheduler`.

# Example

```no_run
use lumen_engine::lumen::config::RendererConfig;
use lumen_engine::lumen::device::Extent2D;
use lumen_engine::lumen::frame::FrameScheduler;
use lumen_engine_renderer_vulkan::VulkanRenderer;
# fn run<W: raw_window_handle::HasDisplayHandle + raw_window_handle::HasWindowHandle>(window: &W)
#     -> lumen_engine::lumen::Result<()> {
let renderer = VulkanRenderer::new(window, Extent2D::new(800, 600), RendererConfig::default())?;
let mut scheduler = FrameScheduler::new(renderer);
scheduler.draw_frame(0.016)?;
scheduler.shutdown()?;
# Ok(())
# }
```
*/

// Bring-up chain
mod vulkan_instance;
mod debug;
mod vulkan_surface;
mod vulkan_physical_device;
mod vulkan_device;
mod vulkan_swapchain;
mod vulkan_render_pass;
mod vulkan_shader;
mod vulkan_pipeline;
mod vulkan_attachment;
mod vulkan_frame_buffer;
mod vulkan_command;
mod vulkan_sync;

// Conversions to and from engine types
mod vulkan_format;

mod vulkan_renderer;

pub use vulkan_renderer::VulkanRenderer;

// Re-export debug utilities
pub use debug::{get_validation_stats, print_validation_stats_report};
