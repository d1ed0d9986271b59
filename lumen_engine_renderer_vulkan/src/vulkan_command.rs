/// Command pool and the per-slot primary command buffers

use ash::vk;
use lumen_engine::lumen::frame::MAX_FRAMES_IN_FLIGHT;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::engine_error;

pub(crate) struct VulkanCommandPool {
    pub(crate) pool: vk::CommandPool,
    pub(crate) buffers: Vec<vk::CommandBuffer>,
}

impl VulkanCommandPool {
    /// Pool on the graphics family; buffers are reset individually
    pub(crate) fn new(device: &ash::Device, graphics_family: u32) -> Result<Self> {
        let pool_info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(graphics_family);

        let pool = unsafe { device.create_command_pool(&pool_info, None) }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to create command pool: {:?}", e);
            Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
        })?;

        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(MAX_FRAMES_IN_FLIGHT as u32);

        let buffers = match unsafe { device.allocate_command_buffers(&alloc_info) } {
            Ok(buffers) => buffers,
            Err(e) => {
                unsafe { device.destroy_command_pool(pool, None) };
                engine_error!("lumen::vulkan", "Failed to allocate command buffers: {:?}", e);
                return Err(Error::InitializationFailed(format!(
                    "Failed to allocate command buffers: {:?}",
                    e
                )));
            }
        };

        Ok(Self { pool, buffers })
    }

    pub(crate) fn buffer(&self, slot: usize) -> vk::CommandBuffer {
        self.buffers[slot]
    }

    /// Destroying the pool frees its buffers
    pub(crate) fn destroy(&self, device: &ash::Device) {
        unsafe { device.destroy_command_pool(self.pool, None) };
    }
}
