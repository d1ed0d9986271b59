/// Per-slot semaphores and fences

use ash::vk;
use lumen_engine::lumen::frame::MAX_FRAMES_IN_FLIGHT;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::engine_error;

pub(crate) struct FrameSync {
    pub(crate) image_available: Vec<vk::Semaphore>,
    pub(crate) render_finished: Vec<vk::Semaphore>,
    pub(crate) in_flight: Vec<vk::Fence>,
}

impl FrameSync {
    /// Fences start signaled so the first wait of each slot returns at once
    pub(crate) fn new(device: &ash::Device) -> Result<Self> {
        let mut sync = Self {
            image_available: Vec::with_capacity(MAX_FRAMES_IN_FLIGHT),
            render_finished: Vec::with_capacity(MAX_FRAMES_IN_FLIGHT),
            in_flight: Vec::with_capacity(MAX_FRAMES_IN_FLIGHT),
        };

        if let Err(e) = sync.create_objects(device) {
            sync.destroy(device);
            engine_error!("lumen::vulkan", "Failed to create synchronization objects: {:?}", e);
            return Err(Error::InitializationFailed(format!(
                "Failed to create synchronization objects: {:?}",
                e
            )));
        }
        Ok(sync)
    }

    fn create_objects(&mut self, device: &ash::Device) -> std::result::Result<(), vk::Result> {
        let semaphore_info = vk::SemaphoreCreateInfo::default();
        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            unsafe {
                self.image_available.push(device.create_semaphore(&semaphore_info, None)?);
                self.render_finished.push(device.create_semaphore(&semaphore_info, None)?);
                self.in_flight.push(device.create_fence(&fence_info, None)?);
            }
        }
        Ok(())
    }

    pub(crate) fn destroy(&mut self, device: &ash::Device) {
        unsafe {
            for semaphore in self.image_available.drain(..).chain(self.render_finished.drain(..)) {
                device.destroy_semaphore(semaphore, None);
            }
            for fence in self.in_flight.drain(..) {
                device.destroy_fence(fence, None);
            }
        }
    }
}
