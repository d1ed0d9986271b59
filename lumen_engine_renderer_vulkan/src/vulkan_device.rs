/// Logical device, its queues, the swapchain loader and the GPU allocator

use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use lumen_engine::lumen::device::{AdapterFeatures, QueueFamilyIndices};
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_debug, engine_err, engine_error};
use std::sync::{Mutex, MutexGuard};

use crate::vulkan_format::adapter_features_to_vk;
use crate::vulkan_instance::to_cstrings;
use crate::vulkan_physical_device::SelectedAdapter;

pub(crate) struct VulkanDevice {
    pub(crate) device: ash::Device,
    pub(crate) physical_device: vk::PhysicalDevice,
    pub(crate) queue_families: QueueFamilyIndices,
    pub(crate) graphics_queue: vk::Queue,
    pub(crate) present_queue: vk::Queue,
    pub(crate) swapchain_loader: ash::khr::swapchain::Device,
    /// Released before the device is destroyed
    allocator: Option<Mutex<Allocator>>,
}

impl VulkanDevice {
    /// One queue per unique family, the required extensions and features
    pub(crate) fn new(
        instance: &ash::Instance,
        adapter: &SelectedAdapter,
        extensions: &[String],
        features: AdapterFeatures,
    ) -> Result<Self> {
        let queue_families = adapter.info.queue_family_indices();
        if !queue_families.is_complete() {
            engine_error!("lumen::vulkan", "Selected adapter has no graphics/present queue family");
            return Err(Error::NoSuitableDevice(format!(
                "{}: queue families incomplete",
                adapter.info.name
            )));
        }

        let priorities = [1.0f32];
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = queue_families
            .unique()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(&priorities)
            })
            .collect();

        let extension_names = to_cstrings(extensions)?;
        let extension_ptrs: Vec<*const std::os::raw::c_char> =
            extension_names.iter().map(|name| name.as_ptr()).collect();
        let enabled_features = adapter_features_to_vk(features);

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extension_ptrs)
            .enabled_features(&enabled_features);

        let device = unsafe { instance.create_device(adapter.physical_device, &create_info, None) }
            .map_err(|e| {
                engine_error!("lumen::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create logical device: {:?}", e))
            })?;

        let graphics_queue = unsafe { device.get_device_queue(queue_families.graphics, 0) };
        let present_queue = unsafe { device.get_device_queue(queue_families.present, 0) };
        let swapchain_loader = ash::khr::swapchain::Device::new(instance, &device);

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device: adapter.physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| {
            unsafe { device.destroy_device(None) };
            engine_error!("lumen::vulkan", "Failed to create GPU allocator: {:?}", e);
            Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
        })?;

        engine_debug!(
            "lumen::vulkan",
            "Logical device created (graphics family {}, present family {})",
            queue_families.graphics,
            queue_families.present
        );

        Ok(Self {
            device,
            physical_device: adapter.physical_device,
            queue_families,
            graphics_queue,
            present_queue,
            swapchain_loader,
            allocator: Some(Mutex::new(allocator)),
        })
    }

    pub(crate) fn allocator(&self) -> Result<MutexGuard<'_, Allocator>> {
        match &self.allocator {
            Some(allocator) => allocator
                .lock()
                .map_err(|_| engine_err!("lumen::vulkan", "GPU allocator lock poisoned")),
            None => Err(engine_err!("lumen::vulkan", "GPU allocator already released")),
        }
    }

    /// Free the allocator's memory blocks, then destroy the device
    pub(crate) fn destroy(mut self) {
        drop(self.allocator.take());
        unsafe { self.device.destroy_device(None) };
    }
}
