/// VulkanRenderer - Vulkan implementation of the FrameBackend trait
///
/// Owns every stage of the bring-up chain. Stages are recorded in a
/// `StageLedger` as they are built, so a failed bring-up and a normal
/// shutdown both destroy exactly what exists, newest first.

use ash::vk;
use lumen_engine::lumen::config::RendererConfig;
use lumen_engine::lumen::device::{AdapterInfo, Extent2D, PresentMode, SurfaceFormat};
use lumen_engine::lumen::frame::{
    AcquireOutcome, BringUpStage, FrameBackend, PresentOutcome, StageLedger,
};
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_debug, engine_err, engine_error, engine_info, engine_trace, engine_warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::debug::{print_validation_stats_report, VulkanDebugMessenger};
use crate::vulkan_attachment::find_depth_format;
use crate::vulkan_command::VulkanCommandPool;
use crate::vulkan_device::VulkanDevice;
use crate::vulkan_format::{extent_to_vk, pixel_format_to_vk, sample_count_to_vk};
use crate::vulkan_frame_buffer::VulkanFrameBuffers;
use crate::vulkan_instance::{apply_validation_feature, VulkanInstance};
use crate::vulkan_physical_device::pick_physical_device;
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_render_pass::{create_render_pass, AttachmentLayout};
use crate::vulkan_surface::VulkanSurface;
use crate::vulkan_swapchain::VulkanSwapchain;
use crate::vulkan_sync::FrameSync;

/// Built stages of the acquisition chain
///
/// Dropping it tears down whatever was recorded in the ledger.
#[derive(Default)]
struct RendererStages {
    ledger: StageLedger,
    instance: Option<VulkanInstance>,
    debug_messenger: Option<VulkanDebugMessenger>,
    surface: Option<VulkanSurface>,
    device: Option<VulkanDevice>,
    swapchain: Option<VulkanSwapchain>,
    render_pass: Option<vk::RenderPass>,
    pipeline: Option<VulkanPipeline>,
    framebuffers: Option<VulkanFrameBuffers>,
    command_pool: Option<VulkanCommandPool>,
    sync: Option<FrameSync>,
}

/// Borrowed view of the stages the frame path needs
struct FrameResources<'a> {
    device: &'a VulkanDevice,
    swapchain: &'a VulkanSwapchain,
    render_pass: vk::RenderPass,
    pipeline: &'a VulkanPipeline,
    framebuffers: &'a VulkanFrameBuffers,
    command_pool: &'a VulkanCommandPool,
    sync: &'a FrameSync,
}

impl RendererStages {
    fn frame_resources(&self) -> Result<FrameResources<'_>> {
        match (
            &self.device,
            &self.swapchain,
            self.render_pass,
            &self.pipeline,
            &self.framebuffers,
            &self.command_pool,
            &self.sync,
        ) {
            (
                Some(device),
                Some(swapchain),
                Some(render_pass),
                Some(pipeline),
                Some(framebuffers),
                Some(command_pool),
                Some(sync),
            ) => Ok(FrameResources {
                device,
                swapchain,
                render_pass,
                pipeline,
                framebuffers,
                command_pool,
                sync,
            }),
            _ => Err(engine_err!("lumen::vulkan", "Renderer used after teardown")),
        }
    }

    /// Destroy recorded stages newest first; a second call does nothing
    fn teardown(&mut self) {
        for stage in self.ledger.drain_reverse() {
            engine_trace!("lumen::vulkan", "Destroying {:?}", stage);
            match stage {
                BringUpStage::SyncObjects => {
                    if let (Some(mut sync), Some(device)) = (self.sync.take(), &self.device) {
                        sync.destroy(&device.device);
                    }
                }
                BringUpStage::CommandPool => {
                    if let (Some(pool), Some(device)) = (self.command_pool.take(), &self.device) {
                        pool.destroy(&device.device);
                    }
                }
                BringUpStage::FrameBuffers => {
                    if let (Some(mut framebuffers), Some(device)) = (self.framebuffers.take(), &self.device) {
                        framebuffers.destroy(device);
                    }
                }
                BringUpStage::Pipeline => {
                    if let (Some(pipeline), Some(device)) = (self.pipeline.take(), &self.device) {
                        pipeline.destroy(&device.device);
                    }
                }
                BringUpStage::RenderPass => {
                    if let (Some(render_pass), Some(device)) = (self.render_pass.take(), &self.device) {
                        unsafe { device.device.destroy_render_pass(render_pass, None) };
                    }
                }
                BringUpStage::Swapchain => {
                    if let (Some(mut swapchain), Some(device)) = (self.swapchain.take(), &self.device) {
                        swapchain.destroy(device);
                    }
                }
                BringUpStage::Device => {
                    if let Some(device) = self.device.take() {
                        device.destroy();
                    }
                }
                BringUpStage::Surface => {
                    if let Some(surface) = self.surface.take() {
                        surface.destroy();
                    }
                }
                BringUpStage::DebugMessenger => {
                    if let Some(mut messenger) = self.debug_messenger.take() {
                        messenger.destroy();
                    }
                }
                BringUpStage::Instance => {
                    if let Some(instance) = self.instance.take() {
                        instance.destroy();
                    }
                }
            }
        }
    }
}

impl Drop for RendererStages {
    fn drop(&mut self) {
        if let Some(device) = &self.device {
            unsafe { device.device.device_wait_idle().ok() };
        }
        self.teardown();
    }
}

/// Vulkan renderer
///
/// Created once per window. Drive it through
/// `lumen_engine::lumen::frame::FrameScheduler`.
pub struct VulkanRenderer {
    stages: RendererStages,
    /// Device handle handed to draw callbacks
    device: ash::Device,
    adapter: AdapterInfo,
    render_pass_format: SurfaceFormat,
    attachment_layout: AttachmentLayout,
    clear_color: [f32; 4],
    report_validation_stats: bool,
}

impl VulkanRenderer {
    /// Run the full bring-up chain for `window`
    ///
    /// `framebuffer_size` is the window's current size in pixels, used when
    /// the surface leaves the swapchain extent to the application.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        framebuffer_size: Extent2D,
        mut config: RendererConfig,
    ) -> Result<Self> {
        apply_validation_feature(&mut config);

        let display_handle = window.display_handle().map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to get display handle: {}", e);
            Error::InitializationFailed(format!("Failed to get display handle: {}", e))
        })?;
        let window_handle = window.window_handle().map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to get window handle: {}", e);
            Error::InitializationFailed(format!("Failed to get window handle: {}", e))
        })?;

        let mut stages = RendererStages::default();

        let instance = VulkanInstance::new(display_handle, &config)?;
        stages.instance = Some(instance);
        stages.ledger.record(BringUpStage::Instance);
        let (entry, ash_instance) = match &stages.instance {
            Some(instance) => (instance.entry.clone(), instance.instance.clone()),
            None => return Err(engine_err!("lumen::vulkan", "Instance missing after creation")),
        };

        if config.enable_validation {
            stages.debug_messenger = Some(VulkanDebugMessenger::new(&entry, &ash_instance, &config)?);
            stages.ledger.record(BringUpStage::DebugMessenger);
        }

        stages.surface = Some(VulkanSurface::new(&entry, &ash_instance, display_handle, window_handle)?);
        stages.ledger.record(BringUpStage::Surface);
        let surface = match &stages.surface {
            Some(surface) => surface,
            None => return Err(engine_err!("lumen::vulkan", "Surface missing after creation")),
        };

        let requirements = config.effective_device_requirements();
        let adapter = pick_physical_device(&ash_instance, surface, &requirements)?;
        let device = VulkanDevice::new(
            &ash_instance,
            &adapter,
            &requirements.extensions,
            requirements.features,
        )?;
        let swapchain = VulkanSwapchain::new(&device, surface, framebuffer_size, vk::SwapchainKHR::null());
        let device_handle = device.device.clone();
        stages.device = Some(device);
        stages.ledger.record(BringUpStage::Device);

        let swapchain = swapchain?;
        let render_pass_format = swapchain.surface_format;
        stages.swapchain = Some(swapchain);
        stages.ledger.record(BringUpStage::Swapchain);

        let attachment_layout = AttachmentLayout {
            color_format: pixel_format_to_vk(render_pass_format.format),
            depth_format: find_depth_format(&ash_instance, adapter.physical_device)?,
            samples: sample_count_to_vk(config.sample_count(adapter.info.max_sample_count)),
        };
        let render_pass = create_render_pass(&device_handle, &attachment_layout)?;
        stages.render_pass = Some(render_pass);
        stages.ledger.record(BringUpStage::RenderPass);

        stages.pipeline = Some(VulkanPipeline::new(
            &device_handle,
            render_pass,
            &config.shaders,
            attachment_layout.samples,
        )?);
        stages.ledger.record(BringUpStage::Pipeline);

        let framebuffers = match (&stages.device, &stages.swapchain) {
            (Some(device), Some(swapchain)) => {
                VulkanFrameBuffers::new(device, render_pass, swapchain, &attachment_layout)?
            }
            _ => return Err(engine_err!("lumen::vulkan", "Swapchain missing after creation")),
        };
        stages.framebuffers = Some(framebuffers);
        stages.ledger.record(BringUpStage::FrameBuffers);

        stages.command_pool = Some(VulkanCommandPool::new(&device_handle, adapter.info.queue_family_indices().graphics)?);
        stages.ledger.record(BringUpStage::CommandPool);

        stages.sync = Some(FrameSync::new(&device_handle)?);
        stages.ledger.record(BringUpStage::SyncObjects);

        engine_info!(
            "lumen::vulkan",
            "Renderer ready on {} ({} swapchain images)",
            adapter.info.name,
            stages.swapchain.as_ref().map_or(0, VulkanSwapchain::image_count)
        );
        engine_debug!(
            "lumen::vulkan",
            "Max usable sample count {:?}, rendering with {:?} (depth {:?})",
            adapter.info.max_sample_count,
            attachment_layout.samples,
            attachment_layout.depth_format
        );

        Ok(Self {
            stages,
            device: device_handle,
            adapter: adapter.info,
            render_pass_format,
            attachment_layout,
            clear_color: config.clear_color,
            report_validation_stats: config.enable_validation && config.enable_validation_stats,
        })
    }

    /// Snapshot of the selected adapter
    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.adapter
    }

    /// Format the render pass was built for
    pub fn surface_format(&self) -> SurfaceFormat {
        self.render_pass_format
    }

    /// Samples per pixel of the colour and depth attachments
    pub fn sample_count(&self) -> u32 {
        self.attachment_layout.samples.as_raw()
    }

    pub fn present_mode(&self) -> Option<PresentMode> {
        self.stages.swapchain.as_ref().map(|swapchain| swapchain.present_mode)
    }

    pub fn swapchain_image_count(&self) -> usize {
        self.stages.swapchain.as_ref().map_or(0, VulkanSwapchain::image_count)
    }

    /// Stages currently alive, oldest first
    pub fn bring_up_stages(&self) -> &[BringUpStage] {
        self.stages.ledger.stages()
    }
}

impl FrameBackend for VulkanRenderer {
    type Device = ash::Device;
    type CommandBuffer = vk::CommandBuffer;

    fn device(&self) -> &ash::Device {
        &self.device
    }

    fn wait_for_fence(&mut self, slot: usize) -> Result<()> {
        let resources = self.stages.frame_resources()?;
        let fences = [resources.sync.in_flight[slot]];
        unsafe { resources.device.device.wait_for_fences(&fences, true, u64::MAX) }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to wait for in-flight fence: {:?}", e);
            Error::Submission(format!("Failed to wait for in-flight fence: {:?}", e))
        })
    }

    fn acquire_next_image(&mut self, slot: usize) -> Result<AcquireOutcome> {
        let resources = self.stages.frame_resources()?;
        resources
            .swapchain
            .acquire_next_image(resources.device, resources.sync.image_available[slot])
    }

    fn reset_fence(&mut self, slot: usize) -> Result<()> {
        let resources = self.stages.frame_resources()?;
        let fences = [resources.sync.in_flight[slot]];
        unsafe { resources.device.device.reset_fences(&fences) }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to reset in-flight fence: {:?}", e);
            Error::Submission(format!("Failed to reset in-flight fence: {:?}", e))
        })
    }

    fn begin_recording(&mut self, slot: usize, image_index: u32) -> Result<vk::CommandBuffer> {
        let resources = self.stages.frame_resources()?;
        let device = &resources.device.device;
        let command_buffer = resources.command_pool.buffer(slot);
        let framebuffer = match resources.framebuffers.get(image_index) {
            Some(framebuffer) => framebuffer,
            None => {
                engine_error!("lumen::vulkan", "No framebuffer for swapchain image {}", image_index);
                return Err(Error::Submission(format!("no framebuffer for swapchain image {}", image_index)));
            }
        };
        let extent = extent_to_vk(resources.swapchain.extent);

        unsafe {
            device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| {
                    engine_error!("lumen::vulkan", "Failed to reset command buffer: {:?}", e);
                    Error::Submission(format!("Failed to reset command buffer: {:?}", e))
                })?;

            let begin_info = vk::CommandBufferBeginInfo::default();
            device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| {
                    engine_error!("lumen::vulkan", "Failed to begin command buffer: {:?}", e);
                    Error::Submission(format!("Failed to begin command buffer: {:?}", e))
                })?;

            let clear_values = self.attachment_layout.clear_values(self.clear_color);
            let render_area = vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            };
            let render_pass_info = vk::RenderPassBeginInfo::default()
                .render_pass(resources.render_pass)
                .framebuffer(framebuffer)
                .render_area(render_area)
                .clear_values(&clear_values);
            device.cmd_begin_render_pass(command_buffer, &render_pass_info, vk::SubpassContents::INLINE);

            device.cmd_bind_pipeline(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                resources.pipeline.pipeline,
            );

            let viewport = vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            };
            device.cmd_set_viewport(command_buffer, 0, &[viewport]);
            device.cmd_set_scissor(command_buffer, 0, &[render_area]);
        }

        Ok(command_buffer)
    }

    fn end_recording(&mut self, slot: usize) -> Result<()> {
        let resources = self.stages.frame_resources()?;
        let command_buffer = resources.command_pool.buffer(slot);
        unsafe {
            resources.device.device.cmd_end_render_pass(command_buffer);
            resources.device.device.end_command_buffer(command_buffer)
        }
        .map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to end command buffer: {:?}", e);
            Error::Submission(format!("Failed to end command buffer: {:?}", e))
        })
    }

    fn submit(&mut self, slot: usize) -> Result<()> {
        let resources = self.stages.frame_resources()?;
        let wait_semaphores = [resources.sync.image_available[slot]];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [resources.command_pool.buffer(slot)];
        let signal_semaphores = [resources.sync.render_finished[slot]];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            resources.device.device.queue_submit(
                resources.device.graphics_queue,
                &[submit_info],
                resources.sync.in_flight[slot],
            )
        }
        .map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to submit commands to GPU queue: {:?}", e);
            Error::Submission(format!("Failed to submit commands to GPU queue: {:?}", e))
        })
    }

    fn present(&mut self, slot: usize, image_index: u32) -> Result<PresentOutcome> {
        let resources = self.stages.frame_resources()?;
        resources
            .swapchain
            .present(resources.device, resources.sync.render_finished[slot], image_index)
    }

    fn wait_idle(&mut self) -> Result<()> {
        match &self.stages.device {
            Some(device) => unsafe { device.device.device_wait_idle() }.map_err(|e| {
                engine_error!("lumen::vulkan", "Failed to wait for device idle: {:?}", e);
                Error::Submission(format!("Failed to wait for device idle: {:?}", e))
            }),
            None => Ok(()),
        }
    }

    fn rebuild_swapchain(&mut self, framebuffer_size: Extent2D) -> Result<Extent2D> {
        let stages = &mut self.stages;
        let (device, surface, render_pass) = match (&stages.device, &stages.surface, stages.render_pass) {
            (Some(device), Some(surface), Some(render_pass)) => (device, surface, render_pass),
            _ => return Err(engine_err!("lumen::vulkan", "Swapchain rebuilt after teardown")),
        };

        if let Some(mut framebuffers) = stages.framebuffers.take() {
            framebuffers.destroy(device);
        }

        let old_handle = stages
            .swapchain
            .as_ref()
            .map_or(vk::SwapchainKHR::null(), |swapchain| swapchain.swapchain);
        let swapchain = VulkanSwapchain::new(device, surface, framebuffer_size, old_handle)?;
        if let Some(mut old) = stages.swapchain.replace(swapchain) {
            old.destroy(device);
        }

        let swapchain = match &stages.swapchain {
            Some(swapchain) => swapchain,
            None => return Err(engine_err!("lumen::vulkan", "Swapchain missing after rebuild")),
        };
        if swapchain.surface_format != self.render_pass_format {
            engine_warn!(
                "lumen::vulkan",
                "Surface format changed from {:?} to {:?}; render pass not rebuilt",
                self.render_pass_format,
                swapchain.surface_format
            );
        }

        let framebuffers = VulkanFrameBuffers::new(device, render_pass, swapchain, &self.attachment_layout)?;
        let extent = swapchain.extent;
        stages.framebuffers = Some(framebuffers);

        engine_info!("lumen::vulkan", "Swapchain rebuilt at {}x{}", extent.width, extent.height);
        Ok(extent)
    }

    fn swapchain_extent(&self) -> Extent2D {
        self.stages
            .swapchain
            .as_ref()
            .map_or(Extent2D::new(0, 0), |swapchain| swapchain.extent)
    }

    fn teardown(&mut self) {
        if self.stages.ledger.is_empty() {
            return;
        }
        self.stages.teardown();
        engine_info!("lumen::vulkan", "Renderer torn down");
        if self.report_validation_stats {
            print_validation_stats_report();
        }
    }
}

impl Drop for VulkanRenderer {
    fn drop(&mut self) {
        if let Some(device) = &self.stages.device {
            unsafe { device.device.device_wait_idle().ok() };
        }
        FrameBackend::teardown(self);
    }
}
