/// Seams between the frame scheduler and the graphics API
///
/// `FrameBackend` is the per-frame primitive set a backend exposes (fence
/// wait, acquire, record, submit, present, rebuild). `DrawCallback` is how
/// the application records draw commands. `WindowSurface` is the small slice
/// of the windowing system the resize path needs.

use crate::device::Extent2D;
use crate::error::Result;

/// Frames the CPU may record ahead of the GPU
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Result of acquiring a swapchain image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Image acquired; a suboptimal swapchain can still be rendered to
    Acquired { image_index: u32, suboptimal: bool },
    /// Swapchain no longer matches the surface, nothing was acquired
    OutOfDate,
}

/// Result of presenting a swapchain image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    /// Presented (or dropped) with an out-of-date or suboptimal swapchain
    Stale,
}

/// Per-frame primitives of a graphics backend
///
/// `slot` is always in `0..MAX_FRAMES_IN_FLIGHT` and selects the slot's
/// semaphores, fence and command buffer. Any `Err` is fatal; staleness is
/// reported through the outcome enums.
pub trait FrameBackend {
    /// Device handle handed to draw callbacks
    type Device: 'static;

    /// Command buffer handle handed to draw callbacks
    type CommandBuffer: Copy + 'static;

    fn device(&self) -> &Self::Device;

    /// Block until the slot's in-flight fence is signaled
    fn wait_for_fence(&mut self, slot: usize) -> Result<()>;

    /// Acquire the next image, signaling the slot's image-available semaphore
    fn acquire_next_image(&mut self, slot: usize) -> Result<AcquireOutcome>;

    /// Unsignal the slot's fence
    fn reset_fence(&mut self, slot: usize) -> Result<()>;

    /// Reset and begin the slot's command buffer and open the render pass
    ///
    /// The render pass is begun on the framebuffer of `image_index` with the
    /// clear colour, the pipeline is bound and dynamic viewport/scissor cover
    /// the whole swapchain extent.
    fn begin_recording(&mut self, slot: usize, image_index: u32) -> Result<Self::CommandBuffer>;

    /// Close the render pass and the command buffer
    fn end_recording(&mut self, slot: usize) -> Result<()>;

    /// Submit the slot's command buffer
    ///
    /// Waits on image-available at the colour attachment output stage and
    /// signals render-finished and the slot's fence.
    fn submit(&mut self, slot: usize) -> Result<()>;

    /// Present `image_index` after render-finished is signaled
    fn present(&mut self, slot: usize, image_index: u32) -> Result<PresentOutcome>;

    /// Block until the device has finished all submitted work
    fn wait_idle(&mut self) -> Result<()>;

    /// Rebuild swapchain then framebuffers for a window of `framebuffer_size`
    ///
    /// Returns the extent actually chosen. Callers must wait idle first.
    fn rebuild_swapchain(&mut self, framebuffer_size: Extent2D) -> Result<Extent2D>;

    fn swapchain_extent(&self) -> Extent2D;

    /// Destroy every bring-up stage in reverse construction order
    ///
    /// Callers must wait idle first. Calling it again does nothing.
    fn teardown(&mut self);
}

/// Records draw commands into the current frame's command buffer
///
/// Invoked between render pass begin and end, in registration order.
pub trait DrawCallback<D, C> {
    fn record(&mut self, device: &D, command_buffer: C, delta_time: f64) -> Result<()>;
}

impl<D, C, F> DrawCallback<D, C> for F
where
    F: FnMut(&D, C, f64) -> Result<()>,
{
    fn record(&mut self, device: &D, command_buffer: C, delta_time: f64) -> Result<()> {
        self(device, command_buffer, delta_time)
    }
}

/// Windowing collaborator used while recreating the swapchain
pub trait WindowSurface {
    /// Current framebuffer size in pixels (zero while minimized)
    fn framebuffer_size(&self) -> Extent2D;

    /// Process pending window events, blocking briefly if there are none
    fn pump_events(&mut self);
}
