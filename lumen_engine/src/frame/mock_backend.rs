/// Mock frame backend and window for unit tests (no GPU required)
///
/// The mock records every primitive call as a string, tracks fence state per
/// slot and can be scripted to report out-of-date/stale swapchains or to fail.

use std::collections::VecDeque;
use crate::device::{Extent2D, SurfaceCapabilities, SwapchainSupport};
use crate::error::{Error, Result};
use crate::frame::backend::{
    AcquireOutcome, FrameBackend, PresentOutcome, WindowSurface, MAX_FRAMES_IN_FLIGHT,
};
use crate::frame::ledger::{BringUpStage, StageLedger};

// ============================================================================
// Mock Device
// ============================================================================

#[derive(Debug, Default)]
pub struct MockDevice {
    pub name: String,
}

// ============================================================================
// Mock Backend
// ============================================================================

/// Primitive that the next scripted failure applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Acquire,
    Submit,
    Present,
    Rebuild,
}

pub struct MockFrameBackend {
    pub device: MockDevice,
    pub calls: Vec<String>,
    pub fence_signaled: [bool; MAX_FRAMES_IN_FLIGHT],
    pub ledger: StageLedger,
    pub torn_down: Vec<BringUpStage>,
    pub support: SwapchainSupport,
    pub extent: Extent2D,
    pub image_count: u32,
    pub acquire_script: VecDeque<AcquireOutcome>,
    pub present_script: VecDeque<PresentOutcome>,
    /// Acquire reports out-of-date while set (minimized window)
    pub minimized: bool,
    pub fail_on: Option<MockFailure>,
    pub submissions: u32,
    pub rebuilds: Vec<Extent2D>,
    next_image: u32,
}

impl MockFrameBackend {
    /// Fully brought-up backend whose surface reports `extent`
    pub fn new(extent: Extent2D) -> Self {
        let support = SwapchainSupport {
            capabilities: SurfaceCapabilities {
                min_image_count: 2,
                max_image_count: 3,
                current_extent: extent,
                min_image_extent: Extent2D::new(1, 1),
                max_image_extent: Extent2D::new(4096, 4096),
            },
            formats: vec![crate::device::PREFERRED_SURFACE_FORMAT],
            present_modes: vec![crate::device::PresentMode::Fifo],
        };

        let mut ledger = StageLedger::new();
        for stage in BringUpStage::ALL {
            ledger.record(stage);
        }

        Self {
            device: MockDevice { name: "mock".to_string() },
            calls: Vec::new(),
            fence_signaled: [true; MAX_FRAMES_IN_FLIGHT],
            ledger,
            torn_down: Vec::new(),
            image_count: support.image_count(),
            extent: support.choose_extent(extent),
            support,
            acquire_script: VecDeque::new(),
            present_script: VecDeque::new(),
            minimized: false,
            fail_on: None,
            submissions: 0,
            rebuilds: Vec::new(),
            next_image: 0,
        }
    }

    /// Simulate the window being resized (the surface follows immediately)
    pub fn set_surface_extent(&mut self, extent: Extent2D) {
        self.support.capabilities.current_extent = extent;
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|call| call.starts_with(prefix)).count()
    }

    fn fail(&self, what: MockFailure) -> Result<()> {
        if self.fail_on == Some(what) {
            return Err(match what {
                MockFailure::Acquire | MockFailure::Present => {
                    Error::Presentation(format!("mock {:?} failure", what))
                }
                MockFailure::Submit => Error::Submission("mock submit failure".to_string()),
                MockFailure::Rebuild => Error::SwapchainCreation("mock rebuild failure".to_string()),
            });
        }
        Ok(())
    }
}

impl FrameBackend for MockFrameBackend {
    type Device = MockDevice;
    type CommandBuffer = usize;

    fn device(&self) -> &MockDevice {
        &self.device
    }

    fn wait_for_fence(&mut self, slot: usize) -> Result<()> {
        if !self.fence_signaled[slot] {
            return Err(Error::Submission(format!("fence {} would never signal", slot)));
        }
        self.calls.push(format!("wait_for_fence {}", slot));
        Ok(())
    }

    fn acquire_next_image(&mut self, slot: usize) -> Result<AcquireOutcome> {
        self.fail(MockFailure::Acquire)?;
        self.calls.push(format!("acquire {}", slot));

        if self.minimized {
            return Ok(AcquireOutcome::OutOfDate);
        }
        if let Some(outcome) = self.acquire_script.pop_front() {
            return Ok(outcome);
        }

        let image_index = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count;
        Ok(AcquireOutcome::Acquired { image_index, suboptimal: false })
    }

    fn reset_fence(&mut self, slot: usize) -> Result<()> {
        self.calls.push(format!("reset_fence {}", slot));
        self.fence_signaled[slot] = false;
        Ok(())
    }

    fn begin_recording(&mut self, slot: usize, image_index: u32) -> Result<usize> {
        self.calls.push(format!("begin_recording {} {}", slot, image_index));
        Ok(slot)
    }

    fn end_recording(&mut self, slot: usize) -> Result<()> {
        self.calls.push(format!("end_recording {}", slot));
        Ok(())
    }

    fn submit(&mut self, slot: usize) -> Result<()> {
        self.fail(MockFailure::Submit)?;
        self.calls.push(format!("submit {}", slot));
        self.submissions += 1;
        // the mock GPU finishes instantly
        self.fence_signaled[slot] = true;
        Ok(())
    }

    fn present(&mut self, slot: usize, image_index: u32) -> Result<PresentOutcome> {
        self.fail(MockFailure::Present)?;
        self.calls.push(format!("present {} {}", slot, image_index));
        Ok(self.present_script.pop_front().unwrap_or(PresentOutcome::Presented))
    }

    fn wait_idle(&mut self) -> Result<()> {
        self.calls.push("wait_idle".to_string());
        Ok(())
    }

    fn rebuild_swapchain(&mut self, framebuffer_size: Extent2D) -> Result<Extent2D> {
        self.fail(MockFailure::Rebuild)?;
        self.calls.push(format!("rebuild {}x{}", framebuffer_size.width, framebuffer_size.height));
        self.extent = self.support.choose_extent(framebuffer_size);
        self.image_count = self.support.image_count();
        self.next_image = 0;
        self.rebuilds.push(self.extent);
        Ok(self.extent)
    }

    fn swapchain_extent(&self) -> Extent2D {
        self.extent
    }

    fn teardown(&mut self) {
        self.calls.push("teardown".to_string());
        self.torn_down.extend(self.ledger.drain_reverse());
    }
}

// ============================================================================
// Mock Window
// ============================================================================

/// Window whose size follows a script, advanced by each `pump_events`
pub struct MockWindow {
    pub size: Extent2D,
    pub pending_sizes: VecDeque<Extent2D>,
    pub pumped: u32,
}

impl MockWindow {
    pub fn new(size: Extent2D) -> Self {
        Self {
            size,
            pending_sizes: VecDeque::new(),
            pumped: 0,
        }
    }

    /// Window that reports `sizes` in order, one per pumped event batch
    pub fn scripted(initial: Extent2D, sizes: &[Extent2D]) -> Self {
        Self {
            size: initial,
            pending_sizes: sizes.iter().copied().collect(),
            pumped: 0,
        }
    }
}

impl WindowSurface for MockWindow {
    fn framebuffer_size(&self) -> Extent2D {
        self.size
    }

    fn pump_events(&mut self) {
        self.pumped += 1;
        if let Some(next) = self.pending_sizes.pop_front() {
            self.size = next;
        }
    }
}
