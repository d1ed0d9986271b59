/// Double-buffered frame scheduler
///
/// Drives one frame per `draw_frame` call through the backend primitives:
///
/// ```text
/// wait fence -> acquire -> reset fence -> record -> submit -> present -> advance
/// ```
///
/// An out-of-date swapchain (at acquire) or a stale one (at present) moves
/// the scheduler to `PresentationState::Stale`; further frames are skipped
/// until `recreate_swapchain` rebuilds it.

use crate::device::Extent2D;
use crate::error::Result;
use crate::frame::backend::{
    AcquireOutcome, DrawCallback, FrameBackend, PresentOutcome, WindowSurface,
    MAX_FRAMES_IN_FLIGHT,
};
use crate::{engine_bail, engine_debug, engine_info, engine_trace, engine_warn};

/// Whether the swapchain can currently be rendered to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationState {
    Ready,
    /// Swapchain must be recreated before the next frame
    Stale,
}

/// What happened during one `draw_frame` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing done, the swapchain is awaiting recreation
    Skipped,
    /// Acquire reported an out-of-date swapchain, nothing submitted
    Stale,
    /// Frame submitted and presented
    Presented,
    /// Frame submitted, presentation reported a stale swapchain
    PresentedStale,
}

/// Frame counters, logged on shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub frames_presented: u64,
    pub frames_skipped: u64,
    pub stale_events: u64,
    pub swapchain_recreations: u64,
}

type BoxedDrawCallback<B> =
    Box<dyn DrawCallback<<B as FrameBackend>::Device, <B as FrameBackend>::CommandBuffer>>;

/// Per-frame state machine over a `FrameBackend`
pub struct FrameScheduler<B: FrameBackend> {
    backend: B,
    draw_callbacks: Vec<BoxedDrawCallback<B>>,
    current_frame: usize,
    state: PresentationState,
    stats: FrameStats,
    shut_down: bool,
}

impl<B: FrameBackend> FrameScheduler<B> {
    /// Take ownership of a fully brought-up backend
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            draw_callbacks: Vec::new(),
            current_frame: 0,
            state: PresentationState::Ready,
            stats: FrameStats::default(),
            shut_down: false,
        }
    }

    /// Append a draw callback (invoked in registration order)
    pub fn add_draw_callback<F>(&mut self, callback: F)
    where
        F: DrawCallback<B::Device, B::CommandBuffer> + 'static,
    {
        self.draw_callbacks.push(Box::new(callback));
    }

    pub fn draw_callback_count(&self) -> usize {
        self.draw_callbacks.len()
    }

    /// Frame-in-flight slot used by the next frame
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Render one frame
    ///
    /// # Errors
    ///
    /// Any backend or draw callback error. The scheduler must not be used
    /// for further frames after an error.
    pub fn draw_frame(&mut self, delta_time: f64) -> Result<FrameOutcome> {
        if self.shut_down {
            engine_bail!("lumen::FrameScheduler", "draw_frame called after shutdown");
        }

        if self.state == PresentationState::Stale {
            self.stats.frames_skipped += 1;
            return Ok(FrameOutcome::Skipped);
        }

        let slot = self.current_frame;
        self.backend.wait_for_fence(slot)?;

        let image_index = match self.backend.acquire_next_image(slot)? {
            AcquireOutcome::OutOfDate => {
                self.mark_stale("acquire");
                return Ok(FrameOutcome::Stale);
            }
            AcquireOutcome::Acquired { image_index, suboptimal } => {
                if suboptimal {
                    engine_trace!("lumen::FrameScheduler", "Suboptimal acquire, rendering anyway");
                }
                image_index
            }
        };

        self.backend.reset_fence(slot)?;

        let command_buffer = self.backend.begin_recording(slot, image_index)?;
        let device = self.backend.device();
        for callback in self.draw_callbacks.iter_mut() {
            callback.record(device, command_buffer, delta_time)?;
        }
        self.backend.end_recording(slot)?;

        self.backend.submit(slot)?;

        let outcome = match self.backend.present(slot, image_index)? {
            PresentOutcome::Presented => FrameOutcome::Presented,
            PresentOutcome::Stale => {
                self.mark_stale("present");
                FrameOutcome::PresentedStale
            }
        };

        self.stats.frames_presented += 1;
        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;

        Ok(outcome)
    }

    /// Rebuild the swapchain for the window's current size
    ///
    /// Blocks (pumping window events) while the framebuffer is zero-sized,
    /// then waits for the device to go idle and rebuilds swapchain and
    /// framebuffers. The render pass and pipeline are kept.
    pub fn recreate_swapchain(&mut self, window: &mut dyn WindowSurface) -> Result<Extent2D> {
        if self.shut_down {
            engine_bail!("lumen::FrameScheduler", "recreate_swapchain called after shutdown");
        }

        let mut size = window.framebuffer_size();
        if size.is_degenerate() {
            engine_debug!("lumen::FrameScheduler", "Window minimized, waiting for a usable size");
        }
        while size.is_degenerate() {
            window.pump_events();
            size = window.framebuffer_size();
        }

        self.backend.wait_idle()?;
        let extent = self.backend.rebuild_swapchain(size)?;

        self.state = PresentationState::Ready;
        self.stats.swapchain_recreations += 1;
        engine_info!(
            "lumen::FrameScheduler",
            "Swapchain recreated at {}x{} (window {}x{})",
            extent.width, extent.height, size.width, size.height
        );

        Ok(extent)
    }

    /// Wait for the GPU and tear the backend down in reverse bring-up order
    ///
    /// Calling it again does nothing.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        self.backend.wait_idle()?;
        self.backend.teardown();

        let stats = self.stats;
        engine_info!(
            "lumen::FrameScheduler",
            "Shutdown: {} frames presented, {} skipped, {} stale events, {} swapchain recreations",
            stats.frames_presented, stats.frames_skipped, stats.stale_events, stats.swapchain_recreations
        );

        Ok(())
    }

    fn mark_stale(&mut self, stage: &str) {
        engine_warn!(
            "lumen::FrameScheduler",
            "Swapchain stale at {} (frame slot {}), waiting for recreation",
            stage, self.current_frame
        );
        self.state = PresentationState::Stale;
        self.stats.stale_events += 1;
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
