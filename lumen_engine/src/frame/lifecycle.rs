/// Window lifecycle adapter
///
/// Maps the window system's Load / Update / Render / Resize / Close events
/// onto the frame scheduler. Before `on_load` there is no scheduler and
/// render or resize events are ignored.

use crate::device::Extent2D;
use crate::error::Result;
use crate::frame::backend::{FrameBackend, WindowSurface};
use crate::frame::scheduler::{FrameOutcome, FrameScheduler};
use crate::{engine_bail, engine_debug, engine_info};

/// Drives a `FrameScheduler` from window events
pub struct RenderLoop<B: FrameBackend> {
    scheduler: Option<FrameScheduler<B>>,
    update_hook: Option<Box<dyn FnMut(f64)>>,
    elapsed: f64,
}

impl<B: FrameBackend> RenderLoop<B> {
    pub fn new() -> Self {
        Self {
            scheduler: None,
            update_hook: None,
            elapsed: 0.0,
        }
    }

    /// Application hook invoked by `on_update`
    pub fn set_update_hook<F: FnMut(f64) + 'static>(&mut self, hook: F) {
        self.update_hook = Some(Box::new(hook));
    }

    pub fn is_loaded(&self) -> bool {
        self.scheduler.is_some()
    }

    pub fn scheduler(&self) -> Option<&FrameScheduler<B>> {
        self.scheduler.as_ref()
    }

    pub fn scheduler_mut(&mut self) -> Option<&mut FrameScheduler<B>> {
        self.scheduler.as_mut()
    }

    /// Seconds accumulated through `on_update`
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Window loaded: take the brought-up backend
    pub fn on_load(&mut self, backend: B) -> Result<()> {
        if self.scheduler.is_some() {
            engine_bail!(InitializationFailed, "lumen::RenderLoop", "on_load called twice");
        }
        let extent = backend.swapchain_extent();
        self.scheduler = Some(FrameScheduler::new(backend));
        engine_info!(
            "lumen::RenderLoop",
            "Renderer loaded, swapchain {}x{}",
            extent.width, extent.height
        );
        Ok(())
    }

    /// Per-tick application update
    pub fn on_update(&mut self, delta_time: f64) {
        self.elapsed += delta_time;
        if let Some(hook) = self.update_hook.as_mut() {
            hook(delta_time);
        }
    }

    /// Per-tick render
    pub fn on_render(&mut self, delta_time: f64) -> Result<FrameOutcome> {
        match self.scheduler.as_mut() {
            Some(scheduler) => scheduler.draw_frame(delta_time),
            None => Ok(FrameOutcome::Skipped),
        }
    }

    /// Framebuffer resized: rebuild the swapchain
    ///
    /// Returns `None` before `on_load`.
    pub fn on_resize(&mut self, window: &mut dyn WindowSurface) -> Result<Option<Extent2D>> {
        match self.scheduler.as_mut() {
            Some(scheduler) => scheduler.recreate_swapchain(window).map(Some),
            None => {
                engine_debug!("lumen::RenderLoop", "Resize before load ignored");
                Ok(None)
            }
        }
    }

    /// Window closing: wait idle and tear the renderer down
    pub fn shutdown(&mut self) -> Result<()> {
        match self.scheduler.as_mut() {
            Some(scheduler) => scheduler.shutdown(),
            None => Ok(()),
        }
    }
}

impl<B: FrameBackend> Default for RenderLoop<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
