/// Bring-up stage ledger
///
/// Records which stages of the acquisition chain exist so teardown can walk
/// them in exact reverse order, including after a partial bring-up.

use crate::engine_trace;

/// Stages of the acquisition chain, in construction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BringUpStage {
    Instance,
    DebugMessenger,
    Surface,
    Device,
    Swapchain,
    RenderPass,
    Pipeline,
    FrameBuffers,
    CommandPool,
    SyncObjects,
}

impl BringUpStage {
    /// Every stage in construction order
    pub const ALL: [BringUpStage; 10] = [
        BringUpStage::Instance,
        BringUpStage::DebugMessenger,
        BringUpStage::Surface,
        BringUpStage::Device,
        BringUpStage::Swapchain,
        BringUpStage::RenderPass,
        BringUpStage::Pipeline,
        BringUpStage::FrameBuffers,
        BringUpStage::CommandPool,
        BringUpStage::SyncObjects,
    ];
}

/// Ordered record of constructed stages
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageLedger {
    stages: Vec<BringUpStage>,
}

impl StageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `stage` has been constructed
    ///
    /// Stages must be recorded in construction order, each at most once.
    /// Optional stages (the debug messenger) may be skipped.
    pub fn record(&mut self, stage: BringUpStage) {
        debug_assert!(
            self.stages.last().map_or(true, |last| *last < stage),
            "stage {:?} recorded out of order after {:?}",
            stage,
            self.stages.last()
        );
        engine_trace!("lumen::StageLedger", "Constructed {:?}", stage);
        self.stages.push(stage);
    }

    /// Constructed stages, oldest first
    pub fn stages(&self) -> &[BringUpStage] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Remove every stage, newest first
    pub fn drain_reverse(&mut self) -> Vec<BringUpStage> {
        let mut order = std::mem::take(&mut self.stages);
        order.reverse();
        order
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
