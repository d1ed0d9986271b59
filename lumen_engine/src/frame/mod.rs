//! Frame loop: backend seam, scheduler state machine, lifecycle and teardown ledger

pub mod backend;
pub mod ledger;
pub mod lifecycle;
pub mod scheduler;

#[cfg(test)]
pub mod mock_backend;

pub use backend::{
    AcquireOutcome, DrawCallback, FrameBackend, PresentOutcome, WindowSurface,
    MAX_FRAMES_IN_FLIGHT,
};
pub use ledger::{BringUpStage, StageLedger};
pub use lifecycle::RenderLoop;
pub use scheduler::{FrameOutcome, FrameScheduler, FrameStats, PresentationState};
