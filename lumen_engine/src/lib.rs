/*!
# Lumen Engine

Backend-agnostic core of the Lumen real-time renderer.

The crate holds everything about bringing a GPU up and driving frames that
does not depend on a particular graphics API; the Vulkan backend lives in
`lumen_engine_renderer_vulkan`.

## Architecture

- **device**: adapter snapshots, first-fit adapter selection, queue family
  lookup and the swapchain format/present-mode/extent choices
- **frame**: the `FrameBackend` seam, the double-buffered `FrameScheduler`
  with its swapchain-recreation state machine, the `RenderLoop` lifecycle
  and the `StageLedger` used for reverse-order teardown
- **config**: `RendererConfig` (validation, layers, extensions, shaders)
- **log**: replaceable engine logger and the `engine_*` macros
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod device;
pub mod frame;

// Main lumen namespace module
pub mod lumen {
    // Error types
    pub use crate::error::{Error, Result};

    // Global logging host
    pub use crate::engine::Engine;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogCrateLogger, LogEntry, LogSeverity, Logger};
    }

    // Renderer configuration
    pub mod config {
        pub use crate::config::*;
    }

    // Adapter selection and swapchain choices
    pub mod device {
        pub use crate::device::*;
    }

    // Frame loop
    pub mod frame {
        pub use crate::frame::*;
    }
}
