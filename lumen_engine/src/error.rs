//! Error types for the Lumen engine
//!
//! Bring-up failures, mid-frame failures and resource-load failures are all
//! fatal and surface through this enum. Presentation staleness (an
//! out-of-date or suboptimal swapchain) is NOT an error: it is reported as a
//! `FrameOutcome` by the frame scheduler.

use std::fmt;

/// Result type for Lumen engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan loader, entry points, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Initialization failed (instance, surface, device, sync objects, command pool)
    InitializationFailed(String),

    /// No adapter passed every suitability check
    NoSuitableDevice(String),

    /// Swapchain, swapchain image view, framebuffer or attachment image creation failed
    SwapchainCreation(String),

    /// Render pass, pipeline layout or graphics pipeline creation failed
    PipelineCreation(String),

    /// Shader binary missing, malformed or rejected by the driver
    ShaderModuleLoad(String),

    /// Command recording, fence handling or queue submission failed
    Submission(String),

    /// Image acquisition or presentation failed for a reason other than staleness
    Presentation(String),
}

impl Error {
    /// Whether this error happened while bringing the renderer up
    pub fn is_bring_up(&self) -> bool {
        matches!(
            self,
            Error::InitializationFailed(_)
                | Error::NoSuitableDevice(_)
                | Error::SwapchainCreation(_)
                | Error::PipelineCreation(_)
                | Error::ShaderModuleLoad(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::NoSuitableDevice(msg) => write!(f, "No suitable physical device: {}", msg),
            Error::SwapchainCreation(msg) => write!(f, "Swapchain creation failed: {}", msg),
            Error::PipelineCreation(msg) => write!(f, "Pipeline creation failed: {}", msg),
            Error::ShaderModuleLoad(msg) => write!(f, "Shader module load failed: {}", msg),
            Error::Submission(msg) => write!(f, "Submission failed: {}", msg),
            Error::Presentation(msg) => write!(f, "Presentation failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
