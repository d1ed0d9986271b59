/// Swapchain support details and the pure choice functions built on them
///
/// The backend queries surface capabilities, formats and present modes,
/// converts them into these backend-agnostic types and lets the functions
/// below decide how the swapchain is configured.

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero width or height (minimized window)
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Presentable image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    A2B10G10R10_UNORM,
    R16G16B16A16_SFLOAT,
    /// Any other backend format, kept by raw value
    Other(i32),
}

/// Colour space of a presentable format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum ColorSpace {
    SRGB_NONLINEAR,
    EXTENDED_SRGB_LINEAR,
    HDR10_ST2084,
    Other(i32),
}

/// Format/colour-space pair supported by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFormat {
    pub format: PixelFormat,
    pub color_space: ColorSpace,
}

impl SurfaceFormat {
    pub const fn new(format: PixelFormat, color_space: ColorSpace) -> Self {
        Self { format, color_space }
    }
}

/// Presentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    Immediate,
    /// Triple-buffering style, newest image replaces the queued one
    Mailbox,
    /// Vsync queue, always available
    Fifo,
    FifoRelaxed,
}

/// Surface capabilities relevant to swapchain creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceCapabilities {
    pub min_image_count: u32,
    /// 0 means "no upper bound"
    pub max_image_count: u32,
    /// `width == u32::MAX` means the surface lets the swapchain pick
    pub current_extent: Extent2D,
    pub min_image_extent: Extent2D,
    pub max_image_extent: Extent2D,
}

/// Surface extent value signalling "defined by the swapchain"
pub const UNDEFINED_EXTENT: u32 = u32::MAX;

/// Everything a surface supports, queried per adapter
///
/// The default value (nothing supported) stands for a surface the adapter
/// cannot present to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SwapchainSupport {
    pub capabilities: SurfaceCapabilities,
    pub formats: Vec<SurfaceFormat>,
    pub present_modes: Vec<PresentMode>,
}

/// Preferred swapchain format
pub const PREFERRED_SURFACE_FORMAT: SurfaceFormat =
    SurfaceFormat::new(PixelFormat::B8G8R8A8_SRGB, ColorSpace::SRGB_NONLINEAR);

impl SwapchainSupport {
    /// At least one format and one present mode
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }

    /// B8G8R8A8_SRGB / SRGB_NONLINEAR if offered, else the first format
    ///
    /// Returns `None` only when the surface offers no format at all.
    pub fn choose_surface_format(&self) -> Option<SurfaceFormat> {
        self.formats
            .iter()
            .copied()
            .find(|f| *f == PREFERRED_SURFACE_FORMAT)
            .or_else(|| self.formats.first().copied())
    }

    /// Mailbox if offered, else Fifo
    pub fn choose_present_mode(&self) -> PresentMode {
        if self.present_modes.contains(&PresentMode::Mailbox) {
            PresentMode::Mailbox
        } else {
            PresentMode::Fifo
        }
    }

    /// Swapchain extent for a window whose framebuffer is `framebuffer_size`
    pub fn choose_extent(&self, framebuffer_size: Extent2D) -> Extent2D {
        let caps = &self.capabilities;
        if caps.current_extent.width != UNDEFINED_EXTENT {
            return caps.current_extent;
        }

        Extent2D {
            width: framebuffer_size
                .width
                .max(caps.min_image_extent.width)
                .min(caps.max_image_extent.width),
            height: framebuffer_size
                .height
                .max(caps.min_image_extent.height)
                .min(caps.max_image_extent.height),
        }
    }

    /// One more than the minimum, capped by the maximum when there is one
    pub fn image_count(&self) -> u32 {
        let caps = &self.capabilities;
        let desired = caps.min_image_count.saturating_add(1);
        if caps.max_image_count > 0 && desired > caps.max_image_count {
            caps.max_image_count
        } else {
            desired
        }
    }
}

#[cfg(test)]
#[path = "swapchain_support_tests.rs"]
mod tests;
