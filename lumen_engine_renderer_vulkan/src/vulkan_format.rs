/// Conversions between Vulkan types and the engine's backend-agnostic types

use ash::vk;
use lumen_engine::lumen::device::{
    AdapterFeatures, AdapterType, ColorSpace, Extent2D, PixelFormat, PresentMode, SampleCounts,
    SurfaceCapabilities, SurfaceFormat,
};

pub(crate) fn pixel_format_from_vk(format: vk::Format) -> PixelFormat {
    match format {
        vk::Format::B8G8R8A8_SRGB => PixelFormat::B8G8R8A8_SRGB,
        vk::Format::B8G8R8A8_UNORM => PixelFormat::B8G8R8A8_UNORM,
        vk::Format::R8G8B8A8_SRGB => PixelFormat::R8G8B8A8_SRGB,
        vk::Format::R8G8B8A8_UNORM => PixelFormat::R8G8B8A8_UNORM,
        vk::Format::A2B10G10R10_UNORM_PACK32 => PixelFormat::A2B10G10R10_UNORM,
        vk::Format::R16G16B16A16_SFLOAT => PixelFormat::R16G16B16A16_SFLOAT,
        other => PixelFormat::Other(other.as_raw()),
    }
}

pub(crate) fn pixel_format_to_vk(format: PixelFormat) -> vk::Format {
    match format {
        PixelFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        PixelFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        PixelFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        PixelFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        PixelFormat::A2B10G10R10_UNORM => vk::Format::A2B10G10R10_UNORM_PACK32,
        PixelFormat::R16G16B16A16_SFLOAT => vk::Format::R16G16B16A16_SFLOAT,
        PixelFormat::Other(raw) => vk::Format::from_raw(raw),
    }
}

pub(crate) fn color_space_from_vk(color_space: vk::ColorSpaceKHR) -> ColorSpace {
    match color_space {
        vk::ColorSpaceKHR::SRGB_NONLINEAR => ColorSpace::SRGB_NONLINEAR,
        vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT => ColorSpace::EXTENDED_SRGB_LINEAR,
        vk::ColorSpaceKHR::HDR10_ST2084_EXT => ColorSpace::HDR10_ST2084,
        other => ColorSpace::Other(other.as_raw()),
    }
}

pub(crate) fn color_space_to_vk(color_space: ColorSpace) -> vk::ColorSpaceKHR {
    match color_space {
        ColorSpace::SRGB_NONLINEAR => vk::ColorSpaceKHR::SRGB_NONLINEAR,
        ColorSpace::EXTENDED_SRGB_LINEAR => vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
        ColorSpace::HDR10_ST2084 => vk::ColorSpaceKHR::HDR10_ST2084_EXT,
        ColorSpace::Other(raw) => vk::ColorSpaceKHR::from_raw(raw),
    }
}

pub(crate) fn surface_format_from_vk(format: &vk::SurfaceFormatKHR) -> SurfaceFormat {
    SurfaceFormat::new(
        pixel_format_from_vk(format.format),
        color_space_from_vk(format.color_space),
    )
}

pub(crate) fn surface_format_to_vk(format: SurfaceFormat) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format: pixel_format_to_vk(format.format),
        color_space: color_space_to_vk(format.color_space),
    }
}

/// `None` for present modes the engine never picks (shared refresh modes)
pub(crate) fn present_mode_from_vk(mode: vk::PresentModeKHR) -> Option<PresentMode> {
    match mode {
        vk::PresentModeKHR::IMMEDIATE => Some(PresentMode::Immediate),
        vk::PresentModeKHR::MAILBOX => Some(PresentMode::Mailbox),
        vk::PresentModeKHR::FIFO => Some(PresentMode::Fifo),
        vk::PresentModeKHR::FIFO_RELAXED => Some(PresentMode::FifoRelaxed),
        _ => None,
    }
}

pub(crate) fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
    }
}

pub(crate) fn adapter_type_from_vk(device_type: vk::PhysicalDeviceType) -> AdapterType {
    match device_type {
        vk::PhysicalDeviceType::INTEGRATED_GPU => AdapterType::IntegratedGpu,
        vk::PhysicalDeviceType::DISCRETE_GPU => AdapterType::DiscreteGpu,
        vk::PhysicalDeviceType::VIRTUAL_GPU => AdapterType::VirtualGpu,
        vk::PhysicalDeviceType::CPU => AdapterType::Cpu,
        _ => AdapterType::Other,
    }
}

pub(crate) fn adapter_features_from_vk(features: &vk::PhysicalDeviceFeatures) -> AdapterFeatures {
    let mut result = AdapterFeatures::empty();
    if features.geometry_shader == vk::TRUE {
        result |= AdapterFeatures::GEOMETRY_SHADER;
    }
    if features.sampler_anisotropy == vk::TRUE {
        result |= AdapterFeatures::SAMPLER_ANISOTROPY;
    }
    if features.sample_rate_shading == vk::TRUE {
        result |= AdapterFeatures::SAMPLE_RATE_SHADING;
    }
    result
}

/// Device features to enable for `features`
pub(crate) fn adapter_features_to_vk(features: AdapterFeatures) -> vk::PhysicalDeviceFeatures {
    vk::PhysicalDeviceFeatures::default()
        .geometry_shader(features.contains(AdapterFeatures::GEOMETRY_SHADER))
        .sampler_anisotropy(features.contains(AdapterFeatures::SAMPLER_ANISOTROPY))
        .sample_rate_shading(features.contains(AdapterFeatures::SAMPLE_RATE_SHADING))
}

pub(crate) fn sample_counts_from_vk(counts: vk::SampleCountFlags) -> SampleCounts {
    SampleCounts::from_bits_truncate(counts.as_raw())
}

pub(crate) fn sample_count_to_vk(count: SampleCounts) -> vk::SampleCountFlags {
    vk::SampleCountFlags::from_raw(count.bits())
}

pub(crate) fn extent_from_vk(extent: vk::Extent2D) -> Extent2D {
    Extent2D::new(extent.width, extent.height)
}

pub(crate) fn extent_to_vk(extent: Extent2D) -> vk::Extent2D {
    vk::Extent2D {
        width: extent.width,
        height: extent.height,
    }
}

pub(crate) fn capabilities_from_vk(caps: &vk::SurfaceCapabilitiesKHR) -> SurfaceCapabilities {
    SurfaceCapabilities {
        min_image_count: caps.min_image_count,
        max_image_count: caps.max_image_count,
        current_extent: extent_from_vk(caps.current_extent),
        min_image_extent: extent_from_vk(caps.min_image_extent),
        max_image_extent: extent_from_vk(caps.max_image_extent),
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
