//! Backend-agnostic device selection and swapchain configuration

pub mod adapter;
pub mod selector;
pub mod swapchain_support;

pub use adapter::{
    AdapterFeatures, AdapterInfo, AdapterType, QueueFamilyIndices, QueueFamilyInfo,
    SampleCounts, max_usable_sample_count,
};
pub use selector::{
    DeviceRequirements, SWAPCHAIN_EXTENSION_NAME, select_first_suitable, select_physical_device,
};
pub use swapchain_support::{
    ColorSpace, Extent2D, PixelFormat, PresentMode, SurfaceCapabilities, SurfaceFormat,
    SwapchainSupport, PREFERRED_SURFACE_FORMAT, UNDEFINED_EXTENT,
};
