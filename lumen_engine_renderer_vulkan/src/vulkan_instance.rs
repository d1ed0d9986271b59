/// Vulkan instance - loader entry, application info, layers and extensions

use ash::vk;
use lumen_engine::lumen::config::RendererConfig;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_error, engine_info, engine_warn};
use raw_window_handle::DisplayHandle;
use std::ffi::{CStr, CString};

pub(crate) struct VulkanInstance {
    pub(crate) entry: ash::Entry,
    pub(crate) instance: ash::Instance,
}

impl VulkanInstance {
    /// Load the Vulkan library and create an instance for `display_handle`
    ///
    /// Fails with `InitializationFailed` when validation is requested but a
    /// validation layer is not installed.
    pub(crate) fn new(display_handle: DisplayHandle<'_>, config: &RendererConfig) -> Result<Self> {
        let entry = unsafe { ash::Entry::load() }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to load Vulkan library: {:?}", e);
            Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
        })?;

        let layers = config.instance_layers();
        if !layers.is_empty() {
            let available = available_layers(&entry)?;
            let missing = missing_names(&available, &layers);
            if !missing.is_empty() {
                engine_error!("lumen::vulkan", "Validation layers requested but not available: {:?}", missing);
                return Err(Error::InitializationFailed(format!(
                    "validation layers requested but not available: {}",
                    missing.join(", ")
                )));
            }
        }

        let window_extensions = ash_window::enumerate_required_extensions(display_handle.as_raw())
            .map_err(|e| {
                engine_error!("lumen::vulkan", "Failed to get required extensions: {}", e);
                Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
            })?
            .iter()
            .map(|&ptr| unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
            .collect::<Vec<String>>();
        let extensions = config.instance_extensions(&window_extensions);

        let app_name = to_cstring(&config.app_name)?;
        let (major, minor, patch) = config.app_version;
        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(c"Lumen")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_3);

        let layer_names = to_cstrings(&layers)?;
        let layer_ptrs: Vec<*const std::os::raw::c_char> =
            layer_names.iter().map(|name| name.as_ptr()).collect();
        let extension_names = to_cstrings(&extensions)?;
        let extension_ptrs: Vec<*const std::os::raw::c_char> =
            extension_names.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&extension_ptrs);

        let instance = unsafe { entry.create_instance(&create_info, None) }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to create Vulkan instance: {:?}", e);
            Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
        })?;

        engine_info!(
            "lumen::vulkan",
            "Instance created ({} extensions, {} layers)",
            extensions.len(),
            layers.len()
        );
        Ok(Self { entry, instance })
    }

    pub(crate) fn destroy(&self) {
        unsafe { self.instance.destroy_instance(None) };
    }
}

fn available_layers(entry: &ash::Entry) -> Result<Vec<String>> {
    let properties = unsafe { entry.enumerate_instance_layer_properties() }.map_err(|e| {
        engine_error!("lumen::vulkan", "Failed to enumerate instance layers: {:?}", e);
        Error::InitializationFailed(format!("Failed to enumerate instance layers: {:?}", e))
    })?;

    Ok(properties
        .iter()
        .filter_map(|layer| layer.layer_name_as_c_str().ok())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

/// Without the `vulkan-validation` feature, validation requests are dropped
pub(crate) fn apply_validation_feature(config: &mut RendererConfig) {
    if config.enable_validation && !cfg!(feature = "vulkan-validation") {
        engine_warn!(
            "lumen::vulkan",
            "Validation requested but the vulkan-validation feature is disabled; ignoring"
        );
        config.enable_validation = false;
    }
}

/// Requested names absent from `available`, in request order
pub(crate) fn missing_names(available: &[String], requested: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| !available.contains(name))
        .cloned()
        .collect()
}

pub(crate) fn to_cstring(value: &str) -> Result<CString> {
    CString::new(value).map_err(|e| {
        engine_error!("lumen::vulkan", "Name contains an interior NUL: {:?}", value);
        Error::InitializationFailed(format!("invalid name {:?}: {}", value, e))
    })
}

pub(crate) fn to_cstrings(values: &[String]) -> Result<Vec<CString>> {
    values.iter().map(|value| to_cstring(value)).collect()
}

#[cfg(test)]
#[path = "vulkan_instance_tests.rs"]
mod tests;
