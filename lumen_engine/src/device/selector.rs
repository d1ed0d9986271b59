/// First-fit physical device selection
///
/// Adapters are checked in enumeration order and the first one passing
/// every requirement is chosen. There is no scoring.

use rustc_hash::FxHashSet;
use crate::device::adapter::{AdapterFeatures, AdapterInfo, AdapterType};
use crate::error::Result;
use crate::{engine_bail, engine_debug, engine_info, engine_warn};

/// Device extension every presenting renderer needs
pub const SWAPCHAIN_EXTENSION_NAME: &str = "VK_KHR_swapchain";

/// What an adapter must offer to be selected
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRequirements {
    /// Required adapter type (`None` accepts any type)
    pub adapter_type: Option<AdapterType>,

    /// Features that must all be supported
    pub features: AdapterFeatures,

    /// Device extensions that must all be supported
    pub extensions: Vec<String>,
}

impl Default for DeviceRequirements {
    fn default() -> Self {
        Self {
            adapter_type: Some(AdapterType::DiscreteGpu),
            features: AdapterFeatures::GEOMETRY_SHADER | AdapterFeatures::SAMPLER_ANISOTROPY,
            extensions: vec![SWAPCHAIN_EXTENSION_NAME.to_string()],
        }
    }
}

/// Why `adapter` fails `requirements`, or `None` if it is suitable
pub(crate) fn rejection_reason(adapter: &AdapterInfo, requirements: &DeviceRequirements) -> Option<String> {
    if let Some(required_type) = requirements.adapter_type {
        if adapter.adapter_type != required_type {
            return Some(format!(
                "type {:?}, {:?} required",
                adapter.adapter_type, required_type
            ));
        }
    }

    let missing_features = requirements.features - adapter.features;
    if !missing_features.is_empty() {
        return Some(format!("missing features {:?}", missing_features));
    }

    let available: FxHashSet<&str> = adapter.extensions.iter().map(String::as_str).collect();
    let missing_extensions: Vec<&str> = requirements
        .extensions
        .iter()
        .map(String::as_str)
        .filter(|ext| !available.contains(ext))
        .collect();
    if !missing_extensions.is_empty() {
        return Some(format!("missing extensions {}", missing_extensions.join(", ")));
    }

    if !adapter.queue_family_indices().is_complete() {
        return Some("no graphics or no present queue family".to_string());
    }

    if !adapter.swapchain_support.is_adequate() {
        return Some("surface offers no format or no present mode".to_string());
    }

    None
}

/// Index of the first adapter meeting `requirements`
///
/// # Errors
///
/// `Error::NoSuitableDevice` listing the rejection reason of every adapter.
pub fn select_physical_device(
    adapters: &[AdapterInfo],
    requirements: &DeviceRequirements,
) -> Result<usize> {
    select_first_suitable(adapters.iter().cloned().map(Ok), requirements).map(|(index, _)| index)
}

/// First-fit selection over adapters described on demand
///
/// `candidates` yields, in enumeration order, each adapter's snapshot or the
/// error that prevented taking it. A failed snapshot rejects that adapter
/// only. Candidates after the selected one are never pulled.
///
/// # Errors
///
/// `Error::NoSuitableDevice` listing the rejection reason of every adapter.
pub fn select_first_suitable<I>(
    candidates: I,
    requirements: &DeviceRequirements,
) -> Result<(usize, AdapterInfo)>
where
    I: IntoIterator<Item = Result<AdapterInfo>>,
{
    let mut rejections = Vec::new();
    for (index, candidate) in candidates.into_iter().enumerate() {
        let adapter = match candidate {
            Ok(adapter) => adapter,
            Err(e) => {
                engine_warn!("lumen::DeviceSelector", "Could not query adapter {}: {}", index, e);
                rejections.push(format!("adapter {}: query failed ({})", index, e));
                continue;
            }
        };

        match rejection_reason(&adapter, requirements) {
            None => {
                engine_info!(
                    "lumen::DeviceSelector",
                    "Selected adapter {} '{}' (max samples {:?})",
                    index, adapter.name, adapter.max_sample_count
                );
                return Ok((index, adapter));
            }
            Some(reason) => {
                engine_debug!(
                    "lumen::DeviceSelector",
                    "Rejected adapter {} '{}': {}",
                    index, adapter.name, reason
                );
                rejections.push(format!("adapter {} '{}': {}", index, adapter.name, reason));
            }
        }
    }

    if rejections.is_empty() {
        engine_bail!(NoSuitableDevice, "lumen::DeviceSelector", "no adapter enumerated");
    }
    engine_bail!(NoSuitableDevice, "lumen::DeviceSelector", "{}", rejections.join("; "));
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
