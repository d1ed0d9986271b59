//! Unit tests for selector.rs
//!
//! Tests first-fit selection and the rejection reasons reported for
//! unsuitable adapters.

use crate::device::adapter::*;
use crate::device::selector::*;
use crate::device::swapchain_support::*;
use crate::error::Error;

fn adequate_support() -> SwapchainSupport {
    SwapchainSupport {
        capabilities: SurfaceCapabilities {
            min_image_count: 2,
            max_image_count: 8,
            current_extent: Extent2D::new(800, 600),
            min_image_extent: Extent2D::new(1, 1),
            max_image_extent: Extent2D::new(4096, 4096),
        },
        formats: vec![PREFERRED_SURFACE_FORMAT],
        present_modes: vec![PresentMode::Fifo],
    }
}

fn discrete(name: &str) -> AdapterInfo {
    AdapterInfo {
        name: name.to_string(),
        adapter_type: AdapterType::DiscreteGpu,
        features: AdapterFeatures::GEOMETRY_SHADER | AdapterFeatures::SAMPLER_ANISOTROPY,
        extensions: vec![SWAPCHAIN_EXTENSION_NAME.to_string()],
        queue_families: vec![QueueFamilyInfo {
            queue_count: 16,
            supports_graphics: true,
            supports_present: true,
        }],
        swapchain_support: adequate_support(),
        max_sample_count: SampleCounts::TYPE_8,
    }
}

fn integrated(name: &str) -> AdapterInfo {
    AdapterInfo {
        adapter_type: AdapterType::IntegratedGpu,
        ..discrete(name)
    }
}

// ============================================================================
// FIRST FIT
// ============================================================================

#[test]
fn test_first_suitable_adapter_is_selected() {
    let adapters = vec![integrated("iGPU"), discrete("dGPU A"), discrete("dGPU B")];
    let index = select_physical_device(&adapters, &DeviceRequirements::default()).unwrap();
    assert_eq!(index, 1);
}

#[test]
fn test_order_not_capability_decides() {
    let mut weaker = discrete("first");
    weaker.max_sample_count = SampleCounts::TYPE_1;
    let mut stronger = discrete("second");
    stronger.max_sample_count = SampleCounts::TYPE_64;

    let index = select_physical_device(&[weaker, stronger], &DeviceRequirements::default()).unwrap();
    assert_eq!(index, 0);
}

#[test]
fn test_selected_index_passes_every_check() {
    let mut no_ext = discrete("no swapchain");
    no_ext.extensions.clear();
    let adapters = vec![no_ext, integrated("iGPU"), discrete("good")];
    let requirements = DeviceRequirements::default();

    let index = select_physical_device(&adapters, &requirements).unwrap();
    assert!(rejection_reason(&adapters[index], &requirements).is_none());
    for earlier in &adapters[..index] {
        assert!(rejection_reason(earlier, &requirements).is_some());
    }
}

#[test]
fn test_any_type_accepted_when_unconstrained() {
    let requirements = DeviceRequirements {
        adapter_type: None,
        ..DeviceRequirements::default()
    };
    let index = select_physical_device(&[integrated("iGPU")], &requirements).unwrap();
    assert_eq!(index, 0);
}

// ============================================================================
// REJECTIONS
// ============================================================================

#[test]
fn test_missing_feature_rejected() {
    let mut adapter = discrete("no aniso");
    adapter.features = AdapterFeatures::GEOMETRY_SHADER;
    let reason = rejection_reason(&adapter, &DeviceRequirements::default()).unwrap();
    assert!(reason.contains("SAMPLER_ANISOTROPY"));
}

#[test]
fn test_missing_extension_rejected() {
    let mut adapter = discrete("no swapchain");
    adapter.extensions = vec!["VK_KHR_maintenance1".to_string()];
    let reason = rejection_reason(&adapter, &DeviceRequirements::default()).unwrap();
    assert!(reason.contains(SWAPCHAIN_EXTENSION_NAME));
}

#[test]
fn test_incomplete_queue_families_rejected() {
    let mut adapter = discrete("compute only");
    adapter.queue_families = vec![QueueFamilyInfo {
        queue_count: 4,
        supports_graphics: false,
        supports_present: true,
    }];
    assert!(rejection_reason(&adapter, &DeviceRequirements::default()).is_some());
}

#[test]
fn test_inadequate_swapchain_rejected() {
    let mut adapter = discrete("headless");
    adapter.swapchain_support.present_modes.clear();
    let reason = rejection_reason(&adapter, &DeviceRequirements::default()).unwrap();
    assert!(reason.contains("present mode"));
}

#[test]
fn test_no_suitable_device_lists_every_adapter() {
    let adapters = vec![integrated("iGPU"), integrated("software")];
    let err = select_physical_device(&adapters, &DeviceRequirements::default()).unwrap_err();

    match err {
        Error::NoSuitableDevice(msg) => {
            assert!(msg.contains("iGPU"));
            assert!(msg.contains("software"));
        }
        other => panic!("unexpected error {}", other),
    }
}

#[test]
fn test_empty_adapter_list_fails() {
    let err = select_physical_device(&[], &DeviceRequirements::default()).unwrap_err();
    assert!(matches!(err, Error::NoSuitableDevice(_)));
}

// ============================================================================
// ADAPTERS DESCRIBED ON DEMAND
// ============================================================================

fn query_failure(what: &str) -> Error {
    Error::BackendError(format!("{} failed: ERROR_DEVICE_LOST", what))
}

#[test]
fn test_unqueryable_later_adapter_does_not_block_earlier_one() {
    let candidates = vec![
        Ok(discrete("good")),
        Err(query_failure("vkEnumerateDeviceExtensionProperties")),
    ];
    let (index, adapter) = select_first_suitable(candidates, &DeviceRequirements::default()).unwrap();
    assert_eq!(index, 0);
    assert_eq!(adapter.name, "good");
}

#[test]
fn test_unqueryable_adapter_rejected_and_next_selected() {
    let candidates = vec![
        Err(query_failure("vkGetPhysicalDeviceSurfaceSupportKHR")),
        Ok(integrated("iGPU")),
        Ok(discrete("dGPU")),
    ];
    let (index, adapter) = select_first_suitable(candidates, &DeviceRequirements::default()).unwrap();
    assert_eq!(index, 2);
    assert_eq!(adapter.name, "dGPU");
}

#[test]
fn test_candidates_after_selection_are_not_described() {
    let mut described = 0;
    let candidates = (0..4).map(|n| {
        described += 1;
        Ok::<_, Error>(discrete(&format!("dGPU {}", n)))
    });

    let (index, _) = select_first_suitable(candidates, &DeviceRequirements::default()).unwrap();
    assert_eq!(index, 0);
    assert_eq!(described, 1);
}

#[test]
fn test_every_adapter_unqueryable_reports_query_failures() {
    let candidates = vec![Err(query_failure("first")), Err(query_failure("second"))];
    let err = select_first_suitable(candidates, &DeviceRequirements::default()).unwrap_err();

    match err {
        Error::NoSuitableDevice(msg) => {
            assert!(msg.contains("adapter 0: query failed"));
            assert!(msg.contains("adapter 1: query failed"));
        }
        other => panic!("unexpected error {}", other),
    }
}

#[test]
fn test_no_candidates_fails() {
    let candidates: Vec<crate::error::Result<AdapterInfo>> = Vec::new();
    let err = select_first_suitable(candidates, &DeviceRequirements::default()).unwrap_err();
    assert!(matches!(err, Error::NoSuitableDevice(_)));
}
