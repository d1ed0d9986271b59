/// Adapter (physical device) snapshot and queue family lookup

use bitflags::bitflags;
use crate::device::swapchain_support::SwapchainSupport;

/// Kind of physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterType {
    Other,
    IntegratedGpu,
    DiscreteGpu,
    VirtualGpu,
    Cpu,
}

bitflags! {
    /// Optional device features the engine cares about
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AdapterFeatures: u32 {
        const GEOMETRY_SHADER = 1 << 0;
        const SAMPLER_ANISOTROPY = 1 << 1;
        const SAMPLE_RATE_SHADING = 1 << 2;
    }
}

bitflags! {
    /// Framebuffer sample counts (bit values match the Vulkan ones)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SampleCounts: u32 {
        const TYPE_1 = 0x01;
        const TYPE_2 = 0x02;
        const TYPE_4 = 0x04;
        const TYPE_8 = 0x08;
        const TYPE_16 = 0x10;
        const TYPE_32 = 0x20;
        const TYPE_64 = 0x40;
    }
}

/// Highest MSAA sample count usable by both color and depth attachments
pub fn max_usable_sample_count(color: SampleCounts, depth: SampleCounts) -> SampleCounts {
    let counts = color & depth;
    [
        SampleCounts::TYPE_64,
        SampleCounts::TYPE_32,
        SampleCounts::TYPE_16,
        SampleCounts::TYPE_8,
        SampleCounts::TYPE_4,
        SampleCounts::TYPE_2,
    ]
    .into_iter()
    .find(|candidate| counts.contains(*candidate))
    .unwrap_or(SampleCounts::TYPE_1)
}

/// Capabilities of one queue family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyInfo {
    pub queue_count: u32,
    pub supports_graphics: bool,
    /// Can present to the surface the renderer was created for
    pub supports_present: bool,
}

/// Graphics and present queue family indices
///
/// Both may name the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilyIndices {
    /// Sentinel for a role no family has been found for
    pub const UNASSIGNED: u32 = u32::MAX;

    pub const fn unassigned() -> Self {
        Self {
            graphics: Self::UNASSIGNED,
            present: Self::UNASSIGNED,
        }
    }

    /// Scan every family; for each role the last matching family wins
    pub fn find(families: &[QueueFamilyInfo]) -> Self {
        let mut indices = Self::unassigned();
        for (index, family) in families.iter().enumerate() {
            if family.supports_graphics {
                indices.graphics = index as u32;
            }
            if family.supports_present {
                indices.present = index as u32;
            }
        }
        indices
    }

    /// Both roles assigned
    pub fn is_complete(&self) -> bool {
        self.graphics != Self::UNASSIGNED && self.present != Self::UNASSIGNED
    }

    /// Distinct family indices, graphics first (one or two entries)
    pub fn unique(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(2);
        for index in [self.graphics, self.present] {
            if index != Self::UNASSIGNED && !indices.contains(&index) {
                indices.push(index);
            }
        }
        indices
    }

    /// Graphics and present live in different families
    pub fn is_split(&self) -> bool {
        self.unique().len() > 1
    }
}

impl Default for QueueFamilyIndices {
    fn default() -> Self {
        Self::unassigned()
    }
}

/// Read-only snapshot of a physical device, taken during selection
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    pub name: String,
    pub adapter_type: AdapterType,
    pub features: AdapterFeatures,
    /// Supported device extension names
    pub extensions: Vec<String>,
    pub queue_families: Vec<QueueFamilyInfo>,
    pub swapchain_support: SwapchainSupport,
    pub max_sample_count: SampleCounts,
}

impl AdapterInfo {
    pub fn queue_family_indices(&self) -> QueueFamilyIndices {
        QueueFamilyIndices::find(&self.queue_families)
    }

    pub fn supports_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext == name)
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
