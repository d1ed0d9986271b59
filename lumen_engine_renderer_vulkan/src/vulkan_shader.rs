/// SPIR-V shader modules loaded from disk

use ash::vk;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_debug, engine_error};
use std::ffi::CString;
use std::path::Path;

use crate::vulkan_instance::to_cstring;

pub(crate) struct VulkanShader {
    pub(crate) module: vk::ShaderModule,
    pub(crate) stage: vk::ShaderStageFlags,
    pub(crate) entry_point: CString,
}

impl VulkanShader {
    /// Load `path`, check it exports `entry_point` and create the module
    pub(crate) fn load(
        device: &ash::Device,
        path: &Path,
        stage: vk::ShaderStageFlags,
        entry_point: &str,
    ) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to read shader {}: {}", path.display(), e);
            Error::ShaderModuleLoad(format!("{}: {}", path.display(), e))
        })?;
        let code = parse_spirv(&bytes).map_err(|e| {
            engine_error!("lumen::vulkan", "Invalid SPIR-V in {}: {}", path.display(), e);
            Error::ShaderModuleLoad(format!("{}: {}", path.display(), e))
        })?;
        check_entry_point(&code, entry_point).map_err(|e| {
            engine_error!("lumen::vulkan", "Shader {} rejected: {}", path.display(), e);
            Error::ShaderModuleLoad(format!("{}: {}", path.display(), e))
        })?;

        let create_info = vk::ShaderModuleCreateInfo::default().code(&code);
        let module = unsafe { device.create_shader_module(&create_info, None) }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to create shader module: {:?}", e);
            Error::ShaderModuleLoad(format!("{}: {:?}", path.display(), e))
        })?;

        engine_debug!("lumen::vulkan", "Loaded shader {} ({} words)", path.display(), code.len());
        Ok(Self {
            module,
            stage,
            entry_point: to_cstring(entry_point)?,
        })
    }

    pub(crate) fn stage_info(&self) -> vk::PipelineShaderStageCreateInfo<'_> {
        vk::PipelineShaderStageCreateInfo::default()
            .stage(self.stage)
            .module(self.module)
            .name(&self.entry_point)
    }

    pub(crate) fn destroy(&self, device: &ash::Device) {
        unsafe { device.destroy_shader_module(self.module, None) };
    }
}

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Decode SPIR-V bytes into words (checks size and magic number)
pub(crate) fn parse_spirv(bytes: &[u8]) -> std::result::Result<Vec<u32>, String> {
    let code = ash::util::read_spv(&mut std::io::Cursor::new(bytes)).map_err(|e| e.to_string())?;
    match code.first() {
        Some(&SPIRV_MAGIC) => Ok(code),
        Some(word) => Err(format!("bad SPIR-V magic number {:#010x}", word)),
        None => Err("empty SPIR-V module".to_string()),
    }
}

/// Fail unless the module exports an entry point named `entry_point`
pub(crate) fn check_entry_point(code: &[u32], entry_point: &str) -> std::result::Result<(), String> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(code)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| format!("SPIR-V reflection failed: {:?}", e))?;

    if entry_points.iter().any(|ep| ep.name == entry_point) {
        Ok(())
    } else {
        let found: Vec<&str> = entry_points.iter().map(|ep| ep.name.as_str()).collect();
        Err(format!("no entry point {:?} (found {:?})", entry_point, found))
    }
}

#[cfg(test)]
#[path = "vulkan_shader_tests.rs"]
mod tests;
