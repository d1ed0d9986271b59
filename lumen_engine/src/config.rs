/// Renderer configuration
///
/// Everything the bring-up chain needs to know up front: application
/// identity, validation settings, required layers/extensions, adapter
/// requirements, shader locations and the clear colour.

use std::path::PathBuf;
use crate::device::{DeviceRequirements, SampleCounts, SWAPCHAIN_EXTENSION_NAME};
use crate::log::LogSeverity;

/// Khronos validation layer
pub const VALIDATION_LAYER_NAME: &str = "VK_LAYER_KHRONOS_validation";

/// Instance extension carrying the debug messenger
pub const DEBUG_UTILS_EXTENSION_NAME: &str = "VK_EXT_debug_utils";

/// Minimum severity of validation messages forwarded to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Severity of one validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationLevel {
    Verbose,
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Engine log severity used when forwarding the message
    pub fn log_severity(self) -> LogSeverity {
        match self {
            ValidationLevel::Verbose => LogSeverity::Trace,
            ValidationLevel::Info => LogSeverity::Info,
            ValidationLevel::Warning => LogSeverity::Warn,
            ValidationLevel::Error => LogSeverity::Error,
        }
    }
}

impl DebugSeverity {
    pub fn allows(self, level: ValidationLevel) -> bool {
        match self {
            DebugSeverity::ErrorsOnly => level == ValidationLevel::Error,
            DebugSeverity::ErrorsAndWarnings => level >= ValidationLevel::Warning,
            DebugSeverity::All => true,
        }
    }
}

/// Category of one validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCategory {
    General,
    Validation,
    Performance,
}

impl ValidationCategory {
    pub fn label(self) -> &'static str {
        match self {
            ValidationCategory::General => "General",
            ValidationCategory::Validation => "Validation",
            ValidationCategory::Performance => "Performance",
        }
    }
}

/// Message categories forwarded to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessageFilter {
    pub show_general: bool,
    pub show_validation: bool,
    pub show_performance: bool,
}

impl DebugMessageFilter {
    pub fn allows(&self, category: ValidationCategory) -> bool {
        match category {
            ValidationCategory::General => self.show_general,
            ValidationCategory::Validation => self.show_validation,
            ValidationCategory::Performance => self.show_performance,
        }
    }
}

impl Default for DebugMessageFilter {
    fn default() -> Self {
        Self {
            show_general: true,
            show_validation: true,
            show_performance: true,
        }
    }
}

/// Validation message counters, reported on shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn record(&mut self, level: ValidationLevel) {
        match level {
            ValidationLevel::Error => self.errors += 1,
            ValidationLevel::Warning => self.warnings += 1,
            ValidationLevel::Info => self.info += 1,
            ValidationLevel::Verbose => self.verbose += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Location of the SPIR-V binaries for the fixed pipeline
///
/// Files follow `{dir}/{name}.vert.spv` and `{dir}/{name}.frag.spv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub dir: PathBuf,
    pub name: String,
    /// Entry point both stages must export
    pub entry_point: String,
}

impl ShaderPaths {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            entry_point: "main".to_string(),
        }
    }

    pub fn vertex_path(&self) -> PathBuf {
        self.dir.join(format!("{}.vert.spv", self.name))
    }

    pub fn fragment_path(&self) -> PathBuf {
        self.dir.join(format!("{}.frag.spv", self.name))
    }
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self::new("shaders", "triangle")
    }
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Application name reported to the driver
    pub app_name: String,

    /// Application version (packed by the backend)
    pub app_version: (u32, u32, u32),

    /// Request the validation layers and register a debug messenger
    pub enable_validation: bool,

    /// Validation message severity filter
    pub debug_severity: DebugSeverity,

    /// Validation message category filter
    pub debug_message_filter: DebugMessageFilter,

    /// Count validation messages and report them on shutdown
    pub enable_validation_stats: bool,

    /// Layers requested when validation is enabled
    pub validation_layers: Vec<String>,

    /// Instance extensions on top of the window system ones
    pub required_instance_extensions: Vec<String>,

    /// Device extensions every candidate adapter must support
    pub required_device_extensions: Vec<String>,

    /// Adapter type and feature requirements
    pub device_requirements: DeviceRequirements,

    /// SPIR-V binaries of the fixed pipeline
    pub shaders: ShaderPaths,

    /// Render with the adapter's highest usable MSAA sample count
    pub multisampling: bool,

    /// Render pass clear colour (RGBA)
    pub clear_color: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "Lumen".to_string(),
            app_version: (0, 1, 0),
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            debug_message_filter: DebugMessageFilter::default(),
            enable_validation_stats: true,
            validation_layers: vec![VALIDATION_LAYER_NAME.to_string()],
            required_instance_extensions: Vec::new(),
            required_device_extensions: vec![SWAPCHAIN_EXTENSION_NAME.to_string()],
            device_requirements: DeviceRequirements::default(),
            shaders: ShaderPaths::default(),
            multisampling: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl RendererConfig {
    /// Instance extensions to enable
    ///
    /// Window system extensions first, then the configured ones, then the
    /// debug-utils extension when validation is on. Duplicates are dropped.
    pub fn instance_extensions(&self, window_extensions: &[String]) -> Vec<String> {
        let mut extensions: Vec<String> = Vec::new();
        let debug = self
            .enable_validation
            .then(|| DEBUG_UTILS_EXTENSION_NAME.to_string());

        for ext in window_extensions
            .iter()
            .chain(self.required_instance_extensions.iter())
            .chain(debug.iter())
        {
            if !extensions.contains(ext) {
                extensions.push(ext.clone());
            }
        }
        extensions
    }

    /// Layers to enable (empty when validation is off)
    pub fn instance_layers(&self) -> Vec<String> {
        if self.enable_validation {
            self.validation_layers.clone()
        } else {
            Vec::new()
        }
    }

    /// Sample count of the colour and depth attachments
    ///
    /// `max_usable` is the adapter's limit for colour and depth together.
    pub fn sample_count(&self, max_usable: SampleCounts) -> SampleCounts {
        if self.multisampling {
            max_usable
        } else {
            SampleCounts::TYPE_1
        }
    }

    /// Requirements used by adapter selection
    ///
    /// `required_device_extensions` is merged into the adapter requirements.
    pub fn effective_device_requirements(&self) -> DeviceRequirements {
        let mut requirements = self.device_requirements.clone();
        for ext in &self.required_device_extensions {
            if !requirements.extensions.contains(ext) {
                requirements.extensions.push(ext.clone());
            }
        }
        requirements
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
