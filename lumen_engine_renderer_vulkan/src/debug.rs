/// Vulkan Debug Messenger - Routes validation layer messages into the engine log
///
/// Messages are filtered by severity and category, counted, grouped by text
/// and forwarded to the engine logger under `lumen::validation`. The counters
/// are reported with colored output when the renderer shuts down.

use ash::vk;
use colored::*;
use lumen_engine::lumen::config::{
    DebugMessageFilter, DebugSeverity, RendererConfig, ValidationCategory, ValidationLevel,
    ValidationStats,
};
use lumen_engine::lumen::log::LogSeverity;
use lumen_engine::lumen::{Engine, Error, Result};
use lumen_engine::{engine_debug, engine_error};
use rustc_hash::FxHashMap;
use std::ffi::CStr;
use std::sync::Mutex;

/// Global debug configuration (shared across callbacks)
static DEBUG_CONFIG: Mutex<Option<Config>> = Mutex::new(None);

/// Global validation statistics
static VALIDATION_STATS: Mutex<ValidationStats> = Mutex::new(ValidationStats {
    errors: 0,
    warnings: 0,
    info: 0,
    verbose: 0,
});

/// Global message tracker for grouping identical messages
static MESSAGE_TRACKER: Mutex<Option<MessageTracker>> = Mutex::new(None);

/// Debug configuration for the callback
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub severity: DebugSeverity,
    pub message_filter: DebugMessageFilter,
    pub enable_stats: bool,
}

impl Config {
    pub fn from_renderer_config(config: &RendererConfig) -> Self {
        Self {
            severity: config.debug_severity,
            message_filter: config.debug_message_filter,
            enable_stats: config.enable_validation_stats,
        }
    }
}

#[derive(Default)]
struct MessageTracker {
    messages: FxHashMap<String, u32>,
}

impl MessageTracker {
    fn track_message(&mut self, message: &str) -> u32 {
        let count = self.messages.entry(message.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    fn duplicate_count(&self) -> usize {
        self.messages.values().filter(|&&count| count > 1).count()
    }
}

/// Install the callback configuration and reset the counters
pub fn init_debug_config(config: Config) {
    if let Ok(mut stats) = VALIDATION_STATS.lock() {
        *stats = ValidationStats::default();
    }

    if let Ok(mut tracker) = MESSAGE_TRACKER.lock() {
        *tracker = Some(MessageTracker::default());
    }
    if let Ok(mut current) = DEBUG_CONFIG.lock() {
        *current = Some(config);
    }
}

/// Remove the callback configuration; later messages are ignored
pub fn clear_debug_config() {
    if let Ok(mut current) = DEBUG_CONFIG.lock() {
        *current = None;
    }
}

/// Get current validation statistics
pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS.lock().map(|stats| *stats).unwrap_or_default()
}

/// Print validation statistics report
pub fn print_validation_stats_report() {
    let stats = get_validation_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No validation messages".green().bold());
        return;
    }

    let title = "=== Validation Statistics Report ===";
    if stats.has_errors() {
        println!("\n{}", title.red().bold());
    } else {
        println!("\n{}", title.bright_blue().bold());
    }

    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    if stats.verbose > 0 {
        println!("  {} {}", "Verbose:".bright_black(), stats.verbose);
    }

    println!("  {} {}", "Total:".white().bold(), stats.total());

    if let Ok(tracker) = MESSAGE_TRACKER.lock() {
        let duplicates = tracker.as_ref().map_or(0, MessageTracker::duplicate_count);
        if duplicates > 0 {
            println!("\n  {} {} message(s) appeared multiple times", "ℹ".cyan(), duplicates);
        }
    }

    println!("{}\n", "====================================".bright_blue().bold());
}

pub(crate) fn validation_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> ValidationLevel {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        ValidationLevel::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        ValidationLevel::Warning
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        ValidationLevel::Info
    } else {
        ValidationLevel::Verbose
    }
}

pub(crate) fn validation_category(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> ValidationCategory {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        ValidationCategory::Validation
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        ValidationCategory::Performance
    } else {
        ValidationCategory::General
    }
}

/// Severities the messenger subscribes to
pub(crate) fn severity_flags(severity: DebugSeverity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    match severity {
        DebugSeverity::ErrorsOnly => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        DebugSeverity::ErrorsAndWarnings => {
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        }
        DebugSeverity::All => {
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
        }
    }
}

/// Filter, count and log one message
///
/// Returns whether the message was forwarded to the log.
pub(crate) fn handle_message(
    level: ValidationLevel,
    category: ValidationCategory,
    message_id: &str,
    message: &str,
) -> bool {
    let config = match DEBUG_CONFIG.lock() {
        Ok(guard) => match *guard {
            Some(config) => config,
            None => return false,
        },
        Err(_) => return false,
    };

    if !config.severity.allows(level) || !config.message_filter.allows(category) {
        return false;
    }

    let occurrence = if config.enable_stats {
        if let Ok(mut stats) = VALIDATION_STATS.lock() {
            stats.record(level);
        }
        match MESSAGE_TRACKER.lock() {
            Ok(mut guard) => guard.get_or_insert_with(MessageTracker::default).track_message(message),
            Err(_) => 1,
        }
    } else {
        1
    };

    let repeat = if occurrence > 1 {
        format!(" [×{}]", occurrence)
    } else {
        String::new()
    };

    let text = format!("[{}]{} {}: {}", category.label(), repeat, message_id, message);
    match level.log_severity() {
        LogSeverity::Error => engine_error!("lumen::validation", "{}", text),
        severity => Engine::log(severity, "lumen::validation", text),
    }
    true
}

/// Vulkan debug messenger callback
///
/// Called by the validation layers; never aborts the call that triggered it.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }
    let callback_data = *p_callback_data;
    let message_id_name = if callback_data.p_message_id_name.is_null() {
        "Unknown"
    } else {
        CStr::from_ptr(callback_data.p_message_id_name)
            .to_str()
            .unwrap_or("Invalid UTF-8")
    };
    let message = if callback_data.p_message.is_null() {
        "No message"
    } else {
        CStr::from_ptr(callback_data.p_message)
            .to_str()
            .unwrap_or("Invalid UTF-8")
    };

    handle_message(
        validation_level(message_severity),
        validation_category(message_type),
        message_id_name,
        message,
    );
    vk::FALSE
}

/// Debug messenger stage of the bring-up chain
pub(crate) struct VulkanDebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl VulkanDebugMessenger {
    pub(crate) fn new(
        entry: &ash::Entry,
        instance: &ash::Instance,
        config: &RendererConfig,
    ) -> Result<Self> {
        init_debug_config(Config::from_renderer_config(config));

        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(severity_flags(config.debug_severity))
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(vulkan_debug_callback));

        let messenger = unsafe { loader.create_debug_utils_messenger(&debug_info, None) }
            .map_err(|e| {
                engine_error!("lumen::vulkan", "Failed to create debug messenger: {:?}", e);
                Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
            })?;

        engine_debug!("lumen::vulkan", "Debug messenger installed ({:?})", config.debug_severity);
        Ok(Self { loader, messenger })
    }

    /// Destroy the messenger; must run before the instance is destroyed
    pub(crate) fn destroy(&mut self) {
        if self.messenger != vk::DebugUtilsMessengerEXT::null() {
            unsafe { self.loader.destroy_debug_utils_messenger(self.messenger, None) };
            self.messenger = vk::DebugUtilsMessengerEXT::null();
        }
        clear_debug_config();
    }
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
