/// Vulkan Debug Messenger - Routes validation layer messages into the engine logger
///
/// Counters and repeat tracking live in a `ValidationTracker` owned by the
/// device and handed to the callback as user data, so two devices never
/// share validation state.

use ash::vk;
use hd_bridge::hdbridge::Engine;
use hd_bridge::hdbridge::log::LogSeverity;
use rustc_hash::FxHashMap;
use std::ffi::{c_void, CStr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Logger source for every validation message
pub const VALIDATION_SOURCE: &str = "hdbridge::vulkan::validation";

/// Snapshot of the validation message counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

/// Per-device validation counters
pub struct ValidationTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
    /// Occurrences per message text, for repeat indicators
    occurrences: Mutex<FxHashMap<String, u32>>,
}

impl ValidationTracker {
    pub fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
            occurrences: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }

    /// Count a message and return how many times this exact text was seen
    fn track(&self, severity: LogSeverity, message: &str) -> u32 {
        let counter = match severity {
            LogSeverity::Error => &self.errors,
            LogSeverity::Warn => &self.warnings,
            LogSeverity::Info => &self.info,
            LogSeverity::Debug | LogSeverity::Trace => &self.verbose,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        match self.occurrences.lock() {
            Ok(mut occurrences) => {
                let count = occurrences.entry(message.to_string()).or_insert(0);
                *count += 1;
                *count
            }
            Err(_) => 1,
        }
    }

    /// Log one validation message at its mapped severity
    pub fn route(
        &self,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        message_type: vk::DebugUtilsMessageTypeFlagsEXT,
        message_id_name: &str,
        message: &str,
    ) {
        let log_severity = map_severity(severity);
        let occurrence = self.track(log_severity, message);

        let repeat_indicator = if occurrence > 1 {
            format!(" [x{}]", occurrence)
        } else {
            String::new()
        };

        Engine::log(
            log_severity,
            VALIDATION_SOURCE,
            format!(
                "[{}]{} {}: {}",
                message_type_name(message_type),
                repeat_indicator,
                message_id_name,
                message
            ),
        );
    }
}

impl Default for ValidationTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Vulkan severity to engine log severity
pub fn map_severity(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> LogSeverity {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Info
    } else {
        LogSeverity::Trace
    }
}

fn message_type_name(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

unsafe fn c_str_or<'a>(ptr: *const std::os::raw::c_char, fallback: &'a str) -> &'a str {
    if ptr.is_null() {
        fallback
    } else {
        CStr::from_ptr(ptr).to_str().unwrap_or("Invalid UTF-8")
    }
}

/// Vulkan debug messenger callback
///
/// `user_data` must point to the `ValidationTracker` of the device that
/// registered the messenger.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    user_data: *mut c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || user_data.is_null() {
        return vk::FALSE;
    }

    let callback_data = &*p_callback_data;
    let message_id_name = c_str_or(callback_data.p_message_id_name, "Unknown");
    let message = c_str_or(callback_data.p_message, "No message");

    let tracker = &*(user_data as *const ValidationTracker);
    tracker.route(message_severity, message_type, message_id_name, message);

    vk::FALSE // Don't abort Vulkan execution
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
