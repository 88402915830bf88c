//! Validation messages from the host's debug_utils messenger
//!
//! Messages are forwarded to the vtex logger under "vtex::vulkan::validation",
//! tagged with how often the same text was seen, and counted for
//! `log_validation_summary`.

use ash::vk;
use std::collections::HashMap;
use std::ffi::CStr;
use std::fmt;
use std::sync::{Mutex, OnceLock};
use video_texture::vtex::log::LogSeverity;
use video_texture::vtex::Bridge;
use video_texture::{vtex_debug, vtex_warn};

const SOURCE: &str = "vtex::vulkan::validation";

/// Messages forwarded since the last reset, by the severity they were logged at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
    /// Distinct messages forwarded more than once
    pub repeated: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

impl fmt::Display for ValidationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation message(s): {} error(s), {} warning(s), {} info, {} verbose, {} repeated",
            self.total(),
            self.errors,
            self.warnings,
            self.info,
            self.verbose,
            self.repeated
        )
    }
}

/// Counters and per-message occurrences, guarded together so a forwarded
/// message and its count never disagree
#[derive(Default)]
struct ForwardLog {
    stats: ValidationStats,
    occurrences: HashMap<String, u32>,
}

impl ForwardLog {
    fn record(&mut self, severity: LogSeverity, message: &str) -> u32 {
        match severity {
            LogSeverity::Error => self.stats.errors += 1,
            LogSeverity::Warn => self.stats.warnings += 1,
            LogSeverity::Info | LogSeverity::Debug => self.stats.info += 1,
            LogSeverity::Trace => self.stats.verbose += 1,
        }
        let count = self.occurrences.entry(message.to_string()).or_insert(0);
        *count += 1;
        if *count == 2 {
            self.stats.repeated += 1;
        }
        *count
    }
}

fn forward_log() -> &'static Mutex<ForwardLog> {
    static FORWARD_LOG: OnceLock<Mutex<ForwardLog>> = OnceLock::new();
    FORWARD_LOG.get_or_init(|| Mutex::new(ForwardLog::default()))
}

/// Get current validation statistics
pub fn get_validation_stats() -> ValidationStats {
    forward_log().lock().map(|log| log.stats).unwrap_or_default()
}

/// Clear counters and grouped messages
pub fn reset_validation_stats() {
    if let Ok(mut log) = forward_log().lock() {
        *log = ForwardLog::default();
    }
}

/// Log the current statistics, at WARN if any error was reported
pub fn log_validation_summary() {
    let stats = get_validation_stats();
    let severity = if stats.errors > 0 { LogSeverity::Warn } else { LogSeverity::Info };
    Bridge::log(severity, SOURCE, stats.to_string());
}

/// Messenger severities worth creating the messenger with, given the
/// logger's minimum severity
pub fn severity_flags(min_severity: LogSeverity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    let mut flags = vk::DebugUtilsMessageSeverityFlagsEXT::ERROR;
    if min_severity <= LogSeverity::Warn {
        flags |= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING;
    }
    if min_severity <= LogSeverity::Debug {
        flags |= vk::DebugUtilsMessageSeverityFlagsEXT::INFO;
    }
    if min_severity <= LogSeverity::Trace {
        flags |= vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE;
    }
    flags
}

fn log_severity(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> LogSeverity {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Debug
    } else {
        LogSeverity::Trace
    }
}

fn type_label(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

/// Count, group and forward one message to the logger
pub fn record_message(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    message_id_name: &str,
    message: &str,
) {
    let severity = log_severity(severity);
    let occurrence = forward_log()
        .lock()
        .map(|mut log| log.record(severity, message))
        .unwrap_or(1);

    let repeat = if occurrence > 1 {
        format!(" [x{}]", occurrence)
    } else {
        String::new()
    };

    Bridge::log(
        severity,
        SOURCE,
        format!("[{}]{} {}: {}", type_label(message_type), repeat, message_id_name, message),
    );
}

/// Debug messenger callback handed to VK_EXT_debug_utils
///
/// # Safety
///
/// Called by the Vulkan loader with a valid (or null) callback data pointer.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
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

    record_message(message_severity, message_type, message_id_name, message);

    vk::FALSE
}

/// Debug messenger attached to the host's instance
pub(crate) struct ValidationMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl ValidationMessenger {
    /// Create a messenger on `instance`, or `None` if VK_EXT_debug_utils
    /// is not enabled there
    ///
    /// # Safety
    ///
    /// `instance` must be a live instance loaded through `entry`.
    pub(crate) unsafe fn attach(entry: &ash::Entry, instance: &ash::Instance) -> Option<Self> {
        let create_fn = (entry.static_fn().get_instance_proc_addr)(
            instance.handle(),
            c"vkCreateDebugUtilsMessengerEXT".as_ptr(),
        );
        if create_fn.is_none() {
            vtex_warn!(SOURCE, "VK_EXT_debug_utils is not enabled on the host instance");
            return None;
        }

        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(severity_flags(Bridge::min_severity()))
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(vulkan_debug_callback));

        match loader.create_debug_utils_messenger(&info, None) {
            Ok(messenger) => {
                reset_validation_stats();
                vtex_debug!(SOURCE, "Validation messenger attached");
                Some(Self { loader, messenger })
            }
            Err(e) => {
                vtex_warn!(SOURCE, "Failed to create debug messenger: {:?}", e);
                None
            }
        }
    }

    pub(crate) fn detach(self) {
        unsafe {
            self.loader.destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
