/// Vulkan debug messenger - routes validation layer messages into the engine logger
///
/// Only compiled with the `vulkan-validation` feature. Messages are counted
/// per severity and identical messages are reported with a repeat count.

use ash::vk;
use rustc_hash::FxHashMap;
use std::ffi::CStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use monaco_engine::{engine_debug, engine_error, engine_info, engine_warn};

const SOURCE: &str = "monaco::vulkan::Validation";

/// Counters of messages received since startup (or the last reset)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
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

struct StatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

static STATS: StatsTracker = StatsTracker {
    errors: AtomicU32::new(0),
    warnings: AtomicU32::new(0),
    info: AtomicU32::new(0),
    verbose: AtomicU32::new(0),
};

/// Occurrences per message id
static REPEATS: Mutex<Option<FxHashMap<String, u32>>> = Mutex::new(None);

/// Snapshot of the validation counters
pub fn validation_stats() -> ValidationStats {
    ValidationStats {
        errors: STATS.errors.load(Ordering::Relaxed),
        warnings: STATS.warnings.load(Ordering::Relaxed),
        info: STATS.info.load(Ordering::Relaxed),
        verbose: STATS.verbose.load(Ordering::Relaxed),
    }
}

pub fn reset_validation_stats() {
    STATS.errors.store(0, Ordering::Relaxed);
    STATS.warnings.store(0, Ordering::Relaxed);
    STATS.info.store(0, Ordering::Relaxed);
    STATS.verbose.store(0, Ordering::Relaxed);
    if let Ok(mut repeats) = REPEATS.lock() {
        *repeats = None;
    }
}

/// Log a one-line summary of the counters
pub fn log_validation_report() {
    let stats = validation_stats();
    if stats.errors > 0 {
        engine_warn!(SOURCE, "Validation report: {} errors, {} warnings, {} info, {} verbose",
            stats.errors, stats.warnings, stats.info, stats.verbose);
    } else {
        engine_info!(SOURCE, "Validation report: {} errors, {} warnings, {} info, {} verbose",
            stats.errors, stats.warnings, stats.info, stats.verbose);
    }
}

fn track(message_id: &str) -> u32 {
    let Ok(mut repeats) = REPEATS.lock() else {
        return 1;
    };
    let count = repeats.get_or_insert_with(FxHashMap::default)
        .entry(message_id.to_string())
        .or_insert(0);
    *count += 1;
    *count
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

unsafe fn c_str_or<'a>(ptr: *const std::os::raw::c_char, fallback: &'a str) -> std::borrow::Cow<'a, str> {
    if ptr.is_null() {
        std::borrow::Cow::Borrowed(fallback)
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

/// Messenger create info used both for the instance chain and the messenger itself
pub fn messenger_create_info<'a>() -> vk::DebugUtilsMessengerCreateInfoEXT<'a> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback))
}

/// Callback invoked by the validation layers
///
/// # Safety
///
/// Called by the Vulkan loader with a valid callback data pointer.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }
    let callback_data = &*p_callback_data;
    let message_id = c_str_or(callback_data.p_message_id_name, "Unknown");
    let message = c_str_or(callback_data.p_message, "No message");
    let kind = message_type_name(message_type);

    let occurrences = track(&message_id);
    let repeat = if occurrences > 1 {
        format!(" [x{}]", occurrences)
    } else {
        String::new()
    };

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        STATS.errors.fetch_add(1, Ordering::Relaxed);
        engine_error!(SOURCE, "[{}] {}{}: {}", kind, message_id, repeat, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        STATS.warnings.fetch_add(1, Ordering::Relaxed);
        engine_warn!(SOURCE, "[{}] {}{}: {}", kind, message_id, repeat, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        STATS.info.fetch_add(1, Ordering::Relaxed);
        engine_debug!(SOURCE, "[{}] {}{}: {}", kind, message_id, repeat, message);
    } else {
        STATS.verbose.fetch_add(1, Ordering::Relaxed);
    }

    vk::FALSE
}
