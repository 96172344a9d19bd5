//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, DefaultLogger and the error-building macros.

use crate::error::{Error, Result};
use crate::engine::Engine;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "monaco::Test".to_string(),
        message: "something happened".to_string(),
        file,
        line,
    }
}

/// Captures entries so macro output can be asserted
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture_logger() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY / DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Info, None, None));
    assert!(text.contains("[INFO ]"));
    assert!(text.contains("[monaco::Test] something happened"));
    assert!(!text.contains("("));
}

#[test]
fn test_format_plain_with_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Error, Some("buffer.rs"), Some(42)));
    assert!(text.contains("[ERROR]"));
    assert!(text.ends_with("(buffer.rs:42)"));
}

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("test.rs"), Some(7)));
    }
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_engine_err_defaults_to_backend_error() {
    let entries = install_capture_logger();

    let err = crate::engine_err!("monaco::Test", "vkQueueSubmit returned {}", -4);

    assert_eq!(err, Error::BackendError("vkQueueSubmit returned -4".to_string()));
    let logged = entries.lock().unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].severity, LogSeverity::Error);
    assert!(logged[0].file.is_some());
    assert!(logged[0].line.is_some());
    drop(logged);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_err_with_kind() {
    let entries = install_capture_logger();

    let err = crate::engine_err!("monaco::Test", InvalidArgument: "width is {}", 0);

    assert_eq!(err, Error::InvalidArgument("width is 0".to_string()));
    assert_eq!(entries.lock().unwrap()[0].message, "width is 0");
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    let entries = install_capture_logger();

    fn check(value: u32) -> Result<u32> {
        if value == 0 {
            crate::engine_bail!("monaco::Test", InvalidArgument: "value must be non-zero");
        }
        Ok(value * 2)
    }

    assert_eq!(check(3), Ok(6));
    assert!(matches!(check(0), Err(Error::InvalidArgument(_))));
    assert_eq!(entries.lock().unwrap().len(), 1);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_warn_logs_warning() {
    let entries = install_capture_logger();

    fn check() -> Result<()> {
        crate::engine_bail_warn!("monaco::Test", InvalidResource: "not initialized");
    }

    assert_eq!(check(), Err(Error::InvalidResource("not initialized".to_string())));
    let logged = entries.lock().unwrap();
    assert_eq!(logged[0].severity, LogSeverity::Warn);
    assert!(logged[0].file.is_none());
    drop(logged);
    Engine::reset_logger();
}

// ============================================================================
// SEVERITY
// ============================================================================

#[test]
fn test_severity_labels_are_fixed_width() {
    for severity in [LogSeverity::Trace, LogSeverity::Debug, LogSeverity::Info, LogSeverity::Warn, LogSeverity::Error] {
        assert_eq!(severity.label().len(), 5);
        assert_eq!(LogSeverity::from_u8(severity as u8), severity);
    }
    assert_eq!(LogSeverity::from_u8(200), LogSeverity::Error);
}
