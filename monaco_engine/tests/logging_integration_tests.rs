//! Integration tests for the Engine logging hub
//!
//! These tests verify custom loggers and the error macros.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use monaco_engine::monaco::{Engine, Error};
use monaco_engine::monaco::log::{Logger, LogEntry, LogSeverity};
use monaco_engine::{engine_bail_warn, engine_err, engine_info};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Engine::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].source, "test::module");
    assert_eq!(captured[0].message, "Test info message");
    assert_eq!(captured[1].severity, LogSeverity::Warn);
    assert_eq!(captured[1].message, "Test warning message");
    drop(captured);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log_detailed(
        LogSeverity::Error,
        "test::error",
        "Critical error occurred".to_string(),
        "test_file.rs",
        42,
    );

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].file, Some("test_file.rs"));
    assert_eq!(captured[0].line, Some(42));
    drop(captured);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    // The second message went to the default logger
    assert_eq!(entries.lock().unwrap().len(), 1);
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_engine_err_logs_and_builds_error() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let default_kind = engine_err!("monaco::Test", "device lost ({})", 7);
    let explicit_kind = engine_err!("monaco::Test", AssetNotFound: "missing '{}'", "gun.obj");

    assert_eq!(default_kind, Error::BackendError("device lost (7)".to_string()));
    assert_eq!(explicit_kind, Error::AssetNotFound("missing 'gun.obj'".to_string()));

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert!(captured.iter().all(|entry| entry.severity == LogSeverity::Error));
    assert!(captured.iter().all(|entry| entry.file.is_some() && entry.line.is_some()));
    assert_eq!(captured[1].source, "monaco::Test");
    drop(captured);

    Engine::reset_logger();
}

fn reject_zero(width: u32) -> monaco_engine::monaco::Result<u32> {
    if width == 0 {
        engine_bail_warn!("monaco::Test", InvalidArgument: "width must be positive");
    }
    engine_info!("monaco::Test", "accepted width {}", width);
    Ok(width)
}

#[test]
#[serial]
fn test_integration_bail_warn_returns_early() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    assert_eq!(reject_zero(0), Err(Error::InvalidArgument("width must be positive".to_string())));
    assert_eq!(reject_zero(640), Ok(640));

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].severity, LogSeverity::Warn);
    assert_eq!(captured[1].severity, LogSeverity::Info);
    assert_eq!(captured[1].message, "accepted width 640");
    drop(captured);

    Engine::reset_logger();
}
