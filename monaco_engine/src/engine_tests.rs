//! Unit tests for engine.rs
//!
//! Tests logger replacement and the plain / detailed logging paths.

use crate::engine::Engine;
use crate::log::{Logger, LogEntry, LogSeverity};
use serial_test::serial;
use std::sync::{Arc, Mutex};

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGER REPLACEMENT
// ============================================================================

#[test]
#[serial]
fn test_set_logger_receives_entries() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });

    Engine::log(LogSeverity::Info, "monaco::Test", "hello".to_string());

    let logged = entries.lock().unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].source, "monaco::Test");
    assert_eq!(logged[0].message, "hello");
    assert!(logged[0].file.is_none());
    drop(logged);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });

    Engine::log_detailed(LogSeverity::Error, "monaco::Test", "boom".to_string(), "device.rs", 12);

    let logged = entries.lock().unwrap();
    assert_eq!(logged[0].severity, LogSeverity::Error);
    assert_eq!(logged[0].file, Some("device.rs"));
    assert_eq!(logged[0].line, Some(12));
    drop(logged);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    Engine::reset_logger();

    Engine::log(LogSeverity::Debug, "monaco::Test", "not captured".to_string());

    assert!(entries.lock().unwrap().is_empty());
}

#[test]
#[serial]
fn test_macros_route_through_engine() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });

    crate::engine_trace!("monaco::Test", "t {}", 1);
    crate::engine_debug!("monaco::Test", "d {}", 2);
    crate::engine_info!("monaco::Test", "i {}", 3);
    crate::engine_warn!("monaco::Test", "w {}", 4);
    crate::engine_error!("monaco::Test", "e {}", 5);

    let logged = entries.lock().unwrap();
    let severities: Vec<LogSeverity> = logged.iter().map(|e| e.severity).collect();
    assert_eq!(severities, vec![
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ]);
    assert_eq!(logged[4].message, "e 5");
    assert!(logged[4].line.is_some());
    drop(logged);
    Engine::reset_logger();
}

// ============================================================================
// SEVERITY FILTER
// ============================================================================

#[test]
#[serial]
fn test_min_severity_drops_lower_entries() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    Engine::set_min_severity(LogSeverity::Warn);

    Engine::log(LogSeverity::Info, "monaco::Test", "dropped".to_string());
    Engine::log(LogSeverity::Warn, "monaco::Test", "kept".to_string());
    Engine::log_detailed(LogSeverity::Error, "monaco::Test", "kept too".to_string(), "x.rs", 1);

    let messages: Vec<String> = entries.lock().unwrap().iter().map(|e| e.message.clone()).collect();
    assert_eq!(messages, vec!["kept".to_string(), "kept too".to_string()]);
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_restores_all_severities() {
    Engine::set_min_severity(LogSeverity::Error);
    Engine::reset_logger();

    assert_eq!(Engine::min_severity(), LogSeverity::Trace);
}
