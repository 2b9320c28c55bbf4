//! Integration tests for the HAL logging system
//!
//! These tests verify the logger sink, the logging macros, and that debug
//! layer diagnostics reach the active logger.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use prism_hal::prism::Hal;
use prism_hal::prism::Error;
use prism_hal::prism::log::{Logger, LogEntry, LogSeverity};
use prism_hal::prism::debug::{RecordingDebugger, RenderingDebugger, WarningType, ErrorType};
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
// LOGGER SINK TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Hal::set_logger(test_logger);

    Hal::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Hal::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].source, "test::module");
        assert_eq!(captured[0].message, "Test info message");
        assert_eq!(captured[1].severity, LogSeverity::Warn);
        assert_eq!(captured[1].file, None);
    }

    Hal::reset_logger();
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Hal::set_logger(test_logger);

    Hal::log_detailed(
        LogSeverity::Error,
        "test::error",
        "Critical error occurred".to_string(),
        "test_file.rs",
        42,
    );

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].file, Some("test_file.rs"));
        assert_eq!(captured[0].line, Some(42));
    }

    Hal::reset_logger();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    Hal::set_logger(test_logger);

    Hal::log(LogSeverity::Info, "test", "Message 1".to_string());
    Hal::reset_logger();
    Hal::log(LogSeverity::Info, "test", "Message 2".to_string());

    // Still only the first message
    assert_eq!(entries.lock().unwrap().len(), 1);
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_macros_route_to_logger() {
    let (test_logger, entries) = TestLogger::new();
    Hal::set_logger(test_logger);

    prism_hal::hal_trace!("prism::test", "trace {}", 1);
    prism_hal::hal_debug!("prism::test", "debug {}", 2);
    prism_hal::hal_info!("prism::test", "info {}", 3);
    prism_hal::hal_warn!("prism::test", "warn {}", 4);
    prism_hal::hal_error!("prism::test", "error {}", 5);

    {
        let captured = entries.lock().unwrap();
        let severities: Vec<LogSeverity> = captured.iter().map(|e| e.severity).collect();
        assert_eq!(
            severities,
            vec![
                LogSeverity::Trace,
                LogSeverity::Debug,
                LogSeverity::Info,
                LogSeverity::Warn,
                LogSeverity::Error,
            ]
        );
        assert_eq!(captured[2].message, "info 3");
        assert!(captured[3].line.is_none());
        assert!(captured[4].file.is_some());
        assert!(captured[4].line.is_some());
    }

    Hal::reset_logger();
}

#[test]
#[serial]
fn test_integration_hal_err_logs_and_builds_error() {
    let (test_logger, entries) = TestLogger::new();
    Hal::set_logger(test_logger);

    fn failing(code: i32) -> prism_hal::prism::Result<()> {
        prism_hal::hal_bail!("prism::test", "native call failed with {}", code);
    }

    let err = prism_hal::hal_err!("prism::test", "map failed");
    assert_eq!(err, Error::BackendError("map failed".to_string()));
    assert_eq!(failing(-4), Err(Error::BackendError("native call failed with -4".to_string())));

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert!(captured.iter().all(|e| e.severity == LogSeverity::Error && e.line.is_some()));
    }

    Hal::reset_logger();
}

// ============================================================================
// DEBUG LAYER ROUTING
// ============================================================================

#[test]
#[serial]
fn test_integration_recording_debugger_logs_first_occurrence() {
    let (test_logger, entries) = TestLogger::new();
    Hal::set_logger(test_logger);

    let debugger = RecordingDebugger::new();
    for _ in 0..3 {
        debugger.post_warning(WarningType::ImproperArgument, "improper number of vertices for triangle list", "draw");
    }
    debugger.post_error(ErrorType::UnsupportedFeature, "instancing is not supported", "draw_instanced");

    {
        let captured = entries.lock().unwrap();
        let warns = captured.iter().filter(|e| e.severity == LogSeverity::Warn).count();
        let errors = captured.iter().filter(|e| e.severity == LogSeverity::Error).count();
        let traces = captured.iter().filter(|e| e.severity == LogSeverity::Trace).count();
        assert_eq!(warns, 1);
        assert_eq!(errors, 1);
        assert_eq!(traces, 2);
        assert!(captured.iter().all(|e| e.source == "prism::debug"));
    }
    assert_eq!(debugger.warning_count(WarningType::ImproperArgument), 3);

    Hal::reset_logger();
}
