/// Rendering debugger trait and a recording implementation

use std::sync::Mutex;
use rustc_hash::FxHashMap;
use crate::{hal_error, hal_trace, hal_warn};

/// Category of an advisory warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningType {
    /// An argument is valid but probably not what was intended
    ImproperArgument,
    /// The pipeline state is valid but probably not what was intended
    ImproperState,
    /// The call has no effect
    PointlessOperation,
    /// The result may differ between backends or drivers
    VaryingBehavior,
}

/// Category of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    InvalidArgument,
    InvalidState,
    UnsupportedFeature,
    UndefinedBehavior,
}

/// Receiver of debug-layer diagnostics
///
/// The `check_*` hooks run before every draw call and do nothing unless an
/// implementation overrides them.
pub trait RenderingDebugger: Send + Sync {
    fn post_warning(&self, warning_type: WarningType, message: &str, source: &str);

    fn post_error(&self, error_type: ErrorType, message: &str, source: &str);

    fn check_graphics_pipeline(&self, _source: &str) {}

    fn check_vertex_buffer(&self, _source: &str) {}

    fn check_index_buffer(&self, _source: &str) {}
}

/// Kind of a recorded debug message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugMessageKind {
    Warning(WarningType),
    Error(ErrorType),
}

/// A diagnostic recorded by `RecordingDebugger`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugMessage {
    pub kind: DebugMessageKind,
    pub message: String,
    /// Name of the call that produced the message
    pub source: String,
    /// Number of times this exact message was posted
    pub occurrences: u32,
}

/// Distinct messages in first-posted order, indexed by (kind, text, source)
#[derive(Default)]
struct MessageLog {
    messages: Vec<DebugMessage>,
    index: FxHashMap<(DebugMessageKind, String, String), usize>,
}

/// Debugger that keeps every distinct message and logs it once
///
/// Repeats of an identical message (same kind, text and source) only bump
/// its occurrence count, so per-frame warnings do not flood the log.
#[derive(Default)]
pub struct RecordingDebugger {
    log: Mutex<MessageLog>,
}

impl RecordingDebugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all distinct messages, in first-posted order
    pub fn messages(&self) -> Vec<DebugMessage> {
        match self.log.lock() {
            Ok(log) => log.messages.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Total number of posted warnings of `warning_type`, repeats included
    pub fn warning_count(&self, warning_type: WarningType) -> u32 {
        self.count(DebugMessageKind::Warning(warning_type))
    }

    /// Total number of posted errors of `error_type`, repeats included
    pub fn error_count(&self, error_type: ErrorType) -> u32 {
        self.count(DebugMessageKind::Error(error_type))
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.messages.clear();
            log.index.clear();
        }
    }

    fn count(&self, kind: DebugMessageKind) -> u32 {
        match self.log.lock() {
            Ok(log) => log
                .messages
                .iter()
                .filter(|message| message.kind == kind)
                .map(|message| message.occurrences)
                .sum(),
            Err(_) => 0,
        }
    }

    /// Record a message; returns true if it was not seen before
    fn record(&self, kind: DebugMessageKind, message: &str, source: &str) -> bool {
        let Ok(mut log) = self.log.lock() else {
            return false;
        };
        let log = &mut *log;

        let key = (kind, message.to_string(), source.to_string());
        if let Some(&position) = log.index.get(&key) {
            log.messages[position].occurrences += 1;
            return false;
        }

        log.index.insert(key, log.messages.len());
        log.messages.push(DebugMessage {
            kind,
            message: message.to_string(),
            source: source.to_string(),
            occurrences: 1,
        });
        true
    }
}

impl RenderingDebugger for RecordingDebugger {
    fn post_warning(&self, warning_type: WarningType, message: &str, source: &str) {
        if self.record(DebugMessageKind::Warning(warning_type), message, source) {
            hal_warn!("prism::debug", "{:?}: {} (in '{}')", warning_type, message, source);
        } else {
            hal_trace!("prism::debug", "Repeated warning: {} (in '{}')", message, source);
        }
    }

    fn post_error(&self, error_type: ErrorType, message: &str, source: &str) {
        if self.record(DebugMessageKind::Error(error_type), message, source) {
            hal_error!("prism::debug", "{:?}: {} (in '{}')", error_type, message, source);
        } else {
            hal_trace!("prism::debug", "Repeated error: {} (in '{}')", message, source);
        }
    }
}
