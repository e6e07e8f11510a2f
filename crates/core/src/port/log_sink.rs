// Log Sink Port
// Destination for the director's own leveled log lines

use crate::config::LogLevel;

/// Leveled log destination
///
/// The director never inspects the outcome of a write.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards director log lines to `tracing` (target `director`)
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "director", "{}", message),
            LogLevel::Debug => tracing::debug!(target: "director", "{}", message),
            LogLevel::Info => tracing::info!(target: "director", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "director", "{}", message),
            LogLevel::Error => tracing::error!(target: "director", "{}", message),
        }
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Keeps every received line in memory
    #[derive(Default, Clone)]
    pub struct RecordingLogSink {
        lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
    }

    impl RecordingLogSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<(LogLevel, String)> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl LogSink for RecordingLogSink {
        fn log(&self, level: LogLevel, message: &str) {
            self.lines.lock().unwrap().push((level, message.to_string()));
        }
    }
}
