/// HdBridge Engine - process-wide logging slot
///
/// The engine owns exactly one piece of global state: the logger every
/// `engine_*!` macro writes to. Hosts install their own logger once at
/// startup; tests swap in capture loggers and reset afterwards.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<LoggerSlot>> = OnceLock::new();

struct LoggerSlot {
    logger: Box<dyn Logger>,
    /// Entries below this severity are dropped before reaching the logger
    min_severity: LogSeverity,
}

impl LoggerSlot {
    fn new() -> Self {
        Self {
            logger: Box::new(DefaultLogger),
            min_severity: LogSeverity::Trace,
        }
    }
}

fn slot() -> &'static RwLock<LoggerSlot> {
    LOGGER.get_or_init(|| RwLock::new(LoggerSlot::new()))
}

// ===== PUBLIC API =====

/// Engine facade for the global logger
///
/// # Example
///
/// ```no_run
/// use hd_bridge::hdbridge::Engine;
/// use hd_bridge::hdbridge::log::{DefaultLogger, LogSeverity};
///
/// Engine::set_logger(DefaultLogger);
/// Engine::set_min_severity(LogSeverity::Info);
/// ```
pub struct Engine;

impl Engine {
    /// Replace the active logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use hd_bridge::hdbridge::Engine;
    /// use hd_bridge::hdbridge::log::{Logger, LogEntry};
    ///
    /// struct HostLogger;
    /// impl Logger for HostLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         eprintln!("{}", entry.message);
    ///     }
    /// }
    ///
    /// Engine::set_logger(HostLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = slot().write() {
            lock.logger = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger) and let every severity through
    pub fn reset_logger() {
        if let Ok(mut lock) = slot().write() {
            *lock = LoggerSlot::new();
        }
    }

    /// Drop entries below `severity`
    pub fn set_min_severity(severity: LogSeverity) {
        if let Ok(mut lock) = slot().write() {
            lock.min_severity = severity;
        }
    }

    /// Current severity threshold
    pub fn min_severity() -> LogSeverity {
        slot()
            .read()
            .map(|lock| lock.min_severity)
            .unwrap_or(LogSeverity::Trace)
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(severity, source, message, None, None);
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error!, engine_err! and engine_coding_error!.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(severity, source, message, Some(file), Some(line));
    }

    fn dispatch(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        if let Ok(lock) = slot().read() {
            if severity < lock.min_severity {
                return;
            }
            lock.logger.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file,
                line,
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
