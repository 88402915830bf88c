/// Bridge - process-wide state shared by every video texture node
///
/// Nodes live on the render thread and items on the logic thread, but both
/// log through the same logger. The logger is stored in thread-safe static
/// storage guarded by an RwLock, so replacing it from the logic thread while
/// the render thread is logging is safe.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Minimum severity forwarded to the logger (stored as the enum index)
static MIN_SEVERITY: AtomicU8 = AtomicU8::new(0);

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

fn severity_index(severity: LogSeverity) -> u8 {
    match severity {
        LogSeverity::Trace => 0,
        LogSeverity::Debug => 1,
        LogSeverity::Info => 2,
        LogSeverity::Warn => 3,
        LogSeverity::Error => 4,
    }
}

fn severity_from_index(index: u8) -> LogSeverity {
    match index {
        0 => LogSeverity::Trace,
        1 => LogSeverity::Debug,
        2 => LogSeverity::Info,
        3 => LogSeverity::Warn,
        _ => LogSeverity::Error,
    }
}

// ===== PUBLIC API =====

/// Process-wide logging entry point
///
/// # Example
///
/// ```no_run
/// use video_texture::vtex::{Bridge, log::{Logger, LogEntry, LogSeverity}};
///
/// struct HostLogger;
/// impl Logger for HostLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Forward to the host's message handler...
///     }
/// }
///
/// Bridge::set_logger(HostLogger);
/// Bridge::set_min_severity(LogSeverity::Info);
/// ```
pub struct Bridge;

impl Bridge {
    /// Replace the current logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = self::logger().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger) and let every severity through
    pub fn reset_logger() {
        if let Ok(mut lock) = self::logger().write() {
            *lock = Box::new(DefaultLogger);
        }
        MIN_SEVERITY.store(0, Ordering::Relaxed);
    }

    /// Drop entries below `severity` before they reach the logger
    pub fn set_min_severity(severity: LogSeverity) {
        MIN_SEVERITY.store(severity_index(severity), Ordering::Relaxed);
    }

    /// Current minimum severity
    pub fn min_severity() -> LogSeverity {
        severity_from_index(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Log without file:line information
    ///
    /// Used by macros like vtex_info!, vtex_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Log with file:line information (ERROR logs)
    ///
    /// Used by vtex_error!, vtex_err! and vtex_bail!.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    fn dispatch(entry: LogEntry) {
        if entry.severity < Self::min_severity() {
            return;
        }
        if let Ok(lock) = self::logger().read() {
            lock.log(&entry);
        }
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
