//! Logging for the video texture bridge
//!
//! Log calls go through the process-wide logger held by [`Bridge`](crate::vtex::Bridge).
//! The default logger prints colored lines; hosts usually replace it with one
//! that forwards into their own message handler.
//!
//! Render-thread code logs allocation failures at ERROR (with file:line),
//! skipped frames at WARN and per-sync decisions at TRACE.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// # Example
///
/// ```no_run
/// use video_texture::vtex::log::{Logger, LogEntry};
///
/// struct HostLogger;
///
/// impl Logger for HostLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Forward to the host's message handler...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "vtex::node", "vtex::vulkan")
    pub source: String,

    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    /// Fixed-width label used in console output
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Format an entry without colors: `[timestamp] [SEVERITY] [source] message (file:line)`
///
/// The `(file:line)` suffix is only present for detailed entries.
pub fn format_plain(entry: &LogEntry) -> String {
    let datetime: DateTime<Local> = entry.timestamp.into();
    let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");
    let mut line = format!(
        "[{}] [{}] [{}] {}",
        timestamp,
        entry.severity.label(),
        entry.source,
        entry.message
    );
    if let (Some(file), Some(number)) = (entry.file, entry.line) {
        line.push_str(&format!(" ({}:{})", file, number));
    }
    line
}

/// Default logger: colored console output
///
/// Trace/Debug/Info go to stdout, Warn/Error to stderr.
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity = match entry.severity {
            LogSeverity::Trace => entry.severity.label().bright_black(),
            LogSeverity::Debug => entry.severity.label().cyan(),
            LogSeverity::Info => entry.severity.label().green(),
            LogSeverity::Warn => entry.severity.label().yellow(),
            LogSeverity::Error => entry.severity.label().red().bold(),
        };

        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };

        let text = format!(
            "[{}] [{}] [{}] {}{}",
            timestamp,
            severity,
            entry.source.bright_blue(),
            entry.message,
            location.bright_black()
        );

        if entry.severity >= LogSeverity::Warn {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message (very verbose, typically disabled)
///
/// # Example
///
/// ```no_run
/// video_texture::vtex_trace!("vtex::node", "sync: size unchanged");
/// ```
#[macro_export]
macro_rules! vtex_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::vtex::Bridge::log(
            $crate::vtex::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message (development information)
#[macro_export]
macro_rules! vtex_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::vtex::Bridge::log(
            $crate::vtex::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message (important events)
#[macro_export]
macro_rules! vtex_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::vtex::Bridge::log(
            $crate::vtex::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message (potential issues)
#[macro_export]
macro_rules! vtex_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::vtex::Bridge::log(
            $crate::vtex::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```no_run
/// let err = "VK_ERROR_OUT_OF_DEVICE_MEMORY";
/// video_texture::vtex_error!("vtex::vulkan", "Failed to allocate image memory: {}", err);
/// ```
#[macro_export]
macro_rules! vtex_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::vtex::Bridge::log_detailed(
            $crate::vtex::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

// ===== ERROR MACROS =====

/// Log an ERROR message and evaluate to an `Error::BackendError` carrying it
///
/// Meant for `map_err` / `ok_or_else` closures.
#[macro_export]
macro_rules! vtex_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::vtex::Bridge::log_detailed(
            $crate::vtex::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::vtex::Error::BackendError(message)
    }};
}

/// Log an ERROR message and return `Err(Error::BackendError)` from the current function
#[macro_export]
macro_rules! vtex_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::vtex_err!($source, $($arg)*))
    };
}

/// Log a WARN message and evaluate to an `Error::BackendError` carrying it
#[macro_export]
macro_rules! vtex_warn_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::vtex::Bridge::log(
            $crate::vtex::log::LogSeverity::Warn,
            $source,
            message.clone()
        );
        $crate::vtex::Error::BackendError(message)
    }};
}

/// Log a WARN message and return `Err(Error::BackendError)` from the current function
#[macro_export]
macro_rules! vtex_bail_warn {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::vtex_warn_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
