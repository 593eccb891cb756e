//! Logging types and configuration.

use serde::{Deserialize, Serialize};

use crate::config::LoggingSettings;

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace-level debugging (very verbose).
    Trace,
    /// Debug information.
    Debug,
    /// General information.
    #[default]
    Info,
    /// Warnings.
    Warn,
    /// Errors.
    Error,
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to output.
    pub level: LogLevel,
    /// Use compact mode (hide tool output, filter progress).
    pub compact: bool,
    /// Progress update step percentage (only log progress at these intervals).
    pub progress_step: u32,
    /// Number of tool output lines kept for errors (tail).
    pub error_tail: usize,
    /// Show timestamps in the log file.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            progress_step: 20,
            error_tail: 20,
            show_timestamps: true,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` config section.
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            compact: settings.compact,
            progress_step: settings.progress_step.max(1),
            error_tail: settings.error_tail as usize,
            ..Self::default()
        }
    }
}

/// Type alias for the console callback.
///
/// The callback receives each user-facing message without timestamp.
pub type ConsoleCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Message prefix types for consistent formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// External command launch: `[RUN]`
    Run,
    /// Informational: `[INFO]`
    Info,
    /// Cached work reused: `[SKIP]`
    Skip,
    /// Phase marker: `=== Phase ===`
    Phase,
    /// Warning: `[WARNING]`
    Warning,
    /// Error: `[ERROR]`
    Error,
    /// Finished artifact: `[DONE]`
    Done,
    /// Debug: `[DEBUG]`
    Debug,
    /// No prefix
    None,
}

impl MessagePrefix {
    /// Format a message with this prefix.
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Run => format!("[RUN] {}", message),
            MessagePrefix::Info => format!("[INFO] {}", message),
            MessagePrefix::Skip => format!("[SKIP] {}", message),
            MessagePrefix::Phase => format!("=== {} ===", message),
            MessagePrefix::Warning => format!("[WARNING] {}", message),
            MessagePrefix::Error => format!("[ERROR] {}", message),
            MessagePrefix::Done => format!("[DONE] {}", message),
            MessagePrefix::Debug => format!("[DEBUG] {}", message),
            MessagePrefix::None => message.to_string(),
        }
    }
}
