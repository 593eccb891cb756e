//! Logging infrastructure for clipmix.
//!
//! This module provides:
//! - Per-run loggers with file + console dual output
//! - Severity-prefixed user lines (`[INFO]`, `[SKIP]`, `[WARNING]`, ...)
//! - Compact mode with progress filtering
//! - Tail buffer of tool output for error diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use clipmix_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("clipmix", "/path/to/logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Discover");
//! logger.info("Found 3 videos");
//! logger.run("ffmpeg -y -f concat...");
//! logger.done("Saved: final_video_fast.mp4");
//! ```

mod job_logger;
mod types;

use std::path::Path;

pub use job_logger::{JobLogger, JobLoggerBuilder};
pub use types::{ConsoleCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Initialize tracing with a daily rolling file in `logs_dir`.
///
/// Diagnostics go to the file only; the terminal belongs to the run logger
/// and the progress bar. Keep the returned guard alive for the lifetime of
/// the program, dropping it flushes the file writer.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let appender = tracing_appender::rolling::daily(logs_dir, "clipmix-trace.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
