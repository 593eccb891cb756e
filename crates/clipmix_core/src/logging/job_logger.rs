//! Per-run logger with file and console output.
//!
//! Each run gets its own logger that:
//! - Writes to a dedicated log file (timestamped lines)
//! - Sends user-facing lines to a console callback (if provided)
//! - Supports compact mode with progress filtering
//! - Maintains a tail buffer of tool output for error diagnosis

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{ConsoleCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-run logger with dual output (file + console).
pub struct JobLogger {
    /// Run name for identification.
    job_name: String,
    /// Path to log file.
    log_path: PathBuf,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Console callback for user-facing lines.
    console: Mutex<Option<ConsoleCallback>>,
    /// Logging configuration.
    config: LogConfig,
    /// Tail buffer for recent tool output lines.
    tail_buffer: Mutex<VecDeque<String>>,
    /// Last progress value logged (for compact mode filtering).
    last_progress: Mutex<Option<u32>>,
}

impl JobLogger {
    /// Create a new run logger.
    ///
    /// # Arguments
    /// * `job_name` - Name of the run (used in log filename)
    /// * `log_dir` - Directory to write log file to
    /// * `config` - Logging configuration
    /// * `console` - Optional callback for terminal output
    pub fn new(
        job_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        console: Option<ConsoleCallback>,
    ) -> std::io::Result<Self> {
        let job_name = job_name.into();
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&job_name)));
        let file = File::create(&log_path)?;

        Ok(Self {
            job_name,
            log_path,
            file_writer: Mutex::new(Some(BufWriter::new(file))),
            console: Mutex::new(console),
            tail_buffer: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            config,
            last_progress: Mutex::new(None),
        })
    }

    /// Get the run name.
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Get the log file path.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }
        self.output(message, true);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Info.format(message));
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, &MessagePrefix::Debug.format(message));
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// Log an external command being launched.
    pub fn run(&self, command: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Run.format(command));
    }

    /// Log reuse of previously produced work.
    pub fn skip(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Skip.format(message));
    }

    /// Log a finished artifact.
    pub fn done(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Done.format(message));
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(phase_name));
    }

    /// Log progress update (file only, filtered in compact mode).
    ///
    /// Returns true if the progress was logged, false if filtered.
    pub fn progress(&self, percent: u32) -> bool {
        let percent = percent.min(100);
        {
            let mut last = self.last_progress.lock();
            if self.config.compact {
                let step = self.config.progress_step.max(1);
                let current_step = percent / step;
                if let Some(previous) = *last {
                    if current_step <= previous / step && percent < 100 {
                        return false;
                    }
                    if previous == 100 && percent == 100 {
                        return false;
                    }
                }
            }
            *last = Some(percent);
        }

        self.output(&format!("Progress: {}%", percent), false);
        true
    }

    /// Reset progress filtering before a new tool run.
    pub fn reset_progress(&self) {
        *self.last_progress.lock() = None;
    }

    /// Record one line of tool output.
    ///
    /// Always kept in the tail buffer; written to the log file only
    /// outside compact mode.
    pub fn output_line(&self, line: &str) {
        {
            let mut buffer = self.tail_buffer.lock();
            if self.config.error_tail == 0 {
                buffer.clear();
            } else {
                while buffer.len() >= self.config.error_tail {
                    buffer.pop_front();
                }
                buffer.push_back(line.to_string());
            }
        }

        if self.config.compact {
            return;
        }

        self.output(&format!("[stderr] {}", line), false);
    }

    /// Write the tail buffer to the log (typically after an error).
    pub fn show_tail(&self, header: &str) {
        let lines = self.get_tail();
        if lines.is_empty() {
            return;
        }

        self.output(&format!("[{}/tail]", header), false);
        for line in &lines {
            self.output(line, false);
        }
    }

    /// Clear the tail buffer.
    pub fn clear_tail(&self) {
        self.tail_buffer.lock().clear();
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Log a command one option per line.
    pub fn log_command_pretty(&self, program: &str, tokens: &[String]) {
        self.output("--- command (pretty) ---", false);
        let mut formatted = program.to_string();
        for token in tokens {
            if token.starts_with('-') {
                formatted.push_str(" \\\n  ");
            } else {
                formatted.push(' ');
            }
            formatted.push_str(token);
        }
        self.output(&formatted, false);
        self.output("------------------------", false);
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release resources.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Output a message to file and, for user-facing lines, the console.
    fn output(&self, message: &str, to_console: bool) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };

        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }

        if to_console {
            if let Some(ref callback) = *self.console.lock() {
                callback(message);
            }
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Builder for creating JobLogger with fluent API.
pub struct JobLoggerBuilder {
    job_name: String,
    log_dir: PathBuf,
    config: LogConfig,
    console: Option<ConsoleCallback>,
}

impl JobLoggerBuilder {
    /// Create a new builder.
    pub fn new(job_name: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            job_name: job_name.into(),
            log_dir: log_dir.into(),
            config: LogConfig::default(),
            console: None,
        }
    }

    /// Set the logging configuration.
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the log level.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Enable or disable compact mode.
    pub fn compact(mut self, compact: bool) -> Self {
        self.config.compact = compact;
        self
    }

    /// Set the console callback.
    pub fn console(mut self, callback: ConsoleCallback) -> Self {
        self.console = Some(callback);
        self
    }

    /// Build the JobLogger.
    pub fn build(self) -> std::io::Result<JobLogger> {
        JobLogger::new(self.job_name, self.log_dir, self.config, self.console)
    }
}
