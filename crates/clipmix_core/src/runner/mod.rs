//! External tool execution.
//!
//! Every encode, concatenation and merge is a single ffmpeg process. The
//! [`ToolRunner`] trait is the seam between building an invocation and
//! actually launching it, so the pipeline can be exercised without ffmpeg.
//!
//! Contract of a runner:
//! - blocks until the process exits (no timeout, no retry)
//! - reports elapsed media time to an optional [`ProgressSink`]; progress
//!   parsing is best-effort and never fails a run
//! - nonzero exit is an error carrying a short diagnostic excerpt

mod process;
mod progress;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use process::{ProcessRunner, DIAGNOSTIC_LIMIT};
pub use progress::{parse_time_marker, ProgressSink};

/// Errors from running an external tool.
#[derive(Error, Debug)]
pub enum RunError {
    /// The process could not be started.
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// Reading output or waiting for the process failed.
    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool exited unsuccessfully.
    #[error("{tool} failed with exit code {exit_code}: {diagnostics}")]
    ToolFailed {
        tool: String,
        exit_code: i32,
        diagnostics: String,
    },
}

impl RunError {
    /// Create a tool failed error.
    pub fn tool_failed(
        tool: impl Into<String>,
        exit_code: i32,
        diagnostics: impl Into<String>,
    ) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            exit_code,
            diagnostics: diagnostics.into(),
        }
    }
}

/// Result type for runner operations.
pub type RunResult<T> = Result<T, RunError>;

/// One fully-built external command.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Executable name or path.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Short description for logs and the progress bar.
    pub label: String,
    /// Media duration the tool is expected to process (drives progress).
    pub expected_secs: Option<f64>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            label: label.into(),
            expected_secs: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the expected media duration. Non-positive values disable progress.
    pub fn with_expected_duration(mut self, secs: f64) -> Self {
        self.expected_secs = (secs.is_finite() && secs > 0.0).then_some(secs);
        self
    }

    /// Tool name for error messages (file name of the program).
    pub fn tool_name(&self) -> String {
        PathBuf::from(&self.program)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.clone())
    }

    /// Program and first three arguments, e.g. `ffmpeg -y -i in.mp4...`.
    pub fn display_short(&self) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.args.iter().take(3).map(String::as_str));
        format!("{}...", parts.join(" "))
    }

    /// Full command line (for debug logs).
    pub fn display_full(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(char::is_whitespace) || arg.is_empty() {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }

    /// The output file, which ffmpeg takes as its last argument.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.args.last().map(PathBuf::from)
    }
}

/// Launches external tools.
pub trait ToolRunner: Send + Sync {
    /// Run `invocation` to completion.
    fn run(&self, invocation: &Invocation, progress: Option<&dyn ProgressSink>) -> RunResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Invocation {
        Invocation::new("ffmpeg", "merge")
            .args(["-y", "-f", "concat", "-safe", "0", "-i", "list.txt"])
            .arg("out file.mp4")
    }

    #[test]
    fn short_display_keeps_first_four_tokens() {
        assert_eq!(sample().display_short(), "ffmpeg -y -f concat...");
    }

    #[test]
    fn full_display_quotes_spaces() {
        assert!(sample().display_full().ends_with("-i list.txt \"out file.mp4\""));
    }

    #[test]
    fn output_is_last_argument() {
        assert_eq!(sample().output_path(), Some(PathBuf::from("out file.mp4")));
    }

    #[test]
    fn expected_duration_must_be_positive() {
        assert_eq!(sample().with_expected_duration(0.0).expected_secs, None);
        assert_eq!(sample().with_expected_duration(-3.0).expected_secs, None);
        assert_eq!(sample().with_expected_duration(12.0).expected_secs, Some(12.0));
    }

    #[test]
    fn tool_name_strips_directories() {
        let inv = Invocation::new("/usr/local/bin/ffmpeg", "x");
        assert_eq!(inv.tool_name(), "ffmpeg");
    }

    #[test]
    fn tool_failed_displays_context() {
        let err = RunError::tool_failed("ffmpeg", 1, "Invalid data found");
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("Invalid data found"));
    }
}
