//! Subprocess-backed runner.

use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::sync::Arc;

use super::progress::{parse_time_marker, ProgressSink};
use super::{Invocation, RunError, RunResult, ToolRunner};
use crate::logging::JobLogger;

/// Maximum characters of tool output carried in a failure message.
pub const DIAGNOSTIC_LIMIT: usize = 500;

/// Runs tools as child processes, one at a time.
///
/// stderr is read with blocking reads on the calling thread until the tool
/// closes it, then the exit status is collected. ffmpeg redraws its stats
/// line with `\r`, so both `\r` and `\n` end a record.
pub struct ProcessRunner {
    logger: Arc<JobLogger>,
    show_command_pretty: bool,
}

impl ProcessRunner {
    pub fn new(logger: Arc<JobLogger>) -> Self {
        Self {
            logger,
            show_command_pretty: false,
        }
    }

    /// Also log each command one option per line.
    pub fn with_pretty_commands(mut self, enabled: bool) -> Self {
        self.show_command_pretty = enabled;
        self
    }

    fn handle_record(
        &self,
        record: &str,
        total_secs: Option<f64>,
        progress: Option<&dyn ProgressSink>,
    ) {
        let record = record.trim();
        if record.is_empty() {
            return;
        }

        self.logger.output_line(record);

        let (Some(total), Some(elapsed)) = (total_secs, parse_time_marker(record)) else {
            return;
        };
        let elapsed = elapsed.min(total);
        if let Some(sink) = progress {
            sink.advance_to(elapsed);
        }
        self.logger.progress(((elapsed / total) * 100.0) as u32);
    }

    fn diagnostics(&self) -> String {
        self.logger
            .get_tail()
            .join("\n")
            .chars()
            .take(DIAGNOSTIC_LIMIT)
            .collect()
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation, progress: Option<&dyn ProgressSink>) -> RunResult<()> {
        let tool = invocation.tool_name();

        self.logger.run(&invocation.display_short());
        tracing::debug!("Running: {}", invocation.display_full());
        if self.show_command_pretty {
            self.logger
                .log_command_pretty(&invocation.program, &invocation.args);
        }

        self.logger.clear_tail();
        self.logger.reset_progress();

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        let total_secs = invocation.expected_secs;
        let sink = progress.filter(|_| total_secs.is_some());
        if let (Some(sink), Some(total)) = (sink, total_secs) {
            sink.start(&invocation.label, total);
        }

        let read_result = match child.stderr.take() {
            Some(stderr) => for_each_record(stderr, |record| {
                self.handle_record(record, total_secs, sink)
            }),
            None => Ok(()),
        };

        let status = child.wait();

        if let Some(sink) = sink {
            sink.finish();
        }

        let status = status.map_err(|source| RunError::Io {
            tool: tool.clone(),
            source,
        })?;
        read_result.map_err(|source| RunError::Io {
            tool: tool.clone(),
            source,
        })?;

        if !status.success() {
            self.logger.show_tail(&tool);
            return Err(RunError::tool_failed(
                tool,
                status.code().unwrap_or(-1),
                self.diagnostics(),
            ));
        }

        tracing::debug!("{} finished: {}", tool, invocation.label);
        Ok(())
    }
}

/// Feed every `\r`- or `\n`-terminated record of `reader` to `on_record`.
///
/// Each `read` blocks until the tool writes more or closes the stream.
fn for_each_record<R: Read>(mut reader: R, mut on_record: impl FnMut(&str)) -> io::Result<()> {
    let mut chunk = [0u8; 4096];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        for &byte in &chunk[..read] {
            if byte == b'\r' || byte == b'\n' {
                if !pending.is_empty() {
                    on_record(&String::from_utf8_lossy(&pending));
                    pending.clear();
                }
            } else {
                pending.push(byte);
            }
        }
    }

    if !pending.is_empty() {
        on_record(&String::from_utf8_lossy(&pending));
    }

    Ok(())
}
