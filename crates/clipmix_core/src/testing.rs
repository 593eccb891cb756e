//! In-memory stand-ins for ffprobe/ffmpeg used by the unit tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::models::MediaInfo;
use crate::probe::MediaProber;
use crate::runner::{Invocation, ProgressSink, RunError, RunResult, ToolRunner};

/// Prober answering from a fixed table; unknown paths probe as empty.
#[derive(Default)]
pub struct FakeProber {
    table: Mutex<HashMap<PathBuf, MediaInfo>>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, info: MediaInfo) {
        self.table.lock().insert(path.into(), info);
    }
}

impl MediaProber for FakeProber {
    fn probe(&self, path: &Path) -> MediaInfo {
        self.table.lock().get(path).cloned().unwrap_or_default()
    }
}

type FailRule = Box<dyn Fn(&Invocation) -> bool + Send + Sync>;

/// Runner that records invocations instead of launching processes.
///
/// Successful runs create an empty file at the invocation's output path so
/// existence checks downstream behave as with the real tool.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    fail_rule: Option<FailRule>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every invocation matching `rule` with exit code 1.
    pub fn failing_when(rule: impl Fn(&Invocation) -> bool + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_rule: Some(Box::new(rule)),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    /// Invocations whose arguments contain `token`.
    pub fn calls_with(&self, token: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.args.iter().any(|a| a == token))
            .collect()
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation, progress: Option<&dyn ProgressSink>) -> RunResult<()> {
        self.calls.lock().push(invocation.clone());

        if let (Some(sink), Some(total)) = (progress, invocation.expected_secs) {
            sink.start(&invocation.label, total);
            sink.advance_to(total);
            sink.finish();
        }

        if self.fail_rule.as_ref().is_some_and(|rule| rule(invocation)) {
            return Err(RunError::tool_failed(
                invocation.tool_name(),
                1,
                "simulated failure",
            ));
        }

        if let Some(output) = invocation.output_path() {
            if let Some(parent) = output.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = fs::write(&output, b"");
        }
        Ok(())
    }
}

/// Progress sink that records events as strings.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn start(&self, label: &str, total_secs: f64) {
        self.events.lock().push(format!("start {} {}", label, total_secs));
    }

    fn advance_to(&self, secs: f64) {
        self.events.lock().push(format!("advance {}", secs));
    }

    fn finish(&self) {
        self.events.lock().push("finish".to_string());
    }
}
