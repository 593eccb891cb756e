//! Core types for the orchestrator pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::CompatibilityReport;
use crate::config::Settings;
use crate::discovery::DiscoveredInputs;
use crate::logging::JobLogger;
use crate::merge::{MergeOutput, Merger};
use crate::probe::MediaProber;
use crate::runner::{ProgressSink, ToolRunner};
use crate::transcode::Transcoder;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Contains run configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// Application settings.
    pub settings: Settings,
    /// Run name/identifier.
    pub job_name: String,
    /// Resolved working directory for manifests and transcodes.
    pub work_dir: PathBuf,
    /// Per-run logger.
    pub logger: Arc<JobLogger>,
    /// Launches ffmpeg.
    pub runner: Arc<dyn ToolRunner>,
    /// Inspects media files.
    pub prober: Arc<dyn MediaProber>,
    /// Optional encode progress display.
    progress_sink: Option<Arc<dyn ProgressSink>>,
    /// Optional step progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a run.
    ///
    /// The project root is made absolute so every path handed to ffmpeg
    /// means the same thing regardless of where it is resolved.
    pub fn new(
        settings: Settings,
        job_name: impl Into<String>,
        logger: Arc<JobLogger>,
        runner: Arc<dyn ToolRunner>,
        prober: Arc<dyn MediaProber>,
    ) -> Self {
        let mut settings = settings;
        settings.absolutize_project_root();
        let work_dir = settings.work_dir();
        Self {
            settings,
            job_name: job_name.into(),
            work_dir,
            logger,
            runner,
            prober,
            progress_sink: None,
            progress_callback: None,
        }
    }

    /// Set the encode progress sink.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress_sink = Some(sink);
        self
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    /// Encode progress sink, if any.
    pub fn progress_sink(&self) -> Option<&dyn ProgressSink> {
        self.progress_sink.as_deref()
    }

    /// Final output file.
    pub fn output_path(&self) -> PathBuf {
        self.settings.output_path()
    }

    /// Where the concat manifest is written.
    pub fn manifest_path(&self) -> PathBuf {
        self.settings.manifest_path()
    }

    /// Transcoder writing into the work directory.
    pub fn transcoder(&self) -> Transcoder<'_> {
        Transcoder::new(
            &self.work_dir,
            &self.settings.encoding,
            self.runner.as_ref(),
            self.logger.as_ref(),
        )
    }

    /// Merger reporting to the progress sink.
    pub fn merger(&self) -> Merger<'_> {
        Merger::new(
            &self.settings.encoding,
            &self.settings.fades,
            self.runner.as_ref(),
            self.prober.as_ref(),
            self.logger.as_ref(),
        )
        .with_progress(self.progress_sink())
    }
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Steps add new data but do not overwrite what earlier steps recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Unique run identifier.
    pub job_id: String,
    /// When the run started.
    pub started_at: Option<String>,
    /// Clips and music found (from Discover step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveredInputs>,
    /// Frame-rate analysis (from CheckCompatibility step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<CompatibilityReport>,
    /// Per-clip transcode results (from TranscodePath step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcode: Option<TranscodeOutput>,
    /// The merge that produced the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeOutput>,
    /// Why the stream-copy merge was abandoned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl JobState {
    /// Create a new run state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Discovered clips (empty before discovery).
    pub fn videos(&self) -> &[PathBuf] {
        self.discovery
            .as_ref()
            .map(|d| d.videos.as_slice())
            .unwrap_or(&[])
    }

    /// Discovered music track.
    pub fn music(&self) -> Option<&Path> {
        self.discovery.as_ref().map(|d| d.music.as_path())
    }

    /// Whether a merge already wrote the output.
    pub fn has_output(&self) -> bool {
        self.merge.is_some()
    }

    /// Whether the stream-copy attempt failed and fell back.
    pub fn fell_back(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Output from the TranscodePath step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscodeOutput {
    /// Normalized clips, in original order.
    pub transcoded: Vec<PathBuf>,
    /// Source clips that could not be transcoded.
    pub failed: Vec<PathBuf>,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_state_tracks_inputs() {
        let mut state = JobState::new("run-123");
        assert!(state.videos().is_empty());
        assert!(state.music().is_none());

        state.discovery = Some(DiscoveredInputs {
            videos: vec![PathBuf::from("a.mp4")],
            music: PathBuf::from("Music/song.mp3"),
        });

        assert_eq!(state.videos(), &[PathBuf::from("a.mp4")]);
        assert_eq!(state.music(), Some(Path::new("Music/song.mp3")));
        assert!(!state.has_output());
    }

    #[test]
    fn job_state_serializes() {
        let mut state = JobState::new("run-456");
        state.fallback_reason = Some("Merge failed".to_string());

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"job_id\":\"run-456\""));
        assert!(json.contains("\"fallback_reason\":\"Merge failed\""));
        assert!(!json.contains("\"merge\""));
    }
}
