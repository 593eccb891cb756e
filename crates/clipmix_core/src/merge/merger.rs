//! Runs the merge command.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::command::MergeCommandBuilder;
use super::fade::FadeWindow;
use crate::concat::total_duration;
use crate::config::{EncodingSettings, FadeSettings};
use crate::logging::JobLogger;
use crate::models::MergeMode;
use crate::probe::{probe_duration, MediaProber};
use crate::runner::{Invocation, ProgressSink, RunError, ToolRunner};

/// The merge invocation failed.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Merge failed ({mode}): {source}")]
    Failed {
        mode: MergeMode,
        #[source]
        source: RunError,
    },
}

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// What a successful merge produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutput {
    /// Final output file.
    pub path: PathBuf,
    /// Mode the merge ran in.
    pub mode: MergeMode,
    /// Command line that was run.
    pub command: String,
    /// Fade applied, if the music had a known duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade: Option<FadeWindow>,
}

/// Concatenates the manifest and overlays music in one tool run.
pub struct Merger<'a> {
    encoding: &'a EncodingSettings,
    fades: &'a FadeSettings,
    runner: &'a dyn ToolRunner,
    prober: &'a dyn MediaProber,
    logger: &'a JobLogger,
    progress: Option<&'a dyn ProgressSink>,
}

impl<'a> Merger<'a> {
    pub fn new(
        encoding: &'a EncodingSettings,
        fades: &'a FadeSettings,
        runner: &'a dyn ToolRunner,
        prober: &'a dyn MediaProber,
        logger: &'a JobLogger,
    ) -> Self {
        Self {
            encoding,
            fades,
            runner,
            prober,
            logger,
            progress: None,
        }
    }

    /// Report encode progress to `sink`.
    pub fn with_progress(mut self, sink: Option<&'a dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Merge the clips listed in `manifest` into `output`.
    ///
    /// A music file that does not exist is treated as absent. Music with a
    /// positive duration trims and fades the video to its length.
    pub fn merge(
        &self,
        manifest: &Path,
        music: Option<&Path>,
        output: &Path,
        mode: MergeMode,
    ) -> MergeResult<MergeOutput> {
        let music = music.filter(|m| m.exists());
        let music_secs = music
            .map(|m| probe_duration(self.prober, m))
            .unwrap_or(0.0);

        let fade = (music_secs > 0.0).then(|| {
            FadeWindow::for_music(music_secs, self.fades.fade_in_secs, self.fades.fade_out_secs)
        });

        let mut builder = MergeCommandBuilder::new(self.encoding, manifest, output, mode);
        if let Some(music) = music {
            builder = builder.with_music(music, fade);
        }
        let tokens = builder.build();

        if let Some(fade) = fade {
            self.logger.info(&format!(
                "Processing: {:.1}s with fade in/out",
                fade.duration_secs
            ));
        }

        let output_name = output
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| output.display().to_string());
        self.logger
            .info(&format!("Merging videos ({}) -> {}", mode, output_name));

        let expected_secs = if music_secs > 0.0 {
            music_secs
        } else {
            total_duration(self.prober, manifest)
        };

        let invocation = Invocation::new(
            self.encoding.ffmpeg_path.as_str(),
            format!("Merge ({})", mode),
        )
        .args(tokens)
        .with_expected_duration(expected_secs);

        self.runner
            .run(&invocation, self.progress)
            .map_err(|source| MergeError::Failed { mode, source })?;

        self.logger.done(&format!("Saved: {}", output.display()));

        Ok(MergeOutput {
            path: output.to_path_buf(),
            mode,
            command: invocation.display_full(),
            fade,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concat::write_manifest;
    use crate::logging::LogConfig;
    use crate::models::MediaInfo;
    use crate::testing::{FakeProber, RecordingRunner, RecordingSink};
    use std::fs;
    use tempfile::tempdir;

    struct Fixture {
        dir: tempfile::TempDir,
        encoding: EncodingSettings,
        fades: FadeSettings,
        prober: FakeProber,
        logger: JobLogger,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let logger =
                JobLogger::new("merge", dir.path().join("logs"), LogConfig::default(), None)
                    .unwrap();
            Self {
                dir,
                encoding: EncodingSettings::default(),
                fades: FadeSettings::default(),
                prober: FakeProber::new(),
                logger,
            }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn merger<'a>(&'a self, runner: &'a RecordingRunner) -> Merger<'a> {
            Merger::new(&self.encoding, &self.fades, runner, &self.prober, &self.logger)
        }
    }

    fn with_duration(secs: f64) -> MediaInfo {
        MediaInfo {
            duration_secs: secs,
            ..Default::default()
        }
    }

    #[test]
    fn music_drives_fade_and_progress_total() {
        let fx = Fixture::new();
        let manifest = fx.path("list.txt");
        let music = fx.path("song.mp3");
        fs::write(&music, b"").unwrap();
        write_manifest(&manifest, &[fx.path("a.mp4")]).unwrap();
        fx.prober.insert(&music, with_duration(30.0));

        let runner = RecordingRunner::new();
        let sink = RecordingSink::default();
        let output = fx
            .merger(&runner)
            .with_progress(Some(&sink))
            .merge(&manifest, Some(music.as_path()), &fx.path("out.mp4"), MergeMode::StreamCopy)
            .unwrap();

        let fade = output.fade.unwrap();
        assert_eq!(fade.fade_out_start_secs, 29.0);
        assert_eq!(output.mode, MergeMode::StreamCopy);
        assert!(output.path.exists());

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].expected_secs, Some(30.0));
        assert!(calls[0].args.contains(&"libx264".to_string()));
        assert_eq!(sink.events().first().map(String::as_str), Some("start Merge (stream copy) 30"));
    }

    #[test]
    fn missing_music_file_merges_without_audio_overlay() {
        let fx = Fixture::new();
        let manifest = fx.path("list.txt");
        write_manifest(&manifest, &[fx.path("a.mp4"), fx.path("b.mp4")]).unwrap();
        fx.prober.insert(fx.path("a.mp4"), with_duration(5.0));
        fx.prober.insert(fx.path("b.mp4"), with_duration(7.0));

        let runner = RecordingRunner::new();
        let output = fx
            .merger(&runner)
            .merge(
                &manifest,
                Some(fx.path("gone.mp3").as_path()),
                &fx.path("out.mp4"),
                MergeMode::HardwareTranscode,
            )
            .unwrap();

        assert!(output.fade.is_none());
        let call = &runner.calls()[0];
        assert!(!call.args.contains(&"-shortest".to_string()));
        assert_eq!(call.expected_secs, Some(12.0));
    }

    #[test]
    fn zero_length_music_falls_back_to_shortest() {
        let fx = Fixture::new();
        let manifest = fx.path("list.txt");
        let music = fx.path("song.mp3");
        fs::write(&music, b"").unwrap();
        write_manifest(&manifest, &[fx.path("a.mp4")]).unwrap();

        let runner = RecordingRunner::new();
        fx.merger(&runner)
            .merge(&manifest, Some(music.as_path()), &fx.path("out.mp4"), MergeMode::StreamCopy)
            .unwrap();

        let call = &runner.calls()[0];
        assert!(call.args.contains(&"-shortest".to_string()));
        assert!(call.args.contains(&"copy".to_string()));
        // Nothing to measure progress against
        assert_eq!(call.expected_secs, None);
    }

    #[test]
    fn tool_failure_is_merge_error() {
        let fx = Fixture::new();
        let manifest = fx.path("list.txt");
        write_manifest(&manifest, &[fx.path("a.mp4")]).unwrap();

        let runner = RecordingRunner::failing_when(|_| true);
        let err = fx
            .merger(&runner)
            .merge(&manifest, None, &fx.path("out.mp4"), MergeMode::StreamCopy)
            .unwrap_err();

        let MergeError::Failed { mode, .. } = err;
        assert_eq!(mode, MergeMode::StreamCopy);
    }
}
