//! Transcoder with on-disk memoization.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::EncodingSettings;
use crate::logging::JobLogger;
use crate::models::FrameRate;
use crate::runner::{Invocation, RunError, ToolRunner};

/// A single clip could not be transcoded.
#[derive(Error, Debug)]
#[error("Failed to transcode {}: {source}", input.display())]
pub struct TranscodeError {
    /// Clip that failed.
    pub input: PathBuf,
    #[source]
    pub source: RunError,
}

/// Result type for transcode operations.
pub type TranscodeResult<T> = Result<T, TranscodeError>;

/// Re-encodes clips into the work directory.
pub struct Transcoder<'a> {
    work_dir: &'a Path,
    encoding: &'a EncodingSettings,
    runner: &'a dyn ToolRunner,
    logger: &'a JobLogger,
}

impl<'a> Transcoder<'a> {
    pub fn new(
        work_dir: &'a Path,
        encoding: &'a EncodingSettings,
        runner: &'a dyn ToolRunner,
        logger: &'a JobLogger,
    ) -> Self {
        Self {
            work_dir,
            encoding,
            runner,
            logger,
        }
    }

    /// Derived output path: `<work_dir>/<stem>_h264[_fps<rate>].<ext>`.
    pub fn output_path_for(&self, input: &Path, target: Option<FrameRate>) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "clip".to_string());
        let fps_label = target
            .map(|rate| format!("_fps{}", rate.label()))
            .unwrap_or_default();

        self.work_dir.join(format!(
            "{}_h264{}.{}",
            stem, fps_label, self.encoding.transcode_extension
        ))
    }

    /// Build the encoder command for `input`.
    pub fn build_invocation(
        &self,
        input: &Path,
        target: Option<FrameRate>,
        output: &Path,
    ) -> Invocation {
        let mut invocation = Invocation::new(
            self.encoding.ffmpeg_path.as_str(),
            format!("Transcode {}", display_name(input)),
        )
        .args(["-y", "-i"])
        .arg(input.to_string_lossy())
        .args(["-c:v", self.encoding.hardware_encoder.as_str()]);

        if let Some(rate) = target {
            invocation = invocation.args(["-r".to_string(), rate.ffmpeg_arg()]);
        }

        invocation
            .args([
                "-c:a",
                self.encoding.audio_codec.as_str(),
                "-b:a",
                self.encoding.transcode_audio_bitrate.as_str(),
            ])
            .arg(output.to_string_lossy())
    }

    /// Transcode `input`, optionally to `target` fps.
    ///
    /// Returns the cached file when it already exists. On failure any
    /// partial output is removed so it cannot be mistaken for a cache hit.
    pub fn transcode(&self, input: &Path, target: Option<FrameRate>) -> TranscodeResult<PathBuf> {
        let output = self.output_path_for(input, target);

        if output.exists() {
            self.logger
                .skip(&format!("{} already transcoded", display_name(input)));
            return Ok(output);
        }

        let fps_message = target
            .map(|rate| format!(" @ {}fps", rate))
            .unwrap_or_default();
        self.logger.info(&format!(
            "Converting {} to H.264{}...",
            display_name(input),
            fps_message
        ));

        let invocation = self.build_invocation(input, target, &output);
        if let Err(source) = self.runner.run(&invocation, None) {
            if output.exists() {
                if let Err(e) = fs::remove_file(&output) {
                    tracing::warn!("Could not remove partial {}: {}", output.display(), e);
                }
            }
            return Err(TranscodeError {
                input: input.to_path_buf(),
                source,
            });
        }

        Ok(output)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
