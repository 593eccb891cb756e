//! TranscodePath step - normalizes every clip, then merges with the
//! hardware encoder.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::concat::write_manifest;
use crate::models::{FrameRate, MergeMode};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome, TranscodeOutput};

/// Transcodes clips to the majority frame rate and merges the survivors.
///
/// Runs when the clips are incompatible or the stream-copy merge failed.
/// A merge failure here ends the run; there is no further fallback.
pub struct TranscodePathStep;

impl TranscodePathStep {
    pub fn new() -> Self {
        Self
    }

    /// Rate to pass to the encoder for a clip currently at `current`.
    ///
    /// `None` when the clip is already at the majority rate or the majority
    /// itself is unknown.
    fn target_rate(current: FrameRate, majority: FrameRate) -> Option<FrameRate> {
        (!majority.is_unknown() && current != majority).then_some(majority)
    }
}

impl Default for TranscodePathStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for TranscodePathStep {
    fn name(&self) -> &str {
        "TranscodePath"
    }

    fn description(&self) -> &str {
        "Transcode clips to a common frame rate and merge"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        if state.has_output() {
            return Ok(StepOutcome::Skipped(
                "output written by stream copy".to_string(),
            ));
        }

        let majority = state
            .compatibility
            .as_ref()
            .map(|report| report.majority)
            .ok_or_else(|| StepError::precondition_failed("Compatibility not checked"))?;

        ctx.logger
            .info(&format!("Transcoding with frame rate {}", majority));

        let transcoder = ctx.transcoder();
        let videos = state.videos().to_vec();
        let total = videos.len();
        let mut outcome = TranscodeOutput::default();
        let mut claimed: HashMap<PathBuf, String> = HashMap::new();

        for (i, video) in videos.into_iter().enumerate() {
            let name = video
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| video.display().to_string());
            ctx.report_progress(self.name(), ((i * 100) / total) as u32, &name);

            let current = ctx.prober.probe(&video).frame_rate;
            let target = Self::target_rate(current, majority);

            let derived = transcoder.output_path_for(&video, target);
            if let Some(first) = claimed.get(&derived) {
                ctx.logger.warn(&format!(
                    "{} and {} share the name stem; {} will reuse the encode of {}",
                    first, name, name, first
                ));
            } else {
                claimed.insert(derived, name.clone());
            }

            match transcoder.transcode(&video, target) {
                Ok(path) => outcome.transcoded.push(path),
                Err(e) => {
                    tracing::warn!("{}", e);
                    ctx.logger.error(&format!("Failed: {}", name));
                    outcome.failed.push(video);
                }
            }
        }

        if outcome.transcoded.is_empty() {
            let failed = outcome.failed.len();
            state.transcode = Some(outcome);
            return Err(StepError::NothingToMerge { failed });
        }

        if !outcome.failed.is_empty() {
            ctx.logger.warn(&format!(
                "{} of {} clips could not be transcoded and are left out",
                outcome.failed.len(),
                total
            ));
        }

        let manifest = ctx.manifest_path();
        write_manifest(&manifest, &outcome.transcoded)
            .map_err(|e| StepError::io_error("writing concat manifest", e))?;
        state.transcode = Some(outcome);

        let merged = ctx.merger().merge(
            &manifest,
            state.music(),
            &ctx.output_path(),
            MergeMode::HardwareTranscode,
        )?;
        state.merge = Some(merged);

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let merge = state
            .merge
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Merge results not recorded"))?;

        if merge.mode != MergeMode::HardwareTranscode {
            return Err(StepError::invalid_output("Merge did not use the hardware encoder"));
        }
        if !merge.path.exists() {
            return Err(StepError::invalid_output(format!(
                "Output file not created: {}",
                merge.path.display()
            )));
        }
        Ok(())
    }
}
