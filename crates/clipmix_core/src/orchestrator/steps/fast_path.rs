//! FastPath step - stream-copy merge of the original clips.

use crate::concat::write_manifest;
use crate::models::MergeMode;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Merges the original clips without re-encoding them.
///
/// Only runs when every clip shares one frame rate. A failed merge is not
/// an error here: it is recorded as the fallback reason and the step
/// reports itself skipped so the transcode path takes over.
pub struct FastPathStep;

impl FastPathStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FastPathStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for FastPathStep {
    fn name(&self) -> &str {
        "FastPath"
    }

    fn description(&self) -> &str {
        "Concatenate the original clips with stream copy"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let report = state
            .compatibility
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Compatibility not checked"))?;

        if !report.compatible {
            return Ok(StepOutcome::Skipped(
                "clips have different frame rates".to_string(),
            ));
        }

        ctx.logger.info("Using fast stream copy mode");

        let manifest = ctx.manifest_path();
        write_manifest(&manifest, state.videos())
            .map_err(|e| StepError::io_error("writing concat manifest", e))?;

        let output = ctx.output_path();
        match ctx
            .merger()
            .merge(&manifest, state.music(), &output, MergeMode::StreamCopy)
        {
            Ok(merged) => {
                state.merge = Some(merged);
                Ok(StepOutcome::Success)
            }
            Err(e) => {
                tracing::warn!("{}", e);
                ctx.logger
                    .warn("Stream copy failed, falling back to transcoding");
                state.fallback_reason = Some(e.to_string());
                Ok(StepOutcome::Skipped("stream copy failed".to_string()))
            }
        }
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let merge = state
            .merge
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Merge results not recorded"))?;

        if !merge.path.exists() {
            return Err(StepError::invalid_output(format!(
                "Output file not created: {}",
                merge.path.display()
            )));
        }
        Ok(())
    }
}
