//! Discover step - finds the clips and the music track.

use crate::discovery::discover_inputs;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Scans the project directory and the music directory.
pub struct DiscoverStep;

impl DiscoverStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DiscoverStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for DiscoverStep {
    fn name(&self) -> &str {
        "Discover"
    }

    fn description(&self) -> &str {
        "Find video clips and the music track"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.settings.media.video_extensions.is_empty() {
            return Err(StepError::invalid_input("No video extensions configured"));
        }
        if ctx.settings.media.audio_extensions.is_empty() {
            return Err(StepError::invalid_input("No audio extensions configured"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let inputs = discover_inputs(&ctx.settings)?;

        ctx.logger.info(&format!("Found {} videos", inputs.videos.len()));
        for video in &inputs.videos {
            ctx.logger.debug(&format!("  {}", video.display()));
        }
        ctx.logger.info(&format!(
            "Music: {}",
            inputs
                .music
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        ));

        state.discovery = Some(inputs);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.videos().is_empty() || state.music().is_none() {
            return Err(StepError::invalid_output("Discovery results not recorded"));
        }
        Ok(())
    }
}
