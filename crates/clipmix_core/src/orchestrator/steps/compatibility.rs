//! CheckCompatibility step - decides between stream copy and transcoding.

use crate::analysis::analyze_compatibility;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Counts frame rates across the discovered clips.
pub struct CompatibilityStep;

impl CompatibilityStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompatibilityStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CompatibilityStep {
    fn name(&self) -> &str {
        "CheckCompatibility"
    }

    fn description(&self) -> &str {
        "Check whether the clips share one frame rate"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        if state.discovery.is_none() {
            return Err(StepError::precondition_failed("Inputs have not been discovered"));
        }

        let report = analyze_compatibility(ctx.prober.as_ref(), state.videos());

        if report.compatible {
            ctx.logger
                .debug(&format!("All clips at {} fps", report.majority));
        } else {
            ctx.logger.info(&format!(
                "Frame rates: {}, Using: {}",
                report.histogram, report.majority
            ));
        }

        state.compatibility = Some(report);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.compatibility.is_none() {
            return Err(StepError::invalid_output("Compatibility not recorded"));
        }
        Ok(())
    }
}
