//! The unit of work in a run.

use super::errors::StepResult;
use super::types::{Context, JobState, StepOutcome};

/// One state of a run.
///
/// For every step the pipeline calls `validate_input`, then `execute`, and
/// finally `validate_output` if `execute` reported `Success`. A step that
/// returns `Skipped` is logged and the pipeline moves on; an `Err` from any
/// of the three ends the run.
pub trait PipelineStep: Send + Sync {
    /// Short name used in phase headers and errors.
    fn name(&self) -> &str;

    /// Check configuration before any work is done.
    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    /// Do the work, recording what was produced in `state`.
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome>;

    /// Confirm the recorded results are usable by later steps.
    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// One-line summary for help and debug output.
    fn description(&self) -> &str {
        self.name()
    }
}
