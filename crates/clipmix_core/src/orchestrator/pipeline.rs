//! Sequential step runner.

use std::fs;

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, JobState, StepOutcome};

/// Ordered list of steps, run one after another on the calling thread.
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Append a step, builder style.
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run the pipeline with the given context and state.
    ///
    /// Before the first step the project root must be a directory and the
    /// work directory is created. Then each step runs:
    /// 1. `validate_input`
    /// 2. `execute`
    /// 3. `validate_output` (if execute returned Success)
    pub fn run(&self, ctx: &Context, state: &mut JobState) -> PipelineResult<PipelineRunResult> {
        let project = ctx.settings.project_root();
        if !project.is_dir() {
            return Err(PipelineError::validation_failed(
                &ctx.job_name,
                format!("Project directory not found: {}", project.display()),
            ));
        }

        fs::create_dir_all(&ctx.work_dir).map_err(|e| {
            PipelineError::setup_failed(
                &ctx.job_name,
                format!("Cannot create {}: {}", ctx.work_dir.display(), e),
            )
        })?;

        let mut result = PipelineRunResult {
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
        };

        let total_steps = self.steps.len();

        for (i, step) in self.steps.iter().enumerate() {
            let step_name = step.name();
            ctx.logger.phase(step_name);

            let percent = ((i as f64 / total_steps as f64) * 100.0) as u32;
            ctx.report_progress(step_name, percent, &format!("Starting {}", step_name));

            ctx.logger.debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx) {
                ctx.logger.error(&format!("Input validation failed: {}", e));
                return Err(PipelineError::step_failed(&ctx.job_name, step_name, e));
            }

            ctx.logger.debug(&format!("Executing '{}'", step_name));
            let outcome = step.execute(ctx, state).map_err(|e| {
                ctx.logger.error(&e.to_string());
                PipelineError::step_failed(&ctx.job_name, step_name, e)
            })?;

            match outcome {
                StepOutcome::Success => {
                    ctx.logger
                        .debug(&format!("Validating output for '{}'", step_name));
                    if let Err(e) = step.validate_output(ctx, state) {
                        ctx.logger.error(&format!("Output validation failed: {}", e));
                        return Err(PipelineError::step_failed(&ctx.job_name, step_name, e));
                    }

                    tracing::debug!("{} completed", step_name);
                    result.steps_completed.push(step_name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    ctx.logger.skip(&format!("{}: {}", step_name, reason));
                    result.steps_skipped.push(step_name.to_string());
                }
            }
        }

        ctx.report_progress("Complete", 100, "Pipeline finished");
        if let Ok(json) = serde_json::to_string(state) {
            tracing::debug!("Final state: {}", json);
        }
        ctx.logger.flush();

        Ok(result)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Step names in run order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Which steps did work and which skipped, in run order.
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    pub steps_completed: Vec<String>,
    pub steps_skipped: Vec<String>,
}

impl PipelineRunResult {
    /// Whether a step with this name completed.
    pub fn completed(&self, step_name: &str) -> bool {
        self.steps_completed.iter().any(|s| s == step_name)
    }

    /// Whether a step with this name was skipped.
    pub fn skipped(&self, step_name: &str) -> bool {
        self.steps_skipped.iter().any(|s| s == step_name)
    }

    /// Steps that ran, skipped or not.
    pub fn total_steps(&self) -> usize {
        self.steps_completed.len() + self.steps_skipped.len()
    }
}
