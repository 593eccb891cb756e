//! Pipeline orchestrator for a clipmix run.
//!
//! A run is a fixed sequence of steps sharing a read-only [`Context`] and
//! a mutable [`JobState`].
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Discover
//!     ├── Step: CheckCompatibility
//!     ├── Step: FastPath        (compatible clips, stream copy)
//!     └── Step: TranscodePath   (incompatible clips, or FastPath fell back)
//! ```
//!
//! FastPath and TranscodePath are mutually exclusive in effect: whichever
//! writes the output first makes the other skip. A FastPath merge failure
//! hands over to TranscodePath exactly once; a TranscodePath failure ends
//! the run.
//!
//! # Example
//!
//! ```ignore
//! use clipmix_core::orchestrator::{create_standard_pipeline, Context, JobState};
//!
//! let ctx = Context::new(settings, "clipmix", logger, runner, prober);
//! let mut state = JobState::new("run-1");
//!
//! let result = create_standard_pipeline().run(&ctx, &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

#[cfg(test)]
mod e2e;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{CompatibilityStep, DiscoverStep, FastPathStep, TranscodePathStep};
pub use types::{Context, JobState, ProgressCallback, StepOutcome, TranscodeOutput};

/// Create the standard pipeline with all steps in the correct order.
///
/// 1. Discover - find clips and music
/// 2. CheckCompatibility - frame-rate histogram and majority
/// 3. FastPath - stream-copy merge of the originals
/// 4. TranscodePath - normalize clips and merge with the hardware encoder
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(DiscoverStep::new())
        .with_step(CompatibilityStep::new())
        .with_step(FastPathStep::new())
        .with_step(TranscodePathStep::new())
}
