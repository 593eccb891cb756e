//! clipmix core - clip discovery, frame-rate analysis and ffmpeg orchestration
//!
//! This crate contains all of the run logic with no terminal dependencies.
//! External tools sit behind the [`runner::ToolRunner`] and
//! [`probe::MediaProber`] traits so a run can be driven without ffmpeg.

pub mod analysis;
pub mod concat;
pub mod config;
pub mod discovery;
pub mod logging;
pub mod merge;
pub mod models;
pub mod orchestrator;
pub mod probe;
pub mod runner;
pub mod transcode;

#[cfg(test)]
pub(crate) mod testing;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
