//! Frame-rate compatibility analysis.
//!
//! Clips can only be concatenated with a stream copy when they share one
//! frame rate. This module counts the rates across the discovered clips and
//! picks the majority rate to normalize to when they do not.

mod compatibility;

pub use compatibility::{analyze_compatibility, CompatibilityReport, FrameRateHistogram};
