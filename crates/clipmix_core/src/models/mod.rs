//! Data models for clipmix.
//!
//! This module contains the core data structures shared by every stage:
//! - `FrameRate`: exact rational frame rate used as a histogram key
//! - `MediaInfo`: the per-file inspection record
//! - `MergeMode`: stream copy vs. hardware transcode

mod enums;
mod media;

// Re-export all public types
pub use enums::MergeMode;
pub use media::{FrameRate, MediaInfo};
