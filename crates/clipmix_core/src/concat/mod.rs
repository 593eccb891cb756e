//! Concatenation manifest for ffmpeg's concat demuxer.
//!
//! One `file '<path>'` line per clip, in playback order. Paths are written
//! with forward slashes so the same manifest reads correctly on every
//! platform ffmpeg runs on.

mod manifest;

pub use manifest::{read_manifest, total_duration, write_manifest};
