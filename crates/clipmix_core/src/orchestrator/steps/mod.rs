//! Pipeline step implementations.
//!
//! Each step handles one state of a run: discover the inputs, check the
//! clips for a shared frame rate, try the stream-copy merge, and fall back
//! to transcoding.

mod compatibility;
mod discover;
mod fast_path;
mod transcode_path;

pub use compatibility::CompatibilityStep;
pub use discover::DiscoverStep;
pub use fast_path::FastPathStep;
pub use transcode_path::TranscodePathStep;
