//! Per-clip normalization to H.264/AAC.
//!
//! Transcoded clips are written to the work directory under a name derived
//! from the source stem and target rate, and that name doubles as a cache
//! key: an existing file is reused without running the encoder again.
//!
//! Only the stem enters the name, so `run.mp4` and `run.mov` encoded at the
//! same rate share one output and the second clip reuses the first clip's
//! encode. The transcode step warns when that happens.

mod transcoder;

pub use transcoder::{TranscodeError, TranscodeResult, Transcoder};
