//! Media inspection.
//!
//! Probing is lenient: a file that cannot be inspected (missing, not media,
//! tool failure) produces an empty [`MediaInfo`] instead of an error, so a
//! scan over many clips never stops on one bad file.

mod ffprobe;

use std::path::Path;

use crate::models::MediaInfo;

pub use ffprobe::{parse_ffprobe_json, FfprobeProber};

/// Something that can inspect a media file.
pub trait MediaProber: Send + Sync {
    /// Inspect `path`. Never fails; unknown properties stay empty.
    fn probe(&self, path: &Path) -> MediaInfo;
}

/// Duration of a media file in seconds (0 when unknown).
pub fn probe_duration(prober: &dyn MediaProber, path: &Path) -> f64 {
    prober.probe(path).duration_secs
}
